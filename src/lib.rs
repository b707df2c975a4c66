mod database {
    pub mod actions;
    pub mod error;
    pub mod form;
    pub mod pagination;
    pub mod schema;
}
mod config;
mod constants;

pub use config::*;
pub use constants::*;
pub use database::*;
pub use error::{Error, QueryError, TypeError, ValidationError};
