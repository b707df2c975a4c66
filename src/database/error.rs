use std::fmt::{self, Display};

use serde_json::{json, Value};
use sqlx::error::ErrorKind;
use thiserror::Error;
use warp::{http::StatusCode, reject::Reject};

use super::schema::{EdgeKind, Id};

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0} already exists")]
    DuplicateEdge(EdgeKind),
    #[error("{0} does not exist")]
    EdgeNotFound(EdgeKind),
    #[error("you can't subscribe to yourself")]
    SelfReference,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("you don't have permission to perform this action")]
    PermissionDenied,
    #[error(transparent)]
    Type(#[from] TypeError),
    #[error(transparent)]
    Query(#[from] QueryError),
}

impl Error {
    pub fn code(&self) -> StatusCode {
        match self {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::PermissionDenied => StatusCode::FORBIDDEN,
            Error::DuplicateEdge(_)
            | Error::EdgeNotFound(_)
            | Error::SelfReference
            | Error::Validation(_)
            | Error::Type(_) => StatusCode::BAD_REQUEST,
            Error::Query(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Body handed to the request layer. Infrastructure details stay in the logs.
    pub fn body(&self) -> Value {
        match self {
            Error::Query(_) => json!({ "errors": "Internal server error" }),
            e => json!({ "errors": e.to_string() }),
        }
    }

    pub fn is_domain(&self) -> bool {
        !matches!(self, Error::Query(_))
    }
}

impl From<sqlx::Error> for Error {
    fn from(value: sqlx::Error) -> Self {
        if let sqlx::Error::Database(e) = &value {
            match e.kind() {
                ErrorKind::ForeignKeyViolation => return Error::NotFound("referenced entity"),
                ErrorKind::UniqueViolation => {
                    return ValidationError::Conflict(e.message().to_string()).into()
                }
                _ => {}
            }
        }

        let e = QueryError::from(value);
        log::error!("{e}");
        Error::Query(e)
    }
}

impl From<sqlx::migrate::MigrateError> for Error {
    fn from(value: sqlx::migrate::MigrateError) -> Self {
        Error::Query(QueryError::new(format!("Migration failed: {value}")))
    }
}

impl Reject for Error {}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("cooking time must be between {min} and {max} minutes, got {value}")]
    CookingTime { value: i64, min: i64, max: i64 },
    #[error("amount of ingredient {ingredient_id} must be between {min} and {max}, got {value}")]
    Amount {
        ingredient_id: Id,
        value: i64,
        min: i64,
        max: i64,
    },
    #[error("total amount of {0} is too large")]
    AmountOverflow(String),
    #[error("ingredient {0} is listed more than once")]
    DuplicateIngredient(Id),
    #[error("recipe must contain at least one ingredient")]
    NoIngredients,
    #[error("name must be between 1 and {max} characters")]
    Name { max: usize },
    #[error("recipe text must not be empty")]
    EmptyText,
    #[error("color must be a hex value like #49B64E, got {0}")]
    Color(String),
    #[error("conflicts with an existing entry ({0})")]
    Conflict(String),
}

#[derive(Debug)]
pub struct QueryError {
    info: String,
}

impl QueryError {
    pub fn new(info: String) -> Self {
        Self { info }
    }
}

impl From<sqlx::Error> for QueryError {
    fn from(value: sqlx::Error) -> Self {
        match value {
            sqlx::Error::Configuration(e) => Self::new(format!("Configuration: {e}")),
            sqlx::Error::Database(e) => Self::new(format!("{e}")),
            sqlx::Error::Io(e) => Self::new(format!("{e}")),
            sqlx::Error::Protocol(e) => Self::new(e),
            sqlx::Error::RowNotFound => Self::new(String::from("RowNotFound")),
            sqlx::Error::TypeNotFound { type_name } => {
                Self::new(format!("Type not found: {type_name}"))
            }
            sqlx::Error::ColumnIndexOutOfBounds { index, len } => {
                Self::new(format!("Column index out of bounds {index} ({len})"))
            }
            sqlx::Error::ColumnNotFound(e) => Self::new(format!("Column not found: {e}")),
            sqlx::Error::ColumnDecode { index, source } => {
                Self::new(format!("Column decode {index} ({source})"))
            }
            sqlx::Error::Decode(e) => Self::new(format!("{e}")),
            sqlx::Error::PoolTimedOut => Self::new(String::from("Pool timed out")),
            sqlx::Error::PoolClosed => Self::new(String::from("Pool closed")),
            sqlx::Error::WorkerCrashed => Self::new(String::from("Worker crashed")),
            e => Self::new(format!("{e}")),
        }
    }
}

impl Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Query failed: {}", self.info)
    }
}

impl std::error::Error for QueryError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeError {
    info: String,
}

impl TypeError {
    pub fn new(info: &str) -> Self {
        Self {
            info: info.to_string(),
        }
    }
}

impl Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.info)
    }
}

impl std::error::Error for TypeError {}
