#![allow(dead_code)]

use foodgram_sdk::{
    actions::{ingredients::create_ingredient, recipes::create_recipe, users::create_user},
    connect,
    form::{IngredientLine, RecipeDraft},
    schema::{Id, MeasurementUnit},
    DatabaseConfig,
};
use sqlx::{Pool, Sqlite};

pub async fn setup() -> Pool<Sqlite> {
    let _ = env_logger::builder().is_test(true).try_init();

    connect(&DatabaseConfig {
        url: String::from("sqlite::memory:"),
        max_connections: 1,
    })
    .await
    .expect("in-memory database")
}

pub async fn user(name: &str, pool: &Pool<Sqlite>) -> Id {
    create_user(name, &format!("{name}@example.com"), name, "Tester", pool)
        .await
        .unwrap()
}

pub async fn ingredient(name: &str, unit: MeasurementUnit, pool: &Pool<Sqlite>) -> Id {
    create_ingredient(name, unit, pool).await.unwrap()
}

pub fn draft(name: &str, tags: Vec<Id>, lines: &[(Id, i64)]) -> RecipeDraft {
    RecipeDraft {
        name: name.to_string(),
        text: format!("How to make {name}"),
        cooking_time: 30,
        image: None,
        tags,
        ingredients: lines
            .iter()
            .map(|(id, amount)| IngredientLine {
                id: *id,
                amount: *amount,
            })
            .collect(),
    }
}

pub async fn recipe(author: Id, name: &str, lines: &[(Id, i64)], pool: &Pool<Sqlite>) -> Id {
    create_recipe(author, &draft(name, vec![], lines), pool)
        .await
        .unwrap()
}
