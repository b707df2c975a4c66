use sqlx::{Pool, Sqlite};

use crate::{
    constants::INGREDIENT_SEARCH_LIMIT,
    error::Error,
    schema::{Id, Ingredient, MeasurementUnit},
};

pub async fn create_ingredient(
    name: &str,
    unit: MeasurementUnit,
    pool: &Pool<Sqlite>,
) -> Result<Id, Error> {
    let id: (Id,) = sqlx::query_as(
        "INSERT INTO ingredients (name, name_search, measurement_unit) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(name)
    .bind(name.to_lowercase())
    .bind(unit)
    .fetch_one(pool)
    .await?;

    Ok(id.0)
}

pub async fn get_ingredient(id: Id, pool: &Pool<Sqlite>) -> Result<Option<Ingredient>, Error> {
    let row: Option<Ingredient> = sqlx::query_as("SELECT * FROM ingredients WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

/// Case-insensitive name prefix search over the catalog. Matches against the lowercased copy of
/// the name kept in `name_search`; SQLite's `LIKE` only folds ASCII.
pub async fn search_ingredients(
    prefix: &str,
    pool: &Pool<Sqlite>,
) -> Result<Vec<Ingredient>, Error> {
    let rows: Vec<Ingredient> = sqlx::query_as(
        "
        SELECT * FROM ingredients
        WHERE name_search LIKE $1 ESCAPE '\\'
        ORDER BY name, id
        LIMIT $2
    ",
    )
    .bind(like_prefix(&prefix.to_lowercase()))
    .bind(INGREDIENT_SEARCH_LIMIT)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Removing an ingredient also removes it from every recipe that used it.
pub async fn delete_ingredient(id: Id, pool: &Pool<Sqlite>) -> Result<(), Error> {
    let result = sqlx::query("DELETE FROM ingredients WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound("ingredient"));
    }

    log::info!("Deleted ingredient {id}");
    Ok(())
}

pub(crate) fn like_prefix(prefix: &str) -> String {
    let escaped = prefix
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("{escaped}%")
}
