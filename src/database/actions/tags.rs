use sqlx::{Pool, QueryBuilder, Sqlite, SqliteConnection};

use crate::{
    error::{Error, ValidationError},
    schema::{Id, Tag},
};

pub async fn create_tag(
    name: &str,
    slug: &str,
    color: &str,
    pool: &Pool<Sqlite>,
) -> Result<Id, Error> {
    if !is_hex_color(color) {
        return Err(ValidationError::Color(color.to_string()).into());
    }

    let id: (Id,) =
        sqlx::query_as("INSERT INTO tags (name, slug, color) VALUES ($1, $2, $3) RETURNING id")
            .bind(name)
            .bind(slug)
            .bind(color.to_uppercase())
            .fetch_one(pool)
            .await?;

    Ok(id.0)
}

pub async fn get_tag(id: Id, pool: &Pool<Sqlite>) -> Result<Option<Tag>, Error> {
    let tag: Option<Tag> = sqlx::query_as("SELECT * FROM tags WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(tag)
}

pub async fn find_tag_by_slug(slug: &str, pool: &Pool<Sqlite>) -> Result<Option<Tag>, Error> {
    let tag: Option<Tag> = sqlx::query_as("SELECT * FROM tags WHERE slug = $1")
        .bind(slug)
        .fetch_optional(pool)
        .await?;

    Ok(tag)
}

pub async fn list_tags(pool: &Pool<Sqlite>) -> Result<Vec<Tag>, Error> {
    let list: Vec<Tag> = sqlx::query_as("SELECT * FROM tags ORDER BY name")
        .fetch_all(pool)
        .await?;

    Ok(list)
}

pub async fn list_recipe_tags(recipe_id: Id, pool: &Pool<Sqlite>) -> Result<Vec<Tag>, Error> {
    let list: Vec<Tag> = sqlx::query_as(
        "
        SELECT t.* FROM recipe_tags rt
        INNER JOIN tags t ON t.id = rt.tag_id
        WHERE rt.recipe_id = $1
        ORDER BY t.name
    ",
    )
    .bind(recipe_id)
    .fetch_all(pool)
    .await?;

    Ok(list)
}

pub async fn delete_tag(id: Id, pool: &Pool<Sqlite>) -> Result<(), Error> {
    let result = sqlx::query("DELETE FROM tags WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound("tag"));
    }

    Ok(())
}

/// Fails with `NotFound` unless every id names an existing tag.
pub(crate) async fn ensure_tags_exist(ids: &[Id], conn: &mut SqliteConnection) -> Result<(), Error> {
    if ids.is_empty() {
        return Ok(());
    }

    let mut query: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT id FROM tags WHERE id IN (");
    let mut separated = query.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");

    let found: Vec<(Id,)> = query.build_query_as().fetch_all(&mut *conn).await?;
    if found.len() != ids.len() {
        return Err(Error::NotFound("tag"));
    }

    Ok(())
}

/// Replaces the recipe's tag set.
pub(crate) async fn set_recipe_tags(
    recipe_id: Id,
    ids: &[Id],
    conn: &mut SqliteConnection,
) -> Result<(), Error> {
    sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = $1")
        .bind(recipe_id)
        .execute(&mut *conn)
        .await?;

    if ids.is_empty() {
        return Ok(());
    }

    let mut query: QueryBuilder<Sqlite> =
        QueryBuilder::new("INSERT INTO recipe_tags (recipe_id, tag_id) ");
    query.push_values(ids, |mut b, tag_id| {
        b.push_bind(recipe_id).push_bind(*tag_id);
    });
    query.build().execute(&mut *conn).await?;

    Ok(())
}

fn is_hex_color(color: &str) -> bool {
    color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit())
}
