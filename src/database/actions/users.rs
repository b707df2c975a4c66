use sqlx::{Pool, Sqlite};

use crate::{
    actions::edges::exists,
    error::Error,
    schema::{AuthorProfile, EdgeKind, Id, User},
};

pub async fn create_user(
    username: &str,
    email: &str,
    first_name: &str,
    last_name: &str,
    pool: &Pool<Sqlite>,
) -> Result<Id, Error> {
    let id: (Id,) = sqlx::query_as(
        "
        INSERT INTO users (username, email, first_name, last_name)
        VALUES ($1, $2, $3, $4)
        RETURNING id
    ",
    )
    .bind(username)
    .bind(email)
    .bind(first_name)
    .bind(last_name)
    .fetch_one(pool)
    .await?;

    log::debug!("Created user {} ({username})", id.0);
    Ok(id.0)
}

pub async fn get_user(id: Id, pool: &Pool<Sqlite>) -> Result<Option<User>, Error> {
    let row: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

pub async fn get_author_profile(
    id: Id,
    viewer: Option<Id>,
    pool: &Pool<Sqlite>,
) -> Result<AuthorProfile, Error> {
    let user = get_user(id, pool).await?.ok_or(Error::NotFound("user"))?;
    author_profile(user, viewer, pool).await
}

pub async fn author_profile(
    user: User,
    viewer: Option<Id>,
    pool: &Pool<Sqlite>,
) -> Result<AuthorProfile, Error> {
    let is_subscribed = exists(EdgeKind::Subscription, viewer, user.id, pool).await?;
    Ok(AuthorProfile::from_user(user, is_subscribed))
}

/// Removes the user together with their recipes and every edge touching them.
pub async fn delete_user(id: Id, pool: &Pool<Sqlite>) -> Result<(), Error> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound("user"));
    }

    log::info!("Deleted user {id}");
    Ok(())
}
