//! Favorites, shopping cart entries and subscriptions.
//!
//! All three are `(user_id, target)` rows guarded by a unique key on the pair. Adding and
//! removing are mirror operations and neither is idempotent: adding an existing edge fails with
//! `DuplicateEdge`, removing a missing one fails with `EdgeNotFound`. The unique key decides
//! duplicates, so two requests racing to add the same edge can't both succeed.

use sqlx::{Pool, Sqlite};

use crate::{
    actions::{recipes::get_recipe_summary, users::get_author_profile},
    error::Error,
    schema::{AuthorProfile, EdgeKind, Id, RecipeSummary, ToggleMethod},
};

async fn ensure_target(kind: EdgeKind, target: Id, pool: &Pool<Sqlite>) -> Result<(), Error> {
    let row: Option<(Id,)> = sqlx::query_as(&format!(
        "SELECT id FROM {} WHERE id = $1",
        kind.target_table()
    ))
    .bind(target)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(_) => Ok(()),
        None => Err(Error::NotFound(kind.target_name())),
    }
}

pub async fn add_edge(
    kind: EdgeKind,
    actor: Id,
    target: Id,
    pool: &Pool<Sqlite>,
) -> Result<(), Error> {
    ensure_target(kind, target, pool).await?;

    if kind.forbids_self_reference() && actor == target {
        log::debug!("Rejected {kind} from user {actor} to themselves");
        return Err(Error::SelfReference);
    }

    let result = sqlx::query(&format!(
        "INSERT INTO {} (user_id, {}) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        kind.table(),
        kind.target_column()
    ))
    .bind(actor)
    .bind(target)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        log::debug!("Rejected duplicate {kind} {actor} -> {target}");
        return Err(Error::DuplicateEdge(kind));
    }

    log::debug!("Added {kind} {actor} -> {target}");
    Ok(())
}

pub async fn remove_edge(
    kind: EdgeKind,
    actor: Id,
    target: Id,
    pool: &Pool<Sqlite>,
) -> Result<(), Error> {
    ensure_target(kind, target, pool).await?;

    let result = sqlx::query(&format!(
        "DELETE FROM {} WHERE user_id = $1 AND {} = $2",
        kind.table(),
        kind.target_column()
    ))
    .bind(actor)
    .bind(target)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::EdgeNotFound(kind));
    }

    log::debug!("Removed {kind} {actor} -> {target}");
    Ok(())
}

/// Anonymous viewers never have edges, so they are answered without touching the store.
pub async fn exists(
    kind: EdgeKind,
    viewer: Option<Id>,
    target: Id,
    pool: &Pool<Sqlite>,
) -> Result<bool, Error> {
    let Some(viewer) = viewer else {
        return Ok(false);
    };

    let row: Option<(Id,)> = sqlx::query_as(&format!(
        "SELECT id FROM {} WHERE user_id = $1 AND {} = $2",
        kind.table(),
        kind.target_column()
    ))
    .bind(viewer)
    .bind(target)
    .fetch_optional(pool)
    .await?;

    Ok(row.is_some())
}

/// Targets of the actor's edges, most recent first.
pub async fn list_for_actor(
    kind: EdgeKind,
    actor: Id,
    limit: Option<i64>,
    pool: &Pool<Sqlite>,
) -> Result<Vec<Id>, Error> {
    let rows: Vec<(Id,)> = sqlx::query_as(&format!(
        "SELECT {} FROM {} WHERE user_id = $1 ORDER BY id DESC LIMIT $2",
        kind.target_column(),
        kind.table()
    ))
    .bind(actor)
    .bind(limit.unwrap_or(-1))
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|row| row.0).collect())
}

pub async fn toggle_edge(
    kind: EdgeKind,
    actor: Id,
    target: Id,
    method: ToggleMethod,
    pool: &Pool<Sqlite>,
) -> Result<(), Error> {
    match method {
        ToggleMethod::Add => add_edge(kind, actor, target, pool).await,
        ToggleMethod::Remove => remove_edge(kind, actor, target, pool).await,
    }
}

/// Returns the recipe summary after an add, nothing after a remove.
pub async fn toggle_favorite(
    actor: Id,
    recipe_id: Id,
    method: ToggleMethod,
    pool: &Pool<Sqlite>,
) -> Result<Option<RecipeSummary>, Error> {
    toggle_recipe_edge(EdgeKind::Favorite, actor, recipe_id, method, pool).await
}

pub async fn toggle_cart(
    actor: Id,
    recipe_id: Id,
    method: ToggleMethod,
    pool: &Pool<Sqlite>,
) -> Result<Option<RecipeSummary>, Error> {
    toggle_recipe_edge(EdgeKind::Cart, actor, recipe_id, method, pool).await
}

async fn toggle_recipe_edge(
    kind: EdgeKind,
    actor: Id,
    recipe_id: Id,
    method: ToggleMethod,
    pool: &Pool<Sqlite>,
) -> Result<Option<RecipeSummary>, Error> {
    toggle_edge(kind, actor, recipe_id, method, pool).await?;

    match method {
        ToggleMethod::Add => get_recipe_summary(recipe_id, pool).await.map(Some),
        ToggleMethod::Remove => Ok(None),
    }
}

/// Returns the author's profile as seen by the new subscriber after an add.
pub async fn toggle_subscription(
    actor: Id,
    author_id: Id,
    method: ToggleMethod,
    pool: &Pool<Sqlite>,
) -> Result<Option<AuthorProfile>, Error> {
    toggle_edge(EdgeKind::Subscription, actor, author_id, method, pool).await?;

    match method {
        ToggleMethod::Add => get_author_profile(author_id, Some(actor), pool)
            .await
            .map(Some),
        ToggleMethod::Remove => Ok(None),
    }
}
