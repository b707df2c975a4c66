use sqlx::{Pool, Sqlite};

use crate::{
    actions::recipes::{count_recipes_by_author, list_recipes_by_author},
    constants::{SUBSCRIPTION_COUNT_PER_PAGE, SUBSCRIPTION_RECIPES_PREVIEW},
    error::Error,
    pagination::PageContext,
    schema::{AuthorProfile, Id, SubscriptionInfo, SubscriptionRow},
};

/// Authors the actor follows, most recent subscription first. Each entry carries the author's
/// total recipe count and a preview of at most `recipes_limit` of their newest recipes.
pub async fn list_subscriptions(
    actor: Id,
    recipes_limit: Option<i64>,
    offset: i64,
    pool: &Pool<Sqlite>,
) -> Result<PageContext<SubscriptionInfo>, Error> {
    let recipes_limit = recipes_limit
        .unwrap_or(SUBSCRIPTION_RECIPES_PREVIEW)
        .max(0);

    let rows: Vec<SubscriptionRow> = sqlx::query_as(
        "
        SELECT u.*, COUNT(*) OVER() AS count
        FROM subscriptions s
        INNER JOIN users u ON u.id = s.author_id
        WHERE s.user_id = $1
        ORDER BY s.id DESC
        LIMIT $2 OFFSET $3
    ",
    )
    .bind(actor)
    .bind(SUBSCRIPTION_COUNT_PER_PAGE)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total_count = rows.first().map(|row| row.count).unwrap_or(0);

    let mut subscriptions = Vec::with_capacity(rows.len());
    for row in rows {
        let author_id = row.author.id;
        subscriptions.push(SubscriptionInfo {
            author: AuthorProfile::from_user(row.author, true),
            recipes: list_recipes_by_author(author_id, Some(recipes_limit), pool).await?,
            recipes_count: count_recipes_by_author(author_id, pool).await?,
        });
    }

    Ok(PageContext::from_rows(
        subscriptions,
        total_count,
        SUBSCRIPTION_COUNT_PER_PAGE,
        offset,
    ))
}
