use chrono::Utc;
use sqlx::{Pool, QueryBuilder, Sqlite, SqliteConnection};

use crate::{
    actions::{
        edges::exists,
        ingredients::like_prefix,
        tags::{ensure_tags_exist, list_recipe_tags, set_recipe_tags},
        users::{author_profile, get_user},
    },
    constants::RECIPE_COUNT_PER_PAGE,
    error::Error,
    form::RecipeDraft,
    pagination::PageContext,
    schema::{
        EdgeKind, Id, Recipe, RecipeFilter, RecipePart, RecipeRow, RecipeSummary, RecipeView,
    },
};

pub async fn create_recipe(
    author_id: Id,
    draft: &RecipeDraft,
    pool: &Pool<Sqlite>,
) -> Result<Id, Error> {
    draft.validate()?;

    let mut tx = pool.begin().await?;

    let author: Option<(Id,)> = sqlx::query_as("SELECT id FROM users WHERE id = $1")
        .bind(author_id)
        .fetch_optional(&mut *tx)
        .await?;
    if author.is_none() {
        return Err(Error::NotFound("user"));
    }

    ensure_references(draft, &mut tx).await?;

    let id: (Id,) = sqlx::query_as(
        "
        INSERT INTO recipes (author_id, name, name_search, text, cooking_time, image, pub_date)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id
    ",
    )
    .bind(author_id)
    .bind(draft.name.trim())
    .bind(draft.name.trim().to_lowercase())
    .bind(&draft.text)
    .bind(draft.cooking_time)
    .bind(&draft.image)
    .bind(Utc::now())
    .fetch_one(&mut *tx)
    .await?;

    replace_composition(id.0, draft, &mut tx).await?;
    tx.commit().await?;

    log::info!("Created recipe {} by user {author_id}", id.0);
    Ok(id.0)
}

/// Replaces every field, ingredient line and tag of the recipe with the draft. Lines and tags
/// the draft leaves out are removed.
pub async fn update_recipe(
    recipe_id: Id,
    editor: Id,
    draft: &RecipeDraft,
    pool: &Pool<Sqlite>,
) -> Result<(), Error> {
    let mut tx = pool.begin().await?;

    get_recipe_mut(recipe_id, editor, &mut tx).await?;
    draft.validate()?;
    ensure_references(draft, &mut tx).await?;

    sqlx::query(
        "
        UPDATE recipes SET name = $1, name_search = $2, text = $3, cooking_time = $4, image = $5
        WHERE id = $6
    ",
    )
    .bind(draft.name.trim())
    .bind(draft.name.trim().to_lowercase())
    .bind(&draft.text)
    .bind(draft.cooking_time)
    .bind(&draft.image)
    .bind(recipe_id)
    .execute(&mut *tx)
    .await?;

    replace_composition(recipe_id, draft, &mut tx).await?;
    tx.commit().await?;

    log::info!("Updated recipe {recipe_id}");
    Ok(())
}

pub async fn delete_recipe(recipe_id: Id, actor: Id, pool: &Pool<Sqlite>) -> Result<(), Error> {
    let mut tx = pool.begin().await?;

    get_recipe_mut(recipe_id, actor, &mut tx).await?;

    sqlx::query("DELETE FROM recipes WHERE id = $1")
        .bind(recipe_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    log::info!("Deleted recipe {recipe_id}");
    Ok(())
}

/// Loads a recipe for writing. Only its author may change it.
async fn get_recipe_mut(
    recipe_id: Id,
    editor: Id,
    conn: &mut SqliteConnection,
) -> Result<Recipe, Error> {
    let recipe: Option<Recipe> = sqlx::query_as("SELECT * FROM recipes WHERE id = $1")
        .bind(recipe_id)
        .fetch_optional(&mut *conn)
        .await?;

    match recipe {
        Some(recipe) if recipe.author_id == editor => Ok(recipe),
        Some(_) => {
            log::debug!("User {editor} may not modify recipe {recipe_id}");
            Err(Error::PermissionDenied)
        }
        None => Err(Error::NotFound("recipe")),
    }
}

async fn ensure_references(draft: &RecipeDraft, conn: &mut SqliteConnection) -> Result<(), Error> {
    let ingredient_ids: Vec<Id> = draft.ingredients.iter().map(|line| line.id).collect();

    let mut query: QueryBuilder<Sqlite> =
        QueryBuilder::new("SELECT id FROM ingredients WHERE id IN (");
    let mut separated = query.separated(", ");
    for id in &ingredient_ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");

    let found: Vec<(Id,)> = query.build_query_as().fetch_all(&mut *conn).await?;
    if found.len() != ingredient_ids.len() {
        return Err(Error::NotFound("ingredient"));
    }

    ensure_tags_exist(&draft.tag_ids(), conn).await
}

/// Drops every association row of the recipe and rebuilds them from the draft. Must run inside
/// the caller's transaction so readers never see the recipe half rebuilt.
async fn replace_composition(
    recipe_id: Id,
    draft: &RecipeDraft,
    conn: &mut SqliteConnection,
) -> Result<(), Error> {
    sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
        .bind(recipe_id)
        .execute(&mut *conn)
        .await?;

    let mut query: QueryBuilder<Sqlite> =
        QueryBuilder::new("INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount) ");
    query.push_values(&draft.ingredients, |mut b, line| {
        b.push_bind(recipe_id)
            .push_bind(line.id)
            .push_bind(line.amount);
    });
    query.build().execute(&mut *conn).await?;

    set_recipe_tags(recipe_id, &draft.tag_ids(), conn).await
}

pub async fn get_recipe(id: Id, pool: &Pool<Sqlite>) -> Result<Option<Recipe>, Error> {
    let row: Option<Recipe> = sqlx::query_as("SELECT * FROM recipes WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

pub async fn get_recipe_summary(id: Id, pool: &Pool<Sqlite>) -> Result<RecipeSummary, Error> {
    let row: Option<RecipeSummary> =
        sqlx::query_as("SELECT id, name, image, cooking_time FROM recipes WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;

    row.ok_or(Error::NotFound("recipe"))
}

pub async fn list_recipe_parts(recipe_id: Id, pool: &Pool<Sqlite>) -> Result<Vec<RecipePart>, Error> {
    let rows: Vec<RecipePart> = sqlx::query_as(
        "
        SELECT i.id AS id, i.name AS name, i.measurement_unit AS measurement_unit, ri.amount AS amount
        FROM recipe_ingredients ri
        INNER JOIN ingredients i ON i.id = ri.ingredient_id
        WHERE ri.recipe_id = $1
        ORDER BY ri.id
    ",
    )
    .bind(recipe_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn get_recipe_view(
    id: Id,
    viewer: Option<Id>,
    pool: &Pool<Sqlite>,
) -> Result<RecipeView, Error> {
    let recipe = get_recipe(id, pool).await?.ok_or(Error::NotFound("recipe"))?;
    recipe_view(recipe, viewer, pool).await
}

async fn recipe_view(
    recipe: Recipe,
    viewer: Option<Id>,
    pool: &Pool<Sqlite>,
) -> Result<RecipeView, Error> {
    let author = get_user(recipe.author_id, pool)
        .await?
        .ok_or(Error::NotFound("user"))?;

    Ok(RecipeView {
        author: author_profile(author, viewer, pool).await?,
        tags: list_recipe_tags(recipe.id, pool).await?,
        ingredients: list_recipe_parts(recipe.id, pool).await?,
        is_favorited: exists(EdgeKind::Favorite, viewer, recipe.id, pool).await?,
        is_in_shopping_cart: exists(EdgeKind::Cart, viewer, recipe.id, pool).await?,
        id: recipe.id,
        name: recipe.name,
        text: recipe.text,
        cooking_time: recipe.cooking_time,
        image: recipe.image,
        pub_date: recipe.pub_date,
    })
}

/// Newest first. The favorite and cart filters are relative to `viewer`; an anonymous viewer
/// asking for either gets an empty page.
pub async fn fetch_recipes(
    filter: &RecipeFilter,
    viewer: Option<Id>,
    offset: i64,
    pool: &Pool<Sqlite>,
) -> Result<PageContext<RecipeView>, Error> {
    let mut query: QueryBuilder<Sqlite> =
        QueryBuilder::new("SELECT r.*, COUNT(*) OVER() AS count FROM recipes r WHERE 1 = 1");

    if let Some(author) = filter.author {
        query.push(" AND r.author_id = ").push_bind(author);
    }

    if !filter.tags.is_empty() {
        query.push(
            " AND EXISTS (SELECT 1 FROM recipe_tags rt INNER JOIN tags t ON t.id = rt.tag_id WHERE rt.recipe_id = r.id AND t.slug IN (",
        );
        let mut separated = query.separated(", ");
        for slug in &filter.tags {
            separated.push_bind(slug.clone());
        }
        separated.push_unseparated("))");
    }

    for (enabled, kind) in [
        (filter.is_favorited, EdgeKind::Favorite),
        (filter.is_in_shopping_cart, EdgeKind::Cart),
    ] {
        if !enabled {
            continue;
        }
        let Some(viewer) = viewer else {
            return Ok(PageContext::no_rows());
        };
        query
            .push(format!(
                " AND EXISTS (SELECT 1 FROM {} e WHERE e.recipe_id = r.id AND e.user_id = ",
                kind.table()
            ))
            .push_bind(viewer)
            .push(")");
    }

    if let Some(name) = &filter.name {
        query
            .push(" AND r.name_search LIKE ")
            .push_bind(like_prefix(&name.to_lowercase()))
            .push(" ESCAPE '\\'");
    }

    query
        .push(" ORDER BY r.pub_date DESC, r.id DESC LIMIT ")
        .push_bind(RECIPE_COUNT_PER_PAGE)
        .push(" OFFSET ")
        .push_bind(offset);

    let rows: Vec<RecipeRow> = query.build_query_as().fetch_all(pool).await?;
    let total_count = rows.first().map(|row| row.count).unwrap_or(0);

    let mut views = Vec::with_capacity(rows.len());
    for row in rows {
        views.push(recipe_view(row.recipe, viewer, pool).await?);
    }

    Ok(PageContext::from_rows(
        views,
        total_count,
        RECIPE_COUNT_PER_PAGE,
        offset,
    ))
}

pub async fn list_recipes_by_author(
    author_id: Id,
    limit: Option<i64>,
    pool: &Pool<Sqlite>,
) -> Result<Vec<RecipeSummary>, Error> {
    let rows: Vec<RecipeSummary> = sqlx::query_as(
        "
        SELECT id, name, image, cooking_time FROM recipes
        WHERE author_id = $1
        ORDER BY pub_date DESC, id DESC
        LIMIT $2
    ",
    )
    .bind(author_id)
    .bind(limit.unwrap_or(-1))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn count_recipes_by_author(author_id: Id, pool: &Pool<Sqlite>) -> Result<i64, Error> {
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM recipes WHERE author_id = $1")
        .bind(author_id)
        .fetch_one(pool)
        .await?;

    Ok(count.0)
}
