use std::collections::HashMap;

use sqlx::{Pool, Sqlite};

use crate::{
    error::{Error, ValidationError},
    schema::{Id, MeasurementUnit, ShoppingList, ShoppingListLine},
};

/// Sums every ingredient line of every recipe in the user's cart. Lines are merged by
/// ingredient name and unit, not by ingredient id, so catalog duplicates collapse into one
/// entry. Entries keep the order in which they were first met: cart order, then the order of
/// lines within each recipe.
pub async fn compile_shopping_list(user_id: Id, pool: &Pool<Sqlite>) -> Result<ShoppingList, Error> {
    let parts: Vec<ShoppingListLine> = sqlx::query_as(
        "
        SELECT i.name AS name, ri.amount AS amount, i.measurement_unit AS measurement_unit
        FROM shopping_cart c
        INNER JOIN recipe_ingredients ri ON ri.recipe_id = c.recipe_id
        INNER JOIN ingredients i ON i.id = ri.ingredient_id
        WHERE c.user_id = $1
        ORDER BY c.id, ri.id
    ",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    let list = aggregate(parts)?;
    log::debug!("Compiled {} shopping list entries for user {user_id}", list.len());

    Ok(list)
}

/// Fails with `AmountOverflow` when a running total no longer fits in an `i64`.
pub fn aggregate<I>(parts: I) -> Result<ShoppingList, ValidationError>
where
    I: IntoIterator<Item = ShoppingListLine>,
{
    let mut lines: Vec<ShoppingListLine> = vec![];
    let mut index: HashMap<(String, MeasurementUnit), usize> = HashMap::new();

    for part in parts {
        match index.get(&(part.name.clone(), part.measurement_unit)) {
            Some(&i) => {
                let line = &mut lines[i];
                line.amount = line
                    .amount
                    .checked_add(part.amount)
                    .ok_or_else(|| ValidationError::AmountOverflow(part.name.clone()))?;
            }
            None => {
                index.insert((part.name.clone(), part.measurement_unit), lines.len());
                lines.push(part);
            }
        }
    }

    Ok(ShoppingList { lines })
}
