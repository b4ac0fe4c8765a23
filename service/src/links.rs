//! Keeps a recipe's link rows in step with the ingredient list it was last given.

use std::collections::BTreeSet;

use ::entity::{ingredient, recipe_ingredient};
use sea_orm::*;
use tracing::debug;

use crate::{IngredientLine, ServiceError, ServiceResult};

/// Replaces every link of `recipe_id` with one row per line.
///
/// This is a full replace, not a merge: link rows for unchanged lines are recreated.
/// Every referenced ingredient must exist, otherwise nothing is written. Meant to run
/// inside the caller's transaction, together with the cost recompute that follows it.
pub async fn replace_links<C>(db: &C, recipe_id: i32, lines: &[IngredientLine]) -> ServiceResult<()>
where
    C: ConnectionTrait,
{
    ensure_ingredients_exist(db, lines).await?;

    let removed = delete_links(db, recipe_id).await?;

    for line in lines {
        recipe_ingredient::ActiveModel {
            recipe_id: Set(recipe_id),
            ingredient_id: Set(line.ingredient),
            quantity: Set(line.quantity),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }

    debug!(
        recipe_id,
        removed,
        inserted = lines.len(),
        "replaced recipe links"
    );
    Ok(())
}

/// Removes every link of `recipe_id`, returning how many went.
pub async fn delete_links<C>(db: &C, recipe_id: i32) -> Result<u64, DbErr>
where
    C: ConnectionTrait,
{
    recipe_ingredient::Entity::delete_many()
        .filter(recipe_ingredient::Column::RecipeId.eq(recipe_id))
        .exec(db)
        .await
        .map(|res| res.rows_affected)
}

async fn ensure_ingredients_exist<C>(db: &C, lines: &[IngredientLine]) -> ServiceResult<()>
where
    C: ConnectionTrait,
{
    let wanted: BTreeSet<i32> = lines.iter().map(|line| line.ingredient).collect();
    if wanted.is_empty() {
        return Ok(());
    }

    let found: BTreeSet<i32> = ingredient::Entity::find()
        .select_only()
        .column(ingredient::Column::Id)
        .filter(ingredient::Column::Id.is_in(wanted.iter().copied()))
        .into_tuple::<i32>()
        .all(db)
        .await?
        .into_iter()
        .collect();

    match wanted.difference(&found).next() {
        Some(&missing) => Err(ServiceError::ingredient_not_found(missing)),
        None => Ok(()),
    }
}
