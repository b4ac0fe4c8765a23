//! Recipe cost aggregation.
//!
//! A recipe's `cost` is a snapshot: the sum of `quantity * cost_per_unit` over its
//! links at the time the recipe was last saved. It is recomputed in full on every
//! write, never patched incrementally.

use ::entity::{ingredient, recipe_ingredient};
use sea_orm::*;
use tracing::{debug, warn};

/// A link together with the ingredient it points at, if that ingredient still exists.
pub type ResolvedLink = (recipe_ingredient::Model, Option<ingredient::Model>);

/// Loads the links of a recipe with their ingredients resolved, oldest link first.
pub async fn resolved_links<C>(db: &C, recipe_id: i32) -> Result<Vec<ResolvedLink>, DbErr>
where
    C: ConnectionTrait,
{
    recipe_ingredient::Entity::find()
        .filter(recipe_ingredient::Column::RecipeId.eq(recipe_id))
        .find_also_related(ingredient::Entity)
        .order_by_asc(recipe_ingredient::Column::Id)
        .all(db)
        .await
}

/// Recomputes the total ingredient cost of a recipe from its current links.
///
/// Has no side effects; persisting the result is up to the caller. A recipe with no
/// links, or whose links all fail to resolve, costs zero.
pub async fn recipe_cost<C>(db: &C, recipe_id: i32) -> Result<f64, DbErr>
where
    C: ConnectionTrait,
{
    let links = resolved_links(db, recipe_id).await?;
    let total = sum_link_costs(&links);
    debug!(recipe_id, links = links.len(), total, "recomputed recipe cost");
    Ok(total)
}

/// Sums `quantity * cost_per_unit`. Links to a missing ingredient, or to one without a
/// usable unit cost, contribute nothing and are reported with `warn!`.
pub fn sum_link_costs(links: &[ResolvedLink]) -> f64 {
    links
        .iter()
        .map(|(link, ingredient)| match ingredient {
            Some(ingredient) if ingredient.cost_per_unit.is_finite() => {
                link.quantity * ingredient.cost_per_unit
            }
            Some(ingredient) => {
                warn!(
                    recipe_id = link.recipe_id,
                    ingredient_id = ingredient.id,
                    "ingredient has no usable unit cost; skipped in recipe cost"
                );
                0.0
            }
            None => {
                warn!(
                    recipe_id = link.recipe_id,
                    ingredient_id = link.ingredient_id,
                    "recipe links to a missing ingredient; skipped in recipe cost"
                );
                0.0
            }
        })
        .sum()
}
