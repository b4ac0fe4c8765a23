//! SeaORM entities for the recipe costing schema.
//!
//! Three tables make up the model:
//!
//! - [`ingredient`]: reference data, shared by many recipes
//! - [`recipe`]: the aggregate root; its `cost` column is derived
//! - [`recipe_ingredient`]: the join rows linking a recipe to the ingredients it uses
//!
//! A recipe owns its links (cascade delete). An ingredient is only ever referenced.

pub mod prelude;

pub mod ingredient;
pub mod recipe;
pub mod recipe_ingredient;

mod timestamps;
