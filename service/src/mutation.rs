use ::entity::{ingredient, recipe, recipe_ingredient};
use sea_orm::sea_query::Expr;
use sea_orm::*;
use tracing::{info, instrument};

use crate::{
    Action, AuthContext, IngredientInput, RecipeInput, ServiceError, ServiceResult,
    StockAdjustment, cost, links,
};

pub struct Mutation;

impl Mutation {
    /// Creates a recipe with its initial ingredient list and stores the computed cost.
    #[instrument(skip_all, fields(user_id = auth.user_id))]
    pub async fn create_recipe(
        db: &DbConn,
        auth: &AuthContext,
        form_data: RecipeInput,
    ) -> ServiceResult<recipe::Model> {
        auth.authorize(Action::WriteRecipes)?;
        form_data.validate()?;

        let txn = db.begin().await?;

        let recipe = recipe::ActiveModel {
            name: Set(form_data.name.trim().to_owned()),
            category: Set(form_data.category.trim().to_owned()),
            servings: Set(form_data.servings),
            prep_time: Set(form_data.prep_time),
            cook_time: Set(form_data.cook_time),
            instructions: Set(form_data.instructions),
            cost: Set(0.0),
            price: Set(form_data.price),
            status: Set(form_data.status),
            created_by: Set(auth.user_id),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        if let Some(lines) = &form_data.ingredients {
            links::replace_links(&txn, recipe.id, lines).await?;
        }
        let recipe = store_cost(&txn, recipe).await?;

        txn.commit().await?;

        info!(recipe_id = recipe.id, cost = recipe.cost, "created recipe");
        Ok(recipe)
    }

    /// Updates a recipe's attributes, replaces its ingredient list when one is given,
    /// and stores the recomputed cost, all in one transaction.
    ///
    /// The row is written with a `version` guard first, so a concurrent writer either
    /// waits for this one or fails with [`ServiceError::Conflict`].
    #[instrument(skip_all, fields(user_id = auth.user_id, recipe_id = id))]
    pub async fn update_recipe_by_id(
        db: &DbConn,
        auth: &AuthContext,
        id: i32,
        form_data: RecipeInput,
    ) -> ServiceResult<recipe::Model> {
        auth.authorize(Action::WriteRecipes)?;
        form_data.validate()?;

        let txn = db.begin().await?;

        // The guarded UPDATE is the transaction's first statement, so it takes the write
        // lock before anything is read and a racing writer queues behind it.
        let mut update = recipe::Entity::update_many()
            .col_expr(recipe::Column::Name, Expr::value(form_data.name.trim()))
            .col_expr(recipe::Column::Category, Expr::value(form_data.category.trim()))
            .col_expr(recipe::Column::Servings, Expr::value(form_data.servings))
            .col_expr(recipe::Column::PrepTime, Expr::value(form_data.prep_time))
            .col_expr(recipe::Column::CookTime, Expr::value(form_data.cook_time))
            .col_expr(
                recipe::Column::Instructions,
                Expr::value(form_data.instructions.as_str()),
            )
            .col_expr(recipe::Column::Price, Expr::value(form_data.price))
            .col_expr(recipe::Column::Status, Expr::value(form_data.status))
            .col_expr(
                recipe::Column::Version,
                Expr::col(recipe::Column::Version).add(1),
            )
            .filter(recipe::Column::Id.eq(id));
        if let Some(expected) = form_data.version {
            update = update.filter(recipe::Column::Version.eq(expected));
        }
        let res = update.exec(&txn).await?;

        if res.rows_affected == 0 {
            let current = recipe::Entity::find_by_id(id)
                .one(&txn)
                .await?
                .ok_or_else(|| ServiceError::recipe_not_found(id))?;
            return Err(match form_data.version {
                Some(expected) => stale_version(id, expected, current.version),
                None => ServiceError::Conflict(format!("recipe {id} was modified concurrently")),
            });
        }

        if let Some(lines) = &form_data.ingredients {
            links::replace_links(&txn, id, lines).await?;
        }

        let recipe = recipe::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::recipe_not_found(id))?;
        let recipe = store_cost(&txn, recipe).await?;

        txn.commit().await?;

        info!(
            version = recipe.version,
            cost = recipe.cost,
            "updated recipe"
        );
        Ok(recipe)
    }

    /// Deletes a recipe and every link it owns.
    #[instrument(skip_all, fields(user_id = auth.user_id, recipe_id = id))]
    pub async fn delete_recipe(db: &DbConn, auth: &AuthContext, id: i32) -> ServiceResult<()> {
        auth.authorize(Action::WriteRecipes)?;

        let txn = db.begin().await?;

        let removed = links::delete_links(&txn, id).await?;
        let res = recipe::Entity::delete_by_id(id).exec(&txn).await?;
        if res.rows_affected == 0 {
            return Err(ServiceError::recipe_not_found(id));
        }

        txn.commit().await?;

        info!(links = removed, "deleted recipe");
        Ok(())
    }

    #[instrument(skip_all, fields(user_id = auth.user_id))]
    pub async fn create_ingredient(
        db: &DbConn,
        auth: &AuthContext,
        form_data: IngredientInput,
    ) -> ServiceResult<ingredient::Model> {
        auth.authorize(Action::WriteIngredients)?;
        form_data.validate()?;

        let ingredient = ingredient::ActiveModel {
            name: Set(form_data.name.trim().to_owned()),
            unit: Set(form_data.unit.trim().to_owned()),
            category: Set(form_data.category.trim().to_owned()),
            supplier: Set(form_data.supplier.trim().to_owned()),
            current_stock: Set(form_data.current_stock),
            min_level: Set(form_data.min_level),
            max_level: Set(form_data.max_level),
            cost_per_unit: Set(form_data.cost_per_unit),
            ..Default::default()
        }
        .insert(db)
        .await?;

        info!(ingredient_id = ingredient.id, "created ingredient");
        Ok(ingredient)
    }

    /// Replaces an ingredient's attributes.
    ///
    /// Recipes that use it keep their stored cost until they are next saved.
    #[instrument(skip_all, fields(user_id = auth.user_id, ingredient_id = id))]
    pub async fn update_ingredient_by_id(
        db: &DbConn,
        auth: &AuthContext,
        id: i32,
        form_data: IngredientInput,
    ) -> ServiceResult<ingredient::Model> {
        auth.authorize(Action::WriteIngredients)?;
        form_data.validate()?;

        let ingredient: ingredient::ActiveModel = ingredient::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::ingredient_not_found(id))?
            .into();

        let ingredient = ingredient::ActiveModel {
            id: ingredient.id,
            name: Set(form_data.name.trim().to_owned()),
            unit: Set(form_data.unit.trim().to_owned()),
            category: Set(form_data.category.trim().to_owned()),
            supplier: Set(form_data.supplier.trim().to_owned()),
            current_stock: Set(form_data.current_stock),
            min_level: Set(form_data.min_level),
            max_level: Set(form_data.max_level),
            cost_per_unit: Set(form_data.cost_per_unit),
            created_at: ingredient.created_at,
            updated_at: ingredient.updated_at,
        }
        .update(db)
        .await?;

        info!("updated ingredient");
        Ok(ingredient)
    }

    /// Adds `delta` (which may be negative) to the ingredient's current stock.
    #[instrument(skip_all, fields(user_id = auth.user_id, ingredient_id = id))]
    pub async fn adjust_ingredient_stock(
        db: &DbConn,
        auth: &AuthContext,
        id: i32,
        adjustment: StockAdjustment,
    ) -> ServiceResult<ingredient::Model> {
        auth.authorize(Action::WriteIngredients)?;
        if !adjustment.delta.is_finite() {
            return Err(ServiceError::Validation(
                "delta must be a finite number".to_owned(),
            ));
        }

        let txn = db.begin().await?;

        let current = ingredient::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::ingredient_not_found(id))?;

        let stock = current.current_stock + adjustment.delta;
        if stock < 0.0 {
            return Err(ServiceError::Validation(format!(
                "only {} {} of {} in stock",
                current.current_stock, current.unit, current.name
            )));
        }

        let mut ingredient: ingredient::ActiveModel = current.into();
        ingredient.current_stock = Set(stock);
        let ingredient = ingredient.update(&txn).await?;

        txn.commit().await?;

        info!(delta = adjustment.delta, stock, "adjusted ingredient stock");
        Ok(ingredient)
    }

    /// Deletes an ingredient no recipe uses any more.
    #[instrument(skip_all, fields(user_id = auth.user_id, ingredient_id = id))]
    pub async fn delete_ingredient(db: &DbConn, auth: &AuthContext, id: i32) -> ServiceResult<()> {
        auth.authorize(Action::WriteIngredients)?;

        let txn = db.begin().await?;

        let ingredient = ingredient::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::ingredient_not_found(id))?;

        let used_by = recipe_ingredient::Entity::find()
            .filter(recipe_ingredient::Column::IngredientId.eq(id))
            .count(&txn)
            .await?;
        if used_by > 0 {
            return Err(ServiceError::Conflict(format!(
                "ingredient {id} is used by {used_by} recipe line(s)"
            )));
        }

        ingredient.delete(&txn).await?;
        txn.commit().await?;

        info!("deleted ingredient");
        Ok(())
    }
}

/// Recomputes the recipe's cost from its links and writes it back. A total that
/// overflows `f64` fails the write, and the caller's transaction rolls back with it.
async fn store_cost<C>(db: &C, recipe: recipe::Model) -> ServiceResult<recipe::Model>
where
    C: ConnectionTrait,
{
    let total = cost::recipe_cost(db, recipe.id).await?;
    if !total.is_finite() {
        return Err(ServiceError::Validation(format!(
            "ingredient cost of `{}` is too large to store",
            recipe.name
        )));
    }
    let mut recipe: recipe::ActiveModel = recipe.into();
    recipe.cost = Set(total);
    Ok(recipe.update(db).await?)
}

fn stale_version(id: i32, expected: i32, actual: i32) -> ServiceError {
    ServiceError::Conflict(format!(
        "recipe {id} is at version {actual}, not {expected}"
    ))
}
