use ::entity::{ingredient, recipe, recipe_ingredient};
use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::*;
use serde::Serialize;

use crate::{IngredientFilter, RecipeFilter, ServiceError, ServiceResult, cost};

/// A recipe with its ingredient lines resolved.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RecipeDetail {
    pub recipe: recipe::Model,
    pub margin: f64,
    pub ingredients: Vec<RecipeLine>,
}

/// `ingredient` is `None` when the link points at a row that no longer exists.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RecipeLine {
    pub id: i32,
    pub quantity: f64,
    pub ingredient: Option<ingredient::Model>,
}

pub struct Query;

impl Query {
    pub async fn find_recipe_by_id(db: &DbConn, id: i32) -> Result<Option<recipe::Model>, DbErr> {
        recipe::Entity::find_by_id(id).one(db).await
    }

    /// If ok, returns (recipe models, total matching recipes). Newest recipes come first.
    /// Pages past [`MAX_PAGE`](crate::MAX_PAGE) are rejected.
    pub async fn find_recipes_in_page(
        db: &DbConn,
        filter: &RecipeFilter,
    ) -> ServiceResult<(Vec<recipe::Model>, u64)> {
        filter.validate()?;

        let mut select = recipe::Entity::find();

        if let Some(term) = filter.search_term() {
            let pattern = format!("%{}%", escape_like(&term.to_lowercase()));
            select = select.filter(
                Expr::expr(Func::lower(Expr::col(recipe::Column::Name)))
                    .like(LikeExpr::new(pattern).escape('\\')),
            );
        }
        if let Some(category) = &filter.category {
            select = select.filter(recipe::Column::Category.eq(category.as_str()));
        }
        if let Some(status) = filter.status {
            select = select.filter(recipe::Column::Status.eq(status));
        }

        // Setup paginator
        let paginator = select
            .order_by_desc(recipe::Column::CreatedAt)
            .order_by_desc(recipe::Column::Id)
            .paginate(db, filter.limit());
        let total = paginator.num_items().await?;

        // Fetch paginated recipes
        let recipes = paginator.fetch_page(filter.page() - 1).await?;
        Ok((recipes, total))
    }

    pub async fn find_recipe_with_ingredients(db: &DbConn, id: i32) -> ServiceResult<RecipeDetail> {
        let recipe = Self::find_recipe_by_id(db, id)
            .await?
            .ok_or_else(|| ServiceError::recipe_not_found(id))?;

        let ingredients = cost::resolved_links(db, id)
            .await?
            .into_iter()
            .map(|(link, ingredient)| RecipeLine {
                id: link.id,
                quantity: link.quantity,
                ingredient,
            })
            .collect();

        Ok(RecipeDetail {
            margin: recipe.margin(),
            recipe,
            ingredients,
        })
    }

    pub async fn find_recipe_links(
        db: &DbConn,
        recipe_id: i32,
    ) -> Result<Vec<recipe_ingredient::Model>, DbErr> {
        recipe_ingredient::Entity::find()
            .filter(recipe_ingredient::Column::RecipeId.eq(recipe_id))
            .order_by_asc(recipe_ingredient::Column::Id)
            .all(db)
            .await
    }

    pub async fn find_ingredient_by_id(
        db: &DbConn,
        id: i32,
    ) -> Result<Option<ingredient::Model>, DbErr> {
        ingredient::Entity::find_by_id(id).one(db).await
    }

    /// Ingredients ordered by name. The stock level is derived, so it is filtered here
    /// rather than in SQL.
    pub async fn find_ingredients(
        db: &DbConn,
        filter: &IngredientFilter,
    ) -> Result<Vec<ingredient::Model>, DbErr> {
        let mut select = ingredient::Entity::find();
        if let Some(category) = &filter.category {
            select = select.filter(ingredient::Column::Category.eq(category.as_str()));
        }

        let ingredients = select
            .order_by_asc(ingredient::Column::Name)
            .order_by_asc(ingredient::Column::Id)
            .all(db)
            .await?;

        Ok(match filter.stock {
            Some(level) => ingredients
                .into_iter()
                .filter(|ingredient| ingredient.stock_level() == level)
                .collect(),
            None => ingredients,
        })
    }
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
