use axum::{Json, extract::State, http::StatusCode};
use entity::ingredient::{self, StockLevel};
use recipe_costing_service::{
    IngredientFilter, IngredientInput, Mutation, Query, ServiceError, StockAdjustment,
};
use serde::Serialize;

use super::Message;
use crate::{
    ApiResult, AppState, Caller,
    extract::{Body, Id, Params},
};

/// An ingredient as sent to clients, with its derived stock level.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientView {
    #[serde(flatten)]
    ingredient: ingredient::Model,
    stock_level: StockLevel,
}

impl From<ingredient::Model> for IngredientView {
    fn from(ingredient: ingredient::Model) -> Self {
        Self {
            stock_level: ingredient.stock_level(),
            ingredient,
        }
    }
}

#[derive(Serialize)]
pub struct IngredientList {
    ingredients: Vec<IngredientView>,
}

#[derive(Serialize)]
pub struct IngredientBody {
    ingredient: IngredientView,
}

impl From<ingredient::Model> for IngredientBody {
    fn from(ingredient: ingredient::Model) -> Self {
        Self {
            ingredient: ingredient.into(),
        }
    }
}

pub async fn list_ingredients(
    State(state): State<AppState>,
    Params(filter): Params<IngredientFilter>,
) -> ApiResult<Json<IngredientList>> {
    let ingredients = Query::find_ingredients(&state.conn, &filter)
        .await?
        .into_iter()
        .map(IngredientView::from)
        .collect();

    Ok(Json(IngredientList { ingredients }))
}

pub async fn get_ingredient(
    State(state): State<AppState>,
    Id(id): Id<i32>,
) -> ApiResult<Json<IngredientBody>> {
    let ingredient = Query::find_ingredient_by_id(&state.conn, id)
        .await?
        .ok_or(ServiceError::NotFound {
            entity: "ingredient",
            id,
        })?;

    Ok(Json(ingredient.into()))
}

pub async fn create_ingredient(
    State(state): State<AppState>,
    Caller(auth): Caller,
    Body(form): Body<IngredientInput>,
) -> ApiResult<(StatusCode, Json<IngredientBody>)> {
    let ingredient = Mutation::create_ingredient(&state.conn, &auth, form).await?;

    Ok((StatusCode::CREATED, Json(ingredient.into())))
}

pub async fn update_ingredient(
    State(state): State<AppState>,
    Caller(auth): Caller,
    Id(id): Id<i32>,
    Body(form): Body<IngredientInput>,
) -> ApiResult<Json<IngredientBody>> {
    let ingredient = Mutation::update_ingredient_by_id(&state.conn, &auth, id, form).await?;

    Ok(Json(ingredient.into()))
}

pub async fn adjust_stock(
    State(state): State<AppState>,
    Caller(auth): Caller,
    Id(id): Id<i32>,
    Body(adjustment): Body<StockAdjustment>,
) -> ApiResult<Json<IngredientBody>> {
    let ingredient = Mutation::adjust_ingredient_stock(&state.conn, &auth, id, adjustment).await?;

    Ok(Json(ingredient.into()))
}

pub async fn delete_ingredient(
    State(state): State<AppState>,
    Caller(auth): Caller,
    Id(id): Id<i32>,
) -> ApiResult<Json<Message>> {
    Mutation::delete_ingredient(&state.conn, &auth, id).await?;

    Ok(Json(Message {
        message: "Ingredient deleted",
    }))
}
