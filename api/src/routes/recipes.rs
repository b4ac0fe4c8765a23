use axum::{Json, extract::State, http::StatusCode};
use entity::recipe;
use recipe_costing_service::{Mutation, Query, RecipeDetail, RecipeFilter, RecipeInput};
use serde::Serialize;

use super::Message;
use crate::{
    ApiResult, AppState, Caller,
    extract::{Body, Id, Params},
};

#[derive(Serialize)]
pub struct RecipePage {
    recipes: Vec<recipe::Model>,
    total: u64,
}

#[derive(Serialize)]
pub struct RecipeBody {
    recipe: recipe::Model,
}

pub async fn list_recipes(
    State(state): State<AppState>,
    Params(filter): Params<RecipeFilter>,
) -> ApiResult<Json<RecipePage>> {
    let (recipes, total) = Query::find_recipes_in_page(&state.conn, &filter).await?;

    Ok(Json(RecipePage { recipes, total }))
}

pub async fn get_recipe(
    State(state): State<AppState>,
    Id(id): Id<i32>,
) -> ApiResult<Json<RecipeDetail>> {
    Ok(Json(Query::find_recipe_with_ingredients(&state.conn, id).await?))
}

pub async fn create_recipe(
    State(state): State<AppState>,
    Caller(auth): Caller,
    Body(form): Body<RecipeInput>,
) -> ApiResult<(StatusCode, Json<RecipeBody>)> {
    let recipe = Mutation::create_recipe(&state.conn, &auth, form).await?;

    Ok((StatusCode::CREATED, Json(RecipeBody { recipe })))
}

pub async fn update_recipe(
    State(state): State<AppState>,
    Caller(auth): Caller,
    Id(id): Id<i32>,
    Body(form): Body<RecipeInput>,
) -> ApiResult<Json<RecipeBody>> {
    let recipe = Mutation::update_recipe_by_id(&state.conn, &auth, id, form).await?;

    Ok(Json(RecipeBody { recipe }))
}

pub async fn delete_recipe(
    State(state): State<AppState>,
    Caller(auth): Caller,
    Id(id): Id<i32>,
) -> ApiResult<Json<Message>> {
    Mutation::delete_recipe(&state.conn, &auth, id).await?;

    Ok(Json(Message {
        message: "Recipe deleted",
    }))
}
