use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::error;

use crate::AppState;

mod ingredients;
mod recipes;

/// Body of responses that carry nothing but a confirmation.
#[derive(Serialize)]
pub struct Message {
    pub message: &'static str,
}

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/recipes",
            get(recipes::list_recipes).post(recipes::create_recipe),
        )
        .route(
            "/recipes/{id}",
            get(recipes::get_recipe)
                .put(recipes::update_recipe)
                .delete(recipes::delete_recipe),
        )
        .route(
            "/ingredients",
            get(ingredients::list_ingredients).post(ingredients::create_ingredient),
        )
        .route(
            "/ingredients/{id}",
            get(ingredients::get_ingredient)
                .put(ingredients::update_ingredient)
                .delete(ingredients::delete_ingredient),
        )
        .route("/ingredients/{id}/stock", post(ingredients::adjust_stock))
}

pub async fn banner() -> &'static str {
    "Restaurant Recipe Management API"
}

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match state.conn.ping().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ok" }))),
        Err(err) => {
            error!("database ping failed: {err}");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable" })),
            )
        }
    }
}
