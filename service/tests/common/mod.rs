#![allow(dead_code)]

use std::time::Duration;

use entity::{ingredient, recipe::RecipeStatus};
use migration::{Migrator, MigratorTrait};
use recipe_costing_service::{
    AuthContext, IngredientInput, IngredientLine, Mutation, RecipeInput, Role,
    sea_orm::{Database, DatabaseConnection, SqlxSqliteConnector},
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tempfile::TempDir;

pub async fn setup() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

/// A file-backed database with several pooled connections, so transactions on
/// different connections really overlap. Keep the directory alive for the test.
pub async fn setup_pooled() -> (TempDir, DatabaseConnection) {
    let dir = tempfile::tempdir().unwrap();
    let options = SqliteConnectOptions::new()
        .filename(dir.path().join("recipes.db"))
        .create_if_missing(true)
        .busy_timeout(Duration::from_secs(10));
    let pool = SqlitePoolOptions::new()
        .max_connections(4)
        .connect_with(options)
        .await
        .unwrap();

    let db = SqlxSqliteConnector::from_sqlx_sqlite_pool(pool);
    Migrator::up(&db, None).await.unwrap();
    (dir, db)
}

pub fn manager() -> AuthContext {
    AuthContext::new(1, Role::Manager)
}

pub fn server_staff() -> AuthContext {
    AuthContext::new(2, Role::Server)
}

pub fn inventory_staff() -> AuthContext {
    AuthContext::new(3, Role::Inventory)
}

pub fn ingredient_input(name: &str, cost_per_unit: f64) -> IngredientInput {
    IngredientInput {
        name: name.to_owned(),
        unit: "kg".to_owned(),
        category: "Produce".to_owned(),
        supplier: "Harbour Wholesale".to_owned(),
        current_stock: 20.0,
        min_level: 5.0,
        max_level: 40.0,
        cost_per_unit,
    }
}

pub async fn seed_ingredient(
    db: &DatabaseConnection,
    name: &str,
    cost_per_unit: f64,
) -> ingredient::Model {
    Mutation::create_ingredient(db, &manager(), ingredient_input(name, cost_per_unit))
        .await
        .expect("could not insert ingredient")
}

pub fn line(ingredient: &ingredient::Model, quantity: f64) -> IngredientLine {
    IngredientLine {
        ingredient: ingredient.id,
        quantity,
    }
}

pub fn recipe_input(name: &str, ingredients: Option<Vec<IngredientLine>>) -> RecipeInput {
    RecipeInput {
        name: name.to_owned(),
        category: "Mains".to_owned(),
        servings: 2,
        prep_time: 15,
        cook_time: 30,
        instructions: "Prepare, cook, plate.".to_owned(),
        price: 18.0,
        status: RecipeStatus::Active,
        ingredients,
        version: None,
    }
}
