mod common;

use common::*;
use entity::{recipe, recipe::RecipeStatus};
use pretty_assertions::assert_eq;
use recipe_costing_service::{
    Mutation, Query, RecipeInput, ServiceError,
    sea_orm::EntityTrait,
};

#[tokio::test]
async fn create_recipe_stores_ingredient_cost() {
    let db = &setup().await;
    let rice = seed_ingredient(db, "Rice", 1.50).await;
    let prawns = seed_ingredient(db, "Prawns", 2.00).await;

    let recipe = Mutation::create_recipe(
        db,
        &manager(),
        recipe_input("Paella", Some(vec![line(&rice, 2.0), line(&prawns, 3.0)])),
    )
    .await
    .unwrap();

    assert_eq!(recipe.cost, 9.0);
    assert_eq!(recipe.version, 1);
    assert_eq!(recipe.created_by, 1);
    assert_eq!(recipe.status, RecipeStatus::Active);

    let stored = Query::find_recipe_by_id(db, recipe.id).await.unwrap().unwrap();
    assert_eq!(stored.cost, 9.0);
    assert_eq!(Query::find_recipe_links(db, recipe.id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn create_recipe_without_ingredients_costs_nothing() {
    let db = &setup().await;

    let recipe = Mutation::create_recipe(db, &manager(), recipe_input("Tap Water", None))
        .await
        .unwrap();

    assert_eq!(recipe.cost, 0.0);
    assert!(Query::find_recipe_links(db, recipe.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn update_replaces_links_and_recomputes_cost() {
    let db = &setup().await;
    let flour = seed_ingredient(db, "Flour", 0.75).await;
    let butter = seed_ingredient(db, "Butter", 6.00).await;
    let sugar = seed_ingredient(db, "Sugar", 1.25).await;

    let recipe = Mutation::create_recipe(
        db,
        &manager(),
        recipe_input("Shortbread", Some(vec![line(&flour, 1.0), line(&butter, 0.5)])),
    )
    .await
    .unwrap();
    assert_eq!(recipe.cost, 3.75);

    let updated = Mutation::update_recipe_by_id(
        db,
        &manager(),
        recipe.id,
        RecipeInput {
            price: 22.0,
            ..recipe_input("Sweet Shortbread", Some(vec![line(&sugar, 2.0)]))
        },
    )
    .await
    .unwrap();

    assert_eq!(updated.name, "Sweet Shortbread");
    assert_eq!(updated.price, 22.0);
    assert_eq!(updated.cost, 2.5);
    assert_eq!(updated.version, 2);
    assert_eq!(updated.created_at, recipe.created_at);

    let links = Query::find_recipe_links(db, recipe.id).await.unwrap();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].ingredient_id, sugar.id);
    assert_eq!(links[0].quantity, 2.0);
}

#[tokio::test]
async fn update_with_empty_list_zeroes_cost() {
    let db = &setup().await;
    let beef = seed_ingredient(db, "Beef", 12.0).await;

    let recipe = Mutation::create_recipe(
        db,
        &manager(),
        recipe_input("Steak", Some(vec![line(&beef, 0.4)])),
    )
    .await
    .unwrap();
    assert!(recipe.cost > 0.0);

    let updated = Mutation::update_recipe_by_id(
        db,
        &manager(),
        recipe.id,
        recipe_input("Steak", Some(vec![])),
    )
    .await
    .unwrap();

    assert_eq!(updated.cost, 0.0);
    assert!(Query::find_recipe_links(db, recipe.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn update_without_list_keeps_links_and_refreshes_cost() {
    let db = &setup().await;
    let saffron = seed_ingredient(db, "Saffron", 10.0).await;

    let recipe = Mutation::create_recipe(
        db,
        &manager(),
        recipe_input("Risotto", Some(vec![line(&saffron, 0.5)])),
    )
    .await
    .unwrap();
    assert_eq!(recipe.cost, 5.0);

    // price rise after the recipe was costed: the stored cost is a snapshot
    Mutation::update_ingredient_by_id(
        db,
        &manager(),
        saffron.id,
        ingredient_input("Saffron", 12.0),
    )
    .await
    .unwrap();
    let stale = Query::find_recipe_by_id(db, recipe.id).await.unwrap().unwrap();
    assert_eq!(stale.cost, 5.0);

    let refreshed =
        Mutation::update_recipe_by_id(db, &manager(), recipe.id, recipe_input("Risotto", None))
            .await
            .unwrap();

    assert_eq!(refreshed.cost, 6.0);
    assert_eq!(Query::find_recipe_links(db, recipe.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn repeated_identical_update_is_idempotent() {
    let db = &setup().await;
    let tomato = seed_ingredient(db, "Tomato", 0.5).await;
    let basil = seed_ingredient(db, "Basil", 3.0).await;
    let lines = vec![line(&tomato, 4.0), line(&basil, 0.25)];

    let recipe = Mutation::create_recipe(db, &manager(), recipe_input("Bruschetta", None))
        .await
        .unwrap();

    let first = Mutation::update_recipe_by_id(
        db,
        &manager(),
        recipe.id,
        recipe_input("Bruschetta", Some(lines.clone())),
    )
    .await
    .unwrap();
    let second = Mutation::update_recipe_by_id(
        db,
        &manager(),
        recipe.id,
        recipe_input("Bruschetta", Some(lines)),
    )
    .await
    .unwrap();

    assert_eq!(first.cost, second.cost);
    assert_eq!(second.cost, 2.75);
    assert_eq!(Query::find_recipe_links(db, recipe.id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn duplicate_ingredient_lines_are_kept() {
    let db = &setup().await;
    let egg = seed_ingredient(db, "Egg", 0.25).await;

    let recipe = Mutation::create_recipe(
        db,
        &manager(),
        recipe_input("Omelette", Some(vec![line(&egg, 2.0), line(&egg, 1.0)])),
    )
    .await
    .unwrap();

    assert_eq!(Query::find_recipe_links(db, recipe.id).await.unwrap().len(), 2);
    assert_eq!(recipe.cost, 0.75);
}

#[tokio::test]
async fn unknown_ingredient_fails_the_whole_update() {
    let db = &setup().await;
    let lamb = seed_ingredient(db, "Lamb", 14.0).await;

    let recipe = Mutation::create_recipe(
        db,
        &manager(),
        recipe_input("Lamb Shank", Some(vec![line(&lamb, 0.5)])),
    )
    .await
    .unwrap();

    let mut lines = vec![line(&lamb, 1.0)];
    lines.push(recipe_costing_service::IngredientLine {
        ingredient: 4040,
        quantity: 1.0,
    });
    let err = Mutation::update_recipe_by_id(
        db,
        &manager(),
        recipe.id,
        recipe_input("Renamed Shank", Some(lines)),
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        ServiceError::NotFound {
            entity: "ingredient",
            id: 4040
        }
    ));

    // nothing from the failed update is visible
    let stored = Query::find_recipe_by_id(db, recipe.id).await.unwrap().unwrap();
    assert_eq!(stored, recipe);
    let links = Query::find_recipe_links(db, recipe.id).await.unwrap();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].quantity, 0.5);
}

#[tokio::test]
async fn unknown_ingredient_fails_create() {
    let db = &setup().await;

    let err = Mutation::create_recipe(
        db,
        &manager(),
        recipe_input(
            "Ghost Stew",
            Some(vec![recipe_costing_service::IngredientLine {
                ingredient: 77,
                quantity: 1.0,
            }]),
        ),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ServiceError::NotFound { id: 77, .. }));
    assert_eq!(recipe::Entity::find().all(db).await.unwrap().len(), 0);
}

#[tokio::test]
async fn stale_version_is_rejected() {
    let db = &setup().await;

    let recipe = Mutation::create_recipe(db, &manager(), recipe_input("Gazpacho", None))
        .await
        .unwrap();
    Mutation::update_recipe_by_id(db, &manager(), recipe.id, recipe_input("Gazpacho", None))
        .await
        .unwrap();

    let err = Mutation::update_recipe_by_id(
        db,
        &manager(),
        recipe.id,
        RecipeInput {
            version: Some(recipe.version),
            ..recipe_input("Cold Gazpacho", None)
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ServiceError::Conflict(_)));
    let stored = Query::find_recipe_by_id(db, recipe.id).await.unwrap().unwrap();
    assert_eq!(stored.name, "Gazpacho");
    assert_eq!(stored.version, 2);
}

#[tokio::test]
async fn update_missing_recipe_is_not_found() {
    let db = &setup().await;

    let err = Mutation::update_recipe_by_id(db, &manager(), 12, recipe_input("Nothing", None))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ServiceError::NotFound {
            entity: "recipe",
            id: 12
        }
    ));
}

#[tokio::test]
async fn delete_removes_recipe_and_links() {
    let db = &setup().await;
    let noodles = seed_ingredient(db, "Noodles", 1.5).await;
    let tofu = seed_ingredient(db, "Tofu", 2.5).await;

    let recipe = Mutation::create_recipe(
        db,
        &manager(),
        recipe_input("Pad Thai", Some(vec![line(&noodles, 1.0), line(&tofu, 0.5)])),
    )
    .await
    .unwrap();
    let other = Mutation::create_recipe(
        db,
        &manager(),
        recipe_input("Tofu Bowl", Some(vec![line(&tofu, 1.0)])),
    )
    .await
    .unwrap();

    Mutation::delete_recipe(db, &manager(), recipe.id).await.unwrap();

    assert!(Query::find_recipe_by_id(db, recipe.id).await.unwrap().is_none());
    assert!(Query::find_recipe_links(db, recipe.id).await.unwrap().is_empty());
    assert_eq!(Query::find_recipe_links(db, other.id).await.unwrap().len(), 1);

    let err = Mutation::delete_recipe(db, &manager(), recipe.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { .. }));
}

#[tokio::test]
async fn non_managers_cannot_write_recipes() {
    let db = &setup().await;
    let garlic = seed_ingredient(db, "Garlic", 4.0).await;

    let recipe = Mutation::create_recipe(
        db,
        &manager(),
        recipe_input("Garlic Bread", Some(vec![line(&garlic, 0.1)])),
    )
    .await
    .unwrap();

    let err = Mutation::create_recipe(db, &server_staff(), recipe_input("Sneaky", None))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden { .. }));

    let err = Mutation::update_recipe_by_id(
        db,
        &inventory_staff(),
        recipe.id,
        recipe_input("Garlic Toast", Some(vec![])),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden { .. }));

    let err = Mutation::delete_recipe(db, &server_staff(), recipe.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden { .. }));

    assert_eq!(recipe::Entity::find().all(db).await.unwrap().len(), 1);
    let stored = Query::find_recipe_by_id(db, recipe.id).await.unwrap().unwrap();
    assert_eq!(stored, recipe);
    assert_eq!(Query::find_recipe_links(db, recipe.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn invalid_input_writes_nothing() {
    let db = &setup().await;

    let err = Mutation::create_recipe(
        db,
        &manager(),
        RecipeInput {
            servings: 0,
            ..recipe_input("Empty Plate", None)
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ServiceError::Validation(_)));
    assert!(recipe::Entity::find().all(db).await.unwrap().is_empty());
}

#[tokio::test]
async fn recipe_detail_resolves_ingredients() {
    let db = &setup().await;
    let pasta = seed_ingredient(db, "Pasta", 1.0).await;
    let pesto = seed_ingredient(db, "Pesto", 5.0).await;

    let recipe = Mutation::create_recipe(
        db,
        &manager(),
        recipe_input("Pasta al Pesto", Some(vec![line(&pasta, 0.25), line(&pesto, 0.1)])),
    )
    .await
    .unwrap();

    let detail = Query::find_recipe_with_ingredients(db, recipe.id)
        .await
        .unwrap();

    assert_eq!(detail.recipe, recipe);
    assert_eq!(detail.margin, recipe.price - recipe.cost);
    let names: Vec<_> = detail
        .ingredients
        .iter()
        .map(|line| line.ingredient.as_ref().unwrap().name.as_str())
        .collect();
    assert_eq!(names, vec!["Pasta", "Pesto"]);

    assert!(matches!(
        Query::find_recipe_with_ingredients(db, recipe.id + 1).await,
        Err(ServiceError::NotFound { .. })
    ));
}

#[tokio::test]
async fn cost_overflow_fails_the_write() {
    let db = &setup().await;
    let truffle = seed_ingredient(db, "Truffle", 1e300).await;
    let salt = seed_ingredient(db, "Salt", 0.5).await;

    let err = Mutation::create_recipe(
        db,
        &manager(),
        recipe_input("Gold Leaf Risotto", Some(vec![line(&truffle, 1e300)])),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
    assert!(recipe::Entity::find().all(db).await.unwrap().is_empty());

    let recipe = Mutation::create_recipe(
        db,
        &manager(),
        recipe_input("Salted Risotto", Some(vec![line(&salt, 2.0)])),
    )
    .await
    .unwrap();

    let err = Mutation::update_recipe_by_id(
        db,
        &manager(),
        recipe.id,
        recipe_input("Salted Risotto", Some(vec![line(&truffle, 1e300)])),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    // the failed update left the recipe exactly as it was
    let stored = Query::find_recipe_by_id(db, recipe.id).await.unwrap().unwrap();
    assert_eq!(stored, recipe);
    assert!(stored.cost.is_finite());
    let links = Query::find_recipe_links(db, recipe.id).await.unwrap();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].ingredient_id, salt.id);
}
