use super::{
    m20250301_000001_create_ingredient_table::Ingredient,
    m20250301_000002_create_recipe_table::Recipe,
};
use sea_orm_migration::sea_orm::DbBackend;
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RecipeIngredient::Table)
                    .if_not_exists()
                    .col(pk_auto(RecipeIngredient::Id))
                    .col(integer(RecipeIngredient::RecipeId))
                    .col(integer(RecipeIngredient::IngredientId))
                    .col(double(RecipeIngredient::Quantity))
                    .col(timestamp_with_time_zone(RecipeIngredient::CreatedAt))
                    .col(timestamp_with_time_zone(RecipeIngredient::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-recipe_ingredient-recipe_id")
                            .from(RecipeIngredient::Table, RecipeIngredient::RecipeId)
                            .to(Recipe::Table, Recipe::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-recipe_ingredient-ingredient_id")
                            .from(RecipeIngredient::Table, RecipeIngredient::IngredientId)
                            .to(Ingredient::Table, Ingredient::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // not unique: a recipe may list the same ingredient twice
        manager
            .create_index(
                Index::create()
                    .name("idx-recipe_ingredient-recipe_id-ingredient_id")
                    .table(RecipeIngredient::Table)
                    .col(RecipeIngredient::RecipeId)
                    .col(RecipeIngredient::IngredientId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-recipe_ingredient-ingredient_id")
                    .table(RecipeIngredient::Table)
                    .col(RecipeIngredient::IngredientId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        if manager.get_database_backend() != DbBackend::Sqlite {
            for name in [
                "fk-recipe_ingredient-recipe_id",
                "fk-recipe_ingredient-ingredient_id",
            ] {
                manager
                    .drop_foreign_key(
                        ForeignKey::drop()
                            .table(RecipeIngredient::Table)
                            .name(name)
                            .to_owned(),
                    )
                    .await?;
            }
        }
        manager
            .drop_table(Table::drop().table(RecipeIngredient::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum RecipeIngredient {
    Table,
    Id,
    RecipeId,
    IngredientId,
    Quantity,
    CreatedAt,
    UpdatedAt,
}
