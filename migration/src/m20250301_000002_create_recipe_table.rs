use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Recipe::Table)
                    .if_not_exists()
                    .col(pk_auto(Recipe::Id))
                    .col(string(Recipe::Name))
                    .col(string(Recipe::Category))
                    .col(integer(Recipe::Servings))
                    .col(integer(Recipe::PrepTime))
                    .col(integer(Recipe::CookTime))
                    .col(text(Recipe::Instructions))
                    .col(double(Recipe::Cost).default(0.0))
                    .col(double(Recipe::Price))
                    .col(string_len(Recipe::Status, 16).default("active"))
                    .col(integer(Recipe::CreatedBy))
                    .col(integer(Recipe::Version).default(1))
                    .col(timestamp_with_time_zone(Recipe::CreatedAt))
                    .col(timestamp_with_time_zone(Recipe::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        for (name, column) in [
            ("idx-recipe-name", Recipe::Name),
            ("idx-recipe-category", Recipe::Category),
            ("idx-recipe-status", Recipe::Status),
            ("idx-recipe-created_by", Recipe::CreatedBy),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(Recipe::Table)
                        .col(column)
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Recipe::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Recipe {
    Table,
    Id,
    Name,
    Category,
    Servings,
    PrepTime,
    CookTime,
    Instructions,
    Cost,
    Price,
    Status,
    CreatedBy,
    Version,
    CreatedAt,
    UpdatedAt,
}
