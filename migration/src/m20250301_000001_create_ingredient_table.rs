use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Ingredient::Table)
                    .if_not_exists()
                    .col(pk_auto(Ingredient::Id))
                    .col(string(Ingredient::Name))
                    .col(string(Ingredient::Unit))
                    .col(string(Ingredient::Category))
                    .col(string(Ingredient::Supplier))
                    .col(double(Ingredient::CurrentStock))
                    .col(double(Ingredient::MinLevel))
                    .col(double(Ingredient::MaxLevel))
                    .col(double(Ingredient::CostPerUnit))
                    .col(timestamp_with_time_zone(Ingredient::CreatedAt))
                    .col(timestamp_with_time_zone(Ingredient::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        for (name, column) in [
            ("idx-ingredient-name", Ingredient::Name),
            ("idx-ingredient-category", Ingredient::Category),
            ("idx-ingredient-supplier", Ingredient::Supplier),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(Ingredient::Table)
                        .col(column)
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Ingredient::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Ingredient {
    Table,
    Id,
    Name,
    Unit,
    Category,
    Supplier,
    CurrentStock,
    MinLevel,
    MaxLevel,
    CostPerUnit,
    CreatedAt,
    UpdatedAt,
}
