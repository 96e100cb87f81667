//! Create region table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Region::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Region::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Region::Name).string_len(256).not_null().unique_key())
                    .col(
                        ColumnDef::new(Region::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Region::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        // Index: created_at (default list ordering)
        manager
            .create_index(
                Index::create()
                    .name("idx_region_created_at")
                    .table(Region::Table)
                    .col(Region::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Region::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Region {
    Table,
    Id,
    Name,
    CreatedAt,
    UpdatedAt,
}
