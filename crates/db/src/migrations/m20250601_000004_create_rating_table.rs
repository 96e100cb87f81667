//! Create rating table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // region_id intentionally has no foreign key: region existence is
        // checked at creation time only, and dangling references are
        // tolerated by readers.
        manager
            .create_table(
                Table::create()
                    .table(Rating::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Rating::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Rating::RegionId).string_len(32).not_null())
                    .col(ColumnDef::new(Rating::Rating).integer().not_null())
                    .col(ColumnDef::new(Rating::Comment).text())
                    .col(
                        ColumnDef::new(Rating::SubmittedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Rating::CreatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        // Index: region_id (scoped listings and aggregation)
        manager
            .create_index(
                Index::create()
                    .name("idx_rating_region_id")
                    .table(Rating::Table)
                    .col(Rating::RegionId)
                    .to_owned(),
            )
            .await?;

        // Index: submitted_at (default sort and range scans)
        manager
            .create_index(
                Index::create()
                    .name("idx_rating_submitted_at")
                    .table(Rating::Table)
                    .col(Rating::SubmittedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Rating::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Rating {
    Table,
    Id,
    RegionId,
    Rating,
    Comment,
    SubmittedAt,
    CreatedAt,
}
