//! Create feedback table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Reference columns intentionally carry no foreign keys: region and
        // rating existence are checked at creation time only.
        manager
            .create_table(
                Table::create()
                    .table(Feedback::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Feedback::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Feedback::RegionId).string_len(32).not_null())
                    .col(ColumnDef::new(Feedback::RatingId).string_len(32).not_null())
                    .col(ColumnDef::new(Feedback::UserId).string_len(32))
                    .col(
                        ColumnDef::new(Feedback::Anonymous)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Feedback::Message).text().not_null())
                    .col(ColumnDef::new(Feedback::Subject).string_len(256))
                    .col(ColumnDef::new(Feedback::ContactName).string_len(256))
                    .col(ColumnDef::new(Feedback::ContactPhone).string_len(32))
                    .col(ColumnDef::new(Feedback::ContactEmail).string_len(320))
                    .col(
                        ColumnDef::new(Feedback::Status)
                            .string_len(32)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Feedback::Response).text())
                    .col(
                        ColumnDef::new(Feedback::SubmittedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Feedback::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Feedback::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        // Index: region_id (scoped listings)
        manager
            .create_index(
                Index::create()
                    .name("idx_feedback_region_id")
                    .table(Feedback::Table)
                    .col(Feedback::RegionId)
                    .to_owned(),
            )
            .await?;

        // Index: status (workflow filtering)
        manager
            .create_index(
                Index::create()
                    .name("idx_feedback_status")
                    .table(Feedback::Table)
                    .col(Feedback::Status)
                    .to_owned(),
            )
            .await?;

        // Index: user_id (per-user feedback history)
        manager
            .create_index(
                Index::create()
                    .name("idx_feedback_user_id")
                    .table(Feedback::Table)
                    .col(Feedback::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Feedback::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Feedback {
    Table,
    Id,
    RegionId,
    RatingId,
    UserId,
    Anonymous,
    Message,
    Subject,
    ContactName,
    ContactPhone,
    ContactEmail,
    Status,
    Response,
    SubmittedAt,
    CreatedAt,
    UpdatedAt,
}
