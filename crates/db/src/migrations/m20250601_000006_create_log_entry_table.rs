//! Create `log_entry` table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LogEntry::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LogEntry::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LogEntry::Action).string_len(64).not_null())
                    .col(ColumnDef::new(LogEntry::UserId).string_len(32))
                    .col(
                        ColumnDef::new(LogEntry::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: action (exact-match filtering)
        manager
            .create_index(
                Index::create()
                    .name("idx_log_entry_action")
                    .table(LogEntry::Table)
                    .col(LogEntry::Action)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LogEntry::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum LogEntry {
    Table,
    Id,
    Action,
    UserId,
    Timestamp,
}
