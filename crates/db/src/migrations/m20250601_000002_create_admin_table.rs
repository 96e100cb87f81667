//! Create admin and `admin_region` tables migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create admin table
        manager
            .create_table(
                Table::create()
                    .table(Admin::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Admin::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Admin::Fullname).string_len(256).not_null())
                    .col(ColumnDef::new(Admin::Email).string_len(320).not_null().unique_key())
                    .col(ColumnDef::new(Admin::PasswordHash).string_len(256).not_null())
                    .col(
                        ColumnDef::new(Admin::Role)
                            .string_len(16)
                            .not_null()
                            .default("admin"),
                    )
                    .col(
                        ColumnDef::new(Admin::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Admin::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        // Index: role (role-filtered directory listings)
        manager
            .create_index(
                Index::create()
                    .name("idx_admin_role")
                    .table(Admin::Table)
                    .col(Admin::Role)
                    .to_owned(),
            )
            .await?;

        // Create admin_region table.
        //
        // region_id intentionally has no foreign key: region deletion does
        // not cascade and dangling assignments are tolerated by readers.
        manager
            .create_table(
                Table::create()
                    .table(AdminRegion::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(AdminRegion::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(AdminRegion::AdminId).string_len(32).not_null())
                    .col(ColumnDef::new(AdminRegion::RegionId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(AdminRegion::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_admin_region_admin")
                            .from(AdminRegion::Table, AdminRegion::AdminId)
                            .to(Admin::Table, Admin::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (admin_id, region_id)
        manager
            .create_index(
                Index::create()
                    .name("idx_admin_region_unique")
                    .table(AdminRegion::Table)
                    .col(AdminRegion::AdminId)
                    .col(AdminRegion::RegionId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: region_id (overlap lookups)
        manager
            .create_index(
                Index::create()
                    .name("idx_admin_region_region_id")
                    .table(AdminRegion::Table)
                    .col(AdminRegion::RegionId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AdminRegion::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Admin::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Admin {
    Table,
    Id,
    Fullname,
    Email,
    PasswordHash,
    Role,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum AdminRegion {
    Table,
    Id,
    AdminId,
    RegionId,
    CreatedAt,
}
