//! Database migrations.
//!
//! Schema migrations for the database.

#![allow(missing_docs)]

use sea_orm_migration::prelude::*;

mod m20250601_000001_create_region_table;
mod m20250601_000002_create_admin_table;
mod m20250601_000003_create_user_table;
mod m20250601_000004_create_rating_table;
mod m20250601_000005_create_feedback_table;
mod m20250601_000006_create_log_entry_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250601_000001_create_region_table::Migration),
            Box::new(m20250601_000002_create_admin_table::Migration),
            Box::new(m20250601_000003_create_user_table::Migration),
            Box::new(m20250601_000004_create_rating_table::Migration),
            Box::new(m20250601_000005_create_feedback_table::Migration),
            Box::new(m20250601_000006_create_log_entry_table::Migration),
        ]
    }
}
