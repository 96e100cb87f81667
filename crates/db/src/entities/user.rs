//! User entity.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A non-anonymous feedback submitter, deduplicated by email.
///
/// Repeat submissions with the same email update name and phone in place
/// (last write wins); exactly one record exists per email.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    /// Unique user ID.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Email, stored lowercased (unique).
    #[sea_orm(unique)]
    pub email: String,

    /// Full name from the latest submission.
    pub full_name: String,

    /// Phone from the latest submission.
    #[sea_orm(nullable)]
    pub phone: Option<String>,

    /// When the user was first seen.
    pub created_at: DateTime<Utc>,

    /// When the user info was last updated.
    #[sea_orm(nullable)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
