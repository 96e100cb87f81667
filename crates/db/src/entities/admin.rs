//! Admin entity.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Role of an administrator account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum AdminRole {
    /// Regular admin, restricted to its assigned regions.
    #[sea_orm(string_value = "admin")]
    #[serde(rename = "admin")]
    Admin,
    /// Super admin with access to every region.
    #[sea_orm(string_value = "super_admin")]
    #[serde(rename = "super_admin")]
    SuperAdmin,
}

impl Default for AdminRole {
    fn default() -> Self {
        Self::Admin
    }
}

impl AdminRole {
    /// Whether this role bypasses region scoping entirely.
    #[must_use]
    pub fn is_super(self) -> bool {
        matches!(self, Self::SuperAdmin)
    }
}

/// Administrator account.
///
/// The assigned-region set lives in the `admin_region` join table; for
/// super admins its content is ignored by every access check.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "admin")]
pub struct Model {
    /// Unique admin ID.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Full display name.
    pub fullname: String,

    /// Login email, stored lowercased (unique).
    #[sea_orm(unique)]
    pub email: String,

    /// Argon2 password hash. Never serialized into responses.
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Role of this account.
    pub role: AdminRole,

    /// When the account was created.
    pub created_at: DateTime<Utc>,

    /// When the account was last updated.
    #[sea_orm(nullable)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::admin_region::Entity")]
    AdminRegions,
}

impl Related<super::admin_region::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AdminRegions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
