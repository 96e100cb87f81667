//! Region entity.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// An administrative territory; the unit of access scoping.
///
/// Ratings, feedbacks and admin assignments reference regions by id with no
/// foreign-key enforcement, so a region may be deleted while references to
/// it remain. Readers resolve region ids defensively.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "region")]
pub struct Model {
    /// Unique region ID.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Region name (unique).
    #[sea_orm(unique)]
    pub name: String,

    /// When the region was created.
    pub created_at: DateTime<Utc>,

    /// When the region was last updated.
    #[sea_orm(nullable)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
