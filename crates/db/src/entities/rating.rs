//! Rating entity.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A citizen-submitted star rating (1-5) for a region.
///
/// Ratings are immutable after creation: no update or delete operation
/// exists anywhere in the system.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "rating")]
pub struct Model {
    /// Unique rating ID.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Region the rating refers to (no FK; may dangle after region
    /// deletion).
    pub region_id: String,

    /// Star value, 1..=5.
    pub rating: i32,

    /// Optional free-text comment.
    #[sea_orm(column_type = "Text", nullable)]
    pub comment: Option<String>,

    /// When the rating was submitted.
    pub submitted_at: DateTime<Utc>,

    /// Creation timestamp. Nullable: legacy imports lack it, in which case
    /// `submitted_at` is the effective timestamp.
    #[sea_orm(nullable)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Model {
    /// The timestamp used for date-range filtering and trend bucketing.
    #[must_use]
    pub fn effective_time(&self) -> DateTime<Utc> {
        self.created_at.unwrap_or(self.submitted_at)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
