//! Audit log entry entity.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// An append-only audit record.
///
/// The storage-assigned `BIGSERIAL` id is strictly increasing and doubles
/// as the pagination cursor; entries are never updated or deleted.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "log_entry")]
pub struct Model {
    /// Storage-assigned, strictly increasing identifier.
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Action name, e.g. `LOGIN` or `CREATE_RATING`.
    pub action: String,

    /// Acting or affected entity id, when known.
    #[sea_orm(nullable)]
    pub user_id: Option<String>,

    /// When the action happened.
    pub timestamp: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
