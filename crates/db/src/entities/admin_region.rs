//! Admin/region assignment entity.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Assignment of a region to an admin (the `allowedRegions` set).
///
/// `region_id` carries no foreign key: deleting a region leaves the
/// assignment dangling, and readers treat unresolvable region ids as
/// absent.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "admin_region")]
pub struct Model {
    /// Unique assignment ID.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The admin this assignment belongs to.
    pub admin_id: String,

    /// The assigned region.
    pub region_id: String,

    /// When the assignment was created.
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::admin::Entity",
        from = "Column::AdminId",
        to = "super::admin::Column::Id"
    )]
    Admin,
}

impl Related<super::admin::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Admin.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
