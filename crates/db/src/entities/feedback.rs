//! Feedback entity.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Workflow status of a feedback submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum FeedbackStatus {
    #[sea_orm(string_value = "pending")]
    #[serde(rename = "pending")]
    Pending,
    #[sea_orm(string_value = "accepted_and_forwarded")]
    #[serde(rename = "accepted_and_forwarded")]
    AcceptedAndForwarded,
    #[sea_orm(string_value = "completed")]
    #[serde(rename = "completed")]
    Completed,
    /// Legacy status kept for backward compatibility.
    #[sea_orm(string_value = "reviewed")]
    #[serde(rename = "reviewed")]
    Reviewed,
    /// Legacy status kept for backward compatibility.
    #[sea_orm(string_value = "answered")]
    #[serde(rename = "answered")]
    Answered,
}

impl Default for FeedbackStatus {
    fn default() -> Self {
        Self::Pending
    }
}

/// A citizen-submitted free-text feedback tied to a rating.
///
/// Invariant: anonymous feedback never stores identity fields, regardless
/// of what the submitter sent. None of the reference columns carry foreign
/// keys; readers tolerate dangling ids.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "feedback")]
pub struct Model {
    /// Unique feedback ID.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Region the feedback refers to.
    pub region_id: String,

    /// The rating this feedback accompanies.
    pub rating_id: String,

    /// Deduplicated submitter, when not anonymous and an email was given.
    #[sea_orm(nullable)]
    pub user_id: Option<String>,

    /// Whether the submitter chose to stay anonymous.
    pub anonymous: bool,

    /// The feedback or complaint message.
    #[sea_orm(column_type = "Text")]
    pub message: String,

    /// Optional short subject.
    #[sea_orm(nullable)]
    pub subject: Option<String>,

    /// Submitter full name (absent on anonymous feedback).
    #[sea_orm(nullable)]
    pub contact_name: Option<String>,

    /// Submitter phone (absent on anonymous feedback).
    #[sea_orm(nullable)]
    pub contact_phone: Option<String>,

    /// Submitter email (absent on anonymous feedback).
    #[sea_orm(nullable)]
    pub contact_email: Option<String>,

    /// Current workflow status.
    pub status: FeedbackStatus,

    /// Admin response text.
    #[sea_orm(column_type = "Text", nullable)]
    pub response: Option<String>,

    /// When the feedback was submitted.
    pub submitted_at: DateTime<Utc>,

    /// When the record was created.
    pub created_at: DateTime<Utc>,

    /// When the record was last updated.
    #[sea_orm(nullable)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
