//! Feedback repository.

use std::sync::Arc;

use regfeed_common::{AppError, AppResult};
use sea_orm::sea_query::{Expr, extension::postgres::PgExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};

use super::like_pattern;
use crate::entities::{
    Feedback,
    feedback::{self, FeedbackStatus},
};

/// Sortable fields of feedback listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackSortField {
    /// Sort by submission time.
    SubmittedAt,
    /// Sort by workflow status.
    Status,
}

impl FeedbackSortField {
    const fn column(self) -> feedback::Column {
        match self {
            Self::SubmittedAt => feedback::Column::SubmittedAt,
            Self::Status => feedback::Column::Status,
        }
    }
}

/// Filter for feedback listings.
#[derive(Debug, Clone, Default)]
pub struct FeedbackListFilter {
    /// Restrict to these regions; `None` means unrestricted.
    pub region_ids: Option<Vec<String>>,
    /// Exact status filter.
    pub status: Option<FeedbackStatus>,
    /// Case-insensitive substring match over contact name, subject and
    /// message.
    pub search: Option<String>,
}

/// Repository for feedback operations.
#[derive(Clone)]
pub struct FeedbackRepository {
    db: Arc<DatabaseConnection>,
}

impl FeedbackRepository {
    /// Create a new feedback repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Create a new feedback.
    pub async fn create(&self, model: feedback::ActiveModel) -> AppResult<feedback::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find feedback by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<feedback::Model>> {
        Feedback::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    fn list_condition(filter: &FeedbackListFilter) -> Condition {
        let mut condition = Condition::all();

        if let Some(ids) = filter.region_ids.as_ref() {
            condition = condition.add(feedback::Column::RegionId.is_in(ids.clone()));
        }

        if let Some(status) = filter.status {
            condition = condition.add(feedback::Column::Status.eq(status));
        }

        if let Some(search) = filter.search.as_deref() {
            let pattern = like_pattern(search);
            condition = condition.add(
                Condition::any()
                    .add(Expr::col(feedback::Column::ContactName).ilike(pattern.clone()))
                    .add(Expr::col(feedback::Column::Subject).ilike(pattern.clone()))
                    .add(Expr::col(feedback::Column::Message).ilike(pattern)),
            );
        }

        condition
    }

    /// Find one page of feedbacks matching the filter.
    pub async fn find_page(
        &self,
        filter: &FeedbackListFilter,
        sort: FeedbackSortField,
        order: Order,
        page: u64,
        limit: u64,
    ) -> AppResult<Vec<feedback::Model>> {
        Feedback::find()
            .filter(Self::list_condition(filter))
            .order_by(sort.column(), order)
            .offset((page - 1) * limit)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count feedbacks matching the filter.
    pub async fn count(&self, filter: &FeedbackListFilter) -> AppResult<u64> {
        Feedback::find()
            .filter(Self::list_condition(filter))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a feedback record.
    pub async fn update(&self, model: feedback::ActiveModel) -> AppResult<feedback::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All feedbacks submitted by one user, newest first.
    pub async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<feedback::Model>> {
        Feedback::find()
            .filter(feedback::Column::UserId.eq(user_id))
            .order_by(feedback::Column::CreatedAt, Order::Desc)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count feedbacks submitted by one user.
    pub async fn count_by_user(&self, user_id: &str) -> AppResult<u64> {
        Feedback::find()
            .filter(feedback::Column::UserId.eq(user_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_feedback(id: &str, region_id: &str, status: FeedbackStatus) -> feedback::Model {
        feedback::Model {
            id: id.to_string(),
            region_id: region_id.to_string(),
            rating_id: "rat1".to_string(),
            user_id: None,
            anonymous: true,
            message: "The service was slow".to_string(),
            subject: None,
            contact_name: None,
            contact_phone: None,
            contact_email: None,
            status,
            response: None,
            submitted_at: Utc::now(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_find_by_id_returns_feedback() {
        let feedback = create_test_feedback("fb1", "reg1", FeedbackStatus::Pending);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[feedback.clone()]])
                .into_connection(),
        );

        let repo = FeedbackRepository::new(db);
        let result = repo.find_by_id("fb1").await.unwrap();

        assert!(result.is_some());
        assert_eq!(result.unwrap().region_id, "reg1");
    }

    #[tokio::test]
    async fn test_find_page_with_full_filter() {
        let feedback = create_test_feedback("fb1", "reg1", FeedbackStatus::Pending);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[feedback]])
                .into_connection(),
        );

        let repo = FeedbackRepository::new(db);
        let filter = FeedbackListFilter {
            region_ids: Some(vec!["reg1".to_string()]),
            status: Some(FeedbackStatus::Pending),
            search: Some("slow".to_string()),
        };

        let page = repo
            .find_page(&filter, FeedbackSortField::SubmittedAt, Order::Desc, 1, 10)
            .await
            .unwrap();

        assert_eq!(page.len(), 1);
    }

    #[tokio::test]
    async fn test_find_by_user_returns_rows() {
        let mut feedback = create_test_feedback("fb1", "reg1", FeedbackStatus::Completed);
        feedback.user_id = Some("usr1".to_string());
        feedback.anonymous = false;

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[feedback]])
                .into_connection(),
        );

        let repo = FeedbackRepository::new(db);
        let rows = repo.find_by_user("usr1").await.unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].user_id.as_deref(), Some("usr1"));
    }
}
