//! Audit log repository.

use std::sync::Arc;

use regfeed_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, QueryFilter, QueryOrder,
    QuerySelect,
};

use crate::entities::{LogEntry, log_entry};

/// Repository for append-only audit log operations.
#[derive(Clone)]
pub struct LogRepository {
    db: Arc<DatabaseConnection>,
}

impl LogRepository {
    /// Create a new log repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Append one entry; the database assigns the strictly-increasing id.
    pub async fn append(&self, model: log_entry::ActiveModel) -> AppResult<log_entry::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Entries with id strictly greater than `after_id`, ascending,
    /// optionally filtered by exact action, limited to `limit`.
    pub async fn find_after(
        &self,
        after_id: Option<i64>,
        action: Option<&str>,
        limit: u64,
    ) -> AppResult<Vec<log_entry::Model>> {
        let mut query = LogEntry::find();

        if let Some(id) = after_id {
            query = query.filter(log_entry::Column::Id.gt(id));
        }

        if let Some(action) = action {
            query = query.filter(log_entry::Column::Action.eq(action));
        }

        query
            .order_by(log_entry::Column::Id, Order::Asc)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_entry(id: i64, action: &str) -> log_entry::Model {
        log_entry::Model {
            id,
            action: action.to_string(),
            user_id: None,
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_find_after_returns_ascending_page() {
        let entries = vec![create_test_entry(3, "LOGIN"), create_test_entry(4, "LOGIN")];

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([entries])
                .into_connection(),
        );

        let repo = LogRepository::new(db);
        let page = repo.find_after(Some(2), None, 2).await.unwrap();

        assert_eq!(page.len(), 2);
        assert_eq!(page[0].id, 3);
        assert_eq!(page[1].id, 4);
    }

    #[tokio::test]
    async fn test_find_after_with_action_filter() {
        let entries = vec![create_test_entry(7, "CREATE_RATING")];

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([entries])
                .into_connection(),
        );

        let repo = LogRepository::new(db);
        let page = repo
            .find_after(None, Some("CREATE_RATING"), 50)
            .await
            .unwrap();

        assert_eq!(page.len(), 1);
        assert_eq!(page[0].action, "CREATE_RATING");
    }
}
