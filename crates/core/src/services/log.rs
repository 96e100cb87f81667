//! Audit log service.

use regfeed_common::{AppResult, decode_cursor, encode_cursor};
use regfeed_db::entities::log_entry;
use regfeed_db::repositories::LogRepository;
use sea_orm::Set;

/// Action names recorded in the audit log.
pub mod actions {
    /// Successful admin login.
    pub const LOGIN: &str = "LOGIN";
    /// Failed login attempt (unknown email or wrong password).
    pub const FAILED_LOGIN: &str = "FAILED_LOGIN";
    /// Public rating submission.
    pub const CREATE_RATING: &str = "CREATE_RATING";
    /// Public feedback submission.
    pub const CREATE_FEEDBACK: &str = "CREATE_FEEDBACK";
    /// Admin feedback status change.
    pub const UPDATE_FEEDBACK: &str = "UPDATE_FEEDBACK";
}

/// Cursor pair returned with a log page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogCursor {
    /// Cursor for the next page; `None` signals end of data.
    pub next: Option<String>,
    /// The input cursor echoed back. Best-effort placeholder, not a
    /// computed reverse cursor.
    pub prev: Option<String>,
}

/// One page of audit log entries.
#[derive(Debug, Clone)]
pub struct LogPage {
    /// Entries in ascending id order.
    pub data: Vec<log_entry::Model>,
    /// Forward/backward cursors.
    pub cursor: LogCursor,
}

/// Service for the append-only audit log.
#[derive(Clone)]
pub struct LogService {
    log_repo: LogRepository,
}

impl LogService {
    /// Create a new log service.
    #[must_use]
    pub const fn new(log_repo: LogRepository) -> Self {
        Self { log_repo }
    }

    /// Append one audit record.
    ///
    /// Best-effort: a failed write is logged server-side and swallowed so
    /// the triggering operation never fails because of it.
    pub async fn record(&self, action: &str, user_id: Option<&str>) {
        let model = log_entry::ActiveModel {
            action: Set(action.to_string()),
            user_id: Set(user_id.map(ToString::to_string)),
            timestamp: Set(chrono::Utc::now()),
            ..Default::default()
        };

        if let Err(e) = self.log_repo.append(model).await {
            tracing::warn!(action = action, error = %e, "Failed to write audit log entry");
        }
    }

    /// Append one audit record in the background.
    ///
    /// Used for failed logins, where the error response must not wait on
    /// the log write.
    pub fn record_detached(&self, action: &'static str, user_id: Option<String>) {
        let service = self.clone();
        tokio::spawn(async move {
            service.record(action, user_id.as_deref()).await;
        });
    }

    /// List entries after an opaque cursor.
    ///
    /// A malformed cursor is treated as "start from the beginning"; it can
    /// never fail the request. `next` is only set when the page came back
    /// full, `prev` simply echoes the input.
    pub async fn list(
        &self,
        cursor: Option<&str>,
        limit: u64,
        action: Option<&str>,
    ) -> AppResult<LogPage> {
        let after_id = decode_cursor(cursor);

        let entries = self.log_repo.find_after(after_id, action, limit).await?;

        let next = if entries.len() as u64 == limit {
            entries.last().map(|entry| encode_cursor(entry.id))
        } else {
            None
        };

        Ok(LogPage {
            data: entries,
            cursor: LogCursor {
                next,
                prev: cursor.map(ToString::to_string),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn create_test_entry(id: i64, action: &str) -> log_entry::Model {
        log_entry::Model {
            id,
            action: action.to_string(),
            user_id: None,
            timestamp: Utc::now(),
        }
    }

    fn service_with_pages(pages: Vec<Vec<log_entry::Model>>) -> LogService {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results(pages)
                .into_connection(),
        );
        LogService::new(LogRepository::new(db))
    }

    #[tokio::test]
    async fn test_cursor_walk_over_five_entries() {
        // Three requests with limit=2 over 5 entries: 2 + 2 + 1.
        let service = service_with_pages(vec![
            vec![create_test_entry(1, "LOGIN"), create_test_entry(2, "LOGIN")],
            vec![create_test_entry(3, "LOGIN"), create_test_entry(4, "LOGIN")],
            vec![create_test_entry(5, "LOGIN")],
        ]);

        let first = service.list(None, 2, None).await.unwrap();
        assert_eq!(first.data.len(), 2);
        let cursor1 = first.cursor.next.clone().unwrap();
        assert_eq!(decode_cursor(Some(&cursor1)), Some(2));
        assert_eq!(first.cursor.prev, None);

        let second = service.list(Some(&cursor1), 2, None).await.unwrap();
        assert_eq!(second.data.len(), 2);
        let cursor2 = second.cursor.next.clone().unwrap();
        assert_eq!(decode_cursor(Some(&cursor2)), Some(4));
        assert_eq!(second.cursor.prev.as_deref(), Some(cursor1.as_str()));

        let third = service.list(Some(&cursor2), 2, None).await.unwrap();
        assert_eq!(third.data.len(), 1);
        assert_eq!(third.cursor.next, None);
    }

    #[tokio::test]
    async fn test_malformed_cursor_starts_from_beginning() {
        let service = service_with_pages(vec![vec![create_test_entry(1, "LOGIN")]]);

        let page = service.list(Some("@@not-base64@@"), 50, None).await.unwrap();

        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].id, 1);
    }

    #[tokio::test]
    async fn test_full_page_has_next_cursor_empty_page_does_not() {
        let service = service_with_pages(vec![vec![create_test_entry(9, "LOGIN")]]);

        // limit 1, one row returned: page is full.
        let page = service.list(None, 1, None).await.unwrap();
        assert!(page.cursor.next.is_some());

        let service = service_with_pages(vec![vec![]]);
        let page = service.list(None, 1, None).await.unwrap();
        assert!(page.cursor.next.is_none());
    }

    #[tokio::test]
    async fn test_record_swallows_storage_failure() {
        // No exec results appended: the insert will fail.
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = LogService::new(LogRepository::new(db));

        // Must not panic or propagate.
        service.record(actions::CREATE_RATING, Some("rat1")).await;
    }

    #[tokio::test]
    async fn test_record_inserts_entry() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 1,
                    rows_affected: 1,
                }])
                .append_query_results([[create_test_entry(1, actions::LOGIN)]])
                .into_connection(),
        );
        let service = LogService::new(LogRepository::new(db));

        service.record(actions::LOGIN, Some("adm1")).await;
    }
}
