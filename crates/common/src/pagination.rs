//! Pagination primitives: page metadata and opaque log cursors.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use serde::Serialize;

/// Metadata attached to every paginated response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    /// Total number of matching records.
    pub total: u64,
    /// Current page (1-based).
    pub page: u64,
    /// Page size.
    pub limit: u64,
    /// Total page count; 1 when there are no records.
    pub pages: u64,
    /// Whether a later page exists.
    pub has_next_page: bool,
    /// Whether an earlier page exists.
    pub has_prev_page: bool,
}

impl PageMeta {
    /// Build page metadata from a total count and page/limit inputs.
    #[must_use]
    pub fn new(total: u64, page: u64, limit: u64) -> Self {
        let pages = if total == 0 { 1 } else { total.div_ceil(limit) };
        Self {
            total,
            page,
            limit,
            pages,
            has_next_page: page < pages,
            has_prev_page: page > 1,
        }
    }
}

/// A page of data with its metadata.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    /// Pagination metadata.
    pub meta: PageMeta,
    /// The records on this page.
    pub data: Vec<T>,
}

impl<T> Page<T> {
    /// An empty page for the given page/limit inputs.
    #[must_use]
    pub fn empty(page: u64, limit: u64) -> Self {
        Self {
            meta: PageMeta::new(0, page, limit),
            data: Vec::new(),
        }
    }
}

/// Encode a log-entry identifier into an opaque cursor.
#[must_use]
pub fn encode_cursor(id: i64) -> String {
    BASE64.encode(id.to_string())
}

/// Decode an opaque cursor back into a log-entry identifier.
///
/// Any decode failure (bad base64, non-UTF-8, non-numeric) is treated as
/// "no cursor" so a malformed cursor can never fail the request.
#[must_use]
pub fn decode_cursor(cursor: Option<&str>) -> Option<i64> {
    let cursor = cursor?;
    let bytes = BASE64.decode(cursor).ok()?;
    let text = String::from_utf8(bytes).ok()?;
    text.parse().ok()
}
