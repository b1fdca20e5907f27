//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// Pagination parameters (`?limit=&offset=`), where `offset` is a page
/// index. Resolved with [`haven_core::pagination::page_window`].
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PaginationParams {
    /// `(limit, row_offset)`.
    pub fn window(&self) -> (i64, i64) {
        haven_core::pagination::page_window(self.limit, self.offset)
    }
}
