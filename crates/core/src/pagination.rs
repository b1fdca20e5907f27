//! Limit/offset helpers for list endpoints.
//!
//! List endpoints accept `?limit=&offset=` where `offset` is a *page
//! index*, not a row count: `offset=2&limit=20` skips 40 rows.

/// Default page size when the client sends no `limit`.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Upper bound on any page size.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Clamp a user-provided limit to `1..=max`, falling back to `default`.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).max(1).min(max)
}

/// Resolve `(limit, row_offset)` from the raw query parameters.
pub fn page_window(limit: Option<i64>, page: Option<i64>) -> (i64, i64) {
    let limit = clamp_limit(limit, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE);
    let page = page.unwrap_or(0).max(0);
    (limit, page.saturating_mul(limit))
}
