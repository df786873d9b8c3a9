//! Error types for the library layer.

use doushu_scrape::SessionError;

use crate::store::StoreError;

/// Failures that abort a crawl.
///
/// Per-page fetch and per-item extraction problems never appear here:
/// they degrade to an early pagination stop with partial results.
#[derive(thiserror::Error, Debug)]
pub enum CrawlError {
    #[error("session error: {0}")]
    Session(#[from] SessionError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
