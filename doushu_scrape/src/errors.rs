//! Error types for the scrape core.

use reqwest::StatusCode;

/// Failures while resolving the authenticated session.
///
/// Both variants are fatal to a crawl; per-page and per-item problems
/// are degraded to empty results instead of surfacing here.
#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    /// No usable credential material in any known source.
    #[error("no Douban session cookies found; log in and retry")]
    NoSession,
    /// The collection owner's id could not be determined.
    #[error("could not determine the collection owner (no /people/<id> in scope)")]
    NoSubject,
}

/// Failures while fetching a single listing page.
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {status}")]
    HttpStatus { status: StatusCode },
}
