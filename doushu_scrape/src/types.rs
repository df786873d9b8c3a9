//! Record types shared across the scrape pipeline.

use serde::{Deserialize, Serialize};

/// Sentinel for an author that could not be parsed.
pub const UNKNOWN_AUTHOR: &str = "未知作者";
/// Sentinel for a publisher that could not be parsed.
pub const UNKNOWN_PUBLISHER: &str = "未知出版社";
/// Sentinel for a missing publication or rating date.
pub const UNKNOWN_DATE: &str = "未知日期";
/// Sentinel for an item the subject never rated.
pub const UNRATED: &str = "未评分";

/// One entry of a subject's book collection.
///
/// `title` and `url` are never empty for a retained record; the page
/// parser discards items where neither can be extracted. Every other
/// field falls back to its sentinel. `review` falls back to the empty
/// string: an empty review is a value, not a missing one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
    pub title: String,
    pub author: String,
    /// Zero-padded `YYYY-MM-DD` when the source gives a recognizable
    /// year / year-month / full date; the raw source text otherwise.
    pub publish_date: String,
    pub publisher: String,
    /// Absolute or site-relative link to the book's detail page.
    pub url: String,
    /// `"<N>分"` with N in 1..=5, or the unrated sentinel.
    pub rating: String,
    /// Free text; empty when the subject wrote no review.
    pub review: String,
    /// Date the rating/review was recorded.
    pub date: String,
}
