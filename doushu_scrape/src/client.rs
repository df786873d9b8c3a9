//! HTTP fetcher for Douban collection pages.

use std::time::Duration;

use async_trait::async_trait;

use crate::errors::FetchError;
use crate::session::CrawlSession;
use crate::user_agent::get_user_agent;

/// Items requested per listing page via the `start` offset parameter.
pub const PAGE_SIZE: u32 = 15;

/// URL of a subject's collect listing at the given page index.
pub fn collect_url(base_url: &str, subject_id: &str, page: u32) -> String {
    format!(
        "{}/people/{}/collect?start={}",
        base_url.trim_end_matches('/'),
        subject_id,
        page * PAGE_SIZE
    )
}

/// Fetches fully rendered listing markup for a URL.
///
/// The crawl orchestrator treats any failure as an empty page for that
/// pagination step, so implementations should not retry internally.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, url: &str, session: &CrawlSession) -> Result<String, FetchError>;
}

/// Reqwest-backed fetcher that authenticates with the session cookie set.
///
/// Sends browser-like headers and a randomized user agent to avoid being
/// blocked, with a 30-second timeout per request.
pub struct HttpFetcher {
    http: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .user_agent(get_user_agent())
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { http })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_page(&self, url: &str, session: &CrawlSession) -> Result<String, FetchError> {
        let resp = self
            .http
            .get(url)
            .header("accept", "text/html,application/xhtml+xml")
            .header("accept-language", "zh-CN,zh;q=0.9,en;q=0.8")
            .header("cookie", &session.cookie_header)
            .header("upgrade-insecure-requests", "1")
            .header("cache-control", "no-cache")
            .header("pragma", "no-cache")
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(FetchError::HttpStatus {
                status: resp.status(),
            });
        }

        Ok(resp.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collect_url_applies_page_offset() {
        assert_eq!(
            collect_url("https://book.douban.com", "alice", 0),
            "https://book.douban.com/people/alice/collect?start=0"
        );
        assert_eq!(
            collect_url("https://book.douban.com/", "alice", 3),
            "https://book.douban.com/people/alice/collect?start=45"
        );
    }
}
