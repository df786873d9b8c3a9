//! Pagination orchestrator for a subject's collection.

use std::time::{Duration, Instant};

use doushu_scrape::session::{self, SessionSource};
use doushu_scrape::{collect_url, parse_page, BookRecord, PageFetcher};
use tokio::time::sleep;

use crate::error::CrawlError;
use crate::policy::AutoCrawlPolicy;
use crate::store::RecordStore;

pub const DEFAULT_BASE_URL: &str = "https://book.douban.com";

/// Inter-page politeness delay. Part of the crawl contract: the source
/// site rate-limits aggressive clients, so every successful non-empty
/// page is followed by this pause before the next request.
pub const PAGE_DELAY: Duration = Duration::from_millis(1500);

/// Soft page cap used only for the progress estimate.
const ESTIMATED_MAX_PAGES: u32 = 20;

/// Drives the fetch → parse → accumulate loop for one subject at a time.
///
/// One logical worker: pages are fetched strictly sequentially and a
/// crawl owns its accumulator exclusively until the final store replace.
/// Not reentrant; callers serialize crawls per subject.
pub struct Crawler<F> {
    fetcher: F,
    base_url: String,
    page_delay: Duration,
    policy: AutoCrawlPolicy,
}

impl<F: PageFetcher> Crawler<F> {
    pub fn new(fetcher: F) -> Self {
        Self::with_base_url(fetcher, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(fetcher: F, base_url: &str) -> Self {
        Self {
            fetcher,
            base_url: base_url.trim_end_matches('/').to_string(),
            page_delay: PAGE_DELAY,
            policy: AutoCrawlPolicy::new(),
        }
    }

    /// Override the inter-page delay. Tests shorten it; production code
    /// has no reason to.
    pub fn page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }

    /// Crawls the whole collection and replaces the subject's stored
    /// record set.
    ///
    /// Fails only on session resolution or store failures. A page that
    /// cannot be fetched or parsed ends the pagination early and the
    /// records accumulated so far are still saved. `progress` receives a
    /// monotonically non-decreasing percentage: 0 at start, capped at 95
    /// until the set is durably saved, 100 after. The values are an
    /// estimate and purely advisory.
    pub async fn crawl_all<P>(
        &self,
        source: &dyn SessionSource,
        store: &mut dyn RecordStore,
        mut progress: P,
    ) -> Result<Vec<BookRecord>, CrawlError>
    where
        P: FnMut(u8),
    {
        let crawl_session = session::resolve(source)?;
        store.put_current_subject(&crawl_session.subject_id)?;

        progress(0);
        let mut records: Vec<BookRecord> = Vec::new();
        let mut page: u32 = 0;

        loop {
            let url = collect_url(&self.base_url, &crawl_session.subject_id, page);
            tracing::debug!(%url, "fetching collection page");
            let html = match self.fetcher.fetch_page(&url, &crawl_session).await {
                Ok(html) => html,
                Err(err) => {
                    tracing::warn!(page, error = %err, "page fetch failed; keeping partial results");
                    break;
                }
            };

            let parsed = parse_page(&html);
            if parsed.records.is_empty() {
                if parsed.items_seen > 0 {
                    tracing::debug!(
                        page,
                        items = parsed.items_seen,
                        "containers matched but no item yielded a record"
                    );
                } else if page == 0 {
                    // Indistinguishable from an empty collection; may also
                    // mean the site shipped a layout the cascade does not
                    // know yet.
                    tracing::warn!("no known item container matched on the first page");
                }
                break;
            }

            tracing::debug!(page, count = parsed.records.len(), "parsed collection page");
            records.extend(parsed.records);
            page += 1;
            progress(std::cmp::min(95, page * 100 / ESTIMATED_MAX_PAGES) as u8);
            sleep(self.page_delay).await;
        }

        store.put(&crawl_session.subject_id, &records)?;
        progress(100);
        tracing::info!(
            subject = %crawl_session.subject_id,
            count = records.len(),
            "crawl complete"
        );
        Ok(records)
    }

    /// Feed a navigation event into the auto-crawl policy.
    ///
    /// Returns the subject whose collection should be crawled in the
    /// background, recording the cooldown for it. Callers then invoke
    /// [`Crawler::crawl_all`] themselves.
    pub fn on_navigated(
        &mut self,
        url: &str,
        source: &dyn SessionSource,
        now: Instant,
    ) -> Option<String> {
        let logged_in = session::COOKIE_ORIGINS
            .iter()
            .any(|origin| source.cookie(origin, "bid").is_some());
        let subject = self.policy.decide(url, logged_in, now)?;
        self.policy.record(&subject, now);
        Some(subject)
    }
}
