//! Automatic-crawl trigger policy.

use std::sync::OnceLock;
use std::time::{Duration, Instant};

use regex::Regex;

/// Default cooldown between automatic crawls of the same subject.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(30 * 60);

/// Decides whether a navigation event should start a background crawl.
///
/// The memo is process-lifetime state, never persisted: a restart always
/// allows an immediate crawl.
#[derive(Debug)]
pub struct AutoCrawlPolicy {
    cooldown: Duration,
    last_crawl: Option<(String, Instant)>,
}

impl AutoCrawlPolicy {
    pub fn new() -> Self {
        Self::with_cooldown(DEFAULT_COOLDOWN)
    }

    pub fn with_cooldown(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_crawl: None,
        }
    }

    /// Subject id when `url` is a collect listing eligible for an
    /// automatic crawl right now; `None` otherwise.
    ///
    /// Pure with respect to its inputs: the caller supplies the clock and
    /// the login signal, so the decision is testable without a host.
    pub fn decide(&self, url: &str, has_session: bool, now: Instant) -> Option<String> {
        if !has_session {
            return None;
        }
        let subject = collect_subject(url)?;
        match &self.last_crawl {
            Some((last, at)) if *last == subject && now.duration_since(*at) < self.cooldown => {
                tracing::debug!(subject = %subject, "auto-crawl suppressed by cooldown");
                None
            }
            _ => Some(subject),
        }
    }

    /// Record an automatic crawl for `subject`, starting its cooldown.
    pub fn record(&mut self, subject: &str, now: Instant) {
        self.last_crawl = Some((subject.to_string(), now));
    }
}

impl Default for AutoCrawlPolicy {
    fn default() -> Self {
        Self::new()
    }
}

/// Subject id from a `book.douban.com` collect-listing URL.
fn collect_subject(url: &str) -> Option<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"/people/(\w+)/collect").unwrap());
    if !url.starts_with("https://book.douban.com") {
        return None;
    }
    re.captures(url).map(|caps| caps[1].to_string())
}
