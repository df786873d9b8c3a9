//! The `crawl` subcommand: fetch the collection into SQLite.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Args;
use doushu_lib::{Crawler, SqliteStore};
use doushu_scrape::session::SessionSource;
use doushu_scrape::HttpFetcher;
use indicatif::{ProgressBar, ProgressStyle};

/// Arguments for the `crawl` subcommand.
#[derive(Args)]
pub struct CrawlArgs {
    /// SQLite database path
    #[arg(long, default_value = "doushu.db")]
    pub db: PathBuf,

    /// Profile or collection URL to resolve the subject from
    /// (e.g. https://book.douban.com/people/<id>/collect)
    #[arg(long)]
    pub url: Option<String>,

    /// Subject id, overriding URL-based discovery
    #[arg(long)]
    pub user: Option<String>,

    /// Cookie header of the logged-in session
    /// (falls back to DOUBAN_COOKIE)
    #[arg(long)]
    pub cookie: Option<String>,

    /// Inter-page politeness delay in milliseconds
    #[arg(long, default_value = "1500")]
    pub delay_ms: u64,
}

/// Session source backed by CLI flags and environment variables. The
/// cookie string plays the role of the ambient document cookie; named
/// lookups answer out of the same string.
struct CliSession {
    url: Option<String>,
    cookie: Option<String>,
}

impl SessionSource for CliSession {
    fn current_url(&self) -> Option<String> {
        self.url.clone()
    }
    fn page_html(&self) -> Option<String> {
        None
    }
    fn document_cookie(&self) -> Option<String> {
        self.cookie.clone()
    }
    fn cookies_for(&self, _origin: &str) -> Vec<(String, String)> {
        Vec::new()
    }
    fn cookie(&self, _origin: &str, name: &str) -> Option<String> {
        cookie_value(self.cookie.as_deref()?, name)
    }
}

fn cookie_value(header: &str, name: &str) -> Option<String> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(n, _)| *n == name)
        .map(|(_, v)| v.to_string())
}

pub async fn run(args: &CrawlArgs) -> Result<()> {
    let url = match (&args.url, &args.user) {
        (Some(url), _) => Some(url.clone()),
        (None, Some(user)) => Some(format!("https://book.douban.com/people/{}/collect", user)),
        (None, None) => None,
    };
    let cookie = args
        .cookie
        .clone()
        .or_else(|| std::env::var("DOUBAN_COOKIE").ok());
    let source = CliSession { url, cookie };

    let mut store = SqliteStore::open(&args.db)?;
    store.init()?;

    let fetcher = HttpFetcher::new()?;
    let crawler = match std::env::var("DOUSHU_BASE_URL").ok() {
        Some(base) => Crawler::with_base_url(fetcher, &base),
        None => Crawler::new(fetcher),
    }
    .page_delay(Duration::from_millis(args.delay_ms));

    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::with_template("{bar:40.green} {pos:>3}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    let records = crawler
        .crawl_all(&source, &mut store, |pct| bar.set_position(pct as u64))
        .await?;
    bar.finish_and_clear();

    eprintln!(
        "Crawl complete: {} records saved to {}",
        records.len(),
        args.db.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_value_finds_named_cookie() {
        let header = "bid=abc; dbcl2=\"123:xyz\"; ll=108288";
        assert_eq!(cookie_value(header, "bid").as_deref(), Some("abc"));
        assert_eq!(
            cookie_value(header, "dbcl2").as_deref(),
            Some("\"123:xyz\"")
        );
        assert_eq!(cookie_value(header, "missing"), None);
    }
}
