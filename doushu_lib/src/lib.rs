//! Library layer: persistence and the crawl orchestrator.
//!
//! Wraps the `doushu_scrape` core with a SQLite record store, the
//! paginated crawl loop (politeness delay, progress reporting, partial
//! results), and the automatic-crawl cooldown policy.

pub mod crawler;
pub mod error;
pub mod policy;
pub mod store;

pub use doushu_scrape;

pub use crawler::Crawler;
pub use error::CrawlError;
pub use policy::AutoCrawlPolicy;
pub use store::{RecordStore, SqliteStore, StoreError};
