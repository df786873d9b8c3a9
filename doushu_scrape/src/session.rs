//! Session discovery: subject id and credential material.
//!
//! The resolver never performs a login. It assembles whatever cookie
//! material the host already holds and identifies whose collection is in
//! scope, leaving rejection of stale credentials to the fetch layer.

use std::sync::OnceLock;

use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

use crate::errors::SessionError;

/// The two Douban origins whose cookies make up the credential set.
pub const COOKIE_ORIGINS: &[&str] = &["https://www.douban.com", "https://book.douban.com"];

/// Cookie names whose presence marks a likely-valid login.
pub const CRITICAL_COOKIES: &[&str] = &["bid", "dbcl2"];

/// Ambient browsing-context state the resolver reads from.
///
/// The host supplies an implementation: a browser-backed host exposes its
/// cookie jar and the active tab, the CLI exposes flag/env values. Every
/// method is a snapshot read; `None`/empty means "not available here".
pub trait SessionSource {
    /// URL of the active browsing context, if any.
    fn current_url(&self) -> Option<String>;
    /// Fully rendered markup of the active context, if any.
    fn page_html(&self) -> Option<String>;
    /// The document-scoped cookie string of the active context.
    fn document_cookie(&self) -> Option<String>;
    /// All cookies visible for an origin, as `(name, value)` pairs.
    fn cookies_for(&self, origin: &str) -> Vec<(String, String)>;
    /// A single named cookie for an origin.
    fn cookie(&self, origin: &str, name: &str) -> Option<String>;
}

/// Resolved identity and credentials for one crawl.
#[derive(Debug, Clone)]
pub struct CrawlSession {
    /// The collection owner's id.
    pub subject_id: String,
    /// `name=value` pairs joined with `"; "`, deduplicated by name.
    pub cookie_header: String,
}

/// Resolves the subject id and credential set from `source`.
pub fn resolve(source: &dyn SessionSource) -> Result<CrawlSession, SessionError> {
    let cookie_header = assemble_cookies(source)?;
    check_critical_cookies(&cookie_header);
    let subject_id = resolve_subject(source)?;
    tracing::debug!(
        subject = %subject_id,
        cookie_len = cookie_header.len(),
        "session resolved"
    );
    Ok(CrawlSession {
        subject_id,
        cookie_header,
    })
}

/// Assembles the cookie header, trying the jar, the ambient document
/// cookie string, and finally the critical keys one by one.
fn assemble_cookies(source: &dyn SessionSource) -> Result<String, SessionError> {
    let mut jar: Vec<(String, String)> = Vec::new();
    for origin in COOKIE_ORIGINS {
        for (name, value) in source.cookies_for(origin) {
            upsert(&mut jar, name, value);
        }
    }
    if !jar.is_empty() {
        return Ok(join_cookies(&jar));
    }

    if let Some(raw) = source.document_cookie() {
        let raw = raw.trim().to_string();
        if !raw.is_empty() {
            tracing::debug!("cookie jar empty; using ambient document cookie string");
            return Ok(raw);
        }
    }

    let mut jar: Vec<(String, String)> = Vec::new();
    for origin in COOKIE_ORIGINS {
        for name in CRITICAL_COOKIES {
            if let Some(value) = source.cookie(origin, name) {
                upsert(&mut jar, name.to_string(), value);
            }
        }
    }
    if !jar.is_empty() {
        tracing::debug!("assembled credential set from critical cookies only");
        return Ok(join_cookies(&jar));
    }

    Err(SessionError::NoSession)
}

/// Insert or overwrite by name. The first occurrence keeps its position;
/// a later occurrence (from another origin) wins on value.
fn upsert(jar: &mut Vec<(String, String)>, name: String, value: String) {
    match jar.iter_mut().find(|(n, _)| *n == name) {
        Some(entry) => entry.1 = value,
        None => jar.push((name, value)),
    }
}

fn join_cookies(jar: &[(String, String)]) -> String {
    jar.iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect::<Vec<_>>()
        .join("; ")
}

/// A missing critical cookie is a warning, not a failure: the site may
/// still serve public pages, and the orchestrator absorbs rejections as
/// fetch failures.
fn check_critical_cookies(header: &str) {
    let found = CRITICAL_COOKIES
        .iter()
        .filter(|name| header.contains(&format!("{}=", name)))
        .count();
    if found == 0 {
        tracing::warn!(
            "none of the critical session cookies ({}) are present; page fetches may be rejected",
            CRITICAL_COOKIES.join(", ")
        );
    }
}

fn people_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"/people/(\w+)").unwrap())
}

fn resolve_subject(source: &dyn SessionSource) -> Result<String, SessionError> {
    if let Some(url) = source.current_url() {
        if let Some(id) = subject_from_url(&url) {
            return Ok(id);
        }
    }
    if let Some(html) = source.page_html() {
        if let Some(id) = subject_from_profile_link(&html) {
            return Ok(id);
        }
    }
    Err(SessionError::NoSubject)
}

/// Subject id from the `/people/<id>` segment of a URL path.
fn subject_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    people_re()
        .captures(parsed.path())
        .map(|caps| caps[1].to_string())
}

/// Subject id from the first self-referential profile link on the page.
fn subject_from_profile_link(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    let anchors = Selector::parse("a[href]").ok()?;
    doc.select(&anchors).find_map(|a| {
        let href = a.value().attr("href")?;
        people_re().captures(href).map(|caps| caps[1].to_string())
    })
}
