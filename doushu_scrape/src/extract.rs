//! Per-item field extraction cascades.
//!
//! Every field is read through an ordered list of independent strategies;
//! the first strategy producing a value wins. The site has shipped several
//! incompatible layouts for the same logical field over the years, and a
//! collection page may still arrive in any of them, so each cascade covers
//! every known revision at once. Strategies are total: a malformed item
//! degrades to sentinel values, never to an error.

use std::sync::OnceLock;

use regex::Regex;
use scraper::{ElementRef, Selector};

use crate::types::{BookRecord, UNKNOWN_AUTHOR, UNKNOWN_DATE, UNKNOWN_PUBLISHER, UNRATED};

/// Title/link anchor candidates, newest layout first.
const TITLE_SELECTORS: &[&str] = &[
    ".info h2 a",
    ".info a",
    "h2 a",
    ".title a",
    ".subject-title a",
    ".book-title a",
    r#"a[href^="https://book.douban.com/subject/"]"#,
    r#"a[href^="/subject/"]"#,
];

/// Blocks that carry the `author / publisher / date` publication line.
const PUB_SELECTORS: &[&str] = &[
    ".pub",
    ".intro",
    ".info .intro",
    ".book-info",
    ".subject-info",
    ".publish-info",
];

const REVIEW_SELECTORS: &[&str] = &[
    ".comment",
    ".short-note",
    ".review",
    ".note-content",
    ".comment-content",
    ".review-content",
];

const DATE_SELECTORS: &[&str] = &[
    ".date",
    ".collect-date",
    ".review-date",
    ".note-date",
    ".create-time",
    ".time",
];

/// Organizational suffixes that mark a publication part as the publisher.
const PUBLISHER_KEYWORDS: &[&str] = &[
    "出版社", "出版公司", "书局", "书店", "杂志社", "杂志", "期刊社", "文化", "社",
];

/// Parts carrying these markers name a translator, not an author.
const TRANSLATOR_MARKERS: &[&str] = &["译", "译者", "翻译"];

/// Price parts are never the publisher.
const CURRENCY_MARKERS: &[&str] = &["元", "CNY"];

/// Extracts one normalized record from an item container.
///
/// Returns `None` only when no title/link cascade candidate matches; every
/// other field falls back to its sentinel.
pub fn extract(item: ElementRef<'_>) -> Option<BookRecord> {
    let (title, url) = title_and_link(item)?;
    let publication = classify_publication(&publication_text(item));
    Some(BookRecord {
        title,
        author: publication.author,
        publish_date: publication.publish_date,
        publisher: publication.publisher,
        url,
        rating: extract_rating(item),
        review: extract_review(item),
        date: extract_date(item),
    })
}

/// First element matched by the first selector that matches anything.
fn select_first<'a>(item: ElementRef<'a>, selectors: &[&str]) -> Option<ElementRef<'a>> {
    selectors.iter().find_map(|css| {
        let sel = Selector::parse(css).ok()?;
        item.select(&sel).next()
    })
}

/// First non-empty text across the cascade: an element whose text is
/// empty does not stop the remaining candidates from being tried.
fn first_text(item: ElementRef<'_>, selectors: &[&str]) -> Option<String> {
    selectors.iter().find_map(|css| {
        let sel = Selector::parse(css).ok()?;
        let text = item.select(&sel).next().map(text_of)?;
        (!text.is_empty()).then_some(text)
    })
}

fn text_of(node: ElementRef<'_>) -> String {
    node.text().collect::<String>().trim().to_string()
}

fn title_and_link(item: ElementRef<'_>) -> Option<(String, String)> {
    let anchor = select_first(item, TITLE_SELECTORS).or_else(|| detail_anchor(item))?;
    let url = anchor.value().attr("href")?.trim().to_string();
    let title = anchor
        .value()
        .attr("title")
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| text_of(anchor));
    if title.is_empty() || url.is_empty() {
        return None;
    }
    Some((title, url))
}

/// Last resort: any anchor whose target path looks like a detail page.
fn detail_anchor(item: ElementRef<'_>) -> Option<ElementRef<'_>> {
    let anchors = Selector::parse("a").ok()?;
    item.select(&anchors).find(|a| {
        a.value().attr("href").is_some_and(|href| {
            href.starts_with("https://book.douban.com/subject/") || href.starts_with("/subject/")
        })
    })
}

fn publication_text(item: ElementRef<'_>) -> String {
    if let Some(node) = select_first(item, PUB_SELECTORS) {
        return text_of(node);
    }
    // No dedicated block; scan descendants for publication keywords.
    let Ok(all) = Selector::parse("*") else {
        return String::new();
    };
    item.select(&all)
        .map(text_of)
        .find(|text| {
            !text.is_empty()
                && (text.contains("出版社") || text.contains("出版") || text.contains('年'))
        })
        .unwrap_or_default()
}

/// Classified publication metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publication {
    pub author: String,
    pub publisher: String,
    pub publish_date: String,
}

/// Splits the raw publication line on `" / "` and classifies each part.
///
/// Priority per part: publication date (numeric year[-month[-day]]
/// pattern), then publisher keyword, then author run (ended by the first
/// date/publisher/translator part). Once the author run is over, a
/// leftover part without currency or translator markers may still claim
/// the publisher slot.
pub fn classify_publication(raw: &str) -> Publication {
    let mut author_parts: Vec<&str> = Vec::new();
    let mut publisher: Option<String> = None;
    let mut publish_date: Option<String> = None;
    let mut in_author_run = true;

    for part in raw.split(" / ").map(str::trim).filter(|p| !p.is_empty()) {
        if publish_date.is_none() {
            if let Some(date) = parse_publish_date(part) {
                publish_date = Some(date);
                in_author_run = false;
                continue;
            }
        }
        if publisher.is_none() && PUBLISHER_KEYWORDS.iter().any(|k| part.contains(k)) {
            publisher = Some(part.to_string());
            in_author_run = false;
            continue;
        }
        if in_author_run {
            if TRANSLATOR_MARKERS.iter().any(|m| part.contains(m)) {
                in_author_run = false;
            } else {
                author_parts.push(part);
            }
        } else if publisher.is_none()
            && !CURRENCY_MARKERS.iter().any(|m| part.contains(m))
            && !TRANSLATOR_MARKERS.iter().any(|m| part.contains(m))
        {
            publisher = Some(part.to_string());
        }
    }

    Publication {
        author: if author_parts.is_empty() {
            UNKNOWN_AUTHOR.to_string()
        } else {
            author_parts.join(" / ")
        },
        publisher: publisher.unwrap_or_else(|| UNKNOWN_PUBLISHER.to_string()),
        publish_date: publish_date.unwrap_or_else(|| UNKNOWN_DATE.to_string()),
    }
}

fn publish_date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{4})(?:-(\d{1,2}))?(?:-(\d{1,2}))?$").unwrap())
}

/// `2008`, `2008-5`, `2008-05-28` → zero-padded `YYYY-MM-DD`.
fn parse_publish_date(part: &str) -> Option<String> {
    let caps = publish_date_re().captures(part)?;
    let year = caps.get(1)?.as_str();
    let month = caps.get(2).map_or("01", |m| m.as_str());
    let day = caps.get(3).map_or("01", |m| m.as_str());
    Some(format!("{}-{:0>2}-{:0>2}", year, month, day))
}

type RatingStrategy = fn(ElementRef<'_>) -> Option<u8>;

/// The six known rating encodings, newest first. The site has silently
/// changed representations across revisions; all are tolerated at once.
const RATING_STRATEGIES: &[RatingStrategy] = &[
    rating_from_nums,
    rating_from_star_class,
    rating_from_rating_t_class,
    rating_from_interest_text,
    rating_from_any_rating_class,
    rating_from_bare_number,
];

/// `"<N>分"` with N in 1..=5, or the unrated sentinel.
pub fn extract_rating(item: ElementRef<'_>) -> String {
    RATING_STRATEGIES
        .iter()
        .find_map(|strategy| strategy(item))
        .map(|n| format!("{}分", n))
        .unwrap_or_else(|| UNRATED.to_string())
}

/// Rounds to the nearest whole star and rejects out-of-range values.
fn normalize_rating(value: f64) -> Option<u8> {
    let rounded = value.round();
    (1.0..=5.0).contains(&rounded).then_some(rounded as u8)
}

/// Method 1: dedicated numeric element.
fn rating_from_nums(item: ElementRef<'_>) -> Option<u8> {
    let sel = Selector::parse(".rating_nums").ok()?;
    let text = item.select(&sel).next().map(text_of)?;
    normalize_rating(text.parse().ok()?)
}

/// Method 2: `star-rating-<N*10>` class on the star display.
fn rating_from_star_class(item: ElementRef<'_>) -> Option<u8> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"star-rating-(\d+)").unwrap());
    let sel = Selector::parse(".star-rating").ok()?;
    let class = item.select(&sel).next()?.value().attr("class")?;
    let tenths: f64 = re.captures(class)?[1].parse().ok()?;
    normalize_rating(tenths / 10.0)
}

/// Method 3: `rating<N>-t` class.
fn rating_from_rating_t_class(item: ElementRef<'_>) -> Option<u8> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"rating(\d+)-t").unwrap());
    let sel = Selector::parse(r#"[class^="rating"][class$="-t"]"#).ok()?;
    item.select(&sel).find_map(|el| {
        let class = el.value().attr("class")?;
        normalize_rating(re.captures(class)?[1].parse().ok()?)
    })
}

/// Method 4: `<N>分` inside the ratings container's text.
fn rating_from_interest_text(item: ElementRef<'_>) -> Option<u8> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"(\d+(?:\.\d+)?)分").unwrap());
    let sel = Selector::parse(".interest-rating").ok()?;
    let text = item.select(&sel).next().map(text_of)?;
    normalize_rating(re.captures(&text)?[1].parse().ok()?)
}

/// Method 5: any element with "rating" in its class and a number in its
/// text.
fn rating_from_any_rating_class(item: ElementRef<'_>) -> Option<u8> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"\d+(?:\.\d+)?").unwrap());
    let sel = Selector::parse(r#"[class*="rating"]"#).ok()?;
    item.select(&sel).find_map(|el| {
        let text = text_of(el);
        normalize_rating(re.find(&text)?.as_str().parse().ok()?)
    })
}

/// Method 6: any descendant whose entire text is a number in (0, 5].
fn rating_from_bare_number(item: ElementRef<'_>) -> Option<u8> {
    let sel = Selector::parse("*").ok()?;
    item.select(&sel).find_map(|el| {
        let value: f64 = text_of(el).parse().ok()?;
        (value > 0.0 && value <= 5.0)
            .then(|| normalize_rating(value))
            .flatten()
    })
}

fn extract_review(item: ElementRef<'_>) -> String {
    first_text(item, REVIEW_SELECTORS).unwrap_or_default()
}

fn record_date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d{4}[-/年]\d{1,2}[-/月]\d{1,2}日?").unwrap())
}

fn extract_date(item: ElementRef<'_>) -> String {
    if let Some(date) = first_text(item, DATE_SELECTORS) {
        return date;
    }
    // Last resort: any date-shaped run in the item's full text.
    let full_text = item.text().collect::<String>();
    record_date_re()
        .find(&full_text)
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| UNKNOWN_DATE.to_string())
}
