//! Locates the repeated item containers in one listing page.

use scraper::{Html, Selector};

use crate::extract;
use crate::types::BookRecord;

/// Structural candidates for the repeated item container, in priority
/// order: the current interest-list layout first, then the historical
/// and alternate grid/list variants the site has served.
const CONTAINER_SELECTORS: &[&str] = &[
    ".subject-item",
    ".grid-view li",
    ".interest-list li",
    ".article .subject-item",
    ".interest-item",
    "#content .subject-item",
    ".book-list li",
    ".col2-left-main .subject-item",
    ".book-item",
    ".subject-list li",
    "li[data-item-id]",
    "div[data-item-id]",
    "li.subject-item",
    "div.subject-item",
];

/// Result of parsing one listing page.
#[derive(Debug, Default)]
pub struct ParsedPage {
    pub records: Vec<BookRecord>,
    /// Containers matched by the winning selector. Zero means no known
    /// layout matched, which doubles as the end-of-pagination signal;
    /// callers that care about the difference can log it.
    pub items_seen: usize,
}

/// Parses a listing page into records. Never fails: items that yield no
/// title/link are skipped, and an unrecognized page parses as empty.
pub fn parse_page(html: &str) -> ParsedPage {
    let doc = Html::parse_document(html);
    for css in CONTAINER_SELECTORS {
        let Ok(sel) = Selector::parse(css) else {
            continue;
        };
        let items: Vec<_> = doc.select(&sel).collect();
        if items.is_empty() {
            continue;
        }
        tracing::debug!(selector = %css, items = items.len(), "matched item container");
        let records: Vec<BookRecord> = items
            .iter()
            .filter_map(|item| {
                let record = extract::extract(*item);
                if record.is_none() {
                    tracing::debug!("skipping item without a usable title link");
                }
                record
            })
            .collect();
        return ParsedPage {
            records,
            items_seen: items.len(),
        };
    }
    ParsedPage::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(title: &str, id: u32) -> String {
        format!(
            r#"<li class="subject-item">
                 <div class="info">
                   <h2><a href="/subject/{id}/" title="{title}">{title}</a></h2>
                   <div class="pub">作者 / 某某出版社 / 2020</div>
                 </div>
               </li>"#
        )
    }

    #[test]
    fn parses_subject_item_layout() {
        let html = format!(
            r#"<html><body><ul class="interest-list">{}{}</ul></body></html>"#,
            item("第一本", 1),
            item("第二本", 2)
        );
        let page = parse_page(&html);
        assert_eq!(page.items_seen, 2);
        assert_eq!(page.records.len(), 2);
        assert_eq!(page.records[0].title, "第一本");
    }

    #[test]
    fn falls_back_to_grid_view_layout() {
        let html = r#"<html><body><div class="grid-view"><ul>
            <li><h2><a href="/subject/7/">网格布局</a></h2></li>
        </ul></div></body></html>"#;
        let page = parse_page(html);
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.records[0].title, "网格布局");
    }

    #[test]
    fn parses_data_item_id_layout() {
        let html = r#"<html><body>
            <li data-item-id="9"><h2><a href="/subject/9/">备选布局</a></h2></li>
        </body></html>"#;
        let page = parse_page(html);
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.records[0].title, "备选布局");
    }

    #[test]
    fn unrecognized_page_parses_as_empty() {
        let page = parse_page("<html><body><p>豆瓣</p></body></html>");
        assert_eq!(page.items_seen, 0);
        assert!(page.records.is_empty());
    }

    #[test]
    fn item_without_title_is_omitted_from_the_sequence() {
        let html = format!(
            r#"<html><body><ul class="interest-list">
                 {}
                 <li class="subject-item"><div class="pub">无标题 / 2001</div></li>
               </ul></body></html>"#,
            item("有标题", 3)
        );
        let page = parse_page(&html);
        assert_eq!(page.items_seen, 2);
        assert_eq!(page.records.len(), page.items_seen - 1);
    }
}
