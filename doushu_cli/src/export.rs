//! CSV and HTML renderers for exported record sets.

use chrono::NaiveDate;
use csv::{QuoteStyle, WriterBuilder};
use doushu_scrape::BookRecord;

/// Column order is part of the export contract; downstream spreadsheets
/// key on it.
const CSV_HEADERS: [&str; 8] = [
    "书名",
    "作者",
    "出版日期",
    "出版社",
    "豆瓣链接",
    "评分",
    "书评内容",
    "评分日期",
];

/// Prefix so spreadsheet software on Windows detects UTF-8.
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

#[derive(thiserror::Error, Debug)]
pub enum ExportError {
    /// Export requested with zero records; no file is produced.
    #[error("no records to export")]
    Empty,
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Html,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Html => "html",
        }
    }
}

/// `<subject|douban>_书评_<date>.<ext>`.
pub fn file_name(subject_id: &str, format: ExportFormat, date: NaiveDate) -> String {
    let subject = if subject_id.is_empty() {
        "douban"
    } else {
        subject_id
    };
    format!(
        "{}_书评_{}.{}",
        subject,
        date.format("%Y-%m-%d"),
        format.extension()
    )
}

/// Renders the record set as BOM-prefixed CSV. Every field is quoted,
/// with embedded quotes doubled, so free-text reviews round-trip.
pub fn to_csv(records: &[BookRecord]) -> Result<Vec<u8>, ExportError> {
    if records.is_empty() {
        return Err(ExportError::Empty);
    }

    let mut body = Vec::new();
    {
        let mut wtr = WriterBuilder::new()
            .quote_style(QuoteStyle::Always)
            .from_writer(&mut body);
        wtr.write_record(CSV_HEADERS)?;
        for record in records {
            wtr.write_record([
                &record.title,
                &record.author,
                &record.publish_date,
                &record.publisher,
                &record.url,
                &record.rating,
                &record.review,
                &record.date,
            ])?;
        }
        wtr.flush()?;
    }

    let mut out = Vec::with_capacity(UTF8_BOM.len() + body.len());
    out.extend_from_slice(UTF8_BOM);
    out.extend_from_slice(&body);
    Ok(out)
}

/// Renders the record set as a standalone HTML report with summary
/// counts. All record text is escaped.
pub fn to_html(
    records: &[BookRecord],
    subject_id: &str,
    generated_at: &str,
) -> Result<String, ExportError> {
    if records.is_empty() {
        return Err(ExportError::Empty);
    }

    let subject = if subject_id.is_empty() {
        "未知用户"
    } else {
        subject_id
    };
    let total = records.len();
    let reviewed = records
        .iter()
        .filter(|record| !record.review.trim().is_empty())
        .count();

    let mut blocks = String::new();
    for record in records {
        let review = if record.review.trim().is_empty() {
            r#"<span class="no-review">暂无书评</span>"#.to_string()
        } else {
            escape_html(&record.review)
        };
        blocks.push_str(&format!(
            r#"    <div class="book-item">
      <div class="book-title"><a href="{url}">{title}</a></div>
      <div class="book-meta">{author} | {publish_date} | {publisher} | {date}
        <span class="book-rating">{rating}</span></div>
      <div class="book-review">{review}</div>
    </div>
"#,
            url = escape_html(&record.url),
            title = escape_html(&record.title),
            author = escape_html(&record.author),
            publish_date = escape_html(&record.publish_date),
            publisher = escape_html(&record.publisher),
            date = escape_html(&record.date),
            rating = escape_html(&record.rating),
            review = review,
        ));
    }

    Ok(format!(
        r#"<!DOCTYPE html>
<html lang="zh-CN">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>{subject}的豆瓣书评</title>
  <style>
    body {{ font-family: Arial, sans-serif; line-height: 1.6; margin: 0; padding: 20px; background: #f5f5f5; }}
    .container {{ max-width: 1200px; margin: 0 auto; background: #fff; padding: 30px; border-radius: 8px; }}
    h1 {{ color: #2e7d32; text-align: center; }}
    .stats {{ display: flex; justify-content: center; gap: 30px; margin: 20px 0; }}
    .stat-item {{ text-align: center; padding: 15px 25px; background: #f8f9fa; border-radius: 8px; }}
    .stat-number {{ font-size: 2em; font-weight: bold; color: #2e7d32; display: block; }}
    .book-item {{ margin-bottom: 25px; padding: 20px; background: #fafafa; border-left: 4px solid #4caf50; }}
    .book-title {{ font-size: 1.3em; font-weight: bold; }}
    .book-title a {{ color: #2e7d32; text-decoration: none; }}
    .book-meta {{ color: #666; font-size: 0.9em; margin: 8px 0; }}
    .book-rating {{ padding: 2px 10px; background: #fff3cd; border-radius: 12px; color: #856404; }}
    .book-review {{ padding: 12px; background: #fff; border-left: 3px solid #4caf50; font-style: italic; }}
    .no-review {{ color: #999; }}
    .footer {{ text-align: center; margin-top: 40px; color: #666; font-size: 0.9em; }}
  </style>
</head>
<body>
  <div class="container">
    <h1>{subject} 的豆瓣书评收藏</h1>
    <div class="stats">
      <div class="stat-item"><span class="stat-number">{total}</span>总书籍数</div>
      <div class="stat-item"><span class="stat-number">{reviewed}</span>有书评</div>
      <div class="stat-item"><span class="stat-number">{generated_at}</span>导出时间</div>
    </div>
    <div class="book-list">
{blocks}    </div>
    <div class="footer">数据来源：豆瓣读书 | 生成时间：{generated_at}</div>
  </div>
</body>
</html>
"#,
        subject = escape_html(subject),
        total = total,
        reviewed = reviewed,
        generated_at = escape_html(generated_at),
        blocks = blocks,
    ))
}

/// Escapes the five HTML-special characters.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#039;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, review: &str) -> BookRecord {
        BookRecord {
            title: title.to_string(),
            author: "作者".to_string(),
            publish_date: "2020-01-01".to_string(),
            publisher: "出版社".to_string(),
            url: "https://book.douban.com/subject/1/".to_string(),
            rating: "4分".to_string(),
            review: review.to_string(),
            date: "2023-01-01".to_string(),
        }
    }

    #[test]
    fn csv_starts_with_bom_and_header() {
        let bytes = to_csv(&[record("书", "")]).unwrap();
        assert_eq!(&bytes[..3], UTF8_BOM);
        let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
        assert!(text.starts_with(
            "\"书名\",\"作者\",\"出版日期\",\"出版社\",\"豆瓣链接\",\"评分\",\"书评内容\",\"评分日期\""
        ));
    }

    #[test]
    fn csv_round_trips_quotes_commas_and_newlines() {
        let tricky = record("他说：\"好书\"", "第一行\n第二行, 带逗号");
        let bytes = to_csv(&[tricky.clone()]).unwrap();

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(&bytes[3..]);
        let row = reader.records().next().unwrap().unwrap();
        assert_eq!(&row[0], tricky.title.as_str());
        assert_eq!(&row[6], tricky.review.as_str());
    }

    #[test]
    fn csv_quotes_every_field() {
        let bytes = to_csv(&[record("书", "")]).unwrap();
        let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
        let data_row = text.lines().nth(1).unwrap();
        assert_eq!(data_row.matches('"').count(), 16);
    }

    #[test]
    fn empty_export_is_rejected() {
        assert!(matches!(to_csv(&[]), Err(ExportError::Empty)));
        assert!(matches!(to_html(&[], "alice", "now"), Err(ExportError::Empty)));
    }

    #[test]
    fn html_escapes_record_text() {
        let hostile = record("<script>alert('x')</script>", "a & b");
        let html = to_html(&[hostile], "alice", "2024-01-01").unwrap();
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;alert(&#039;x&#039;)&lt;/script&gt;"));
        assert!(html.contains("a &amp; b"));
    }

    #[test]
    fn html_counts_reviews() {
        let html = to_html(
            &[record("一", "有书评"), record("二", ""), record("三", "  ")],
            "alice",
            "2024-01-01",
        )
        .unwrap();
        assert!(html.contains(r#"<span class="stat-number">3</span>总书籍数"#));
        assert!(html.contains(r#"<span class="stat-number">1</span>有书评"#));
        assert!(html.contains("暂无书评"));
    }

    #[test]
    fn file_name_pattern() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(
            file_name("alice", ExportFormat::Csv, date),
            "alice_书评_2024-03-09.csv"
        );
        assert_eq!(
            file_name("", ExportFormat::Html, date),
            "douban_书评_2024-03-09.html"
        );
    }
}
