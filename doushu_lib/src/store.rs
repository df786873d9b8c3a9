//! SQLite storage for crawled record sets.

use std::path::Path;

use doushu_scrape::BookRecord;
use rusqlite::{params, Connection, OptionalExtension};

const CURRENT_SUBJECT_KEY: &str = "current_subject";

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Keyed persistence for record sets, one namespace per subject.
///
/// `get` on an absent subject returns an empty sequence, never an error;
/// `put` replaces the subject's whole set atomically.
pub trait RecordStore {
    fn put(&mut self, subject_id: &str, records: &[BookRecord]) -> Result<(), StoreError>;
    fn get(&self, subject_id: &str) -> Result<Vec<BookRecord>, StoreError>;
    fn delete(&mut self, subject_id: &str) -> Result<(), StoreError>;
    fn put_current_subject(&mut self, subject_id: &str) -> Result<(), StoreError>;
    fn get_current_subject(&self) -> Result<Option<String>, StoreError>;
}

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    pub fn init(&self) -> Result<(), StoreError> {
        let version: i32 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;

        let schema = include_str!("../schema/sqlite.sql");
        self.conn.execute_batch(schema)?;

        if version < 1 {
            self.conn.pragma_update(None, "user_version", 1)?;
        }

        Ok(())
    }

    fn get_meta(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value = self
            .conn
            .query_row("SELECT value FROM meta WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set_meta(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO meta (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }
}

impl RecordStore for SqliteStore {
    fn put(&mut self, subject_id: &str, records: &[BookRecord]) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "DELETE FROM books WHERE subject_id = ?1",
            params![subject_id],
        )?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO books
                   (subject_id, position, title, author, publish_date,
                    publisher, url, rating, review, rated_date)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            )?;
            for (position, record) in records.iter().enumerate() {
                stmt.execute(params![
                    subject_id,
                    position as i64,
                    record.title,
                    record.author,
                    record.publish_date,
                    record.publisher,
                    record.url,
                    record.rating,
                    record.review,
                    record.date,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn get(&self, subject_id: &str) -> Result<Vec<BookRecord>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT title, author, publish_date, publisher, url, rating, review, rated_date
             FROM books WHERE subject_id = ?1 ORDER BY position",
        )?;
        let rows = stmt.query_map(params![subject_id], |row| {
            Ok(BookRecord {
                title: row.get(0)?,
                author: row.get(1)?,
                publish_date: row.get(2)?,
                publisher: row.get(3)?,
                url: row.get(4)?,
                rating: row.get(5)?,
                review: row.get(6)?,
                date: row.get(7)?,
            })
        })?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    fn delete(&mut self, subject_id: &str) -> Result<(), StoreError> {
        self.conn.execute(
            "DELETE FROM books WHERE subject_id = ?1",
            params![subject_id],
        )?;
        Ok(())
    }

    fn put_current_subject(&mut self, subject_id: &str) -> Result<(), StoreError> {
        self.set_meta(CURRENT_SUBJECT_KEY, subject_id)
    }

    fn get_current_subject(&self) -> Result<Option<String>, StoreError> {
        self.get_meta(CURRENT_SUBJECT_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str) -> BookRecord {
        BookRecord {
            title: title.to_string(),
            author: "作者".to_string(),
            publish_date: "2020-01-01".to_string(),
            publisher: "出版社".to_string(),
            url: format!("/subject/{}/", title.len()),
            rating: "4分".to_string(),
            review: String::new(),
            date: "2023-01-01".to_string(),
        }
    }

    fn store() -> SqliteStore {
        let store = SqliteStore::open_in_memory().unwrap();
        store.init().unwrap();
        store
    }

    #[test]
    fn put_then_get_round_trips() {
        let mut store = store();
        let records = vec![record("一"), record("二")];
        store.put("alice", &records).unwrap();
        assert_eq!(store.get("alice").unwrap(), records);
    }

    #[test]
    fn get_missing_subject_is_empty() {
        let store = store();
        assert!(store.get("nobody").unwrap().is_empty());
    }

    #[test]
    fn put_replaces_the_whole_set() {
        let mut store = store();
        store.put("alice", &[record("旧一"), record("旧二")]).unwrap();
        store.put("alice", &[record("新")]).unwrap();
        let records = store.get("alice").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "新");
    }

    #[test]
    fn subjects_are_isolated() {
        let mut store = store();
        store.put("alice", &[record("a")]).unwrap();
        store.put("bob", &[record("b"), record("bb")]).unwrap();
        store.delete("alice").unwrap();
        assert!(store.get("alice").unwrap().is_empty());
        assert_eq!(store.get("bob").unwrap().len(), 2);
    }

    #[test]
    fn delete_twice_is_idempotent() {
        let mut store = store();
        store.put("alice", &[record("a")]).unwrap();
        store.delete("alice").unwrap();
        let after_once = store.get("alice").unwrap();
        store.delete("alice").unwrap();
        assert_eq!(store.get("alice").unwrap(), after_once);
        assert!(after_once.is_empty());
    }

    #[test]
    fn current_subject_round_trips() {
        let mut store = store();
        assert_eq!(store.get_current_subject().unwrap(), None);
        store.put_current_subject("alice").unwrap();
        store.put_current_subject("bob").unwrap();
        assert_eq!(store.get_current_subject().unwrap(), Some("bob".into()));
    }

    #[test]
    fn init_twice_is_safe() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.init().unwrap();
        store.init().unwrap();
    }
}
