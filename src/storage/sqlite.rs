//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::classifier::TopicScores;
use crate::crawler::ExtractedLink;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{LinkRecord, NewPage, PageRecord, PendingLink, TopicAverage};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashSet;
use std::path::Path;

const LINK_COLUMNS: &str = "id, page_id, url, link_text, content, topic_scores, visited_at, created_at, updated_at";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// Missing parent directories of `path` are created first.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn page_from_row(row: &Row<'_>) -> rusqlite::Result<PageRecord> {
    Ok(PageRecord {
        id: row.get(0)?,
        url: row.get(1)?,
        source_url: row.get(2)?,
        depth: row.get(3)?,
        title: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn link_from_row(row: &Row<'_>) -> rusqlite::Result<LinkRecord> {
    let raw_scores: Option<String> = row.get(5)?;
    let topic_scores = raw_scores
        .map(|json| serde_json::from_str::<TopicScores>(&json))
        .transpose()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e)))?;

    Ok(LinkRecord {
        id: row.get(0)?,
        page_id: row.get(1)?,
        url: row.get(2)?,
        link_text: row.get(3)?,
        content: row.get(4)?,
        topic_scores,
        visited_at: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

impl Storage for SqliteStorage {
    // ===== Visited Tracking =====

    fn is_visited(&self, url: &str) -> StorageResult<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM links WHERE url = ?1 AND visited_at IS NOT NULL",
            params![url],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn mark_visited(&mut self, url: &str, at: DateTime<Utc>) -> StorageResult<usize> {
        let stamp = at.to_rfc3339();
        let touched = self.conn.execute(
            "UPDATE links SET visited_at = ?1, updated_at = ?1 WHERE url = ?2",
            params![stamp, url],
        )?;
        Ok(touched)
    }

    fn visited_urls(&self) -> StorageResult<HashSet<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT url FROM links WHERE visited_at IS NOT NULL")?;

        let urls = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<HashSet<String>, _>>()?;

        Ok(urls)
    }

    // ===== Page Management =====

    fn page_exists(&self, url: &str) -> StorageResult<bool> {
        let existing: Option<i64> = self
            .conn
            .query_row("SELECT id FROM pages WHERE url = ?1", params![url], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(existing.is_some())
    }

    fn store_page(&mut self, page: &NewPage, links: &[ExtractedLink]) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;

        tx.execute(
            "INSERT OR IGNORE INTO pages (url, source_url, depth, title, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![page.url, page.source_url, page.depth, page.title, now],
        )?;

        let page_id: i64 = tx.query_row(
            "SELECT id FROM pages WHERE url = ?1",
            params![page.url],
            |row| row.get(0),
        )?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO links (page_id, url, link_text, content, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
            )?;
            for link in links {
                stmt.execute(params![page_id, link.url, link.text, link.content, now])?;
            }
        }

        tx.commit()?;
        Ok(page_id)
    }

    fn get_page_by_url(&self, url: &str) -> StorageResult<Option<PageRecord>> {
        let page = self
            .conn
            .query_row(
                "SELECT id, url, source_url, depth, title, created_at FROM pages WHERE url = ?1",
                params![url],
                page_from_row,
            )
            .optional()?;

        Ok(page)
    }

    fn get_links_for_page(&self, page_id: i64) -> StorageResult<Vec<LinkRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM links WHERE page_id = ?1 ORDER BY id",
            LINK_COLUMNS
        ))?;

        let links = stmt
            .query_map(params![page_id], link_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(links)
    }

    fn get_link(&self, link_id: i64) -> StorageResult<LinkRecord> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM links WHERE id = ?1", LINK_COLUMNS),
                params![link_id],
                link_from_row,
            )
            .optional()?
            .ok_or(StorageError::LinkNotFound(link_id))
    }

    // ===== Classification Queue =====

    fn fetch_pending_batch(
        &self,
        seed_url: &str,
        limit: u32,
        after_id: Option<i64>,
    ) -> StorageResult<Vec<PendingLink>> {
        let mut stmt = self.conn.prepare(
            "SELECT l.id, l.link_text, l.content
             FROM links l
             JOIN pages p ON l.page_id = p.id
             WHERE l.topic_scores IS NULL
             AND p.source_url = ?1
             AND l.id > ?2
             ORDER BY l.id
             LIMIT ?3",
        )?;

        let batch = stmt
            .query_map(params![seed_url, after_id.unwrap_or(0), limit], |row| {
                Ok(PendingLink {
                    id: row.get(0)?,
                    link_text: row.get(1)?,
                    content: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(batch)
    }

    fn count_pending(&self, seed_url: &str) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*)
             FROM links l
             JOIN pages p ON l.page_id = p.id
             WHERE l.topic_scores IS NULL
             AND p.source_url = ?1",
            params![seed_url],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn update_classification(&mut self, link_id: i64, scores: &TopicScores) -> StorageResult<()> {
        let json =
            serde_json::to_string(scores).map_err(|e| StorageError::Serialization(e.to_string()))?;
        let now = Utc::now().to_rfc3339();

        let updated = self.conn.execute(
            "UPDATE links SET topic_scores = ?1, updated_at = ?2 WHERE id = ?3",
            params![json, now, link_id],
        )?;

        if updated == 0 {
            return Err(StorageError::LinkNotFound(link_id));
        }
        Ok(())
    }

    fn clear_classifications(&mut self, seed_url: &str) -> StorageResult<usize> {
        let now = Utc::now().to_rfc3339();
        let cleared = self.conn.execute(
            "UPDATE links SET topic_scores = NULL, updated_at = ?2
             WHERE topic_scores IS NOT NULL
             AND page_id IN (SELECT id FROM pages WHERE source_url = ?1)",
            params![seed_url, now],
        )?;
        Ok(cleared)
    }

    fn begin_batch(&mut self) -> StorageResult<()> {
        self.conn.execute_batch("BEGIN")?;
        Ok(())
    }

    fn commit_batch(&mut self) -> StorageResult<()> {
        self.conn.execute_batch("COMMIT")?;
        Ok(())
    }

    fn rollback_batch(&mut self) -> StorageResult<()> {
        if !self.conn.is_autocommit() {
            self.conn.execute_batch("ROLLBACK")?;
        }
        Ok(())
    }

    // ===== Statistics =====

    fn topic_averages(&self, seed_url: &str) -> StorageResult<Vec<TopicAverage>> {
        let mut stmt = self.conn.prepare(
            "SELECT j.key, AVG(CAST(j.value AS REAL)), COUNT(*)
             FROM links l
             JOIN pages p ON l.page_id = p.id
             JOIN json_each(l.topic_scores) AS j
             WHERE l.topic_scores IS NOT NULL
             AND p.source_url = ?1
             GROUP BY j.key
             ORDER BY j.key",
        )?;

        let averages = stmt
            .query_map(params![seed_url], |row| {
                Ok(TopicAverage {
                    topic: row.get(0)?,
                    average_score: row.get(1)?,
                    samples: row.get::<_, i64>(2)? as u64,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(averages)
    }

    fn count_pages(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM pages", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_links(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM links", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_visited_links(&self) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM links WHERE visited_at IS NOT NULL",
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn count_classified(&self, seed_url: &str) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*)
             FROM links l
             JOIN pages p ON l.page_id = p.id
             WHERE l.topic_scores IS NOT NULL
             AND p.source_url = ?1",
            params![seed_url],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    // ===== Lifecycle =====

    fn close(self) -> StorageResult<()> {
        self.conn.close().map_err(|(_, e)| StorageError::Sqlite(e))
    }
}
