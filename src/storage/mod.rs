//! Storage module for persisting crawl data
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Page and outbound link persistence
//! - Visited markers used for cross-page deduplication
//! - The keyset-paginated classification queue
//! - Per-topic aggregation of classification results

mod schema;
mod sqlite;
mod traits;

#[cfg(test)]
pub(crate) mod testing;

pub use schema::SCHEMA_VERSION;
pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::classifier::TopicScores;

use std::path::Path;

/// Initializes or opens a storage database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStorage)` - Successfully initialized storage
/// * `Err(StorageError)` - Failed to initialize storage
pub fn open_storage(path: &Path) -> StorageResult<SqliteStorage> {
    SqliteStorage::new(path)
}

/// A page about to be written by the crawler
#[derive(Debug, Clone)]
pub struct NewPage {
    pub url: String,
    /// The page that linked here; `None` for the seed
    pub source_url: Option<String>,
    pub depth: u32,
    pub title: String,
}

/// Represents a page in the database
#[derive(Debug, Clone)]
pub struct PageRecord {
    pub id: i64,
    pub url: String,
    pub source_url: Option<String>,
    pub depth: u32,
    pub title: String,
    pub created_at: String,
}

/// Represents an outbound link stored under a page
#[derive(Debug, Clone)]
pub struct LinkRecord {
    pub id: i64,
    pub page_id: i64,
    pub url: String,
    pub link_text: String,
    pub content: String,
    pub topic_scores: Option<TopicScores>,
    pub visited_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// A link waiting for classification, as returned by the queue cursor
#[derive(Debug, Clone, PartialEq)]
pub struct PendingLink {
    pub id: i64,
    pub link_text: String,
    pub content: String,
}

/// Mean confidence of one topic across a seed's classified links
#[derive(Debug, Clone, PartialEq)]
pub struct TopicAverage {
    pub topic: String,
    pub average_score: f64,
    /// Number of classifications that carried this topic
    pub samples: u64,
}
