//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::classifier::TopicScores;
use crate::crawler::ExtractedLink;
use crate::storage::{LinkRecord, NewPage, PageRecord, PendingLink, TopicAverage};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Link not found: {0}")]
    LinkNotFound(i64),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// The store is the only writer of crawl state. The crawl controller and the
/// classification queue each own one handle for the duration of their run
/// and release it through [`Storage::close`] (or by dropping it on an error
/// path).
///
/// Queue and reporting queries are scoped by a seed URL: they only consider
/// links stored under pages whose `source_url` equals that seed.
pub trait Storage {
    // ===== Visited Tracking =====

    /// Returns true if any link pointing at `url` has been marked visited
    fn is_visited(&self, url: &str) -> StorageResult<bool>;

    /// Stamps every link pointing at `url` as visited
    ///
    /// Returns the number of links touched. Zero is not an error: the seed
    /// URL has no incoming link when it is first visited.
    fn mark_visited(&mut self, url: &str, at: DateTime<Utc>) -> StorageResult<usize>;

    /// Gets every destination URL that has been marked visited
    fn visited_urls(&self) -> StorageResult<HashSet<String>>;

    // ===== Page Management =====

    /// Returns true if a page row exists for `url`
    fn page_exists(&self, url: &str) -> StorageResult<bool>;

    /// Inserts a page (ignored if the URL is already stored) and its links
    ///
    /// Links carry no uniqueness constraint, so calling this twice for the
    /// same URL duplicates the links. Callers must store a page only once.
    ///
    /// # Returns
    ///
    /// The ID of the page row
    fn store_page(&mut self, page: &NewPage, links: &[ExtractedLink]) -> StorageResult<i64>;

    /// Gets a page by URL
    fn get_page_by_url(&self, url: &str) -> StorageResult<Option<PageRecord>>;

    /// Gets all links stored under a page, in insertion order
    fn get_links_for_page(&self, page_id: i64) -> StorageResult<Vec<LinkRecord>>;

    /// Gets a link by ID
    fn get_link(&self, link_id: i64) -> StorageResult<LinkRecord>;

    // ===== Classification Queue =====

    /// Fetches the next batch of unclassified links for a seed
    ///
    /// Returns at most `limit` links with an ID strictly greater than
    /// `after_id` (all IDs when `None`), ordered by ID ascending.
    fn fetch_pending_batch(
        &self,
        seed_url: &str,
        limit: u32,
        after_id: Option<i64>,
    ) -> StorageResult<Vec<PendingLink>>;

    /// Counts the unclassified links for a seed
    fn count_pending(&self, seed_url: &str) -> StorageResult<u64>;

    /// Records the topic scores of one link
    fn update_classification(&mut self, link_id: i64, scores: &TopicScores) -> StorageResult<()>;

    /// Clears the classifications of a seed's links so they are queued again
    ///
    /// Returns the number of links reset.
    fn clear_classifications(&mut self, seed_url: &str) -> StorageResult<usize>;

    /// Opens a transaction grouping one batch's writes
    fn begin_batch(&mut self) -> StorageResult<()>;

    /// Commits the open batch transaction
    fn commit_batch(&mut self) -> StorageResult<()>;

    /// Rolls back the open batch transaction, if any
    fn rollback_batch(&mut self) -> StorageResult<()>;

    // ===== Statistics =====

    /// Averages each topic's confidence over a seed's classified links
    ///
    /// Sorted by topic name.
    fn topic_averages(&self, seed_url: &str) -> StorageResult<Vec<TopicAverage>>;

    /// Gets total page count
    fn count_pages(&self) -> StorageResult<u64>;

    /// Gets total link count
    fn count_links(&self) -> StorageResult<u64>;

    /// Counts links whose destination has been visited
    fn count_visited_links(&self) -> StorageResult<u64>;

    /// Counts classified links for a seed
    fn count_classified(&self, seed_url: &str) -> StorageResult<u64>;

    // ===== Lifecycle =====

    /// Releases the underlying connection
    fn close(self) -> StorageResult<()>
    where
        Self: Sized;
}
