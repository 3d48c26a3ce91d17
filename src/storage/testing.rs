//! Storage wrapper that fails selected writes

use crate::classifier::TopicScores;
use crate::crawler::ExtractedLink;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{LinkRecord, NewPage, PageRecord, PendingLink, SqliteStorage, TopicAverage};
use chrono::{DateTime, Utc};
use std::collections::HashSet;

/// Delegates to SQLite except for the writes it is told to break
pub struct FailingStorage {
    inner: SqliteStorage,
    fail_update_for: Option<i64>,
    fail_store_for: Option<String>,
}

impl FailingStorage {
    pub fn new(inner: SqliteStorage) -> Self {
        Self {
            inner,
            fail_update_for: None,
            fail_store_for: None,
        }
    }

    /// `update_classification` errors for this link ID
    pub fn fail_update_for(mut self, link_id: i64) -> Self {
        self.fail_update_for = Some(link_id);
        self
    }

    /// `store_page` errors for this page URL
    pub fn fail_store_for(mut self, url: &str) -> Self {
        self.fail_store_for = Some(url.to_string());
        self
    }
}

fn injected(what: &str) -> StorageError {
    StorageError::Io(std::io::Error::new(
        std::io::ErrorKind::Other,
        format!("injected failure: {}", what),
    ))
}

impl Storage for FailingStorage {
    fn is_visited(&self, url: &str) -> StorageResult<bool> {
        self.inner.is_visited(url)
    }

    fn mark_visited(&mut self, url: &str, at: DateTime<Utc>) -> StorageResult<usize> {
        self.inner.mark_visited(url, at)
    }

    fn visited_urls(&self) -> StorageResult<HashSet<String>> {
        self.inner.visited_urls()
    }

    fn page_exists(&self, url: &str) -> StorageResult<bool> {
        self.inner.page_exists(url)
    }

    fn store_page(&mut self, page: &NewPage, links: &[ExtractedLink]) -> StorageResult<i64> {
        if self.fail_store_for.as_deref() == Some(page.url.as_str()) {
            return Err(injected(&page.url));
        }
        self.inner.store_page(page, links)
    }

    fn get_page_by_url(&self, url: &str) -> StorageResult<Option<PageRecord>> {
        self.inner.get_page_by_url(url)
    }

    fn get_links_for_page(&self, page_id: i64) -> StorageResult<Vec<LinkRecord>> {
        self.inner.get_links_for_page(page_id)
    }

    fn get_link(&self, link_id: i64) -> StorageResult<LinkRecord> {
        self.inner.get_link(link_id)
    }

    fn fetch_pending_batch(
        &self,
        seed_url: &str,
        limit: u32,
        after_id: Option<i64>,
    ) -> StorageResult<Vec<PendingLink>> {
        self.inner.fetch_pending_batch(seed_url, limit, after_id)
    }

    fn count_pending(&self, seed_url: &str) -> StorageResult<u64> {
        self.inner.count_pending(seed_url)
    }

    fn update_classification(&mut self, link_id: i64, scores: &TopicScores) -> StorageResult<()> {
        if self.fail_update_for == Some(link_id) {
            return Err(injected(&format!("link {}", link_id)));
        }
        self.inner.update_classification(link_id, scores)
    }

    fn clear_classifications(&mut self, seed_url: &str) -> StorageResult<usize> {
        self.inner.clear_classifications(seed_url)
    }

    fn begin_batch(&mut self) -> StorageResult<()> {
        self.inner.begin_batch()
    }

    fn commit_batch(&mut self) -> StorageResult<()> {
        self.inner.commit_batch()
    }

    fn rollback_batch(&mut self) -> StorageResult<()> {
        self.inner.rollback_batch()
    }

    fn topic_averages(&self, seed_url: &str) -> StorageResult<Vec<TopicAverage>> {
        self.inner.topic_averages(seed_url)
    }

    fn count_pages(&self) -> StorageResult<u64> {
        self.inner.count_pages()
    }

    fn count_links(&self) -> StorageResult<u64> {
        self.inner.count_links()
    }

    fn count_visited_links(&self) -> StorageResult<u64> {
        self.inner.count_visited_links()
    }

    fn count_classified(&self, seed_url: &str) -> StorageResult<u64> {
        self.inner.count_classified(seed_url)
    }

    fn close(self) -> StorageResult<()> {
        self.inner.close()
    }
}
