//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that coordinates:
//! - The depth-first worklist of pending visits
//! - Depth, volume, and visited checks before every fetch
//! - Fetching, parsing, and persisting each page with its links
//!
//! The loop runs on a single task. Every fetch is preceded by a fixed delay
//! and nothing else proceeds while it is awaited.

use crate::config::CrawlerConfig;
use crate::crawler::parser::parse_page;
use crate::crawler::{FetchResult, PageFetcher};
use crate::storage::{NewPage, Storage};
use crate::url::validate_seed_url;
use crate::Result;
use chrono::Utc;
use std::time::Duration;
use url::Url;

/// One pending visit on the worklist
#[derive(Debug, Clone)]
struct CrawlItem {
    url: String,
    referrer: Option<String>,
    depth: u32,
}

/// Summary of a finished crawl
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlReport {
    /// Visits that reached the fetch step
    pub pages_attempted: u32,
    /// Pages written to the store
    pub pages_stored: u32,
    /// Visits whose fetch failed
    pub fetch_failures: u32,
    /// Outbound links written to the store
    pub links_found: u64,
}

/// Main crawler coordinator structure
pub struct Coordinator<S: Storage> {
    seed: Url,
    max_depth: u32,
    config: CrawlerConfig,
    fetcher: PageFetcher,
    storage: S,
}

impl<S: Storage> Coordinator<S> {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `seed` - The URL the crawl starts from
    /// * `max_depth` - Deepest level visited (0 = seed page only)
    /// * `config` - The crawler configuration
    /// * `storage` - The store this crawl writes to, owned for the run
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(EvaluatorError)` - The seed is not an absolute URL or the HTTP
    ///   client could not be built
    pub fn new(seed: &str, max_depth: u32, config: CrawlerConfig, storage: S) -> Result<Self> {
        let seed = validate_seed_url(seed)?;
        let fetcher = PageFetcher::new(&config)?;

        Ok(Self {
            seed,
            max_depth,
            config,
            fetcher,
            storage,
        })
    }

    /// The seed URL in the form it is stored under
    pub fn seed_url(&self) -> &str {
        self.seed.as_str()
    }

    /// Runs one crawl from the seed and releases the store
    ///
    /// Fetch failures end their branch only. A storage error aborts the run
    /// and is returned after the store has been dropped.
    pub async fn run(mut self) -> Result<CrawlReport> {
        tracing::info!(
            "Starting crawl of {} (max depth {}, max pages {})",
            self.seed,
            self.max_depth,
            self.config.max_pages
        );

        let report = self.crawl().await?;
        self.storage.close()?;

        tracing::info!(
            "Crawl complete: {} attempted, {} stored, {} failed, {} links",
            report.pages_attempted,
            report.pages_stored,
            report.fetch_failures,
            report.links_found
        );

        Ok(report)
    }

    async fn crawl(&mut self) -> Result<CrawlReport> {
        let mut report = CrawlReport::default();
        let delay = Duration::from_millis(self.config.request_delay_ms);

        let mut worklist = vec![CrawlItem {
            url: self.seed.as_str().to_string(),
            referrer: None,
            depth: 0,
        }];

        while let Some(item) = worklist.pop() {
            if !self.should_visit(&item, &report)? {
                continue;
            }

            report.pages_attempted += 1;
            self.storage.mark_visited(&item.url, Utc::now())?;

            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            tracing::debug!("Fetching {} (depth {})", item.url, item.depth);
            let (final_url, body) = match self.fetcher.fetch(&item.url).await {
                FetchResult::Success {
                    final_url, body, ..
                } => (final_url, body),
                FetchResult::HttpError { status_code } => {
                    tracing::warn!("Unreachable {}: HTTP {}", item.url, status_code);
                    report.fetch_failures += 1;
                    continue;
                }
                FetchResult::NetworkError { error } => {
                    tracing::warn!("Unreachable {}: {}", item.url, error);
                    report.fetch_failures += 1;
                    continue;
                }
            };

            // Relative links resolve against where the request ended up
            let base = match Url::parse(&final_url) {
                Ok(url) => url,
                Err(_) => validate_seed_url(&item.url)?,
            };
            let parsed = parse_page(&body, &base, self.config.content_excerpt_size);

            let page = NewPage {
                url: item.url.clone(),
                source_url: item.referrer.clone(),
                depth: item.depth,
                title: parsed.title,
            };
            self.storage.store_page(&page, &parsed.links)?;

            report.pages_stored += 1;
            report.links_found += parsed.links.len() as u64;
            tracing::info!(
                "Stored {} (depth {}, {} links)",
                item.url,
                item.depth,
                parsed.links.len()
            );

            // Reverse so the first link on the page is visited first
            for link in parsed.links.into_iter().rev() {
                worklist.push(CrawlItem {
                    url: link.url,
                    referrer: Some(item.url.clone()),
                    depth: item.depth + 1,
                });
            }
        }

        Ok(report)
    }

    fn should_visit(&self, item: &CrawlItem, report: &CrawlReport) -> Result<bool> {
        if item.depth > self.max_depth {
            return Ok(false);
        }

        if report.pages_attempted >= self.config.max_pages {
            tracing::debug!("Page limit reached, skipping {}", item.url);
            return Ok(false);
        }

        if self.storage.is_visited(&item.url)? || self.storage.page_exists(&item.url)? {
            tracing::debug!("Already visited {}", item.url);
            return Ok(false);
        }

        Ok(true)
    }
}
