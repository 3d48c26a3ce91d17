//! Crawler module for web page fetching and processing
//!
//! This module contains the crawling logic, including:
//! - HTTP fetching with failure classification
//! - HTML parsing and link extraction
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod parser;

pub use coordinator::{Coordinator, CrawlReport};
pub use fetcher::{build_http_client, FetchResult, PageFetcher};
pub use parser::{parse_page, ExtractedLink, ParsedPage, NO_CONTENT, NO_TEXT, NO_TITLE};
