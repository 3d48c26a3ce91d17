//! url-evaluator: crawl a site, record its link graph, classify link topics
//!
//! This crate implements a bounded crawler that records pages and their
//! outbound links in SQLite, a resumable queue that scores each pending link
//! against a set of topic labels, and a reporting layer that averages the
//! resulting confidences per topic.

pub mod classifier;
pub mod config;
pub mod crawler;
pub mod output;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for url-evaluator operations
#[derive(Debug, Error)]
pub enum EvaluatorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL '{url}': {reason}")]
    Parse { url: String, reason: String },

    #[error("URL has no host: {0}")]
    MissingHost(String),
}

/// Result type alias for url-evaluator operations
pub type Result<T> = std::result::Result<T, EvaluatorError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use classifier::{LinkClassifier, TopicScorer, TopicScores, DEFAULT_TOPICS};
pub use config::Config;
pub use crawler::Coordinator;
pub use storage::{SqliteStorage, Storage};
pub use crate::url::{is_valid_url, validate_seed_url};
