//! Topic classification of stored links
//!
//! This module contains:
//! - The [`TopicScorer`] trait and its HTTP zero-shot implementation
//! - The resumable queue driver that scores every pending link of a seed

mod queue;
mod scorer;

pub use queue::{ClassificationReport, LinkClassifier};
pub use scorer::{HttpZeroShotScorer, TopicScorer};

use std::collections::BTreeMap;
use thiserror::Error;

/// Confidence in [0, 1] per topic label
pub type TopicScores = BTreeMap<String, f64>;

/// Labels every link is scored against
pub const DEFAULT_TOPICS: [&str; 5] = [
    "technology",
    "sports",
    "politics",
    "entertainment",
    "science",
];

/// Errors produced while scoring a single text
#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("Scorer request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Scorer returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed scorer response: {0}")]
    Malformed(String),
}

/// Builds the label set for a run
///
/// The defaults come first, then `additional` in the given order. Repeated
/// labels are kept.
pub fn topic_labels(additional: &[String]) -> Vec<String> {
    DEFAULT_TOPICS
        .iter()
        .map(|t| t.to_string())
        .chain(additional.iter().cloned())
        .collect()
}
