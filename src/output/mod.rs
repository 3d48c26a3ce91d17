//! Output module for reporting crawl and classification results
//!
//! This module handles:
//! - Averaging topic confidences over a seed's classified links
//! - Printing store statistics

pub mod stats;

pub use stats::{load_statistics, print_statistics, StoreStatistics};

use crate::storage::{Storage, TopicAverage};
use crate::url::validate_seed_url;
use crate::Result;

/// Averages each topic's confidence over the links found under a seed
///
/// Only links on pages whose source URL is the seed are considered. Topics
/// are sorted by name; a seed with no classified links yields an empty list.
///
/// # Arguments
///
/// * `storage` - The storage backend containing classification results
/// * `seed` - The seed URL the crawl started from
///
/// # Returns
///
/// * `Ok(Vec<TopicAverage>)` - One entry per topic seen in the results
/// * `Err(EvaluatorError)` - Invalid seed or failed query
pub fn aggregate_topic_scores(storage: &dyn Storage, seed: &str) -> Result<Vec<TopicAverage>> {
    let seed = validate_seed_url(seed)?;
    Ok(storage.topic_averages(seed.as_str())?)
}

/// Renders the topic averages as an aligned table
pub fn format_topic_averages(seed: &str, averages: &[TopicAverage]) -> String {
    let mut out = format!("=== Topic Averages for {} ===\n\n", seed);

    if averages.is_empty() {
        out.push_str("No classified links.\n");
        return out;
    }

    let width = averages
        .iter()
        .map(|a| a.topic.chars().count())
        .max()
        .unwrap_or(0)
        .max("Topic".len());

    out.push_str(&format!("{:<width$}  {:>7}  {:>7}\n", "Topic", "Average", "Links"));
    for average in averages {
        out.push_str(&format!(
            "{:<width$}  {:>7.4}  {:>7}\n",
            average.topic, average.average_score, average.samples
        ));
    }

    out
}

/// Prints the topic averages to stdout
pub fn print_topic_averages(seed: &str, averages: &[TopicAverage]) {
    print!("{}", format_topic_averages(seed, averages));
}
