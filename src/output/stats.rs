//! Statistics generation from the results database
//!
//! This module provides functionality for extracting and displaying
//! store statistics from the storage layer.

use crate::storage::Storage;
use crate::url::validate_seed_url;
use crate::Result;

/// Store statistics summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStatistics {
    /// Seed URL the classification counts are scoped to
    pub seed_url: String,

    /// Total number of pages stored
    pub total_pages: u64,

    /// Total number of links stored
    pub total_links: u64,

    /// Links whose destination has been visited
    pub visited_links: u64,

    /// Links under the seed that carry topic scores
    pub classified_links: u64,

    /// Links under the seed still waiting for classification
    pub pending_links: u64,
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
/// * `seed` - Seed URL used to scope the classification counts
///
/// # Returns
///
/// * `Ok(StoreStatistics)` - Successfully loaded statistics
/// * `Err(EvaluatorError)` - Invalid seed or failed query
pub fn load_statistics(storage: &dyn Storage, seed: &str) -> Result<StoreStatistics> {
    let seed = validate_seed_url(seed)?;
    let seed_url = seed.as_str();

    Ok(StoreStatistics {
        seed_url: seed_url.to_string(),
        total_pages: storage.count_pages()?,
        total_links: storage.count_links()?,
        visited_links: storage.count_visited_links()?,
        classified_links: storage.count_classified(seed_url)?,
        pending_links: storage.count_pending(seed_url)?,
    })
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &StoreStatistics) {
    println!("=== Store Statistics ===\n");

    println!("Overview:");
    println!("  Total pages stored: {}", stats.total_pages);
    println!("  Total links found: {}", stats.total_links);
    println!(
        "  Visited links: {} ({:.1}%)",
        stats.visited_links,
        percentage(stats.visited_links, stats.total_links)
    );
    println!();

    let queued = stats.classified_links + stats.pending_links;
    println!("Classification ({}):", stats.seed_url);
    println!("  Classified: {}", stats.classified_links);
    println!("  Pending: {}", stats.pending_links);
    println!(
        "  Progress: {:.1}% ({} / {} links)",
        percentage(stats.classified_links, queued),
        stats.classified_links,
        queued
    );
}

fn percentage(part: u64, whole: u64) -> f64 {
    if whole > 0 {
        (part as f64 / whole as f64) * 100.0
    } else {
        0.0
    }
}
