//! Classification queue driver
//!
//! Pulls a seed's unclassified links in ID-ordered batches, scores each one,
//! and commits every batch as a single transaction. The cursor always moves
//! past a batch, so a link the scorer failed on stays pending for the next
//! run instead of being retried in this one.

use crate::classifier::{topic_labels, TopicScorer, TopicScores};
use crate::config::{ClassifierConfig, TextSource};
use crate::storage::{PendingLink, Storage};
use crate::url::validate_seed_url;
use crate::Result;

/// Summary of a classification run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassificationReport {
    /// Pending links counted before the first batch
    pub total_pending: u64,
    /// Links whose scores were written
    pub classified: u64,
    /// Links left pending after a scorer failure
    pub skipped: u64,
    /// Batches committed
    pub batches: u64,
}

/// Drives the classification queue for one seed
pub struct LinkClassifier<S: Storage, C: TopicScorer> {
    seed_url: String,
    labels: Vec<String>,
    config: ClassifierConfig,
    storage: S,
    scorer: C,
}

impl<S: Storage, C: TopicScorer> LinkClassifier<S, C> {
    /// Creates a queue driver scoped to `seed`
    ///
    /// The seed is normalized the same way the crawler stores it, so
    /// `https://a.test` and `https://a.test/` select the same links.
    pub fn new(seed: &str, config: ClassifierConfig, storage: S, scorer: C) -> Result<Self> {
        let seed_url = validate_seed_url(seed)?.to_string();
        let labels = topic_labels(&config.additional_topics);

        Ok(Self {
            seed_url,
            labels,
            config,
            storage,
            scorer,
        })
    }

    /// The labels every link is scored against
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Scores every pending link of the seed and releases the store
    pub async fn classify_all_pending(mut self) -> Result<ClassificationReport> {
        let report = self.drain().await?;
        self.storage.close()?;
        Ok(report)
    }

    async fn drain(&mut self) -> Result<ClassificationReport> {
        let mut report = ClassificationReport {
            total_pending: self.storage.count_pending(&self.seed_url)?,
            ..ClassificationReport::default()
        };

        tracing::info!(
            "Classifying {} pending links for {} against {} topics",
            report.total_pending,
            self.seed_url,
            self.labels.len()
        );

        let mut cursor: Option<i64> = None;
        loop {
            let batch =
                self.storage
                    .fetch_pending_batch(&self.seed_url, self.config.batch_size, cursor)?;
            let Some(last) = batch.last() else {
                break;
            };
            cursor = Some(last.id);

            self.storage.begin_batch()?;
            if let Err(e) = self.classify_batch(&batch, &mut report).await {
                if let Err(rollback_err) = self.storage.rollback_batch() {
                    tracing::error!("Rollback failed: {}", rollback_err);
                }
                return Err(e);
            }
            self.storage.commit_batch()?;
            report.batches += 1;

            tracing::info!(
                "Batch {} committed: {}/{} classified, {} skipped",
                report.batches,
                report.classified,
                report.total_pending,
                report.skipped
            );
        }

        tracing::info!(
            "Classification complete: {} classified, {} skipped",
            report.classified,
            report.skipped
        );

        Ok(report)
    }

    async fn classify_batch(
        &mut self,
        batch: &[PendingLink],
        report: &mut ClassificationReport,
    ) -> Result<()> {
        for link in batch {
            let text = match self.config.text_source {
                TextSource::LinkText => &link.link_text,
                TextSource::Content => &link.content,
            };

            let scores = match self.scorer.score(text, &self.labels).await {
                Ok(scores) => scores,
                Err(e) => {
                    tracing::warn!("Skipping link {}: {}", link.id, e);
                    report.skipped += 1;
                    continue;
                }
            };

            if let Err(reason) = check_scores(&scores) {
                tracing::warn!("Skipping link {}: {}", link.id, reason);
                report.skipped += 1;
                continue;
            }

            self.storage.update_classification(link.id, &scores)?;
            report.classified += 1;
            tracing::debug!("Classified link {}", link.id);
        }

        Ok(())
    }
}

/// A usable result has at least one label and every score within [0, 1]
fn check_scores(scores: &TopicScores) -> std::result::Result<(), String> {
    if scores.is_empty() {
        return Err("scorer returned no topics".to_string());
    }

    for (topic, score) in scores {
        if !(0.0..=1.0).contains(score) {
            return Err(format!("score {} for '{}' is out of range", score, topic));
        }
    }

    Ok(())
}
