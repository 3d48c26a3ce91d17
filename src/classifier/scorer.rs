//! Topic scorers
//!
//! A scorer maps a piece of text and a list of candidate labels to one
//! confidence per label. The queue driver only sees the [`TopicScorer`]
//! trait, so tests can swap in a deterministic implementation.

use crate::classifier::{ScoreError, TopicScores};
use crate::config::ClassifierConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Scores a text against candidate topic labels
#[async_trait]
pub trait TopicScorer {
    /// Returns a confidence in [0, 1] for each label
    async fn score(&self, text: &str, labels: &[String]) -> Result<TopicScores, ScoreError>;
}

#[async_trait]
impl<T: TopicScorer + Sync + ?Sized> TopicScorer for &T {
    async fn score(&self, text: &str, labels: &[String]) -> Result<TopicScores, ScoreError> {
        (**self).score(text, labels).await
    }
}

#[derive(Debug, Serialize)]
struct ZeroShotRequest<'a> {
    inputs: &'a str,
    parameters: ZeroShotParameters<'a>,
}

#[derive(Debug, Serialize)]
struct ZeroShotParameters<'a> {
    candidate_labels: &'a [String],
    multi_label: bool,
    hypothesis_template: &'a str,
}

#[derive(Debug, Deserialize)]
struct ZeroShotOutput {
    labels: Vec<String>,
    scores: Vec<f64>,
}

/// Inference servers answer with either a bare object or a list holding one
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ZeroShotResponse {
    Single(ZeroShotOutput),
    Batch(Vec<ZeroShotOutput>),
}

/// Zero-shot NLI classifier served over HTTP
///
/// Speaks the Hugging Face inference API's zero-shot classification format.
/// Every label is scored independently (`multi_label`), so confidences do
/// not sum to one.
pub struct HttpZeroShotScorer {
    client: Client,
    endpoint: String,
    api_token: Option<String>,
    hypothesis_template: String,
}

impl HttpZeroShotScorer {
    pub fn new(
        endpoint: impl Into<String>,
        api_token: Option<String>,
        hypothesis_template: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ScoreError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_token,
            hypothesis_template: hypothesis_template.into(),
        })
    }

    /// Builds a scorer from configuration, reading the token from the
    /// configured environment variable
    pub fn from_config(config: &ClassifierConfig) -> Result<Self, ScoreError> {
        let api_token = config
            .api_token_env
            .as_deref()
            .and_then(|var| std::env::var(var).ok())
            .filter(|token| !token.trim().is_empty());

        if api_token.is_none() {
            tracing::warn!("No scorer API token found; sending unauthenticated requests");
        }

        Self::new(
            config.endpoint.clone(),
            api_token,
            config.hypothesis_template.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }
}

#[async_trait]
impl TopicScorer for HttpZeroShotScorer {
    async fn score(&self, text: &str, labels: &[String]) -> Result<TopicScores, ScoreError> {
        let request = ZeroShotRequest {
            inputs: text,
            parameters: ZeroShotParameters {
                candidate_labels: labels,
                multi_label: true,
                hypothesis_template: &self.hypothesis_template,
            },
        };

        let mut builder = self.client.post(&self.endpoint).json(&request);
        if let Some(token) = &self.api_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ScoreError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        parse_response(&body)
    }
}

fn parse_response(body: &str) -> Result<TopicScores, ScoreError> {
    let parsed: ZeroShotResponse =
        serde_json::from_str(body).map_err(|e| ScoreError::Malformed(e.to_string()))?;

    let output = match parsed {
        ZeroShotResponse::Single(output) => output,
        ZeroShotResponse::Batch(mut outputs) => {
            if outputs.len() != 1 {
                return Err(ScoreError::Malformed(format!(
                    "expected one result, got {}",
                    outputs.len()
                )));
            }
            outputs.remove(0)
        }
    };

    if output.labels.len() != output.scores.len() {
        return Err(ScoreError::Malformed(format!(
            "{} labels but {} scores",
            output.labels.len(),
            output.scores.len()
        )));
    }

    Ok(output.labels.into_iter().zip(output.scores).collect())
}
