use crate::config::types::{ClassifierConfig, Config, CrawlerConfig, OutputConfig};
use crate::url::is_valid_url;
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_classifier_config(&config.classifier)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    // max_depth >= 0 is always true for u32, so no check needed

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.content_excerpt_size < 1 {
        return Err(ConfigError::Validation(
            "content_excerpt_size must be >= 1".to_string(),
        ));
    }

    if config.fetch_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "fetch_timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates classifier configuration
fn validate_classifier_config(config: &ClassifierConfig) -> Result<(), ConfigError> {
    if config.batch_size < 1 {
        return Err(ConfigError::Validation(format!(
            "batch_size must be >= 1, got {}",
            config.batch_size
        )));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "classifier timeout_secs must be >= 1".to_string(),
        ));
    }

    if !is_valid_url(&config.endpoint) {
        return Err(ConfigError::InvalidUrl(format!(
            "Invalid classifier endpoint '{}'",
            config.endpoint
        )));
    }

    if !config.hypothesis_template.contains("{}") {
        return Err(ConfigError::Validation(format!(
            "hypothesis_template must contain '{{}}', got '{}'",
            config.hypothesis_template
        )));
    }

    if let Some(var) = &config.api_token_env {
        if var.trim().is_empty() {
            return Err(ConfigError::Validation(
                "api_token_env cannot be empty when set".to_string(),
            ));
        }
    }

    validate_topics(&config.additional_topics)
}

/// Additional topics must be non-empty labels
///
/// Duplicates are allowed, including repeats of the default topics.
fn validate_topics(topics: &[String]) -> Result<(), ConfigError> {
    for topic in topics {
        if topic.trim().is_empty() {
            return Err(ConfigError::Validation(
                "additional topic labels cannot be empty".to_string(),
            ));
        }
    }
    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}
