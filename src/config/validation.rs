use crate::config::types::{
    Config, FetchConfig, FetcherKind, OutputConfig, PartitionConfig, SearchConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_search_config(&config.search)?;
    validate_fetch_config(&config.fetch)?;
    validate_partition_config(&config.partition)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates search configuration
fn validate_search_config(config: &SearchConfig) -> Result<(), ConfigError> {
    let has_keywords = config.keywords.iter().any(|k| !k.trim().is_empty());
    let has_entity = config
        .entity
        .as_deref()
        .is_some_and(|e| !e.trim().is_empty());

    if !has_keywords && !has_entity {
        return Err(ConfigError::Validation(
            "at least one keyword or an entity is required".to_string(),
        ));
    }

    if let (Some(start), Some(end)) = (config.start_date, config.end_date) {
        if start > end {
            return Err(ConfigError::Validation(format!(
                "start-date {} is after end-date {}",
                start, end
            )));
        }
    }

    Ok(())
}

/// Validates fetch configuration
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.wait_for_request_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "wait-for-request-secs must be >= 1, got {}",
            config.wait_for_request_secs
        )));
    }

    if config.stop_after_n < 1 {
        return Err(ConfigError::Validation(format!(
            "stop-after-n must be >= 1, got {}",
            config.stop_after_n
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' must use HTTP or HTTPS",
            config.base_url
        )));
    }

    // Fragments never leave the client over plain HTTP
    if config.fetcher == FetcherKind::Http && config.base_url.contains('#') {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' carries the query in its fragment, which the http fetcher cannot send; use fetcher = \"browser\"",
            config.base_url
        )));
    }

    if config.poll_interval_ms < 1 {
        return Err(ConfigError::Validation(format!(
            "poll-interval-ms must be >= 1, got {}",
            config.poll_interval_ms
        )));
    }

    Ok(())
}

/// Validates partition configuration
fn validate_partition_config(config: &PartitionConfig) -> Result<(), ConfigError> {
    if config.batches < 2 {
        return Err(ConfigError::Validation(format!(
            "batches must be >= 2, got {}",
            config.batches
        )));
    }
    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.csv_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "csv-path cannot be empty".to_string(),
        ));
    }
    Ok(())
}
