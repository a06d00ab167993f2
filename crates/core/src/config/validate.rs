use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Database pool has at least one connection
/// - Crawler page ceiling and concurrency are at least 1
/// - TMDB API key is present when the crawler is enabled
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.database.max_connections == 0 {
        return Err(ConfigError::ValidationError(
            "database.max_connections must be at least 1".to_string(),
        ));
    }

    if config.crawler.max_pages == 0 {
        return Err(ConfigError::ValidationError(
            "crawler.max_pages must be at least 1".to_string(),
        ));
    }

    if config.crawler.concurrency == 0 {
        return Err(ConfigError::ValidationError(
            "crawler.concurrency must be at least 1".to_string(),
        ));
    }

    if config.crawler.enabled && config.catalog.api_key.is_empty() {
        return Err(ConfigError::ValidationError(
            "catalog.api_key (or TMDB_KEY) is required when the crawler is enabled".to_string(),
        ));
    }

    Ok(())
}
