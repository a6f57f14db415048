use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - At least one index mirror, all http(s) URLs without trailing slash
/// - Search path starts with '/'
/// - Request timeouts are non-zero
/// - Concurrency budgets and caps are non-zero
/// - Cache TTL is non-zero
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    // Index validation
    if config.index.mirrors.is_empty() {
        return Err(ConfigError::ValidationError(
            "index.mirrors cannot be empty".to_string(),
        ));
    }
    for mirror in &config.index.mirrors {
        if !mirror.starts_with("http://") && !mirror.starts_with("https://") {
            return Err(ConfigError::ValidationError(format!(
                "index.mirrors entry is not an http(s) URL: {}",
                mirror
            )));
        }
        if mirror.ends_with('/') {
            return Err(ConfigError::ValidationError(format!(
                "index.mirrors entry must not have a trailing slash: {}",
                mirror
            )));
        }
    }
    if !config.index.search_path.starts_with('/') {
        return Err(ConfigError::ValidationError(
            "index.search_path must start with '/'".to_string(),
        ));
    }
    if config.index.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "index.timeout_secs cannot be 0".to_string(),
        ));
    }

    // Metadata validation
    if config.metadata.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "metadata.timeout_secs cannot be 0".to_string(),
        ));
    }

    // Resolver validation
    if config.resolver.max_results == 0 {
        return Err(ConfigError::ValidationError(
            "resolver.max_results cannot be 0".to_string(),
        ));
    }
    if config.resolver.search_concurrency == 0 {
        return Err(ConfigError::ValidationError(
            "resolver.search_concurrency cannot be 0".to_string(),
        ));
    }
    if config.resolver.extract_concurrency == 0 {
        return Err(ConfigError::ValidationError(
            "resolver.extract_concurrency cannot be 0".to_string(),
        ));
    }
    if config.resolver.max_candidates == 0 {
        return Err(ConfigError::ValidationError(
            "resolver.max_candidates cannot be 0".to_string(),
        ));
    }

    // Cache validation
    if config.cache.ttl_secs == 0 {
        return Err(ConfigError::ValidationError(
            "cache.ttl_secs cannot be 0".to_string(),
        ));
    }

    Ok(())
}
