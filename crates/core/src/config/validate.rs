use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Bucket and folder are set
/// - Catalog endpoints are http(s) URLs
/// - Catalog username is set
/// - Restricted mode has at least one channel to let through
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.storage.bucket.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "storage.bucket cannot be empty".to_string(),
        ));
    }
    if config.storage.folder.trim().trim_matches('/').is_empty() {
        return Err(ConfigError::ValidationError(
            "storage.folder cannot be empty".to_string(),
        ));
    }

    let endpoints = [
        ("catalog.auth_url", &config.catalog.auth_url),
        ("catalog.resources_url", &config.catalog.resources_url),
        ("catalog.references_url", &config.catalog.references_url),
    ];
    for (name, url) in endpoints {
        validate_url(name, url)?;
    }

    if config.catalog.username.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "catalog.username cannot be empty".to_string(),
        ));
    }

    if config.publish.restricted && config.publish.restricted_channels.is_empty() {
        return Err(ConfigError::ValidationError(
            "publish.restricted_channels cannot be empty when publish.restricted is set"
                .to_string(),
        ));
    }

    Ok(())
}

fn validate_url(name: &str, url: &str) -> Result<(), ConfigError> {
    if url.trim().is_empty() {
        return Err(ConfigError::ValidationError(format!("{} cannot be empty", name)));
    }
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ConfigError::ValidationError(format!(
            "{} must be an http(s) URL, got '{}'",
            name, url
        )));
    }
    Ok(())
}
