use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Environment variable naming an optional TOML config file.
pub const CONFIG_PATH_ENV: &str = "LINEUP_SYNC_CONFIG";

/// Prefix for structured overrides, e.g. `LINEUP_SYNC_PUBLISH__RESTRICTED=true`.
pub const ENV_PREFIX: &str = "LINEUP_SYNC_";

/// Variables the export job has always been deployed with.
const LEGACY_ENV: &[(&str, &str)] = &[
    ("AWS_BUCKET_NAME", "storage.bucket"),
    ("AWS_FOLDER_NAME", "storage.folder"),
    ("AIOPS_AUTH_EP", "catalog.auth_url"),
    ("AIOPS_AUTH_EP_USER", "catalog.username"),
    ("AIOPS_AUTH_EP_PW", "catalog.api_key"),
    ("AIOPS_RESOURCES_EP", "catalog.resources_url"),
    ("AIOPS_REFERENCES_EP", "catalog.references_url"),
];

/// Legacy variables are merged verbatim as strings; figment's own env
/// parsing would turn a numeric password or folder into an integer.
fn env_figment(base: Figment) -> Figment {
    let legacy = LEGACY_ENV
        .iter()
        .filter_map(|(env, key)| std::env::var(env).ok().map(|value| (*key, value)))
        .fold(base, |figment, (key, value)| {
            figment.merge(Serialized::default(key, value))
        });

    legacy.merge(Env::prefixed(ENV_PREFIX).split("__"))
}

/// Load configuration from the environment, reading the file named by
/// `LINEUP_SYNC_CONFIG` first when that variable is set
pub fn load_config_from_env() -> Result<Config, ConfigError> {
    match std::env::var_os(CONFIG_PATH_ENV) {
        Some(path) => load_config(Path::new(&path)),
        None => extract(env_figment(Figment::new())),
    }
}

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    extract(env_figment(Figment::new().merge(Toml::file(path))))
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

fn extract(figment: Figment) -> Result<Config, ConfigError> {
    figment
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}
