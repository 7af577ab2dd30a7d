use std::path::Path;

use config::{Config, Environment, File, FileFormat};
use eyre::{Context, Result};

use crate::config::models::RelayConfig;

/// Prefix of environment variables overriding file settings,
/// e.g. `API_RELAY__UPSTREAM__ORIGIN=http://10.0.0.5:8000`.
pub const ENV_PREFIX: &str = "API_RELAY";

/// Environment source with the relay's prefix, separators and list keys.
pub fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("upstream.excluded_headers")
        .with_list_parse_key("cors.allow_methods")
        .with_list_parse_key("cors.allow_headers")
}

/// Load configuration from a file using the config crate, then apply environment overrides.
/// Supports multiple formats: YAML, JSON, TOML, etc.
pub async fn load_config(config_path: &str) -> Result<RelayConfig> {
    load_config_sync(config_path)
}

/// Load configuration synchronously
pub fn load_config_sync(config_path: &str) -> Result<RelayConfig> {
    load_config_with_env(config_path, environment())
}

/// Load configuration from `config_path` layered under the given environment source.
pub fn load_config_with_env(config_path: &str, env: Environment) -> Result<RelayConfig> {
    let config_path = Path::new(config_path);

    // Determine file format based on extension
    let format = match config_path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml") | Some("yml") => FileFormat::Yaml,
        Some("json") => FileFormat::Json,
        Some("ini") => FileFormat::Ini,
        _ => FileFormat::Toml,
    };

    let settings = Config::builder()
        .add_source(File::new(
            config_path
                .to_str()
                .ok_or_else(|| eyre::eyre!("Invalid UTF-8 path: {}", config_path.display()))?,
            format,
        ))
        .add_source(env)
        .build()
        .with_context(|| format!("Failed to build config from {}", config_path.display()))?;

    let relay_config: RelayConfig = settings.try_deserialize().with_context(|| {
        format!(
            "Failed to deserialize config from {}",
            config_path.display()
        )
    })?;

    Ok(relay_config)
}
