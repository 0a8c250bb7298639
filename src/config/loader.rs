//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::RelayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable naming an optional TOML config file.
pub const CONFIG_PATH_ENV: &str = "RELAY_CONFIG";
/// Environment variable overriding `listener.port`.
pub const PORT_ENV: &str = "PORT";
/// Environment variable overriding `listener.host`.
pub const HOST_ENV: &str = "RELAY_HOST";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {name}: {value:?}")]
    Env { name: &'static str, value: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<RelayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: RelayConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// A validated configuration and the file it came from, if any.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: RelayConfig,
    pub source: Option<PathBuf>,
}

/// Build the runtime configuration from the process environment.
///
/// Starts from the file named by `RELAY_CONFIG` (or defaults), then applies
/// `PORT` and `RELAY_HOST`.
pub fn load_from_env() -> Result<LoadedConfig, ConfigError> {
    let source = std::env::var(CONFIG_PATH_ENV)
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from);

    load(source, std::env::var(PORT_ENV).ok(), std::env::var(HOST_ENV).ok())
}

/// Load `source` (or defaults), apply listener overrides and validate.
pub fn load(
    source: Option<PathBuf>,
    port: Option<String>,
    host: Option<String>,
) -> Result<LoadedConfig, ConfigError> {
    let mut config = match &source {
        Some(path) => load_config(path)?,
        None => RelayConfig::default(),
    };

    apply_overrides(&mut config, port, host)?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(LoadedConfig { config, source })
}

/// Apply listener overrides. Empty values are ignored.
pub fn apply_overrides(
    config: &mut RelayConfig,
    port: Option<String>,
    host: Option<String>,
) -> Result<(), ConfigError> {
    if let Some(port) = port.filter(|p| !p.trim().is_empty()) {
        config.listener.port = port.trim().parse().map_err(|_| ConfigError::Env {
            name: PORT_ENV,
            value: port.clone(),
        })?;
    }
    if let Some(host) = host.filter(|h| !h.trim().is_empty()) {
        config.listener.host = host.trim().to_string();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::HostMatch;

    #[test]
    fn port_override_replaces_default() {
        let mut config = RelayConfig::default();
        apply_overrides(&mut config, Some("8088".into()), None).unwrap();
        assert_eq!(config.listener.port, 8088);
        assert_eq!(config.listener.host, "0.0.0.0");
    }

    #[test]
    fn blank_overrides_are_ignored() {
        let mut config = RelayConfig::default();
        apply_overrides(&mut config, Some("".into()), Some(" ".into())).unwrap();
        assert_eq!(config.listener.port, 3001);
        assert_eq!(config.listener.host, "0.0.0.0");
    }

    #[test]
    fn bad_port_is_an_error() {
        let mut config = RelayConfig::default();
        let err = apply_overrides(&mut config, Some("http".into()), None).unwrap_err();
        assert!(matches!(err, ConfigError::Env { name: PORT_ENV, .. }));
    }

    #[test]
    fn loads_file_from_disk() {
        let path = std::env::temp_dir().join(format!("image-relay-{}.toml", std::process::id()));
        fs::write(
            &path,
            "[upstream]\nallowed_hosts = [\"example.org\"]\nhost_match = \"suffix\"\n",
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(config.upstream.allowed_hosts, vec!["example.org"]);
        assert_eq!(config.upstream.host_match, HostMatch::Suffix);
    }

    #[test]
    fn load_reports_source_and_applies_overrides() {
        let path = std::env::temp_dir().join(format!("image-relay-source-{}.toml", std::process::id()));
        fs::write(&path, "[listener]\nport = 4000\n").unwrap();

        let loaded = load(Some(path.clone()), Some("4100".into()), None).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(loaded.source.as_deref(), Some(path.as_path()));
        assert_eq!(loaded.config.listener.port, 4100);
    }

    #[test]
    fn load_without_source_uses_defaults() {
        let loaded = load(None, None, None).unwrap();
        assert!(loaded.source.is_none());
        assert_eq!(loaded.config.listener.port, 3001);
    }

    #[test]
    fn invalid_file_reports_validation_errors() {
        let path = std::env::temp_dir().join(format!("image-relay-invalid-{}.toml", std::process::id()));
        fs::write(&path, "[upstream]\nallowed_hosts = []\n").unwrap();

        let err = load_config(&path).unwrap_err();
        let _ = fs::remove_file(&path);

        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("allowed_hosts"));
    }
}
