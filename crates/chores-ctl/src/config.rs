use std::fs;
use std::net::IpAddr;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chores_common::config::ClientConfig;
use reqwest::Url;
use tracing::{debug, info, warn};

/// Default configuration file path
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("household-chores")
        .join("client.toml")
}

/// Load from `path`, or the default location when none is given.
pub fn load(path: Option<&Path>) -> Result<ClientConfig> {
    match path {
        Some(path) => load_from_path(path),
        None => load_from_path(&default_config_path()),
    }
}

/// Load configuration from a specific path, creating a default file if it doesn't exist
pub fn load_from_path(config_path: &Path) -> Result<ClientConfig> {
    debug!("Loading client configuration from {:?}", config_path);

    if !config_path.exists() {
        info!("Configuration file not found at {:?}, creating default configuration", config_path);
        let default_config = ClientConfig::default();
        save_to_path(&default_config, config_path)?;
        return Ok(default_config);
    }

    let content = fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

    let config: ClientConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", config_path))?;

    Ok(config)
}

pub fn save_to_path(config: &ClientConfig, config_path: &Path) -> Result<()> {
    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
    }

    let content =
        toml::to_string_pretty(config).context("Failed to serialize configuration to TOML")?;

    fs::write(config_path, content)
        .with_context(|| format!("Failed to write config file: {:?}", config_path))?;

    debug!("Saved client configuration to {:?}", config_path);
    Ok(())
}

fn is_loopback(url: &Url) -> bool {
    match url.host_str() {
        Some("localhost") => true,
        Some(host) => host
            .trim_start_matches('[')
            .trim_end_matches(']')
            .parse::<IpAddr>()
            .is_ok_and(|ip| ip.is_loopback()),
        None => false,
    }
}

/// Validate the configuration settings
pub fn validate(config: &ClientConfig) -> Result<()> {
    let url = Url::parse(&config.server.base_url)
        .with_context(|| format!("Invalid server URL: {}", config.server.base_url))?;

    if !matches!(url.scheme(), "http" | "https") {
        bail!("Server URL must use http or https: {}", config.server.base_url);
    }

    if config.report.default_days == 0 {
        bail!("report.default_days must be at least 1");
    }

    // PINs travel in request bodies.
    if url.scheme() == "http" && !is_loopback(&url) {
        warn!("Server {} is not local and not using https - the parent PIN is sent in clear text", url);
    }

    if config.server.request_timeout_secs == Some(0) {
        warn!("server.request_timeout_secs is 0 - every request will time out immediately");
    }

    debug!("Configuration validation passed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_creates_default_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("client.toml");

        let config = load_from_path(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.server.base_url, "http://127.0.0.1:8080");

        let reloaded = load_from_path(&path).unwrap();
        assert_eq!(reloaded.report.default_days, config.report.default_days);
    }

    #[test]
    fn test_save_and_load_custom_values() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("client.toml");

        let mut config = ClientConfig::default();
        config.server.base_url = "https://chores.example.org".to_string();
        config.server.request_timeout_secs = Some(10);
        config.report.default_days = 14;
        save_to_path(&config, &path).unwrap();

        let loaded = load_from_path(&path).unwrap();
        assert_eq!(loaded.server.base_url, "https://chores.example.org");
        assert_eq!(loaded.server.request_timeout_secs, Some(10));
        assert_eq!(loaded.report.default_days, 14);
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("client.toml");
        fs::write(&path, "[server\nbase_url = 1").unwrap();

        let err = load_from_path(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_validate() {
        let mut config = ClientConfig::default();
        assert!(validate(&config).is_ok());

        config.server.base_url = "not a url".to_string();
        assert!(validate(&config).is_err());

        config.server.base_url = "ftp://chores.lan".to_string();
        assert!(validate(&config).is_err());

        config.server.base_url = "http://chores.lan:8080".to_string();
        assert!(validate(&config).is_ok());

        config.report.default_days = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_loopback_detection() {
        assert!(is_loopback(&Url::parse("http://localhost:8080").unwrap()));
        assert!(is_loopback(&Url::parse("http://127.0.0.1:8080").unwrap()));
        assert!(is_loopback(&Url::parse("http://[::1]:8080").unwrap()));
        assert!(!is_loopback(&Url::parse("http://192.168.1.20:8080").unwrap()));
    }
}
