use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self { log_level: "info".to_string() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub base_url: String,
    /// Per-request timeout. Unset means requests may wait indefinitely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { base_url: "http://127.0.0.1:8080".to_string(), request_timeout_secs: None }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    pub default_days: u32,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self { default_days: 7 }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub report: ReportConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_general_config_default() {
        let config = GeneralConfig::default();
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.base_url, "http://127.0.0.1:8080");
        assert!(config.request_timeout_secs.is_none());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: ClientConfig = toml::from_str(
            r#"
            [server]
            base_url = "http://chores.lan:8080"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.base_url, "http://chores.lan:8080");
        assert_eq!(config.report.default_days, 7);
        assert_eq!(config.general.log_level, "info");
    }
}
