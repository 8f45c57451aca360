//! Server configuration.
//!
//! Read from an optional TOML file, then overridden by `CALBRIDGE_*`
//! environment variables (`CALBRIDGE_BIND_ADDRESS`, `CALBRIDGE_WEBHOOK_ADDRESS`...).

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use calbridge_provider_google::DEFAULT_API_BASE;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;

use crate::bridge::BridgeSettings;

const ENV_PREFIX: &str = "CALBRIDGE";
const CONFIG_PATH_VAR: &str = "CALBRIDGE_CONFIG";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
    /// Public https URL Google should call on calendar changes
    pub webhook_address: Option<String>,
    pub google_api_base: String,
    pub time_zone: String,
    pub provider_timeout_secs: u64,
    pub log_format: LogFormat,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind_address: "127.0.0.1:4096".to_string(),
            webhook_address: None,
            google_api_base: DEFAULT_API_BASE.to_string(),
            time_zone: "UTC".to_string(),
            provider_timeout_secs: 10,
            log_format: LogFormat::Pretty,
        }
    }
}

impl ServerConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let file = match std::env::var_os(CONFIG_PATH_VAR) {
            // An explicitly named file has to exist
            Some(path) => File::from(PathBuf::from(path)).required(true),
            None => File::from(Self::default_path()?).required(false),
        };

        Self::build(
            Config::builder().add_source(file),
            Environment::with_prefix(ENV_PREFIX),
        )
    }

    /// `<config_dir>/calbridge/config.toml`
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join("calbridge").join("config.toml"))
            .ok_or_else(|| ConfigError::Message("Could not determine config directory".into()))
    }

    fn build(
        builder: ConfigBuilder<DefaultState>,
        env: Environment,
    ) -> Result<Self, ConfigError> {
        let mut config: ServerConfig = builder
            .add_source(env.try_parsing(true))
            .build()?
            .try_deserialize()?;

        // An empty override means "no webhook"
        config.webhook_address = config.webhook_address.filter(|a| !a.trim().is_empty());

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.socket_addr()?;

        if let Some(address) = &self.webhook_address {
            if !address.starts_with("https://") {
                return Err(ConfigError::Message(format!(
                    "webhook_address must be an https URL, got {address}"
                )));
            }
        }

        if self.time_zone.trim().is_empty() {
            return Err(ConfigError::Message("time_zone must not be empty".into()));
        }

        if self.provider_timeout_secs == 0 {
            return Err(ConfigError::Message(
                "provider_timeout_secs must be greater than zero".into(),
            ));
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind_address.parse().map_err(|e| {
            ConfigError::Message(format!("Invalid bind_address {}: {e}", self.bind_address))
        })
    }

    pub fn bridge_settings(&self) -> BridgeSettings {
        BridgeSettings {
            webhook_address: self.webhook_address.clone(),
            time_zone: self.time_zone.clone(),
            provider_timeout: Duration::from_secs(self.provider_timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{FileFormat, Map};

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map: Map<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::with_prefix(ENV_PREFIX).source(Some(map))
    }

    fn from_toml(toml: &str, vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        ServerConfig::build(
            Config::builder().add_source(File::from_str(toml, FileFormat::Toml)),
            env(vars),
        )
    }

    #[test]
    fn test_defaults() {
        let config = from_toml("", &[]).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.socket_addr().unwrap().port(), 4096);
        assert_eq!(
            config.bridge_settings().provider_timeout,
            Duration::from_secs(10)
        );
    }

    #[test]
    fn test_file_values() {
        let config = from_toml(
            r#"
            bind_address = "0.0.0.0:8080"
            webhook_address = "https://bridge.example.com/webhook/google-calendar"
            time_zone = "Europe/Berlin"
            log_format = "json"
            "#,
            &[],
        )
        .unwrap();

        assert_eq!(config.bind_address, "0.0.0.0:8080");
        assert_eq!(config.time_zone, "Europe/Berlin");
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(
            config.bridge_settings().webhook_address.as_deref(),
            Some("https://bridge.example.com/webhook/google-calendar")
        );
    }

    #[test]
    fn test_env_overrides_file() {
        let config = from_toml(
            r#"time_zone = "Europe/Berlin""#,
            &[
                ("CALBRIDGE_TIME_ZONE", "America/New_York"),
                ("CALBRIDGE_PROVIDER_TIMEOUT_SECS", "3"),
            ],
        )
        .unwrap();

        assert_eq!(config.time_zone, "America/New_York");
        assert_eq!(config.provider_timeout_secs, 3);
    }

    #[test]
    fn test_empty_webhook_override_disables_registration() {
        let config = from_toml(
            r#"webhook_address = "https://bridge.example.com/hook""#,
            &[("CALBRIDGE_WEBHOOK_ADDRESS", "")],
        )
        .unwrap();

        assert_eq!(config.webhook_address, None);
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(from_toml(r#"webhook_address = "http://insecure.example.com""#, &[]).is_err());
        assert!(from_toml(r#"bind_address = "localhost""#, &[]).is_err());
        assert!(from_toml(r#"time_zone = " ""#, &[]).is_err());
        assert!(from_toml("provider_timeout_secs = 0", &[]).is_err());
        assert!(from_toml(r#"log_format = "xml""#, &[]).is_err());
    }
}
