use std::path::PathBuf;

use courier_gateway::GatewayConfig;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 5000;

const API_KEY_VAR: &str = "DIALOG_API_KEY";
const API_URL_VAR: &str = "API_URL";
const PORT_VAR: &str = "PORT";
const MESSAGES_FILE_VAR: &str = "COURIER_MESSAGES_FILE";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("PORT is not a valid port number: {0}")]
    InvalidPort(String),
}

#[derive(Debug, Clone)]
pub struct CourierConfig {
    pub gateway: GatewayConfig,
    pub port: u16,
    /// Message log location; `None` uses the platform data directory.
    pub messages_file: Option<PathBuf>,
}

impl CourierConfig {
    /// Reads the process environment, after loading `.env` when present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &'static str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let api_key = read(API_KEY_VAR).ok_or(ConfigError::Missing(API_KEY_VAR))?;
        let base_url = read(API_URL_VAR).ok_or(ConfigError::Missing(API_URL_VAR))?;

        let port = match read(PORT_VAR) {
            Some(raw) => raw.parse::<u16>().map_err(|_| ConfigError::InvalidPort(raw))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            gateway: GatewayConfig::new(base_url, api_key),
            port,
            messages_file: read(MESSAGES_FILE_VAR).map(PathBuf::from),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_port_and_data_path() {
        let cfg = CourierConfig::from_lookup(lookup(&[
            ("DIALOG_API_KEY", "key"),
            ("API_URL", "https://waba.example.com"),
        ]))
        .unwrap();
        assert_eq!(cfg.port, DEFAULT_PORT);
        assert_eq!(cfg.gateway.api_key, "key");
        assert_eq!(cfg.gateway.base_url, "https://waba.example.com");
        assert!(cfg.messages_file.is_none());
    }

    #[test]
    fn reads_optional_overrides() {
        let cfg = CourierConfig::from_lookup(lookup(&[
            ("DIALOG_API_KEY", "key"),
            ("API_URL", "https://waba.example.com"),
            ("PORT", "8080"),
            ("COURIER_MESSAGES_FILE", "/var/lib/courier/log.json"),
        ]))
        .unwrap();
        assert_eq!(cfg.port, 8080);
        assert_eq!(
            cfg.messages_file,
            Some(PathBuf::from("/var/lib/courier/log.json"))
        );
    }

    #[test]
    fn credentials_are_required() {
        let err = CourierConfig::from_lookup(lookup(&[("API_URL", "https://x")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("DIALOG_API_KEY"));

        let err = CourierConfig::from_lookup(lookup(&[("DIALOG_API_KEY", "key"), ("API_URL", " ")]))
            .unwrap_err();
        assert_eq!(err, ConfigError::Missing("API_URL"));
    }

    #[test]
    fn rejects_bad_port() {
        let err = CourierConfig::from_lookup(lookup(&[
            ("DIALOG_API_KEY", "key"),
            ("API_URL", "https://x"),
            ("PORT", "eighty"),
        ]))
        .unwrap_err();
        assert_eq!(err, ConfigError::InvalidPort("eighty".into()));
    }
}
