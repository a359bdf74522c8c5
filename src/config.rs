// Client configuration read from the environment.
//
// Responsibilities
// - Provide defaults that work for local development.
// - Derive every persisted key from one storage namespace.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_STORAGE_NAMESPACE: &str = "InventoryApp";
pub const DEFAULT_STORAGE_PATH: &str = "./inventory_state.json";
pub const DEFAULT_ALERT_DELAY_SECS: u64 = 3;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be a whole number of seconds, got {value:?}")]
    InvalidSeconds { name: &'static str, value: String },

    #[error("{name} must not be empty")]
    Empty { name: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    pub notifications_enabled: String,
    pub notifications: String,
    pub last_known_percent: String,
    pub access_token: String,
}

impl StorageKeys {
    pub fn new(namespace: &str) -> Self {
        Self {
            notifications_enabled: format!("{namespace}.notificationsEnabled"),
            notifications: format!("{namespace}.notifications"),
            last_known_percent: format!("{namespace}.lastKnownPercentByItemId"),
            access_token: format!("{namespace}.accessToken"),
        }
    }
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self::new(DEFAULT_STORAGE_NAMESPACE)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub storage_namespace: String,
    pub storage_path: PathBuf,
    pub alert_delay: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            storage_namespace: DEFAULT_STORAGE_NAMESPACE.to_string(),
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            alert_delay: Duration::from_secs(DEFAULT_ALERT_DELAY_SECS),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let api_base_url = non_empty("INVENTORY_API_BASE_URL", lookup("INVENTORY_API_BASE_URL"))?
            .unwrap_or(defaults.api_base_url);
        let storage_namespace = non_empty(
            "INVENTORY_STORAGE_NAMESPACE",
            lookup("INVENTORY_STORAGE_NAMESPACE"),
        )?
        .unwrap_or(defaults.storage_namespace);
        let storage_path = non_empty("INVENTORY_STORAGE_PATH", lookup("INVENTORY_STORAGE_PATH"))?
            .map(PathBuf::from)
            .unwrap_or(defaults.storage_path);
        let alert_delay = match lookup("INVENTORY_ALERT_DELAY_SECS") {
            Some(value) => value
                .trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| ConfigError::InvalidSeconds {
                    name: "INVENTORY_ALERT_DELAY_SECS",
                    value,
                })?,
            None => defaults.alert_delay,
        };
        Ok(Self {
            api_base_url,
            storage_namespace,
            storage_path,
            alert_delay,
        })
    }

    pub fn storage_keys(&self) -> StorageKeys {
        StorageKeys::new(&self.storage_namespace)
    }
}

fn non_empty(name: &'static str, value: Option<String>) -> Result<Option<String>, ConfigError> {
    match value {
        Some(v) if v.trim().is_empty() => Err(ConfigError::Empty { name }),
        other => Ok(other),
    }
}

#[cfg(test)]
mod config_tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[rstest]
    fn it_should_fall_back_to_defaults() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(
            config.storage_keys().last_known_percent,
            "InventoryApp.lastKnownPercentByItemId"
        );
    }

    #[rstest]
    fn it_should_read_overrides() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("INVENTORY_API_BASE_URL", "https://inventory.example"),
            ("INVENTORY_STORAGE_NAMESPACE", "Warehouse"),
            ("INVENTORY_ALERT_DELAY_SECS", "0"),
        ]))
        .unwrap();
        assert_eq!(config.api_base_url, "https://inventory.example");
        assert_eq!(config.alert_delay, Duration::ZERO);
        assert_eq!(config.storage_keys().notifications, "Warehouse.notifications");
    }

    #[rstest]
    #[case("INVENTORY_ALERT_DELAY_SECS", "soon")]
    #[case("INVENTORY_STORAGE_NAMESPACE", "  ")]
    fn it_should_reject_invalid_values(#[case] name: &str, #[case] value: &str) {
        assert!(ClientConfig::from_lookup(lookup(&[(name, value)])).is_err());
    }
}
