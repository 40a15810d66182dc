//! services/widget/src/config.rs
//!
//! Defines the widget's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use crate::adapters::webhook::PayloadMode;
use crate::chat::format::GREETING;
use crate::chat::resolver::DEFAULT_REQUEST_TIMEOUT;
use crate::chat::session::{SessionConfig, DEFAULT_HISTORY_LIMIT};
use std::path::PathBuf;
use std::time::Duration;
use storefront_chat_core::ClientId;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub webhook_url: String,
    pub payload_mode: PayloadMode,
    pub catalog_url: Option<String>,
    pub order_lookup_url: Option<String>,
    pub transcript_dir: Option<PathBuf>,
    pub client_id: ClientId,
    pub history_limit: usize,
    pub request_timeout: Duration,
    pub log_level: Level,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- Outbound Endpoints ---
        let webhook_url = lookup("WEBHOOK_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingVar("WEBHOOK_URL".to_string()))?;

        let payload_str = lookup("WEBHOOK_PAYLOAD").unwrap_or_else(|| "conversation".to_string());
        let payload_mode = payload_str.parse::<PayloadMode>().map_err(|_| {
            ConfigError::InvalidValue(
                "WEBHOOK_PAYLOAD".to_string(),
                format!("'{}' is not one of 'conversation' or 'message'", payload_str),
            )
        })?;

        let catalog_url = lookup("CATALOG_URL").filter(|v| !v.trim().is_empty());
        let order_lookup_url = lookup("ORDER_LOOKUP_URL").filter(|v| !v.trim().is_empty());

        // --- Persistence ---
        let transcript_dir = lookup("TRANSCRIPT_DIR")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);
        let client_id = lookup("CLIENT_ID")
            .filter(|v| !v.trim().is_empty())
            .map(ClientId::new)
            .unwrap_or_else(ClientId::generate);

        let history_limit = match lookup("HISTORY_LIMIT") {
            Some(raw) => raw
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| {
                    ConfigError::InvalidValue(
                        "HISTORY_LIMIT".to_string(),
                        format!("'{}' is not a positive integer", raw),
                    )
                })?,
            None => DEFAULT_HISTORY_LIMIT,
        };

        let request_timeout = match lookup("REQUEST_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|n| *n > 0)
                .map(Duration::from_secs)
                .ok_or_else(|| {
                    ConfigError::InvalidValue(
                        "REQUEST_TIMEOUT_SECS".to_string(),
                        format!("'{}' is not a positive number of seconds", raw),
                    )
                })?,
            None => DEFAULT_REQUEST_TIMEOUT,
        };

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            webhook_url,
            payload_mode,
            catalog_url,
            order_lookup_url,
            transcript_dir,
            client_id,
            history_limit,
            request_timeout,
            log_level,
        })
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            client_id: self.client_id.clone(),
            history_limit: self.history_limit,
            greeting: GREETING.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn webhook_url_is_required() {
        let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar(ref v) if v == "WEBHOOK_URL"));
    }

    #[test]
    fn defaults_apply_when_only_webhook_is_set() {
        let config =
            Config::from_lookup(lookup_from(&[("WEBHOOK_URL", "http://localhost/hook")])).unwrap();
        assert_eq!(config.payload_mode, PayloadMode::Conversation);
        assert_eq!(config.history_limit, 100);
        assert_eq!(config.request_timeout, Duration::from_secs(15));
        assert_eq!(config.log_level, Level::INFO);
        assert!(config.catalog_url.is_none());
        assert!(config.transcript_dir.is_none());
    }

    #[test]
    fn explicit_values_are_parsed() {
        let config = Config::from_lookup(lookup_from(&[
            ("WEBHOOK_URL", "http://localhost/hook"),
            ("WEBHOOK_PAYLOAD", "message"),
            ("CLIENT_ID", "kiosk-7"),
            ("HISTORY_LIMIT", "20"),
            ("REQUEST_TIMEOUT_SECS", "3"),
            ("TRANSCRIPT_DIR", "/tmp/chats"),
            ("RUST_LOG", "debug"),
        ]))
        .unwrap();
        assert_eq!(config.payload_mode, PayloadMode::LatestMessage);
        assert_eq!(config.client_id, ClientId::new("kiosk-7"));
        assert_eq!(config.history_limit, 20);
        assert_eq!(config.request_timeout, Duration::from_secs(3));
        assert_eq!(config.transcript_dir, Some(PathBuf::from("/tmp/chats")));
        assert_eq!(config.session_config().history_limit, 20);
    }

    #[test]
    fn zero_history_limit_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[
            ("WEBHOOK_URL", "http://localhost/hook"),
            ("HISTORY_LIMIT", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref v, _) if v == "HISTORY_LIMIT"));
    }
}
