//! services/widget/src/error.rs
//!
//! Defines the primary error type for the widget service.

use crate::config::ConfigError;

/// The primary error type for the `widget` service.
///
/// Only start-up and host I/O failures use it; a running session degrades every
/// external failure to fallback text instead.
#[derive(Debug, thiserror::Error)]
pub enum WidgetError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error building the HTTP client.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Represents a standard Input/Output error (e.g., reading stdin).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
