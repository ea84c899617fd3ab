//! Logging configuration
//!
//! Diagnostics go to stderr through `tracing-subscriber`; stdout is left to
//! the results report and templates.

use crate::types::SenderError;
use std::io;
use tracing::{debug, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level for this crate when `RUST_LOG` is unset
    pub level: Level,
    /// Emit one JSON object per log line
    pub json_format: bool,
    /// Whether to enable ansi colors in console output
    pub enable_ansi: bool,
    /// Custom environment filter, overrides `level` and `RUST_LOG`
    pub env_filter: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            json_format: false,
            enable_ansi: true,
            env_filter: None,
        }
    }
}

impl LoggingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn with_json_format(mut self) -> Self {
        self.json_format = true;
        self
    }

    pub fn without_ansi(mut self) -> Self {
        self.enable_ansi = false;
        self
    }

    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Directive used when neither a custom filter nor `RUST_LOG` is set
    pub fn default_directive(&self) -> String {
        format!("{}={}", env!("CARGO_PKG_NAME").replace('-', "_"), self.level)
    }

    fn env_filter(&self) -> Result<EnvFilter, SenderError> {
        match &self.env_filter {
            Some(filter) => EnvFilter::try_new(filter).map_err(SenderError::runtime),
            None => Ok(EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(self.default_directive()))),
        }
    }

    /// Install the global tracing subscriber
    ///
    /// # Errors
    ///
    /// `SenderError::RuntimeError` if the filter does not parse or a global
    /// subscriber is already installed.
    pub fn init(self) -> Result<(), SenderError> {
        let registry = Registry::default().with(self.env_filter()?);

        if self.json_format {
            registry
                .with(fmt::layer().json().with_writer(io::stderr))
                .try_init()
                .map_err(SenderError::runtime)?;
        } else {
            registry
                .with(
                    fmt::layer()
                        .compact()
                        .with_writer(io::stderr)
                        .with_ansi(self.enable_ansi),
                )
                .try_init()
                .map_err(SenderError::runtime)?;
        }

        debug!(config = ?self, "logging initialized");
        Ok(())
    }
}
