//! Tracing setup for applications embedding the pipeline.
//!
//! The library only emits `tracing` events (targets `medigen::http`,
//! `medigen::retry`, `medigen::audio`); installing a subscriber is left to
//! the application, optionally through [`init_tracing`].

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::error::LlmError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    /// `EnvFilter` directives, used when `RUST_LOG` is not set.
    pub filter: String,
    /// Emit one JSON object per event instead of human readable lines.
    pub json: bool,
    pub with_target: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            filter: "medigen=info".to_string(),
            json: false,
            with_target: true,
        }
    }
}

impl TracingConfig {
    /// Verbose, human readable output.
    pub fn development() -> Self {
        Self {
            filter: "medigen=debug".to_string(),
            ..Self::default()
        }
    }

    /// Warnings and errors as JSON.
    pub fn production() -> Self {
        Self {
            filter: "medigen=warn".to_string(),
            json: true,
            with_target: true,
        }
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    pub const fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    fn env_filter(&self) -> Result<EnvFilter, LlmError> {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return Ok(filter);
        }
        EnvFilter::try_new(&self.filter).map_err(|e| {
            LlmError::ConfigurationError(format!("invalid tracing filter '{}': {e}", self.filter))
        })
    }
}

/// Install a global fmt subscriber.
///
/// Returns `Ok(false)` when a global subscriber is already installed.
pub fn init_tracing(config: &TracingConfig) -> Result<bool, LlmError> {
    let filter = config.env_filter()?;
    let registry = tracing_subscriber::registry().with(filter);
    let installed = if config.json {
        registry
            .with(fmt::layer().json().with_target(config.with_target))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(config.with_target))
            .try_init()
    };
    Ok(installed.is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets() {
        assert_eq!(TracingConfig::development().filter, "medigen=debug");
        assert!(TracingConfig::production().json);
        assert!(!TracingConfig::default().json);
    }

    #[test]
    fn second_init_is_a_no_op() {
        let config = TracingConfig::default();
        let _ = init_tracing(&config).unwrap();
        assert!(!init_tracing(&config).unwrap());
    }
}
