use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::Config;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("State path cannot be empty")]
    EmptyStatePath,

    #[error("Invalid timeout: {0}. Must be positive")]
    InvalidTimeout(u64),

    #[error("Invalid history cap: {0}. Must be at least 2")]
    InvalidHistoryCap(usize),

    #[error("Invalid suggestion confidence: {0}. Must be within (0, 1]")]
    InvalidSuggestConfidence(f64),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .stoa/config.yaml (project config)
    /// 3. .stoa/local.yaml (project local overrides, optional)
    /// 4. Environment variables (STOA_* prefix, highest priority)
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(".stoa/config.yaml"))
            .merge(Yaml::file(".stoa/local.yaml"))
            .merge(Env::prefixed("STOA_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        if config.state.path.is_empty() {
            return Err(ConfigError::EmptyStatePath);
        }

        if config.generation.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout(config.generation.timeout_secs));
        }

        if config.generation.model.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "generation model cannot be empty".to_string(),
            ));
        }

        let t = &config.thresholds;
        if t.history_cap < 2 {
            return Err(ConfigError::InvalidHistoryCap(t.history_cap));
        }
        if !(t.suggest_min_confidence > 0.0 && t.suggest_min_confidence <= 1.0) {
            return Err(ConfigError::InvalidSuggestConfidence(
                t.suggest_min_confidence,
            ));
        }
        if t.marker_utterance_chars > t.long_utterance_chars {
            return Err(ConfigError::ValidationFailed(format!(
                "marker_utterance_chars ({}) must not exceed long_utterance_chars ({})",
                t.marker_utterance_chars, t.long_utterance_chars
            )));
        }
        if t.lecture_max_chars <= t.guidance_min_reply_chars {
            return Err(ConfigError::ValidationFailed(format!(
                "lecture_max_chars ({}) must exceed guidance_min_reply_chars ({})",
                t.lecture_max_chars, t.guidance_min_reply_chars
            )));
        }
        if t.max_reply_chars <= t.guidance_min_reply_chars {
            return Err(ConfigError::ValidationFailed(format!(
                "max_reply_chars ({}) must exceed guidance_min_reply_chars ({})",
                t.max_reply_chars, t.guidance_min_reply_chars
            )));
        }

        Ok(())
    }
}
