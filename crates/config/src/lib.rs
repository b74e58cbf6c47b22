//! Configuration management for the sales pipeline engine
//!
//! Supports loading configuration from:
//! - YAML/TOML files (`config/default`, `config/{env}`)
//! - Environment variables (`SALES_AGENT_` prefix, `__` separator)
//! - Standalone scoring files (`ScoringConfig::load`)

pub mod pipeline;
pub mod qualification;
pub mod scoring;
pub mod settings;

pub use pipeline::{PipelineConfig, StageProbabilities};
pub use qualification::{CriterionKeywords, QualificationConfig};
pub use scoring::{PersonaGrading, ScoreWeights, ScoringConfig, TierThresholds};
pub use settings::{
    load_settings, load_settings_from, ObservabilityConfig, PersistenceBackend, PersistenceConfig,
    RuntimeEnvironment, ServerConfig, Settings,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
