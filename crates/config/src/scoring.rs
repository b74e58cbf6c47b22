//! Lead Scoring Configuration
//!
//! Weights, tier thresholds and grading constants for the scoring engine.
//! Loaded as the `scoring` section of the settings or from a standalone
//! `scoring.yaml`.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default)]
    pub weights: ScoreWeights,
    #[serde(default)]
    pub tiers: TierThresholds,
    /// Per-signal decay for intent scoring, in (0, 1). `m` matched signals
    /// score `100 * (1 - decay^m)`.
    #[serde(default = "default_intent_decay")]
    pub intent_decay: f64,
    /// Linear fall-off for a point value outside a target range, as a
    /// fraction of the range midpoint
    #[serde(default = "default_range_tolerance")]
    pub range_tolerance: f64,
    #[serde(default)]
    pub persona: PersonaGrading,
}

fn default_intent_decay() -> f64 {
    0.5
}

fn default_range_tolerance() -> f64 {
    0.5
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            tiers: TierThresholds::default(),
            intent_decay: default_intent_decay(),
            range_tolerance: default_range_tolerance(),
            persona: PersonaGrading::default(),
        }
    }
}

/// Sub-score weights; must sum to 1.0
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    #[serde(default = "default_company_weight")]
    pub company_fit: f64,
    #[serde(default = "default_persona_weight")]
    pub persona_fit: f64,
    #[serde(default = "default_intent_weight")]
    pub intent_signals: f64,
    #[serde(default = "default_quality_weight")]
    pub data_quality: f64,
}

fn default_company_weight() -> f64 {
    0.40
}
fn default_persona_weight() -> f64 {
    0.30
}
fn default_intent_weight() -> f64 {
    0.20
}
fn default_quality_weight() -> f64 {
    0.10
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            company_fit: default_company_weight(),
            persona_fit: default_persona_weight(),
            intent_signals: default_intent_weight(),
            data_quality: default_quality_weight(),
        }
    }
}

impl ScoreWeights {
    pub fn sum(&self) -> f64 {
        self.company_fit + self.persona_fit + self.intent_signals + self.data_quality
    }
}

/// Composite thresholds; a score equal to a threshold takes the higher tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierThresholds {
    #[serde(default = "default_hot")]
    pub hot: u32,
    #[serde(default = "default_warm")]
    pub warm: u32,
}

fn default_hot() -> u32 {
    75
}
fn default_warm() -> u32 {
    50
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            hot: default_hot(),
            warm: default_warm(),
        }
    }
}

/// Persona-fit grades
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaGrading {
    /// Principal contact's title matches a persona
    #[serde(default = "default_principal_match")]
    pub principal_match: u32,
    /// Some other contact's title matches a persona
    #[serde(default = "default_secondary_match")]
    pub secondary_match: u32,
    /// Ceiling for a partial (token-overlap) match
    #[serde(default = "default_partial_ceiling")]
    pub partial_ceiling: u32,
}

fn default_principal_match() -> u32 {
    100
}
fn default_secondary_match() -> u32 {
    70
}
fn default_partial_ceiling() -> u32 {
    50
}

impl Default for PersonaGrading {
    fn default() -> Self {
        Self {
            principal_match: default_principal_match(),
            secondary_match: default_secondary_match(),
            partial_ceiling: default_partial_ceiling(),
        }
    }
}

impl ScoringConfig {
    /// Load from a YAML (or `.toml`) file and validate
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ConfigError::FileNotFound(format!("{}: {}", path.as_ref().display(), e))
        })?;

        let is_toml = path.as_ref().extension().and_then(|e| e.to_str()) == Some("toml");
        let config: ScoringConfig = if is_toml {
            toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?
        } else {
            serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let weights = [
            ("scoring.weights.company_fit", self.weights.company_fit),
            ("scoring.weights.persona_fit", self.weights.persona_fit),
            ("scoring.weights.intent_signals", self.weights.intent_signals),
            ("scoring.weights.data_quality", self.weights.data_quality),
        ];
        for (field, weight) in weights {
            if !(0.0..=1.0).contains(&weight) {
                return Err(ConfigError::invalid(
                    field,
                    format!("Must be between 0.0 and 1.0, got {}", weight),
                ));
            }
        }

        let sum = self.weights.sum();
        if (sum - 1.0).abs() > 1e-6 {
            return Err(ConfigError::invalid(
                "scoring.weights",
                format!("Weights must sum to 1.0, got {:.4}", sum),
            ));
        }

        if self.tiers.hot > 100 || self.tiers.warm >= self.tiers.hot {
            return Err(ConfigError::invalid(
                "scoring.tiers",
                format!(
                    "Expected warm < hot <= 100, got warm={} hot={}",
                    self.tiers.warm, self.tiers.hot
                ),
            ));
        }

        if !(self.intent_decay > 0.0 && self.intent_decay < 1.0) {
            return Err(ConfigError::invalid(
                "scoring.intent_decay",
                format!("Must be strictly between 0.0 and 1.0, got {}", self.intent_decay),
            ));
        }

        if self.range_tolerance <= 0.0 {
            return Err(ConfigError::invalid(
                "scoring.range_tolerance",
                format!("Must be positive, got {}", self.range_tolerance),
            ));
        }

        let persona = &self.persona;
        if persona.principal_match > 100
            || persona.secondary_match > persona.principal_match
            || persona.partial_ceiling > persona.secondary_match
        {
            return Err(ConfigError::invalid(
                "scoring.persona",
                "Expected partial_ceiling <= secondary_match <= principal_match <= 100",
            ));
        }

        Ok(())
    }
}
