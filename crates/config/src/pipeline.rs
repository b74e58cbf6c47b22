//! Pipeline configuration

use sales_agent_core::PipelineStage;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Close probability per stage, used for weighted value
    #[serde(default)]
    pub probabilities: StageProbabilities,

    /// Let the qualification driver move a QUALIFICATION deal on its own
    /// once the BANT verdict is decisive
    #[serde(default = "default_true")]
    pub auto_advance_on_qualification: bool,
}

fn default_true() -> bool {
    true
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            probabilities: StageProbabilities::default(),
            auto_advance_on_qualification: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StageProbabilities {
    #[serde(default = "default_lead")]
    pub lead: f64,
    #[serde(default = "default_qualification")]
    pub qualification: f64,
    #[serde(default = "default_discovery")]
    pub discovery: f64,
    #[serde(default = "default_proposal")]
    pub proposal: f64,
    #[serde(default = "default_negotiation")]
    pub negotiation: f64,
    #[serde(default = "default_closed_won")]
    pub closed_won: f64,
    #[serde(default)]
    pub closed_lost: f64,
}

fn default_lead() -> f64 {
    0.1
}
fn default_qualification() -> f64 {
    0.2
}
fn default_discovery() -> f64 {
    0.4
}
fn default_proposal() -> f64 {
    0.6
}
fn default_negotiation() -> f64 {
    0.8
}
fn default_closed_won() -> f64 {
    1.0
}

impl Default for StageProbabilities {
    fn default() -> Self {
        Self {
            lead: default_lead(),
            qualification: default_qualification(),
            discovery: default_discovery(),
            proposal: default_proposal(),
            negotiation: default_negotiation(),
            closed_won: default_closed_won(),
            closed_lost: 0.0,
        }
    }
}

impl StageProbabilities {
    pub fn get(&self, stage: PipelineStage) -> f64 {
        match stage {
            PipelineStage::Lead => self.lead,
            PipelineStage::Qualification => self.qualification,
            PipelineStage::Discovery => self.discovery,
            PipelineStage::Proposal => self.proposal,
            PipelineStage::Negotiation => self.negotiation,
            PipelineStage::ClosedWon => self.closed_won,
            PipelineStage::ClosedLost => self.closed_lost,
        }
    }
}

impl PipelineConfig {
    /// Probabilities must lie in [0, 1], increase strictly along the open
    /// path up to CLOSED_WON = 1.0, and CLOSED_LOST must be 0.0
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.probabilities;

        for stage in PipelineStage::ALL {
            let value = p.get(stage);
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::invalid(
                    format!("pipeline.probabilities.{}", stage.as_str().to_lowercase()),
                    format!("Must be between 0.0 and 1.0, got {}", value),
                ));
            }
        }

        let path = [
            PipelineStage::Lead,
            PipelineStage::Qualification,
            PipelineStage::Discovery,
            PipelineStage::Proposal,
            PipelineStage::Negotiation,
            PipelineStage::ClosedWon,
        ];
        for pair in path.windows(2) {
            if p.get(pair[0]) >= p.get(pair[1]) {
                return Err(ConfigError::invalid(
                    "pipeline.probabilities",
                    format!(
                        "{} ({}) must be lower than {} ({})",
                        pair[0],
                        p.get(pair[0]),
                        pair[1],
                        p.get(pair[1])
                    ),
                ));
            }
        }

        if p.closed_won != 1.0 {
            return Err(ConfigError::invalid(
                "pipeline.probabilities.closed_won",
                format!("Must be 1.0, got {}", p.closed_won),
            ));
        }
        if p.closed_lost != 0.0 {
            return Err(ConfigError::invalid(
                "pipeline.probabilities.closed_lost",
                format!("Must be 0.0, got {}", p.closed_lost),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.probabilities.get(PipelineStage::Lead), 0.1);
        assert_eq!(config.probabilities.get(PipelineStage::Negotiation), 0.8);
        assert_eq!(config.probabilities.get(PipelineStage::ClosedWon), 1.0);
        assert_eq!(config.probabilities.get(PipelineStage::ClosedLost), 0.0);
    }

    #[test]
    fn test_non_monotonic_table_rejected() {
        let mut config = PipelineConfig::default();
        config.probabilities.proposal = 0.3;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_closed_lost_must_be_zero() {
        let mut config = PipelineConfig::default();
        config.probabilities.closed_lost = 0.05;
        assert!(config.validate().is_err());
    }
}
