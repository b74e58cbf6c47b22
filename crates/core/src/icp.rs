//! Ideal Customer Profile

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::lead::{has_text, NumericRange};

/// Target profile leads are scored against. Read-only input to scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Icp {
    #[serde(default)]
    pub industry: Option<String>,
    /// Target employee-count range
    #[serde(default)]
    pub size: Option<NumericRange>,
    /// Target annual revenue range (USD)
    #[serde(default)]
    pub revenue: Option<NumericRange>,
    #[serde(default)]
    pub geography: Option<String>,
    #[serde(default)]
    pub tech_stack: Vec<String>,
    /// Buyer-persona titles, e.g. "VP Sales", "CRO"
    #[serde(default)]
    pub persona_titles: Vec<String>,
    #[serde(default)]
    pub pain_points: Vec<String>,
    /// Keywords matched against lead recency signals
    #[serde(default)]
    pub engagement_signals: Vec<String>,
}

/// How broad a target market an ICP describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketBreadth {
    VeryBroad,
    Broad,
    Focused,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketEstimate {
    pub breadth: MarketBreadth,
    pub specificity: usize,
    pub estimated_companies: String,
    pub recommendation: String,
}

impl Icp {
    /// Industry and size range are required for scoring
    pub fn validate(&self) -> Result<()> {
        if !has_text(&self.industry) {
            return Err(Error::invalid_input("icp.industry", "industry is required"));
        }
        match &self.size {
            Some(size) => size.check("icp.size")?,
            None => return Err(Error::invalid_input("icp.size", "size range is required")),
        }
        if let Some(revenue) = &self.revenue {
            revenue.check("icp.revenue")?;
        }
        Ok(())
    }

    /// Enough detail to start discovery
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Unanswered builder questions, in the order they should be asked
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !has_text(&self.industry) {
            missing.push("industry");
        }
        if self.size.is_none() {
            missing.push("size");
        }
        if !has_text(&self.geography) {
            missing.push("geography");
        }
        if self.persona_titles.is_empty() {
            missing.push("persona_titles");
        }
        if self.pain_points.is_empty() {
            missing.push("pain_points");
        }
        missing
    }

    pub fn specificity(&self) -> usize {
        let dimensions = [
            has_text(&self.industry),
            self.size.is_some(),
            self.revenue.is_some(),
            has_text(&self.geography),
        ]
        .iter()
        .filter(|present| **present)
        .count();
        dimensions + self.tech_stack.len()
    }

    pub fn market_estimate(&self) -> MarketEstimate {
        let specificity = self.specificity();
        let (breadth, companies, recommendation) = match specificity {
            0..=3 => (
                MarketBreadth::VeryBroad,
                "10M+ companies",
                "Add firmographic or technographic criteria to narrow the market",
            ),
            4..=6 => (
                MarketBreadth::Broad,
                "100K-1M companies",
                "Consider adding a tech-stack or revenue filter",
            ),
            _ => (
                MarketBreadth::Focused,
                "10K-100K companies",
                "Targeting is specific enough to start outreach",
            ),
        };

        MarketEstimate {
            breadth,
            specificity,
            estimated_companies: companies.to_string(),
            recommendation: recommendation.to_string(),
        }
    }
}
