//! Lead score breakdown and priority tiers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Priority tier derived from a composite score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Tier {
    Cold,
    Warm,
    Hot,
}

impl Tier {
    /// Tier for `composite` with explicit thresholds; boundaries go up
    pub fn from_score_with_thresholds(composite: u32, hot: u32, warm: u32) -> Self {
        if composite >= hot {
            Tier::Hot
        } else if composite >= warm {
            Tier::Warm
        } else {
            Tier::Cold
        }
    }

    /// Tier with the standard 75 / 50 thresholds
    pub fn from_score(composite: u32) -> Self {
        Self::from_score_with_thresholds(composite, 75, 50)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Hot => "HOT",
            Tier::Warm => "WARM",
            Tier::Cold => "COLD",
        }
    }

    pub fn suggested_action(&self) -> &'static str {
        match self {
            Tier::Hot => "Reach out now with a personalised sequence",
            Tier::Warm => "Add to a nurture sequence",
            Tier::Cold => "Park until new signals appear",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sub-scores and derived composite for one lead against one ICP.
///
/// Every field is in 0..=100. Recomputed on demand and never stored apart
/// from the lead it describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub company_fit: u32,
    pub persona_fit: u32,
    pub intent_signals: u32,
    pub data_quality: u32,
    pub composite: u32,
    pub tier: Tier,
}
