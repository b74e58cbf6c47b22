//! BANT (Budget, Authority, Need, Timeline) qualification types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BantCriterion {
    Budget,
    Authority,
    Need,
    Timeline,
}

impl BantCriterion {
    pub const ALL: [BantCriterion; 4] = [
        BantCriterion::Budget,
        BantCriterion::Authority,
        BantCriterion::Need,
        BantCriterion::Timeline,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BantCriterion::Budget => "budget",
            BantCriterion::Authority => "authority",
            BantCriterion::Need => "need",
            BantCriterion::Timeline => "timeline",
        }
    }
}

impl fmt::Display for BantCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BantCriterion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        BantCriterion::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::invalid_input("criterion", format!("unknown criterion '{}'", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BantState {
    #[default]
    Unknown,
    Qualified,
    Disqualified,
}

/// Qualification verdict derived from a [`BantStatus`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    BookMeeting,
    Nurture,
    Disqualify,
}

impl Recommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::BookMeeting => "book_meeting",
            Recommendation::Nurture => "nurture",
            Recommendation::Disqualify => "disqualify",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Signal tag produced per conversational turn.
///
/// Wire form: `budget-confirmed`, `timeline-rejected`, `generic-text`, and
/// `need-override-qualified` style tags for overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BantSignal {
    Confirmed(BantCriterion),
    Rejected(BantCriterion),
    /// Explicit override; the only way out of `disqualified`
    Override(BantCriterion, BantState),
    GenericText,
}

impl BantSignal {
    pub fn criterion(&self) -> Option<BantCriterion> {
        match self {
            BantSignal::Confirmed(c) | BantSignal::Rejected(c) | BantSignal::Override(c, _) => {
                Some(*c)
            }
            BantSignal::GenericText => None,
        }
    }
}

impl fmt::Display for BantSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BantSignal::Confirmed(c) => write!(f, "{}-confirmed", c),
            BantSignal::Rejected(c) => write!(f, "{}-rejected", c),
            BantSignal::Override(c, state) => {
                let state = match state {
                    BantState::Unknown => "unknown",
                    BantState::Qualified => "qualified",
                    BantState::Disqualified => "disqualified",
                };
                write!(f, "{}-override-{}", c, state)
            }
            BantSignal::GenericText => f.write_str("generic-text"),
        }
    }
}

impl FromStr for BantSignal {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let tag = s.trim().to_ascii_lowercase().replace('_', "-");
        if tag == "generic-text" {
            return Ok(BantSignal::GenericText);
        }

        let invalid = || Error::invalid_input("signal", format!("unknown signal tag '{}'", s));
        let mut parts = tag.splitn(3, '-');
        let criterion: BantCriterion = parts.next().ok_or_else(invalid)?.parse().map_err(|_| invalid())?;

        match (parts.next(), parts.next()) {
            (Some("confirmed"), None) => Ok(BantSignal::Confirmed(criterion)),
            (Some("rejected"), None) => Ok(BantSignal::Rejected(criterion)),
            (Some("override"), Some(state)) => {
                let state = match state {
                    "unknown" => BantState::Unknown,
                    "qualified" => BantState::Qualified,
                    "disqualified" => BantState::Disqualified,
                    _ => return Err(invalid()),
                };
                Ok(BantSignal::Override(criterion, state))
            }
            _ => Err(invalid()),
        }
    }
}

impl Serialize for BantSignal {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BantSignal {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        tag.parse().map_err(serde::de::Error::custom)
    }
}

/// Per-deal qualification status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BantStatus {
    #[serde(default)]
    pub budget: BantState,
    #[serde(default)]
    pub authority: BantState,
    #[serde(default)]
    pub need: BantState,
    #[serde(default)]
    pub timeline: BantState,
}

impl BantStatus {
    pub fn get(&self, criterion: BantCriterion) -> BantState {
        match criterion {
            BantCriterion::Budget => self.budget,
            BantCriterion::Authority => self.authority,
            BantCriterion::Need => self.need,
            BantCriterion::Timeline => self.timeline,
        }
    }

    pub fn set(&mut self, criterion: BantCriterion, state: BantState) {
        match criterion {
            BantCriterion::Budget => self.budget = state,
            BantCriterion::Authority => self.authority = state,
            BantCriterion::Need => self.need = state,
            BantCriterion::Timeline => self.timeline = state,
        }
    }

    /// Number of qualified criteria, 0..=4
    pub fn score(&self) -> u8 {
        BantCriterion::ALL
            .iter()
            .filter(|c| self.get(**c) == BantState::Qualified)
            .count() as u8
    }

    /// Criteria still unknown, in B, A, N, T order
    pub fn missing(&self) -> Vec<BantCriterion> {
        BantCriterion::ALL
            .iter()
            .copied()
            .filter(|c| self.get(*c) == BantState::Unknown)
            .collect()
    }

    /// Criterion the next discovery question should target
    pub fn next_focus(&self) -> Option<BantCriterion> {
        self.missing().into_iter().next()
    }

    pub fn any_disqualified(&self) -> bool {
        BantCriterion::ALL
            .iter()
            .any(|c| self.get(*c) == BantState::Disqualified)
    }

    pub fn all_qualified(&self) -> bool {
        self.score() == 4
    }
}
