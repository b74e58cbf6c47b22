//! Deals and pipeline stages
//!
//! A deal's stage and history are private. They change only through the
//! agent crate's `StageMachine`, which validates the move and then calls the
//! hidden `Deal::record_transition` hook.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::bant::BantStatus;
use crate::error::{Error, Result};

/// Stable deal identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DealId(String);

impl DealId {
    /// Generate a fresh `DEAL-<hex>` id
    pub fn generate() -> Self {
        let raw = uuid::Uuid::new_v4().simple().to_string();
        Self(format!("DEAL-{}", raw[..12].to_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DealId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for DealId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for DealId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Pipeline stages, in pipeline order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PipelineStage {
    Lead,
    Qualification,
    Discovery,
    Proposal,
    Negotiation,
    ClosedWon,
    ClosedLost,
}

/// Forward edges of the pipeline graph.
///
/// The abandon edge (any open stage → CLOSED_LOST) is implied and not listed
/// here except where it is also a named edge.
static STAGE_SUCCESSORS: Lazy<HashMap<PipelineStage, &'static [PipelineStage]>> =
    Lazy::new(|| {
        use PipelineStage::*;
        let mut map = HashMap::new();
        map.insert(Lead, &[Qualification] as &[_]);
        map.insert(Qualification, &[Discovery, ClosedLost] as &[_]);
        map.insert(Discovery, &[Proposal] as &[_]);
        map.insert(Proposal, &[Negotiation] as &[_]);
        map.insert(Negotiation, &[ClosedWon, ClosedLost] as &[_]);
        map.insert(ClosedWon, &[] as &[_]);
        map.insert(ClosedLost, &[] as &[_]);
        map
    });

impl PipelineStage {
    pub const ALL: [PipelineStage; 7] = [
        PipelineStage::Lead,
        PipelineStage::Qualification,
        PipelineStage::Discovery,
        PipelineStage::Proposal,
        PipelineStage::Negotiation,
        PipelineStage::ClosedWon,
        PipelineStage::ClosedLost,
    ];

    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineStage::ClosedWon | PipelineStage::ClosedLost)
    }

    /// Named forward edges out of this stage
    pub fn successors(&self) -> &'static [PipelineStage] {
        STAGE_SUCCESSORS.get(self).copied().unwrap_or(&[])
    }

    /// Whether the graph has an edge `self → target`, abandon included.
    ///
    /// Qualification gating is not considered here.
    pub fn can_transition_to(&self, target: PipelineStage) -> bool {
        if self.is_terminal() {
            return false;
        }
        target == PipelineStage::ClosedLost || self.successors().contains(&target)
    }

    /// Natural successor on the happy path
    pub fn next(&self) -> Option<PipelineStage> {
        match self {
            PipelineStage::Lead => Some(PipelineStage::Qualification),
            PipelineStage::Qualification => Some(PipelineStage::Discovery),
            PipelineStage::Discovery => Some(PipelineStage::Proposal),
            PipelineStage::Proposal => Some(PipelineStage::Negotiation),
            PipelineStage::Negotiation => Some(PipelineStage::ClosedWon),
            PipelineStage::ClosedWon | PipelineStage::ClosedLost => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PipelineStage::Lead => "Lead",
            PipelineStage::Qualification => "Qualification",
            PipelineStage::Discovery => "Discovery",
            PipelineStage::Proposal => "Proposal",
            PipelineStage::Negotiation => "Negotiation",
            PipelineStage::ClosedWon => "Closed Won",
            PipelineStage::ClosedLost => "Closed Lost",
        }
    }

    /// Wire form, e.g. `CLOSED_WON`
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Lead => "LEAD",
            PipelineStage::Qualification => "QUALIFICATION",
            PipelineStage::Discovery => "DISCOVERY",
            PipelineStage::Proposal => "PROPOSAL",
            PipelineStage::Negotiation => "NEGOTIATION",
            PipelineStage::ClosedWon => "CLOSED_WON",
            PipelineStage::ClosedLost => "CLOSED_LOST",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PipelineStage {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_uppercase().replace([' ', '-'], "_");
        PipelineStage::ALL
            .iter()
            .copied()
            .find(|stage| stage.as_str() == normalized)
            .ok_or_else(|| Error::invalid_input("stage", format!("unknown stage '{}'", s)))
    }
}

/// One entry of the append-only stage-history log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageHistoryEntry {
    pub stage: PipelineStage,
    pub entered_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// A deal tracked through the pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deal {
    pub id: DealId,
    pub customer_id: String,
    #[serde(default)]
    pub company_name: String,
    /// Estimated value (USD)
    pub value: f64,
    #[serde(default)]
    pub bant: BantStatus,
    pub created_at: DateTime<Utc>,
    stage: PipelineStage,
    history: Vec<StageHistoryEntry>,
}

impl Deal {
    /// New deal at LEAD with a one-entry history
    pub fn new(
        id: DealId,
        customer_id: impl Into<String>,
        company_name: impl Into<String>,
        value: f64,
    ) -> Result<Self> {
        Self::new_at(id, customer_id, company_name, value, Utc::now())
    }

    pub fn new_at(
        id: DealId,
        customer_id: impl Into<String>,
        company_name: impl Into<String>,
        value: f64,
        created_at: DateTime<Utc>,
    ) -> Result<Self> {
        if id.as_str().trim().is_empty() {
            return Err(Error::invalid_input("deal.id", "id must not be empty"));
        }
        validate_value(value)?;
        Ok(Self {
            id,
            customer_id: customer_id.into(),
            company_name: company_name.into(),
            value,
            bant: BantStatus::default(),
            created_at,
            stage: PipelineStage::Lead,
            history: vec![StageHistoryEntry {
                stage: PipelineStage::Lead,
                entered_at: created_at,
                note: None,
            }],
        })
    }

    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    pub fn history(&self) -> &[StageHistoryEntry] {
        &self.history
    }

    pub fn is_closed(&self) -> bool {
        self.stage.is_terminal()
    }

    /// When the deal entered its current stage
    pub fn stage_entered_at(&self) -> DateTime<Utc> {
        self.history
            .last()
            .map(|entry| entry.entered_at)
            .unwrap_or(self.created_at)
    }

    /// Append a history entry and move to `to`.
    ///
    /// Not part of the public API: use `StageMachine::transition`, which
    /// applies the qualification gate and keeps timestamps ordered.
    #[doc(hidden)]
    pub fn record_transition(
        &mut self,
        to: PipelineStage,
        at: DateTime<Utc>,
        note: Option<String>,
    ) {
        debug_assert!(
            self.stage.can_transition_to(to),
            "unvalidated stage change {} -> {}",
            self.stage,
            to
        );
        self.history.push(StageHistoryEntry {
            stage: to,
            entered_at: at,
            note,
        });
        self.stage = to;
    }

    pub fn set_value(&mut self, value: f64) -> Result<()> {
        validate_value(value)?;
        self.value = value;
        Ok(())
    }
}

fn validate_value(value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::invalid_input(
            "deal.value",
            format!("value must be a non-negative amount, got {}", value),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_wire_form() {
        assert_eq!(PipelineStage::ClosedWon.to_string(), "CLOSED_WON");
        assert_eq!(
            serde_json::to_string(&PipelineStage::ClosedLost).unwrap(),
            "\"CLOSED_LOST\""
        );
        assert_eq!("closed won".parse::<PipelineStage>().unwrap(), PipelineStage::ClosedWon);
        assert_eq!("Negotiation".parse::<PipelineStage>().unwrap(), PipelineStage::Negotiation);
        assert!("won".parse::<PipelineStage>().is_err());
    }

    #[test]
    fn test_graph_edges() {
        use PipelineStage::*;
        assert!(Lead.can_transition_to(Qualification));
        assert!(Lead.can_transition_to(ClosedLost));
        assert!(!Lead.can_transition_to(Proposal));
        assert!(!Lead.can_transition_to(ClosedWon));
        assert!(!Discovery.can_transition_to(Qualification));
        assert!(Negotiation.can_transition_to(ClosedWon));
        assert!(!ClosedLost.can_transition_to(Discovery));
        assert!(!ClosedWon.can_transition_to(ClosedLost));
    }

    #[test]
    fn test_next_follows_happy_path() {
        let mut stage = PipelineStage::Lead;
        let mut path = vec![stage];
        while let Some(next) = stage.next() {
            assert!(stage.can_transition_to(next));
            stage = next;
            path.push(stage);
        }
        assert_eq!(path.len(), 6);
        assert_eq!(stage, PipelineStage::ClosedWon);
    }

    #[test]
    fn test_new_deal_starts_at_lead() {
        let deal = Deal::new(DealId::from("DEAL-1"), "CUST-1", "Acme", 75_000.0).unwrap();
        assert_eq!(deal.stage(), PipelineStage::Lead);
        assert_eq!(deal.history().len(), 1);
        assert_eq!(deal.history()[0].entered_at, deal.created_at);
    }

    #[test]
    fn test_deal_rejects_bad_values() {
        assert!(Deal::new(DealId::from("DEAL-1"), "C", "Acme", -1.0).is_err());
        assert!(Deal::new(DealId::from("DEAL-1"), "C", "Acme", f64::INFINITY).is_err());
        assert!(Deal::new(DealId::from(" "), "C", "Acme", 1.0).is_err());
    }

    #[test]
    fn test_deal_serde_keeps_history() {
        let mut deal = Deal::new(DealId::from("DEAL-7"), "C", "Acme", 10.0).unwrap();
        deal.record_transition(PipelineStage::Qualification, Utc::now(), Some("call booked".into()));
        let json = serde_json::to_string(&deal).unwrap();
        let back: Deal = serde_json::from_str(&json).unwrap();
        assert_eq!(back, deal);
        assert_eq!(back.stage(), PipelineStage::Qualification);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "unvalidated stage change")]
    fn test_recording_an_edge_outside_the_graph_panics() {
        let mut deal = Deal::new(DealId::from("DEAL-8"), "C", "Acme", 10.0).unwrap();
        deal.record_transition(PipelineStage::ClosedWon, Utc::now(), None);
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let a = DealId::generate();
        let b = DealId::generate();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("DEAL-"));
    }
}
