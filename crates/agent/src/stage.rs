//! Pipeline stage machine
//!
//! Validates a requested move against the stage graph and the deal's BANT
//! verdict, then appends to the deal's history. The machine holds no deal
//! data, so one instance serves every deal.

use chrono::{DateTime, Utc};
use sales_agent_core::{Deal, DealId, Error, PipelineStage, Recommendation, Result};
use serde::{Deserialize, Serialize};

use crate::bant;

/// A completed stage change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageTransition {
    pub deal_id: DealId,
    pub from: PipelineStage,
    pub to: PipelineStage,
    pub at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StageMachine;

impl StageMachine {
    pub fn new() -> Self {
        Self
    }

    /// Whether `deal` may move to `target` right now, without touching it
    pub fn check(&self, deal: &Deal, target: PipelineStage) -> Result<()> {
        let from = deal.stage();

        if from.is_terminal() {
            return Err(Error::TerminalState {
                deal_id: deal.id.clone(),
                stage: from,
                attempted: target,
            });
        }

        let illegal = |reason: &str| Error::IllegalTransition {
            deal_id: deal.id.clone(),
            from,
            to: target,
            reason: reason.to_string(),
        };

        if from == target {
            return Err(illegal("deal is already in this stage"));
        }

        if !from.can_transition_to(target) {
            return Err(illegal("no such edge in the pipeline"));
        }

        if from == PipelineStage::Qualification
            && target == PipelineStage::Discovery
            && bant::recommend(&deal.bant) == Recommendation::Disqualify
        {
            return Err(illegal("qualification verdict is disqualify"));
        }

        Ok(())
    }

    /// Validate and apply `deal → target`, stamped now
    pub fn transition(
        &self,
        deal: &mut Deal,
        target: PipelineStage,
        note: Option<String>,
    ) -> Result<StageTransition> {
        self.transition_at(deal, target, Utc::now(), note)
    }

    /// Validate and apply with an explicit timestamp.
    ///
    /// History stays non-decreasing in time: a timestamp earlier than the
    /// current stage's entry is raised to it. On error the deal is untouched.
    pub fn transition_at(
        &self,
        deal: &mut Deal,
        target: PipelineStage,
        at: DateTime<Utc>,
        note: Option<String>,
    ) -> Result<StageTransition> {
        if let Err(err) = self.check(deal, target) {
            tracing::warn!(
                deal_id = %deal.id,
                from = %deal.stage(),
                to = %target,
                error = %err,
                "Rejected stage transition"
            );
            return Err(err);
        }

        let from = deal.stage();
        let at = at.max(deal.stage_entered_at());
        deal.record_transition(target, at, note.clone());

        tracing::info!(deal_id = %deal.id, from = %from, to = %target, "Stage transition");

        Ok(StageTransition {
            deal_id: deal.id.clone(),
            from,
            to: target,
            at,
            note,
        })
    }
}
