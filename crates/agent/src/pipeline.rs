//! Pipeline manager
//!
//! Owns access to the deal store. Every mutation of one deal (stage change,
//! BANT update, value change) runs under that deal's lock, so history and
//! BANT status never interleave. Different deals never wait on each other.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use sales_agent_config::PipelineConfig;
use sales_agent_core::{
    BantSignal, BantStatus, Deal, DealId, DealStore, Error, Interaction, InteractionType,
    PipelineStage, Recommendation, Result,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::bant;
use crate::interactions::InteractionLog;
use crate::stage::{StageMachine, StageTransition};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StageSummary {
    pub count: usize,
    pub value: f64,
    pub weighted_value: f64,
}

/// Point-in-time pipeline aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineReport {
    pub total_deals: usize,
    pub open_deals: usize,
    /// Sum of values over deals not in CLOSED_LOST
    pub total_value: f64,
    /// Sum of value x stage probability
    pub weighted_value: f64,
    pub won_value: f64,
    /// Won / closed; `None` until something closes
    pub win_rate: Option<f64>,
    /// Every stage, including empty ones
    pub by_stage: BTreeMap<PipelineStage, StageSummary>,
    pub generated_at: DateTime<Utc>,
}

pub struct PipelineManager {
    store: Arc<dyn DealStore>,
    machine: StageMachine,
    config: PipelineConfig,
    locks: DashMap<DealId, Arc<Mutex<()>>>,
    interactions: Option<Arc<InteractionLog>>,
}

impl PipelineManager {
    pub fn new(store: Arc<dyn DealStore>, config: PipelineConfig) -> Self {
        Self {
            store,
            machine: StageMachine::new(),
            config,
            locks: DashMap::new(),
            interactions: None,
        }
    }

    /// Record a note interaction for every successful transition
    pub fn with_interaction_log(mut self, log: Arc<InteractionLog>) -> Self {
        self.interactions = Some(log);
        self
    }

    pub fn interactions(&self) -> Option<&Arc<InteractionLog>> {
        self.interactions.as_ref()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn probability(&self, stage: PipelineStage) -> f64 {
        self.config.probabilities.get(stage)
    }

    /// Lock for a stored deal; unknown ids never get an entry
    fn lock_for(&self, id: &DealId) -> Result<Arc<Mutex<()>>> {
        if let Some(lock) = self.locks.get(id) {
            return Ok(lock.clone());
        }
        if !self.store.contains(id)? {
            return Err(Error::NotFound(id.clone()));
        }
        Ok(self.locks.entry(id.clone()).or_default().clone())
    }

    /// Run `f` on a copy of the deal under its lock; the store is only
    /// written when `f` succeeds
    fn mutate<T>(&self, id: &DealId, f: impl FnOnce(&mut Deal) -> Result<T>) -> Result<T> {
        let lock = self.lock_for(id)?;
        let _guard = lock.lock();

        let mut deal = self
            .store
            .get(id)?
            .ok_or_else(|| Error::NotFound(id.clone()))?;
        let out = f(&mut deal)?;
        self.store.update(deal)?;
        Ok(out)
    }

    pub fn add_deal(&self, deal: Deal) -> Result<()> {
        let id = deal.id.clone();
        let lock = self.locks.entry(id.clone()).or_default().clone();
        let _guard = lock.lock();

        if let Err(err) = self.store.insert(deal) {
            if !matches!(err, Error::DuplicateId(_)) {
                self.locks.remove(&id);
            }
            return Err(err);
        }
        tracing::info!(deal_id = %id, "Added deal");
        Ok(())
    }

    /// New LEAD deal with a generated id
    pub fn create_deal(
        &self,
        customer_id: impl Into<String>,
        company_name: impl Into<String>,
        value: f64,
    ) -> Result<Deal> {
        let deal = Deal::new(DealId::generate(), customer_id, company_name, value)?;
        self.add_deal(deal.clone())?;
        Ok(deal)
    }

    pub fn get(&self, id: &DealId) -> Result<Deal> {
        self.store.get(id)?.ok_or_else(|| Error::NotFound(id.clone()))
    }

    pub fn list(&self) -> Result<Vec<Deal>> {
        self.store.list()
    }

    pub fn deals_for_customer(&self, customer_id: &str) -> Result<Vec<Deal>> {
        Ok(self
            .store
            .list()?
            .into_iter()
            .filter(|d| d.customer_id == customer_id)
            .collect())
    }

    pub fn advance(&self, id: &DealId, target: PipelineStage) -> Result<StageTransition> {
        self.advance_with_note(id, target, None)
    }

    pub fn advance_with_note(
        &self,
        id: &DealId,
        target: PipelineStage,
        note: Option<String>,
    ) -> Result<StageTransition> {
        let (transition, customer_id) = self.mutate(id, |deal| {
            let t = self.machine.transition(deal, target, note)?;
            Ok((t, deal.customer_id.clone()))
        })?;
        self.log_transition(&customer_id, &transition);
        Ok(transition)
    }

    /// Move to the natural successor on the happy path
    pub fn advance_next(&self, id: &DealId) -> Result<StageTransition> {
        let (transition, customer_id) = self.mutate(id, |deal| {
            let current = deal.stage();
            let target = current.next().ok_or_else(|| Error::TerminalState {
                deal_id: deal.id.clone(),
                stage: current,
                attempted: current,
            })?;
            let t = self.machine.transition(deal, target, None)?;
            Ok((t, deal.customer_id.clone()))
        })?;
        self.log_transition(&customer_id, &transition);
        Ok(transition)
    }

    /// Close as won (from NEGOTIATION) or lost (from any open stage)
    pub fn close(&self, id: &DealId, won: bool, reason: Option<String>) -> Result<StageTransition> {
        let target = if won {
            PipelineStage::ClosedWon
        } else {
            PipelineStage::ClosedLost
        };
        self.advance_with_note(id, target, reason)
    }

    pub fn qualify(&self, id: &DealId, signal: BantSignal) -> Result<BantStatus> {
        self.qualify_all(id, &[signal])
    }

    /// Apply signals in order as one atomic update
    pub fn qualify_all(&self, id: &DealId, signals: &[BantSignal]) -> Result<BantStatus> {
        self.mutate(id, |deal| {
            let before = deal.bant;
            deal.bant = bant::apply_all(&deal.bant, signals);
            if deal.bant != before {
                tracing::debug!(
                    deal_id = %deal.id,
                    score = deal.bant.score(),
                    recommendation = %bant::recommend(&deal.bant),
                    "BANT status updated"
                );
            }
            Ok(deal.bant)
        })
    }

    /// When the deal sits in QUALIFICATION and its verdict is decisive,
    /// move it on: DISCOVERY for book_meeting, CLOSED_LOST for disqualify.
    /// Stage check and move happen under one lock.
    pub fn settle_qualification(&self, id: &DealId) -> Result<Option<StageTransition>> {
        let outcome = self.mutate(id, |deal| {
            if deal.stage() != PipelineStage::Qualification {
                return Ok(None);
            }
            let (target, note) = match bant::recommend(&deal.bant) {
                Recommendation::BookMeeting => (PipelineStage::Discovery, "BANT fully qualified"),
                Recommendation::Disqualify => (PipelineStage::ClosedLost, "BANT disqualified"),
                Recommendation::Nurture => return Ok(None),
            };
            let t = self.machine.transition(deal, target, Some(note.to_string()))?;
            Ok(Some((t, deal.customer_id.clone())))
        })?;

        Ok(outcome.map(|(transition, customer_id)| {
            self.log_transition(&customer_id, &transition);
            transition
        }))
    }

    pub fn update_value(&self, id: &DealId, value: f64) -> Result<Deal> {
        self.mutate(id, |deal| {
            deal.set_value(value)?;
            Ok(deal.clone())
        })
    }

    /// Aggregate over a snapshot of the store; no side effects
    pub fn report(&self) -> Result<PipelineReport> {
        let deals = self.store.list()?;

        let mut by_stage: BTreeMap<PipelineStage, StageSummary> = PipelineStage::ALL
            .iter()
            .map(|stage| (*stage, StageSummary::default()))
            .collect();

        let mut total_value = 0.0;
        let mut weighted_value = 0.0;
        for deal in &deals {
            let stage = deal.stage();
            let weighted = deal.value * self.probability(stage);
            let summary = by_stage.entry(stage).or_default();
            summary.count += 1;
            summary.value += deal.value;
            summary.weighted_value += weighted;

            if stage != PipelineStage::ClosedLost {
                total_value += deal.value;
            }
            weighted_value += weighted;
        }

        let count = |stage: PipelineStage| by_stage.get(&stage).map(|s| s.count).unwrap_or(0);
        let won = count(PipelineStage::ClosedWon);
        let closed = won + count(PipelineStage::ClosedLost);
        let won_value = by_stage
            .get(&PipelineStage::ClosedWon)
            .map(|s| s.value)
            .unwrap_or(0.0);

        Ok(PipelineReport {
            total_deals: deals.len(),
            open_deals: deals.len() - closed,
            total_value,
            weighted_value,
            won_value,
            win_rate: (closed > 0).then(|| won as f64 / closed as f64),
            by_stage,
            generated_at: Utc::now(),
        })
    }

    fn log_transition(&self, customer_id: &str, transition: &StageTransition) {
        if let Some(log) = &self.interactions {
            let mut summary = format!("Stage changed {} -> {}", transition.from, transition.to);
            if let Some(note) = &transition.note {
                summary.push_str(": ");
                summary.push_str(note);
            }
            if let Err(e) = log.record(
                Interaction::new(customer_id, InteractionType::Note, summary)
                    .for_deal(transition.deal_id.clone()),
            ) {
                tracing::warn!(deal_id = %transition.deal_id, error = %e, "Failed to record stage note");
            }
        }
    }
}
