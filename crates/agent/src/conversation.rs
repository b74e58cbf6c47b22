//! Qualification conversation driver
//!
//! Glue between the conversational-analysis collaborator and the pipeline:
//! each turn is turned into signals, applied to the deal's BANT status, and
//! a decisive verdict can move a QUALIFICATION deal on its own.

use sales_agent_core::{
    BantCriterion, BantSignal, BantStatus, DealId, Interaction, InteractionType, Recommendation,
    Result, Sentiment, SignalExtractor,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::bant::{self, BantQualifier};
use crate::pipeline::PipelineManager;
use crate::stage::StageTransition;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnOutcome {
    pub deal_id: DealId,
    pub signals: Vec<BantSignal>,
    pub status: BantStatus,
    pub recommendation: Recommendation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition: Option<StageTransition>,
    /// Criterion to ask about next and the question to ask
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_question: Option<(BantCriterion, String)>,
}

pub struct QualificationConversation {
    manager: Arc<PipelineManager>,
    extractor: Arc<dyn SignalExtractor>,
    qualifier: BantQualifier,
    auto_advance: bool,
}

impl QualificationConversation {
    pub fn new(
        manager: Arc<PipelineManager>,
        extractor: Arc<dyn SignalExtractor>,
        qualifier: BantQualifier,
    ) -> Self {
        let auto_advance = manager.config().auto_advance_on_qualification;
        Self {
            manager,
            extractor,
            qualifier,
            auto_advance,
        }
    }

    pub fn with_auto_advance(mut self, enabled: bool) -> Self {
        self.auto_advance = enabled;
        self
    }

    pub async fn process_turn(&self, deal_id: &DealId, text: &str) -> Result<TurnOutcome> {
        let deal = self.manager.get(deal_id)?;
        let signals = self.extractor.extract(text, &deal.bant).await?;

        let status = self.manager.qualify_all(deal_id, &signals)?;
        let recommendation = bant::recommend(&status);

        let transition = if self.auto_advance {
            self.manager.settle_qualification(deal_id)?
        } else {
            None
        };

        if let Some(log) = self.manager.interactions() {
            // The turn is already applied; a lost transcript entry is not fatal
            if let Err(e) = log.record(
                Interaction::new(deal.customer_id.clone(), InteractionType::Chat, text)
                    .for_deal(deal_id.clone())
                    .with_sentiment(turn_sentiment(&signals)),
            ) {
                tracing::warn!(deal_id = %deal_id, error = %e, "Failed to record chat turn");
            }
        }

        tracing::debug!(
            deal_id = %deal_id,
            extractor = self.extractor.name(),
            signals = signals.len(),
            recommendation = %recommendation,
            advanced = transition.is_some(),
            "Processed qualification turn"
        );

        let next_question = self
            .qualifier
            .next_question(&status)
            .map(|(criterion, question)| (criterion, question.to_string()));

        Ok(TurnOutcome {
            deal_id: deal_id.clone(),
            signals,
            status,
            recommendation,
            transition,
            next_question,
        })
    }
}

fn turn_sentiment(signals: &[BantSignal]) -> Sentiment {
    let rejected = signals.iter().any(|s| matches!(s, BantSignal::Rejected(_)));
    let confirmed = signals.iter().any(|s| matches!(s, BantSignal::Confirmed(_)));
    match (confirmed, rejected) {
        (_, true) => Sentiment::Negative,
        (true, false) => Sentiment::Positive,
        (false, false) => Sentiment::Neutral,
    }
}
