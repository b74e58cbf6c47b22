//! Customer interaction records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::deal::DealId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionType {
    Email,
    Call,
    Meeting,
    Demo,
    ProposalSent,
    ProposalViewed,
    ContractSent,
    ContractSigned,
    Chat,
    Note,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Positive,
    #[default]
    Neutral,
    Negative,
}

/// One logged touchpoint with a customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub id: String,
    pub customer_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deal_id: Option<DealId>,
    pub kind: InteractionType,
    pub summary: String,
    #[serde(default)]
    pub sentiment: Sentiment,
    pub recorded_at: DateTime<Utc>,
}

impl Interaction {
    pub fn new(
        customer_id: impl Into<String>,
        kind: InteractionType,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            id: format!("INT-{}", uuid::Uuid::new_v4().simple()),
            customer_id: customer_id.into(),
            deal_id: None,
            kind,
            summary: summary.into(),
            sentiment: Sentiment::Neutral,
            recorded_at: Utc::now(),
        }
    }

    pub fn for_deal(mut self, deal_id: DealId) -> Self {
        self.deal_id = Some(deal_id);
        self
    }

    pub fn with_sentiment(mut self, sentiment: Sentiment) -> Self {
        self.sentiment = sentiment;
        self
    }
}
