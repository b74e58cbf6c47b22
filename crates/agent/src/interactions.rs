//! Append-only log of customer interactions
//!
//! Entries live in memory; with a backing store attached, each entry is
//! written there first and the log is seeded from it on startup.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use sales_agent_core::{DealId, Interaction, InteractionStore, InteractionType, Result, Sentiment};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Per-customer interaction summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionStats {
    pub customer_id: String,
    pub total: usize,
    pub by_type: BTreeMap<InteractionType, usize>,
    pub by_sentiment: BTreeMap<Sentiment, usize>,
    pub first_at: Option<DateTime<Utc>>,
    pub latest: Option<Interaction>,
}

#[derive(Default)]
pub struct InteractionLog {
    entries: RwLock<Vec<Interaction>>,
    store: Option<Arc<dyn InteractionStore>>,
}

impl InteractionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from `store` and write every new entry through to it
    pub fn with_store(store: Arc<dyn InteractionStore>) -> Result<Self> {
        let entries = store.load_all()?;
        tracing::info!(entries = entries.len(), "Loaded interaction log");
        Ok(Self {
            entries: RwLock::new(entries),
            store: Some(store),
        })
    }

    /// A failed store write leaves the in-memory log unchanged
    pub fn record(&self, interaction: Interaction) -> Result<Interaction> {
        let mut entries = self.entries.write();
        if let Some(store) = &self.store {
            store.append(&interaction)?;
        }
        tracing::debug!(
            customer_id = %interaction.customer_id,
            kind = ?interaction.kind,
            "Recorded interaction"
        );
        entries.push(interaction.clone());
        Ok(interaction)
    }

    pub fn for_deal(&self, deal_id: &DealId) -> Vec<Interaction> {
        self.entries
            .read()
            .iter()
            .filter(|i| i.deal_id.as_ref() == Some(deal_id))
            .cloned()
            .collect()
    }

    pub fn for_customer(&self, customer_id: &str) -> Vec<Interaction> {
        self.entries
            .read()
            .iter()
            .filter(|i| i.customer_id == customer_id)
            .cloned()
            .collect()
    }

    /// Newest first, at most `limit`
    pub fn recent(&self, customer_id: &str, limit: usize) -> Vec<Interaction> {
        let mut entries = self.for_customer(customer_id);
        entries.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        entries.truncate(limit);
        entries
    }

    pub fn stats(&self, customer_id: &str) -> InteractionStats {
        let entries = self.for_customer(customer_id);
        let mut by_type = BTreeMap::new();
        let mut by_sentiment = BTreeMap::new();
        for entry in &entries {
            *by_type.entry(entry.kind).or_insert(0) += 1;
            *by_sentiment.entry(entry.sentiment).or_insert(0) += 1;
        }

        InteractionStats {
            customer_id: customer_id.to_string(),
            total: entries.len(),
            by_type,
            by_sentiment,
            first_at: entries.iter().map(|e| e.recorded_at).min(),
            latest: entries.iter().max_by_key(|e| e.recorded_at).cloned(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use sales_agent_core::Error;

    /// Store that keeps appended entries, or refuses every write
    #[derive(Default)]
    struct VecStore {
        entries: RwLock<Vec<Interaction>>,
        read_only: bool,
    }

    impl InteractionStore for VecStore {
        fn append(&self, interaction: &Interaction) -> Result<()> {
            if self.read_only {
                return Err(Error::Storage("read-only".into()));
            }
            self.entries.write().push(interaction.clone());
            Ok(())
        }

        fn load_all(&self) -> Result<Vec<Interaction>> {
            Ok(self.entries.read().clone())
        }
    }

    fn at(interaction: Interaction, minutes: i64) -> Interaction {
        Interaction {
            recorded_at: DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap()
                + Duration::minutes(minutes),
            ..interaction
        }
    }

    #[test]
    fn test_filters() {
        let log = InteractionLog::new();
        let deal = DealId::from("DEAL-1");
        log.record(Interaction::new("C1", InteractionType::Call, "intro").for_deal(deal.clone())).unwrap();
        log.record(Interaction::new("C1", InteractionType::Email, "follow up")).unwrap();
        log.record(Interaction::new("C2", InteractionType::Demo, "demo")).unwrap();

        assert_eq!(log.len(), 3);
        assert_eq!(log.for_deal(&deal).len(), 1);
        assert_eq!(log.for_customer("C1").len(), 2);
        assert!(log.for_customer("C3").is_empty());
    }

    #[test]
    fn test_recent_is_newest_first() {
        let log = InteractionLog::new();
        log.record(at(Interaction::new("C1", InteractionType::Email, "first"), 0)).unwrap();
        log.record(at(Interaction::new("C1", InteractionType::Call, "third"), 20)).unwrap();
        log.record(at(Interaction::new("C1", InteractionType::Chat, "second"), 10)).unwrap();

        let recent = log.recent("C1", 2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].summary, "third");
        assert_eq!(recent[1].summary, "second");
    }

    #[test]
    fn test_stats() {
        let log = InteractionLog::new();
        log.record(at(
            Interaction::new("C1", InteractionType::Call, "discovery")
                .with_sentiment(Sentiment::Positive),
            0,
        )).unwrap();
        log.record(at(Interaction::new("C1", InteractionType::Call, "pricing"), 5)).unwrap();
        log.record(at(
            Interaction::new("C1", InteractionType::ProposalSent, "proposal v1"),
            9,
        )).unwrap();

        let stats = log.stats("C1");
        assert_eq!(stats.total, 3);
        assert_eq!(stats.by_type.get(&InteractionType::Call), Some(&2));
        assert_eq!(stats.by_sentiment.get(&Sentiment::Neutral), Some(&2));
        assert_eq!(stats.latest.unwrap().summary, "proposal v1");

        let empty = log.stats("nobody");
        assert_eq!(empty.total, 0);
        assert!(empty.latest.is_none());
    }

    #[test]
    fn test_store_is_written_through_and_reloaded() {
        let store = Arc::new(VecStore::default());
        let log = InteractionLog::with_store(store.clone()).unwrap();
        log.record(Interaction::new("C1", InteractionType::Call, "intro")).unwrap();
        assert_eq!(store.entries.read().len(), 1);

        let reopened = InteractionLog::with_store(store).unwrap();
        assert_eq!(reopened.for_customer("C1").len(), 1);
    }

    #[test]
    fn test_failed_store_write_leaves_log_unchanged() {
        let store = Arc::new(VecStore {
            read_only: true,
            ..Default::default()
        });
        let log = InteractionLog::with_store(store).unwrap();
        let err = log
            .record(Interaction::new("C1", InteractionType::Call, "intro"))
            .unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
        assert!(log.is_empty());
    }
}
