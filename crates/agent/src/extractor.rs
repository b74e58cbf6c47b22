//! Rule-based BANT signal extraction from conversation turns

use async_trait::async_trait;
use sales_agent_config::QualificationConfig;
use sales_agent_core::{BantCriterion, BantSignal, BantStatus, Result, SignalExtractor};

const AFFIRMATIVE: [&str; 7] = ["yes", "yeah", "yep", "correct", "that's right", "absolutely", "sure"];
const NEGATIVE: [&str; 4] = ["no", "nope", "not really", "we don't"];

/// Keyword matcher over the configured confirm/reject lists.
///
/// Per criterion the reject list wins over the confirm list. A bare yes/no
/// answer applies to the criterion currently being asked about. Anything
/// else is `generic-text`.
#[derive(Debug, Clone, Default)]
pub struct KeywordSignalExtractor {
    config: QualificationConfig,
}

impl KeywordSignalExtractor {
    pub fn new(config: QualificationConfig) -> Self {
        Self { config }
    }

    pub fn extract_sync(&self, turn: &str, status: &BantStatus) -> Vec<BantSignal> {
        let text = turn.to_lowercase();
        let mut signals = Vec::new();

        for criterion in BantCriterion::ALL {
            let keywords = self.config.keywords(criterion);
            if keywords.reject.iter().any(|k| text.contains(&k.to_lowercase())) {
                signals.push(BantSignal::Rejected(criterion));
            } else if keywords.confirm.iter().any(|k| text.contains(&k.to_lowercase())) {
                signals.push(BantSignal::Confirmed(criterion));
            }
        }

        if signals.is_empty() {
            if let Some(signal) = short_answer(&text, status) {
                signals.push(signal);
            }
        }

        if signals.is_empty() {
            signals.push(BantSignal::GenericText);
        }
        signals
    }
}

fn short_answer(text: &str, status: &BantStatus) -> Option<BantSignal> {
    let answer = text.trim().trim_end_matches(['.', '!', '?', ',']).trim();
    let focus = status.next_focus()?;
    if AFFIRMATIVE.contains(&answer) {
        Some(BantSignal::Confirmed(focus))
    } else if NEGATIVE.contains(&answer) {
        Some(BantSignal::Rejected(focus))
    } else {
        None
    }
}

#[async_trait]
impl SignalExtractor for KeywordSignalExtractor {
    async fn extract(&self, turn: &str, status: &BantStatus) -> Result<Vec<BantSignal>> {
        Ok(self.extract_sync(turn, status))
    }

    fn name(&self) -> &str {
        "keyword"
    }
}
