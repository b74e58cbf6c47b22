//! Keyword lists and discovery questions for BANT qualification

use sales_agent_core::BantCriterion;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CriterionKeywords {
    /// Phrases that confirm the criterion
    #[serde(default)]
    pub confirm: Vec<String>,
    /// Phrases that rule the criterion out; checked before `confirm`
    #[serde(default)]
    pub reject: Vec<String>,
    /// Question asked when this criterion is the next focus
    #[serde(default)]
    pub question: String,
}

impl CriterionKeywords {
    fn new(confirm: &[&str], reject: &[&str], question: &str) -> Self {
        Self {
            confirm: confirm.iter().map(|s| s.to_string()).collect(),
            reject: reject.iter().map(|s| s.to_string()).collect(),
            question: question.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualificationConfig {
    #[serde(default = "default_budget")]
    pub budget: CriterionKeywords,
    #[serde(default = "default_authority")]
    pub authority: CriterionKeywords,
    #[serde(default = "default_need")]
    pub need: CriterionKeywords,
    #[serde(default = "default_timeline")]
    pub timeline: CriterionKeywords,
}

fn default_budget() -> CriterionKeywords {
    CriterionKeywords::new(
        &["budget of", "allocated", "approved budget", "we can spend", "budget is"],
        &["no budget", "can't afford", "cannot afford", "too expensive", "budget frozen"],
        "To help me provide the right solution, what budget range have you allocated for this initiative?",
    )
}

fn default_authority() -> CriterionKeywords {
    CriterionKeywords::new(
        &["i decide", "my decision", "i sign off", "i approve", "final say"],
        &["not my decision", "not the decision maker", "need to ask my boss", "someone else decides"],
        "Who else besides yourself will be involved in evaluating and approving this decision?",
    )
}

fn default_need() -> CriterionKeywords {
    CriterionKeywords::new(
        &["struggling with", "pain point", "we need", "challenge", "problem with"],
        &["no need", "not a priority", "already solved", "happy with our current"],
        "What specific challenges or pain points are you looking to address with this solution?",
    )
}

fn default_timeline() -> CriterionKeywords {
    CriterionKeywords::new(
        &["this quarter", "next quarter", "end of q", "within a month", "asap", "by the end of"],
        &["no timeline", "next year maybe", "not anytime soon", "no rush"],
        "What's driving your timeline for implementing a solution?",
    )
}

impl Default for QualificationConfig {
    fn default() -> Self {
        Self {
            budget: default_budget(),
            authority: default_authority(),
            need: default_need(),
            timeline: default_timeline(),
        }
    }
}

impl QualificationConfig {
    pub fn keywords(&self, criterion: BantCriterion) -> &CriterionKeywords {
        match criterion {
            BantCriterion::Budget => &self.budget,
            BantCriterion::Authority => &self.authority,
            BantCriterion::Need => &self.need,
            BantCriterion::Timeline => &self.timeline,
        }
    }

    pub fn question(&self, criterion: BantCriterion) -> &str {
        &self.keywords(criterion).question
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for criterion in BantCriterion::ALL {
            let keywords = self.keywords(criterion);
            if keywords
                .confirm
                .iter()
                .chain(keywords.reject.iter())
                .any(|k| k.trim().is_empty())
            {
                return Err(ConfigError::invalid(
                    format!("qualification.{}", criterion),
                    "Keyword lists must not contain empty entries",
                ));
            }
        }
        Ok(())
    }
}
