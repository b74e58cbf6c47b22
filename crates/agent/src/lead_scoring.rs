//! Lead Scoring Module
//!
//! Scores a discovered lead against an ICP:
//! - Company fit: industry, size, revenue and geography overlap
//! - Persona fit: decision-maker titles against buyer personas
//! - Intent: recency signals matching engagement keywords, with diminishing returns
//! - Data quality: share of required profile fields present
//!
//! The composite is the configured weighted sum (0.40 / 0.30 / 0.20 / 0.10 by
//! default), rounded and clamped to 0..=100. Scoring is pure: same inputs,
//! same breakdown.

use once_cell::sync::Lazy;
use sales_agent_config::ScoringConfig;
use sales_agent_core::{CompanyProfile, Icp, Result, ScoreBreakdown, Tier};
use std::collections::HashSet;

/// Multi-word title phrases folded into a single canonical token
static TITLE_SYNONYMS: Lazy<Vec<(&'static str, &'static str)>> = Lazy::new(|| {
    vec![
        ("senior vice president", "svp"),
        ("executive vice president", "evp"),
        ("vice president", "vp"),
        ("chief executive officer", "ceo"),
        ("chief revenue officer", "cro"),
        ("chief technology officer", "cto"),
        ("chief financial officer", "cfo"),
        ("chief marketing officer", "cmo"),
        ("chief operating officer", "coo"),
        ("head of", "head"),
        ("business development", "bizdev"),
        ("sr", "senior"),
    ]
});

const TITLE_STOPWORDS: [&str; 5] = ["of", "the", "and", "for", "at"];

/// Lead scoring engine
#[derive(Debug, Clone, Default)]
pub struct LeadScoringEngine {
    config: ScoringConfig,
}

impl LeadScoringEngine {
    /// Engine with the default weights and thresholds
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Score `lead` against `icp`.
    ///
    /// Fails with `InvalidInput` when either side lacks an industry or size band.
    pub fn score(&self, lead: &CompanyProfile, icp: &Icp) -> Result<ScoreBreakdown> {
        lead.validate()?;
        icp.validate()?;

        let company_fit = self.company_fit(lead, icp);
        let persona_fit = self.persona_fit(lead, icp);
        let intent_signals = self.intent_score(lead, icp);
        let data_quality = Self::data_quality(lead);
        let composite = self.composite(company_fit, persona_fit, intent_signals, data_quality);
        let tier = self.tier(composite);

        tracing::debug!(
            company = %lead.company_name,
            company_fit,
            persona_fit,
            intent_signals,
            data_quality,
            composite,
            tier = %tier,
            "Scored lead"
        );

        Ok(ScoreBreakdown {
            company_fit,
            persona_fit,
            intent_signals,
            data_quality,
            composite,
            tier,
        })
    }

    /// Weighted sum of the four sub-scores, rounded and clamped to 0..=100
    pub fn composite(&self, company: u32, persona: u32, intent: u32, quality: u32) -> u32 {
        let w = &self.config.weights;
        let raw = w.company_fit * company as f64
            + w.persona_fit * persona as f64
            + w.intent_signals * intent as f64
            + w.data_quality * quality as f64;
        raw.round().clamp(0.0, 100.0) as u32
    }

    pub fn tier(&self, composite: u32) -> Tier {
        Tier::from_score_with_thresholds(composite, self.config.tiers.hot, self.config.tiers.warm)
    }

    /// Each dimension the ICP specifies carries an equal share of 100
    pub fn company_fit(&self, lead: &CompanyProfile, icp: &Icp) -> u32 {
        let tolerance = self.config.range_tolerance;
        let mut fractions: Vec<f64> = Vec::with_capacity(4);

        if let Some(target) = icp.industry.as_deref().filter(|s| !s.trim().is_empty()) {
            fractions.push(
                lead.industry
                    .as_deref()
                    .map(|industry| industry_match(industry, target))
                    .unwrap_or(0.0),
            );
        }

        if let Some(target) = &icp.size {
            fractions.push(
                lead.employees
                    .map(|band| band.overlap_fraction(target, tolerance))
                    .unwrap_or(0.0),
            );
        }

        if let Some(target) = &icp.revenue {
            fractions.push(
                lead.revenue
                    .map(|band| band.overlap_fraction(target, tolerance))
                    .unwrap_or(0.0),
            );
        }

        if let Some(target) = icp.geography.as_deref().filter(|s| !s.trim().is_empty()) {
            fractions.push(
                lead.location
                    .as_deref()
                    .map(|location| if contains_either(location, target) { 1.0 } else { 0.0 })
                    .unwrap_or(0.0),
            );
        }

        if fractions.is_empty() {
            return 0;
        }
        let share = 100.0 / fractions.len() as f64;
        let total: f64 = fractions.iter().map(|f| f * share).sum();
        total.round().clamp(0.0, 100.0) as u32
    }

    /// Principal contact matching a persona scores full marks, another
    /// contact matching scores the secondary grade, token overlap is graded
    /// up to the partial ceiling, and no contacts score 0.
    pub fn persona_fit(&self, lead: &CompanyProfile, icp: &Icp) -> u32 {
        let grading = &self.config.persona;
        if lead.contacts.is_empty() {
            return 0;
        }

        let personas: Vec<HashSet<String>> = icp
            .persona_titles
            .iter()
            .map(|t| title_tokens(t))
            .filter(|tokens| !tokens.is_empty())
            .collect();

        if personas.is_empty() {
            // Nothing to match against; any named decision maker is a partial fit
            return grading.partial_ceiling;
        }

        let titles: Vec<HashSet<String>> =
            lead.contacts.iter().map(|c| title_tokens(&c.title)).collect();

        let full_match = |title: &HashSet<String>| {
            !title.is_empty() && personas.iter().any(|persona| persona.is_subset(title))
        };

        if titles.first().map(full_match).unwrap_or(false) {
            return grading.principal_match;
        }
        if titles.iter().skip(1).any(full_match) {
            return grading.secondary_match;
        }

        let best_overlap = titles
            .iter()
            .flat_map(|title| {
                personas.iter().map(move |persona| {
                    persona.intersection(title).count() as f64 / persona.len() as f64
                })
            })
            .fold(0.0_f64, f64::max);

        (best_overlap * grading.partial_ceiling as f64).round() as u32
    }

    /// `m` matching signals score `100 * (1 - decay^m)`; an ICP without
    /// engagement keywords counts every signal.
    ///
    /// A signal matches when it contains a keyword as whole words, so
    /// "Series B funding" matches "funding" but "in" matches nothing.
    pub fn intent_score(&self, lead: &CompanyProfile, icp: &Icp) -> u32 {
        let keywords: Vec<Vec<String>> = icp
            .engagement_signals
            .iter()
            .map(|k| words(k).collect::<Vec<_>>())
            .filter(|k| !k.is_empty())
            .collect();

        let matched = lead
            .signals
            .iter()
            .map(|s| words(s).collect::<Vec<_>>())
            .filter(|s| !s.is_empty())
            .filter(|signal| {
                keywords.is_empty() || keywords.iter().any(|k| contains_phrase(signal, k))
            })
            .count();

        Self::intent_curve(matched, self.config.intent_decay)
    }

    pub fn intent_curve(matched: usize, decay: f64) -> u32 {
        let exponent = matched.min(i32::MAX as usize) as i32;
        let score = 100.0 * (1.0 - decay.powi(exponent));
        score.round().clamp(0.0, 100.0) as u32
    }

    pub fn data_quality(lead: &CompanyProfile) -> u32 {
        (lead.completeness() * 100.0).round().clamp(0.0, 100.0) as u32
    }
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

fn contains_either(a: &str, b: &str) -> bool {
    let a = normalize(a);
    let b = normalize(b);
    !a.is_empty() && !b.is_empty() && (a.contains(&b) || b.contains(&a))
}

/// Exact or containment match is full; otherwise the share of ICP words present
fn industry_match(lead: &str, target: &str) -> f64 {
    if contains_either(lead, target) {
        return 1.0;
    }
    let lead_words: HashSet<String> = words(lead).collect();
    let target_words: Vec<String> = words(target).collect();
    if target_words.is_empty() {
        return 0.0;
    }
    let shared = target_words.iter().filter(|w| lead_words.contains(*w)).count();
    shared as f64 / target_words.len() as f64
}

/// `phrase` occurs in `text` as a contiguous run of words
fn contains_phrase(text: &[String], phrase: &[String]) -> bool {
    !phrase.is_empty() && text.windows(phrase.len()).any(|window| window == phrase)
}

fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
}

/// Canonical token set of a job title: lowercase, punctuation stripped,
/// synonyms folded, stopwords removed
pub(crate) fn title_tokens(title: &str) -> HashSet<String> {
    let mut text: String = title
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    text = format!(" {} ", text.split_whitespace().collect::<Vec<_>>().join(" "));

    for (phrase, canonical) in TITLE_SYNONYMS.iter() {
        text = text.replace(&format!(" {} ", phrase), &format!(" {} ", canonical));
    }

    text.split_whitespace()
        .filter(|w| !TITLE_STOPWORDS.contains(w))
        .map(|w| w.to_string())
        .collect()
}
