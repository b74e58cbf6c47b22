//! Post-processing of discovered leads: dedupe, score, rank

use sales_agent_core::{CompanyProfile, Icp, Result, ScoreBreakdown};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::lead_scoring::LeadScoringEngine;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedLead {
    pub lead: CompanyProfile,
    pub score: ScoreBreakdown,
}

/// Dedupe by company name (case-insensitive, first wins), score, sort by
/// composite descending and keep the top `max`.
///
/// Leads that fail validation are skipped; an invalid ICP is an error.
pub fn rank_leads(
    engine: &LeadScoringEngine,
    leads: Vec<CompanyProfile>,
    icp: &Icp,
    max: usize,
) -> Result<Vec<RankedLead>> {
    icp.validate()?;

    let mut seen = HashSet::new();
    let mut ranked: Vec<RankedLead> = Vec::with_capacity(leads.len());

    for lead in leads {
        let key = lead.company_name.trim().to_lowercase();
        if !seen.insert(key) {
            tracing::debug!(company = %lead.company_name, "Skipping duplicate lead");
            continue;
        }

        match engine.score(&lead, icp) {
            Ok(score) => ranked.push(RankedLead { lead, score }),
            Err(err) => {
                tracing::warn!(company = %lead.company_name, error = %err, "Skipping invalid lead");
            }
        }
    }

    // stable sort keeps discovery order among equal scores
    ranked.sort_by(|a, b| b.score.composite.cmp(&a.score.composite));
    ranked.truncate(max);
    Ok(ranked)
}
