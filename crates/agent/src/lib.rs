//! Sales pipeline engine
//!
//! Features:
//! - Lead scoring against an ICP, with priority tiers
//! - Lead ranking for discovery results
//! - BANT qualification from signal tags
//! - Stage machine for the deal pipeline
//! - Pipeline manager with per-deal locking and reporting
//! - Interaction log and ROI calculation
//! - Keyword signal extraction and a qualification conversation driver

pub mod bant;
pub mod conversation;
pub mod discovery;
pub mod extractor;
pub mod interactions;
pub mod lead_scoring;
pub mod pipeline;
pub mod roi;
pub mod stage;

pub use bant::{apply_all, recommend, update, BantQualifier};
pub use conversation::{QualificationConversation, TurnOutcome};
pub use discovery::{rank_leads, RankedLead};
pub use extractor::KeywordSignalExtractor;
pub use interactions::{InteractionLog, InteractionStats};
pub use lead_scoring::LeadScoringEngine;
pub use pipeline::{PipelineManager, PipelineReport, StageSummary};
pub use roi::{RoiCalculator, RoiReport};
pub use stage::{StageMachine, StageTransition};
