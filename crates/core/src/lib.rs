//! Core types for the sales pipeline
//!
//! This crate provides the types shared by every other crate:
//! - Lead / company profiles and the ideal customer profile (ICP)
//! - Score breakdowns and priority tiers
//! - BANT qualification status and signal tags
//! - Deals, pipeline stages and the stage-history log
//! - Interaction records
//! - Error taxonomy
//! - Collaborator traits (deal store, signal extraction)

pub mod bant;
pub mod deal;
pub mod error;
pub mod icp;
pub mod interaction;
pub mod lead;
pub mod score;
pub mod traits;

pub use bant::{BantCriterion, BantSignal, BantState, BantStatus, Recommendation};
pub use deal::{Deal, DealId, PipelineStage, StageHistoryEntry};
pub use error::{Error, Result};
pub use icp::{Icp, MarketBreadth, MarketEstimate};
pub use interaction::{Interaction, InteractionType, Sentiment};
pub use lead::{CompanyProfile, Contact, NumericRange, REQUIRED_PROFILE_FIELDS};
pub use score::{ScoreBreakdown, Tier};
pub use traits::{DealStore, InteractionStore, SignalExtractor};
