//! Error taxonomy shared by every crate in the workspace

use thiserror::Error;

use crate::deal::{DealId, PipelineStage};

/// Core errors
///
/// All variants are deterministic: retrying with the same input reproduces
/// the same error, so nothing in the workspace retries them.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Malformed or incomplete lead / ICP / request value
    #[error("Invalid input for {field}: {message}")]
    InvalidInput { field: String, message: String },

    /// Target stage is not reachable from the current stage
    #[error("Illegal transition for deal {deal_id}: {from} -> {to} ({reason})")]
    IllegalTransition {
        deal_id: DealId,
        from: PipelineStage,
        to: PipelineStage,
        reason: String,
    },

    /// Deal already sits in CLOSED_WON / CLOSED_LOST
    #[error("Deal {deal_id} is closed at {stage}; cannot move to {attempted}")]
    TerminalState {
        deal_id: DealId,
        stage: PipelineStage,
        attempted: PipelineStage,
    },

    #[error("Duplicate deal id: {0}")]
    DuplicateId(DealId),

    #[error("Deal not found: {0}")]
    NotFound(DealId),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl Error {
    pub fn invalid_input(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Stable machine-readable kind, used in API error bodies and metrics labels
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidInput { .. } => "invalid_input",
            Error::IllegalTransition { .. } => "illegal_transition",
            Error::TerminalState { .. } => "terminal_state",
            Error::DuplicateId(_) => "duplicate_id",
            Error::NotFound(_) => "not_found",
            Error::Storage(_) => "storage",
        }
    }

    /// Deal the error refers to, if any
    pub fn deal_id(&self) -> Option<&DealId> {
        match self {
            Error::IllegalTransition { deal_id, .. } | Error::TerminalState { deal_id, .. } => {
                Some(deal_id)
            }
            Error::DuplicateId(id) | Error::NotFound(id) => Some(id),
            Error::InvalidInput { .. } | Error::Storage(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
