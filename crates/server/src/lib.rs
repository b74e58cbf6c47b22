//! Sales Agent Server
//!
//! Provides the HTTP API over the pipeline manager, scoring engine and
//! qualification driver.

pub mod http;
pub mod metrics;
pub mod state;

pub use crate::http::create_router;
pub use crate::metrics::{
    init_metrics, record_error, record_request, record_score, record_transition,
};
pub use crate::state::AppState;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use sales_agent_core::Error as CoreError;
use sales_agent_persistence::PersistenceError;
use thiserror::Error;

/// Server errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error(transparent)]
    Pipeline(#[from] CoreError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A named record other than a deal does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Not available: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServerError {
    pub fn kind(&self) -> &'static str {
        match self {
            ServerError::Pipeline(e) => e.kind(),
            ServerError::InvalidRequest(_) => "invalid_input",
            ServerError::NotFound(_) => "not_found",
            ServerError::Unavailable(_) => "unavailable",
            ServerError::Internal(_) => "internal",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::Pipeline(e) => match e {
                CoreError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
                CoreError::NotFound(_) => StatusCode::NOT_FOUND,
                CoreError::DuplicateId(_)
                | CoreError::IllegalTransition { .. }
                | CoreError::TerminalState { .. } => StatusCode::CONFLICT,
                CoreError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<PersistenceError> for ServerError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::InvalidId(id) => {
                ServerError::InvalidRequest(format!("invalid record id: {}", id))
            }
            other => ServerError::Pipeline(other.into()),
        }
    }
}

impl From<ServerError> for StatusCode {
    fn from(err: ServerError) -> Self {
        err.status()
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let kind = self.kind();
        if status.is_server_error() {
            tracing::error!(error = %self, kind, "Request failed");
        } else {
            tracing::debug!(error = %self, kind, "Request rejected");
        }
        record_error(kind);

        let body = serde_json::json!({
            "error": kind,
            "message": self.to_string(),
        });
        (status, Json(body)).into_response()
    }
}
