//! Persistence errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid record id: {0}")]
    InvalidId(String),
}

impl PersistenceError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        PersistenceError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

impl From<PersistenceError> for sales_agent_core::Error {
    fn from(err: PersistenceError) -> Self {
        sales_agent_core::Error::Storage(err.to_string())
    }
}
