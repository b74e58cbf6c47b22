//! Persistence layer for the sales pipeline
//!
//! Provides storage for:
//! - Deals (in-memory or a JSON document on disk)
//! - ICPs (one JSON file per record)
//! - The interaction log (JSON lines, append only)

pub mod error;
pub mod icp;
pub mod interactions;
pub mod json_file;
pub mod memory;

pub use error::PersistenceError;
pub use icp::IcpFileStore;
pub use interactions::JsonLinesInteractionStore;
pub use json_file::JsonFileDealStore;
pub use memory::InMemoryDealStore;

use sales_agent_config::{PersistenceBackend, PersistenceConfig};
use sales_agent_core::{DealStore, InteractionStore};
use std::sync::Arc;

/// Combined persistence layer
pub struct PersistenceLayer {
    pub deals: Arc<dyn DealStore>,
    /// Only available with the json backend
    pub icps: Option<IcpFileStore>,
    /// Only available with the json backend
    pub interactions: Option<Arc<dyn InteractionStore>>,
}

/// Initialize the configured backend
pub fn init(config: &PersistenceConfig) -> Result<PersistenceLayer, PersistenceError> {
    match config.backend {
        PersistenceBackend::Memory => {
            tracing::info!("Using in-memory persistence");
            Ok(PersistenceLayer {
                deals: Arc::new(InMemoryDealStore::new()),
                icps: None,
                interactions: None,
            })
        }
        PersistenceBackend::Json => Ok(PersistenceLayer {
            deals: Arc::new(JsonFileDealStore::open(&config.data_dir)?),
            icps: Some(IcpFileStore::open(config.data_dir.join("icps"))?),
            interactions: Some(Arc::new(JsonLinesInteractionStore::open(&config.data_dir)?)),
        }),
    }
}
