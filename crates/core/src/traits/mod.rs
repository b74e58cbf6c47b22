//! Collaborator traits
//!
//! - `DealStore`: the owned deal collection injected into the pipeline manager
//! - `InteractionStore`: append-only backing for the interaction log
//! - `SignalExtractor`: conversational analysis, the only async boundary

mod signals;
mod store;

pub use signals::SignalExtractor;
pub use store::{DealStore, InteractionStore};
