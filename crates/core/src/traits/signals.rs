use async_trait::async_trait;

use crate::bant::{BantSignal, BantStatus};
use crate::error::Result;

/// Turns a conversational turn into fully-resolved BANT signal tags.
///
/// Implementations may call out to a model or service; the pipeline core
/// only ever sees the resulting tags.
#[async_trait]
pub trait SignalExtractor: Send + Sync {
    /// Signals carried by `turn`. The current status is passed so extractors
    /// can resolve short answers ("yes", "next quarter") against the
    /// criterion being asked about.
    async fn extract(&self, turn: &str, status: &BantStatus) -> Result<Vec<BantSignal>>;

    fn name(&self) -> &str;
}
