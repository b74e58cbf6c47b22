use crate::deal::{Deal, DealId};
use crate::interaction::Interaction;
use crate::error::Result;

/// Deal collection keyed by stable id.
///
/// Implementations hold no cross-deal locks; serializing mutations of one
/// deal is the pipeline manager's job.
pub trait DealStore: Send + Sync {
    /// Store a new deal; `Error::DuplicateId` if the id is taken
    fn insert(&self, deal: Deal) -> Result<()>;

    fn get(&self, id: &DealId) -> Result<Option<Deal>>;

    /// Replace an existing deal; `Error::NotFound` if absent
    fn update(&self, deal: Deal) -> Result<()>;

    /// Snapshot of every deal, ordered by id
    fn list(&self) -> Result<Vec<Deal>>;

    fn contains(&self, id: &DealId) -> Result<bool> {
        Ok(self.get(id)?.is_some())
    }

    fn len(&self) -> Result<usize> {
        Ok(self.list()?.len())
    }
}

/// Durable backing for the interaction log; entries are only ever appended
pub trait InteractionStore: Send + Sync {
    fn append(&self, interaction: &Interaction) -> Result<()>;

    /// Every stored entry, in append order
    fn load_all(&self) -> Result<Vec<Interaction>>;
}
