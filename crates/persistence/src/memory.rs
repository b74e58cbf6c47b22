//! In-memory deal store

use parking_lot::RwLock;
use sales_agent_core::{Deal, DealId, DealStore, Error, Result};
use std::collections::BTreeMap;

#[derive(Debug, Default)]
pub struct InMemoryDealStore {
    deals: RwLock<BTreeMap<DealId, Deal>>,
}

impl InMemoryDealStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DealStore for InMemoryDealStore {
    fn insert(&self, deal: Deal) -> Result<()> {
        let mut deals = self.deals.write();
        if deals.contains_key(&deal.id) {
            return Err(Error::DuplicateId(deal.id));
        }
        deals.insert(deal.id.clone(), deal);
        Ok(())
    }

    fn get(&self, id: &DealId) -> Result<Option<Deal>> {
        Ok(self.deals.read().get(id).cloned())
    }

    fn update(&self, deal: Deal) -> Result<()> {
        let mut deals = self.deals.write();
        match deals.get_mut(&deal.id) {
            Some(existing) => {
                *existing = deal;
                Ok(())
            }
            None => Err(Error::NotFound(deal.id)),
        }
    }

    fn list(&self) -> Result<Vec<Deal>> {
        Ok(self.deals.read().values().cloned().collect())
    }

    fn len(&self) -> Result<usize> {
        Ok(self.deals.read().len())
    }
}
