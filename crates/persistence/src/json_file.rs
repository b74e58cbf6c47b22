//! JSON-file deal store
//!
//! All deals live in one `deals.json` document. Every mutation rewrites the
//! document through a temp file and rename, and only then becomes visible in
//! memory, so a failed write leaves both the file and the store unchanged.

use parking_lot::RwLock;
use sales_agent_core::{Deal, DealId, DealStore, Error, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::PersistenceError;

const DEALS_FILE: &str = "deals.json";

#[derive(Debug)]
pub struct JsonFileDealStore {
    path: PathBuf,
    deals: RwLock<BTreeMap<DealId, Deal>>,
}

impl JsonFileDealStore {
    /// Open (or create) the store under `dir`
    pub fn open(dir: impl AsRef<Path>) -> std::result::Result<Self, PersistenceError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|e| PersistenceError::io(dir, e))?;
        let path = dir.join(DEALS_FILE);

        let deals = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| PersistenceError::io(&path, e))?;
            let list: Vec<Deal> = serde_json::from_str(&content)?;
            list.into_iter().map(|d| (d.id.clone(), d)).collect()
        } else {
            BTreeMap::new()
        };

        tracing::info!(path = %path.display(), deals = deals.len(), "Opened JSON deal store");

        Ok(Self {
            path,
            deals: RwLock::new(deals),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, deals: &BTreeMap<DealId, Deal>) -> std::result::Result<(), PersistenceError> {
        let list: Vec<&Deal> = deals.values().collect();
        let json = serde_json::to_string_pretty(&list)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| PersistenceError::io(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| PersistenceError::io(&self.path, e))?;
        Ok(())
    }

    /// Apply `change` to a copy, write it, then swap it in
    fn commit(&self, change: impl FnOnce(&mut BTreeMap<DealId, Deal>) -> Result<()>) -> Result<()> {
        let mut deals = self.deals.write();
        let mut next = deals.clone();
        change(&mut next)?;
        self.persist(&next)?;
        *deals = next;
        Ok(())
    }
}

impl DealStore for JsonFileDealStore {
    fn insert(&self, deal: Deal) -> Result<()> {
        self.commit(|deals| {
            if deals.contains_key(&deal.id) {
                return Err(Error::DuplicateId(deal.id));
            }
            deals.insert(deal.id.clone(), deal);
            Ok(())
        })
    }

    fn get(&self, id: &DealId) -> Result<Option<Deal>> {
        Ok(self.deals.read().get(id).cloned())
    }

    fn update(&self, deal: Deal) -> Result<()> {
        self.commit(|deals| match deals.get_mut(&deal.id) {
            Some(existing) => {
                *existing = deal;
                Ok(())
            }
            None => Err(Error::NotFound(deal.id)),
        })
    }

    fn list(&self) -> Result<Vec<Deal>> {
        Ok(self.deals.read().values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deal(id: &str) -> Deal {
        Deal::new(DealId::from(id), "CUST-1", "Acme", 5_000.0).unwrap()
    }

    #[test]
    fn test_duplicate_does_not_touch_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileDealStore::open(dir.path()).unwrap();
        store.insert(deal("DEAL-1")).unwrap();
        let before = fs::read_to_string(store.path()).unwrap();

        assert!(matches!(store.insert(deal("DEAL-1")), Err(Error::DuplicateId(_))));
        assert_eq!(fs::read_to_string(store.path()).unwrap(), before);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(DEALS_FILE), "{not json").unwrap();
        assert!(matches!(
            JsonFileDealStore::open(dir.path()),
            Err(PersistenceError::Serialization(_))
        ));
    }
}
