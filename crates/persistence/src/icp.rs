//! ICP records, one JSON file per id

use sales_agent_core::Icp;
use std::fs;
use std::path::{Path, PathBuf};

use crate::PersistenceError;

#[derive(Debug, Clone)]
pub struct IcpFileStore {
    dir: PathBuf,
}

impl IcpFileStore {
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|e| PersistenceError::io(&dir, e))?;
        Ok(Self { dir })
    }

    fn path_for(&self, id: &str) -> Result<PathBuf, PersistenceError> {
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(PersistenceError::InvalidId(id.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", id)))
    }

    pub fn save(&self, id: &str, icp: &Icp) -> Result<(), PersistenceError> {
        let path = self.path_for(id)?;
        let json = serde_json::to_string_pretty(icp)?;
        fs::write(&path, json).map_err(|e| PersistenceError::io(&path, e))?;
        tracing::debug!(icp_id = %id, "Saved ICP");
        Ok(())
    }

    pub fn load(&self, id: &str) -> Result<Option<Icp>, PersistenceError> {
        let path = self.path_for(id)?;
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path).map_err(|e| PersistenceError::io(&path, e))?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    /// Stored ids, sorted
    pub fn list(&self) -> Result<Vec<String>, PersistenceError> {
        let entries = fs::read_dir(&self.dir).map_err(|e| PersistenceError::io(&self.dir, e))?;
        let mut ids: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let path = entry.path();
                if path.extension().and_then(|e| e.to_str()) != Some("json") {
                    return None;
                }
                path.file_stem().and_then(|s| s.to_str()).map(String::from)
            })
            .collect();
        ids.sort();
        Ok(ids)
    }

    /// Returns whether a record was removed
    pub fn delete(&self, id: &str) -> Result<bool, PersistenceError> {
        let path = self.path_for(id)?;
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path).map_err(|e| PersistenceError::io(&path, e))?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_path_like_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = IcpFileStore::open(dir.path()).unwrap();
        assert!(matches!(
            store.save("../escape", &Icp::default()),
            Err(PersistenceError::InvalidId(_))
        ));
        assert!(store.load("").is_err());
    }

    #[test]
    fn test_delete_missing_is_false() {
        let dir = tempfile::tempdir().unwrap();
        let store = IcpFileStore::open(dir.path()).unwrap();
        assert!(!store.delete("nothing").unwrap());
    }
}
