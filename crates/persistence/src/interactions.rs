//! Interaction log file, one JSON record per line

use sales_agent_core::{Interaction, InteractionStore, Result};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::PersistenceError;

const INTERACTIONS_FILE: &str = "interactions.jsonl";

#[derive(Debug)]
pub struct JsonLinesInteractionStore {
    path: PathBuf,
}

impl JsonLinesInteractionStore {
    /// Open (or create) the log under `dir`
    pub fn open(dir: impl AsRef<Path>) -> std::result::Result<Self, PersistenceError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|e| PersistenceError::io(dir, e))?;
        Ok(Self {
            path: dir.join(INTERACTIONS_FILE),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> std::result::Result<Vec<Interaction>, PersistenceError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content =
            fs::read_to_string(&self.path).map_err(|e| PersistenceError::io(&self.path, e))?;
        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(PersistenceError::from))
            .collect()
    }

    fn write_one(&self, interaction: &Interaction) -> std::result::Result<(), PersistenceError> {
        let mut line = serde_json::to_string(interaction)?;
        line.push('\n');
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| PersistenceError::io(&self.path, e))?;
        file.write_all(line.as_bytes())
            .map_err(|e| PersistenceError::io(&self.path, e))?;
        Ok(())
    }
}

impl InteractionStore for JsonLinesInteractionStore {
    fn append(&self, interaction: &Interaction) -> Result<()> {
        Ok(self.write_one(interaction)?)
    }

    fn load_all(&self) -> Result<Vec<Interaction>> {
        let entries = self.read_all()?;
        tracing::debug!(path = %self.path.display(), entries = entries.len(), "Read interaction log");
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sales_agent_core::{DealId, InteractionType, Sentiment};

    #[test]
    fn test_append_and_reload_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonLinesInteractionStore::open(dir.path()).unwrap();
        assert!(store.load_all().unwrap().is_empty());

        let first = Interaction::new("C1", InteractionType::Call, "intro")
            .for_deal(DealId::from("DEAL-1"))
            .with_sentiment(Sentiment::Positive);
        let second = Interaction::new("C1", InteractionType::Email, "follow up");
        store.append(&first).unwrap();
        store.append(&second).unwrap();

        let reopened = JsonLinesInteractionStore::open(dir.path()).unwrap();
        assert_eq!(reopened.load_all().unwrap(), vec![first, second]);
    }

    #[test]
    fn test_corrupt_line_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(INTERACTIONS_FILE), "{\"id\": 1}\n").unwrap();
        let store = JsonLinesInteractionStore::open(dir.path()).unwrap();
        assert!(matches!(
            store.load_all(),
            Err(sales_agent_core::Error::Storage(_))
        ));
    }
}
