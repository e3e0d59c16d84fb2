//! JSON file persistence for the seen record

use crate::types::{SeenEntry, SeenRecord};
use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Seen record stored as a pretty-printed JSON array
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the record.
    ///
    /// A missing, empty or unparseable file yields an empty record. Entries
    /// without a string `theaterId` and integer `quantity` are dropped, as
    /// are repeats of a key already loaded.
    pub async fn load(&self) -> SeenRecord {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No state file at {}, starting empty", self.path.display());
                return Vec::new();
            }
            Err(e) => {
                error!("Error reading state file {}: {}", self.path.display(), e);
                return Vec::new();
            }
        };

        let entries = match serde_json::from_str::<Value>(&text) {
            Ok(Value::Array(entries)) => entries,
            Ok(_) => {
                warn!("State file {} is not a JSON array, ignoring it", self.path.display());
                return Vec::new();
            }
            Err(e) => {
                error!("Error parsing state file {}: {}", self.path.display(), e);
                return Vec::new();
            }
        };

        let total = entries.len();
        let mut keys = HashSet::new();
        let record: SeenRecord = entries
            .into_iter()
            .filter_map(|entry| serde_json::from_value::<SeenEntry>(entry).ok())
            .filter(|entry| keys.insert(entry.key()))
            .collect();

        if record.len() < total {
            warn!("Dropped {} malformed or repeated entries from state file", total - record.len());
        }
        info!("Loaded {} seen missions from the cache", record.len());
        record
    }

    /// Persist the record, replacing the previous file atomically
    pub async fn save(&self, record: &[SeenEntry]) -> Result<()> {
        let json = serde_json::to_string_pretty(record).context("Failed to serialize seen record")?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;

        info!("Saved {} missions to state file", record.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SeenKey;

    fn entry(theater: &str, quantity: u64) -> SeenEntry {
        SeenEntry::from(SeenKey::new(theater, quantity))
    }

    #[tokio::test]
    async fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path().join("state.json"));
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_empty_or_invalid_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let store = StateStore::new(&path);

        std::fs::write(&path, "").unwrap();
        assert!(store.load().await.is_empty());

        std::fs::write(&path, "{not json").unwrap();
        assert!(store.load().await.is_empty());

        std::fs::write(&path, r#"{"theaterId": "a", "quantity": 1}"#).unwrap();
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_entries_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(
            &path,
            r#"[
                {"theaterId": "a", "quantity": 50},
                {"theaterId": "b"},
                {"quantity": 10},
                {"theaterId": 3, "quantity": 10},
                "junk",
                {"theaterId": "c", "quantity": 75, "display_name": "extra fields are fine"}
            ]"#,
        )
        .unwrap();

        let record = StateStore::new(&path).load().await;
        assert_eq!(record, vec![entry("a", 50), entry("c", 75)]);
    }

    #[tokio::test]
    async fn test_repeated_entries_keep_first() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(
            &path,
            r#"[
                {"theaterId": "a", "quantity": 50},
                {"theaterId": "b", "quantity": 10},
                {"theaterId": "a", "quantity": 50},
                {"theaterId": "a", "quantity": 60}
            ]"#,
        )
        .unwrap();

        let record = StateStore::new(&path).load().await;
        assert_eq!(record, vec![entry("a", 50), entry("b", 10), entry("a", 60)]);
    }

    #[tokio::test]
    async fn test_save_then_load_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path().join("nested").join("state.json"));
        let record = vec![entry("z", 1), entry("a", 2), entry("m", 3)];

        store.save(&record).await.unwrap();
        assert_eq!(store.load().await, record);
        assert!(!store.path().with_extension("json.tmp").exists());

        let raw: Value = serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(raw[0], serde_json::json!({"theaterId": "z", "quantity": 1}));
    }
}
