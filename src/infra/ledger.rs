use crate::domain::models::ItemKey;
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const DEFAULT_LEDGER_FILE: &str = "processed_subtitles.log";

/// Items already matched remotely or uploaded, one key per line on disk.
#[derive(Debug)]
pub struct ProgressLedger {
    path: PathBuf,
    keys: HashSet<ItemKey>,
}

impl ProgressLedger {
    /// Reads every stored key. A missing file is a fresh ledger; an unreadable
    /// one is treated as empty.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut keys = HashSet::new();
        if path.exists() {
            match fs::read_to_string(&path) {
                Ok(content) => keys.extend(content.lines().filter_map(ItemKey::from_stored)),
                Err(e) => warn!(
                    "Could not read processed list from {}: {e}. Starting with an empty list.",
                    path.display()
                ),
            }
        }
        Self { path, keys }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn contains(&self, key: &ItemKey) -> bool {
        self.keys.contains(key)
    }

    /// Appends `key` and syncs it to disk before returning. The in-memory set
    /// only gains the key once the write has succeeded.
    pub fn record(&mut self, key: &ItemKey) -> Result<()> {
        if self.keys.contains(key) {
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open {}", self.path.display()))?;
        writeln!(file, "{key}")?;
        file.sync_all()
            .with_context(|| format!("Failed to sync {}", self.path.display()))?;

        self.keys.insert(key.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn key(s: &str) -> ItemKey {
        ItemKey::from_stored(s).unwrap()
    }

    #[test]
    fn test_missing_file_is_empty_ledger() {
        let dir = TempDir::new().unwrap();
        let ledger = ProgressLedger::load(dir.path().join("none.log"));
        assert_eq!(ledger.len(), 0);
    }

    #[test]
    fn test_record_survives_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.log");

        let mut ledger = ProgressLedger::load(&path);
        ledger.record(&key("movie:100")).unwrap();
        ledger.record(&key("tv:7:1:3")).unwrap();
        assert!(ledger.contains(&key("movie:100")));

        let reloaded = ProgressLedger::load(&path);
        assert_eq!(reloaded.len(), 2);
        assert!(reloaded.contains(&key("movie:100")));
        assert!(reloaded.contains(&key("tv:7:1:3")));
    }

    #[test]
    fn test_record_is_append_only_and_deduplicated() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.log");
        fs::write(&path, "movie:1\n\n  movie:2  \n").unwrap();

        let mut ledger = ProgressLedger::load(&path);
        assert_eq!(ledger.len(), 2);
        ledger.record(&key("movie:2")).unwrap();
        ledger.record(&key("movie:3")).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "movie:1\n\n  movie:2  \nmovie:3\n");
    }

    #[test]
    fn test_unreadable_file_is_empty_ledger() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.log");
        fs::write(&path, [0xff, 0xfe, 0x00, 0x80]).unwrap();

        let ledger = ProgressLedger::load(&path);
        assert_eq!(ledger.len(), 0);
    }

    #[test]
    fn test_failed_write_leaves_key_unrecorded() {
        let dir = TempDir::new().unwrap();
        // A directory in place of the file makes the append fail.
        let path = dir.path().join("ledger.log");
        fs::create_dir(&path).unwrap();

        let mut ledger = ProgressLedger::load(&path);
        assert!(ledger.record(&key("movie:1")).is_err());
        assert!(!ledger.contains(&key("movie:1")));
    }

    #[test]
    fn test_unusable_parent_is_named_in_error() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("state");
        fs::write(&blocker, "not a directory").unwrap();

        let mut ledger = ProgressLedger::load(blocker.join("ledger.log"));
        let err = ledger.record(&key("movie:1")).unwrap_err();
        assert!(err
            .to_string()
            .contains(&format!("Failed to create {}", blocker.display())));
        assert!(!ledger.contains(&key("movie:1")));
    }
}
