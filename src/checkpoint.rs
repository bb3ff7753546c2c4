//! Persistent download watermark.
//!
//! A single decimal integer in a plain-text file: the newest processed
//! upload timestamp plus one, fed back as the `ts_from` lower bound of the
//! next run. A missing or garbled file reads as `None`; the sync engine
//! decides how to recover (it seeds the file with zero), so reading never
//! writes.

use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Last committed checkpoint, or `None` when the file is missing,
    /// unreadable, or not a decimal integer.
    pub fn read(&self) -> Option<u64> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) => {
                debug!(path = %self.path.display(), "No readable checkpoint: {e}");
                return None;
            }
        };
        match text.trim().parse::<u64>() {
            Ok(value) => Some(value),
            Err(_) => {
                debug!(
                    path = %self.path.display(),
                    content = %text.trim(),
                    "Checkpoint file does not hold a timestamp"
                );
                None
            }
        }
    }

    /// Replace the checkpoint atomically: write a sibling temp file, then
    /// rename it over the real one. A crash mid-write leaves the previous
    /// checkpoint intact.
    pub fn write(&self, value: u64) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, value.to_string())?;
        std::fs::rename(&tmp, &self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> CheckpointStore {
        CheckpointStore::new(dir.path().join("offset.txt"))
    }

    #[test]
    fn missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        assert_eq!(store.read(), None);
        // Reading must not create the file.
        assert!(!dir.path().join("offset.txt").exists());
    }

    #[test]
    fn write_then_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store.write(1443295987).unwrap();
        assert_eq!(store.read(), Some(1443295987));
    }

    #[test]
    fn write_replaces_previous_value() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store.write(5).unwrap();
        store.write(9).unwrap();
        assert_eq!(store.read(), Some(9));
    }

    #[test]
    fn no_temp_file_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store.write(42).unwrap();
        assert!(!dir.path().join("offset.tmp").exists());
    }

    #[test]
    fn garbage_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        std::fs::write(dir.path().join("offset.txt"), "not a number").unwrap();
        assert_eq!(store.read(), None);
    }

    #[test]
    fn surrounding_whitespace_is_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        std::fs::write(dir.path().join("offset.txt"), "1234\n").unwrap();
        assert_eq!(store.read(), Some(1234));
    }

    #[test]
    fn write_creates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(dir.path().join("state").join("offset.txt"));

        store.write(7).unwrap();
        assert_eq!(store.read(), Some(7));
    }
}
