//! High-score persistence.
//!
//! The engine only sees [`HighScoreStore`], whose methods never fail: a store
//! that cannot be read reports `0` and a failed write is logged and dropped.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_HIGH_SCORE_FILE: &str = "snake_highscore.json";

pub trait HighScoreStore {
    fn read_high_score(&self) -> u32;
    fn write_high_score(&mut self, score: u32);
}

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("high score store unavailable: {0}")]
    Io(#[from] io::Error),
    #[error("high score store is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct HighScoreRecord {
    #[serde(default)]
    high_score: u32,
}

/// Stores the high score as `{"high_score": N}` in a JSON file.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<u32, PersistenceError> {
        let text = fs::read_to_string(&self.path)?;
        let record: HighScoreRecord = serde_json::from_str(&text)?;
        Ok(record.high_score)
    }

    pub fn save(&self, score: u32) -> Result<(), PersistenceError> {
        let text = serde_json::to_string(&HighScoreRecord { high_score: score })?;
        fs::write(&self.path, text)?;
        Ok(())
    }
}

impl HighScoreStore for JsonFileStore {
    fn read_high_score(&self) -> u32 {
        match self.load() {
            Ok(score) => score,
            Err(PersistenceError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No high score at {}", self.path.display());
                0
            }
            Err(e) => {
                warn!("Error loading high score: {}", e);
                0
            }
        }
    }

    fn write_high_score(&mut self, score: u32) {
        match self.save(score) {
            Ok(()) => info!("Saved high score {} to {}", score, self.path.display()),
            Err(e) => error!("Error saving high score: {}", e),
        }
    }
}

/// Keeps the high score in memory for the lifetime of the process.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemoryStore {
    pub high_score: u32,
    pub writes: usize,
}

impl MemoryStore {
    pub fn with_high_score(high_score: u32) -> Self {
        MemoryStore {
            high_score,
            writes: 0,
        }
    }
}

impl HighScoreStore for MemoryStore {
    fn read_high_score(&self) -> u32 {
        self.high_score
    }

    fn write_high_score(&mut self, score: u32) {
        self.high_score = score;
        self.writes += 1;
    }
}

impl<S: HighScoreStore + ?Sized> HighScoreStore for &mut S {
    fn read_high_score(&self) -> u32 {
        (**self).read_high_score()
    }

    fn write_high_score(&mut self, score: u32) {
        (**self).write_high_score(score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::process;

    fn temp_path(name: &str) -> PathBuf {
        env::temp_dir().join(format!("qsnek-{}-{}.json", name, process::id()))
    }

    #[test]
    fn test_missing_file_reads_zero() {
        let store = JsonFileStore::new(temp_path("missing"));
        let _ = fs::remove_file(store.path());

        assert!(matches!(store.load(), Err(PersistenceError::Io(_))));
        assert_eq!(store.read_high_score(), 0);
    }

    #[test]
    fn test_corrupt_file_reads_zero() {
        let path = temp_path("corrupt");
        fs::write(&path, "not json at all").unwrap();
        let store = JsonFileStore::new(&path);

        assert!(matches!(store.load(), Err(PersistenceError::Corrupt(_))));
        assert_eq!(store.read_high_score(), 0);
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_field_reads_zero() {
        let path = temp_path("nofield");
        fs::write(&path, "{}").unwrap();
        let store = JsonFileStore::new(&path);

        assert_eq!(store.read_high_score(), 0);
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_then_read() {
        let path = temp_path("roundtrip");
        let mut store = JsonFileStore::new(&path);

        store.write_high_score(420);
        assert_eq!(store.read_high_score(), 420);
        assert_eq!(fs::read_to_string(&path).unwrap(), r#"{"high_score":420}"#);
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_unwritable_path_is_a_no_op() {
        let mut store = JsonFileStore::new(env::temp_dir().join("qsnek-no-such-dir/score.json"));
        store.write_high_score(10);
        assert_eq!(store.read_high_score(), 0);
    }

    #[test]
    fn test_memory_store_counts_writes() {
        let mut store = MemoryStore::with_high_score(30);
        assert_eq!(store.read_high_score(), 30);

        store.write_high_score(40);
        assert_eq!(store.read_high_score(), 40);
        assert_eq!(store.writes, 1);
    }
}
