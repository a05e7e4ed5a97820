//! Best-score and leaderboard persistence.
//!
//! Scores are kept as a small JSON object in the user's data directory.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use color_eyre::eyre::{Result, WrapErr};
use serde_json::{Map, Value};

use crate::constants::game::LEADERBOARD_SIZE;

pub trait ScoreStore {
    fn get(&self, key: &str) -> Result<Option<Value>>;
    fn set(&mut self, key: &str, value: Value) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join("scores.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let contents =
            fs::read_to_string(&self.path).wrap_err_with(|| format!("failed to read {:?}", self.path))?;
        if contents.trim().is_empty() {
            return Ok(Map::new());
        }
        serde_json::from_str(&contents).wrap_err_with(|| format!("failed to parse {:?}", self.path))
    }
}

impl ScoreStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.read()?.remove(key))
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        let mut values = self.read().unwrap_or_else(|e| {
            tracing::warn!("replacing unreadable scores: {e:#}");
            Map::new()
        });
        values.insert(key.to_string(), value);

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).wrap_err_with(|| format!("failed to create {parent:?}"))?;
        }
        // readers never see a partially written file
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(&values)?).wrap_err_with(|| format!("failed to write {tmp:?}"))?;
        fs::rename(&tmp, &self.path).wrap_err_with(|| format!("failed to replace {:?}", self.path))?;
        tracing::debug!("saved {key} to {:?}", self.path);
        Ok(())
    }
}

/// Keeps everything in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScoreStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

/// Reads a non-negative integer, treating anything unreadable as absent.
pub fn load_u32(store: &dyn ScoreStore, key: &str) -> u32 {
    match store.get(key) {
        Ok(Some(value)) => value.as_u64().map(|n| n.min(u32::MAX as u64) as u32).unwrap_or_else(|| {
            tracing::warn!("ignoring malformed {key}: {value}");
            0
        }),
        Ok(None) => 0,
        Err(e) => {
            tracing::warn!("failed to load {key}: {e:#}");
            0
        },
    }
}

pub fn load_scores(store: &dyn ScoreStore, key: &str) -> Vec<u32> {
    match store.get(key) {
        Ok(Some(value)) => serde_json::from_value(value).unwrap_or_else(|e| {
            tracing::warn!("ignoring malformed {key}: {e}");
            Vec::new()
        }),
        Ok(None) => Vec::new(),
        Err(e) => {
            tracing::warn!("failed to load {key}: {e:#}");
            Vec::new()
        },
    }
}

/// Top scores, highest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaderboard {
    entries: Vec<u32>,
    capacity: usize,
}

impl Leaderboard {
    pub fn new(capacity: usize) -> Self {
        Self { entries: Vec::with_capacity(capacity + 1), capacity }
    }

    pub fn from_scores(scores: Vec<u32>, capacity: usize) -> Self {
        let mut board = Self::new(capacity);
        for score in scores {
            board.push(score);
        }
        board
    }

    pub fn entries(&self) -> &[u32] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn best(&self) -> Option<u32> {
        self.entries.first().copied()
    }

    pub fn push(&mut self, score: u32) {
        let pos = self.entries.partition_point(|&entry| entry >= score);
        self.entries.insert(pos, score);
        self.entries.truncate(self.capacity);
    }
}

impl Default for Leaderboard {
    fn default() -> Self {
        Self::new(LEADERBOARD_SIZE)
    }
}
