//! In-memory record source.
//!
//! Backs local fixtures (`--seed`) and tests. Supports per-level failure
//! injection and counts every read so callers can assert that none happened.

use super::{RecordSource, Row};
use crate::error::StoreError;
use crate::level::{value_to_id, Level};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::warn;

pub struct MemoryRecordSource {
    tables: RwLock<HashMap<Level, Vec<Row>>>,
    failing: RwLock<HashSet<Level>>,
    reads: AtomicUsize,
}

impl MemoryRecordSource {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
            failing: RwLock::new(HashSet::new()),
            reads: AtomicUsize::new(0),
        }
    }

    /// Build from a seed document: `{ "sites": [...], "datacenters": [...], ... }`.
    ///
    /// Keys may be table names or level names. Unknown keys are skipped with a warning.
    pub fn from_seed_str(seed: &str) -> Result<Self, StoreError> {
        let document: Value = serde_json::from_str(seed)?;
        let tables = document.as_object().ok_or_else(|| {
            StoreError::InvalidRow("seed document must be a JSON object".to_string())
        })?;

        let source = Self::new();
        for (key, rows) in tables {
            let level = match key.parse::<Level>() {
                Ok(level) => level,
                Err(e) => {
                    warn!(key = %key, "Skipping seed table: {}", e);
                    continue;
                }
            };
            let rows = rows.as_array().ok_or_else(|| {
                StoreError::InvalidRow(format!("seed table '{}' must be an array", key))
            })?;
            for row in rows {
                source.insert(level, row.clone())?;
            }
        }
        Ok(source)
    }

    pub fn from_seed_file(path: &Path) -> Result<Self, StoreError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_seed_str(&content)
    }

    /// Insert a row, replacing any existing row of the same level and id.
    pub fn insert(&self, level: Level, row: Value) -> Result<(), StoreError> {
        let row = match row {
            Value::Object(row) => row,
            other => {
                return Err(StoreError::InvalidRow(format!(
                    "{} row must be an object, got {}",
                    level, other
                )))
            }
        };
        let id = row.get("id").and_then(value_to_id).ok_or_else(|| {
            StoreError::InvalidRow(format!("{} row is missing an id", level))
        })?;

        let mut tables = self.tables.write();
        let rows = tables.entry(level).or_default();
        rows.retain(|existing| existing.get("id").and_then(value_to_id).as_ref() != Some(&id));
        rows.push(row);
        Ok(())
    }

    /// Remove a row; returns whether it existed.
    pub fn remove(&self, level: Level, id: &str) -> bool {
        let mut tables = self.tables.write();
        match tables.get_mut(&level) {
            Some(rows) => {
                let before = rows.len();
                rows.retain(|row| row.get("id").and_then(value_to_id).as_deref() != Some(id));
                rows.len() != before
            }
            None => false,
        }
    }

    /// Make every read against `level` fail until restored.
    pub fn fail_level(&self, level: Level) {
        self.failing.write().insert(level);
    }

    pub fn restore_level(&self, level: Level) {
        self.failing.write().remove(&level);
    }

    /// Number of reads issued so far, including failed ones.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn len(&self, level: Level) -> usize {
        self.tables.read().get(&level).map(Vec::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.tables.read().values().all(Vec::is_empty)
    }

    fn begin_read(&self, level: Level) -> Result<(), StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.failing.read().contains(&level) {
            return Err(StoreError::Unavailable(format!(
                "{} table is not reachable",
                level.default_table()
            )));
        }
        Ok(())
    }

    fn select<F>(&self, level: Level, predicate: F) -> Vec<Row>
    where
        F: Fn(&Row) -> bool,
    {
        let tables = self.tables.read();
        let mut rows: Vec<(String, Row)> = tables
            .get(&level)
            .map(|rows| {
                rows.iter()
                    .filter(|row| predicate(row))
                    .map(|row| (sort_name(level, row), row.clone()))
                    .collect()
            })
            .unwrap_or_default();
        rows.sort_by(|a, b| a.0.cmp(&b.0));
        rows.into_iter().map(|(_, row)| row).collect()
    }
}

impl Default for MemoryRecordSource {
    fn default() -> Self {
        Self::new()
    }
}

fn sort_name(level: Level, row: &Row) -> String {
    level
        .node_from_row(row)
        .map(|node| node.name)
        .unwrap_or_default()
}

#[async_trait]
impl RecordSource for MemoryRecordSource {
    async fn list_children(
        &self,
        level: Level,
        parent_field: &str,
        parent_id: &str,
    ) -> Result<Vec<Row>, StoreError> {
        self.begin_read(level)?;
        Ok(self.select(level, |row| {
            row.get(parent_field).and_then(value_to_id).as_deref() == Some(parent_id)
        }))
    }

    async fn list_all(&self, level: Level) -> Result<Vec<Row>, StoreError> {
        self.begin_read(level)?;
        Ok(self.select(level, |_| true))
    }

    async fn get_by_id(&self, level: Level, id: &str) -> Result<Option<Row>, StoreError> {
        self.begin_read(level)?;
        let tables = self.tables.read();
        Ok(tables.get(&level).and_then(|rows| {
            rows.iter()
                .find(|row| row.get("id").and_then(value_to_id).as_deref() == Some(id))
                .cloned()
        }))
    }

    async fn search_by_name(
        &self,
        level: Level,
        pattern: &str,
        limit: usize,
    ) -> Result<Vec<Row>, StoreError> {
        self.begin_read(level)?;
        let needle = pattern.to_lowercase();
        let mut rows = self.select(level, |row| {
            sort_name(level, row).to_lowercase().contains(&needle)
        });
        rows.truncate(limit);
        Ok(rows)
    }
}
