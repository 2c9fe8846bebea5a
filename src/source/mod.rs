//! Record Source
//!
//! The narrow read contract the engine needs from the backing store: one
//! record source per level, each able to list by parent, read by id, and run a
//! capped case-insensitive name search. Rows stay open JSON objects here; the
//! Level Registry turns them into typed nodes.

pub mod memory;
pub mod rest;

use crate::error::StoreError;
use crate::level::Level;
use async_trait::async_trait;

pub use memory::MemoryRecordSource;
pub use rest::RestRecordSource;

/// Drop characters that are filter syntax for a backend name search
/// (`*`/`%` wildcards, `,()` list syntax). Callers filter on the same text.
pub fn clean_search_pattern(pattern: &str) -> String {
    pattern
        .chars()
        .filter(|c| !matches!(c, '*' | '%' | ',' | '(' | ')'))
        .collect()
}

/// Raw row as returned by the backing store.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Read-only port onto the six backing tables.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Rows of `level` whose `parent_field` equals `parent_id`, ordered by name ascending.
    async fn list_children(
        &self,
        level: Level,
        parent_field: &str,
        parent_id: &str,
    ) -> Result<Vec<Row>, StoreError>;

    /// Every row of `level`, ordered by name ascending.
    async fn list_all(&self, level: Level) -> Result<Vec<Row>, StoreError>;

    /// Single row of `level` by id.
    async fn get_by_id(&self, level: Level, id: &str) -> Result<Option<Row>, StoreError>;

    /// Rows of `level` whose name contains `pattern` case-insensitively, at most `limit`.
    async fn search_by_name(
        &self,
        level: Level,
        pattern: &str,
        limit: usize,
    ) -> Result<Vec<Row>, StoreError>;
}
