//! Shared test fixtures.

use crate::error::StoreError;
use crate::level::Level;
use crate::source::{MemoryRecordSource, RecordSource, Row};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::Notify;

/// HQ > DC-A > C1 > N1 > corp.local > WEB01, plus a few siblings.
///
/// Rows below the datacenter carry the tenant `site_id` column.
pub(crate) fn scenario_source() -> MemoryRecordSource {
    let source = MemoryRecordSource::new();
    let rows = [
        (Level::Site, json!({ "id": "S1", "name": "HQ", "code": "hq" })),
        (Level::Site, json!({ "id": "S2", "name": "Branch" })),
        (Level::Datacenter, json!({ "id": "D1", "name": "DC-A", "site_id": "S1" })),
        (Level::Datacenter, json!({ "id": "D0", "name": "DC-0", "site_id": "S1" })),
        (Level::Datacenter, json!({ "id": "D9", "name": "DC-Z", "site_id": "S2" })),
        (
            Level::Cluster,
            json!({ "id": "C1", "name": "C1", "datacenter_id": "D1", "site_id": "S1" }),
        ),
        (
            Level::Node,
            json!({ "id": "N1", "name": "N1", "cluster_id": "C1", "site_id": "S1" }),
        ),
        (
            Level::Domain,
            json!({ "id": "DOM1", "name": "corp.local", "node_id": "N1", "site_id": "S1" }),
        ),
        (
            Level::Vm,
            json!({
                "id": "VM1",
                "name": "WEB01",
                "domain_id": "DOM1",
                "site_id": "S1",
                "status": "running"
            }),
        ),
        (
            Level::Vm,
            json!({ "id": "VM2", "name": "DB01", "domain_id": "DOM1", "site_id": "S1" }),
        ),
    ];
    for (level, row) in rows {
        source
            .insert(level, row)
            .expect("fixture rows are well formed");
    }
    source
}

/// Holds selected reads until the gate is notified.
///
/// `get_by_id` of `gated_id`, `list_children` under `gated_id` and
/// `search_by_name` at `gated_search` wait; everything else passes through.
pub(crate) struct GatedSource {
    pub(crate) inner: MemoryRecordSource,
    pub(crate) gated_id: Option<String>,
    pub(crate) gated_search: Option<Level>,
    pub(crate) gate: Arc<Notify>,
}

impl GatedSource {
    pub(crate) fn on_id(inner: MemoryRecordSource, id: &str, gate: Arc<Notify>) -> Self {
        Self {
            inner,
            gated_id: Some(id.to_string()),
            gated_search: None,
            gate,
        }
    }

    pub(crate) fn on_search(inner: MemoryRecordSource, level: Level, gate: Arc<Notify>) -> Self {
        Self {
            inner,
            gated_id: None,
            gated_search: Some(level),
            gate,
        }
    }

    fn holds_id(&self, id: &str) -> bool {
        self.gated_id.as_deref() == Some(id)
    }
}

#[async_trait]
impl RecordSource for GatedSource {
    async fn list_children(
        &self,
        level: Level,
        parent_field: &str,
        parent_id: &str,
    ) -> Result<Vec<Row>, StoreError> {
        if self.holds_id(parent_id) {
            self.gate.notified().await;
        }
        self.inner.list_children(level, parent_field, parent_id).await
    }

    async fn list_all(&self, level: Level) -> Result<Vec<Row>, StoreError> {
        self.inner.list_all(level).await
    }

    async fn get_by_id(&self, level: Level, id: &str) -> Result<Option<Row>, StoreError> {
        if self.holds_id(id) {
            self.gate.notified().await;
        }
        self.inner.get_by_id(level, id).await
    }

    async fn search_by_name(
        &self,
        level: Level,
        pattern: &str,
        limit: usize,
    ) -> Result<Vec<Row>, StoreError> {
        if self.gated_search == Some(level) {
            self.gate.notified().await;
        }
        self.inner.search_by_name(level, pattern, limit).await
    }
}
