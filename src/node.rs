//! Read models produced by the resolvers.

use crate::level::Level;
use crate::types::RecordId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One record of the hierarchy, in level-agnostic shape.
///
/// `parent_id` is `None` only for sites once the chain is intact; the engine
/// does not enforce that, the backing store does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyNode {
    pub id: RecordId,
    pub name: String,
    pub level: Level,
    pub parent_id: Option<RecordId>,
    /// Precomputed materialized path (ancestor ids, root first, `/`-separated)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auxiliary_path: Option<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_count: Option<u64>,
}

impl HierarchyNode {
    pub fn is_root(&self) -> bool {
        self.level == Level::Site
    }

    /// Best-known id of this node's ancestor at `level`.
    ///
    /// Looks at the direct parent reference, then at a denormalized
    /// `<level>_id` column kept in metadata, then at the materialized path.
    /// Only strictly higher levels are answered.
    pub fn ancestor_hint(&self, level: Level) -> Option<RecordId> {
        if level >= self.level {
            return None;
        }
        if self.level.parent() == Some(level) {
            if let Some(parent_id) = &self.parent_id {
                return Some(parent_id.clone());
            }
        }
        if let Some(id) = self.metadata.get(level.reference_field()) {
            if !id.is_empty() {
                return Some(id.clone());
            }
        }
        self.auxiliary_path.as_deref().and_then(|path| {
            path.split('/')
                .filter(|segment| !segment.is_empty())
                .nth(level.depth())
                .map(str::to_string)
        })
    }
}

/// A type-tagged hit from cross-level search. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(flatten)]
    pub node: HierarchyNode,
}

impl SearchResult {
    pub fn level(&self) -> Level {
        self.node.level
    }

    pub fn id(&self) -> &str {
        &self.node.id
    }

    pub fn name(&self) -> &str {
        &self.node.name
    }

    pub fn parent_id(&self) -> Option<&str> {
        self.node.parent_id.as_deref()
    }
}

impl From<HierarchyNode> for SearchResult {
    fn from(node: HierarchyNode) -> Self {
        Self { node }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cluster() -> HierarchyNode {
        HierarchyNode {
            id: "C1".to_string(),
            name: "C1".to_string(),
            level: Level::Cluster,
            parent_id: Some("D1".to_string()),
            auxiliary_path: None,
            metadata: BTreeMap::new(),
            child_count: None,
        }
    }

    #[test]
    fn test_ancestor_hint_prefers_parent_reference() {
        let node = cluster();
        assert_eq!(node.ancestor_hint(Level::Datacenter).as_deref(), Some("D1"));
        assert_eq!(node.ancestor_hint(Level::Site), None);
        assert_eq!(node.ancestor_hint(Level::Cluster), None);
        assert_eq!(node.ancestor_hint(Level::Vm), None);
    }

    #[test]
    fn test_ancestor_hint_from_metadata_and_path() {
        let mut node = cluster();
        node.metadata.insert("site_id".to_string(), "S1".to_string());
        assert_eq!(node.ancestor_hint(Level::Site).as_deref(), Some("S1"));

        let mut node = cluster();
        node.parent_id = None;
        node.auxiliary_path = Some("/S9/D9/C1".to_string());
        assert_eq!(node.ancestor_hint(Level::Site).as_deref(), Some("S9"));
        assert_eq!(node.ancestor_hint(Level::Datacenter).as_deref(), Some("D9"));
    }
}
