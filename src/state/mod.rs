//! Selection & Expansion State
//!
//! What the user has selected per level, which tree rows are open, and the
//! breadcrumb path of the last navigation. Selection and expanded set are
//! persisted independently through a `StatePersistence` port; the breadcrumb
//! is session-only.

pub mod persistence;

pub use persistence::{MemoryStatePersistence, SledStatePersistence, StatePersistence};

use crate::level::Level;
use crate::node::HierarchyNode;
use crate::types::RecordId;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Persistence key of the selection blob.
pub const SELECTION_KEY: &str = "infranav.selection";

/// Persistence key of the expanded-set blob.
pub const EXPANDED_KEY: &str = "infranav.expanded";

/// One optional selected id per level. Need not form a contiguous chain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchySelection {
    #[serde(default)]
    pub site_id: Option<RecordId>,
    #[serde(default)]
    pub datacenter_id: Option<RecordId>,
    #[serde(default)]
    pub cluster_id: Option<RecordId>,
    #[serde(default)]
    pub node_id: Option<RecordId>,
    #[serde(default)]
    pub domain_id: Option<RecordId>,
    #[serde(default)]
    pub vm_id: Option<RecordId>,
}

impl HierarchySelection {
    pub fn get(&self, level: Level) -> Option<&str> {
        match level {
            Level::Site => self.site_id.as_deref(),
            Level::Datacenter => self.datacenter_id.as_deref(),
            Level::Cluster => self.cluster_id.as_deref(),
            Level::Node => self.node_id.as_deref(),
            Level::Domain => self.domain_id.as_deref(),
            Level::Vm => self.vm_id.as_deref(),
        }
    }

    fn slot_mut(&mut self, level: Level) -> &mut Option<RecordId> {
        match level {
            Level::Site => &mut self.site_id,
            Level::Datacenter => &mut self.datacenter_id,
            Level::Cluster => &mut self.cluster_id,
            Level::Node => &mut self.node_id,
            Level::Domain => &mut self.domain_id,
            Level::Vm => &mut self.vm_id,
        }
    }

    /// Copy with `level` set to `id`.
    pub fn with(mut self, level: Level, id: impl Into<RecordId>) -> Self {
        *self.slot_mut(level) = Some(id.into());
        self
    }

    /// Selection naming every node of a resolved path and nothing deeper.
    pub fn from_path(path: &[HierarchyNode]) -> Self {
        path.iter()
            .fold(Self::default(), |selection, node| {
                selection.with(node.level, node.id.clone())
            })
    }

    pub fn is_empty(&self) -> bool {
        Level::ALL.iter().all(|level| self.get(*level).is_none())
    }

    /// Deepest level with a selection.
    pub fn deepest(&self) -> Option<(Level, &str)> {
        Level::ALL
            .iter()
            .rev()
            .find_map(|level| self.get(*level).map(|id| (*level, id)))
    }
}

/// Ids of open tree rows. Level-agnostic; ids are globally unique.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpandedNodeSet(BTreeSet<RecordId>);

impl ExpandedNodeSet {
    pub fn contains(&self, id: &str) -> bool {
        self.0.contains(id)
    }

    /// Flip membership; returns whether `id` is now expanded.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.0.remove(id) {
            false
        } else {
            self.0.insert(id.to_string());
            true
        }
    }

    pub fn insert(&mut self, id: &str) -> bool {
        self.0.insert(id.to_string())
    }

    pub fn remove(&mut self, id: &str) -> bool {
        self.0.remove(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RecordId> {
        self.0.iter()
    }
}

impl<S: Into<RecordId>> Extend<S> for ExpandedNodeSet {
    fn extend<T: IntoIterator<Item = S>>(&mut self, iter: T) {
        self.0.extend(iter.into_iter().map(Into::into));
    }
}

/// In-memory navigation state mirrored to durable storage on every change.
///
/// Construct one per application (or per test) and share it by reference.
pub struct NavigationState {
    persistence: Arc<dyn StatePersistence>,
    selection: RwLock<HierarchySelection>,
    expanded: RwLock<ExpandedNodeSet>,
    current_path: RwLock<Vec<HierarchyNode>>,
}

impl NavigationState {
    /// Load both blobs once. Missing or corrupt blobs start from defaults.
    pub fn load(persistence: Arc<dyn StatePersistence>) -> Self {
        let selection: HierarchySelection = load_or_default(persistence.as_ref(), SELECTION_KEY);
        let expanded: ExpandedNodeSet = load_or_default(persistence.as_ref(), EXPANDED_KEY);
        debug!(
            expanded = expanded.len(),
            has_selection = !selection.is_empty(),
            "Loaded navigation state"
        );

        Self {
            persistence,
            selection: RwLock::new(selection),
            expanded: RwLock::new(expanded),
            current_path: RwLock::new(Vec::new()),
        }
    }

    pub fn selection(&self) -> HierarchySelection {
        self.selection.read().clone()
    }

    pub fn expanded(&self) -> ExpandedNodeSet {
        self.expanded.read().clone()
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.read().contains(id)
    }

    pub fn current_path(&self) -> Vec<HierarchyNode> {
        self.current_path.read().clone()
    }

    /// Replace the selection wholesale and persist it.
    pub fn set_selection(&self, selection: HierarchySelection) {
        let mut guard = self.selection.write();
        *guard = selection;
        self.persist(SELECTION_KEY, &*guard);
    }

    /// Flip one row; returns whether it is now expanded.
    pub fn toggle_node(&self, id: &str) -> bool {
        let mut guard = self.expanded.write();
        let expanded = guard.toggle(id);
        self.persist(EXPANDED_KEY, &*guard);
        expanded
    }

    /// Open every node of `path` plus `id` in a single update.
    pub fn expand_to_node(&self, id: &str, path: &[HierarchyNode]) {
        let mut guard = self.expanded.write();
        let before = guard.len();
        guard.extend(path.iter().map(|node| node.id.clone()));
        guard.insert(id);
        if guard.len() != before {
            self.persist(EXPANDED_KEY, &*guard);
        }
    }

    /// Open a single row; no-op if already open.
    pub fn expand_node(&self, id: &str) {
        let mut guard = self.expanded.write();
        if guard.insert(id) {
            self.persist(EXPANDED_KEY, &*guard);
        }
    }

    /// Close a single row; no-op if already closed.
    pub fn collapse_node(&self, id: &str) {
        let mut guard = self.expanded.write();
        if guard.remove(id) {
            self.persist(EXPANDED_KEY, &*guard);
        }
    }

    /// Close every row.
    pub fn collapse_all(&self) {
        let mut guard = self.expanded.write();
        *guard = ExpandedNodeSet::default();
        self.persist(EXPANDED_KEY, &*guard);
    }

    /// Replace the breadcrumb path.
    pub fn set_current_path(&self, path: Vec<HierarchyNode>) {
        *self.current_path.write() = path;
    }

    /// Write failures are logged; in-memory state stays authoritative.
    fn persist<T: Serialize>(&self, key: &str, value: &T) {
        let bytes = match serde_json::to_vec(value) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(key, error = %e, "Failed to serialize navigation state");
                return;
            }
        };
        if let Err(e) = self.persistence.store(key, &bytes) {
            warn!(key, error = %e, "Failed to persist navigation state");
        }
    }
}

fn load_or_default<T: DeserializeOwned + Default>(persistence: &dyn StatePersistence, key: &str) -> T {
    let bytes = match persistence.load(key) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return T::default(),
        Err(e) => {
            warn!(key, error = %e, "Failed to read persisted navigation state, starting empty");
            return T::default();
        }
    };
    match serde_json::from_slice(&bytes) {
        Ok(value) => value,
        Err(e) => {
            warn!(key, error = %e, "Persisted navigation state is corrupt, starting empty");
            T::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    fn node(id: &str, level: Level) -> HierarchyNode {
        HierarchyNode {
            id: id.to_string(),
            name: id.to_string(),
            level,
            parent_id: None,
            auxiliary_path: None,
            metadata: BTreeMap::new(),
            child_count: None,
        }
    }

    fn fresh() -> (Arc<MemoryStatePersistence>, NavigationState) {
        let persistence = Arc::new(MemoryStatePersistence::new());
        let state = NavigationState::load(persistence.clone());
        (persistence, state)
    }

    #[test]
    fn test_selection_survives_reload() {
        let (persistence, state) = fresh();
        let selection = HierarchySelection::default()
            .with(Level::Site, "S1")
            .with(Level::Cluster, "C1");
        state.set_selection(selection.clone());

        let reloaded = NavigationState::load(persistence);
        assert_eq!(reloaded.selection(), selection);
        assert!(reloaded.current_path().is_empty());
    }

    #[test]
    fn test_toggle_flips_and_persists() {
        let (persistence, state) = fresh();
        assert!(state.toggle_node("C1"));
        assert!(state.is_expanded("C1"));
        assert!(NavigationState::load(persistence.clone()).is_expanded("C1"));
        assert!(!state.toggle_node("C1"));
        assert!(!NavigationState::load(persistence).is_expanded("C1"));
    }

    #[test]
    fn test_expand_to_node_opens_whole_chain() {
        let (_, state) = fresh();
        let path = vec![node("S1", Level::Site), node("D1", Level::Datacenter)];
        state.expand_to_node("C1", &path);
        let expanded: Vec<_> = state.expanded().iter().cloned().collect();
        assert_eq!(expanded, vec!["C1", "D1", "S1"]);
    }

    #[test]
    fn test_corrupt_blobs_fall_back_to_defaults() {
        let persistence = Arc::new(MemoryStatePersistence::new());
        persistence.store(SELECTION_KEY, b"{not json").unwrap();
        persistence.store(EXPANDED_KEY, br#"{"unexpected": "shape"}"#).unwrap();
        let state = NavigationState::load(persistence);
        assert!(state.selection().is_empty());
        assert!(state.expanded().is_empty());
    }

    struct BrokenPersistence;

    impl StatePersistence for BrokenPersistence {
        fn load(&self, _key: &str) -> Result<Option<Vec<u8>>, StoreError> {
            Err(StoreError::Unavailable("disk gone".to_string()))
        }

        fn store(&self, _key: &str, _value: &[u8]) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("disk gone".to_string()))
        }
    }

    #[test]
    fn test_unreadable_store_still_works_in_memory() {
        let state = NavigationState::load(Arc::new(BrokenPersistence));
        assert!(state.selection().is_empty());
        state.set_selection(HierarchySelection::default().with(Level::Vm, "VM1"));
        assert_eq!(state.selection().get(Level::Vm), Some("VM1"));
        assert!(state.toggle_node("S1"));
    }

    #[test]
    fn test_selection_from_path_and_deepest() {
        let path = vec![
            node("S1", Level::Site),
            node("D1", Level::Datacenter),
            node("C1", Level::Cluster),
        ];
        let selection = HierarchySelection::from_path(&path);
        assert_eq!(selection.get(Level::Datacenter), Some("D1"));
        assert_eq!(selection.get(Level::Node), None);
        assert_eq!(selection.deepest(), Some((Level::Cluster, "C1")));
    }

    #[test]
    fn test_selection_serializes_camel_case() {
        let selection = HierarchySelection::default().with(Level::Datacenter, "D1");
        let json = serde_json::to_value(&selection).unwrap();
        assert_eq!(json["datacenterId"], "D1");
    }

    #[test]
    fn test_collapse_all_persists() {
        let (persistence, state) = fresh();
        state.expand_node("S1");
        state.expand_node("D1");
        state.collapse_node("D1");
        assert_eq!(state.expanded().len(), 1);
        state.collapse_all();
        assert!(NavigationState::load(persistence).expanded().is_empty());
    }

    proptest! {
        #[test]
        fn prop_expand_to_node_is_idempotent(
            ids in proptest::collection::vec("[a-z0-9]{1,6}", 0..6),
            leaf in "[a-z0-9]{1,6}",
            preexisting in proptest::collection::vec("[a-z0-9]{1,6}", 0..4),
        ) {
            let (_, state) = fresh();
            for id in &preexisting {
                state.expand_node(id);
            }
            let path: Vec<_> = ids
                .iter()
                .zip(Level::ALL)
                .map(|(id, level)| node(id, level))
                .collect();

            state.expand_to_node(&leaf, &path);
            let once = state.expanded();
            state.expand_to_node(&leaf, &path);
            prop_assert_eq!(state.expanded(), once.clone());
            prop_assert!(once.contains(&leaf));
            for node in &path {
                prop_assert!(once.contains(&node.id));
            }
        }
    }
}
