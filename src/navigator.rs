//! Navigator
//!
//! Composes the resolvers, search, active scope and navigation state into the
//! object a tree UI talks to. Owns two things the individual parts do not:
//!
//! - a navigation generation counter, so an older in-flight ancestor walk
//!   cannot overwrite the selection of a newer navigation;
//! - in-flight row expansions, so a row reports `Expanding` until its
//!   children arrive. `Expanded` and `Collapsed` are read from the expanded
//!   set, which stays the single source of truth.

use crate::config::SearchConfig;
use crate::error::ApiError;
use crate::level::Level;
use crate::node::{HierarchyNode, SearchResult};
use crate::resolver::{AncestorResolver, ChildrenResolver};
use crate::scope::ActiveScope;
use crate::search::CrossLevelSearch;
use crate::source::RecordSource;
use crate::state::{HierarchySelection, NavigationState};
use crate::types::RecordId;
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Visual state of one tree row. A row is in exactly one state at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RowState {
    Collapsed,
    Expanding,
    Expanded,
}

/// Result of `Navigator::navigate_to`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// Path resolved and applied to the navigation state.
    Applied(Vec<HierarchyNode>),
    /// A newer navigation started while this one was resolving; nothing applied.
    Superseded,
}

pub struct Navigator {
    children: ChildrenResolver,
    ancestors: AncestorResolver,
    search: CrossLevelSearch,
    scope: Arc<ActiveScope>,
    state: Arc<NavigationState>,
    generation: AtomicU64,
    /// Rows with a children fetch in flight, and how many fetches
    expanding: RwLock<HashMap<RecordId, usize>>,
}

impl Navigator {
    pub fn new(
        source: Arc<dyn RecordSource>,
        state: Arc<NavigationState>,
        search_config: SearchConfig,
    ) -> Self {
        let scope = Arc::new(ActiveScope::new());
        Self {
            children: ChildrenResolver::new(source.clone(), scope.clone()),
            ancestors: AncestorResolver::new(source.clone()),
            search: CrossLevelSearch::new(source, search_config),
            scope,
            state,
            generation: AtomicU64::new(0),
            expanding: RwLock::new(HashMap::new()),
        }
    }

    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    pub fn scope(&self) -> &ActiveScope {
        &self.scope
    }

    pub fn search_engine(&self) -> &CrossLevelSearch {
        &self.search
    }

    /// Pin a site already known to the caller as the tree root.
    pub fn pin_scope(&self, site: HierarchyNode) -> Result<(), ApiError> {
        self.scope.pin(site)
    }

    pub async fn fetch_children(
        &self,
        parent_id: Option<&str>,
        level: Level,
    ) -> Vec<HierarchyNode> {
        self.children.fetch_children(parent_id, level).await
    }

    pub async fn fetch_path_to_node(&self, id: &str, level: Level) -> Vec<HierarchyNode> {
        self.ancestors.fetch_path_to_node(id, level).await
    }

    pub async fn search(&self, query: &str) -> Vec<SearchResult> {
        self.search.search(query).await
    }

    pub fn is_searching(&self) -> bool {
        self.search.is_searching()
    }

    /// Navigate to a node: resolve its ancestors, then replace breadcrumb and
    /// selection and open the tree down to it, unless a newer navigation has
    /// started in the meantime.
    ///
    /// An unresolvable node yields `Applied` with an empty path and clears the
    /// breadcrumb; selection and expansion are left as they were.
    pub async fn navigate_to(&self, id: &str, level: Level) -> NavigationOutcome {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let path = self.ancestors.fetch_path_to_node(id, level).await;

        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(id, %level, generation, "Navigation superseded, discarding path");
            return NavigationOutcome::Superseded;
        }

        if path.is_empty() {
            info!(id, %level, "Navigation target could not be resolved");
            self.state.set_current_path(Vec::new());
            return NavigationOutcome::Applied(path);
        }

        // The walk may stop short of the target; open and select only what was resolved
        let deepest = &path[path.len() - 1];
        let target_reached = deepest.id == id && deepest.level == level;
        let deepest_id = deepest.id.clone();

        self.state.set_selection(HierarchySelection::from_path(&path));
        self.state.expand_to_node(&deepest_id, &path);
        self.state.set_current_path(path.clone());
        info!(
            id,
            %level,
            depth = path.len(),
            complete = target_reached,
            "Navigated"
        );
        NavigationOutcome::Applied(path)
    }

    /// Navigate to a search hit.
    pub async fn open_search_result(&self, result: &SearchResult) -> NavigationOutcome {
        self.navigate_to(result.id(), result.level()).await
    }

    /// Current state of a row: `Expanding` while a fetch started by
    /// `expand_row` is in flight, otherwise whatever the expanded set says.
    pub fn row_state(&self, id: &str) -> RowState {
        if self.expanding.read().contains_key(id) {
            RowState::Expanding
        } else if self.state.is_expanded(id) {
            RowState::Expanded
        } else {
            RowState::Collapsed
        }
    }

    /// Expand the row (`id`, `level`) and return its children.
    ///
    /// The row is `Expanding` while the fetch is in flight. Duplicate requests
    /// each re-fetch; the expanded set is a union so it cannot be corrupted.
    /// If the row was collapsed while the fetch ran it stays collapsed. Leaf
    /// rows (VMs) have no children and are left untouched.
    pub async fn expand_row(&self, id: &str, level: Level) -> Vec<HierarchyNode> {
        let child_level = match level.child() {
            Some(child_level) => child_level,
            None => return Vec::new(),
        };

        *self.expanding.write().entry(id.to_string()).or_insert(0) += 1;
        let children = self.children.fetch_children(Some(id), child_level).await;

        let still_wanted = {
            let mut expanding = self.expanding.write();
            match expanding.get(id).copied() {
                Some(pending) if pending > 1 => {
                    expanding.insert(id.to_string(), pending - 1);
                    true
                }
                Some(_) => {
                    expanding.remove(id);
                    true
                }
                None => false,
            }
        };
        if still_wanted {
            self.state.expand_node(id);
        } else {
            debug!(id, "Row collapsed while expanding");
        }
        children
    }

    /// Collapse a row, abandoning any expansion still in flight for it.
    pub fn collapse_row(&self, id: &str) {
        self.expanding.write().remove(id);
        self.state.collapse_node(id);
    }

    /// Flip a row without fetching; returns whether it is now expanded.
    pub fn toggle_row(&self, id: &str) -> bool {
        self.expanding.write().remove(id);
        self.state.toggle_node(id)
    }

    /// Collapse every row, including rows still expanding.
    pub fn collapse_all(&self) {
        self.expanding.write().clear();
        self.state.collapse_all();
    }
}
