//! Ancestor Resolver
//!
//! Walks from a node up to its site with one single-record read per level.
//! Each read's id comes from the previous record, so the walk is strictly
//! sequential.
//!
//! The result is always a root-first prefix of the node's full path. When the
//! chain breaks (missing record, missing parent reference, failed read) the
//! segment read so far no longer reaches the root and is dropped; the walk
//! then resumes from the nearest level above the break for which one of the
//! records already read carries a denormalized reference (`site_id` column or
//! materialized path). Every level is read at most once.

use crate::level::Level;
use crate::node::HierarchyNode;
use crate::source::RecordSource;
use crate::types::RecordId;
use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;
use tracing::{debug, warn};

pub struct AncestorResolver {
    source: Arc<dyn RecordSource>,
}

/// Why an upward walk stopped before the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Break {
    /// The record at this level could not be read.
    Unresolved(Level),
}

impl AncestorResolver {
    pub fn new(source: Arc<dyn RecordSource>) -> Self {
        Self { source }
    }

    /// Root-first path ending at (`id`, `level`) when the chain is intact,
    /// otherwise the longest root-first prefix that could be resolved.
    pub async fn fetch_path_to_node(&self, id: &str, level: Level) -> Vec<HierarchyNode> {
        let mut hints: BTreeMap<Level, RecordId> = BTreeMap::new();
        let mut start = Some((id.to_string(), level));

        while let Some((start_id, start_level)) = start.take() {
            let (segment, outcome) = self.walk_up(&start_id, start_level, &mut hints).await;
            let broken_at = match outcome {
                None => {
                    debug!(id = %id, %level, depth = segment.len(), "Resolved ancestor path");
                    return segment.into();
                }
                Some(Break::Unresolved(broken_at)) => broken_at,
            };

            debug!(
                id = %id,
                %level,
                %broken_at,
                orphaned = segment.len(),
                "Ancestor chain broken"
            );

            // Resume from the nearest level above the break that is referenced
            start = std::iter::successors(broken_at.parent(), |l| l.parent())
                .find_map(|above| hints.get(&above).map(|hint| (hint.clone(), above)));
        }

        Vec::new()
    }

    /// Sequential upward walk. Returns the segment read (root-first) and the
    /// break, if the walk did not reach a site.
    async fn walk_up(
        &self,
        id: &str,
        level: Level,
        hints: &mut BTreeMap<Level, RecordId>,
    ) -> (VecDeque<HierarchyNode>, Option<Break>) {
        let mut segment: VecDeque<HierarchyNode> = VecDeque::with_capacity(level.depth() + 1);
        let mut current = (id.to_string(), level);

        loop {
            let (current_id, current_level) = current;
            let row = match self.source.get_by_id(current_level, &current_id).await {
                Ok(Some(row)) => row,
                Ok(None) => {
                    debug!(id = %current_id, level = %current_level, "Ancestor record missing");
                    return (segment, Some(Break::Unresolved(current_level)));
                }
                Err(e) => {
                    warn!(
                        id = %current_id,
                        level = %current_level,
                        error = %e,
                        "Ancestor read failed"
                    );
                    return (segment, Some(Break::Unresolved(current_level)));
                }
            };

            let node = match current_level.node_from_row(&row) {
                Some(node) => node,
                None => {
                    warn!(id = %current_id, level = %current_level, "Ancestor row has no id");
                    return (segment, Some(Break::Unresolved(current_level)));
                }
            };

            for above in std::iter::successors(current_level.parent(), |l| l.parent()) {
                if let Some(hint) = node.ancestor_hint(above) {
                    hints.entry(above).or_insert(hint);
                }
            }

            let parent_id = node.parent_id.clone();
            segment.push_front(node);

            let parent_level = match current_level.parent() {
                Some(parent_level) => parent_level,
                None => return (segment, None),
            };
            match parent_id {
                Some(parent_id) => current = (parent_id, parent_level),
                None => {
                    debug!(
                        id = %current_id,
                        level = %current_level,
                        "Record has no parent reference"
                    );
                    return (segment, Some(Break::Unresolved(parent_level)));
                }
            }
        }
    }
}
