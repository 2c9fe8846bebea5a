//! Children and Ancestor resolvers.
//!
//! Both are pure reads against a `RecordSource`. Neither ever returns an
//! error: read failures are logged and degrade to fewer nodes.

pub mod ancestors;
pub mod children;

pub use ancestors::AncestorResolver;
pub use children::ChildrenResolver;

use crate::level::Level;
use crate::node::HierarchyNode;
use crate::source::Row;
use tracing::debug;

/// Map rows of one level, dropping (and logging) rows without an id.
pub(crate) fn nodes_from_rows(level: Level, rows: Vec<Row>) -> Vec<HierarchyNode> {
    rows.iter()
        .filter_map(|row| {
            let node = level.node_from_row(row);
            if node.is_none() {
                debug!(%level, "Dropping row without id");
            }
            node
        })
        .collect()
}
