//! Children Resolver
//!
//! One scoped read per call. The site level is the only one without a parent
//! filter, and the only one the active scope can narrow.

use super::nodes_from_rows;
use crate::level::Level;
use crate::node::HierarchyNode;
use crate::scope::ActiveScope;
use crate::source::RecordSource;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct ChildrenResolver {
    source: Arc<dyn RecordSource>,
    scope: Arc<ActiveScope>,
}

impl ChildrenResolver {
    pub fn new(source: Arc<dyn RecordSource>, scope: Arc<ActiveScope>) -> Self {
        Self { source, scope }
    }

    /// Direct children at `level` of `parent_id`, ordered by name.
    ///
    /// For `Level::Site` the parent is ignored and the pinned scope, if any, is
    /// returned alone without a read. For other levels a missing parent yields
    /// an empty list. Read failures are logged and yield an empty list.
    pub async fn fetch_children(
        &self,
        parent_id: Option<&str>,
        level: Level,
    ) -> Vec<HierarchyNode> {
        let parent_field = match level.parent_field() {
            None => return self.fetch_roots().await,
            Some(field) => field,
        };

        let parent_id = match parent_id {
            Some(id) if !id.is_empty() => id,
            _ => {
                debug!(%level, "Children requested without a parent id");
                return Vec::new();
            }
        };

        match self
            .source
            .list_children(level, parent_field, parent_id)
            .await
        {
            Ok(rows) => {
                let nodes = nodes_from_rows(level, rows);
                debug!(%level, parent_id, count = nodes.len(), "Fetched children");
                nodes
            }
            Err(e) => {
                warn!(%level, parent_id, error = %e, "Children fetch failed, showing none");
                Vec::new()
            }
        }
    }

    async fn fetch_roots(&self) -> Vec<HierarchyNode> {
        if let Some(site) = self.scope.pinned() {
            debug!(site_id = %site.id, "Root listing narrowed to pinned scope");
            return vec![site];
        }

        match self.source.list_all(Level::Site).await {
            Ok(rows) => nodes_from_rows(Level::Site, rows),
            Err(e) => {
                warn!(error = %e, "Site listing failed, showing none");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::scenario_source;
    use crate::source::MemoryRecordSource;

    fn resolver() -> (Arc<MemoryRecordSource>, Arc<ActiveScope>, ChildrenResolver) {
        let source = Arc::new(scenario_source());
        let scope = Arc::new(ActiveScope::new());
        let resolver = ChildrenResolver::new(source.clone(), scope.clone());
        (source, scope, resolver)
    }

    #[tokio::test]
    async fn test_sites_listed_by_name() {
        let (_, _, resolver) = resolver();
        let sites = resolver.fetch_children(None, Level::Site).await;
        let names: Vec<_> = sites.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["Branch", "HQ"]);
    }

    #[tokio::test]
    async fn test_children_match_parent_and_order() {
        let (_, _, resolver) = resolver();
        let dcs = resolver.fetch_children(Some("S1"), Level::Datacenter).await;
        let names: Vec<_> = dcs.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["DC-0", "DC-A"]);
        assert!(dcs.iter().all(|n| n.parent_id.as_deref() == Some("S1")));
        assert!(dcs.iter().all(|n| n.level == Level::Datacenter));
    }

    #[tokio::test]
    async fn test_missing_parent_is_empty_without_read() {
        let (source, _, resolver) = resolver();
        for level in Level::ALL.into_iter().skip(1) {
            assert!(resolver.fetch_children(None, level).await.is_empty());
        }
        assert_eq!(source.read_count(), 0);
    }

    #[tokio::test]
    async fn test_read_failure_degrades_to_empty() {
        let (source, _, resolver) = resolver();
        source.fail_level(Level::Cluster);
        assert!(resolver.fetch_children(Some("D1"), Level::Cluster).await.is_empty());
        source.fail_level(Level::Site);
        assert!(resolver.fetch_children(None, Level::Site).await.is_empty());
    }

    #[tokio::test]
    async fn test_pinned_scope_replaces_root_listing() {
        let (source, scope, resolver) = resolver();
        let hq = resolver
            .fetch_children(None, Level::Site)
            .await
            .into_iter()
            .find(|n| n.id == "S1")
            .unwrap();
        scope.pin(hq).unwrap();
        let reads = source.read_count();

        let roots = resolver.fetch_children(None, Level::Site).await;
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].name, "HQ");
        assert_eq!(source.read_count(), reads);

        // Deeper levels are untouched by the scope
        let dcs = resolver.fetch_children(Some("S2"), Level::Datacenter).await;
        assert_eq!(dcs.len(), 1);
    }
}
