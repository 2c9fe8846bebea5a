//! Active-Scope Filter
//!
//! When a single site is pinned, the root listing of the tree becomes that one
//! site. Ancestor resolution and search ignore the scope.

use crate::error::ApiError;
use crate::level::Level;
use crate::node::HierarchyNode;
use parking_lot::RwLock;

#[derive(Default)]
pub struct ActiveScope {
    pinned: RwLock<Option<HierarchyNode>>,
}

impl ActiveScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin a site the caller already holds; only site-level nodes are accepted.
    pub fn pin(&self, site: HierarchyNode) -> Result<(), ApiError> {
        if site.level != Level::Site {
            return Err(ApiError::InvalidArgument(format!(
                "Only sites can be pinned as scope, got {} '{}'",
                site.level, site.name
            )));
        }
        tracing::info!(site_id = %site.id, site = %site.name, "Pinned active scope");
        *self.pinned.write() = Some(site);
        Ok(())
    }

    pub fn clear(&self) {
        *self.pinned.write() = None;
    }

    pub fn pinned(&self) -> Option<HierarchyNode> {
        self.pinned.read().clone()
    }
}
