//! Infranav: Hierarchical Resource Navigation
//!
//! Browsing, ancestor resolution and cross-level search over a fixed six-level
//! IT-asset hierarchy (site > datacenter > cluster > node > domain > vm) read
//! from a relational backend, with selection and expansion state that
//! survives restarts.

pub mod config;
pub mod error;
pub mod level;
pub mod logging;
pub mod navigator;
pub mod node;
pub mod resolver;
pub mod scope;
pub mod search;
pub mod source;
pub mod state;
pub mod tooling;
pub mod types;

#[cfg(test)]
pub(crate) mod fixtures;

pub use error::{ApiError, StoreError};
pub use level::Level;
pub use navigator::{NavigationOutcome, Navigator, RowState};
pub use node::{HierarchyNode, SearchResult};
