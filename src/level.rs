//! Level Registry
//!
//! Static description of the six-level containment chain
//! (site > datacenter > cluster > node > domain > vm). Every other component
//! goes through this table instead of branching on level names itself.

use crate::node::HierarchyNode;
use crate::source::Row;
use crate::types::RecordId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Hierarchy level. Declaration order is containment order, root first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Site,
    Datacenter,
    Cluster,
    Node,
    Domain,
    Vm,
}

impl Level {
    /// All levels, root first.
    pub const ALL: [Level; 6] = [
        Level::Site,
        Level::Datacenter,
        Level::Cluster,
        Level::Node,
        Level::Domain,
        Level::Vm,
    ];

    /// Parent level, `None` for the root.
    pub fn parent(self) -> Option<Level> {
        match self {
            Level::Site => None,
            Level::Datacenter => Some(Level::Site),
            Level::Cluster => Some(Level::Datacenter),
            Level::Node => Some(Level::Cluster),
            Level::Domain => Some(Level::Node),
            Level::Vm => Some(Level::Domain),
        }
    }

    /// Child level, `None` for the leaf.
    pub fn child(self) -> Option<Level> {
        match self {
            Level::Site => Some(Level::Datacenter),
            Level::Datacenter => Some(Level::Cluster),
            Level::Cluster => Some(Level::Node),
            Level::Node => Some(Level::Domain),
            Level::Domain => Some(Level::Vm),
            Level::Vm => None,
        }
    }

    /// Column other records use to reference a record of this level.
    pub fn reference_field(self) -> &'static str {
        match self {
            Level::Site => "site_id",
            Level::Datacenter => "datacenter_id",
            Level::Cluster => "cluster_id",
            Level::Node => "node_id",
            Level::Domain => "domain_id",
            Level::Vm => "vm_id",
        }
    }

    /// Field on this level's own record holding the parent's id.
    pub fn parent_field(self) -> Option<&'static str> {
        self.parent().map(Level::reference_field)
    }

    /// Distance from the root (site = 0).
    pub fn depth(self) -> usize {
        match self {
            Level::Site => 0,
            Level::Datacenter => 1,
            Level::Cluster => 2,
            Level::Node => 3,
            Level::Domain => 4,
            Level::Vm => 5,
        }
    }

    /// Backing table read for this level unless configuration renames it.
    pub fn default_table(self) -> &'static str {
        match self {
            Level::Site => "sites",
            Level::Datacenter => "datacenters",
            Level::Cluster => "clusters",
            Level::Node => "nodes",
            Level::Domain => "domains",
            Level::Vm => "vms",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Level::Site => "site",
            Level::Datacenter => "datacenter",
            Level::Cluster => "cluster",
            Level::Node => "node",
            Level::Domain => "domain",
            Level::Vm => "vm",
        }
    }

    /// Field read as display name when `name` is absent.
    fn fallback_name_field(self) -> Option<&'static str> {
        match self {
            Level::Node | Level::Vm => Some("hostname"),
            Level::Domain => Some("fqdn"),
            Level::Site | Level::Datacenter | Level::Cluster => None,
        }
    }

    /// Map a raw row of this level's record source into a `HierarchyNode`.
    ///
    /// Returns `None` when the row carries no usable `id`.
    pub fn node_from_row(self, row: &Row) -> Option<HierarchyNode> {
        let id = row.get("id").and_then(value_to_id)?;

        let mut consumed: Vec<&str> = vec!["id", "name", "path", "child_count"];
        let name = match row.get("name").and_then(Value::as_str) {
            Some(name) => name.to_string(),
            None => {
                let fallback = self.fallback_name_field();
                if let Some(field) = fallback {
                    consumed.push(field);
                }
                fallback
                    .and_then(|field| row.get(field))
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| id.clone())
            }
        };

        let parent_id = match self.parent_field() {
            Some(field) => {
                consumed.push(field);
                row.get(field).and_then(value_to_id)
            }
            None => None,
        };

        let auxiliary_path = row
            .get("path")
            .and_then(Value::as_str)
            .filter(|p| !p.is_empty())
            .map(str::to_string);
        let child_count = row.get("child_count").and_then(Value::as_u64);

        let metadata: BTreeMap<String, String> = row
            .iter()
            .filter(|(key, _)| !consumed.contains(&key.as_str()))
            .filter_map(|(key, value)| scalar_to_string(value).map(|v| (key.clone(), v)))
            .collect();

        Some(HierarchyNode {
            id,
            name,
            level: self,
            parent_id,
            auxiliary_path,
            metadata,
            child_count,
        })
    }
}

/// Ids arrive as strings or numbers depending on the table's key type.
pub(crate) fn value_to_id(value: &Value) -> Option<RecordId> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = String;

    /// Accepts level names ("vm") as well as default table names ("vms").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Level::ALL
            .into_iter()
            .find(|level| level.as_str() == needle || level.default_table() == needle)
            .ok_or_else(|| {
                format!(
                    "Unknown level '{}' (expected one of: site, datacenter, cluster, node, domain, vm)",
                    s
                )
            })
    }
}
