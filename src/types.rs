//! Core types shared across the navigation engine.

/// RecordId: Opaque identifier of a backing-store record.
///
/// Ids are assumed globally unique across all six levels, so a bare id is
/// enough to key the expanded-node set.
pub type RecordId = String;
