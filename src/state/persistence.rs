//! Durable key/value port for navigation state, with a sled-backed
//! implementation and an in-memory one for tests.

use crate::error::StoreError;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::Path;

/// Stores opaque blobs under fixed keys, surviving process restarts.
pub trait StatePersistence: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;
    fn store(&self, key: &str, value: &[u8]) -> Result<(), StoreError>;
}

const STATE_TREE: &str = "navigation";

/// Sled-backed persistence; every write is flushed before returning.
pub struct SledStatePersistence {
    tree: sled::Tree,
}

impl SledStatePersistence {
    /// Open (creating if needed) the state database at `path`.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        std::fs::create_dir_all(path)?;
        let db = sled::open(path)?;
        Self::from_db(&db)
    }

    pub fn from_db(db: &sled::Db) -> Result<Self, StoreError> {
        let tree = db.open_tree(STATE_TREE)?;
        Ok(Self { tree })
    }
}

impl StatePersistence for SledStatePersistence {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.tree.get(key.as_bytes())?.map(|value| value.to_vec()))
    }

    fn store(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.tree.insert(key.as_bytes(), value)?;
        self.tree.flush()?;
        Ok(())
    }
}

/// Process-local persistence. Cloning the `Arc` around it and building a new
/// `NavigationState` simulates a reload.
#[derive(Default)]
pub struct MemoryStatePersistence {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStatePersistence {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StatePersistence for MemoryStatePersistence {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.blobs.read().get(key).cloned())
    }

    fn store(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.blobs.write().insert(key.to_string(), value.to_vec());
        Ok(())
    }
}
