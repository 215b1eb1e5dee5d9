//! In-memory layout store using DashMap

use async_trait::async_trait;
use dashmap::DashMap;

use super::LayoutStore;
use crate::column::LayoutSnapshot;
use crate::error::StoreError;

/// Keeps layouts for the lifetime of the process.
///
/// # Example
///
/// ```
/// use pms_grid_lib::store::MemoryLayoutStore;
///
/// let store = MemoryLayoutStore::new();
/// ```
#[derive(Debug, Default)]
pub struct MemoryLayoutStore {
    store: DashMap<String, LayoutSnapshot>,
}

impl MemoryLayoutStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            store: DashMap::new(),
        }
    }

    /// Returns the number of saved layouts.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns `true` if nothing is saved.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

#[async_trait]
impl LayoutStore for MemoryLayoutStore {
    async fn load_layout(&self, key: &str) -> Result<Option<LayoutSnapshot>, StoreError> {
        Ok(self.store.get(key).map(|entry| entry.value().clone()))
    }

    async fn save_layout(&self, key: &str, layout: &LayoutSnapshot) -> Result<(), StoreError> {
        self.store.insert(key.to_string(), layout.clone());
        Ok(())
    }

    async fn delete_layout(&self, key: &str) -> Result<(), StoreError> {
        self.store.remove(key);
        Ok(())
    }
}
