//! Pluggable persistence for column layouts.
//!
//! The controller holds no process-wide state; a host that wants column
//! visibility and order to survive a reload hands it a [`LayoutStore`] and a
//! storage key.

mod memory;
mod sqlite;

pub use memory::*;
pub use sqlite::*;

use async_trait::async_trait;

use crate::column::LayoutSnapshot;
use crate::error::StoreError;

/// Backend trait for column layout storage.
#[async_trait]
pub trait LayoutStore: Send + Sync {
    /// Loads the layout saved under `key`, if any.
    async fn load_layout(&self, key: &str) -> Result<Option<LayoutSnapshot>, StoreError>;

    /// Saves the layout under `key`, replacing any previous one.
    async fn save_layout(&self, key: &str, layout: &LayoutSnapshot) -> Result<(), StoreError>;

    /// Deletes the layout saved under `key`.
    async fn delete_layout(&self, key: &str) -> Result<(), StoreError>;
}

pub(crate) fn encode(layout: &LayoutSnapshot) -> Result<Vec<u8>, StoreError> {
    bincode::serialize(layout).map_err(StoreError::Serialization)
}

pub(crate) fn decode(bytes: &[u8]) -> Result<LayoutSnapshot, StoreError> {
    bincode::deserialize(bytes).map_err(StoreError::Deserialization)
}
