//! SQLite layout store with in-memory cache.

use std::path::Path;

use async_sqlite::Client;
use async_sqlite::ClientBuilder;
use async_sqlite::JournalMode;
use async_sqlite::rusqlite;
use async_trait::async_trait;
use dashmap::DashMap;

use super::LayoutStore;
use super::decode;
use super::encode;
use crate::column::LayoutSnapshot;
use crate::error::StoreError;

/// SQLite-backed layout storage with DashMap cache.
///
/// Layouts are bincode-encoded into a single `column_layouts` table.
///
/// # Example
///
/// ```ignore
/// use pms_grid_lib::store::SqliteLayoutStore;
///
/// let store = SqliteLayoutStore::open("layouts.db").await?;
/// ```
pub struct SqliteLayoutStore {
    client: Client,
    cache: DashMap<String, LayoutSnapshot>,
}

impl SqliteLayoutStore {
    /// Opens (or creates) a store at the given path.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let client = ClientBuilder::new()
            .path(path)
            .journal_mode(JournalMode::Wal)
            .open()
            .await?;
        Self::init_schema(&client).await?;
        Ok(Self {
            client,
            cache: DashMap::new(),
        })
    }

    /// Opens an in-memory store. Data is lost when the store is dropped.
    pub async fn open_in_memory() -> Result<Self, StoreError> {
        let client = ClientBuilder::new().path(":memory:").open().await?;
        Self::init_schema(&client).await?;
        Ok(Self {
            client,
            cache: DashMap::new(),
        })
    }

    async fn init_schema(client: &Client) -> Result<(), StoreError> {
        client
            .conn(|conn| {
                conn.execute(
                    "CREATE TABLE IF NOT EXISTS column_layouts (
                        key TEXT PRIMARY KEY,
                        value BLOB NOT NULL
                    )",
                    [],
                )
            })
            .await?;
        Ok(())
    }
}

#[async_trait]
impl LayoutStore for SqliteLayoutStore {
    async fn load_layout(&self, key: &str) -> Result<Option<LayoutSnapshot>, StoreError> {
        if let Some(layout) = self.cache.get(key) {
            return Ok(Some(layout.clone()));
        }

        let key_owned = key.to_string();
        let bytes = self
            .client
            .conn(move |conn| {
                let mut stmt = conn.prepare("SELECT value FROM column_layouts WHERE key = ?")?;
                let mut rows = stmt.query([&key_owned])?;
                match rows.next()? {
                    Some(row) => Ok(Some(row.get::<_, Vec<u8>>(0)?)),
                    None => Ok(None),
                }
            })
            .await?;

        match bytes {
            Some(bytes) => {
                let layout = decode(&bytes)?;
                self.cache.insert(key.to_string(), layout.clone());
                Ok(Some(layout))
            }
            None => Ok(None),
        }
    }

    async fn save_layout(&self, key: &str, layout: &LayoutSnapshot) -> Result<(), StoreError> {
        let bytes = encode(layout)?;
        let key_owned = key.to_string();

        self.client
            .conn(move |conn| {
                conn.execute(
                    "INSERT INTO column_layouts (key, value) VALUES (?, ?)
                     ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                    rusqlite::params![&key_owned, &bytes],
                )
            })
            .await?;

        self.cache.insert(key.to_string(), layout.clone());
        Ok(())
    }

    async fn delete_layout(&self, key: &str) -> Result<(), StoreError> {
        let key_owned = key.to_string();

        self.client
            .conn(move |conn| {
                conn.execute("DELETE FROM column_layouts WHERE key = ?", [&key_owned])
            })
            .await?;

        self.cache.remove(key);
        Ok(())
    }
}
