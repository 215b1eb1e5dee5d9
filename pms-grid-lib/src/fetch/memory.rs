//! In-memory adapter for client-side tables.

use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;

use super::FetchParams;
use super::Page;
use super::PageFetcher;
use crate::error::FetchError;
use crate::filter::apply_filter;
use crate::model::TableRow;
use crate::pagination::derive_page;
use crate::sort::apply_sort;

/// Serves pages from an in-memory row set.
///
/// Filtering, sorting, and slicing happen locally with the same engines a
/// server would mirror, so client-side tables use the exact same controller
/// as server-backed ones.
///
/// # Example
///
/// ```
/// use pms_grid_lib::fetch::MemoryFetcher;
/// use pms_grid_lib::model::Record;
///
/// let fetcher = MemoryFetcher::new(vec![Record::new().set("id", 1).set("name", "Gate 2")])
///     .searchable(["name"]);
/// ```
#[derive(Debug)]
pub struct MemoryFetcher<R> {
    rows: RwLock<Vec<R>>,
    searchable: Vec<String>,
    latency: Option<Duration>,
}

impl<R: TableRow> MemoryFetcher<R> {
    /// Creates an adapter over `rows`.
    pub fn new(rows: Vec<R>) -> Self {
        Self {
            rows: RwLock::new(rows),
            searchable: Vec::new(),
            latency: None,
        }
    }

    /// Sets the fields the free-text query searches.
    ///
    /// When unset, the fields in [`FetchParams::searchable`] are used.
    pub fn searchable<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.searchable = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Delays every response, to exercise loading states.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Replaces the backing rows (e.g. after a create or delete).
    pub fn set_rows(&self, rows: Vec<R>) {
        *self.rows.write().unwrap_or_else(PoisonError::into_inner) = rows;
    }

    /// Number of backing rows before filtering.
    pub fn len(&self) -> usize {
        self.rows.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns `true` if there are no backing rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Filters, sorts, and slices synchronously.
    pub fn page(&self, params: &FetchParams) -> Page<R> {
        let rows = self.rows.read().unwrap_or_else(PoisonError::into_inner).clone();
        let searchable = if self.searchable.is_empty() {
            &params.searchable
        } else {
            &self.searchable
        };
        let mut matched = apply_filter(&rows, &params.query, &params.filters, searchable);
        if let Some(sort) = &params.sort {
            apply_sort(&mut matched, sort);
        }
        let total_count = matched.len();
        let slice = derive_page(&matched, params.page, params.per_page);
        Page::new(slice.rows, total_count)
    }
}

#[async_trait]
impl<R: TableRow> PageFetcher<R> for MemoryFetcher<R> {
    async fn fetch_page(&self, params: &FetchParams) -> Result<Page<R>, FetchError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        Ok(self.page(params))
    }
}
