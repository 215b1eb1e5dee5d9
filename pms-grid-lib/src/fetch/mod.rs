//! The page fetch contract and its adapters.
//!
//! The controller never talks to a data source directly. It hands a
//! [`FetchParams`] to a [`PageFetcher`] and receives a [`Page`] back, so the
//! same controller drives a REST endpoint ([`HttpFetcher`]) or an in-memory
//! array ([`MemoryFetcher`]).

mod http;
mod memory;
mod token;

pub use http::*;
pub use memory::*;
pub use token::*;

use async_trait::async_trait;

use crate::error::FetchError;
use crate::filter::FilterState;
use crate::sort::Sort;

/// Everything an adapter needs to produce one page.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchParams {
    /// 1-based page number.
    pub page: usize,
    /// Rows per page.
    pub per_page: usize,
    /// Free-text query; empty means none.
    pub query: String,
    /// Field-level filters.
    pub filters: FilterState,
    /// Requested ordering, if any.
    pub sort: Option<Sort>,
    /// Fields the free-text query covers, from the table's configuration.
    ///
    /// Server adapters leave this to the endpoint.
    pub searchable: Vec<String>,
}

impl FetchParams {
    /// First page with no query, filters, or sort.
    pub fn new(per_page: usize) -> Self {
        Self {
            page: 1,
            per_page,
            query: String::new(),
            filters: FilterState::new(),
            sort: None,
            searchable: Vec::new(),
        }
    }
}

/// One page of rows plus the total row count across all pages.
///
/// # Example
///
/// ```
/// use pms_grid_lib::fetch::Page;
///
/// let page = Page::new(vec!["a", "b"], 12);
/// assert_eq!(page.len(), 2);
/// assert_eq!(page.total_count(), 12);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Page<R> {
    rows: Vec<R>,
    total_count: usize,
}

impl<R> Page<R> {
    /// Creates a page.
    pub fn new(rows: Vec<R>, total_count: usize) -> Self {
        Self { rows, total_count }
    }

    /// Returns a reference to the rows in this page.
    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    /// Consumes the page and returns the rows.
    pub fn into_rows(self) -> Vec<R> {
        self.rows
    }

    /// Returns the total row count across all pages.
    pub fn total_count(&self) -> usize {
        self.total_count
    }

    /// Returns `true` if this page has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the number of rows in this page.
    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// Turns paging, filter, and sort parameters into a page of rows.
///
/// Implementations only fetch; they never touch controller state. A failed
/// fetch returns an error and the controller keeps what it had.
#[async_trait]
pub trait PageFetcher<R>: Send + Sync {
    /// Fetches one page.
    async fn fetch_page(&self, params: &FetchParams) -> Result<Page<R>, FetchError>;
}
