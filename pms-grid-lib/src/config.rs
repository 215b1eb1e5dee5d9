//! Table configuration

use serde::Deserialize;
use serde::Serialize;

use crate::column::Column;
use crate::pagination::DEFAULT_PER_PAGE;
use crate::selection::SelectionScope;
use crate::sort::Sort;

/// Per-table settings a host page supplies at construction.
///
/// Page-specific behavior (page sizes, which fields search covers, whether
/// "select all" spans pages) lives here rather than in separate code paths.
///
/// # Example
///
/// ```
/// use pms_grid_lib::config::TableConfig;
/// use pms_grid_lib::selection::SelectionScope;
///
/// let config = TableConfig::default()
///     .with_per_page(25)
///     .with_searchable(["name", "unit"])
///     .with_selection_scope(SelectionScope::Accumulate)
///     .with_storage_key("visitors.columns");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Initial rows per page.
    ///
    /// Default: 10
    pub per_page: usize,

    /// Page sizes offered to the user.
    ///
    /// Default: `[10, 25, 50, 100]`
    pub per_page_options: Vec<usize>,

    /// Fields the free-text search covers.
    pub searchable: Vec<String>,

    /// Whether "select all" replaces or accumulates across pages.
    pub selection_scope: SelectionScope,

    /// Initial sort.
    pub sort: Option<Sort>,

    /// Key the column layout is persisted under, if any.
    pub storage_key: Option<String>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            per_page: DEFAULT_PER_PAGE,
            per_page_options: vec![10, 25, 50, 100],
            searchable: Vec::new(),
            selection_scope: SelectionScope::Page,
            sort: None,
            storage_key: None,
        }
    }
}

impl TableConfig {
    /// Creates a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the initial page size.
    pub fn with_per_page(mut self, per_page: usize) -> Self {
        self.per_page = per_page;
        self
    }

    /// Sets the page sizes offered to the user.
    pub fn with_per_page_options(mut self, options: impl Into<Vec<usize>>) -> Self {
        self.per_page_options = options.into();
        self
    }

    /// Sets the searchable fields.
    pub fn with_searchable<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.searchable = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the selection scope.
    pub fn with_selection_scope(mut self, scope: SelectionScope) -> Self {
        self.selection_scope = scope;
        self
    }

    /// Sets the initial sort.
    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Sets the layout storage key.
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = Some(key.into());
        self
    }
}

/// A complete table declaration: columns plus settings.
///
/// This is the shape hosts ship as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSpec {
    pub columns: Vec<Column>,
    #[serde(flatten)]
    pub config: TableConfig,
}
