//! Table controller.
//!
//! Ties filter, pagination, selection, and column layout state to a
//! [`PageFetcher`], and applies fetched pages with last-request-wins
//! ordering.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::{debug, trace, warn};

use crate::column::{Column, ColumnLayout};
use crate::config::{TableConfig, TableSpec};
use crate::error::{ColumnError, Error, FetchError, FieldValidationError};
use crate::fetch::{FetchParams, Page, PageFetcher, RequestToken, RequestTracker};
use crate::filter::{FilterState, FilterValue};
use crate::model::TableRow;
use crate::pagination::{Pagination, total_pages};
use crate::selection::{HeaderCheckbox, Selection, SelectionScope};
use crate::sort::Sort;
use crate::store::LayoutStore;

/// Caller-supplied constraint on a filter field.
pub type FilterValidator =
    Arc<dyn Fn(&FilterValue) -> Result<(), FieldValidationError> + Send + Sync>;

/// What happened to a fetch the controller issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The response was current and is now displayed.
    Applied(RequestToken),
    /// A newer request was issued before this one resolved; the response
    /// was discarded.
    Stale(RequestToken),
    /// Nothing changed, so no request was issued.
    Skipped,
}

impl FetchOutcome {
    /// Returns `true` if a response was applied.
    pub fn is_applied(&self) -> bool {
        matches!(self, FetchOutcome::Applied(_))
    }
}

/// Everything a host needs to render a table.
#[derive(Debug, Clone)]
pub struct TableView<R: TableRow> {
    /// Rows on the current page.
    pub rows: Vec<R>,
    /// Visible columns in display order.
    pub visible_columns: Vec<Column>,
    /// 1-based page the rows belong to.
    pub current_page: usize,
    pub per_page: usize,
    pub per_page_options: Vec<usize>,
    pub total_count: usize,
    pub total_pages: usize,
    /// Selected row IDs, sorted.
    pub selected_ids: Vec<R::Id>,
    pub header_checkbox: HeaderCheckbox,
    pub query: String,
    pub filters: FilterState,
    pub sort: Option<Sort>,
    /// A request is in flight.
    pub loading: bool,
    /// Message of the last failed fetch, cleared by the next success.
    pub last_error: Option<String>,
}

/// Internal state for the controller.
struct ControllerInner<R: TableRow> {
    config: TableConfig,
    layout: ColumnLayout,
    /// Rows of the last applied page.
    rows: Vec<R>,
    /// Position of the rows currently shown.
    pagination: Pagination,
    /// Parameters of the rows currently shown.
    applied: FetchParams,
    /// Parameters of the latest request; reverts to `applied` on failure.
    requested: FetchParams,
    selection: Selection<R::Id>,
    validators: HashMap<String, FilterValidator>,
    loading: bool,
    last_error: Option<String>,
}

impl<R: TableRow> ControllerInner<R> {
    fn visible_ids(&self) -> Vec<R::Id> {
        self.rows.iter().map(TableRow::id).collect()
    }
}

/// Result of handing a response back to the controller.
enum Completion {
    Done(FetchOutcome),
    /// The server's total put the requested page out of range; fetch the
    /// clamped page instead.
    Reclamped,
}

/// List/table state for one table-bearing page.
///
/// `TableController<R>` owns:
/// - Free-text query, field filters, and sort
/// - Pagination (current page, page size, total count)
/// - Selection for bulk actions
/// - Column visibility and order, optionally persisted
///
/// Every operation that changes the data window issues exactly one fetch.
/// Responses are applied only if no newer request was issued in the
/// meantime. A failed fetch leaves rows, selection, and pagination as they
/// were and is returned to the caller.
///
/// The controller is cheap to clone; clones share state, so a host may hand
/// them to spawned tasks.
///
/// # Example
///
/// ```ignore
/// let controller = TableController::new(columns, TableConfig::default(), fetcher)?;
/// controller.load().await?;
/// controller.set_query("bob").await?;
/// controller.go_to_page(2).await?;
/// let view = controller.snapshot();
/// ```
pub struct TableController<R: TableRow> {
    inner: Arc<RwLock<ControllerInner<R>>>,
    fetcher: Arc<dyn PageFetcher<R>>,
    layout_store: Option<Arc<dyn LayoutStore>>,
    requests: Arc<RequestTracker>,
    /// Dirty flag for re-render.
    dirty: Arc<AtomicBool>,
}

impl<R: TableRow> TableController<R> {
    /// Creates a controller on page 1 with no rows loaded.
    ///
    /// Fails if two columns share a key.
    ///
    /// # Panics
    ///
    /// Panics if `config.per_page` is zero.
    pub fn new(
        columns: Vec<Column>,
        config: TableConfig,
        fetcher: impl PageFetcher<R> + 'static,
    ) -> Result<Self, Error> {
        Self::with_shared_fetcher(columns, config, Arc::new(fetcher))
    }

    /// Creates a controller from a JSON-shaped table declaration.
    pub fn from_spec(spec: TableSpec, fetcher: impl PageFetcher<R> + 'static) -> Result<Self, Error> {
        Self::new(spec.columns, spec.config, fetcher)
    }

    /// Creates a controller over a fetcher shared with other tables.
    pub fn with_shared_fetcher(
        columns: Vec<Column>,
        config: TableConfig,
        fetcher: Arc<dyn PageFetcher<R>>,
    ) -> Result<Self, Error> {
        let layout = ColumnLayout::new(columns)?;
        let pagination = Pagination::new(config.per_page);
        let mut params = FetchParams::new(config.per_page);
        params.sort = config.sort.clone();
        params.searchable = config.searchable.clone();
        let inner = ControllerInner {
            selection: Selection::with_scope(config.selection_scope),
            config,
            layout,
            rows: Vec::new(),
            pagination,
            applied: params.clone(),
            requested: params,
            validators: HashMap::new(),
            loading: false,
            last_error: None,
        };
        Ok(Self {
            inner: Arc::new(RwLock::new(inner)),
            fetcher,
            layout_store: None,
            requests: Arc::new(RequestTracker::new()),
            dirty: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Persists the column layout in `store` under the config's storage key.
    pub fn with_layout_store(self, store: impl LayoutStore + 'static) -> Self {
        self.with_shared_layout_store(Arc::new(store))
    }

    /// Persists the column layout in a store shared with other tables.
    pub fn with_shared_layout_store(mut self, store: Arc<dyn LayoutStore>) -> Self {
        self.layout_store = Some(store);
        self
    }

    /// Registers a constraint for values of a filter field.
    ///
    /// [`set_filter`](Self::set_filter) runs it before touching any state
    /// and returns its error unchanged.
    pub fn with_validator<F>(self, field: impl Into<String>, validator: F) -> Self
    where
        F: Fn(&FilterValue) -> Result<(), FieldValidationError> + Send + Sync + 'static,
    {
        self.state_mut()
            .validators
            .insert(field.into(), Arc::new(validator));
        self
    }

    fn state(&self) -> RwLockReadGuard<'_, ControllerInner<R>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn state_mut(&self) -> RwLockWriteGuard<'_, ControllerInner<R>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::SeqCst);
    }

    // -------------------------------------------------------------------------
    // Fetching
    // -------------------------------------------------------------------------

    /// Restores the persisted column layout, then fetches the first page.
    ///
    /// A layout that cannot be loaded is logged and the declared defaults
    /// are kept.
    pub async fn load(&self) -> Result<FetchOutcome, Error> {
        if let Err(e) = self.restore_layout().await {
            warn!("could not restore column layout: {}", e);
        }
        self.fetch().await
    }

    /// Re-fetches the current page with the current parameters.
    ///
    /// This is what a host's "Retry" action calls after a failure.
    pub async fn refresh(&self) -> Result<FetchOutcome, Error> {
        self.fetch().await
    }

    async fn fetch(&self) -> Result<FetchOutcome, Error> {
        loop {
            let (token, params) = {
                let mut guard = self.state_mut();
                guard.loading = true;
                (self.requests.issue(), guard.requested.clone())
            };
            self.mark_dirty();
            debug!(
                "fetch {} issued: page {} per_page {} query {:?} filters {} sort {:?}",
                token,
                params.page,
                params.per_page,
                params.query,
                params.filters.len(),
                params.sort
            );

            let result = self.fetcher.fetch_page(&params).await;

            match self.complete(token, params, result)? {
                Completion::Done(outcome) => return Ok(outcome),
                Completion::Reclamped => continue,
            }
        }
    }

    fn complete(
        &self,
        token: RequestToken,
        params: FetchParams,
        result: Result<Page<R>, FetchError>,
    ) -> Result<Completion, Error> {
        let mut guard = self.state_mut();
        if !self.requests.is_current(token) {
            debug!("fetch {} superseded, discarding response", token);
            return Ok(Completion::Done(FetchOutcome::Stale(token)));
        }
        guard.loading = false;
        self.mark_dirty();

        let page = match result {
            Ok(page) => page,
            Err(e) => {
                warn!("fetch {} failed: {}", token, e);
                guard.last_error = Some(e.to_string());
                guard.requested = guard.applied.clone();
                return Err(Error::Fetch(e));
            }
        };

        let pages = total_pages(page.total_count(), params.per_page);
        if params.page > pages {
            debug!(
                "fetch {}: page {} past last page {}, refetching",
                token, params.page, pages
            );
            guard.requested.page = pages;
            return Ok(Completion::Reclamped);
        }

        let pagination = Pagination::at(params.page, params.per_page, page.total_count());

        debug!(
            "fetch {} applied: {} rows, total {}",
            token,
            page.len(),
            page.total_count()
        );
        guard.rows = page.into_rows();
        guard.pagination = pagination;
        guard.applied = params;
        guard.last_error = None;

        if guard.selection.scope() == SelectionScope::Page {
            let visible = guard.visible_ids();
            let dropped = guard.selection.reconcile(&visible);
            if !dropped.is_empty() {
                trace!("dropped {} selected rows no longer visible", dropped.len());
            }
        }

        Ok(Completion::Done(FetchOutcome::Applied(token)))
    }

    // -------------------------------------------------------------------------
    // Pagination
    // -------------------------------------------------------------------------

    /// Moves to a page, clamped into `[1, total_pages]`.
    ///
    /// Requesting the page already shown (after clamping) issues no fetch.
    pub async fn go_to_page(&self, page: usize) -> Result<FetchOutcome, Error> {
        {
            let mut guard = self.state_mut();
            let pages = total_pages(guard.pagination.total_count(), guard.requested.per_page);
            let clamped = page.clamp(1, pages);
            if clamped == guard.requested.page {
                trace!("page {} requested, already on {}", page, clamped);
                return Ok(FetchOutcome::Skipped);
            }
            guard.requested.page = clamped;
        }
        self.fetch().await
    }

    /// Moves to the next page, if any.
    pub async fn next_page(&self) -> Result<FetchOutcome, Error> {
        let page = self.state().requested.page;
        self.go_to_page(page.saturating_add(1)).await
    }

    /// Moves to the previous page, if any.
    pub async fn previous_page(&self) -> Result<FetchOutcome, Error> {
        let page = self.state().requested.page;
        self.go_to_page(page.saturating_sub(1)).await
    }

    /// Changes the page size and returns to page 1.
    ///
    /// # Panics
    ///
    /// Panics if `per_page` is zero.
    pub async fn change_per_page(&self, per_page: usize) -> Result<FetchOutcome, Error> {
        assert!(per_page > 0, "per_page must be positive");
        {
            let mut guard = self.state_mut();
            if guard.requested.per_page == per_page && guard.requested.page == 1 {
                return Ok(FetchOutcome::Skipped);
            }
            guard.requested.per_page = per_page;
            guard.requested.page = 1;
        }
        self.fetch().await
    }

    // -------------------------------------------------------------------------
    // Search, filters, sort
    // -------------------------------------------------------------------------

    /// Sets the free-text query and returns to page 1.
    pub async fn set_query(&self, query: impl Into<String>) -> Result<FetchOutcome, Error> {
        let query = query.into();
        {
            let mut guard = self.state_mut();
            if guard.requested.query == query {
                return Ok(FetchOutcome::Skipped);
            }
            guard.requested.query = query;
            guard.requested.page = 1;
        }
        self.fetch().await
    }

    /// Sets a field filter and returns to page 1.
    ///
    /// A registered validator runs first; if it rejects the value, its
    /// error is returned and nothing changes. Blank values clear the field.
    pub async fn set_filter(
        &self,
        field: impl Into<String>,
        value: FilterValue,
    ) -> Result<FetchOutcome, Error> {
        let field = field.into();
        {
            let mut guard = self.state_mut();
            if let Some(validator) = guard.validators.get(&field)
                && !value.is_blank()
                && let Err(e) = validator(&value)
            {
                debug!("filter {} rejected: {}", field, e);
                return Err(Error::Validation(e));
            }
            if !guard.requested.filters.set(field, value) {
                return Ok(FetchOutcome::Skipped);
            }
            guard.requested.page = 1;
        }
        self.fetch().await
    }

    /// Removes a field filter and returns to page 1.
    pub async fn clear_filter(&self, field: &str) -> Result<FetchOutcome, Error> {
        {
            let mut guard = self.state_mut();
            if !guard.requested.filters.remove(field) {
                return Ok(FetchOutcome::Skipped);
            }
            guard.requested.page = 1;
        }
        self.fetch().await
    }

    /// Removes every field filter and returns to page 1.
    ///
    /// The free-text query is kept; clear it with `set_query("")`.
    pub async fn clear_filters(&self) -> Result<FetchOutcome, Error> {
        {
            let mut guard = self.state_mut();
            if !guard.requested.filters.clear() {
                return Ok(FetchOutcome::Skipped);
            }
            guard.requested.page = 1;
        }
        self.fetch().await
    }

    /// Sorts by a column, flipping direction if it is already the sort key.
    ///
    /// Returns to page 1. Fails for unknown or non-sortable columns.
    pub async fn sort_by(&self, key: &str) -> Result<FetchOutcome, Error> {
        {
            let mut guard = self.state_mut();
            let column = guard
                .layout
                .column(key)
                .ok_or_else(|| ColumnError::UnknownColumn(key.to_string()))?;
            if !column.sortable {
                return Err(ColumnError::NotSortable(key.to_string()).into());
            }
            let sort = Sort::toggled(guard.requested.sort.as_ref(), key);
            guard.requested.sort = Some(sort);
            guard.requested.page = 1;
        }
        self.fetch().await
    }

    // -------------------------------------------------------------------------
    // Selection
    // -------------------------------------------------------------------------

    /// Header checkbox: selects or deselects every visible row.
    ///
    /// Returns (added, removed) IDs.
    pub fn select_all(&self, checked: bool) -> (Vec<R::Id>, Vec<R::Id>) {
        let mut guard = self.state_mut();
        let visible = guard.visible_ids();
        let result = guard.selection.select_all(&visible, checked);
        if !result.0.is_empty() || !result.1.is_empty() {
            self.mark_dirty();
        }
        result
    }

    /// Row checkbox: selects or deselects one row.
    ///
    /// Only rows on the visible page can be selected; deselecting works for
    /// any ID. Returns `true` if the selection changed.
    pub fn select_one(&self, id: R::Id, checked: bool) -> bool {
        let mut guard = self.state_mut();
        if checked && !guard.rows.iter().any(|row| row.id() == id) {
            debug!("ignoring selection of row {:?} not on the visible page", id);
            return false;
        }
        let changed = guard.selection.select_one(id, checked);
        if changed {
            self.mark_dirty();
        }
        changed
    }

    /// Drops selected IDs that are not in `existing_ids`.
    ///
    /// Hosts using [`SelectionScope::Accumulate`] call this after a bulk
    /// delete or any change that removes rows from other pages.
    pub fn reconcile_selection(&self, existing_ids: &[R::Id]) -> Vec<R::Id> {
        let dropped = self.state_mut().selection.reconcile(existing_ids);
        if !dropped.is_empty() {
            self.mark_dirty();
        }
        dropped
    }

    /// Clears the selection (e.g. after a bulk action completes).
    pub fn clear_selection(&self) -> Vec<R::Id> {
        let cleared = self.state_mut().selection.clear();
        if !cleared.is_empty() {
            self.mark_dirty();
        }
        cleared
    }

    /// Selected IDs, sorted.
    pub fn selected_ids(&self) -> Vec<R::Id> {
        self.state().selection.selected()
    }

    /// Selected rows from the visible page.
    pub fn selected_rows(&self) -> Vec<R> {
        let guard = self.state();
        guard
            .rows
            .iter()
            .filter(|row| guard.selection.is_selected(&row.id()))
            .cloned()
            .collect()
    }

    /// Derived state of the header checkbox.
    pub fn header_checkbox(&self) -> HeaderCheckbox {
        let guard = self.state();
        guard.selection.header_state(&guard.visible_ids())
    }

    // -------------------------------------------------------------------------
    // Columns
    // -------------------------------------------------------------------------

    /// Shows or hides a column and persists the layout.
    ///
    /// Non-hideable columns reject the attempt with
    /// [`ColumnError::NotHideable`]. Returns `true` if visibility changed.
    pub async fn toggle_column(&self, key: &str, visible: bool) -> Result<bool, Error> {
        let changed = {
            let mut guard = self.state_mut();
            guard.layout.toggle(key, visible).inspect_err(|e| {
                warn!("toggle of column {} rejected: {}", key, e);
            })?
        };
        if changed {
            self.mark_dirty();
            self.save_layout().await?;
        }
        Ok(changed)
    }

    /// Drags a column to another column's position and persists the layout.
    ///
    /// Returns `true` if the order changed.
    pub async fn move_column(&self, from_key: &str, to_key: &str) -> Result<bool, Error> {
        let changed = {
            let mut guard = self.state_mut();
            guard.layout.move_column(from_key, to_key).inspect_err(|e| {
                warn!("move of column {} rejected: {}", from_key, e);
            })?
        };
        if changed {
            self.mark_dirty();
            self.save_layout().await?;
        }
        Ok(changed)
    }

    /// Loads the persisted layout, if a store and storage key are set.
    ///
    /// Returns `true` if a saved layout was applied.
    pub async fn restore_layout(&self) -> Result<bool, Error> {
        let Some((store, key)) = self.layout_target() else {
            return Ok(false);
        };
        let Some(snapshot) = store.load_layout(&key).await? else {
            return Ok(false);
        };
        self.state_mut().layout.restore(&snapshot);
        self.mark_dirty();
        debug!("restored column layout {}", key);
        Ok(true)
    }

    async fn save_layout(&self) -> Result<(), Error> {
        let Some((store, key)) = self.layout_target() else {
            return Ok(());
        };
        let snapshot = self.state().layout.snapshot();
        store.save_layout(&key, &snapshot).await?;
        trace!("saved column layout {}", key);
        Ok(())
    }

    fn layout_target(&self) -> Option<(Arc<dyn LayoutStore>, String)> {
        let store = self.layout_store.clone()?;
        let key = self.state().config.storage_key.clone()?;
        Some((store, key))
    }

    /// Visible columns in display order.
    pub fn visible_columns(&self) -> Vec<Column> {
        self.state().layout.visible_columns()
    }

    /// All declared columns in display order.
    pub fn columns(&self) -> Vec<Column> {
        self.state().layout.columns().to_vec()
    }

    // -------------------------------------------------------------------------
    // Read access
    // -------------------------------------------------------------------------

    /// Rows on the current page.
    pub fn rows(&self) -> Vec<R> {
        self.state().rows.clone()
    }

    /// The 1-based page the rows belong to.
    pub fn current_page(&self) -> usize {
        self.state().pagination.current_page()
    }

    /// Number of pages; never less than 1.
    pub fn total_pages(&self) -> usize {
        self.state().pagination.total_pages()
    }

    /// Total rows across all pages.
    pub fn total_count(&self) -> usize {
        self.state().pagination.total_count()
    }

    /// Rows per page.
    pub fn per_page(&self) -> usize {
        self.state().pagination.per_page()
    }

    /// Whether a request is in flight.
    pub fn is_loading(&self) -> bool {
        self.state().loading
    }

    /// Message of the last failed fetch.
    pub fn last_error(&self) -> Option<String> {
        self.state().last_error.clone()
    }

    /// Parameters of the latest request.
    pub fn params(&self) -> FetchParams {
        self.state().requested.clone()
    }

    /// Everything needed to render the table, read under one lock.
    pub fn snapshot(&self) -> TableView<R> {
        let guard = self.state();
        let visible = guard.visible_ids();
        TableView {
            rows: guard.rows.clone(),
            visible_columns: guard.layout.visible_columns(),
            current_page: guard.pagination.current_page(),
            per_page: guard.pagination.per_page(),
            per_page_options: guard.config.per_page_options.clone(),
            total_count: guard.pagination.total_count(),
            total_pages: guard.pagination.total_pages(),
            selected_ids: guard.selection.selected(),
            header_checkbox: guard.selection.header_state(&visible),
            query: guard.requested.query.clone(),
            filters: guard.requested.filters.clone(),
            sort: guard.requested.sort.clone(),
            loading: guard.loading,
            last_error: guard.last_error.clone(),
        }
    }

    // -------------------------------------------------------------------------
    // Dirty tracking
    // -------------------------------------------------------------------------

    /// Check if the table has changed since the last render.
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    /// Clear the dirty flag.
    pub fn clear_dirty(&self) {
        self.dirty.store(false, Ordering::SeqCst);
    }
}

impl<R: TableRow> Clone for TableController<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            fetcher: Arc::clone(&self.fetcher),
            layout_store: self.layout_store.clone(),
            requests: Arc::clone(&self.requests),
            dirty: Arc::clone(&self.dirty),
        }
    }
}

impl<R: TableRow> std::fmt::Debug for TableController<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let guard = self.state();
        f.debug_struct("TableController")
            .field("rows", &guard.rows.len())
            .field("pagination", &guard.pagination)
            .field("requested", &guard.requested)
            .field("selected", &guard.selection.len())
            .field("loading", &guard.loading)
            .finish()
    }
}
