//! Page position, page size, and the visible slice.

use std::ops::Range;

/// Default page size used when none is configured.
pub const DEFAULT_PER_PAGE: usize = 10;

/// Pagination state for one table.
///
/// `current_page` is 1-based and always within `[1, total_pages]`.
/// `per_page` must be positive: a zero page size is a caller bug and panics.
///
/// # Example
///
/// ```
/// use pms_grid_lib::pagination::Pagination;
///
/// let mut pagination = Pagination::new(10);
/// pagination.set_total_count(23);
/// assert_eq!(pagination.total_pages(), 3);
/// assert_eq!(pagination.go_to_page(5), Some(3));
/// assert_eq!(pagination.go_to_page(9), None); // already on the last page
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    current_page: usize,
    per_page: usize,
    total_count: usize,
}

impl Pagination {
    /// Creates pagination on page 1 with no rows.
    ///
    /// # Panics
    ///
    /// Panics if `per_page` is zero.
    pub fn new(per_page: usize) -> Self {
        assert!(per_page > 0, "per_page must be positive");
        Self {
            current_page: 1,
            per_page,
            total_count: 0,
        }
    }

    /// Pagination positioned on `current_page`, clamped to the row count.
    ///
    /// # Panics
    ///
    /// Panics if `per_page` is zero.
    pub fn at(current_page: usize, per_page: usize, total_count: usize) -> Self {
        let mut pagination = Self::new(per_page);
        pagination.total_count = total_count;
        pagination.current_page = current_page.clamp(1, pagination.total_pages());
        pagination
    }

    /// The 1-based current page.
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Rows per page.
    pub fn per_page(&self) -> usize {
        self.per_page
    }

    /// Total rows across all pages.
    pub fn total_count(&self) -> usize {
        self.total_count
    }

    /// Number of pages; never less than 1.
    pub fn total_pages(&self) -> usize {
        total_pages(self.total_count, self.per_page)
    }

    /// Moves to a page, clamped into `[1, total_pages]`.
    ///
    /// Returns the new page, or `None` if the clamped page is the current
    /// one (in which case nothing needs to be fetched).
    pub fn go_to_page(&mut self, requested: usize) -> Option<usize> {
        let clamped = requested.clamp(1, self.total_pages());
        if clamped == self.current_page {
            return None;
        }
        self.current_page = clamped;
        Some(clamped)
    }

    /// Changes the page size and resets to page 1.
    ///
    /// Returns `true` if anything changed.
    ///
    /// # Panics
    ///
    /// Panics if `per_page` is zero.
    pub fn change_per_page(&mut self, per_page: usize) -> bool {
        assert!(per_page > 0, "per_page must be positive");
        let changed = per_page != self.per_page || self.current_page != 1;
        self.per_page = per_page;
        self.current_page = 1;
        changed
    }

    /// Resets to page 1. Returns `true` if the page changed.
    pub fn reset(&mut self) -> bool {
        let changed = self.current_page != 1;
        self.current_page = 1;
        changed
    }

    /// Records the total row count and re-clamps the current page.
    pub fn set_total_count(&mut self, total_count: usize) {
        self.total_count = total_count;
        self.current_page = self.current_page.clamp(1, self.total_pages());
    }

    /// Index range of the current page within the full row set.
    pub fn offset_range(&self) -> Range<usize> {
        page_range(self.current_page, self.per_page, self.total_count)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(DEFAULT_PER_PAGE)
    }
}

/// Number of pages for a row count: `max(1, ceil(total / per_page))`.
///
/// # Panics
///
/// Panics if `per_page` is zero.
pub fn total_pages(total_count: usize, per_page: usize) -> usize {
    assert!(per_page > 0, "per_page must be positive");
    total_count.div_ceil(per_page).max(1)
}

/// Index range of a 1-based page, clamped to the row count.
fn page_range(page: usize, per_page: usize, total_count: usize) -> Range<usize> {
    let start = (page.max(1) - 1).saturating_mul(per_page).min(total_count);
    let end = start.saturating_add(per_page).min(total_count);
    start..end
}

/// The visible rows of one page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSlice<R> {
    /// Rows on the page.
    pub rows: Vec<R>,
    /// The page actually shown after clamping.
    pub current_page: usize,
    /// Number of pages; never less than 1.
    pub total_pages: usize,
}

/// Slices a client-side row set down to one page.
///
/// `current_page` is clamped into `[1, total_pages]` before slicing.
///
/// # Panics
///
/// Panics if `per_page` is zero.
pub fn derive_page<R: Clone>(rows: &[R], current_page: usize, per_page: usize) -> PageSlice<R> {
    let total_pages = total_pages(rows.len(), per_page);
    let current_page = current_page.clamp(1, total_pages);
    let range = page_range(current_page, per_page, rows.len());
    PageSlice {
        rows: rows[range].to_vec(),
        current_page,
        total_pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_never_zero() {
        assert_eq!(total_pages(0, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(23, 10), 3);
    }

    #[test]
    fn test_twenty_three_rows_clamp_to_page_three() {
        let rows: Vec<u32> = (1..=23).collect();
        let slice = derive_page(&rows, 1, 10);
        assert_eq!(slice.total_pages, 3);

        let mut pagination = Pagination::new(10);
        pagination.set_total_count(rows.len());
        assert_eq!(pagination.go_to_page(5), Some(3));
        assert_eq!(pagination.current_page(), 3);

        let last = derive_page(&rows, pagination.current_page(), 10);
        assert_eq!(last.rows, vec![21, 22, 23]);
    }

    #[test]
    fn test_go_to_same_page_is_none() {
        let mut pagination = Pagination::new(10);
        pagination.set_total_count(50);
        assert_eq!(pagination.go_to_page(1), None);
        assert_eq!(pagination.go_to_page(0), None);
        assert_eq!(pagination.go_to_page(2), Some(2));
        assert_eq!(pagination.go_to_page(2), None);
    }

    #[test]
    fn test_change_per_page_resets_to_first_page() {
        let mut pagination = Pagination::new(10);
        pagination.set_total_count(100);
        pagination.go_to_page(7);
        assert!(pagination.change_per_page(25));
        assert_eq!(pagination.current_page(), 1);
        assert_eq!(pagination.total_pages(), 4);
    }

    #[test]
    fn test_shrinking_total_reclamps() {
        let mut pagination = Pagination::new(10);
        pagination.set_total_count(100);
        pagination.go_to_page(10);
        pagination.set_total_count(15);
        assert_eq!(pagination.current_page(), 2);
        assert_eq!(pagination.offset_range(), 10..15);
    }

    #[test]
    fn test_derive_page_clamps_out_of_range() {
        let rows: Vec<u32> = (1..=5).collect();
        let slice = derive_page(&rows, 99, 2);
        assert_eq!(slice.current_page, 3);
        assert_eq!(slice.rows, vec![5]);

        let empty: Vec<u32> = Vec::new();
        let slice = derive_page(&empty, 3, 10);
        assert_eq!(slice.current_page, 1);
        assert!(slice.rows.is_empty());
    }

    #[test]
    fn test_pagination_totality() {
        for n in 0..40usize {
            for per_page in 1..12usize {
                let rows: Vec<usize> = (0..n).collect();
                let pages = total_pages(n, per_page);
                let mut seen = Vec::new();
                let mut last_len = 0;
                for page in 1..=pages {
                    let slice = derive_page(&rows, page, per_page);
                    last_len = slice.rows.len();
                    seen.extend(slice.rows);
                }
                assert_eq!(seen, rows, "n={n} per_page={per_page}");
                let expected_last = if n > 0 && n % per_page == 0 {
                    per_page
                } else {
                    n % per_page
                };
                assert_eq!(last_len, expected_last, "n={n} per_page={per_page}");
            }
        }
    }

    #[test]
    #[should_panic(expected = "per_page must be positive")]
    fn test_zero_per_page_panics() {
        Pagination::new(0);
    }
}
