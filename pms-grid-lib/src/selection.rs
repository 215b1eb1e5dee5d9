//! Row selection for bulk actions.
//!
//! Selection is tracked by row ID so it stays stable when rows are refetched
//! or reordered.

use std::collections::HashSet;
use std::hash::Hash;

use serde::Deserialize;
use serde::Serialize;

/// How "select all" treats rows selected on other pages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionScope {
    /// Selection only ever covers the visible page. "Select all" replaces.
    #[default]
    Page,
    /// Selection accumulates across pages. "Select all" merges.
    Accumulate,
}

/// Derived state of the header "select all" checkbox.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HeaderCheckbox {
    /// No visible row is selected.
    #[default]
    Unchecked,
    /// Some but not all visible rows are selected.
    Indeterminate,
    /// Every visible row is selected.
    Checked,
}

/// ID-based selection state.
#[derive(Debug, Clone)]
pub struct Selection<Id> {
    /// Currently selected IDs
    selected: HashSet<Id>,
    scope: SelectionScope,
}

impl<Id> Default for Selection<Id> {
    fn default() -> Self {
        Self {
            selected: HashSet::new(),
            scope: SelectionScope::Page,
        }
    }
}

impl<Id: Clone + Eq + Hash + Ord> Selection<Id> {
    /// Create a new empty page-scoped selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new empty selection with the given scope.
    pub fn with_scope(scope: SelectionScope) -> Self {
        Self {
            selected: HashSet::new(),
            scope,
        }
    }

    /// The selection scope.
    pub fn scope(&self) -> SelectionScope {
        self.scope
    }

    /// Get all selected IDs (sorted for deterministic ordering).
    pub fn selected(&self) -> Vec<Id> {
        let mut ids: Vec<_> = self.selected.iter().cloned().collect();
        ids.sort();
        ids
    }

    /// Check if an ID is selected.
    pub fn is_selected(&self, id: &Id) -> bool {
        self.selected.contains(id)
    }

    /// Get the number of selected items.
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    /// Check if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Clear all selection.
    /// Returns the IDs that were deselected.
    pub fn clear(&mut self) -> Vec<Id> {
        self.selected.drain().collect()
    }

    /// Select or deselect a single ID.
    /// Returns `true` if the selection changed.
    pub fn select_one(&mut self, id: Id, checked: bool) -> bool {
        if checked {
            self.selected.insert(id)
        } else {
            self.selected.remove(&id)
        }
    }

    /// Toggle selection of an ID.
    /// Returns `true` if the ID is now selected.
    pub fn toggle(&mut self, id: Id) -> bool {
        if self.selected.remove(&id) {
            false
        } else {
            self.selected.insert(id);
            true
        }
    }

    /// Header checkbox action over the visible rows.
    ///
    /// Checking in page scope makes the selection exactly `visible_ids`;
    /// in accumulate scope the visible IDs are merged in. Unchecking removes
    /// the visible IDs and leaves other pages' selections alone.
    ///
    /// Returns (added, removed) IDs.
    pub fn select_all(&mut self, visible_ids: &[Id], checked: bool) -> (Vec<Id>, Vec<Id>) {
        let mut added = Vec::new();
        let mut removed = Vec::new();

        if checked {
            if self.scope == SelectionScope::Page {
                let visible: HashSet<&Id> = visible_ids.iter().collect();
                removed = self
                    .selected
                    .iter()
                    .filter(|id| !visible.contains(id))
                    .cloned()
                    .collect();
                for id in &removed {
                    self.selected.remove(id);
                }
            }
            for id in visible_ids {
                if self.selected.insert(id.clone()) {
                    added.push(id.clone());
                }
            }
        } else {
            for id in visible_ids {
                if self.selected.remove(id) {
                    removed.push(id.clone());
                }
            }
        }

        (added, removed)
    }

    /// Derives the header checkbox state for the visible rows.
    pub fn header_state(&self, visible_ids: &[Id]) -> HeaderCheckbox {
        let selected = visible_ids
            .iter()
            .filter(|id| self.selected.contains(id))
            .count();
        if selected == 0 {
            HeaderCheckbox::Unchecked
        } else if selected == visible_ids.len() {
            HeaderCheckbox::Checked
        } else {
            HeaderCheckbox::Indeterminate
        }
    }

    /// Drops selected IDs that are not in `existing_ids`.
    /// Returns the IDs that were dropped.
    pub fn reconcile(&mut self, existing_ids: &[Id]) -> Vec<Id> {
        let existing: HashSet<&Id> = existing_ids.iter().collect();
        let stale: Vec<Id> = self
            .selected
            .iter()
            .filter(|id| !existing.contains(id))
            .cloned()
            .collect();
        for id in &stale {
            self.selected.remove(id);
        }
        stale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_all_replaces_in_page_scope() {
        let mut selection = Selection::new();
        let page_a = [1, 2, 3];
        let page_b = [4, 5, 6];

        selection.select_all(&page_a, true);
        assert_eq!(selection.selected(), vec![1, 2, 3]);

        let (added, removed) = selection.select_all(&page_b, true);
        assert_eq!(selection.selected(), vec![4, 5, 6]);
        assert_eq!(added.len(), 3);
        assert_eq!(removed.len(), 3);
    }

    #[test]
    fn test_select_all_merges_in_accumulate_scope() {
        let mut selection = Selection::with_scope(SelectionScope::Accumulate);
        selection.select_all(&[1, 2], true);
        selection.select_all(&[3, 4], true);
        assert_eq!(selection.selected(), vec![1, 2, 3, 4]);

        selection.select_all(&[3, 4], false);
        assert_eq!(selection.selected(), vec![1, 2]);
    }

    #[test]
    fn test_select_one() {
        let mut selection = Selection::new();
        assert!(selection.select_one("a", true));
        assert!(!selection.select_one("a", true));
        assert!(selection.is_selected(&"a"));
        assert!(selection.select_one("a", false));
        assert!(selection.is_empty());
    }

    #[test]
    fn test_header_state() {
        let mut selection = Selection::new();
        let visible = [1, 2, 3];
        assert_eq!(selection.header_state(&visible), HeaderCheckbox::Unchecked);

        selection.select_one(2, true);
        assert_eq!(
            selection.header_state(&visible),
            HeaderCheckbox::Indeterminate
        );

        selection.select_all(&visible, true);
        assert_eq!(selection.header_state(&visible), HeaderCheckbox::Checked);

        assert_eq!(selection.header_state(&[]), HeaderCheckbox::Unchecked);
    }

    #[test]
    fn test_reconcile_drops_missing_ids() {
        let mut selection = Selection::new();
        selection.select_all(&[1, 2, 3], true);
        let dropped = selection.reconcile(&[2, 3, 4]);
        assert_eq!(dropped, vec![1]);
        assert_eq!(selection.selected(), vec![2, 3]);
    }

    #[test]
    fn test_toggle() {
        let mut selection = Selection::new();
        assert!(selection.toggle(7));
        assert!(!selection.toggle(7));
        assert!(selection.is_empty());
    }
}
