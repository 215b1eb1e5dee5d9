//! Column visibility and order.

use std::collections::HashMap;
use std::collections::HashSet;

use serde::Deserialize;
use serde::Serialize;

use super::Column;
use crate::error::ColumnError;

/// Persistable form of a [`ColumnLayout`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutSnapshot {
    /// Visibility per column key.
    pub visibility: HashMap<String, bool>,
    /// Column keys in display order.
    pub order: Vec<String>,
}

/// Which declared columns are shown, and in which order.
///
/// Visibility is seeded from each descriptor's `default_visible`. Columns
/// with `hideable: false` are always shown; columns without `draggable`
/// never move and cannot be crossed by a drag.
#[derive(Debug, Clone)]
pub struct ColumnLayout {
    /// Declared columns in display order.
    columns: Vec<Column>,
    /// Visibility per column key.
    visibility: HashMap<String, bool>,
}

impl ColumnLayout {
    /// Creates a layout from descriptors.
    ///
    /// Fails if two descriptors share a key.
    pub fn new(columns: Vec<Column>) -> Result<Self, ColumnError> {
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.key.as_str()) {
                return Err(ColumnError::DuplicateKey(column.key.clone()));
            }
        }
        let visibility = columns
            .iter()
            .map(|c| (c.key.clone(), c.default_visible || !c.hideable))
            .collect();
        Ok(Self {
            columns,
            visibility,
        })
    }

    /// All declared columns in display order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Looks up a column by key.
    pub fn column(&self, key: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.key == key)
    }

    /// Visible columns in display order.
    pub fn visible_columns(&self) -> Vec<Column> {
        self.columns
            .iter()
            .filter(|c| self.is_visible(&c.key))
            .cloned()
            .collect()
    }

    /// Keys of the visible columns in display order.
    pub fn visible_keys(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| self.is_visible(&c.key))
            .map(|c| c.key.clone())
            .collect()
    }

    /// Whether a column is currently shown. Unknown keys are not.
    pub fn is_visible(&self, key: &str) -> bool {
        self.visibility.get(key).copied().unwrap_or(false)
    }

    /// Shows or hides a column.
    ///
    /// Non-hideable columns reject the attempt, even when `visible` is
    /// `true`, so callers always learn that the column is locked.
    /// Returns `true` if visibility changed.
    pub fn toggle(&mut self, key: &str, visible: bool) -> Result<bool, ColumnError> {
        let column = self
            .column(key)
            .ok_or_else(|| ColumnError::UnknownColumn(key.to_string()))?;
        if !column.hideable {
            return Err(ColumnError::NotHideable(key.to_string()));
        }
        let previous = self.visibility.insert(key.to_string(), visible);
        Ok(previous != Some(visible))
    }

    /// Drags `from_key` to the position of `to_key`.
    ///
    /// Both columns must be draggable and no fixed column may sit between
    /// them. The result is a permutation of the draggable columns inside
    /// that stretch; everything else keeps its index. Returns `true` if the
    /// order changed.
    pub fn move_column(&mut self, from_key: &str, to_key: &str) -> Result<bool, ColumnError> {
        let from = self.index_of(from_key)?;
        let to = self.index_of(to_key)?;
        if !self.columns[from].draggable {
            return Err(ColumnError::NotDraggable(from_key.to_string()));
        }
        if !self.columns[to].draggable {
            return Err(ColumnError::NotDraggable(to_key.to_string()));
        }
        if from == to {
            return Ok(false);
        }

        let (low, high) = if from < to { (from, to) } else { (to, from) };
        if let Some(anchor) = self.columns[low..=high].iter().find(|c| !c.draggable) {
            return Err(ColumnError::Anchored {
                from: from_key.to_string(),
                anchor: anchor.key.clone(),
            });
        }

        let column = self.columns.remove(from);
        self.columns.insert(to, column);
        Ok(true)
    }

    fn index_of(&self, key: &str) -> Result<usize, ColumnError> {
        self.columns
            .iter()
            .position(|c| c.key == key)
            .ok_or_else(|| ColumnError::UnknownColumn(key.to_string()))
    }

    /// Captures the layout for persistence.
    pub fn snapshot(&self) -> LayoutSnapshot {
        LayoutSnapshot {
            visibility: self.visibility.clone(),
            order: self.columns.iter().map(|c| c.key.clone()).collect(),
        }
    }

    /// Applies a persisted layout.
    ///
    /// Keys that are no longer declared are ignored; columns declared since
    /// the snapshot keep their defaults. Non-hideable columns stay visible
    /// and non-draggable columns stay where they are declared.
    pub fn restore(&mut self, snapshot: &LayoutSnapshot) {
        for (key, visible) in &snapshot.visibility {
            if let Some(column) = self.column(key)
                && column.hideable
            {
                self.visibility.insert(key.clone(), *visible);
            }
        }

        // Each run of draggable columns between fixed anchors is reordered on
        // its own, so a snapshot can never carry a column past an anchor.
        let rank = |key: &str| {
            snapshot
                .order
                .iter()
                .position(|k| k == key)
                .unwrap_or(usize::MAX)
        };
        let mut start = 0;
        while start < self.columns.len() {
            if !self.columns[start].draggable {
                start += 1;
                continue;
            }
            let end = self.columns[start..]
                .iter()
                .position(|c| !c.draggable)
                .map_or(self.columns.len(), |offset| start + offset);
            self.columns[start..end].sort_by_key(|c| rank(&c.key));
            start = end;
        }
    }
}
