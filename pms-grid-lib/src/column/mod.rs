//! Column descriptors and the column layout (visibility and order).

mod layout;

pub use layout::*;

use serde::Deserialize;
use serde::Serialize;

/// Column configuration.
///
/// Columns describe a table's structure independently of its data: the key
/// rows are read with, the header label, and what the user may do with the
/// column. Descriptor order is the default display order.
///
/// # Examples
///
/// ```
/// use pms_grid_lib::column::Column;
///
/// let columns = vec![
///     Column::new("actions", "Actions").fixed(),
///     Column::new("name", "Name").sortable().draggable(),
///     Column::new("notes", "Notes").hidden_by_default(),
/// ];
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Key used to read the column's value from a row; unique per table
    pub key: String,
    /// Header text
    pub label: String,
    /// Whether this column is sortable
    #[serde(default)]
    pub sortable: bool,
    /// Whether the user may hide this column
    #[serde(default = "default_true")]
    pub hideable: bool,
    /// Whether the user may drag this column to another position
    #[serde(default)]
    pub draggable: bool,
    /// Whether the column starts visible
    #[serde(default = "default_true")]
    pub default_visible: bool,
}

fn default_true() -> bool {
    true
}

impl Column {
    /// Create a visible, hideable, non-sortable, non-draggable column.
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            sortable: false,
            hideable: true,
            draggable: false,
            default_visible: true,
        }
    }

    /// Make the column sortable.
    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    /// Allow the column to be dragged to another position.
    pub fn draggable(mut self) -> Self {
        self.draggable = true;
        self
    }

    /// Start the column hidden.
    pub fn hidden_by_default(mut self) -> Self {
        self.default_visible = false;
        self
    }

    /// Make the column always shown (e.g. row actions).
    ///
    /// Fixed columns cannot be hidden and cannot be dragged.
    pub fn fixed(mut self) -> Self {
        self.hideable = false;
        self.draggable = false;
        self.default_visible = true;
        self
    }
}
