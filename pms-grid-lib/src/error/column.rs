//! Column operation errors

/// Errors raised by column layout and sort operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColumnError {
    /// No column with this key is declared.
    #[error("unknown column: {0}")]
    UnknownColumn(String),

    /// Two descriptors share the same key.
    #[error("duplicate column key: {0}")]
    DuplicateKey(String),

    /// The column is always shown and cannot be hidden.
    #[error("column cannot be hidden: {0}")]
    NotHideable(String),

    /// The column is not marked draggable.
    #[error("column cannot be moved: {0}")]
    NotDraggable(String),

    /// The move would cross a fixed column.
    #[error("cannot move {from} past fixed column {anchor}")]
    Anchored {
        /// The column being dragged.
        from: String,
        /// The fixed column in the way.
        anchor: String,
    },

    /// The column does not support sorting.
    #[error("column is not sortable: {0}")]
    NotSortable(String),
}
