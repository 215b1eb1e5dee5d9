//! TableRow trait

use std::fmt::Debug;
use std::hash::Hash;

use super::Value;

/// Trait for records that can be shown as table rows.
///
/// The table core assumes nothing about a row beyond a stable identifier and
/// a way to read named fields. Implement this for each page's row type.
///
/// # Example
///
/// ```
/// use pms_grid_lib::model::{TableRow, Value};
///
/// #[derive(Clone)]
/// struct Visitor {
///     id: u32,
///     name: String,
///     flat: String,
/// }
///
/// impl TableRow for Visitor {
///     type Id = u32;
///
///     fn id(&self) -> u32 {
///         self.id
///     }
///
///     fn field(&self, key: &str) -> Option<Value> {
///         match key {
///             "name" => Some(self.name.as_str().into()),
///             "flat" => Some(self.flat.as_str().into()),
///             _ => None,
///         }
///     }
/// }
/// ```
pub trait TableRow: Clone + Send + Sync + 'static {
    /// Identifier type. Used for stable selection across refetches.
    type Id: Clone + Eq + Hash + Ord + Debug + Send + Sync + 'static;

    /// Unique identifier for this row.
    fn id(&self) -> Self::Id;

    /// Value of a named field, or `None` if the row has no such field.
    fn field(&self, key: &str) -> Option<Value>;

    /// Text used for free-text search on a field.
    ///
    /// Defaults to the display form of [`field`](TableRow::field). Override
    /// when the searchable text differs from the raw value (e.g. a lookup
    /// that should match on its label).
    fn field_text(&self, key: &str) -> Option<String> {
        self.field(key)
            .filter(|value| !value.is_null())
            .map(|value| value.to_string())
    }
}
