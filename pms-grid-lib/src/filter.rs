//! Free-text search and field filters.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::Serialize;

use crate::model::TableRow;
use crate::model::Value;

/// The constraint a single filter field places on rows.
///
/// # Example
///
/// ```
/// use pms_grid_lib::filter::FilterValue;
///
/// let status = FilterValue::choice("open");
/// let name = FilterValue::text("smith");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FilterValue {
    /// Case-insensitive substring of the field text.
    Text { value: String },
    /// Case-insensitive equality with the field text (status, category, ...).
    Choice { value: String },
    /// Same calendar date.
    Date { value: NaiveDate },
    /// Inclusive date range; either bound may be open.
    DateRange {
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    },
    /// Numeric equality.
    Number { value: Decimal },
    /// Inclusive numeric range; either bound may be open.
    NumberRange {
        min: Option<Decimal>,
        max: Option<Decimal>,
    },
    /// Boolean equality.
    Flag { value: bool },
}

impl FilterValue {
    /// Creates a substring filter.
    pub fn text(value: impl Into<String>) -> Self {
        FilterValue::Text {
            value: value.into(),
        }
    }

    /// Creates an exact-choice filter.
    pub fn choice(value: impl Into<String>) -> Self {
        FilterValue::Choice {
            value: value.into(),
        }
    }

    /// Creates a single-date filter.
    pub fn date(value: NaiveDate) -> Self {
        FilterValue::Date { value }
    }

    /// Creates a date range filter.
    pub fn date_range(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        FilterValue::DateRange { from, to }
    }

    /// Creates a numeric equality filter.
    pub fn number(value: impl Into<Decimal>) -> Self {
        FilterValue::Number {
            value: value.into(),
        }
    }

    /// Creates a numeric range filter.
    pub fn number_range(min: Option<Decimal>, max: Option<Decimal>) -> Self {
        FilterValue::NumberRange { min, max }
    }

    /// Creates a boolean filter.
    pub fn flag(value: bool) -> Self {
        FilterValue::Flag { value }
    }

    /// Returns `true` if this value constrains nothing (blank text, open range).
    pub fn is_blank(&self) -> bool {
        match self {
            FilterValue::Text { value } | FilterValue::Choice { value } => value.trim().is_empty(),
            FilterValue::DateRange { from, to } => from.is_none() && to.is_none(),
            FilterValue::NumberRange { min, max } => min.is_none() && max.is_none(),
            _ => false,
        }
    }

    /// Checks a single row value against this constraint.
    ///
    /// A null or missing field never matches.
    pub fn matches(&self, value: &Value) -> bool {
        if value.is_null() {
            return false;
        }
        match self {
            FilterValue::Text { value: needle } => {
                contains_ignore_case(&value.to_string(), needle)
            }
            FilterValue::Choice { value: choice } => {
                value.to_string().to_lowercase() == choice.to_lowercase()
            }
            FilterValue::Date { value: date } => value.as_date() == Some(*date),
            FilterValue::DateRange { from, to } => match value.as_date() {
                Some(date) => {
                    from.is_none_or(|from| date >= from) && to.is_none_or(|to| date <= to)
                }
                None => false,
            },
            FilterValue::Number { value: number } => value.as_decimal() == Some(*number),
            FilterValue::NumberRange { min, max } => match value.as_decimal() {
                Some(n) => min.is_none_or(|min| n >= min) && max.is_none_or(|max| n <= max),
                None => false,
            },
            FilterValue::Flag { value: flag } => value.as_bool() == Some(*flag),
        }
    }

    /// The value as a query-string parameter.
    pub fn to_param(&self) -> String {
        match self {
            FilterValue::Text { value } | FilterValue::Choice { value } => value.clone(),
            FilterValue::Date { value } => value.format("%Y-%m-%d").to_string(),
            FilterValue::DateRange { from, to } => format!(
                "{}..{}",
                from.map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default(),
                to.map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default()
            ),
            FilterValue::Number { value } => value.normalize().to_string(),
            FilterValue::NumberRange { min, max } => format!(
                "{}..{}",
                min.map(|n| n.normalize().to_string()).unwrap_or_default(),
                max.map(|n| n.normalize().to_string()).unwrap_or_default()
            ),
            FilterValue::Flag { value } => value.to_string(),
        }
    }
}

/// Field-level filter values, keyed by field name.
///
/// A missing key means "no constraint". Keys iterate in name order so the
/// derived query parameters are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterState {
    fields: BTreeMap<String, FilterValue>,
}

impl FilterState {
    /// Creates an empty filter state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets or replaces the constraint on a field.
    ///
    /// Blank values remove the constraint instead. Returns `true` if the
    /// state changed.
    pub fn set(&mut self, field: impl Into<String>, value: FilterValue) -> bool {
        let field = field.into();
        if value.is_blank() {
            return self.fields.remove(&field).is_some();
        }
        if self.fields.get(&field) == Some(&value) {
            return false;
        }
        self.fields.insert(field, value);
        true
    }

    /// Builder form of [`set`](Self::set).
    pub fn with(mut self, field: impl Into<String>, value: FilterValue) -> Self {
        self.set(field, value);
        self
    }

    /// Removes the constraint on a field. Returns `true` if one existed.
    pub fn remove(&mut self, field: &str) -> bool {
        self.fields.remove(field).is_some()
    }

    /// Removes every constraint. Returns `true` if any existed.
    pub fn clear(&mut self) -> bool {
        let had_any = !self.fields.is_empty();
        self.fields.clear();
        had_any
    }

    /// Returns the constraint on a field.
    pub fn get(&self, field: &str) -> Option<&FilterValue> {
        self.fields.get(field)
    }

    /// Iterates constraints in field-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the number of constrained fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if nothing is constrained.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Checks a row against every constraint (logical AND).
    pub fn matches<R: TableRow>(&self, row: &R) -> bool {
        self.fields.iter().all(|(field, constraint)| {
            row.field(field)
                .is_some_and(|value| constraint.matches(&value))
        })
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Checks a row against a free-text query.
///
/// Matches if ANY searchable field's text contains the query,
/// case-insensitively. A blank query matches every row.
pub fn matches_query<R: TableRow>(row: &R, query: &str, searchable: &[String]) -> bool {
    let query = query.trim();
    if query.is_empty() {
        return true;
    }
    let needle = query.to_lowercase();
    searchable.iter().any(|field| {
        row.field_text(field)
            .is_some_and(|text| text.to_lowercase().contains(&needle))
    })
}

/// Derives the rows matching a free-text query and field filters.
///
/// Rows must match the query (see [`matches_query`]) AND every field filter.
/// An empty query with an empty filter state returns the input unchanged.
/// Order is preserved and the input is never mutated.
///
/// # Example
///
/// ```
/// use pms_grid_lib::filter::{apply_filter, FilterState};
/// use pms_grid_lib::model::Record;
///
/// let rows = vec![
///     Record::new().set("id", 1).set("name", "Bob White"),
///     Record::new().set("id", 2).set("name", "Alice"),
/// ];
/// let matched = apply_filter(&rows, "bob", &FilterState::new(), &["name".to_string()]);
/// assert_eq!(matched, vec![rows[0].clone()]);
/// ```
pub fn apply_filter<R: TableRow>(
    rows: &[R],
    query: &str,
    filters: &FilterState,
    searchable: &[String],
) -> Vec<R> {
    if query.trim().is_empty() && filters.is_empty() {
        return rows.to_vec();
    }
    let filtered: Vec<R> = rows
        .iter()
        .filter(|row| matches_query(*row, query, searchable) && filters.matches(*row))
        .cloned()
        .collect();
    log::trace!(
        "filter: {} of {} rows match query {:?} with {} field filters",
        filtered.len(),
        rows.len(),
        query,
        filters.len()
    );
    filtered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Record;

    fn person(id: i64, name: &str, status: &str, rent: i64, moved_in: &str) -> Record {
        Record::new()
            .set("id", id)
            .set("name", name)
            .set("status", status)
            .set("rent", rent)
            .set("moved_in", moved_in)
    }

    fn rows() -> Vec<Record> {
        vec![
            person(1, "Bob White", "active", 1200, "2024-01-15"),
            person(2, "Alice", "inactive", 900, "2023-11-02"),
            person(3, "Bobby Tables", "active", 1500, "2024-06-30"),
        ]
    }

    fn searchable() -> Vec<String> {
        vec!["name".to_string(), "status".to_string()]
    }

    #[test]
    fn test_empty_query_and_filters_is_noop() {
        let rows = rows();
        let result = apply_filter(&rows, "", &FilterState::new(), &searchable());
        assert_eq!(result, rows);
    }

    #[test]
    fn test_query_is_case_insensitive_substring() {
        let rows = rows();
        let result = apply_filter(&rows, "BOB", &FilterState::new(), &searchable());
        let ids: Vec<String> = result.iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn test_query_matches_any_searchable_field() {
        let rows = rows();
        let result = apply_filter(&rows, "inact", &FilterState::new(), &searchable());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id(), "2");
    }

    #[test]
    fn test_query_ignores_non_searchable_fields() {
        let rows = rows();
        let result = apply_filter(&rows, "1200", &FilterState::new(), &searchable());
        assert!(result.is_empty());
    }

    #[test]
    fn test_field_filters_are_anded() {
        let rows = rows();
        let filters = FilterState::new()
            .with("status", FilterValue::choice("Active"))
            .with(
                "rent",
                FilterValue::number_range(Some(Decimal::from(1300)), None),
            );
        let result = apply_filter(&rows, "", &filters, &searchable());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id(), "3");
    }

    #[test]
    fn test_choice_is_exact() {
        let rows = rows();
        let filters = FilterState::new().with("status", FilterValue::choice("act"));
        assert!(apply_filter(&rows, "", &filters, &searchable()).is_empty());
    }

    #[test]
    fn test_date_range_inclusive() {
        let rows = rows();
        let filters = FilterState::new().with(
            "moved_in",
            FilterValue::date_range(NaiveDate::from_ymd_opt(2024, 1, 15), None),
        );
        let ids: Vec<String> = apply_filter(&rows, "", &filters, &searchable())
            .iter()
            .map(|r| r.id())
            .collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn test_missing_field_never_matches() {
        let rows = rows();
        let filters = FilterState::new().with("parking_slot", FilterValue::text("a"));
        assert!(apply_filter(&rows, "", &filters, &searchable()).is_empty());
    }

    #[test]
    fn test_blank_value_removes_constraint() {
        let mut filters = FilterState::new().with("status", FilterValue::choice("active"));
        assert!(filters.set("status", FilterValue::text("   ")));
        assert!(filters.is_empty());
    }

    #[test]
    fn test_no_rows() {
        let rows: Vec<Record> = Vec::new();
        assert!(apply_filter(&rows, "bob", &FilterState::new(), &searchable()).is_empty());
    }

    #[test]
    fn test_filter_is_idempotent() {
        let rows = rows();
        let filters = FilterState::new().with("status", FilterValue::choice("active"));
        for query in ["", "bob", "tables", "zzz"] {
            let once = apply_filter(&rows, query, &filters, &searchable());
            let twice = apply_filter(&once, query, &filters, &searchable());
            assert_eq!(once, twice);
        }
    }
}
