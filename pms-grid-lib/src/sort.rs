//! Column sort state and client-side ordering.

use serde::Deserialize;
use serde::Serialize;

use crate::model::TableRow;
use crate::model::Value;

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    /// The opposite direction.
    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    /// Query-string form: `asc` or `desc`.
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }
}

/// Current sort: a column key and direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    pub key: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl Sort {
    /// Ascending sort on a key.
    pub fn ascending(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            direction: SortDirection::Ascending,
        }
    }

    /// Descending sort on a key.
    pub fn descending(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            direction: SortDirection::Descending,
        }
    }

    /// The sort that follows clicking `key` when `current` is active.
    ///
    /// Clicking the sorted column flips its direction; any other column
    /// starts ascending.
    pub fn toggled(current: Option<&Sort>, key: &str) -> Sort {
        match current {
            Some(sort) if sort.key == key => Sort {
                key: sort.key.clone(),
                direction: sort.direction.reversed(),
            },
            _ => Sort::ascending(key),
        }
    }
}

/// Stable sort of rows by one field.
///
/// Missing values sort last in both directions.
pub fn apply_sort<R: TableRow>(rows: &mut [R], sort: &Sort) {
    rows.sort_by_cached_key(|row| SortKey {
        value: row.field(&sort.key).unwrap_or(Value::Null),
        direction: sort.direction,
    });
}

struct SortKey {
    value: Value,
    direction: SortDirection,
}

impl PartialEq for SortKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for SortKey {}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        let ordering = self.value.sort_cmp(&other.value);
        match (self.direction, self.value.is_null() || other.value.is_null()) {
            (SortDirection::Descending, false) => ordering.reverse(),
            _ => ordering,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Record;

    fn rows() -> Vec<Record> {
        vec![
            Record::new().set("id", 1).set("rent", 900),
            Record::new().set("id", 2),
            Record::new().set("id", 3).set("rent", 1500),
            Record::new().set("id", 4).set("rent", 1200),
        ]
    }

    fn ids(rows: &[Record]) -> Vec<String> {
        rows.iter().map(|r| r.id()).collect()
    }

    #[test]
    fn test_sort_ascending_nulls_last() {
        let mut rows = rows();
        apply_sort(&mut rows, &Sort::ascending("rent"));
        assert_eq!(ids(&rows), vec!["1", "4", "3", "2"]);
    }

    #[test]
    fn test_sort_descending_nulls_last() {
        let mut rows = rows();
        apply_sort(&mut rows, &Sort::descending("rent"));
        assert_eq!(ids(&rows), vec!["3", "4", "1", "2"]);
    }

    #[test]
    fn test_toggled() {
        let first = Sort::toggled(None, "name");
        assert_eq!(first, Sort::ascending("name"));
        let second = Sort::toggled(Some(&first), "name");
        assert_eq!(second, Sort::descending("name"));
        let other = Sort::toggled(Some(&second), "unit");
        assert_eq!(other, Sort::ascending("unit"));
    }

    #[test]
    fn test_sort_mixed_kind_column() {
        let date = chrono::NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let mut rows: Vec<Record> = (0..2000)
            .map(|i| {
                let n = (i * 7919) % 2000;
                let row = Record::new().set("id", i);
                match n % 5 {
                    0 => row.set("unit", n),
                    1 => row.set("unit", n.to_string()),
                    2 => row.set("unit", format!("{}A", n)),
                    3 => row.set("unit", date.to_string()),
                    _ => row,
                }
            })
            .collect();

        apply_sort(&mut rows, &Sort::ascending("unit"));

        let values: Vec<Value> = rows
            .iter()
            .map(|r| r.field("unit").unwrap_or(Value::Null))
            .collect();
        for pair in values.windows(2) {
            assert_ne!(pair[0].sort_cmp(&pair[1]), std::cmp::Ordering::Greater);
        }
        assert!(matches!(values[0], Value::Number(_)));
        assert!(values[values.len() - 1].is_null());

        apply_sort(&mut rows, &Sort::descending("unit"));
        assert!(matches!(rows[0].field("unit"), Some(Value::Text(_))));
        assert!(rows[rows.len() - 1].field("unit").is_none());
    }
}
