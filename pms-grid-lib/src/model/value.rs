//! Value enum for dynamic cell values

use std::cmp::Ordering;

use chrono::DateTime;
use chrono::NaiveDate;
use chrono::NaiveTime;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::Serialize;

/// A single cell value exposed by a [`TableRow`](super::TableRow).
///
/// Rows are arbitrary domain objects; this enum is the common currency the
/// filter and sort engines work with.
///
/// # Example
///
/// ```
/// use pms_grid_lib::model::Value;
///
/// let name = Value::from("Unit 4B");
/// let rent = Value::from(1_250i64);
/// let occupied = Value::from(true);
/// let empty = Value::Null;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Null/empty value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Any numeric value.
    Number(Decimal),
    /// Calendar date without time.
    Date(NaiveDate),
    /// Date and time.
    DateTime(DateTime<Utc>),
    /// Free text, enum labels, identifiers.
    Text(String),
}

impl Value {
    /// Returns `true` if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the type name of this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::Date(_) => "date",
            Value::DateTime(_) => "datetime",
            Value::Text(_) => "text",
        }
    }

    /// Returns the text content if this is a text value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the numeric content if this is a number.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the calendar date of a date or datetime value.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            Value::DateTime(dt) => Some(dt.date_naive()),
            _ => None,
        }
    }

    /// Returns the boolean content if this is a bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Orders two values for sorting.
    ///
    /// This is a total order. Values of the same kind compare naturally,
    /// dates and datetimes compare by instant (a date is midnight UTC and
    /// sorts before a datetime at that instant), and text compares
    /// case-insensitively. Mixed kinds order by kind:
    /// bool < number < date/datetime < text < null.
    pub fn sort_cmp(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Number(a), Value::Number(b)) => a.cmp(b),
            (Value::Text(a), Value::Text(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
            (Value::Null, Value::Null) => Ordering::Equal,
            (a, b) => match (a.instant(), b.instant()) {
                (Some(x), Some(y)) => x.cmp(&y),
                _ => a.kind_rank().cmp(&b.kind_rank()),
            },
        }
    }

    fn kind_rank(&self) -> u8 {
        match self {
            Value::Bool(_) => 0,
            Value::Number(_) => 1,
            Value::Date(_) | Value::DateTime(_) => 2,
            Value::Text(_) => 3,
            Value::Null => 4,
        }
    }

    /// Sort position of a temporal value: its instant, dates before datetimes.
    fn instant(&self) -> Option<(DateTime<Utc>, u8)> {
        match self {
            Value::Date(d) => Some((d.and_time(NaiveTime::MIN).and_utc(), 0)),
            Value::DateTime(dt) => Some((*dt, 1)),
            _ => None,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n.normalize()),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::DateTime(dt) => write!(f, "{}", dt.to_rfc3339()),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(Decimal::from(n))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(Decimal::from(n))
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Number(Decimal::from(n))
    }
}

impl From<Decimal> for Value {
    fn from(n: Decimal) -> Self {
        Value::Number(n)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(dt: DateTime<Utc>) -> Self {
        Value::DateTime(dt)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

impl From<&serde_json::Value> for Value {
    /// Converts a JSON value as returned by a REST endpoint.
    ///
    /// Strings shaped like `YYYY-MM-DD` or RFC 3339 timestamps become dates;
    /// arrays and objects are kept as their JSON text.
    fn from(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Number(Decimal::from(i))
                } else if let Some(u) = n.as_u64() {
                    Value::Number(Decimal::from(u))
                } else {
                    n.as_f64()
                        .and_then(Decimal::from_f64_retain)
                        .map(Value::Number)
                        .unwrap_or_else(|| Value::Text(n.to_string()))
                }
            }
            serde_json::Value::String(s) => parse_text(s),
            other => Value::Text(other.to_string()),
        }
    }
}

fn parse_text(s: &str) -> Value {
    if s.len() == 10
        && let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d")
    {
        return Value::Date(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Value::DateTime(dt.with_timezone(&Utc));
    }
    Value::Text(s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json() {
        assert_eq!(Value::from(&serde_json::json!(null)), Value::Null);
        assert_eq!(Value::from(&serde_json::json!(42)), Value::from(42i64));
        assert_eq!(
            Value::from(&serde_json::json!("2024-03-01")),
            Value::Date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
        );
        assert_eq!(
            Value::from(&serde_json::json!("Block A")),
            Value::from("Block A")
        );
        assert!(matches!(
            Value::from(&serde_json::json!("2024-03-01T10:00:00Z")),
            Value::DateTime(_)
        ));
    }

    #[test]
    fn test_sort_cmp_nulls_last() {
        assert_eq!(Value::Null.sort_cmp(&Value::from(1i64)), Ordering::Greater);
        assert_eq!(Value::from(1i64).sort_cmp(&Value::Null), Ordering::Less);
        assert_eq!(Value::from("b").sort_cmp(&Value::from("A")), Ordering::Greater);
    }

    #[test]
    fn test_sort_cmp_mixed_kinds_by_rank() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let ordered = [
            Value::Bool(true),
            Value::from(10i64),
            Value::Date(date),
            Value::DateTime(date.and_hms_opt(9, 0, 0).unwrap().and_utc()),
            Value::from("9"),
            Value::Null,
        ];
        for (i, a) in ordered.iter().enumerate() {
            for (j, b) in ordered.iter().enumerate() {
                assert_eq!(a.sort_cmp(b), i.cmp(&j), "{:?} vs {:?}", a, b);
            }
        }
    }

    #[test]
    fn test_sort_cmp_numbers_and_numeric_text_stay_consistent() {
        let nine = Value::from(9i64);
        let ten = Value::from(10i64);
        let text_nine = Value::from("9");
        assert_eq!(nine.sort_cmp(&ten), Ordering::Less);
        assert_eq!(ten.sort_cmp(&text_nine), Ordering::Less);
        assert_eq!(nine.sort_cmp(&text_nine), Ordering::Less);
    }

    #[test]
    fn test_sort_cmp_date_against_datetime_by_instant() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        let midnight = Value::DateTime(date.and_hms_opt(0, 0, 0).unwrap().and_utc());
        let day_before = Value::DateTime(
            NaiveDate::from_ymd_opt(2024, 3, 1)
                .unwrap()
                .and_hms_opt(23, 0, 0)
                .unwrap()
                .and_utc(),
        );
        assert_eq!(Value::Date(date).sort_cmp(&midnight), Ordering::Less);
        assert_eq!(midnight.sort_cmp(&Value::Date(date)), Ordering::Greater);
        assert_eq!(Value::Date(date).sort_cmp(&day_before), Ordering::Greater);
    }

    #[test]
    fn test_display_number_normalized() {
        let value = Value::Number(Decimal::new(12500, 2));
        assert_eq!(value.to_string(), "125");
    }
}
