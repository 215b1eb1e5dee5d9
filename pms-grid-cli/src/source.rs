//! Reading table declarations and rows from disk, and parsing list options.

use std::fs;
use std::path::Path;

use pms_grid_lib::column::Column;
use pms_grid_lib::config::TableSpec;
use pms_grid_lib::filter::FilterValue;
use pms_grid_lib::model::Record;
use pms_grid_lib::sort::Sort;

use crate::error::{CliError, Result};

fn read_json(path: &Path) -> Result<serde_json::Value> {
    let text = fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads a [`TableSpec`] from a JSON file.
pub fn read_spec(path: &Path) -> Result<TableSpec> {
    let value = read_json(path)?;
    serde_json::from_value(value).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads rows from a JSON file.
///
/// Accepts a bare array or an object wrapping the array under `data`.
/// Rows without an `id` get their 1-based position in the file.
pub fn read_rows(path: &Path) -> Result<Vec<Record>> {
    rows_from_json(read_json(path)?).ok_or_else(|| CliError::NotRows(path.to_path_buf()))
}

fn rows_from_json(value: serde_json::Value) -> Option<Vec<Record>> {
    let items = match value {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Object(mut map) => match map.remove("data")? {
            serde_json::Value::Array(items) => items,
            _ => return None,
        },
        _ => return None,
    };
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            serde_json::Value::Object(mut map) => {
                if map.get("id").is_none_or(serde_json::Value::is_null) {
                    map.insert("id".to_string(), serde_json::Value::from(index + 1));
                }
                Some(Record::from(map))
            }
            _ => None,
        })
        .collect()
}

/// Declares one sortable, draggable column per field seen in `rows`.
///
/// `id` comes first when present; other fields keep first-seen order.
pub fn infer_columns(rows: &[Record]) -> Vec<Column> {
    let mut keys: Vec<String> = Vec::new();
    for row in rows {
        for key in row.keys() {
            if !keys.iter().any(|k| k == key) {
                keys.push(key.to_string());
            }
        }
    }
    if let Some(pos) = keys.iter().position(|k| k == "id") {
        let id = keys.remove(pos);
        keys.insert(0, id);
    }
    keys.into_iter()
        .map(|key| Column::new(key.clone(), key).sortable().draggable())
        .collect()
}

/// Parses `FIELD=VALUE` (substring) or `FIELD==VALUE` (exact).
pub fn parse_filter(raw: &str) -> Result<(String, FilterValue)> {
    let Some((field, value)) = raw.split_once('=') else {
        return Err(CliError::InvalidFilter(raw.to_string()));
    };
    let field = field.trim();
    if field.is_empty() {
        return Err(CliError::InvalidFilter(raw.to_string()));
    }
    let value = match value.strip_prefix('=') {
        Some(exact) => FilterValue::choice(exact),
        None => FilterValue::text(value),
    };
    Ok((field.to_string(), value))
}

/// Parses `KEY`, `KEY:asc`, or `KEY:desc`.
pub fn parse_sort(raw: &str) -> Result<Sort> {
    let (key, direction) = raw.split_once(':').unwrap_or((raw, "asc"));
    let key = key.trim();
    if key.is_empty() {
        return Err(CliError::InvalidSort(raw.to_string()));
    }
    match direction.trim().to_ascii_lowercase().as_str() {
        "asc" => Ok(Sort::ascending(key)),
        "desc" => Ok(Sort::descending(key)),
        _ => Err(CliError::InvalidSort(raw.to_string())),
    }
}
