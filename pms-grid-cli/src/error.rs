//! CLI error types

use std::path::PathBuf;

use pms_grid_lib::error::{Error as TableError, FetchError, StoreError};

/// Anything that stops `pms-grid` from printing a table.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0} must contain an array of objects, or an object with a \"data\" array")]
    NotRows(PathBuf),

    #[error("Invalid filter {0:?}; expected FIELD=VALUE or FIELD==VALUE")]
    InvalidFilter(String),

    #[error("Invalid sort {0:?}; expected KEY, KEY:asc, or KEY:desc")]
    InvalidSort(String),

    #[error("--url needs --config to declare the table's columns")]
    MissingConfig,

    #[error("Either --file or --url is required")]
    MissingSource,

    #[error("Could not create {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, CliError>;
