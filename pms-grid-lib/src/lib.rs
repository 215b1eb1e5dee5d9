//! Reusable list/table controller for admin dashboards.
//!
//! Consolidates the search, filter, pagination, selection, and column layout
//! state that every table-bearing page needs, and orchestrates page fetches
//! against a pluggable [`fetch::PageFetcher`] with last-request-wins semantics.

pub mod column;
pub mod config;
pub mod error;
pub mod fetch;
pub mod filter;
pub mod model;
pub mod pagination;
pub mod selection;
pub mod sort;
pub mod store;

mod controller;

pub use controller::*;
