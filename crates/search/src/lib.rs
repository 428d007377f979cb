//! Query execution gateway for the search backend
//!
//! Thin HTTP layer over an OpenSearch-compatible cluster: boolean-filtered
//! counts, terms and top-hits aggregations, index creation, and idempotent
//! bulk upserts keyed by record ID. Any backend failure is fatal to the
//! calling pipeline run; no retries happen here.

pub mod client;
pub mod query;

pub use client::{SearchClient, SearchError};
pub use query::BoolQuery;
