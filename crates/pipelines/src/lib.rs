//! Metrics aggregation pipelines
//!
//! Each pipeline fans out over repositories, accumulates records keyed by
//! their deterministic ID, and flushes the whole mapping to its target index
//! in one bulk upsert. Pipelines never retry; a run that fails is safe to
//! re-invoke because record identity makes every write an overwrite.

use serde::Serialize;

pub mod general;
pub mod labels;
pub mod maintainer;
pub mod registry;
pub mod release;
pub mod release_inputs;

#[cfg(test)]
mod maintainer_test;

pub use general::GeneralMetricsPipeline;
pub use labels::LabelMetricsPipeline;
pub use maintainer::MaintainerMetricsPipeline;
pub use release::ReleaseMetricsPipeline;

/// Source index of pull request documents
pub const PULLS_INDEX: &str = "github_pulls";
/// Source index of issue documents
pub const ISSUES_INDEX: &str = "github_issues";
/// Source index of engagement event documents
pub const EVENTS_INDEX: &str = "github_events";

/// Serialize a record for bulk upsert
pub(crate) fn to_json<T: Serialize>(record: &T) -> common::Result<String> {
    serde_json::to_string(record)
        .map_err(|e| common::Error::Backend(format!("failed to serialize record: {}", e)))
}
