//! Label metrics pipeline
//!
//! Per repository, one terms aggregation per source index keyed by label
//! name; the issue and pull sides are merged so every label carries both
//! counts, with 0 for the side it does not appear on.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use common::identity::{record_id, NS_LABEL};
use common::models::LabelRecord;
use common::Result;
use search::{BoolQuery, SearchClient};
use tracing::info;

use crate::{to_json, ISSUES_INDEX, PULLS_INDEX};

/// Target index for label metric records
pub const LABEL_METRICS_INDEX: &str = "github_label_metrics";

/// Bucket bound for per-repository label aggregations
const MAX_LABELS: u32 = 1000;

pub struct LabelMetricsPipeline {
    search: Arc<SearchClient>,
    run_at: DateTime<Utc>,
}

impl LabelMetricsPipeline {
    pub fn new(search: Arc<SearchClient>, run_at: DateTime<Utc>) -> Self {
        Self { search, run_at }
    }

    /// Compute and flush per-label counts for the given repositories
    pub async fn run(&self, repositories: &[String]) -> Result<()> {
        let records = self.collect(repositories).await?;
        self.search
            .ensure_index(LABEL_METRICS_INDEX)
            .await
            .map_err(|e| common::Error::Backend(e.to_string()))?;
        self.search
            .bulk_upsert(LABEL_METRICS_INDEX, &records)
            .await
            .map_err(|e| common::Error::Backend(e.to_string()))?;
        Ok(())
    }

    async fn collect(&self, repositories: &[String]) -> Result<BTreeMap<String, String>> {
        let mut records = BTreeMap::new();
        for repo in repositories {
            let repo_query = BoolQuery::new().must_term("repository.keyword", repo);
            let issue_counts = self
                .search
                .filtered_terms_counts(ISSUES_INDEX, &repo_query, "issue_labels.keyword", MAX_LABELS)
                .await
                .map_err(|e| common::Error::Backend(e.to_string()))?;
            let pull_counts = self
                .search
                .filtered_terms_counts(PULLS_INDEX, &repo_query, "pull_labels.keyword", MAX_LABELS)
                .await
                .map_err(|e| common::Error::Backend(e.to_string()))?;

            for (label, (issue_count, pull_count)) in merge_label_counts(issue_counts, pull_counts)
            {
                let record = LabelRecord {
                    id: record_id(NS_LABEL, &label, self.run_at, repo)?,
                    repository: repo.clone(),
                    current_date: self.run_at,
                    label_name: label,
                    label_issue_count: issue_count,
                    label_pull_count: pull_count,
                };
                records.insert(record.id.clone(), to_json(&record)?);
            }
        }
        info!("Computed {} label metric records", records.len());
        Ok(records)
    }
}

/// Join per-label issue and pull counts; a label missing on one side gets 0
pub fn merge_label_counts(
    issues: Vec<(String, u64)>,
    pulls: Vec<(String, u64)>,
) -> BTreeMap<String, (u64, u64)> {
    let mut merged: BTreeMap<String, (u64, u64)> = BTreeMap::new();
    for (label, count) in issues {
        merged.entry(label).or_default().0 = count;
    }
    for (label, count) in pulls {
        merged.entry(label).or_default().1 = count;
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_label_counts_both_sides() {
        let merged = merge_label_counts(
            vec![("bug".to_string(), 3)],
            vec![("bug".to_string(), 5)],
        );
        assert_eq!(merged.get("bug"), Some(&(3, 5)));
    }

    #[test]
    fn test_merge_label_counts_missing_side_is_zero() {
        let merged = merge_label_counts(
            vec![("bug".to_string(), 3)],
            vec![("enhancement".to_string(), 2)],
        );
        assert_eq!(merged.get("bug"), Some(&(3, 0)));
        assert_eq!(merged.get("enhancement"), Some(&(0, 2)));
    }

    #[test]
    fn test_merge_label_counts_empty() {
        assert!(merge_label_counts(Vec::new(), Vec::new()).is_empty());
    }
}
