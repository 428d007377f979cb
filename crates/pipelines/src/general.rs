//! General metrics pipeline
//!
//! Cross product of {repository} x {registered metric}: one count record per
//! pair, flushed as a single bulk upsert.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use common::identity::{record_id, NS_GENERAL};
use common::models::MetricRecord;
use common::Result;
use search::SearchClient;
use tracing::{debug, info};

use crate::registry::GeneralMetric;
use crate::to_json;

/// Target index for general metric records
pub const GENERAL_METRICS_INDEX: &str = "github_general_metrics";

pub struct GeneralMetricsPipeline {
    search: Arc<SearchClient>,
    run_at: DateTime<Utc>,
}

impl GeneralMetricsPipeline {
    pub fn new(search: Arc<SearchClient>, run_at: DateTime<Utc>) -> Self {
        Self { search, run_at }
    }

    /// Compute and flush all general metrics for the given repositories
    pub async fn run(&self, repositories: &[String]) -> Result<()> {
        let records = self.collect(repositories).await?;
        self.search
            .ensure_index(GENERAL_METRICS_INDEX)
            .await
            .map_err(|e| common::Error::Backend(e.to_string()))?;
        self.search
            .bulk_upsert(GENERAL_METRICS_INDEX, &records)
            .await
            .map_err(|e| common::Error::Backend(e.to_string()))?;
        Ok(())
    }

    async fn collect(&self, repositories: &[String]) -> Result<BTreeMap<String, String>> {
        let mut records = BTreeMap::new();
        for repo in repositories {
            for metric in GeneralMetric::ALL {
                let count = self
                    .search
                    .count(metric.index(), &metric.query(repo))
                    .await
                    .map_err(|e| common::Error::Backend(e.to_string()))?;
                debug!("{} for {}: {}", metric.name(), repo, count);
                let record = MetricRecord {
                    id: record_id(NS_GENERAL, metric.name(), self.run_at, repo)?,
                    repository: repo.clone(),
                    metric_name: metric.name().to_string(),
                    metric_count: count,
                    current_date: self.run_at,
                };
                records.insert(record.id.clone(), to_json(&record)?);
            }
        }
        info!(
            "Computed {} general metric records across {} repositories",
            records.len(),
            repositories.len()
        );
        Ok(records)
    }
}
