//! Release metrics pipeline
//!
//! For every tracked release version, resolves the participating
//! repositories and assembles one wide record per (version, repository) from
//! independent lookups: issue and pull counts for the version label, the
//! version-increment classification, release notes, branch, owners, and the
//! tracking issue. Any lookup failure aborts the whole run; partial records
//! are never written.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use common::identity::{record_id, NS_RELEASE};
use common::models::ReleaseRecord;
use common::Result;
use search::{BoolQuery, SearchClient};
use serde_json::Value;
use tracing::info;

use crate::release_inputs::ReleaseInput;
use crate::{to_json, ISSUES_INDEX, PULLS_INDEX};

/// Target index for release metric records
pub const RELEASE_METRICS_INDEX: &str = "github_release_metrics";

/// Source index mapping release versions to repositories, components,
/// branches, and owners
pub const RELEASE_COMPONENTS_INDEX: &str = "github_release_components";

/// Source index of per-release release-notes documents
pub const RELEASE_NOTES_INDEX: &str = "github_release_notes";

pub struct ReleaseMetricsPipeline {
    search: Arc<SearchClient>,
    run_at: DateTime<Utc>,
}

impl ReleaseMetricsPipeline {
    pub fn new(search: Arc<SearchClient>, run_at: DateTime<Utc>) -> Self {
        Self { search, run_at }
    }

    /// Compute and flush release metrics for all tracked release versions
    pub async fn run(&self) -> Result<()> {
        let records = self.collect().await?;
        self.search
            .ensure_index(RELEASE_METRICS_INDEX)
            .await
            .map_err(|e| common::Error::Backend(e.to_string()))?;
        self.search
            .bulk_upsert(RELEASE_METRICS_INDEX, &records)
            .await
            .map_err(|e| common::Error::Backend(e.to_string()))?;
        Ok(())
    }

    async fn collect(&self) -> Result<BTreeMap<String, String>> {
        let mut records = BTreeMap::new();
        for input in ReleaseInput::tracked() {
            let repos = self.release_repos(input.version).await?;
            info!(
                "Release {}: {} participating repositories",
                input.version,
                repos.len()
            );
            for (repo, component) in repos {
                let record = self.build_record(input, &repo, component).await?;
                records.insert(record.id.clone(), to_json(&record)?);
            }
        }
        Ok(records)
    }

    async fn build_record(
        &self,
        input: &ReleaseInput,
        repo: &str,
        component: String,
    ) -> Result<ReleaseRecord> {
        let owners = self.release_owners(input.version, repo).await?;
        let issue = self.release_issue(input.version, repo).await?;
        Ok(ReleaseRecord {
            id: record_id(NS_RELEASE, input.version, self.run_at, repo)?,
            repository: repo.to_string(),
            component,
            current_date: self.run_at,
            release_version: input.version.to_string(),
            version: input.version.to_string(),
            release_state: input.state.to_string(),
            issues_open: self
                .release_label_issues(input.version, repo, "open", false)
                .await?,
            autocut_issues_open: self
                .release_label_issues(input.version, repo, "open", true)
                .await?,
            issues_closed: self
                .release_label_issues(input.version, repo, "closed", false)
                .await?,
            pulls_open: self.release_label_pulls(input.version, repo, "open").await?,
            pulls_closed: self
                .release_label_pulls(input.version, repo, "closed")
                .await?,
            version_increment: version_increment(input.version).to_string(),
            release_notes: self.release_notes(input.version, repo).await?,
            release_branch: self.release_branch(input.version, repo).await?,
            release_owner_exists: owner_exists(&owners),
            release_owners: owners,
            release_issue_exists: issue_exists(issue.as_deref()),
            release_issue: issue,
        })
    }

    /// Participating repositories of a release version with their component
    /// names
    async fn release_repos(&self, version: &str) -> Result<BTreeMap<String, String>> {
        let version_query = BoolQuery::new().must_term("version.keyword", version);
        let repos = self
            .search
            .filtered_terms_counts(
                RELEASE_COMPONENTS_INDEX,
                &version_query,
                "repository.keyword",
                1000,
            )
            .await
            .map_err(|e| common::Error::Backend(e.to_string()))?;

        let mut components = BTreeMap::new();
        for (repo, _) in repos {
            let component = self
                .component_field(version, &repo, "component")
                .await?
                .unwrap_or_else(|| repo.clone());
            components.insert(repo, component);
        }
        Ok(components)
    }

    /// Issues carrying the release version label, by state; `autocut` narrows
    /// to automatically cut issues
    async fn release_label_issues(
        &self,
        version: &str,
        repo: &str,
        state: &str,
        autocut: bool,
    ) -> Result<u64> {
        let mut query = BoolQuery::new()
            .must_term("repository.keyword", repo)
            .must_term("issue_labels.keyword", &format!("v{}", version))
            .must_term("state.keyword", state);
        if autocut {
            query = query.must_term("issue_labels.keyword", "autocut");
        }
        self.search
            .count(ISSUES_INDEX, &query)
            .await
            .map_err(|e| common::Error::Backend(e.to_string()))
    }

    /// Pull requests carrying the release version label, by state
    async fn release_label_pulls(&self, version: &str, repo: &str, state: &str) -> Result<u64> {
        let query = BoolQuery::new()
            .must_term("repository.keyword", repo)
            .must_term("pull_labels.keyword", &format!("v{}", version))
            .must_term("state.keyword", state);
        self.search
            .count(PULLS_INDEX, &query)
            .await
            .map_err(|e| common::Error::Backend(e.to_string()))
    }

    /// Free-text release notes for (version, repo), if published
    async fn release_notes(&self, version: &str, repo: &str) -> Result<Option<String>> {
        let query = BoolQuery::new()
            .must_term("repository.keyword", repo)
            .must_term("version.keyword", version);
        let hit = self
            .search
            .top_hit(RELEASE_NOTES_INDEX, &query, "created_at")
            .await
            .map_err(|e| common::Error::Backend(e.to_string()))?;
        Ok(hit.and_then(|doc| string_field(&doc, "release_notes")))
    }

    /// Release branch recorded for (version, repo), if any
    async fn release_branch(&self, version: &str, repo: &str) -> Result<Option<String>> {
        self.component_field(version, repo, "release_branch").await
    }

    /// Release owners recorded for (version, repo); empty when unassigned
    async fn release_owners(&self, version: &str, repo: &str) -> Result<Vec<String>> {
        let query = BoolQuery::new()
            .must_term("repository.keyword", repo)
            .must_term("version.keyword", version);
        let hit = self
            .search
            .top_hit(RELEASE_COMPONENTS_INDEX, &query, "updated_at")
            .await
            .map_err(|e| common::Error::Backend(e.to_string()))?;
        Ok(hit
            .and_then(|doc| doc.get("owners").cloned())
            .and_then(|owners| match owners {
                Value::Array(items) => Some(
                    items
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect(),
                ),
                _ => None,
            })
            .unwrap_or_default())
    }

    /// Reference to the release tracking issue, if one was opened
    async fn release_issue(&self, version: &str, repo: &str) -> Result<Option<String>> {
        let query = BoolQuery::new()
            .must_term("repository.keyword", repo)
            .must_term("title.keyword", &format!("[RELEASE] Release version {}", version));
        let hit = self
            .search
            .top_hit(ISSUES_INDEX, &query, "created_at")
            .await
            .map_err(|e| common::Error::Backend(e.to_string()))?;
        Ok(hit.and_then(|doc| string_field(&doc, "html_url")))
    }

    async fn component_field(
        &self,
        version: &str,
        repo: &str,
        field: &str,
    ) -> Result<Option<String>> {
        let query = BoolQuery::new()
            .must_term("repository.keyword", repo)
            .must_term("version.keyword", version);
        let hit = self
            .search
            .top_hit(RELEASE_COMPONENTS_INDEX, &query, "updated_at")
            .await
            .map_err(|e| common::Error::Backend(e.to_string()))?;
        Ok(hit.and_then(|doc| string_field(&doc, field)))
    }
}

/// Classify a semantic version string as a major, minor, or patch increment
pub fn version_increment(version: &str) -> &'static str {
    let mut parts = version.split('.');
    let _major = parts.next();
    let minor = parts.next().and_then(|p| p.parse::<u64>().ok());
    let patch = parts.next().and_then(|p| p.parse::<u64>().ok());
    match (minor, patch) {
        (_, Some(p)) if p > 0 => "patch",
        (Some(m), _) if m > 0 => "minor",
        _ => "major",
    }
}

/// Derived flag: a release has owners iff the owner list is non-empty
pub fn owner_exists(owners: &[String]) -> bool {
    !owners.is_empty()
}

/// Derived flag: a tracking issue exists iff its reference is non-empty
pub fn issue_exists(issue: Option<&str>) -> bool {
    issue.is_some_and(|i| !i.is_empty())
}

fn string_field(doc: &Value, field: &str) -> Option<String> {
    doc.get(field).and_then(Value::as_str).map(str::to_string)
}
