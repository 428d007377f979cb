//! Domain models
//!
//! Records written to the search backend serialize with snake_case JSON
//! field names; those names are part of the dashboard contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One count observation of a general metric for a repository
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricRecord {
    pub id: String,
    pub repository: String,
    pub metric_name: String,
    pub metric_count: u64,
    pub current_date: DateTime<Utc>,
}

/// Per-label issue and pull request counts for a repository
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelRecord {
    pub id: String,
    pub repository: String,
    pub current_date: DateTime<Utc>,
    pub label_name: String,
    pub label_issue_count: u64,
    pub label_pull_count: u64,
}

/// Wide per-(version, repository) release snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseRecord {
    pub id: String,
    pub repository: String,
    pub component: String,
    pub current_date: DateTime<Utc>,
    pub release_version: String,
    /// Duplicate of `release_version` kept for the dashboard field contract
    pub version: String,
    pub release_state: String,
    pub issues_open: u64,
    pub autocut_issues_open: u64,
    pub issues_closed: u64,
    pub pulls_open: u64,
    pub pulls_closed: u64,
    pub version_increment: String,
    pub release_notes: Option<String>,
    pub release_branch: Option<String>,
    pub release_owners: Vec<String>,
    /// Derived: true iff `release_owners` is non-empty
    pub release_owner_exists: bool,
    pub release_issue: Option<String>,
    /// Derived: true iff `release_issue` is a non-empty reference
    pub release_issue_exists: bool,
}

/// Latest engagement of one maintainer in one event type.
///
/// The composite "any event type" record reuses this shape with
/// `event_type == "Any"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintainerRecord {
    pub id: String,
    pub repository: String,
    pub event_type: String,
    pub name: String,
    pub github_login: String,
    pub affiliation: String,
    pub event_action: Option<String>,
    pub time_last_engaged: Option<DateTime<Utc>>,
    pub inactive: bool,
}

/// One maintainer roster row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Maintainer {
    pub repository: String,
    pub name: String,
    pub github_login: String,
    pub affiliation: String,
}

/// Transient latest-event query result; consumed immediately, never persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventObservation {
    pub action: String,
    pub occurred_at: DateTime<Utc>,
}
