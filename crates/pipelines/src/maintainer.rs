//! Maintainer engagement pipeline
//!
//! Per repository: fetch the maintainer roster, cross-join with the globally
//! discovered event types, look up each maintainer's latest event per type,
//! and score inactivity against a threshold interpolated by the repository's
//! relative activity. Each maintainer additionally gets one composite record
//! (event type "Any") carrying their most recent engagement across all
//! types.
//!
//! The global most/least per-repository event counts and the event-type set
//! are computed once per run; the interpolation formula requires a stable
//! global scale across all repositories of the run.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use common::identity::{record_id, NS_MAINTAINER};
use common::models::{EventObservation, Maintainer, MaintainerRecord};
use common::{Error, Result};
use github::RosterClient;
use search::{BoolQuery, SearchClient};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{to_json, EVENTS_INDEX};

/// Target index for maintainer engagement records
pub const MAINTAINER_ENGAGEMENT_INDEX: &str = "maintainer_engagement";

/// Event type of the per-maintainer composite record
pub const ANY_EVENT_TYPE: &str = "Any";

/// Bucket bound for event-type discovery
const MAX_EVENT_TYPES: u32 = 500;

pub struct MaintainerMetricsPipeline {
    search: Arc<SearchClient>,
    roster: RosterClient,
    run_at: DateTime<Utc>,
}

impl MaintainerMetricsPipeline {
    pub fn new(search: Arc<SearchClient>, roster: RosterClient, run_at: DateTime<Utc>) -> Self {
        Self {
            search,
            roster,
            run_at,
        }
    }

    /// Compute and flush engagement records for the given repositories
    pub async fn run(&self, repositories: &[String]) -> Result<()> {
        let records = self.collect(repositories).await?;
        self.search
            .ensure_index(MAINTAINER_ENGAGEMENT_INDEX)
            .await
            .map_err(|e| Error::Backend(e.to_string()))?;
        self.search
            .bulk_upsert(MAINTAINER_ENGAGEMENT_INDEX, &records)
            .await
            .map_err(|e| Error::Backend(e.to_string()))?;
        Ok(())
    }

    async fn collect(&self, repositories: &[String]) -> Result<BTreeMap<String, String>> {
        // Global aggregates, computed exactly once per run.
        let (most_count, least_count) = self
            .search
            .extreme_bucket_counts(EVENTS_INDEX, "repository.keyword")
            .await
            .map_err(|e| Error::Backend(e.to_string()))?;
        let event_types = self.event_types().await?;
        info!(
            "Engagement run: {} event types, repo event counts span {}..{}",
            event_types.len(),
            least_count,
            most_count
        );

        let mut records = BTreeMap::new();
        for repo in repositories {
            let repo_count = self.repo_event_count(repo).await?;
            let threshold = inactivity_threshold(most_count, least_count, repo_count)?;
            let maintainers = self.roster.repo_maintainers(repo).await;
            if maintainers.is_empty() {
                warn!("No maintainers found for {}", repo);
                continue;
            }
            debug!(
                "{}: {} maintainers, inactivity threshold {} days",
                repo,
                maintainers.len(),
                threshold.num_days()
            );
            for maintainer in &maintainers {
                let mut observations = Vec::with_capacity(event_types.len());
                for event_type in &event_types {
                    let observation = self
                        .latest_event(repo, &maintainer.github_login, event_type)
                        .await?;
                    observations.push((event_type.clone(), observation));
                }
                for record in
                    self.maintainer_records(repo, maintainer, &observations, threshold)?
                {
                    records.insert(record.id.clone(), to_json(&record)?);
                }
            }
        }
        Ok(records)
    }

    /// Distinct engagement event types across all repositories, most frequent
    /// first
    async fn event_types(&self) -> Result<Vec<String>> {
        let buckets = self
            .search
            .terms_counts(EVENTS_INDEX, "type.keyword", MAX_EVENT_TYPES)
            .await
            .map_err(|e| Error::Backend(e.to_string()))?;
        Ok(buckets.into_iter().map(|(key, _)| key).collect())
    }

    /// Total engagement events recorded for `repo`
    async fn repo_event_count(&self, repo: &str) -> Result<u64> {
        let query = BoolQuery::new().must_term("repository.keyword", repo);
        self.search
            .count(EVENTS_INDEX, &query)
            .await
            .map_err(|e| Error::Backend(e.to_string()))
    }

    /// Most recent event of `event_type` by `login` in `repo`, if any
    async fn latest_event(
        &self,
        repo: &str,
        login: &str,
        event_type: &str,
    ) -> Result<Option<EventObservation>> {
        let query = BoolQuery::new()
            .must_term("repository.keyword", repo)
            .must_term("actor.keyword", login)
            .must_term("type.keyword", event_type);
        let hit = self
            .search
            .top_hit(EVENTS_INDEX, &query, "created_at")
            .await
            .map_err(|e| Error::Backend(e.to_string()))?;
        hit.map(|doc| parse_event(&doc)).transpose()
    }

    /// One record per event type for this maintainer, plus the composite
    /// "Any" record carrying their most recent engagement overall
    pub(crate) fn maintainer_records(
        &self,
        repo: &str,
        maintainer: &Maintainer,
        observations: &[(String, Option<EventObservation>)],
        threshold: Duration,
    ) -> Result<Vec<MaintainerRecord>> {
        let cutoff = self.run_at - threshold;
        let mut records = Vec::with_capacity(observations.len() + 1);
        let mut latest: Option<EventObservation> = None;

        for (event_type, observation) in observations {
            let mut record = MaintainerRecord {
                id: record_id(
                    NS_MAINTAINER,
                    &format!("{}-{}", maintainer.github_login, event_type),
                    self.run_at,
                    repo,
                )?,
                repository: repo.to_string(),
                event_type: event_type.clone(),
                name: maintainer.name.clone(),
                github_login: maintainer.github_login.clone(),
                affiliation: maintainer.affiliation.clone(),
                event_action: None,
                time_last_engaged: None,
                // No evidence of engagement means inactive.
                inactive: true,
            };
            if let Some(observation) = observation {
                record.event_action = Some(observation.action.clone());
                record.time_last_engaged = Some(observation.occurred_at);
                record.inactive = observation.occurred_at < cutoff;
                if latest
                    .as_ref()
                    .map(|l| observation.occurred_at > l.occurred_at)
                    .unwrap_or(true)
                {
                    latest = Some(observation.clone());
                }
            }
            records.push(record);
        }

        let mut composite = MaintainerRecord {
            id: record_id(
                NS_MAINTAINER,
                &format!("{}-{}", maintainer.github_login, ANY_EVENT_TYPE),
                self.run_at,
                repo,
            )?,
            repository: repo.to_string(),
            event_type: ANY_EVENT_TYPE.to_string(),
            name: maintainer.name.clone(),
            github_login: maintainer.github_login.clone(),
            affiliation: maintainer.affiliation.clone(),
            event_action: None,
            time_last_engaged: None,
            inactive: true,
        };
        if let Some(latest) = latest {
            composite.event_action = Some(latest.action);
            composite.time_last_engaged = Some(latest.occurred_at);
            composite.inactive = latest.occurred_at < cutoff;
        }
        records.push(composite);
        Ok(records)
    }
}

/// Inactivity window for a repository, interpolated by its activity rank.
///
/// The single most active repository gets the 90 day lower bound, the least
/// active gets the 365 day upper bound, and every other repository sits
/// proportionally between by event count. A zero count spread makes the
/// interpolation undefined and is a configuration error, not a silent
/// division.
pub fn inactivity_threshold(
    most_count: u64,
    least_count: u64,
    repo_count: u64,
) -> Result<Duration> {
    let lower_bound = Duration::days(90);
    let upper_bound = Duration::days(365);

    let count_span = most_count.saturating_sub(least_count);
    if count_span == 0 {
        return Err(Error::Config(
            "zero event-count spread across repositories; inactivity threshold is undefined"
                .to_string(),
        ));
    }
    let count_gap = most_count.saturating_sub(repo_count);
    let bound_span_ms = (upper_bound - lower_bound).num_milliseconds();
    // Widened so the product cannot overflow for any event-count gap.
    let to_add_ms = bound_span_ms as i128 * count_gap as i128 / count_span as i128;
    Ok(lower_bound + Duration::milliseconds(to_add_ms as i64))
}

pub(crate) fn parse_event(doc: &Value) -> Result<EventObservation> {
    let action = doc
        .get("action")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::Backend("event document missing action".to_string()))?;
    let created_at = doc
        .get("created_at")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::Backend("event document missing created_at".to_string()))?;
    let occurred_at = DateTime::parse_from_rfc3339(created_at)
        .map_err(|e| Error::Backend(format!("bad event timestamp {:?}: {}", created_at, e)))?
        .with_timezone(&Utc);
    Ok(EventObservation {
        action: action.to_string(),
        occurred_at,
    })
}
