use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use common::models::{EventObservation, Maintainer};
use common::Error;
use github::RosterClient;
use search::SearchClient;
use serde_json::json;

use crate::maintainer::{
    inactivity_threshold, parse_event, MaintainerMetricsPipeline, ANY_EVENT_TYPE,
};

fn make_pipeline(run_at: DateTime<Utc>) -> MaintainerMetricsPipeline {
    let search = Arc::new(SearchClient::new("http://localhost:9200", None, None));
    let roster = RosterClient::new("test-org");
    MaintainerMetricsPipeline::new(search, roster, run_at)
}

fn make_maintainer() -> Maintainer {
    Maintainer {
        repository: "OpenSearch".to_string(),
        name: "Jane Doe".to_string(),
        github_login: "janedoe".to_string(),
        affiliation: "Acme".to_string(),
    }
}

fn observation(occurred_at: DateTime<Utc>) -> EventObservation {
    EventObservation {
        action: "created".to_string(),
        occurred_at,
    }
}

// inactivity_threshold tests

#[test]
fn test_threshold_most_active_repo_gets_lower_bound() {
    let threshold = inactivity_threshold(100, 0, 100).unwrap();
    assert_eq!(threshold, Duration::days(90));
}

#[test]
fn test_threshold_least_active_repo_gets_upper_bound() {
    let threshold = inactivity_threshold(100, 0, 0).unwrap();
    assert_eq!(threshold, Duration::days(365));
}

#[test]
fn test_threshold_midpoint_is_linear() {
    // Halfway between 90 and 365 days: 227.5 days.
    let threshold = inactivity_threshold(100, 0, 50).unwrap();
    assert_eq!(threshold.num_hours(), 227 * 24 + 12);
}

#[test]
fn test_threshold_interpolates_against_nonzero_floor() {
    let threshold = inactivity_threshold(300, 100, 200).unwrap();
    assert_eq!(threshold.num_hours(), 227 * 24 + 12);
}

#[test]
fn test_threshold_survives_very_large_event_counts() {
    // Billions of events must not overflow the interpolation arithmetic.
    let threshold = inactivity_threshold(10_000_000_000, 0, 5_000_000_000).unwrap();
    assert_eq!(threshold.num_hours(), 227 * 24 + 12);
}

#[test]
fn test_threshold_zero_spread_is_config_error() {
    match inactivity_threshold(42, 42, 42) {
        Err(Error::Config(_)) => {}
        other => panic!("expected config error, got {:?}", other),
    }
}

// maintainer_records tests

#[test]
fn test_records_one_per_type_plus_composite() {
    let run_at = Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap();
    let pipeline = make_pipeline(run_at);
    let observations = vec![
        ("IssueCommentEvent".to_string(), Some(observation(run_at - Duration::days(2)))),
        ("PullRequestEvent".to_string(), None),
    ];
    let records = pipeline
        .maintainer_records("OpenSearch", &make_maintainer(), &observations, Duration::days(90))
        .unwrap();

    assert_eq!(records.len(), 3);
    assert_eq!(records[0].event_type, "IssueCommentEvent");
    assert_eq!(records[1].event_type, "PullRequestEvent");
    assert_eq!(records[2].event_type, ANY_EVENT_TYPE);

    let mut ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 3);
}

#[test]
fn test_composite_carries_max_timestamp() {
    let run_at = Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap();
    let pipeline = make_pipeline(run_at);
    let older = run_at - Duration::days(30);
    let newer = run_at - Duration::days(3);
    let observations = vec![
        ("IssueCommentEvent".to_string(), Some(observation(older))),
        ("PullRequestEvent".to_string(), Some(observation(newer))),
        ("PushEvent".to_string(), None),
    ];
    let records = pipeline
        .maintainer_records("OpenSearch", &make_maintainer(), &observations, Duration::days(90))
        .unwrap();

    let composite = records.last().unwrap();
    assert_eq!(composite.event_type, ANY_EVENT_TYPE);
    assert_eq!(composite.time_last_engaged, Some(newer));
    let max = records
        .iter()
        .filter(|r| r.event_type != ANY_EVENT_TYPE)
        .filter_map(|r| r.time_last_engaged)
        .max();
    assert_eq!(composite.time_last_engaged, max);
}

#[test]
fn test_no_evidence_means_inactive_without_timestamp() {
    let run_at = Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap();
    let pipeline = make_pipeline(run_at);
    let observations = vec![("PullRequestEvent".to_string(), None)];
    let records = pipeline
        .maintainer_records("OpenSearch", &make_maintainer(), &observations, Duration::days(90))
        .unwrap();

    for record in &records {
        assert!(record.inactive);
        assert!(record.event_action.is_none());
        assert!(record.time_last_engaged.is_none());
    }
}

#[test]
fn test_inactive_flag_respects_threshold() {
    let run_at = Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap();
    let pipeline = make_pipeline(run_at);
    let observations = vec![
        ("IssueCommentEvent".to_string(), Some(observation(run_at - Duration::days(100)))),
        ("PullRequestEvent".to_string(), Some(observation(run_at - Duration::days(10)))),
    ];
    let records = pipeline
        .maintainer_records("OpenSearch", &make_maintainer(), &observations, Duration::days(90))
        .unwrap();

    assert!(records[0].inactive, "engagement beyond threshold is inactive");
    assert!(!records[1].inactive, "recent engagement is active");
    // Composite follows the most recent engagement.
    assert!(!records[2].inactive);
}

#[test]
fn test_records_are_idempotent_across_same_day_runs() {
    let morning = Utc.with_ymd_and_hms(2026, 3, 14, 1, 0, 0).unwrap();
    let evening = Utc.with_ymd_and_hms(2026, 3, 14, 22, 0, 0).unwrap();
    let observations = vec![("PullRequestEvent".to_string(), None)];

    let first = make_pipeline(morning)
        .maintainer_records("OpenSearch", &make_maintainer(), &observations, Duration::days(90))
        .unwrap();
    let second = make_pipeline(evening)
        .maintainer_records("OpenSearch", &make_maintainer(), &observations, Duration::days(90))
        .unwrap();

    let first_ids: Vec<&str> = first.iter().map(|r| r.id.as_str()).collect();
    let second_ids: Vec<&str> = second.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(first_ids, second_ids);
}

// parse_event tests

#[test]
fn test_parse_event_document() {
    let doc = json!({ "action": "opened", "created_at": "2026-03-10T08:30:00Z" });
    let event = parse_event(&doc).unwrap();
    assert_eq!(event.action, "opened");
    assert_eq!(
        event.occurred_at,
        Utc.with_ymd_and_hms(2026, 3, 10, 8, 30, 0).unwrap()
    );
}

#[test]
fn test_parse_event_missing_fields() {
    assert!(parse_event(&json!({ "created_at": "2026-03-10T08:30:00Z" })).is_err());
    assert!(parse_event(&json!({ "action": "opened" })).is_err());
    assert!(parse_event(&json!({ "action": "opened", "created_at": "not a date" })).is_err());
}
