//! Deterministic record identity
//!
//! Every record written back to the search backend is keyed by a name-based
//! (SHA-1) UUID over its pipeline namespace, entity key, run date, and
//! repository. Re-running a pipeline on the same day therefore overwrites
//! the previous records instead of duplicating them.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Fixed namespace UUID under which all record IDs are derived.
const RECORD_NAMESPACE: Uuid = Uuid::from_bytes([
    0x8f, 0x1c, 0x2a, 0x5d, 0x6b, 0x3e, 0x4f, 0x90, 0xa1, 0xd2, 0x7c, 0x44, 0x19, 0xee, 0x03, 0x57,
]);

/// Pipeline namespace for the general metrics pipeline.
pub const NS_GENERAL: &str = "general-metrics";
/// Pipeline namespace for the label metrics pipeline.
pub const NS_LABEL: &str = "label-metrics";
/// Pipeline namespace for the release metrics pipeline.
pub const NS_RELEASE: &str = "release-metrics";
/// Pipeline namespace for the maintainer engagement pipeline.
pub const NS_MAINTAINER: &str = "maintainer-engagement";

/// Derive the deterministic record ID for (namespace, entity key, date, repo).
///
/// The date contributes only its `YYYY-MM-DD` component, so all records of a
/// run share one identity date. Empty namespace or repository would collapse
/// unrelated keys onto each other, so both are rejected.
pub fn record_id(
    namespace: &str,
    entity_key: &str,
    date: DateTime<Utc>,
    repository: &str,
) -> Result<String> {
    if namespace.is_empty() {
        return Err(Error::Hashing("empty identity namespace".to_string()));
    }
    if repository.is_empty() {
        return Err(Error::Hashing("empty repository in identity key".to_string()));
    }
    let key = format!(
        "{}-{}-{}-{}",
        namespace,
        entity_key,
        date.format("%Y-%m-%d"),
        repository
    );
    Ok(Uuid::new_v5(&RECORD_NAMESPACE, key.as_bytes()).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_record_id_deterministic() {
        let date = Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap();
        let a = record_id(NS_GENERAL, "Open Issues", date, "OpenSearch").unwrap();
        let b = record_id(NS_GENERAL, "Open Issues", date, "OpenSearch").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_record_id_ignores_time_of_day() {
        let morning = Utc.with_ymd_and_hms(2026, 3, 14, 1, 0, 0).unwrap();
        let evening = Utc.with_ymd_and_hms(2026, 3, 14, 23, 59, 59).unwrap();
        let a = record_id(NS_LABEL, "bug", morning, "OpenSearch").unwrap();
        let b = record_id(NS_LABEL, "bug", evening, "OpenSearch").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_record_id_distinct_inputs_distinct_ids() {
        let date = Utc.with_ymd_and_hms(2026, 3, 14, 0, 0, 0).unwrap();
        let a = record_id(NS_GENERAL, "Open Issues", date, "OpenSearch").unwrap();
        let b = record_id(NS_GENERAL, "Closed Issues", date, "OpenSearch").unwrap();
        let c = record_id(NS_GENERAL, "Open Issues", date, "opensearch-py").unwrap();
        let d = record_id(NS_RELEASE, "Open Issues", date, "OpenSearch").unwrap();
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
    }

    #[test]
    fn test_record_id_rejects_empty_parts() {
        let date = Utc.with_ymd_and_hms(2026, 3, 14, 0, 0, 0).unwrap();
        assert!(record_id("", "x", date, "OpenSearch").is_err());
        assert!(record_id(NS_MAINTAINER, "x", date, "").is_err());
    }

    #[test]
    fn test_record_id_is_valid_uuid() {
        let date = Utc.with_ymd_and_hms(2026, 3, 14, 0, 0, 0).unwrap();
        let id = record_id(NS_GENERAL, "Open Issues", date, "OpenSearch").unwrap();
        assert!(Uuid::parse_str(&id).is_ok());
    }
}
