//! Dataset summaries.
//!
//! After a batch is stored, two summary documents are refreshed:
//! - `bgcargoplus_data_keys`: every measured variable name seen in the dataset.
//! - `ratelimiter`: the time span of profiles with good timestamps, read by the
//!   API to bound queries. Only the `bgcargoplus` entry is touched; entries
//!   for other datasets are preserved.
//!
//! The functions here are pure. `db::update_summaries` feeds them from SQL,
//! and `--dry-run` feeds them the documents it just assembled.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Value};
use std::collections::BTreeSet;

use crate::ingest::profile::ProfileDocument;

pub const DATASET: &str = "bgcargoplus";
pub const DATA_KEYS_SUMMARY_ID: &str = "bgcargoplus_data_keys";
pub const RATELIMITER_SUMMARY_ID: &str = "ratelimiter";

/// `timestamp_argoqc` value marking a trustworthy timestamp.
pub const GOOD_QC: i32 = 1;

/// Earliest and latest good-QC profile timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Sort and de-duplicate variable names by byte order, so uppercase names
/// come before `pressure` no matter where the keys were gathered.
pub fn sort_data_keys<I>(keys: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    keys.into_iter().collect::<BTreeSet<_>>().into_iter().collect()
}

/// Sorted, de-duplicated variable names across all documents.
pub fn collect_data_keys<'a, I>(documents: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a ProfileDocument>,
{
    sort_data_keys(
        documents
            .into_iter()
            .flat_map(|doc| doc.data_info.names().iter().cloned()),
    )
}

/// Time span of documents with good timestamp QC, or `None` if there are none.
pub fn qc_time_window<'a, I>(documents: I) -> Option<TimeWindow>
where
    I: IntoIterator<Item = &'a ProfileDocument>,
{
    documents
        .into_iter()
        .filter(|doc| doc.timestamp_argoqc == GOOD_QC)
        .filter_map(|doc| doc.timestamp)
        .fold(None, |window, ts| match window {
            None => Some(TimeWindow { start: ts, end: ts }),
            Some(w) => Some(TimeWindow { start: w.start.min(ts), end: w.end.max(ts) }),
        })
}

/// ISO 8601 in UTC with a trailing `Z`, e.g. `2024-05-01T12:00:00Z`.
pub fn format_summary_date(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

pub fn data_keys_summary(keys: &[String]) -> Value {
    json!({ "_id": DATA_KEYS_SUMMARY_ID, "data_keys": keys })
}

/// Write this dataset's window into an existing `ratelimiter` document.
pub fn merge_rate_limit(existing: Option<Value>, window: &TimeWindow) -> Value {
    let mut doc = match existing {
        Some(Value::Object(map)) => Value::Object(map),
        _ => json!({ "_id": RATELIMITER_SUMMARY_ID }),
    };

    let limit = json!({
        "metagroups": ["id", "metadata", "platform"],
        "startDate": format_summary_date(window.start),
        "endDate": format_summary_date(window.end),
        "qc": "timestamp_argoqc",
    });

    if !doc["metadata"].is_object() {
        doc["metadata"] = json!({});
    }
    doc["metadata"][DATASET] = limit;
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::profile::{DataInfo, GeoPoint};
    use chrono::TimeZone;

    fn doc(names: &[&str], timestamp: Option<DateTime<Utc>>, qc: i32) -> ProfileDocument {
        ProfileDocument {
            id: "4902911_001".to_string(),
            geolocation: GeoPoint::new(0.0, 0.0),
            basin: 1,
            timestamp,
            date_updated_argovis: Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
            source: vec![],
            data_info: DataInfo(
                names.iter().map(|s| s.to_string()).collect(),
                vec!["units".to_string(), "mode".to_string()],
                vec![],
            ),
            cycle_number: 1,
            geolocation_argoqc: 1,
            profile_direction: "A".to_string(),
            timestamp_argoqc: qc,
            metadata: vec![],
            data: vec![],
        }
    }

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, day, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_data_keys_are_sorted_and_unique() {
        let docs = vec![
            doc(&["pressure", "TEMP_ADJUSTED_RO"], None, 1),
            doc(&["pressure", "DOXY_ADJUSTED_RO"], None, 1),
        ];
        assert_eq!(
            collect_data_keys(&docs),
            vec!["DOXY_ADJUSTED_RO", "TEMP_ADJUSTED_RO", "pressure"]
        );
    }

    #[test]
    fn test_data_key_order_is_bytewise_not_case_folded() {
        let keys = vec![
            "pressure".to_string(),
            "TEMP_ADJUSTED_RO".to_string(),
            "DOXY_ADJUSTED_RO".to_string(),
            "pressure".to_string(),
        ];
        assert_eq!(
            sort_data_keys(keys),
            vec!["DOXY_ADJUSTED_RO", "TEMP_ADJUSTED_RO", "pressure"]
        );
    }

    #[test]
    fn test_window_uses_only_good_qc_timestamps() {
        let docs = vec![
            doc(&[], Some(at(10)), 1),
            doc(&[], Some(at(1)), 4), // bad QC, ignored
            doc(&[], Some(at(3)), 1),
            doc(&[], None, 1),
            doc(&[], Some(at(20)), 1),
        ];
        let window = qc_time_window(&docs).expect("three good timestamps");
        assert_eq!(window.start, at(3));
        assert_eq!(window.end, at(20));
    }

    #[test]
    fn test_window_is_none_without_good_qc() {
        let docs = vec![doc(&[], Some(at(1)), 3), doc(&[], None, 1)];
        assert!(qc_time_window(&docs).is_none());
    }

    #[test]
    fn test_summary_dates_end_in_z() {
        assert_eq!(format_summary_date(at(1)), "2024-05-01T12:00:00Z");
    }

    #[test]
    fn test_merge_preserves_other_datasets() {
        let existing = json!({
            "_id": "ratelimiter",
            "metadata": { "argo": { "startDate": "2001-01-01T00:00:00Z" } }
        });
        let window = TimeWindow { start: at(1), end: at(2) };
        let merged = merge_rate_limit(Some(existing), &window);

        assert_eq!(merged["metadata"]["argo"]["startDate"], "2001-01-01T00:00:00Z");
        assert_eq!(merged["metadata"]["bgcargoplus"]["startDate"], "2024-05-01T12:00:00Z");
        assert_eq!(merged["metadata"]["bgcargoplus"]["endDate"], "2024-05-02T12:00:00Z");
        assert_eq!(merged["metadata"]["bgcargoplus"]["qc"], "timestamp_argoqc");
        assert_eq!(merged["metadata"]["bgcargoplus"]["metagroups"][2], "platform");
    }

    #[test]
    fn test_merge_creates_document_when_missing() {
        let window = TimeWindow { start: at(1), end: at(1) };
        let merged = merge_rate_limit(None, &window);
        assert_eq!(merged["_id"], "ratelimiter");
        assert!(merged["metadata"]["bgcargoplus"].is_object());
    }

    #[test]
    fn test_data_keys_summary_shape() {
        let summary = data_keys_summary(&["pressure".to_string()]);
        assert_eq!(summary["_id"], "bgcargoplus_data_keys");
        assert_eq!(summary["data_keys"][0], "pressure");
    }
}
