/// PostgreSQL persistence for profile documents and summaries.
///
/// Documents are upserted by `_id`, so re-ingesting a float file replaces
/// its earlier rows. Schema lives in `sql/001_bgcargoplus.sql`.

use chrono::{DateTime, Utc};
use postgres::{Client, NoTls};
use serde_json::Value;

use crate::ingest::profile::{MetadataDocument, ProfileDocument};
use crate::logging::{self, Component};
use crate::summaries::{self, TimeWindow, GOOD_QC};

const SCHEMA: &str = include_str!("../sql/001_bgcargoplus.sql");

pub fn connect(database_url: &str) -> Result<Client, postgres::Error> {
    Client::connect(database_url, NoTls)
}

/// Create tables and indexes if they do not exist yet.
pub fn ensure_schema(client: &mut Client) -> Result<(), postgres::Error> {
    client.batch_execute(SCHEMA)
}

pub fn upsert_metadata(
    client: &mut Client,
    doc: &MetadataDocument,
) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_value(doc)?;
    client.execute(
        "INSERT INTO bgcargoplus_meta (id, doc) VALUES ($1, $2)
         ON CONFLICT (id) DO UPDATE SET doc = EXCLUDED.doc",
        &[&doc.id, &json],
    )?;
    Ok(())
}

pub fn upsert_profile(
    client: &mut Client,
    doc: &ProfileDocument,
) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_value(doc)?;
    client.execute(
        "INSERT INTO bgcargoplus (id, doc, timestamp, timestamp_argoqc, basin)
         VALUES ($1, $2, $3, $4, $5)
         ON CONFLICT (id) DO UPDATE SET
            doc = EXCLUDED.doc,
            timestamp = EXCLUDED.timestamp,
            timestamp_argoqc = EXCLUDED.timestamp_argoqc,
            basin = EXCLUDED.basin",
        &[&doc.id, &json, &doc.timestamp, &doc.timestamp_argoqc, &doc.basin],
    )?;
    Ok(())
}

/// Upsert a batch of profiles, logging and counting failures instead of
/// stopping. Returns (successful, failed).
pub fn upsert_profiles(client: &mut Client, docs: &[ProfileDocument]) -> (usize, usize) {
    let mut successful = 0;
    let mut failed = 0;
    for doc in docs {
        match upsert_profile(client, doc) {
            Ok(()) => successful += 1,
            Err(e) => {
                logging::error(Component::Database, Some(&doc.id), &format!("data upsert failure: {}", e));
                failed += 1;
            }
        }
    }
    (successful, failed)
}

// ---------------------------------------------------------------------------
// Summaries
// ---------------------------------------------------------------------------

/// Every variable name stored in any profile's `data_info[0]`, in byte order
/// regardless of the database collation.
pub fn fetch_data_keys(client: &mut Client) -> Result<Vec<String>, postgres::Error> {
    let rows = client.query(
        r#"SELECT DISTINCT key
         FROM bgcargoplus, jsonb_array_elements_text(doc->'data_info'->0) AS key
         ORDER BY key COLLATE "C""#,
        &[],
    )?;
    Ok(summaries::sort_data_keys(rows.iter().map(|row| row.get::<_, String>(0))))
}

/// Time span of stored profiles with good timestamp QC.
pub fn fetch_qc_time_window(client: &mut Client) -> Result<Option<TimeWindow>, postgres::Error> {
    let row = client.query_one(
        "SELECT MIN(timestamp), MAX(timestamp)
         FROM bgcargoplus
         WHERE timestamp_argoqc = $1",
        &[&GOOD_QC],
    )?;

    let min: Option<DateTime<Utc>> = row.get(0);
    let max: Option<DateTime<Utc>> = row.get(1);

    match (min, max) {
        (Some(start), Some(end)) => Ok(Some(TimeWindow { start, end })),
        _ => Ok(None),
    }
}

pub fn fetch_summary(client: &mut Client, id: &str) -> Result<Option<Value>, postgres::Error> {
    let row = client.query_opt("SELECT doc FROM summaries WHERE id = $1", &[&id])?;
    Ok(row.map(|r| r.get(0)))
}

pub fn upsert_summary(client: &mut Client, id: &str, doc: &Value) -> Result<(), postgres::Error> {
    client.execute(
        "INSERT INTO summaries (id, doc) VALUES ($1, $2)
         ON CONFLICT (id) DO UPDATE SET doc = EXCLUDED.doc",
        &[&id, doc],
    )?;
    Ok(())
}

/// Recompute the data-key and rate-limiter summaries from stored rows.
pub fn update_summaries(client: &mut Client) -> Result<(), postgres::Error> {
    let keys = fetch_data_keys(client)?;
    upsert_summary(client, summaries::DATA_KEYS_SUMMARY_ID, &summaries::data_keys_summary(&keys))?;
    logging::info(Component::Database, None, &format!("{} data keys summarized", keys.len()));

    match fetch_qc_time_window(client)? {
        Some(window) => {
            let existing = fetch_summary(client, summaries::RATELIMITER_SUMMARY_ID)?;
            let merged = summaries::merge_rate_limit(existing, &window);
            upsert_summary(client, summaries::RATELIMITER_SUMMARY_ID, &merged)?;
        }
        None => logging::warn(
            Component::Database,
            None,
            "no profiles with good timestamp QC, rate limiter not updated",
        ),
    }
    Ok(())
}
