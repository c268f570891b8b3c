use std::collections::HashMap;

use serde::Serialize;

use crate::model::{
    Bucket, LogRecord, MatchStatus, CALLSIGN_FIELD, ID_CONFLICT, ID_ERROR, ID_NA,
    ID_NEW, ID_UNCLEAR, OPERATOR_FIELD,
};

/// One export output set: a sanitized key and the records it collects.
#[derive(Debug, Clone, Serialize)]
pub struct Partition {
    pub export_key: String,
    pub records: Vec<LogRecord>,
}

#[derive(Debug)]
pub struct PartitionOutput {
    /// Partitions in first-derived key order.
    pub partitions: Vec<Partition>,
    /// Keys of buckets excluded from export (unresolved ambiguities).
    pub skipped: Vec<String>,
}

/// Make a raw export key filesystem-safe: spaces become underscores, then
/// every character that is not alphanumeric, underscore or hyphen is dropped.
pub fn sanitize_export_key(raw: &str) -> String {
    raw.replace(' ', "_")
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

/// Derive the raw (unsanitized) export key for a bucket. First rule wins.
pub fn derive_export_key(bucket: &Bucket) -> String {
    if bucket.key.is_unassigned() {
        return "UNASSIGNED".to_string();
    }
    let call = bucket.key.callsign();
    let locator = bucket.key.locator();
    if bucket.station_id == ID_NEW {
        format!("NEW_{}_{}_{}", bucket.profile_name, call, locator)
    } else if !bucket.station_id.is_empty()
        && ![ID_NA, ID_ERROR, ID_UNCLEAR, ID_CONFLICT].contains(&bucket.station_id.as_str())
    {
        format!("ID_{}_{}_{}", bucket.station_id, bucket.profile_name, locator)
    } else {
        format!("NOID_{}_{}_{}", bucket.profile_name, call, locator)
    }
}

/// Group records for output, one partition per sanitized export key.
///
/// Unresolved ambiguous buckets are skipped, never exported. Distinct raw
/// keys sanitizing to the same string merge by append; no record is lost.
/// The exported record copies get the derived `OPERATOR` field injected.
pub fn partition_buckets(buckets: &[Bucket]) -> PartitionOutput {
    let mut partitions: Vec<Partition> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut skipped = Vec::new();

    for bucket in buckets {
        if bucket.status == MatchStatus::Ambiguous {
            skipped.push(bucket.key.to_string());
            continue;
        }

        let export_key = sanitize_export_key(&derive_export_key(bucket));
        let records = bucket.records.iter().map(with_operator_field);

        match index.get(&export_key) {
            Some(&i) => partitions[i].records.extend(records),
            None => {
                index.insert(export_key.clone(), partitions.len());
                partitions.push(Partition {
                    export_key,
                    records: records.collect(),
                });
            }
        }
    }

    PartitionOutput { partitions, skipped }
}

/// Copy a record and inject the `OPERATOR` field from the station callsign
/// (segment before any `|`).
fn with_operator_field(record: &LogRecord) -> LogRecord {
    let mut out = record.clone();
    let operator = record
        .get(CALLSIGN_FIELD)
        .split('|')
        .next()
        .unwrap_or("")
        .to_string();
    out.set(OPERATOR_FIELD, operator);
    out
}
