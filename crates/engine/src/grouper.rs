use std::collections::HashMap;

use serde::Serialize;

use crate::model::{
    Bucket, BucketKey, LogRecord, MatchStatus, CQ_ZONE_FIELD, DXCC_FIELD, ID_NA,
    ITU_ZONE_FIELD, UNASSIGNED_NAME,
};

/// Counts reported after grouping.
#[derive(Debug, Clone, Serialize)]
pub struct GroupingSummary {
    /// Distinct non-sentinel (callsign, locator) pairs.
    pub distinct_stations: usize,
    /// Records routed to the sentinel bucket.
    pub unassigned_records: usize,
    pub total_records: usize,
}

#[derive(Debug)]
pub struct GroupingOutput {
    /// Buckets in first-seen key order.
    pub buckets: Vec<Bucket>,
    pub summary: GroupingSummary,
    /// Non-fatal findings, e.g. zone values outside the usual ranges.
    pub warnings: Vec<String>,
}

/// Partition records into buckets keyed by (callsign, locator).
///
/// First-seen order of distinct keys is preserved. Records missing either
/// key field land in the sentinel bucket, which is classified `Incomplete`
/// here and never matched against the registry. Malformed input degrades to
/// the sentinel bucket, never rejected.
pub fn group_records(records: &[LogRecord]) -> GroupingOutput {
    let mut buckets: Vec<Bucket> = Vec::new();
    let mut index: HashMap<BucketKey, usize> = HashMap::new();
    let mut unassigned_records = 0usize;

    for record in records {
        let key = BucketKey::from_record(record);
        if key.is_unassigned() {
            unassigned_records += 1;
        }
        match index.get(&key) {
            Some(&i) => buckets[i].records.push(record.clone()),
            None => {
                index.insert(key.clone(), buckets.len());
                buckets.push(Bucket::new(key, record.clone()));
            }
        }
    }

    let mut warnings = Vec::new();
    for bucket in &mut buckets {
        bucket.dxcc = first_digit_value(&bucket.records, DXCC_FIELD);
        bucket.cq_zone = first_digit_value(&bucket.records, CQ_ZONE_FIELD);
        bucket.itu_zone = first_digit_value(&bucket.records, ITU_ZONE_FIELD);

        if let Some(w) = zone_warning(&bucket.key, "CQ", &bucket.cq_zone, 40) {
            warnings.push(w);
        }
        if let Some(w) = zone_warning(&bucket.key, "ITU", &bucket.itu_zone, 90) {
            warnings.push(w);
        }

        if bucket.key.is_unassigned() {
            bucket.status = MatchStatus::Incomplete;
            bucket.station_id = ID_NA.to_string();
            bucket.profile_name = UNASSIGNED_NAME.to_string();
        }
    }

    let distinct_stations = buckets
        .iter()
        .filter(|b| !b.key.is_unassigned())
        .count();

    GroupingOutput {
        summary: GroupingSummary {
            distinct_stations,
            unassigned_records,
            total_records: records.len(),
        },
        buckets,
        warnings,
    }
}

/// Warn when a zone lies outside the usual numbering range. `"0"` means
/// unspecified and is never reported.
fn zone_warning(key: &BucketKey, label: &str, value: &str, max: u32) -> Option<String> {
    if value == "0" {
        return None;
    }
    match value.parse::<u32>() {
        Ok(zone) if (1..=max).contains(&zone) => None,
        _ => Some(format!(
            "{key}: {label} zone {value} outside the usual range (1-{max})"
        )),
    }
}

/// First non-empty, all-digit value of `field` across the records, else "0".
fn first_digit_value(records: &[LogRecord], field: &str) -> String {
    for record in records {
        let value = record.get(field).trim();
        if !value.is_empty() && value.chars().all(|c| c.is_ascii_digit()) {
            return value.to_string();
        }
    }
    "0".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CALLSIGN_FIELD, LOCATOR_FIELD};

    fn record(call: &str, loc: &str) -> LogRecord {
        LogRecord::from_pairs([(CALLSIGN_FIELD, call), (LOCATOR_FIELD, loc)])
    }

    #[test]
    fn bucket_count_equals_distinct_keys_plus_sentinel() {
        let records = vec![
            record("DG9VH", "JO31"),
            record("dg9vh", "jo31"), // same key, case-insensitive
            record("DL1ABC", "JN48"),
            record("DG9VH", ""), // sentinel
        ];
        let out = group_records(&records);
        assert_eq!(out.buckets.len(), 3);
        assert_eq!(out.summary.distinct_stations, 2);
        assert_eq!(out.summary.unassigned_records, 1);
        assert_eq!(out.summary.total_records, 4);
    }

    #[test]
    fn first_seen_order_preserved() {
        let records = vec![
            record("C3", "JO62"),
            record("A1", "JO31"),
            record("B2", "JN48"),
            record("A1", "JO31"),
        ];
        let out = group_records(&records);
        let keys: Vec<String> = out.buckets.iter().map(|b| b.key.to_string()).collect();
        assert_eq!(keys, vec!["C3|JO62", "A1|JO31", "B2|JN48"]);
        assert_eq!(out.buckets[1].record_count(), 2);
    }

    #[test]
    fn sentinel_bucket_is_incomplete() {
        let records = vec![record("", "")];
        let out = group_records(&records);
        assert_eq!(out.buckets.len(), 1);
        let sentinel = &out.buckets[0];
        assert!(sentinel.key.is_unassigned());
        assert_eq!(sentinel.status, MatchStatus::Incomplete);
        assert_eq!(sentinel.profile_name, UNASSIGNED_NAME);
        assert_eq!(out.summary.distinct_stations, 0);
    }

    #[test]
    fn aux_codes_first_digit_value_across_records() {
        let mut first = record("DG9VH", "JO31");
        first.set(DXCC_FIELD, "x230".into()); // not all digits
        let mut second = record("DG9VH", "JO31");
        second.set(DXCC_FIELD, "230".into());
        second.set(CQ_ZONE_FIELD, " 14 ".into());

        let out = group_records(&[first, second]);
        let bucket = &out.buckets[0];
        assert_eq!(bucket.dxcc, "230");
        assert_eq!(bucket.cq_zone, "14");
        assert_eq!(bucket.itu_zone, "0"); // absent everywhere
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn out_of_range_zone_warns_but_keeps_value() {
        let mut r = record("DG9VH", "JO31");
        r.set(CQ_ZONE_FIELD, "55".into());
        r.set(ITU_ZONE_FIELD, "28".into());

        let out = group_records(&[r]);
        assert_eq!(out.buckets[0].cq_zone, "55");
        assert_eq!(out.warnings.len(), 1);
        assert!(out.warnings[0].contains("CQ zone 55"));
    }

    #[test]
    fn grouping_is_deterministic() {
        let records = vec![
            record("B2", "JN48"),
            record("A1", "JO31"),
            record("B2", "JN48"),
        ];
        let first: Vec<String> = group_records(&records)
            .buckets
            .iter()
            .map(|b| b.key.to_string())
            .collect();
        let second: Vec<String> = group_records(&records)
            .buckets
            .iter()
            .map(|b| b.key.to_string())
            .collect();
        assert_eq!(first, second);
    }
}
