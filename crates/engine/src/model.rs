use std::collections::BTreeMap;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Field names
// ---------------------------------------------------------------------------

/// ADIF field carrying the operating station's callsign.
pub const CALLSIGN_FIELD: &str = "STATION_CALLSIGN";
/// ADIF field carrying the operating station's Maidenhead locator.
pub const LOCATOR_FIELD: &str = "MY_GRIDSQUARE";
/// Auxiliary numeric fields read per bucket.
pub const DXCC_FIELD: &str = "MY_DXCC";
pub const CQ_ZONE_FIELD: &str = "MY_CQ_ZONE";
pub const ITU_ZONE_FIELD: &str = "MY_ITU_ZONE";
/// Derived field injected on export.
pub const OPERATOR_FIELD: &str = "OPERATOR";

// ---------------------------------------------------------------------------
// Identity sentinels
// ---------------------------------------------------------------------------

/// Station id of a bucket marked for creation.
pub const ID_NEW: &str = "NEW";
/// Station id of a bucket with no registry identity.
pub const ID_NA: &str = "N/A";
/// Station id shown while an ambiguity is unresolved.
pub const ID_CONFLICT: &str = "CONFLICT";
/// Station id of a created profile whose assigned id could not be recovered.
pub const ID_UNCLEAR: &str = "UNCLEAR_ID";
/// Station id of a bucket whose creation request failed.
pub const ID_ERROR: &str = "ERROR";

/// Profile name shown for the sentinel bucket.
pub const UNASSIGNED_NAME: &str = "UNASSIGNED";

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One contact entry: an ordered field-name → value map.
///
/// Field names are uppercased on insert; iteration order is the sorted field
/// order, which is also the deterministic export order. Records are created
/// once on ingest and stay immutable apart from the `OPERATOR` injection the
/// export partitioner performs on its own copies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LogRecord {
    fields: BTreeMap<String, String>,
}

impl LogRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from (name, value) pairs. Names are uppercased.
    pub fn from_pairs<I, S, T>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: AsRef<str>,
        T: Into<String>,
    {
        let mut record = Self::new();
        for (name, value) in pairs {
            record.set(name.as_ref(), value.into());
        }
        record
    }

    /// Field value, or empty string when the field is absent.
    pub fn get(&self, name: &str) -> &str {
        self.fields
            .get(&name.to_uppercase())
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn set(&mut self, name: &str, value: String) {
        self.fields.insert(name.to_uppercase(), value);
    }

    /// Fields in sorted name order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Bucket key
// ---------------------------------------------------------------------------

/// Grouping key for log records. Equality is the sole grouping criterion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum BucketKey {
    /// Complete (callsign, locator) pair, both uppercased.
    Station { callsign: String, locator: String },
    /// Reserved key for records missing callsign or locator.
    Unassigned,
}

impl BucketKey {
    /// Derive the key from a record. Missing or empty callsign/locator
    /// forces the sentinel key regardless of other content.
    pub fn from_record(record: &LogRecord) -> Self {
        let callsign = record.get(CALLSIGN_FIELD).trim().to_uppercase();
        let locator = record.get(LOCATOR_FIELD).trim().to_uppercase();
        if callsign.is_empty() || locator.is_empty() {
            Self::Unassigned
        } else {
            Self::Station { callsign, locator }
        }
    }

    pub fn is_unassigned(&self) -> bool {
        matches!(self, Self::Unassigned)
    }

    pub fn callsign(&self) -> &str {
        match self {
            Self::Station { callsign, .. } => callsign,
            Self::Unassigned => ID_NA,
        }
    }

    pub fn locator(&self) -> &str {
        match self {
            Self::Station { locator, .. } => locator,
            Self::Unassigned => ID_NA,
        }
    }
}

impl std::fmt::Display for BucketKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Station { callsign, locator } => write!(f, "{callsign}|{locator}"),
            Self::Unassigned => write!(f, "UNASSIGNED"),
        }
    }
}

// ---------------------------------------------------------------------------
// Match status
// ---------------------------------------------------------------------------

/// Classification state of a bucket.
///
/// `Incomplete` is terminal. `Ambiguous` only leaves via conflict
/// resolution (to `Resolved` or `MarkedNew`). `Unmatched` becomes
/// `MarkedNew` when flagged for creation. `Created` and `CreatedIdUnclear`
/// are the terminal states of the registry creation flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Incomplete,
    Unmatched,
    UniqueMatch,
    Ambiguous,
    Resolved,
    MarkedNew,
    Created,
    CreatedIdUnclear,
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Incomplete => write!(f, "incomplete"),
            Self::Unmatched => write!(f, "unmatched"),
            Self::UniqueMatch => write!(f, "unique_match"),
            Self::Ambiguous => write!(f, "ambiguous"),
            Self::Resolved => write!(f, "resolved"),
            Self::MarkedNew => write!(f, "marked_new"),
            Self::Created => write!(f, "created"),
            Self::CreatedIdUnclear => write!(f, "created_id_unclear"),
        }
    }
}

// ---------------------------------------------------------------------------
// Bucket
// ---------------------------------------------------------------------------

/// All log records sharing one (callsign, locator) identity, plus the
/// mutable classification state the pipeline stages write into.
#[derive(Debug, Clone, Serialize)]
pub struct Bucket {
    pub key: BucketKey,
    pub records: Vec<LogRecord>,
    pub status: MatchStatus,
    /// Registry identity, or one of the `ID_*` sentinels.
    pub station_id: String,
    pub profile_name: String,
    /// Auxiliary numeric codes, `"0"` when unspecified.
    pub dxcc: String,
    pub cq_zone: String,
    pub itu_zone: String,
    /// Marked for creation in the registry.
    pub create_flag: bool,
    /// Evidence from an ambiguous match: (station_id, profile_name) in
    /// snapshot order, one entry per distinct identity.
    pub conflicts: Vec<(String, String)>,
}

impl Bucket {
    pub fn new(key: BucketKey, first: LogRecord) -> Self {
        Self {
            key,
            records: vec![first],
            status: MatchStatus::Unmatched,
            station_id: ID_NA.to_string(),
            profile_name: ID_NA.to_string(),
            dxcc: "0".to_string(),
            cq_zone: "0".to_string(),
            itu_zone: "0".to_string(),
            create_flag: false,
            conflicts: Vec::new(),
        }
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }
}

// ---------------------------------------------------------------------------
// Registry snapshot
// ---------------------------------------------------------------------------

/// One station profile from the remote registry, read-only.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileRecord {
    pub station_id: String,
    pub callsign: String,
    pub locator: String,
    pub profile_name: String,
}

impl ProfileRecord {
    pub fn new(
        station_id: impl Into<String>,
        callsign: impl Into<String>,
        locator: impl Into<String>,
        profile_name: impl Into<String>,
    ) -> Self {
        Self {
            station_id: station_id.into(),
            callsign: callsign.into(),
            locator: locator.into(),
            profile_name: profile_name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_fields_uppercased_and_sorted() {
        let record = LogRecord::from_pairs([("call", "DL1ABC"), ("band", "20m")]);
        assert_eq!(record.get("CALL"), "DL1ABC");
        assert_eq!(record.get("call"), "DL1ABC");
        let names: Vec<&str> = record.fields().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["BAND", "CALL"]);
    }

    #[test]
    fn missing_field_is_empty() {
        let record = LogRecord::new();
        assert_eq!(record.get("ANYTHING"), "");
    }

    #[test]
    fn key_from_complete_record() {
        let record = LogRecord::from_pairs([
            (CALLSIGN_FIELD, "dg9vh"),
            (LOCATOR_FIELD, "jo31"),
        ]);
        assert_eq!(
            BucketKey::from_record(&record),
            BucketKey::Station {
                callsign: "DG9VH".into(),
                locator: "JO31".into(),
            }
        );
    }

    #[test]
    fn key_missing_locator_is_unassigned() {
        let record = LogRecord::from_pairs([(CALLSIGN_FIELD, "DG9VH")]);
        assert!(BucketKey::from_record(&record).is_unassigned());

        let blank = LogRecord::from_pairs([
            (CALLSIGN_FIELD, "DG9VH"),
            (LOCATOR_FIELD, "   "),
        ]);
        assert!(BucketKey::from_record(&blank).is_unassigned());
    }

    #[test]
    fn key_display() {
        let key = BucketKey::Station {
            callsign: "DG9VH".into(),
            locator: "JO31".into(),
        };
        assert_eq!(key.to_string(), "DG9VH|JO31");
        assert_eq!(BucketKey::Unassigned.to_string(), "UNASSIGNED");
    }
}
