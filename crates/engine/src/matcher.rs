use crate::model::{
    Bucket, BucketKey, MatchStatus, ProfileRecord, ID_CONFLICT, ID_NA,
};

/// Result of matching one bucket key against the registry snapshot.
#[derive(Debug, Clone)]
pub struct MatchOutcome {
    pub status: MatchStatus,
    /// Matched identity; for ambiguous matches the first-encountered one
    /// (snapshot order), kept only as a deterministic provisional value.
    pub station_id: String,
    pub profile_name: String,
    /// All matching (station_id, profile_name) pairs in snapshot order,
    /// one entry per distinct identity.
    pub matches: Vec<(String, String)>,
}

/// Match a bucket key against a registry snapshot.
///
/// A profile matches iff its uppercased callsign and locator both equal the
/// key's components exactly. Profiles without an id are skipped. The
/// sentinel key is never matched; callers classify it `Incomplete`.
pub fn match_bucket(key: &BucketKey, snapshot: &[ProfileRecord]) -> MatchOutcome {
    let (callsign, locator) = match key {
        BucketKey::Station { callsign, locator } => (callsign, locator),
        BucketKey::Unassigned => {
            return MatchOutcome {
                status: MatchStatus::Incomplete,
                station_id: ID_NA.to_string(),
                profile_name: ID_NA.to_string(),
                matches: Vec::new(),
            }
        }
    };

    let mut matches: Vec<(String, String)> = Vec::new();
    for profile in snapshot {
        if profile.station_id.is_empty() {
            continue;
        }
        if profile.callsign.to_uppercase() == *callsign
            && profile.locator.to_uppercase() == *locator
        {
            if !matches.iter().any(|(id, _)| id == &profile.station_id) {
                matches.push((profile.station_id.clone(), profile.profile_name.clone()));
            }
        }
    }

    match matches.len() {
        0 => MatchOutcome {
            status: MatchStatus::Unmatched,
            station_id: ID_NA.to_string(),
            profile_name: ID_NA.to_string(),
            matches,
        },
        1 => MatchOutcome {
            status: MatchStatus::UniqueMatch,
            station_id: matches[0].0.clone(),
            profile_name: matches[0].1.clone(),
            matches,
        },
        _ => MatchOutcome {
            // Provisional: first in snapshot order, pending manual resolution.
            status: MatchStatus::Ambiguous,
            station_id: matches[0].0.clone(),
            profile_name: matches[0].1.clone(),
            matches,
        },
    }
}

/// Apply match outcomes to every non-sentinel bucket.
///
/// Ambiguous buckets present the `CONFLICT` sentinel id and the joined list
/// of conflicting profile names until resolved; they are not eligible for
/// export or creation.
pub fn classify_buckets(buckets: &mut [Bucket], snapshot: &[ProfileRecord]) {
    for bucket in buckets.iter_mut() {
        if bucket.key.is_unassigned() {
            continue; // already Incomplete from grouping
        }
        let outcome = match_bucket(&bucket.key, snapshot);
        match outcome.status {
            MatchStatus::Ambiguous => {
                bucket.status = MatchStatus::Ambiguous;
                bucket.station_id = ID_CONFLICT.to_string();
                bucket.profile_name = outcome
                    .matches
                    .iter()
                    .map(|(_, name)| name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                bucket.conflicts = outcome.matches;
                bucket.create_flag = false;
            }
            _ => {
                bucket.status = outcome.status;
                bucket.station_id = outcome.station_id;
                bucket.profile_name = outcome.profile_name;
                bucket.conflicts.clear();
                bucket.create_flag = false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LogRecord, CALLSIGN_FIELD, LOCATOR_FIELD};

    fn key(call: &str, loc: &str) -> BucketKey {
        BucketKey::Station {
            callsign: call.into(),
            locator: loc.into(),
        }
    }

    fn profile(id: &str, call: &str, loc: &str, name: &str) -> ProfileRecord {
        ProfileRecord::new(id, call, loc, name)
    }

    #[test]
    fn empty_snapshot_is_unmatched() {
        let outcome = match_bucket(&key("DG9VH", "JO31"), &[]);
        assert_eq!(outcome.status, MatchStatus::Unmatched);
        assert_eq!(outcome.station_id, ID_NA);
        assert_eq!(outcome.profile_name, ID_NA);
        assert!(outcome.matches.is_empty());
    }

    #[test]
    fn single_match_is_unique() {
        let snapshot = vec![
            profile("42", "dg9vh", "jo31", "Home"),
            profile("7", "DL1ABC", "JN48", "Portable"),
        ];
        let outcome = match_bucket(&key("DG9VH", "JO31"), &snapshot);
        assert_eq!(outcome.status, MatchStatus::UniqueMatch);
        assert_eq!(outcome.station_id, "42");
        assert_eq!(outcome.profile_name, "Home");
    }

    #[test]
    fn two_identities_are_ambiguous_with_first_provisional() {
        let snapshot = vec![
            profile("42", "DG9VH", "JO31", "Home"),
            profile("43", "DG9VH", "JO31", "Contest"),
        ];
        let outcome = match_bucket(&key("DG9VH", "JO31"), &snapshot);
        assert_eq!(outcome.status, MatchStatus::Ambiguous);
        // First in snapshot order is the provisional identity.
        assert_eq!(outcome.station_id, "42");
        assert_eq!(outcome.profile_name, "Home");
        assert_eq!(
            outcome.matches,
            vec![
                ("42".to_string(), "Home".to_string()),
                ("43".to_string(), "Contest".to_string()),
            ]
        );
    }

    #[test]
    fn duplicate_identity_counts_once() {
        let snapshot = vec![
            profile("42", "DG9VH", "JO31", "Home"),
            profile("42", "DG9VH", "JO31", "Home"),
        ];
        let outcome = match_bucket(&key("DG9VH", "JO31"), &snapshot);
        assert_eq!(outcome.status, MatchStatus::UniqueMatch);
    }

    #[test]
    fn empty_profile_id_skipped() {
        let snapshot = vec![profile("", "DG9VH", "JO31", "Ghost")];
        let outcome = match_bucket(&key("DG9VH", "JO31"), &snapshot);
        assert_eq!(outcome.status, MatchStatus::Unmatched);
    }

    #[test]
    fn matching_is_deterministic() {
        let snapshot = vec![
            profile("42", "DG9VH", "JO31", "Home"),
            profile("43", "DG9VH", "JO31", "Contest"),
        ];
        let k = key("DG9VH", "JO31");
        let a = match_bucket(&k, &snapshot);
        let b = match_bucket(&k, &snapshot);
        assert_eq!(a.status, b.status);
        assert_eq!(a.station_id, b.station_id);
        assert_eq!(a.matches, b.matches);
    }

    #[test]
    fn classify_sets_conflict_presentation() {
        let record = LogRecord::from_pairs([
            (CALLSIGN_FIELD, "DG9VH"),
            (LOCATOR_FIELD, "JO31"),
        ]);
        let mut buckets = vec![Bucket::new(key("DG9VH", "JO31"), record)];
        let snapshot = vec![
            profile("42", "DG9VH", "JO31", "Home"),
            profile("43", "DG9VH", "JO31", "Contest"),
        ];
        classify_buckets(&mut buckets, &snapshot);
        let bucket = &buckets[0];
        assert_eq!(bucket.status, MatchStatus::Ambiguous);
        assert_eq!(bucket.station_id, ID_CONFLICT);
        assert_eq!(bucket.profile_name, "Home, Contest");
        assert_eq!(bucket.conflicts.len(), 2);
        assert!(!bucket.create_flag);
    }

    #[test]
    fn classify_skips_sentinel() {
        let record = LogRecord::new();
        let mut buckets = vec![Bucket::new(BucketKey::Unassigned, record)];
        buckets[0].status = MatchStatus::Incomplete;
        let snapshot = vec![profile("42", "N/A", "N/A", "Trap")];
        classify_buckets(&mut buckets, &snapshot);
        assert_eq!(buckets[0].status, MatchStatus::Incomplete);
    }
}
