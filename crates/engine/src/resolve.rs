use crate::error::EngineError;
use crate::model::{Bucket, MatchStatus, ID_NA, ID_NEW};

/// Operator's choice when collapsing an ambiguous bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionTarget {
    /// One of the conflicting registry identities.
    Existing(String),
    /// Export the bucket as a new station instead.
    CreateNew,
}

/// Collapse an ambiguous bucket to a single target identity.
///
/// Purely local state reconciliation over evidence the matcher already
/// gathered; never consults the network. Idempotent: re-applying the same
/// target to an already-resolved bucket is a no-op. Any target outside the
/// evidence set is a caller error.
pub fn resolve(bucket: &mut Bucket, target: &ResolutionTarget) -> Result<(), EngineError> {
    match bucket.status {
        MatchStatus::Ambiguous => {}
        // Idempotent re-application of the same choice.
        MatchStatus::Resolved => {
            if let ResolutionTarget::Existing(id) = target {
                if *id == bucket.station_id {
                    return Ok(());
                }
            }
            return Err(EngineError::NotAmbiguous {
                key: bucket.key.to_string(),
                status: bucket.status,
            });
        }
        MatchStatus::MarkedNew => {
            if *target == ResolutionTarget::CreateNew {
                return Ok(());
            }
            return Err(EngineError::NotAmbiguous {
                key: bucket.key.to_string(),
                status: bucket.status,
            });
        }
        _ => {
            return Err(EngineError::NotAmbiguous {
                key: bucket.key.to_string(),
                status: bucket.status,
            })
        }
    }

    match target {
        ResolutionTarget::Existing(id) => {
            let name = bucket
                .conflicts
                .iter()
                .find(|(cid, _)| cid == id)
                .map(|(_, name)| name.clone())
                .ok_or_else(|| EngineError::UnknownTarget {
                    key: bucket.key.to_string(),
                    station_id: id.clone(),
                })?;
            bucket.station_id = id.clone();
            bucket.profile_name = name;
            bucket.status = MatchStatus::Resolved;
            bucket.create_flag = false; // existing station, nothing to create
        }
        ResolutionTarget::CreateNew => {
            bucket.station_id = ID_NEW.to_string();
            bucket.status = MatchStatus::MarkedNew;
            bucket.create_flag = true;
        }
    }
    Ok(())
}

/// Toggle the creation mark on a bucket.
///
/// Only `Unmatched` buckets can be flagged, and only `MarkedNew` buckets can
/// be unflagged; incomplete and unresolved ambiguous buckets are rejected.
pub fn set_create_flag(bucket: &mut Bucket, flag: bool) -> Result<(), EngineError> {
    match (bucket.status, flag) {
        (MatchStatus::Unmatched, true) => {
            bucket.status = MatchStatus::MarkedNew;
            bucket.station_id = ID_NEW.to_string();
            bucket.create_flag = true;
            Ok(())
        }
        (MatchStatus::MarkedNew, false) => {
            bucket.status = MatchStatus::Unmatched;
            bucket.station_id = ID_NA.to_string();
            bucket.create_flag = false;
            Ok(())
        }
        // Re-applying the current state is a no-op.
        (MatchStatus::Unmatched, false) | (MatchStatus::MarkedNew, true) => Ok(()),
        _ => Err(EngineError::IllegalFlag {
            key: bucket.key.to_string(),
            status: bucket.status,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BucketKey, LogRecord, ID_CONFLICT};

    fn ambiguous_bucket() -> Bucket {
        let key = BucketKey::Station {
            callsign: "DG9VH".into(),
            locator: "JO31".into(),
        };
        let mut bucket = Bucket::new(key, LogRecord::new());
        bucket.status = MatchStatus::Ambiguous;
        bucket.station_id = ID_CONFLICT.to_string();
        bucket.profile_name = "Home, Contest".to_string();
        bucket.conflicts = vec![
            ("42".to_string(), "Home".to_string()),
            ("43".to_string(), "Contest".to_string()),
        ];
        bucket
    }

    #[test]
    fn resolve_to_existing_identity() {
        let mut bucket = ambiguous_bucket();
        resolve(&mut bucket, &ResolutionTarget::Existing("43".into())).unwrap();
        assert_eq!(bucket.status, MatchStatus::Resolved);
        assert_eq!(bucket.station_id, "43");
        assert_eq!(bucket.profile_name, "Contest");
        assert!(!bucket.create_flag);
    }

    #[test]
    fn resolve_to_create_new() {
        let mut bucket = ambiguous_bucket();
        resolve(&mut bucket, &ResolutionTarget::CreateNew).unwrap();
        assert_eq!(bucket.status, MatchStatus::MarkedNew);
        assert_eq!(bucket.station_id, ID_NEW);
        assert!(bucket.create_flag);
    }

    #[test]
    fn resolve_is_idempotent() {
        let target = ResolutionTarget::Existing("43".into());
        let mut once = ambiguous_bucket();
        resolve(&mut once, &target).unwrap();

        let mut twice = ambiguous_bucket();
        resolve(&mut twice, &target).unwrap();
        resolve(&mut twice, &target).unwrap();

        assert_eq!(once.status, twice.status);
        assert_eq!(once.station_id, twice.station_id);
        assert_eq!(once.profile_name, twice.profile_name);
        assert_eq!(once.create_flag, twice.create_flag);

        let mut new_once = ambiguous_bucket();
        resolve(&mut new_once, &ResolutionTarget::CreateNew).unwrap();
        resolve(&mut new_once, &ResolutionTarget::CreateNew).unwrap();
        assert_eq!(new_once.status, MatchStatus::MarkedNew);
    }

    #[test]
    fn out_of_set_target_rejected() {
        let mut bucket = ambiguous_bucket();
        let err = resolve(&mut bucket, &ResolutionTarget::Existing("99".into())).unwrap_err();
        assert!(matches!(err, EngineError::UnknownTarget { .. }));
        // Bucket untouched.
        assert_eq!(bucket.status, MatchStatus::Ambiguous);
        assert_eq!(bucket.station_id, ID_CONFLICT);
    }

    #[test]
    fn resolve_rejects_non_ambiguous() {
        let key = BucketKey::Station {
            callsign: "DG9VH".into(),
            locator: "JO31".into(),
        };
        let mut bucket = Bucket::new(key, LogRecord::new());
        bucket.status = MatchStatus::UniqueMatch;
        let err = resolve(&mut bucket, &ResolutionTarget::CreateNew).unwrap_err();
        assert!(matches!(err, EngineError::NotAmbiguous { .. }));
    }

    #[test]
    fn different_target_after_resolution_rejected() {
        let mut bucket = ambiguous_bucket();
        resolve(&mut bucket, &ResolutionTarget::Existing("42".into())).unwrap();
        let err = resolve(&mut bucket, &ResolutionTarget::Existing("43".into())).unwrap_err();
        assert!(matches!(err, EngineError::NotAmbiguous { .. }));
    }

    #[test]
    fn create_flag_transitions() {
        let key = BucketKey::Station {
            callsign: "DG9VH".into(),
            locator: "JO31".into(),
        };
        let mut bucket = Bucket::new(key, LogRecord::new());
        bucket.status = MatchStatus::Unmatched;

        set_create_flag(&mut bucket, true).unwrap();
        assert_eq!(bucket.status, MatchStatus::MarkedNew);
        assert_eq!(bucket.station_id, ID_NEW);

        set_create_flag(&mut bucket, false).unwrap();
        assert_eq!(bucket.status, MatchStatus::Unmatched);
        assert_eq!(bucket.station_id, ID_NA);
    }

    #[test]
    fn create_flag_rejected_for_ambiguous_and_incomplete() {
        let mut ambiguous = ambiguous_bucket();
        assert!(set_create_flag(&mut ambiguous, true).is_err());

        let mut incomplete = Bucket::new(BucketKey::Unassigned, LogRecord::new());
        incomplete.status = MatchStatus::Incomplete;
        assert!(set_create_flag(&mut incomplete, true).is_err());
    }
}
