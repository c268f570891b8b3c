use serde::Serialize;

use crate::model::{Bucket, MatchStatus};

/// Per-status counts across all buckets after classification.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProcessSummary {
    pub total_buckets: usize,
    pub incomplete: usize,
    pub unmatched: usize,
    pub unique_matches: usize,
    pub ambiguous: usize,
    pub resolved: usize,
    pub marked_new: usize,
    pub created: usize,
    pub created_id_unclear: usize,
}

/// Compute summary counts from classified buckets.
pub fn compute_summary(buckets: &[Bucket]) -> ProcessSummary {
    let mut summary = ProcessSummary {
        total_buckets: buckets.len(),
        ..ProcessSummary::default()
    };

    for bucket in buckets {
        match bucket.status {
            MatchStatus::Incomplete => summary.incomplete += 1,
            MatchStatus::Unmatched => summary.unmatched += 1,
            MatchStatus::UniqueMatch => summary.unique_matches += 1,
            MatchStatus::Ambiguous => summary.ambiguous += 1,
            MatchStatus::Resolved => summary.resolved += 1,
            MatchStatus::MarkedNew => summary.marked_new += 1,
            MatchStatus::Created => summary.created += 1,
            MatchStatus::CreatedIdUnclear => summary.created_id_unclear += 1,
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BucketKey, LogRecord};

    fn bucket(status: MatchStatus) -> Bucket {
        let key = BucketKey::Station {
            callsign: "DG9VH".into(),
            locator: "JO31".into(),
        };
        let mut b = Bucket::new(key, LogRecord::new());
        b.status = status;
        b
    }

    #[test]
    fn summary_counts() {
        let buckets = vec![
            bucket(MatchStatus::UniqueMatch),
            bucket(MatchStatus::UniqueMatch),
            bucket(MatchStatus::Ambiguous),
            bucket(MatchStatus::Unmatched),
            bucket(MatchStatus::Incomplete),
        ];
        let summary = compute_summary(&buckets);
        assert_eq!(summary.total_buckets, 5);
        assert_eq!(summary.unique_matches, 2);
        assert_eq!(summary.ambiguous, 1);
        assert_eq!(summary.unmatched, 1);
        assert_eq!(summary.incomplete, 1);
        assert_eq!(summary.resolved, 0);
    }
}
