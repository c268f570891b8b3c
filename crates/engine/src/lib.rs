//! `stationsplit-engine`: log-to-registry reconciliation core.
//!
//! Pure engine crate: groups contact log records into station buckets,
//! matches them against a registry snapshot, resolves ambiguities and
//! derives export partitions. No IO, no network.

pub mod error;
pub mod grouper;
pub mod matcher;
pub mod model;
pub mod partition;
pub mod resolve;
pub mod summary;

pub use error::EngineError;
pub use grouper::{group_records, GroupingOutput, GroupingSummary};
pub use matcher::{classify_buckets, match_bucket, MatchOutcome};
pub use model::{Bucket, BucketKey, LogRecord, MatchStatus, ProfileRecord};
pub use partition::{partition_buckets, Partition, PartitionOutput};
pub use resolve::{resolve, set_create_flag, ResolutionTarget};
pub use summary::{compute_summary, ProcessSummary};
