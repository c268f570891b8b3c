use std::fmt;

use crate::model::MatchStatus;

#[derive(Debug)]
pub enum EngineError {
    /// Conflict resolution applied to a bucket that is not ambiguous.
    NotAmbiguous { key: String, status: MatchStatus },
    /// Chosen identity is not in the bucket's evidence set.
    UnknownTarget { key: String, station_id: String },
    /// Creation flag toggled on a bucket that cannot be marked.
    IllegalFlag { key: String, status: MatchStatus },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAmbiguous { key, status } => {
                write!(f, "bucket '{key}' is not ambiguous (status: {status})")
            }
            Self::UnknownTarget { key, station_id } => {
                write!(f, "bucket '{key}': id '{station_id}' is not a conflicting identity")
            }
            Self::IllegalFlag { key, status } => {
                write!(f, "bucket '{key}' cannot be marked for creation (status: {status})")
            }
        }
    }
}

impl std::error::Error for EngineError {}
