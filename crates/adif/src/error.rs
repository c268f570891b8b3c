use std::fmt;

#[derive(Debug)]
pub enum AdifError {
    /// File read/write error.
    Io(String),
    /// Input that yields nothing usable (e.g. no records at all).
    Malformed(String),
}

impl fmt::Display for AdifError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "IO error: {msg}"),
            Self::Malformed(msg) => write!(f, "malformed input: {msg}"),
        }
    }
}

impl std::error::Error for AdifError {}
