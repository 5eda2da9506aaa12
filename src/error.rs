use std::fmt;

/// Errors that cross the engine boundary.
///
/// Everything else a checker can hit (I/O failures, timeouts, missing vendor
/// credentials) is recovered at the dispatch boundary and surfaced as a
/// finding, never as an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    /// Malformed URL or email address; the scan never starts.
    InvalidInput(String),
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanError::InvalidInput(detail) => write!(f, "invalid input: {detail}"),
        }
    }
}

impl std::error::Error for ScanError {}
