//! Error types for geodex operations.

use thiserror::Error;

/// Convenience alias used by every fallible geodex API.
pub type Result<T> = std::result::Result<T, GeodexError>;

/// Errors surfaced by geodex.
///
/// Expected failures (I/O, malformed input files, invalid caller-supplied
/// values) are returned to the caller; the crate never retries and never
/// recovers in-process. Programmer errors such as querying the precision of
/// an untagged geohash fail fast with a panic instead.
#[derive(Debug, Error)]
pub enum GeodexError {
    /// An underlying I/O operation failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A record or manifest file did not match the expected format.
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    /// A caller-supplied value violated a documented requirement.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}
