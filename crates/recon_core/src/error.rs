//! Error types for build history reconstruction.

use thiserror::Error;

use crate::source::SourceError;

/// Result type alias using [`ReconError`].
pub type Result<T> = std::result::Result<T, ReconError>;

/// Top-level error type for reconstruction.
///
/// Unknown unit or party references inside a turn and unknown unit types in
/// the price table are not errors: they leave fields unresolved instead.
#[derive(Debug, Error)]
pub enum ReconError {
    /// The roster does not hold exactly two parties.
    #[error("Expected exactly two parties, found {parties}")]
    PreconditionViolation {
        /// Number of parties found in the roster.
        parties: usize,
    },

    /// The first turn could not be obtained, so there is nothing to reconstruct.
    #[error("No game info: turn 0 unavailable ({0})")]
    NoData(SourceError),

    /// A report was requested from the perspective of a party not in the roster.
    #[error("Unknown party: {0}")]
    UnknownParty(String),

    /// Configuration or price table could not be read or parsed.
    #[error("Failed to load config '{path}': {message}")]
    Config {
        /// Path of the offending file.
        path: String,
        /// Error message.
        message: String,
    },

    /// A turn source failure surfaced outside the fetch loop.
    #[error(transparent)]
    Source(#[from] SourceError),
}
