//! Command-line driver for build history reconstruction.
//!
//! Reads per-turn replay documents from disk, runs the reconstruction in
//! [`recon_core`], and renders the result for a terminal or as JSON.
//!
//! # Layout
//!
//! Turn documents live under one directory per match:
//!
//! ```text
//! replays/
//!   1234567/
//!     turn_0.json
//!     turn_1.json
//!     ...
//! ```
//!
//! The first missing file marks the end of the available data.
//!
//! - **stdout**: the report
//! - **stderr**: logs

pub mod render;
pub mod source;

use thiserror::Error;

use recon_core::error::ReconError;

/// Exit status for invalid arguments or configuration.
pub const EXIT_USAGE: i32 = 2;

/// Exit status when the match cannot be reconstructed.
pub const EXIT_FAILURE: i32 = 1;

/// Errors surfaced by the binary.
#[derive(Debug, Error)]
pub enum CliError {
    /// `--only-enemy` needs to know whose side the replay shows.
    #[error("--only-enemy requires a viewer (use --viewer or set `viewer` in the config)")]
    MissingViewer,
    /// Reconstruction or report failure.
    #[error(transparent)]
    Recon(#[from] ReconError),
    /// Writing the report failed.
    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),
    /// Encoding the JSON report failed.
    #[error("Failed to encode report: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::MissingViewer
            | Self::Recon(ReconError::Config { .. } | ReconError::UnknownParty(_)) => EXIT_USAGE,
            Self::Recon(_) | Self::Io(_) | Self::Json(_) => EXIT_FAILURE,
        }
    }
}
