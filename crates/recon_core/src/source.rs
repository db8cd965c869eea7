//! Sequential turn fetching.
//!
//! Turns are requested one at a time, from 0 upwards, and merged as they
//! arrive. The first failure of any kind ends the loop: a transport error, a
//! service-reported error, and the real end of the match all look the same
//! from here. Whatever was merged up to that point is still reported.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ReconConfig;
use crate::error::{ReconError, Result};
use crate::inference::{infer, InferenceSummary};
use crate::registry::UnitRegistry;
use crate::roster::Roster;
use crate::wire::TurnDocument;

/// Turn ceiling applied when nothing else is configured.
pub const DEFAULT_TURN_CEILING: u32 = 100;

/// Why a turn could not be obtained.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum SourceError {
    /// The request itself failed.
    #[error("Transport failure: {0}")]
    Transport(String),
    /// The service answered with an error payload.
    #[error("Service reported error: {0}")]
    ServiceReported(String),
    /// The document could not be decoded.
    #[error("Malformed document for turn {turn}: {message}")]
    Malformed {
        /// Turn requested.
        turn: u32,
        /// Decoder message.
        message: String,
    },
    /// No document exists for this turn.
    #[error("No document for turn {0}")]
    Missing(u32),
    /// The configured turn ceiling was reached.
    #[error("Turn ceiling {0} reached")]
    CeilingReached(u32),
}

/// Supplier of per-turn documents.
pub trait TurnSource {
    /// Fetch the document for one turn.
    fn load_turn(&mut self, turn: u32) -> std::result::Result<TurnDocument, SourceError>;
}

impl<F> TurnSource for F
where
    F: FnMut(u32) -> std::result::Result<TurnDocument, SourceError>,
{
    fn load_turn(&mut self, turn: u32) -> std::result::Result<TurnDocument, SourceError> {
        self(turn)
    }
}

/// Result of fetching, merging and inferring a whole match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconstruction {
    /// Merged and inferred registry.
    pub registry: UnitRegistry,
    /// Last turn merged.
    pub max_turn: u32,
    /// Number of turns merged.
    pub turns_merged: u32,
    /// What ended the fetch loop.
    pub stop_reason: SourceError,
    /// Inference outcome.
    pub inference: InferenceSummary,
}

/// Fetch turns from `source` until the first failure, then run inference.
///
/// # Errors
/// Returns [`ReconError::NoData`] if turn 0 cannot be obtained and
/// [`ReconError::PreconditionViolation`] if its roster is not exactly two
/// parties.
pub fn reconstruct<S>(source: &mut S, config: &ReconConfig) -> Result<Reconstruction>
where
    S: TurnSource + ?Sized,
{
    let ceiling = config.turn_ceiling.max(1);
    let first = source
        .load_turn(0)
        .and_then(|doc| doc.into_snapshot(0))
        .map_err(ReconError::NoData)?;

    let roster = Roster::from_players(&first.players)?;
    let [a, b] = roster.parties();
    tracing::info!(first = %a.name, second = %b.name, "Roster loaded");

    let mut registry = UnitRegistry::new(roster);
    registry.merge_snapshot(&first);

    let mut turn = 1;
    let stop_reason = loop {
        if turn >= ceiling {
            break SourceError::CeilingReached(ceiling);
        }
        tracing::debug!(turn, day = turn / 2 + 1, "Gathering turn");
        match source.load_turn(turn).and_then(|doc| doc.into_snapshot(turn)) {
            Ok(snapshot) => {
                registry.merge_snapshot(&snapshot);
                turn += 1;
            }
            Err(reason) => break reason,
        }
    };

    let max_turn = turn - 1;
    match &stop_reason {
        SourceError::Missing(_) => {
            tracing::info!(turns = turn, "No further turns available");
        }
        reason => {
            tracing::warn!(turns = turn, %reason, "Stopped fetching; reporting partial data");
        }
    }

    let inference = infer(&mut registry, max_turn);
    Ok(Reconstruction {
        registry,
        max_turn,
        turns_merged: turn,
        stop_reason,
        inference,
    })
}
