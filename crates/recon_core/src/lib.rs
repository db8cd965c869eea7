//! # Recon Core
//!
//! Build history reconstruction for fog-of-war turn-based matches.
//!
//! The game service hands out one document per turn, showing only what the
//! viewer could see. This crate merges those partial views into one history
//! per unit and fills in the build turns that were never observed, using the
//! fact that unit ids increase in creation order.
//!
//! This crate contains **only** reconstruction logic:
//! - No network access
//! - No argument parsing
//! - No printing
//!
//! ## Crate Structure
//!
//! - [`wire`] - Serde model of the per-turn document
//! - [`snapshot`] - Typed turn input and action events
//! - [`roster`] - The two competing parties
//! - [`unit`] - Merged unit records
//! - [`registry`] - Turn-by-turn merge
//! - [`inference`] - Build-turn backfill from id ordering
//! - [`cost`] - Price table fallback
//! - [`report`] - Day groups, running totals, production ratios
//! - [`source`] - Turn source trait and fetch loop
//! - [`config`] - RON settings

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod config;
pub mod cost;
pub mod error;
pub mod inference;
pub mod registry;
pub mod report;
pub mod roster;
pub mod snapshot;
pub mod source;
pub mod unit;
pub mod wire;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::ReconConfig;
    pub use crate::cost::CostResolver;
    pub use crate::error::{ReconError, Result};
    pub use crate::inference::{infer, InferenceSummary};
    pub use crate::registry::{MergeSummary, UnitRegistry};
    pub use crate::report::{
        aggregate, production_ratios, DayGroup, GroupSlot, RatioOptions, RatioReport,
        ReportFilter, UnitSummary,
    };
    pub use crate::roster::{Party, PartyId, Roster};
    pub use crate::snapshot::{ActionEvent, TurnSnapshot};
    pub use crate::source::{reconstruct, Reconstruction, SourceError, TurnSource};
    pub use crate::unit::{BuildTurn, Unit, UnitId, UnitKey};
    pub use crate::wire::{TurnDocument, UnitFields};
}
