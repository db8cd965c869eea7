//! # Recon Test Utilities
//!
//! Shared testing utilities for all crates:
//! - Fixture builders for rosters, unit fields and turn documents
//! - The reference worked-example registry
//! - Property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod strategies;

/// Re-export proptest for convenience.
pub use proptest;
