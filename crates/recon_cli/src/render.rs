//! Report rendering.
//!
//! Text output mirrors the classic day listing:
//!
//! ```text
//! === DAY 1 (alice) ===
//! Tank (10HP) - 10
//! Recon (?) - 11
//! Running total: 11000
//! ```

use std::io::Write;

use serde::Serialize;

use recon_core::report::{DayGroup, GroupSlot, RatioReport};
use recon_core::source::{Reconstruction, SourceError};

use crate::CliError;

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Format {
    /// Human-readable listing.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

/// Report mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Mode {
    /// Units grouped by build day with running totals.
    #[default]
    Days,
    /// Share of each unit type in production.
    Ratios,
}

/// Fetch outcome shown alongside every report.
#[derive(Debug, Clone, Serialize)]
pub struct MatchInfo {
    /// Match identifier.
    pub match_id: String,
    /// Turns merged.
    pub turns: u32,
    /// Last turn merged.
    pub max_turn: u32,
    /// Why fetching stopped.
    pub stop_reason: String,
    /// Whether fetching ended before the real end of the data.
    pub partial: bool,
    /// Units given an inferred build turn.
    pub inferred: u32,
    /// Units whose build turn stayed unknown.
    pub unplaced: u32,
}

impl MatchInfo {
    /// Summarize a reconstruction.
    pub fn new(match_id: &str, result: &Reconstruction) -> Self {
        Self {
            match_id: match_id.to_string(),
            turns: result.turns_merged,
            max_turn: result.max_turn,
            stop_reason: result.stop_reason.to_string(),
            partial: !matches!(result.stop_reason, SourceError::Missing(_)),
            inferred: result.inference.assigned,
            unplaced: result.inference.unplaced,
        }
    }
}

#[derive(Serialize)]
struct DaysReport<'a> {
    #[serde(flatten)]
    info: &'a MatchInfo,
    groups: &'a [DayGroup],
}

#[derive(Serialize)]
struct RatiosReport<'a> {
    #[serde(flatten)]
    info: &'a MatchInfo,
    #[serde(flatten)]
    ratios: &'a RatioReport,
}

/// Header line for a day group.
pub fn group_header(group: &DayGroup) -> String {
    match (group.slot, group.display_day, group.owner.as_deref()) {
        (GroupSlot::Unplaced, _, _) => "=== UNPLACED ===".to_string(),
        (GroupSlot::PreMatch, _, _) => "=== DAY 0 (pre-match) ===".to_string(),
        (GroupSlot::Turn(_), Some(day), Some(owner)) => format!("=== DAY {day} ({owner}) ==="),
        (GroupSlot::Turn(turn), day, _) => {
            format!("=== DAY {} (turn {turn}) ===", day.unwrap_or_default())
        }
    }
}

/// Render day groups as text.
pub fn days_text(info: &MatchInfo, groups: &[DayGroup]) -> String {
    let mut out = String::new();
    out.push_str(&format!("Match {}: {} turns merged\n", info.match_id, info.turns));
    if info.partial {
        out.push_str(&format!("Partial data: {}\n", info.stop_reason));
    }

    for group in groups {
        out.push('\n');
        out.push_str(&group_header(group));
        out.push('\n');
        for unit in &group.units {
            out.push_str(&format!("{} ({}) - {}\n", unit.type_name, unit.status, unit.id));
        }
        match group.running_total {
            Some(total) => out.push_str(&format!("Running total: {total}\n")),
            None => out.push_str(&format!("Spent: {}\n", group.spent)),
        }
    }

    if groups.is_empty() {
        out.push_str("\nNo units found\n");
    }
    out
}

/// Render production ratios as text.
pub fn ratios_text(info: &MatchInfo, report: &RatioReport) -> String {
    let mut out = format!("=={}-TURN RATIOS==\n", info.turns);
    if report.ratios.is_empty() {
        out.push_str("No non-infantry units produced\n");
        return out;
    }
    for (type_name, ratio) in &report.ratios {
        let count = report.counts.get(type_name).copied().unwrap_or_default();
        out.push_str(&format!("{type_name}: {ratio} ({count})\n"));
    }
    out
}

/// Render day groups as JSON.
pub fn days_json(info: &MatchInfo, groups: &[DayGroup]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&DaysReport { info, groups })
}

/// Render production ratios as JSON.
pub fn ratios_json(info: &MatchInfo, report: &RatioReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&RatiosReport {
        info,
        ratios: report,
    })
}

/// Write a rendered report followed by a single newline.
pub fn write_report(out: &mut impl Write, text: &str) -> Result<(), CliError> {
    writeln!(out, "{}", text.trim_end())?;
    out.flush()?;
    Ok(())
}
