//! Display-ready production reports.
//!
//! [`aggregate`] groups units by build turn and keeps a running production
//! total per party. Parties alternate, so even turns belong to the first
//! mover and odd turns to the second; each running total only counts units
//! owned by the party whose turn it was.
//!
//! [`production_ratios`] is the opening-analysis view: the share of each
//! unit type in a party's production, as a percentage string.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::cost::CostResolver;
use crate::error::{ReconError, Result};
use crate::registry::UnitRegistry;
use crate::roster::{Parity, Party, PartyId};
use crate::unit::{BuildTurn, Unit};

/// Day number shown for a turn index: two turns per day, starting at day 1.
#[must_use]
pub const fn display_day(turn: i64) -> i64 {
    turn.div_euclid(2) + 1
}

/// Build-turn bucket a unit is reported under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "turn", rename_all = "snake_case")]
pub enum GroupSlot {
    /// Existed before the match started.
    PreMatch,
    /// Built on this turn, observed or inferred.
    Turn(u32),
    /// Build turn could not be determined.
    Unplaced,
}

impl GroupSlot {
    /// Slot for a unit's build turn.
    #[must_use]
    pub const fn of(build_turn: Option<BuildTurn>) -> Self {
        match build_turn {
            None => Self::Unplaced,
            Some(BuildTurn::PreMatch | BuildTurn::InferredPreMatch) => Self::PreMatch,
            Some(BuildTurn::Observed(turn) | BuildTurn::Inferred(turn)) => Self::Turn(turn),
        }
    }

    /// Day shown for this slot. Pre-match units show as day 0.
    #[must_use]
    pub const fn display_day(&self) -> Option<i64> {
        match self {
            Self::PreMatch => Some(display_day(-1)),
            Self::Turn(turn) => Some(display_day(*turn as i64)),
            Self::Unplaced => None,
        }
    }
}

/// How a unit's build turn was established.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Evidence {
    /// Present at match start.
    PreMatch,
    /// Seen being built.
    Observed,
    /// Assigned by id ordering.
    Inferred,
    /// Unknown.
    Unplaced,
}

impl From<Option<BuildTurn>> for Evidence {
    fn from(build_turn: Option<BuildTurn>) -> Self {
        match build_turn {
            None => Self::Unplaced,
            Some(BuildTurn::PreMatch) => Self::PreMatch,
            Some(BuildTurn::Observed(_)) => Self::Observed,
            Some(BuildTurn::Inferred(_) | BuildTurn::InferredPreMatch) => Self::Inferred,
        }
    }
}

/// One unit line of a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitSummary {
    /// Unit id, or a `?turn.slot` label for unidentified placeholders.
    pub id: String,
    /// Type name, `"?"` if never revealed.
    pub type_name: String,
    /// Owner display name.
    pub owner: Option<String>,
    /// Production cost, from the service or the price table.
    pub cost: u32,
    /// `"<n>HP"`, `"DEAD"`, or `"?"`.
    pub status: String,
    /// How the build turn was established.
    pub evidence: Evidence,
}

impl UnitSummary {
    /// Summarize a unit record.
    #[must_use]
    pub fn new(unit: &Unit, costs: &CostResolver) -> Self {
        let type_name = unit.type_name.clone().unwrap_or_else(|| "?".to_string());
        Self {
            id: unit.key.to_string(),
            cost: costs.resolve(&type_name, unit.cost),
            type_name,
            owner: unit.owner_name.clone(),
            status: unit.status(),
            evidence: unit.build_turn.into(),
        }
    }
}

/// Units built on one turn, with the builder's running total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayGroup {
    /// Build-turn bucket.
    pub slot: GroupSlot,
    /// Day shown to the reader.
    pub display_day: Option<i64>,
    /// Party whose turn it was. Pre-match and unplaced groups have none.
    pub owner: Option<String>,
    /// Units in id order.
    pub units: Vec<UnitSummary>,
    /// Spend in this group. For turn groups only the owner's units count.
    pub spent: u64,
    /// Owner's cumulative spend up to and including this group.
    pub running_total: Option<u64>,
}

/// Whose production to include.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFilter {
    /// Both parties.
    #[default]
    All,
    /// Only the opponent of the named party.
    EnemyOf(String),
}

/// Ordered day groups, consumed once.
#[derive(Debug)]
pub struct DayGroups {
    inner: std::vec::IntoIter<DayGroup>,
}

impl Iterator for DayGroups {
    type Item = DayGroup;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for DayGroups {}

/// Group units by build turn and compute each party's running spend.
///
/// # Errors
/// Returns [`ReconError::UnknownParty`] if the filter names a party that is
/// not in the roster.
pub fn aggregate(
    registry: &UnitRegistry,
    costs: &CostResolver,
    filter: &ReportFilter,
) -> Result<DayGroups> {
    let roster = registry.roster();
    let viewer: Option<&Party> = match filter {
        ReportFilter::All => None,
        ReportFilter::EnemyOf(name) => Some(
            roster
                .by_name(name)
                .ok_or_else(|| ReconError::UnknownParty(name.clone()))?,
        ),
    };

    let mut slots: BTreeMap<GroupSlot, Vec<&Unit>> = BTreeMap::new();
    for unit in registry.units() {
        slots
            .entry(GroupSlot::of(unit.build_turn))
            .or_default()
            .push(unit);
    }

    let mut totals: BTreeMap<PartyId, u64> = BTreeMap::new();
    let mut groups = Vec::with_capacity(slots.len());
    for (slot, mut units) in slots {
        let owner = match slot {
            GroupSlot::Turn(turn) => Some(roster.owner_of_parity(Parity::of(turn as i64))),
            GroupSlot::PreMatch | GroupSlot::Unplaced => None,
        };

        if let Some(viewer) = viewer {
            match owner {
                Some(owner) if owner.id == viewer.id => continue,
                Some(_) => {}
                None => units.retain(|unit| unit.owner != Some(viewer.id)),
            }
        }
        if units.is_empty() {
            continue;
        }

        let summaries: Vec<UnitSummary> = units
            .iter()
            .map(|unit| UnitSummary::new(unit, costs))
            .collect();
        let spent: u64 = units
            .iter()
            .zip(&summaries)
            .filter(|(unit, _)| owner.map_or(true, |owner| unit.owner == Some(owner.id)))
            .map(|(_, summary)| u64::from(summary.cost))
            .sum();
        let running_total = owner.map(|owner| {
            let total = totals.entry(owner.id).or_insert(0);
            *total += spent;
            *total
        });

        groups.push(DayGroup {
            slot,
            display_day: slot.display_day(),
            owner: owner.map(|owner| owner.name.clone()),
            units: summaries,
            spent,
            running_total,
        });
    }

    Ok(DayGroups {
        inner: groups.into_iter(),
    })
}

/// Options for [`production_ratios`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatioOptions {
    /// Only count this party's units.
    pub party: Option<PartyId>,
    /// Only count units built on or before this day.
    pub day_limit: Option<u32>,
    /// Unit types left out of the count, matched case-insensitively.
    pub excluded_types: Vec<String>,
}

impl Default for RatioOptions {
    fn default() -> Self {
        Self {
            party: None,
            day_limit: None,
            excluded_types: vec!["Infantry".to_string()],
        }
    }
}

/// Share of each unit type in production.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatioReport {
    /// Units counted per type.
    pub counts: BTreeMap<String, u32>,
    /// Units counted in total.
    pub total: u32,
    /// Percentage per type, e.g. `"33.33%"`.
    pub ratios: BTreeMap<String, String>,
}

/// Render a percentage rounded to two decimals with a trailing `%`.
/// Whole values keep one decimal: `50.0%`.
#[must_use]
pub fn format_percent(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{rounded:.1}%")
    } else {
        format!("{rounded}%")
    }
}

/// Compute each unit type's share of production.
///
/// Only units built during the match count; pre-match, unplaced, and
/// placeholder records are skipped.
#[must_use]
pub fn production_ratios(registry: &UnitRegistry, options: &RatioOptions) -> RatioReport {
    let mut counts: BTreeMap<String, u32> = BTreeMap::new();
    for unit in registry.units() {
        let Some(turn) = unit.build_turn.and_then(|built| built.turn()) else {
            continue;
        };
        let Some(type_name) = unit.type_name.as_deref() else {
            continue;
        };
        if unit.is_placeholder()
            || options
                .excluded_types
                .iter()
                .any(|excluded| excluded.eq_ignore_ascii_case(type_name))
        {
            continue;
        }
        if options.party.is_some_and(|party| unit.owner != Some(party)) {
            continue;
        }
        if options
            .day_limit
            .is_some_and(|limit| display_day(turn as i64) > i64::from(limit))
        {
            continue;
        }
        *counts.entry(type_name.to_string()).or_default() += 1;
    }

    let total: u32 = counts.values().sum();
    let ratios = counts
        .iter()
        .map(|(name, count)| {
            let share = f64::from(*count) / f64::from(total) * 100.0;
            (name.clone(), format_percent(share))
        })
        .collect();

    RatioReport {
        counts,
        total,
        ratios,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_day() {
        assert_eq!(display_day(-1), 0);
        assert_eq!(display_day(0), 1);
        assert_eq!(display_day(1), 1);
        assert_eq!(display_day(2), 2);
        assert_eq!(display_day(7), 4);
    }

    #[test]
    fn test_slots_sort_pre_match_first_unplaced_last() {
        let mut slots = vec![
            GroupSlot::Unplaced,
            GroupSlot::Turn(3),
            GroupSlot::PreMatch,
            GroupSlot::Turn(0),
        ];
        slots.sort();
        assert_eq!(
            slots,
            vec![
                GroupSlot::PreMatch,
                GroupSlot::Turn(0),
                GroupSlot::Turn(3),
                GroupSlot::Unplaced
            ]
        );
        assert_eq!(GroupSlot::PreMatch.display_day(), Some(0));
        assert_eq!(GroupSlot::Unplaced.display_day(), None);
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(100.0 / 3.0), "33.33%");
        assert_eq!(format_percent(200.0 / 3.0), "66.67%");
        assert_eq!(format_percent(50.0), "50.0%");
        assert_eq!(format_percent(12.5), "12.5%");
    }

    #[test]
    fn test_evidence_from_build_turn() {
        assert_eq!(Evidence::from(None), Evidence::Unplaced);
        assert_eq!(Evidence::from(Some(BuildTurn::Inferred(2))), Evidence::Inferred);
        assert_eq!(Evidence::from(Some(BuildTurn::PreMatch)), Evidence::PreMatch);
        assert_eq!(
            Evidence::from(Some(BuildTurn::InferredPreMatch)),
            Evidence::Inferred
        );
        assert_eq!(
            GroupSlot::of(Some(BuildTurn::InferredPreMatch)),
            GroupSlot::PreMatch
        );
    }
}
