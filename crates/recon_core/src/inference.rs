//! Build-turn inference from unit id ordering.
//!
//! Unit ids are handed out in creation order across both parties. So if the
//! smallest id seen being built on turn `t` is `n`, every still-unplaced unit
//! with an id below `n` already existed when turn `t` began, and the latest
//! it could have been built is the opponent's preceding turn, `t - 1`.
//!
//! The pass walks turns `-1, 1, 3, ...` (the pre-match pseudo-turn, then every
//! turn of the second mover) up to the last observed turn and backfills
//! against each boundary.
//!
//! When a turn past the start has no observed build, the boundary is treated
//! as unbounded and every still-unplaced unit is attributed to the previous
//! turn. That misplaces units when the second mover simply did not build, and
//! is kept as a known limitation of the heuristic.

use serde::{Deserialize, Serialize};

use crate::registry::UnitRegistry;
use crate::unit::BuildTurn;

/// Boundary used when a turn shows no direct build evidence.
pub const UNBOUNDED_THRESHOLD: u64 = u64::MAX;

/// Outcome of an inference pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InferenceSummary {
    /// Units given an inferred build turn.
    pub assigned: u32,
    /// Identified units still without a build turn.
    pub unplaced: u32,
}

/// Fill in unknown build turns using the id-ordering heuristic.
///
/// Direct evidence is never touched and the pass is idempotent.
pub fn infer(registry: &mut UnitRegistry, max_turn_observed: u32) -> InferenceSummary {
    let last = i64::from(max_turn_observed);
    let mut summary = InferenceSummary::default();

    let mut turn: i64 = -1;
    while turn <= last {
        let boundary = registry
            .units()
            .filter(|unit| {
                unit.build_turn
                    .is_some_and(|built| built.is_direct() && built.ordinal() == turn)
            })
            .filter_map(|unit| unit.id())
            .min();

        let threshold = match boundary {
            Some(id) => id.0,
            // Nothing produced yet, so there is no boundary to backfill against
            None if turn <= 0 => {
                turn += 2;
                continue;
            }
            None => UNBOUNDED_THRESHOLD,
        };

        for unit in registry.units_mut() {
            let below = unit.id().is_some_and(|id| id.0 < threshold);
            if below && unit.build_turn.is_none() {
                unit.build_turn = Some(BuildTurn::inferred(turn - 1));
                summary.assigned += 1;
            }
        }

        turn += 2;
    }

    summary.unplaced = registry
        .units()
        .filter(|unit| unit.id().is_some() && unit.build_turn.is_none())
        .count() as u32;

    tracing::info!(
        assigned = summary.assigned,
        unplaced = summary.unplaced,
        max_turn_observed,
        "Build-turn inference complete"
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::{PartyId, Roster};
    use crate::snapshot::ActionEvent;
    use crate::unit::UnitId;
    use crate::wire::{Player, UnitFields};

    fn registry() -> UnitRegistry {
        let player = |id: u64, order: u32| Player {
            id: PartyId(id),
            name: format!("p{id}"),
            order,
            funds: None,
            income: None,
            co_name: None,
        };
        UnitRegistry::new(Roster::from_players(&[player(1, 1), player(2, 2)]).unwrap())
    }

    fn fields(id: u64) -> UnitFields {
        UnitFields {
            id: UnitId(id),
            ..Default::default()
        }
    }

    fn build_turn(registry: &UnitRegistry, id: u64) -> Option<BuildTurn> {
        registry.unit(UnitId(id)).and_then(|u| u.build_turn)
    }

    #[test]
    fn test_backfills_to_previous_turn() {
        let mut registry = registry();
        registry.merge(0, &[fields(5)], &[ActionEvent::Build(fields(10))]);
        registry.merge(
            1,
            &[],
            &[
                ActionEvent::Discover(vec![fields(11)]),
                ActionEvent::Build(fields(12)),
            ],
        );
        registry.merge(2, &[], &[ActionEvent::Build(fields(14))]);

        let summary = infer(&mut registry, 2);

        assert_eq!(summary.assigned, 1);
        assert_eq!(build_turn(&registry, 11), Some(BuildTurn::Inferred(0)));
        assert_eq!(build_turn(&registry, 5), Some(BuildTurn::PreMatch));
        assert_eq!(build_turn(&registry, 10), Some(BuildTurn::Observed(0)));
        assert_eq!(build_turn(&registry, 12), Some(BuildTurn::Observed(1)));
        assert_eq!(build_turn(&registry, 14), Some(BuildTurn::Observed(2)));
    }

    #[test]
    fn test_units_older_than_pre_match_are_pre_match() {
        let mut registry = registry();
        registry.merge(0, &[fields(5)], &[]);
        registry.merge(1, &[], &[ActionEvent::Discover(vec![fields(3)])]);

        infer(&mut registry, 1);

        assert_eq!(build_turn(&registry, 3), Some(BuildTurn::InferredPreMatch));
    }

    #[test]
    fn test_turn_without_builds_uses_unbounded_threshold() {
        // Turn 1 shows no build, so both discoveries land on turn 0 even
        // though unit 40 may have been built later.
        let mut registry = registry();
        registry.merge(0, &[], &[]);
        registry.merge(
            1,
            &[],
            &[ActionEvent::Discover(vec![fields(20), fields(40)])],
        );

        infer(&mut registry, 1);

        assert_eq!(build_turn(&registry, 20), Some(BuildTurn::Inferred(0)));
        assert_eq!(build_turn(&registry, 40), Some(BuildTurn::Inferred(0)));
    }

    #[test]
    fn test_short_match_leaves_units_unplaced() {
        let mut registry = registry();
        registry.merge(0, &[], &[ActionEvent::Discover(vec![fields(8)])]);

        let summary = infer(&mut registry, 0);

        assert_eq!(summary.assigned, 0);
        assert_eq!(summary.unplaced, 1);
        assert_eq!(build_turn(&registry, 8), None);
    }

    #[test]
    fn test_inference_is_idempotent() {
        let mut registry = registry();
        registry.merge(0, &[fields(1)], &[ActionEvent::Build(fields(2))]);
        registry.merge(
            1,
            &[],
            &[
                ActionEvent::Discover(vec![fields(3)]),
                ActionEvent::Build(fields(4)),
            ],
        );
        registry.merge(3, &[], &[ActionEvent::Discover(vec![fields(6)])]);

        infer(&mut registry, 3);
        let once = registry.clone();
        infer(&mut registry, 3);

        assert_eq!(registry, once);
    }
}
