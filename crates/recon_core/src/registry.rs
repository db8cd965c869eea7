//! Accumulated view of every unit ever observed.
//!
//! Turns are merged one at a time in increasing order. Each merge folds the
//! turn-start snapshot into the registry, then replays the action log:
//!
//! - **Build** creates the unit and stamps its build turn.
//! - **Move** updates the position; a withheld destination is taken from the
//!   last revealed waypoint and the hidden remainder of the distance is kept
//!   as an extra-distance correction.
//! - **Fire** updates health of already known combatants. An attacker firing
//!   from fog becomes a hidden-artillery placeholder.
//! - **Join** updates the merged unit and zeroes the absorbed one.
//! - **Unload** updates the passenger; an unseen transport becomes a
//!   mystery-transport placeholder.
//! - **Discover** reveals units without any build-turn information.
//!
//! Each action is applied in full before the next one, so a later reveal
//! overrides what an earlier action implied. An effect on a unit the registry
//! has not seen yet is dropped. A turn already merged is skipped.
//!
//! Units are never removed. Destroyed units stay with health 0.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::roster::{PartyId, Roster};
use crate::snapshot::{ActionEvent, TurnSnapshot};
use crate::unit::{
    BuildTurn, Position, Unit, UnitId, UnitKey, HIDDEN_ARTILLERY, MYSTERY_TRANSPORT,
};
use crate::wire::{Combatant, UnitFields, Waypoint};

/// Counters describing one merge, for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeSummary {
    /// Turn merged.
    pub turn: u32,
    /// Records created.
    pub created: u32,
    /// Build events applied.
    pub built: u32,
    /// Placeholder records created.
    pub placeholders: u32,
    /// References to units the registry had never seen.
    pub unresolved: u32,
}

/// Registry of merged unit histories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitRegistry {
    roster: Roster,
    units: BTreeMap<UnitKey, Unit>,
    merged: BTreeSet<u32>,
    max_turn: Option<u32>,
}

impl UnitRegistry {
    /// Create an empty registry for a match.
    #[must_use]
    pub fn new(roster: Roster) -> Self {
        Self {
            roster,
            units: BTreeMap::new(),
            merged: BTreeSet::new(),
            max_turn: None,
        }
    }

    /// The match roster.
    #[must_use]
    pub const fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Highest turn merged so far.
    #[must_use]
    pub const fn max_turn(&self) -> Option<u32> {
        self.max_turn
    }

    /// Look up a record by key.
    #[must_use]
    pub fn get(&self, key: UnitKey) -> Option<&Unit> {
        self.units.get(&key)
    }

    /// Look up a record by service identifier.
    #[must_use]
    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&UnitKey::Known(id))
    }

    /// All records, identified units first in id order.
    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.units.values()
    }

    pub(crate) fn units_mut(&mut self) -> impl Iterator<Item = &mut Unit> {
        self.units.values_mut()
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Whether no unit has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Merge a typed snapshot.
    pub fn merge_snapshot(&mut self, snapshot: &TurnSnapshot) -> MergeSummary {
        self.merge(snapshot.turn, &snapshot.units, &snapshot.actions)
    }

    /// Merge one turn: the units visible at turn start, then the action log
    /// in order.
    ///
    /// A turn already merged is skipped and yields an empty summary.
    pub fn merge(
        &mut self,
        turn: u32,
        visible: &[UnitFields],
        actions: &[ActionEvent],
    ) -> MergeSummary {
        if !self.merged.insert(turn) {
            tracing::debug!(turn, "Turn already merged; skipping");
            return MergeSummary {
                turn,
                ..MergeSummary::default()
            };
        }

        let mut merge = TurnMerge {
            roster: &self.roster,
            units: &mut self.units,
            turn,
            touched: BTreeSet::new(),
            summary: MergeSummary {
                turn,
                ..MergeSummary::default()
            },
        };

        for fields in visible {
            let created = merge.upsert(fields);
            if created && turn == 0 {
                // Present before any action happened
                if let Some(unit) = merge.units.get_mut(&UnitKey::Known(fields.id)) {
                    unit.build_turn = Some(BuildTurn::PreMatch);
                }
            }
        }

        for (slot, action) in actions.iter().enumerate() {
            merge.apply(slot as u32, action);
        }

        let TurnMerge {
            touched, summary, ..
        } = merge;
        for key in touched {
            if let Some(unit) = self.units.get_mut(&key) {
                unit.last_seen = Some(unit.last_seen.map_or(turn, |seen| seen.max(turn)));
            }
        }
        self.max_turn = Some(self.max_turn.map_or(turn, |max| max.max(turn)));

        tracing::debug!(
            turn,
            created = summary.created,
            built = summary.built,
            placeholders = summary.placeholders,
            unresolved = summary.unresolved,
            total = self.units.len(),
            "Merged turn"
        );
        summary
    }
}

/// Working state of a single merge.
struct TurnMerge<'a> {
    roster: &'a Roster,
    units: &'a mut BTreeMap<UnitKey, Unit>,
    turn: u32,
    touched: BTreeSet<UnitKey>,
    summary: MergeSummary,
}

impl TurnMerge<'_> {
    /// Apply one action. `slot` is its index in the log.
    fn apply(&mut self, slot: u32, action: &ActionEvent) {
        match action {
            ActionEvent::Build(fields) => {
                self.upsert(fields);
                self.stamp_build(fields.id);
                self.summary.built += 1;
            }
            ActionEvent::Move {
                unit,
                waypoints,
                distance,
            } => {
                self.upsert(unit);
                self.settle_destination(unit, waypoints, *distance);
            }
            ActionEvent::Fire {
                attacker,
                defender,
                attacker_owner,
            } => {
                match attacker {
                    Some(attacker) => self.record_damage(attacker),
                    None => {
                        let key = UnitKey::Hidden {
                            turn: self.turn,
                            slot,
                        };
                        self.insert_placeholder(key, HIDDEN_ARTILLERY, *attacker_owner);
                    }
                }
                if let Some(defender) = defender {
                    self.record_damage(defender);
                }
            }
            ActionEvent::Join { joined, absorbed } => {
                self.upsert(joined);
                let Some(absorbed) = absorbed else {
                    return;
                };
                let key = UnitKey::Known(*absorbed);
                match self.units.get_mut(&key) {
                    Some(unit) => {
                        unit.health = Some(0);
                        self.touched.insert(key);
                    }
                    None => self.unresolved(*absorbed, "join"),
                }
            }
            ActionEvent::Unload { unit, transport } => {
                self.upsert(unit);
                let key = UnitKey::Known(*transport);
                match self.units.get_mut(&key) {
                    Some(carrier) => {
                        carrier.cargo.retain(|id| *id != unit.id);
                        self.touched.insert(key);
                    }
                    None => {
                        let owner = self
                            .units
                            .get(&UnitKey::Known(unit.id))
                            .and_then(|u| u.owner);
                        self.insert_placeholder(key, MYSTERY_TRANSPORT, owner);
                    }
                }
            }
            ActionEvent::Discover(revealed) => {
                for fields in revealed {
                    self.upsert(fields);
                }
            }
        }
    }

    /// Create or update the record for an observation. Returns whether the
    /// record was created.
    fn upsert(&mut self, fields: &UnitFields) -> bool {
        let key = UnitKey::Known(fields.id);
        let mut created = false;
        let unit = self.units.entry(key).or_insert_with(|| {
            created = true;
            Unit::new(key)
        });
        unit.absorb(fields);
        resolve_owner_name(self.roster, unit);
        self.touched.insert(key);
        if created {
            self.summary.created += 1;
        }
        created
    }

    fn stamp_build(&mut self, id: UnitId) {
        let turn = self.turn;
        let Some(unit) = self.units.get_mut(&UnitKey::Known(id)) else {
            return;
        };
        match unit.build_turn {
            Some(existing) if existing.is_direct() && existing != BuildTurn::Observed(turn) => {
                tracing::warn!(
                    unit = %id,
                    ?existing,
                    turn,
                    "Build event contradicts earlier evidence; keeping the earlier turn"
                );
            }
            _ => unit.build_turn = Some(BuildTurn::Observed(turn)),
        }
    }

    fn settle_destination(
        &mut self,
        fields: &UnitFields,
        waypoints: &[Waypoint],
        distance: Option<u32>,
    ) {
        let Some(unit) = self.units.get_mut(&UnitKey::Known(fields.id)) else {
            return;
        };
        if fields.position().is_some() {
            return;
        }
        let Some(last) = waypoints.last() else {
            return;
        };
        unit.position = Some(Position::new(last.x, last.y));
        if let Some(distance) = distance {
            let revealed = waypoints.len().saturating_sub(1) as u32;
            unit.extra_distance = Some(distance.saturating_sub(revealed));
        }
    }

    fn record_damage(&mut self, combatant: &Combatant) {
        let key = UnitKey::Known(combatant.id);
        match self.units.get_mut(&key) {
            Some(unit) => {
                if combatant.hit_points.is_some() {
                    unit.health = combatant.hit_points;
                }
                self.touched.insert(key);
            }
            None => self.unresolved(combatant.id, "fire"),
        }
    }

    fn insert_placeholder(&mut self, key: UnitKey, type_name: &str, owner: Option<PartyId>) {
        if !self.units.contains_key(&key) {
            let mut unit = Unit::placeholder(key, type_name, owner);
            resolve_owner_name(self.roster, &mut unit);
            self.units.insert(key, unit);
            self.summary.placeholders += 1;
            self.summary.created += 1;
            tracing::debug!(turn = self.turn, %key, type_name, "Created placeholder unit");
        }
        self.touched.insert(key);
    }

    fn unresolved(&mut self, id: UnitId, action: &str) {
        self.summary.unresolved += 1;
        tracing::debug!(turn = self.turn, unit = %id, action, "Reference to unknown unit");
    }
}

/// Fill in the owner's display name. An owner missing from the roster leaves
/// the name as it was.
fn resolve_owner_name(roster: &Roster, unit: &mut Unit) {
    let Some(owner) = unit.owner else {
        return;
    };
    match roster.name_of(owner) {
        Some(name) => unit.owner_name = Some(name.to_string()),
        None => tracing::debug!(unit = %unit.key, party = %owner, "Owner not in roster"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::Player;

    fn roster() -> Roster {
        let player = |id: u64, name: &str, order: u32| Player {
            id: PartyId(id),
            name: name.to_string(),
            order,
            funds: None,
            income: None,
            co_name: None,
        };
        Roster::from_players(&[player(1, "alice", 1), player(2, "bob", 2)]).unwrap()
    }

    fn unit(id: u64, owner: u64, name: &str) -> UnitFields {
        UnitFields {
            id: UnitId(id),
            owner: Some(PartyId(owner)),
            type_name: Some(name.to_string()),
            hit_points: Some(10),
            ..Default::default()
        }
    }

    #[test]
    fn test_turn_zero_units_are_pre_match() {
        let mut registry = UnitRegistry::new(roster());
        registry.merge(0, &[unit(1, 1, "Infantry")], &[]);

        let record = registry.unit(UnitId(1)).unwrap();
        assert_eq!(record.build_turn, Some(BuildTurn::PreMatch));
        assert_eq!(record.owner_name.as_deref(), Some("alice"));
        assert_eq!(record.last_seen, Some(0));
    }

    #[test]
    fn test_later_snapshot_units_have_no_build_turn() {
        let mut registry = UnitRegistry::new(roster());
        registry.merge(3, &[unit(8, 2, "Tank")], &[]);
        assert_eq!(registry.unit(UnitId(8)).unwrap().build_turn, None);
    }

    #[test]
    fn test_build_stamps_current_turn() {
        let mut registry = UnitRegistry::new(roster());
        registry.merge(0, &[], &[]);
        registry.merge(2, &[], &[ActionEvent::Discover(vec![unit(5, 1, "Tank")])]);
        registry.merge(4, &[], &[ActionEvent::Build(unit(6, 1, "Tank"))]);

        assert_eq!(registry.unit(UnitId(5)).unwrap().build_turn, None);
        assert_eq!(
            registry.unit(UnitId(6)).unwrap().build_turn,
            Some(BuildTurn::Observed(4))
        );
        assert_eq!(registry.max_turn(), Some(4));
    }

    #[test]
    fn test_build_does_not_overwrite_pre_match() {
        let mut registry = UnitRegistry::new(roster());
        registry.merge(0, &[unit(1, 1, "Infantry")], &[]);
        registry.merge(2, &[], &[ActionEvent::Build(unit(1, 1, "Infantry"))]);
        assert_eq!(
            registry.unit(UnitId(1)).unwrap().build_turn,
            Some(BuildTurn::PreMatch)
        );
    }

    #[test]
    fn test_hidden_destination_uses_last_waypoint() {
        let mut registry = UnitRegistry::new(roster());
        let hidden = UnitFields {
            id: UnitId(4),
            owner: Some(PartyId(2)),
            ..Default::default()
        };
        registry.merge(
            1,
            &[],
            &[ActionEvent::Move {
                unit: hidden,
                waypoints: vec![Waypoint { x: 1, y: 1 }, Waypoint { x: 2, y: 1 }],
                distance: Some(4),
            }],
        );

        let record = registry.unit(UnitId(4)).unwrap();
        assert_eq!(record.position, Some(Position::new(2, 1)));
        assert_eq!(record.extra_distance, Some(3));
    }

    #[test]
    fn test_fire_from_fog_creates_hidden_artillery() {
        let mut registry = UnitRegistry::new(roster());
        registry.merge(0, &[unit(1, 1, "Tank")], &[]);
        let summary = registry.merge(
            1,
            &[],
            &[ActionEvent::Fire {
                attacker: None,
                defender: Some(Combatant {
                    id: UnitId(1),
                    hit_points: Some(4),
                }),
                attacker_owner: Some(PartyId(2)),
            }],
        );

        assert_eq!(summary.placeholders, 1);
        assert_eq!(registry.unit(UnitId(1)).unwrap().health, Some(4));
        let artillery = registry.get(UnitKey::Hidden { turn: 1, slot: 0 }).unwrap();
        assert_eq!(artillery.type_name.as_deref(), Some(HIDDEN_ARTILLERY));
        assert_eq!(artillery.owner_name.as_deref(), Some("bob"));
    }

    #[test]
    fn test_fire_on_unknown_unit_is_ignored() {
        let mut registry = UnitRegistry::new(roster());
        let summary = registry.merge(
            1,
            &[],
            &[ActionEvent::Fire {
                attacker: Some(Combatant {
                    id: UnitId(9),
                    hit_points: Some(10),
                }),
                defender: None,
                attacker_owner: None,
            }],
        );
        assert_eq!(summary.unresolved, 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_unload_from_unseen_transport() {
        let mut registry = UnitRegistry::new(roster());
        registry.merge(
            3,
            &[],
            &[ActionEvent::Unload {
                unit: unit(12, 2, "Infantry"),
                transport: UnitId(11),
            }],
        );

        let transport = registry.unit(UnitId(11)).unwrap();
        assert_eq!(transport.type_name.as_deref(), Some(MYSTERY_TRANSPORT));
        assert_eq!(transport.owner, Some(PartyId(2)));
        assert_eq!(transport.health, None);
        assert_eq!(transport.last_seen, Some(3));
    }

    #[test]
    fn test_join_zeroes_absorbed_unit() {
        let mut registry = UnitRegistry::new(roster());
        registry.merge(0, &[unit(1, 1, "Tank"), unit(2, 1, "Tank")], &[]);
        registry.merge(
            2,
            &[],
            &[ActionEvent::Join {
                joined: unit(2, 1, "Tank"),
                absorbed: Some(UnitId(1)),
            }],
        );

        let absorbed = registry.unit(UnitId(1)).unwrap();
        assert_eq!(absorbed.health, Some(0));
        assert_eq!(absorbed.status(), "DEAD");
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_unknown_owner_leaves_name_unresolved() {
        let mut registry = UnitRegistry::new(roster());
        registry.merge(1, &[unit(3, 77, "Recon")], &[]);
        let record = registry.unit(UnitId(3)).unwrap();
        assert_eq!(record.owner, Some(PartyId(77)));
        assert_eq!(record.owner_name, None);
    }

    #[test]
    fn test_reveal_after_move_into_fog_wins() {
        let mut registry = UnitRegistry::new(roster());
        let fogged = UnitFields {
            id: UnitId(7),
            owner: Some(PartyId(2)),
            ..Default::default()
        };
        let revealed = UnitFields {
            x: Some(5),
            y: Some(5),
            ..unit(7, 2, "Recon")
        };
        registry.merge(
            2,
            &[],
            &[
                ActionEvent::Move {
                    unit: fogged,
                    waypoints: vec![Waypoint { x: 0, y: 0 }, Waypoint { x: 1, y: 0 }],
                    distance: Some(5),
                },
                ActionEvent::Discover(vec![revealed]),
            ],
        );

        let record = registry.unit(UnitId(7)).unwrap();
        assert_eq!(record.position, Some(Position::new(5, 5)));
        assert_eq!(record.extra_distance, None);
    }

    #[test]
    fn test_fire_before_reveal_does_not_touch_revealed_unit() {
        let mut registry = UnitRegistry::new(roster());
        let actions = [
            ActionEvent::Fire {
                attacker: None,
                defender: Some(Combatant {
                    id: UnitId(9),
                    hit_points: Some(3),
                }),
                attacker_owner: Some(PartyId(1)),
            },
            ActionEvent::Discover(vec![unit(9, 2, "Tank")]),
        ];
        let summary = registry.merge(4, &[], &actions);

        assert_eq!(summary.unresolved, 1);
        assert_eq!(registry.unit(UnitId(9)).unwrap().health, Some(10));

        let once = registry.clone();
        let again = registry.merge(4, &[], &actions);
        assert_eq!(again.created, 0);
        assert_eq!(registry, once);
    }
}
