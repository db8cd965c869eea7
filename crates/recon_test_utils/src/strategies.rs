//! Proptest strategies for merge and inference testing.
//!
//! Generated observations reveal a random subset of fields, the way the
//! service masks units outside the viewer's vision.

use proptest::prelude::*;
use recon_core::roster::PartyId;
use recon_core::snapshot::ActionEvent;
use recon_core::unit::UnitId;
use recon_core::wire::{Combatant, UnitFields, Waypoint};

const TYPES: &[&str] = &["Infantry", "Mech", "Recon", "Tank", "Artillery", "APC"];

/// Generate a unit id in `1..=max_id`.
pub fn arb_unit_id(max_id: u64) -> impl Strategy<Value = UnitId> {
    (1..=max_id.max(1)).prop_map(UnitId)
}

/// Generate one of the two fixture party ids.
pub fn arb_party() -> impl Strategy<Value = PartyId> {
    prop_oneof![Just(PartyId(1)), Just(PartyId(2))]
}

/// Generate a unit observation with randomly withheld fields.
pub fn arb_unit_fields(max_id: u64) -> impl Strategy<Value = UnitFields> {
    (
        arb_unit_id(max_id),
        proptest::option::of(arb_party()),
        proptest::option::of(proptest::sample::select(TYPES)),
        proptest::option::of((0i32..30, 0i32..30)),
        proptest::option::of(0u8..=10),
    )
        .prop_map(|(id, owner, type_name, position, hit_points)| UnitFields {
            id,
            owner,
            type_name: type_name.map(str::to_string),
            x: position.map(|(x, _)| x),
            y: position.map(|(_, y)| y),
            hit_points,
            ..Default::default()
        })
}

/// Generate a fire combatant.
pub fn arb_combatant(max_id: u64) -> impl Strategy<Value = Combatant> {
    (arb_unit_id(max_id), proptest::option::of(0u8..=10))
        .prop_map(|(id, hit_points)| Combatant { id, hit_points })
}

/// Generate any action event.
pub fn arb_action_event(max_id: u64) -> impl Strategy<Value = ActionEvent> {
    prop_oneof![
        arb_unit_fields(max_id).prop_map(ActionEvent::Build),
        (
            arb_unit_fields(max_id),
            proptest::collection::vec((0i32..30, 0i32..30), 0..4),
            proptest::option::of(0u32..10),
        )
            .prop_map(|(unit, path, distance)| ActionEvent::Move {
                unit,
                waypoints: path.into_iter().map(|(x, y)| Waypoint { x, y }).collect(),
                distance,
            }),
        (
            proptest::option::of(arb_combatant(max_id)),
            proptest::option::of(arb_combatant(max_id)),
            proptest::option::of(arb_party()),
        )
            .prop_map(|(attacker, defender, attacker_owner)| ActionEvent::Fire {
                attacker,
                defender,
                attacker_owner,
            }),
        (arb_unit_fields(max_id), proptest::option::of(arb_unit_id(max_id)))
            .prop_map(|(joined, absorbed)| ActionEvent::Join { joined, absorbed }),
        (arb_unit_fields(max_id), arb_unit_id(max_id))
            .prop_map(|(unit, transport)| ActionEvent::Unload { unit, transport }),
        proptest::collection::vec(arb_unit_fields(max_id), 1..3).prop_map(ActionEvent::Discover),
    ]
}

/// One turn of input: units visible at turn start and the action log.
pub type TurnInput = (Vec<UnitFields>, Vec<ActionEvent>);

/// Generate one turn of input.
pub fn arb_turn(max_id: u64) -> impl Strategy<Value = TurnInput> {
    (
        proptest::collection::vec(arb_unit_fields(max_id), 0..6),
        proptest::collection::vec(arb_action_event(max_id), 0..8),
    )
}

/// Generate a match of up to `max_turns` turns, turn 0 first.
pub fn arb_match(max_turns: usize, max_id: u64) -> impl Strategy<Value = Vec<TurnInput>> {
    proptest::collection::vec(arb_turn(max_id), 1..max_turns.max(2))
}
