//! Test fixtures and helpers.
//!
//! Pre-built rosters, unit observations and turn documents for consistent
//! testing. The two fixture parties are `alice` (id 1, moves first) and
//! `bob` (id 2).

use recon_core::registry::UnitRegistry;
use recon_core::roster::{PartyId, Roster};
use recon_core::snapshot::ActionEvent;
use recon_core::unit::UnitId;
use recon_core::wire::{Player, UnitFields};
use serde_json::{json, Value};

/// Id of the first-moving fixture party.
pub const ALICE: PartyId = PartyId(1);

/// Id of the second-moving fixture party.
pub const BOB: PartyId = PartyId(2);

/// A roster entry.
#[must_use]
pub fn player(id: PartyId, name: &str, order: u32) -> Player {
    Player {
        id,
        name: name.to_string(),
        order,
        funds: Some(1000),
        income: Some(1000),
        co_name: None,
    }
}

/// The two fixture parties.
#[must_use]
pub fn players() -> Vec<Player> {
    vec![player(ALICE, "alice", 1), player(BOB, "bob", 2)]
}

/// Roster of the two fixture parties.
///
/// # Panics
///
/// Never, the fixture always has two parties.
#[must_use]
pub fn roster() -> Roster {
    Roster::from_players(&players()).expect("fixture roster has two parties")
}

/// Empty registry for the fixture roster.
#[must_use]
pub fn registry() -> UnitRegistry {
    UnitRegistry::new(roster())
}

/// A fully visible unit at full health.
#[must_use]
pub fn unit(id: u64, owner: PartyId, type_name: &str) -> UnitFields {
    UnitFields {
        id: UnitId(id),
        owner: Some(owner),
        type_name: Some(type_name.to_string()),
        hit_points: Some(10),
        x: Some(0),
        y: Some(0),
        ..Default::default()
    }
}

/// A unit with every field except the id withheld.
#[must_use]
pub fn hidden(id: u64) -> UnitFields {
    UnitFields {
        id: UnitId(id),
        ..Default::default()
    }
}

/// A unit with a known cost.
#[must_use]
pub fn priced(id: u64, owner: PartyId, type_name: &str, cost: u32) -> UnitFields {
    UnitFields {
        cost: Some(cost),
        ..unit(id, owner, type_name)
    }
}

/// Registry for the reference scenario:
///
/// - unit 5 visible at turn 0 (pre-match)
/// - unit 10 built on turn 0
/// - unit 11 discovered on turn 1
/// - unit 12 built on turn 1
/// - unit 14 built on turn 2
///
/// Inference with `max_turn_observed = 2` should place unit 11 on turn 0.
#[must_use]
pub fn worked_example() -> UnitRegistry {
    let mut registry = registry();
    registry.merge(
        0,
        &[unit(5, ALICE, "Infantry")],
        &[ActionEvent::Build(unit(10, ALICE, "Tank"))],
    );
    registry.merge(
        1,
        &[],
        &[
            ActionEvent::Discover(vec![unit(11, ALICE, "Recon")]),
            ActionEvent::Build(unit(12, BOB, "Artillery")),
        ],
    );
    registry.merge(2, &[], &[ActionEvent::Build(unit(14, ALICE, "Mech"))]);
    registry
}

/// JSON for one unit observation, keyed the way the service sends it.
///
/// # Panics
///
/// Never, unit fields always serialize.
#[must_use]
pub fn unit_json(fields: &UnitFields) -> Value {
    serde_json::to_value(fields).expect("unit fields serialize")
}

/// A `Build` action.
#[must_use]
pub fn build_json(fields: &UnitFields) -> Value {
    json!({ "action": "Build", "newUnit": unit_json(fields) })
}

/// A `Move` action with a revealed path and total distance.
#[must_use]
pub fn move_json(fields: &UnitFields, path: &[(i32, i32)], dist: u32) -> Value {
    let global: Vec<Value> = path.iter().map(|(x, y)| json!({ "x": x, "y": y })).collect();
    json!({
        "action": "Move",
        "unit": unit_json(fields),
        "paths": { "global": global },
        "dist": dist,
    })
}

/// A `Fire` action. A `None` attacker is sent as `"?"`.
#[must_use]
pub fn fire_json(
    attacker: Option<(u64, u8)>,
    attacker_owner: PartyId,
    defender: (u64, u8),
) -> Value {
    let attacker = attacker.map_or_else(
        || json!("?"),
        |(id, hp)| json!({ "units_id": id, "units_hit_points": hp }),
    );
    json!({
        "action": "Fire",
        "attacker": attacker,
        "defender": { "units_id": defender.0, "units_hit_points": defender.1 },
        "copValues": { "attacker": { "playerId": attacker_owner.0 } },
    })
}

/// An `Unload` action.
#[must_use]
pub fn unload_json(fields: &UnitFields, transport: u64) -> Value {
    json!({ "action": "Unload", "unloadedUnit": unit_json(fields), "transportId": transport })
}

/// A `Join` action.
#[must_use]
pub fn join_json(joined: &UnitFields, absorbed: u64) -> Value {
    json!({ "action": "Join", "joinedUnit": unit_json(joined), "joinID": absorbed })
}

/// Attach a reveal payload to an action.
#[must_use]
pub fn with_discovered(mut action: Value, revealed: &[UnitFields]) -> Value {
    let units: Vec<Value> = revealed.iter().map(unit_json).collect();
    action["discovered"] = json!({ "units": units });
    action
}

/// A complete per-turn document.
#[must_use]
pub fn turn_json(players: &[Player], units: &[UnitFields], actions: Vec<Value>) -> Value {
    let players: serde_json::Map<String, Value> = players
        .iter()
        .map(|p| {
            (
                p.id.to_string(),
                json!({
                    "players_id": p.id.0,
                    "users_username": p.name,
                    "players_order": p.order,
                    "players_funds": p.funds,
                    "players_income": p.income,
                }),
            )
        })
        .collect();
    let units: serde_json::Map<String, Value> = units
        .iter()
        .map(|u| (u.id.to_string(), unit_json(u)))
        .collect();
    json!({
        "gameState": { "players": players, "units": units },
        "actions": actions,
    })
}

/// An error document, as sent past the last turn.
#[must_use]
pub fn error_json(message: &str) -> Value {
    json!({ "err": true, "message": message })
}
