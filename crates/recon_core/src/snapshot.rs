//! Typed per-turn input to the registry.

use crate::roster::PartyId;
use crate::unit::UnitId;
use crate::wire::{ActionKind, Combatant, Player, UnitFields, Waypoint};

/// One event of a turn's action log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionEvent {
    /// A unit was produced this turn.
    Build(UnitFields),
    /// A unit moved. When its destination is withheld, the last revealed
    /// waypoint stands in for it.
    Move {
        /// The moving unit.
        unit: UnitFields,
        /// Revealed path, start first.
        waypoints: Vec<Waypoint>,
        /// Total distance travelled, including hidden steps.
        distance: Option<u32>,
    },
    /// Two units exchanged fire.
    Fire {
        /// Attacker, if it revealed itself.
        attacker: Option<Combatant>,
        /// Defender, if revealed.
        defender: Option<Combatant>,
        /// Side-channel owner of the attacker.
        attacker_owner: Option<PartyId>,
    },
    /// Two units merged.
    Join {
        /// The merged unit.
        joined: UnitFields,
        /// The absorbed unit.
        absorbed: Option<UnitId>,
    },
    /// A unit left a transport.
    Unload {
        /// The disembarked unit.
        unit: UnitFields,
        /// The carrying transport.
        transport: UnitId,
    },
    /// Previously hidden units came into view.
    Discover(Vec<UnitFields>),
}

impl ActionEvent {
    /// Convert a wire payload. Actions without unit history yield `None`.
    #[must_use]
    pub fn from_kind(kind: ActionKind) -> Option<Self> {
        Some(match kind {
            ActionKind::Build { new_unit } => Self::Build(new_unit),
            ActionKind::Move { unit, paths, dist } => Self::Move {
                unit,
                waypoints: paths.map(|p| p.global).unwrap_or_default(),
                distance: dist,
            },
            ActionKind::Fire {
                attacker,
                defender,
                cop_values,
            } => Self::Fire {
                attacker,
                defender,
                attacker_owner: cop_values
                    .and_then(|c| c.attacker)
                    .map(|side| side.player_id),
            },
            ActionKind::Join {
                joined_unit,
                absorbed_id,
            } => Self::Join {
                joined: joined_unit,
                absorbed: absorbed_id,
            },
            ActionKind::Unload {
                unloaded_unit,
                transport_id,
            } => Self::Unload {
                unit: unloaded_unit,
                transport: transport_id,
            },
            ActionKind::Other => return None,
        })
    }
}

/// Everything visible at the start of one turn, plus what happened during it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnSnapshot {
    /// Turn index, starting at 0.
    pub turn: u32,
    /// Roster as listed this turn.
    pub players: Vec<Player>,
    /// Units visible at turn start.
    pub units: Vec<UnitFields>,
    /// Action log in order.
    pub actions: Vec<ActionEvent>,
}
