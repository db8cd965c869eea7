//! Serde model of the per-turn replay document.
//!
//! The game service hides fields of units outside friendly vision. A hidden
//! field may arrive as `"?"`, as `null`, or not at all; all three deserialize
//! to `None`. Keyed collections may arrive as a JSON object keyed by id or,
//! when empty, as a bare `[]`.
//!
//! # Example
//!
//! ```json
//! {
//!   "gameState": {
//!     "players": { "11": { "players_id": 11, "users_username": "alice", "players_order": 1 } },
//!     "units": { "5": { "units_id": 5, "units_players_id": 11, "units_name": "Infantry" } }
//!   },
//!   "actions": [
//!     { "action": "Build", "newUnit": { "units_id": 10, "units_name": "Tank" } }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::roster::PartyId;
use crate::snapshot::{ActionEvent, TurnSnapshot};
use crate::source::SourceError;
use crate::unit::{Position, UnitId};

/// Deserializers for fields the service may withhold.
pub mod masked {
    use serde::de::IgnoredAny;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Revealed<T> {
        Value(T),
        Hidden(IgnoredAny),
    }

    /// Deserialize a value that may be replaced by a placeholder.
    ///
    /// Anything that does not parse as `T` is treated as withheld.
    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Ok(match Option::<Revealed<T>>::deserialize(deserializer)? {
            Some(Revealed::Value(value)) => Some(value),
            Some(Revealed::Hidden(_)) | None => None,
        })
    }
}

/// Deserializer for collections sent either as an id-keyed object or a list.
pub mod keyed {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Keyed<T> {
        Map(BTreeMap<String, T>),
        List(Vec<T>),
    }

    /// Collect the values of a keyed collection, discarding the keys.
    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Ok(match Option::<Keyed<T>>::deserialize(deserializer)? {
            Some(Keyed::Map(map)) => map.into_values().collect(),
            Some(Keyed::List(list)) => list,
            None => Vec::new(),
        })
    }
}

/// One participant as listed in the turn's roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Stable participant identifier.
    #[serde(rename = "players_id")]
    pub id: PartyId,
    /// Display name.
    #[serde(rename = "users_username")]
    pub name: String,
    /// Turn-order rank; the lower rank acts on even turns.
    #[serde(rename = "players_order")]
    pub order: u32,
    /// Funds at turn start, when visible.
    #[serde(rename = "players_funds", default, deserialize_with = "masked::deserialize")]
    pub funds: Option<u32>,
    /// Income per day, when visible.
    #[serde(rename = "players_income", default, deserialize_with = "masked::deserialize")]
    pub income: Option<u32>,
    /// Commanding officer name.
    #[serde(default, deserialize_with = "masked::deserialize")]
    pub co_name: Option<String>,
}

/// Observed fields of one unit. Everything except the id may be withheld.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitFields {
    /// Service-assigned identifier.
    #[serde(rename = "units_id")]
    pub id: UnitId,
    /// Owning participant.
    #[serde(rename = "units_players_id", default, deserialize_with = "masked::deserialize")]
    pub owner: Option<PartyId>,
    /// Unit type name, e.g. `"Tank"`.
    #[serde(rename = "units_name", default, deserialize_with = "masked::deserialize")]
    pub type_name: Option<String>,
    /// Production price.
    #[serde(rename = "units_cost", default, deserialize_with = "masked::deserialize")]
    pub cost: Option<u32>,
    /// Column.
    #[serde(rename = "units_x", default, deserialize_with = "masked::deserialize")]
    pub x: Option<i32>,
    /// Row.
    #[serde(rename = "units_y", default, deserialize_with = "masked::deserialize")]
    pub y: Option<i32>,
    /// Displayed hit points; zero means destroyed.
    #[serde(rename = "units_hit_points", default, deserialize_with = "masked::deserialize")]
    pub hit_points: Option<u8>,
    /// First carried unit.
    #[serde(rename = "units_cargo1_units_id", default, deserialize_with = "masked::deserialize")]
    pub cargo1: Option<UnitId>,
    /// Second carried unit.
    #[serde(rename = "units_cargo2_units_id", default, deserialize_with = "masked::deserialize")]
    pub cargo2: Option<UnitId>,
}

impl UnitFields {
    /// Position if both coordinates were revealed.
    #[must_use]
    pub fn position(&self) -> Option<Position> {
        Some(Position::new(self.x?, self.y?))
    }

    /// Carried unit ids. The service uses `0` for an empty slot.
    pub fn cargo(&self) -> impl Iterator<Item = UnitId> + '_ {
        [self.cargo1, self.cargo2]
            .into_iter()
            .flatten()
            .filter(|id| id.0 != 0)
    }
}

/// Attacker or defender of a fire action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combatant {
    /// Unit identifier.
    #[serde(rename = "units_id")]
    pub id: UnitId,
    /// Hit points after the exchange.
    #[serde(rename = "units_hit_points", default, deserialize_with = "masked::deserialize")]
    pub hit_points: Option<u8>,
}

/// Path step of a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Waypoint {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

/// Revealed path of a move.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovePaths {
    /// Waypoints visible to the viewer, start first.
    #[serde(default)]
    pub global: Vec<Waypoint>,
}

/// Side-channel ownership of one side of a fire action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopSide {
    /// Participant owning that side.
    #[serde(rename = "playerId")]
    pub player_id: PartyId,
}

/// Side-channel ownership hints of a fire action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopValues {
    /// Attacking side.
    #[serde(default, deserialize_with = "masked::deserialize")]
    pub attacker: Option<CopSide>,
    /// Defending side.
    #[serde(default, deserialize_with = "masked::deserialize")]
    pub defender: Option<CopSide>,
}

/// Units revealed as a side effect of an action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discovered {
    /// Newly visible units.
    #[serde(default, deserialize_with = "keyed::deserialize")]
    pub units: Vec<UnitFields>,
}

/// Action-specific payload, tagged by the `action` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum ActionKind {
    /// A unit was produced.
    Build {
        /// The produced unit.
        #[serde(rename = "newUnit")]
        new_unit: UnitFields,
    },
    /// A unit moved.
    Move {
        /// The moving unit at its destination.
        unit: UnitFields,
        /// Revealed path.
        #[serde(default, deserialize_with = "masked::deserialize")]
        paths: Option<MovePaths>,
        /// Total distance travelled, including hidden steps.
        #[serde(default, deserialize_with = "masked::deserialize")]
        dist: Option<u32>,
    },
    /// Two units exchanged fire.
    Fire {
        /// Attacker, withheld when firing from fog.
        #[serde(default, deserialize_with = "masked::deserialize")]
        attacker: Option<Combatant>,
        /// Defender.
        #[serde(default, deserialize_with = "masked::deserialize")]
        defender: Option<Combatant>,
        /// Ownership hints.
        #[serde(rename = "copValues", default, deserialize_with = "masked::deserialize")]
        cop_values: Option<CopValues>,
    },
    /// Two units merged into one.
    Join {
        /// The surviving, merged unit.
        #[serde(rename = "joinedUnit")]
        joined_unit: UnitFields,
        /// The absorbed unit.
        #[serde(rename = "joinID", default, deserialize_with = "masked::deserialize")]
        absorbed_id: Option<UnitId>,
    },
    /// A unit left its transport.
    Unload {
        /// The disembarked unit.
        #[serde(rename = "unloadedUnit")]
        unloaded_unit: UnitFields,
        /// The carrying transport.
        #[serde(rename = "transportId")]
        transport_id: UnitId,
    },
    /// Captures, powers, end of turn and anything else without unit history.
    #[serde(other)]
    Other,
}

/// One entry of the turn's action log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    /// Tagged payload.
    #[serde(flatten)]
    pub kind: ActionKind,
    /// Reveal payload.
    #[serde(default, deserialize_with = "masked::deserialize")]
    pub discovered: Option<Discovered>,
}

/// Board state at turn start.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    /// Roster.
    #[serde(default, deserialize_with = "keyed::deserialize")]
    pub players: Vec<Player>,
    /// Currently visible units.
    #[serde(default, deserialize_with = "keyed::deserialize")]
    pub units: Vec<UnitFields>,
    /// Participant whose turn this is.
    #[serde(rename = "currentTurnPId", default, deserialize_with = "masked::deserialize")]
    pub current_turn_party: Option<PartyId>,
}

/// A complete per-turn document as returned by the game service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TurnDocument {
    /// Board state, absent on error responses.
    #[serde(rename = "gameState", default)]
    pub game_state: Option<GameState>,
    /// Raw action log. Entries are decoded one by one so a single
    /// unrecognised shape does not discard the whole turn.
    #[serde(default)]
    pub actions: Vec<serde_json::Value>,
    /// Error marker; its presence means the service refused the request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub err: Option<serde_json::Value>,
    /// Error description accompanying `err`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl TurnDocument {
    /// Parse a document from JSON text.
    pub fn from_json(turn: u32, text: &str) -> Result<Self, SourceError> {
        serde_json::from_str(text).map_err(|e| SourceError::Malformed {
            turn,
            message: e.to_string(),
        })
    }

    /// Convert into the typed snapshot consumed by the registry.
    ///
    /// Reveal payloads become [`ActionEvent::Discover`] events placed just
    /// before the action that carried them.
    pub fn into_snapshot(self, turn: u32) -> Result<TurnSnapshot, SourceError> {
        if self.err.is_some() {
            return Err(SourceError::ServiceReported(
                self.message
                    .unwrap_or_else(|| "service reported an error".to_string()),
            ));
        }
        let state = self.game_state.ok_or_else(|| SourceError::Malformed {
            turn,
            message: "missing gameState".to_string(),
        })?;

        let mut actions = Vec::with_capacity(self.actions.len());
        for (index, raw) in self.actions.into_iter().enumerate() {
            match serde_json::from_value::<ActionRecord>(raw) {
                Ok(record) => {
                    if let Some(discovered) = record.discovered {
                        if !discovered.units.is_empty() {
                            actions.push(ActionEvent::Discover(discovered.units));
                        }
                    }
                    if let Some(event) = ActionEvent::from_kind(record.kind) {
                        actions.push(event);
                    }
                }
                Err(e) => {
                    tracing::warn!(turn, index, error = %e, "Skipping undecodable action");
                }
            }
        }

        Ok(TurnSnapshot {
            turn,
            players: state.players,
            units: state.units,
            actions,
        })
    }
}
