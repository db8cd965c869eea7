//! Unit records accumulated across turns.
//!
//! A [`Unit`] is the merged view of every observation of one battlefield
//! entity. Fields are optional because fog of war hides them; once a field is
//! known, later observations may refine it but never blank it again.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::roster::PartyId;
use crate::wire::UnitFields;

/// Type name given to transports that were only ever referenced by an unload.
pub const MYSTERY_TRANSPORT: &str = "MYSTERY TRANSPORT";

/// Type name given to attackers that fired from fog without revealing themselves.
pub const HIDDEN_ARTILLERY: &str = "HIDDEN ARTILLERY";

/// Service-assigned unit identifier.
///
/// Identifiers increase monotonically in creation order across both parties.
/// Build-turn inference depends on this and nothing validates it.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UnitId(pub u64);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Registry key for a unit record.
///
/// Units the service identified are keyed by their id. Attackers that fired
/// from fog have no id, so they are keyed by where they were inferred, which
/// keeps re-merging the same turn idempotent. Identified units sort first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum UnitKey {
    /// Service-assigned identifier.
    Known(UnitId),
    /// Placeholder for an unidentified unit: turn and action index.
    Hidden {
        /// Turn the placeholder was created on.
        turn: u32,
        /// Index of the action within that turn's log.
        slot: u32,
    },
}

impl UnitKey {
    /// The service identifier, if there is one.
    #[must_use]
    pub const fn id(&self) -> Option<UnitId> {
        match self {
            Self::Known(id) => Some(*id),
            Self::Hidden { .. } => None,
        }
    }
}

impl fmt::Display for UnitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(id) => write!(f, "{id}"),
            Self::Hidden { turn, slot } => write!(f, "?{turn}.{slot}"),
        }
    }
}

/// Map coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl Position {
    /// Create a new position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// When a unit was produced.
///
/// Direct evidence ([`BuildTurn::PreMatch`], [`BuildTurn::Observed`]) is never
/// overwritten. Inferred turns are only ever assigned to units that had none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildTurn {
    /// Present in the very first snapshot, before any action happened.
    PreMatch,
    /// Seen being built on this turn.
    Observed(u32),
    /// Assigned by the id-ordering heuristic.
    Inferred(u32),
    /// Assigned by the id-ordering heuristic to a time before turn 0.
    InferredPreMatch,
}

impl BuildTurn {
    /// Turn index used for ordering and parity. Pre-match sorts as turn -1.
    #[must_use]
    pub const fn ordinal(&self) -> i64 {
        match self {
            Self::PreMatch | Self::InferredPreMatch => -1,
            Self::Observed(turn) | Self::Inferred(turn) => *turn as i64,
        }
    }

    /// Whether this turn comes from direct evidence rather than inference.
    #[must_use]
    pub const fn is_direct(&self) -> bool {
        matches!(self, Self::PreMatch | Self::Observed(_))
    }

    /// Concrete production turn, if the unit was built during the match.
    #[must_use]
    pub const fn turn(&self) -> Option<u32> {
        match self {
            Self::PreMatch | Self::InferredPreMatch => None,
            Self::Observed(turn) | Self::Inferred(turn) => Some(*turn),
        }
    }

    /// Build turn for a unit known to predate `turn + 1`. Anything older than
    /// turn 0 existed before the match started.
    #[must_use]
    pub fn inferred(turn: i64) -> Self {
        u32::try_from(turn).map_or(Self::InferredPreMatch, Self::Inferred)
    }
}

/// The merged history of one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    /// Registry key.
    pub key: UnitKey,
    /// Owning party, if ever revealed.
    pub owner: Option<PartyId>,
    /// Owner display name; unresolved when the owner is not in the roster.
    pub owner_name: Option<String>,
    /// Unit type name.
    pub type_name: Option<String>,
    /// Production price as reported by the service.
    pub cost: Option<u32>,
    /// Last known position.
    pub position: Option<Position>,
    /// Remaining hit points; `Some(0)` means destroyed.
    pub health: Option<u8>,
    /// Creation turn, once known or inferred.
    pub build_turn: Option<BuildTurn>,
    /// Most recent turn this unit was seen or referenced.
    pub last_seen: Option<u32>,
    /// Hidden distance travelled on the move whose destination was inferred.
    pub extra_distance: Option<u32>,
    /// Units last seen loaded in this one.
    pub cargo: Vec<UnitId>,
}

impl Unit {
    /// Create an empty record.
    #[must_use]
    pub fn new(key: UnitKey) -> Self {
        Self {
            key,
            owner: None,
            owner_name: None,
            type_name: None,
            cost: None,
            position: None,
            health: None,
            build_turn: None,
            last_seen: None,
            extra_distance: None,
            cargo: Vec::new(),
        }
    }

    /// Create a placeholder with a sentinel type name and only an owner.
    #[must_use]
    pub fn placeholder(key: UnitKey, type_name: &str, owner: Option<PartyId>) -> Self {
        Self {
            owner,
            type_name: Some(type_name.to_string()),
            ..Self::new(key)
        }
    }

    /// The service identifier, if there is one.
    #[must_use]
    pub const fn id(&self) -> Option<UnitId> {
        self.key.id()
    }

    /// Whether this record stands in for a unit that was never observed itself.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        matches!(
            self.type_name.as_deref(),
            Some(MYSTERY_TRANSPORT | HIDDEN_ARTILLERY)
        )
    }

    /// Whether the unit is known to be destroyed.
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.health == Some(0)
    }

    /// Fold an observation into this record. Withheld fields keep their
    /// previous value.
    pub fn absorb(&mut self, fields: &UnitFields) {
        if fields.owner.is_some() {
            self.owner = fields.owner;
        }
        if let Some(type_name) = &fields.type_name {
            self.type_name = Some(type_name.clone());
        }
        if let Some(cost) = fields.cost.filter(|&cost| cost > 0) {
            self.cost = Some(cost);
        }
        if let Some(position) = fields.position() {
            self.position = Some(position);
            self.extra_distance = None;
        }
        if fields.hit_points.is_some() {
            self.health = fields.hit_points;
        }
        if fields.cargo1.is_some() || fields.cargo2.is_some() {
            self.cargo = fields.cargo().collect();
        }
    }

    /// Health as shown in reports: `"<n>HP"`, `"DEAD"`, or `"?"`.
    #[must_use]
    pub fn status(&self) -> String {
        match self.health {
            Some(0) => "DEAD".to_string(),
            Some(hp) => format!("{hp}HP"),
            None => "?".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(id: u64) -> UnitFields {
        UnitFields {
            id: UnitId(id),
            ..Default::default()
        }
    }

    #[test]
    fn test_absorb_keeps_known_fields() {
        let mut unit = Unit::new(UnitKey::Known(UnitId(3)));
        unit.absorb(&UnitFields {
            owner: Some(PartyId(1)),
            type_name: Some("Tank".to_string()),
            cost: Some(7000),
            x: Some(4),
            y: Some(5),
            hit_points: Some(10),
            ..fields(3)
        });

        unit.absorb(&fields(3));

        assert_eq!(unit.owner, Some(PartyId(1)));
        assert_eq!(unit.type_name.as_deref(), Some("Tank"));
        assert_eq!(unit.cost, Some(7000));
        assert_eq!(unit.position, Some(Position::new(4, 5)));
        assert_eq!(unit.health, Some(10));
    }

    #[test]
    fn test_absorb_ignores_zero_cost() {
        let mut unit = Unit::new(UnitKey::Known(UnitId(3)));
        unit.absorb(&UnitFields {
            cost: Some(0),
            ..fields(3)
        });
        assert_eq!(unit.cost, None);
    }

    #[test]
    fn test_build_turn_ordinal() {
        assert_eq!(BuildTurn::PreMatch.ordinal(), -1);
        assert_eq!(BuildTurn::Observed(4).ordinal(), 4);
        assert_eq!(BuildTurn::Inferred(2).ordinal(), 2);
        assert!(BuildTurn::PreMatch.is_direct());
        assert!(!BuildTurn::Inferred(2).is_direct());
        assert!(!BuildTurn::InferredPreMatch.is_direct());
        assert_eq!(BuildTurn::InferredPreMatch.ordinal(), -1);
        assert_eq!(BuildTurn::InferredPreMatch.turn(), None);
    }

    #[test]
    fn test_known_keys_sort_before_hidden() {
        let hidden = UnitKey::Hidden { turn: 0, slot: 0 };
        assert!(UnitKey::Known(UnitId(u64::MAX)) < hidden);
    }

    #[test]
    fn test_status() {
        let mut unit = Unit::new(UnitKey::Known(UnitId(1)));
        assert_eq!(unit.status(), "?");
        unit.health = Some(7);
        assert_eq!(unit.status(), "7HP");
        unit.health = Some(0);
        assert_eq!(unit.status(), "DEAD");
        assert!(unit.is_destroyed());
    }

    #[test]
    fn test_placeholder() {
        let unit = Unit::placeholder(
            UnitKey::Known(UnitId(9)),
            MYSTERY_TRANSPORT,
            Some(PartyId(2)),
        );
        assert!(unit.is_placeholder());
        assert_eq!(unit.owner, Some(PartyId(2)));
        assert_eq!(unit.build_turn, None);
    }

    #[test]
    fn test_inferred_before_turn_zero_is_not_direct() {
        assert_eq!(BuildTurn::inferred(-2), BuildTurn::InferredPreMatch);
        assert_eq!(BuildTurn::inferred(0), BuildTurn::Inferred(0));
        assert_eq!(BuildTurn::inferred(4), BuildTurn::Inferred(4));
    }
}
