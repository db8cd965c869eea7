//! The two competing parties of a match.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ReconError, Result};
use crate::wire::Player;

/// Stable participant identifier.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PartyId(pub u64);

impl fmt::Display for PartyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which turns a party acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Parity {
    /// Turns 0, 2, 4, ...
    Even,
    /// Turns 1, 3, 5, ...
    Odd,
}

impl Parity {
    /// Parity of a turn index. Negative turns follow the same alternation.
    #[must_use]
    pub const fn of(turn: i64) -> Self {
        if turn.rem_euclid(2) == 0 {
            Self::Even
        } else {
            Self::Odd
        }
    }
}

/// One participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    /// Identifier.
    pub id: PartyId,
    /// Display name.
    pub name: String,
    /// Turn-order rank.
    pub order: u32,
    /// Whether this party takes turn 0.
    pub moves_first: bool,
}

impl Party {
    /// Turns this party acts on.
    #[must_use]
    pub const fn parity(&self) -> Parity {
        if self.moves_first {
            Parity::Even
        } else {
            Parity::Odd
        }
    }
}

/// Exactly two parties, built once from the first turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    parties: [Party; 2],
}

impl Roster {
    /// Build the roster from the first turn's player list.
    ///
    /// # Errors
    /// Returns [`ReconError::PreconditionViolation`] unless exactly two
    /// players are listed.
    pub fn from_players(players: &[Player]) -> Result<Self> {
        let [a, b] = players else {
            return Err(ReconError::PreconditionViolation {
                parties: players.len(),
            });
        };
        let (first, second) = if (a.order, a.id) <= (b.order, b.id) {
            (a, b)
        } else {
            (b, a)
        };
        Ok(Self {
            parties: [
                Party {
                    id: first.id,
                    name: first.name.clone(),
                    order: first.order,
                    moves_first: true,
                },
                Party {
                    id: second.id,
                    name: second.name.clone(),
                    order: second.order,
                    moves_first: false,
                },
            ],
        })
    }

    /// Both parties, first mover first.
    #[must_use]
    pub const fn parties(&self) -> &[Party; 2] {
        &self.parties
    }

    /// Look up a party by id.
    #[must_use]
    pub fn get(&self, id: PartyId) -> Option<&Party> {
        self.parties.iter().find(|p| p.id == id)
    }

    /// Look up a party by display name.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&Party> {
        self.parties.iter().find(|p| p.name == name)
    }

    /// Display name for a party id, if it is in the roster.
    #[must_use]
    pub fn name_of(&self, id: PartyId) -> Option<&str> {
        self.get(id).map(|p| p.name.as_str())
    }

    /// The party acting on turns of the given parity.
    #[must_use]
    pub fn owner_of_parity(&self, parity: Parity) -> &Party {
        match parity {
            Parity::Even => &self.parties[0],
            Parity::Odd => &self.parties[1],
        }
    }

    /// The party acting on the given turn.
    #[must_use]
    pub fn owner_of_turn(&self, turn: i64) -> &Party {
        self.owner_of_parity(Parity::of(turn))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(id: u64, name: &str, order: u32) -> Player {
        Player {
            id: PartyId(id),
            name: name.to_string(),
            order,
            funds: None,
            income: None,
            co_name: None,
        }
    }

    #[test]
    fn test_lower_order_moves_first() {
        let roster =
            Roster::from_players(&[player(20, "bob", 2), player(10, "alice", 1)]).unwrap();

        assert_eq!(roster.parties()[0].name, "alice");
        assert!(roster.parties()[0].moves_first);
        assert!(!roster.parties()[1].moves_first);
        assert_eq!(roster.owner_of_turn(0).name, "alice");
        assert_eq!(roster.owner_of_turn(3).name, "bob");
        assert_eq!(roster.owner_of_turn(-1).name, "bob");
    }

    #[test]
    fn test_rejects_wrong_party_count() {
        let err = Roster::from_players(&[player(1, "solo", 1)]).unwrap_err();
        assert!(matches!(
            err,
            ReconError::PreconditionViolation { parties: 1 }
        ));

        let three = [player(1, "a", 1), player(2, "b", 2), player(3, "c", 3)];
        assert!(Roster::from_players(&three).is_err());
    }

    #[test]
    fn test_unknown_party_is_unresolved() {
        let roster = Roster::from_players(&[player(1, "a", 1), player(2, "b", 2)]).unwrap();
        assert_eq!(roster.name_of(PartyId(2)), Some("b"));
        assert_eq!(roster.name_of(PartyId(99)), None);
        assert_eq!(roster.by_name("a").map(|p| p.id), Some(PartyId(1)));
    }

    #[test]
    fn test_parity() {
        assert_eq!(Parity::of(0), Parity::Even);
        assert_eq!(Parity::of(5), Parity::Odd);
        assert_eq!(Parity::of(-1), Parity::Odd);
    }
}
