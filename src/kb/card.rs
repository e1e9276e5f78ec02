//! Per-card belief fields (spec.md §3 "Card").

use std::fmt;

use crate::kb::{PlayerId, PlayerMask};

/// Where a card currently sits from this agent's point of view.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Owner {
    Unknown,
    Player(PlayerId),
    Solution,
}

impl Owner {
    pub fn is_unknown(&self) -> bool {
        matches!(self, Owner::Unknown)
    }

    pub fn player(&self) -> Option<PlayerId> {
        match self {
            Owner::Player(p) => Some(*p),
            _ => None,
        }
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Owner::Unknown => write!(f, "?"),
            Owner::Player(p) => write!(f, "p{}", p.0),
            Owner::Solution => write!(f, "SOLUTION"),
        }
    }
}

/// Mutable belief state for one of the 21 cards.
#[derive(Debug, Clone)]
pub struct CardBelief {
    pub owner: Owner,
    pub possible_owners: PlayerMask,
    /// Players this agent has itself revealed this card to, used only by
    /// `disprove` to avoid leaking a second card to the same suggester.
    pub disproved_to: PlayerMask,
}

impl CardBelief {
    pub fn new(all_players: PlayerMask) -> Self {
        CardBelief {
            owner: Owner::Unknown,
            possible_owners: all_players,
            disproved_to: PlayerMask::EMPTY,
        }
    }
}
