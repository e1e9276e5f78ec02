//! Per-player belief record (spec.md §3 "Player belief record").

use std::fmt;

use crate::cards::CardId;
use crate::kb::{CardMask, PlayerId};

/// `id`, hand size, and the must/may-have sets plus disjunctive
/// "selection groups" derived from undisclosed disproofs.
#[derive(Debug, Clone)]
pub struct PlayerInfo {
    pub id: PlayerId,
    pub n_cards: u8,
    pub must_have: CardMask,
    pub may_have: CardMask,
    /// Each entry: "at least one of these cards is in this player's hand".
    /// Kept small (spec.md §9: at most 3 cards, one per undisclosed
    /// disproof) so a flat `Vec` with in-place compaction is adequate.
    pub selection_groups: Vec<CardMask>,
}

impl PlayerInfo {
    pub fn new(id: PlayerId, n_cards: u8) -> Self {
        PlayerInfo {
            id,
            n_cards,
            must_have: CardMask::EMPTY,
            may_have: CardMask::EMPTY,
            selection_groups: Vec::new(),
        }
    }

    pub fn must_have_count(&self) -> u8 {
        self.must_have.len() as u8
    }

    pub fn may_have_count(&self) -> u8 {
        self.may_have.len() as u8
    }

    /// `must_have` plus the still-disjoint-from-`must_have` selection
    /// groups (spec.md §4.3 R4's "still-active" groups).
    pub fn active_groups(&self) -> impl Iterator<Item = &CardMask> {
        self.selection_groups
            .iter()
            .filter(move |g| g.intersection(&self.must_have).is_empty())
    }

    pub fn has_card(&self, card: CardId) -> bool {
        self.must_have.contains(card)
    }
}

impl fmt::Display for PlayerInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "player {} (n_cards={}): must={} may={} groups={:?}",
            self.id.0, self.n_cards, self.must_have, self.may_have, self.selection_groups
        )
    }
}
