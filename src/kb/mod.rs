//! The mutable belief state (spec.md §3 "Data Model", §4.2 primitives).
//!
//! `KnowledgeBase` owns every `CardBelief` and `PlayerInfo` outright;
//! other components (propagator, enumerator, policy) only borrow it and
//! mutate through the `exclude`/`set_owner`/`set_solution` primitives
//! below, never by reaching into the fields directly from outside this
//! module's invariant-preserving methods.

mod card;
mod mask;
mod player;

pub use card::{CardBelief, Owner};
pub use mask::{CardMask, PlayerMask};
pub use player::PlayerInfo;

use std::fmt;

use log::trace;
use more_asserts::assert_gt;

use crate::cards::{self, CardId, Category};
use crate::error::{ProtocolError, Result};

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlayerId(pub u8);

impl PlayerId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    pub self_id: PlayerId,
    cards: Vec<CardBelief>,
    players: Vec<PlayerInfo>,
    category_remaining: [u8; 3],
    category_solution: [Option<CardId>; 3],
}

impl KnowledgeBase {
    /// spec.md §4.1: establishes initial belief for a fresh game.
    pub fn reset(player_count: usize, self_id: usize, own_cards: &[CardId]) -> Result<Self> {
        if player_count == 0 || self_id >= player_count {
            return Err(ProtocolError::malformed(format!(
                "reset: player_count={player_count} self_id={self_id}"
            )));
        }

        let all_players = PlayerMask::full(player_count);
        let cards = (0..cards::N_CARDS)
            .map(|_| CardBelief::new(all_players))
            .collect();

        let n_avail = cards::N_CARDS - Category::ALL.len();
        let mut players = Vec::with_capacity(player_count);
        for i in 0..player_count {
            let n_cards = n_avail / player_count + usize::from(i < n_avail % player_count);
            let mut info = PlayerInfo::new(PlayerId(i as u8), n_cards as u8);
            info.may_have = CardMask::all_cards();
            players.push(info);
        }

        let mut kb = KnowledgeBase {
            self_id: PlayerId(self_id as u8),
            cards,
            players,
            category_remaining: [
                cards::category_len(Category::Suspect) as u8,
                cards::category_len(Category::Weapon) as u8,
                cards::category_len(Category::Room) as u8,
            ],
            category_solution: [None, None, None],
        };

        let mut owned = CardMask::EMPTY;
        for &card in own_cards {
            owned.insert(card);
            kb.set_owner(card, kb.self_id)?;
        }
        for card in cards::all_cards() {
            if !owned.contains(card) {
                kb.exclude(card, kb.self_id);
            }
        }

        Ok(kb)
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn card(&self, id: CardId) -> &CardBelief {
        &self.cards[id.index()]
    }

    pub fn player(&self, id: PlayerId) -> &PlayerInfo {
        &self.players[id.index()]
    }

    pub fn players(&self) -> impl Iterator<Item = &PlayerInfo> {
        self.players.iter()
    }

    pub fn player_ids(&self) -> impl Iterator<Item = PlayerId> {
        (0..self.players.len()).map(|i| PlayerId(i as u8))
    }

    pub fn category_remaining(&self, cat: Category) -> u8 {
        self.category_remaining[cat.index()]
    }

    pub fn category_solution(&self, cat: Category) -> Option<CardId> {
        self.category_solution[cat.index()]
    }

    pub fn solution_triple(&self) -> Option<[CardId; 3]> {
        Some([
            self.category_solution(Category::Suspect)?,
            self.category_solution(Category::Weapon)?,
            self.category_solution(Category::Room)?,
        ])
    }

    // --- KB primitives (spec.md §4.2) -------------------------------------

    /// Idempotent: removes `player` from `card`'s possible owners (and
    /// `card` from `player.may_have`). No effect if already excluded.
    pub fn exclude(&mut self, card: CardId, player: PlayerId) -> bool {
        let changed = self.cards[card.index()].possible_owners.remove(player);
        if changed {
            self.players[player.index()].may_have.remove(card);
        }
        changed
    }

    /// Precondition: `card.owner` unknown and `card ∈ player.may_have`.
    /// Violating it is a KB inconsistency (spec.md §7), not a silent
    /// no-op, because the propagator only ever calls this when it has
    /// already established the precondition holds.
    pub fn set_owner(&mut self, card: CardId, player: PlayerId) -> Result<()> {
        if !self.cards[card.index()].owner.is_unknown() {
            return Err(ProtocolError::inconsistent(format!(
                "set_owner({card}, player {player}): owner already {}",
                self.cards[card.index()].owner
            )));
        }
        if !self.players[player.index()].may_have.contains(card) {
            return Err(ProtocolError::inconsistent(format!(
                "set_owner({card}, player {player}): card not in that player's may_have"
            )));
        }

        let others: Vec<PlayerId> = self.cards[card.index()]
            .possible_owners
            .iter()
            .filter(|&p| p != player)
            .collect();
        for p in others {
            self.exclude(card, p);
        }

        self.cards[card.index()].possible_owners = PlayerMask::EMPTY;
        self.cards[card.index()].owner = Owner::Player(player);
        let info = &mut self.players[player.index()];
        info.may_have.remove(card);
        info.must_have.insert(card);

        let cat = cards::category(card);
        assert_gt!(self.category_remaining[cat.index()], 0);
        self.category_remaining[cat.index()] -= 1;
        trace!("set_owner: {card} -> player {player}");
        Ok(())
    }

    /// Precondition: `card.owner` unknown and its category has no
    /// solution yet.
    pub fn set_solution(&mut self, card: CardId) -> Result<()> {
        let cat = cards::category(card);
        if !self.cards[card.index()].owner.is_unknown() {
            return Err(ProtocolError::inconsistent(format!(
                "set_solution({card}): owner already {}",
                self.cards[card.index()].owner
            )));
        }
        if self.category_solution[cat.index()].is_some() {
            return Err(ProtocolError::inconsistent(format!(
                "set_solution({card}): {cat} already solved"
            )));
        }

        let possible_owners = self.cards[card.index()].possible_owners;
        for p in possible_owners.iter() {
            self.players[p.index()].may_have.remove(card);
        }
        self.cards[card.index()].possible_owners = PlayerMask::EMPTY;
        self.category_solution[cat.index()] = Some(card);
        assert_gt!(self.category_remaining[cat.index()], 0);
        self.category_remaining[cat.index()] -= 1;
        trace!("set_solution: {card} is the {cat} solution");
        Ok(())
    }

    // --- Selection groups (spec.md §4.4 on_suggestion step 2) -------------

    pub fn add_selection_group(&mut self, player: PlayerId, group: CardMask) {
        self.players[player.index()].selection_groups.push(group);
    }

    pub fn set_selection_groups(&mut self, player: PlayerId, groups: Vec<CardMask>) {
        self.players[player.index()].selection_groups = groups;
    }

    pub fn record_disproved_to(&mut self, card: CardId, suggester: PlayerId) {
        self.cards[card.index()].disproved_to.insert(suggester);
    }

    // --- invariants (spec.md §8 "Universal invariants") -------------------

    /// Checked by tests after every event handler; panics with a
    /// descriptive message on violation so a failing test points at the
    /// exact invariant, rather than a generic assertion failure.
    pub fn check_invariants(&self) -> Result<()> {
        for card in cards::all_cards() {
            let belief = self.card(card);
            if let Owner::Player(p) = belief.owner {
                if !self.player(p).must_have.contains(card) {
                    return Err(ProtocolError::inconsistent(format!(
                        "{card}: owner={p} but not in must_have"
                    )));
                }
                if !belief.possible_owners.is_empty() {
                    return Err(ProtocolError::inconsistent(format!(
                        "{card}: owner known but possible_owners non-empty"
                    )));
                }
            }
        }
        for player in self.players() {
            if player.must_have_count() > player.n_cards {
                return Err(ProtocolError::inconsistent(format!(
                    "player {}: must_have exceeds n_cards",
                    player.id
                )));
            }
            if player.must_have_count() + player.may_have_count() < player.n_cards {
                return Err(ProtocolError::inconsistent(format!(
                    "player {}: must_have+may_have below n_cards",
                    player.id
                )));
            }
            for group in &player.selection_groups {
                if group.is_empty() {
                    return Err(ProtocolError::inconsistent(format!(
                        "player {}: empty selection group",
                        player.id
                    )));
                }
                if !group.intersection(&player.must_have).is_empty() {
                    return Err(ProtocolError::inconsistent(format!(
                        "player {}: selection group overlaps must_have (should be discharged)",
                        player.id
                    )));
                }
                if !group.difference(&player.may_have).is_empty() {
                    return Err(ProtocolError::inconsistent(format!(
                        "player {}: selection group not a subset of may_have",
                        player.id
                    )));
                }
            }
        }
        for cat in Category::ALL {
            if let Some(card) = self.category_solution(cat) {
                if !self.card(card).owner.is_unknown() {
                    return Err(ProtocolError::inconsistent(format!(
                        "{cat} solution {card} has a known owner"
                    )));
                }
            }
        }
        let must_have_total: u32 = self.players().map(|p| p.must_have_count() as u32).sum();
        let solved: u32 = Category::ALL
            .iter()
            .filter(|&&c| self.category_solution(c).is_some())
            .count() as u32;
        if must_have_total + solved > cards::N_CARDS as u32 {
            return Err(ProtocolError::inconsistent(
                "sum of must_have plus solved cards exceeds 21",
            ));
        }
        Ok(())
    }

    /// Full per-card/per-player grid, the Rust analogue of the original
    /// `dump()` (now routed through `log::trace!` rather than stdout,
    /// since stdout here is the wire protocol's channel).
    pub fn trace_dump(&self) {
        if !log::log_enabled!(log::Level::Trace) {
            return;
        }
        for player in self.players() {
            trace!("{player}");
        }
        for cat in Category::ALL {
            trace!("{cat} solution: {:?}", self.category_solution(cat));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::by_token;

    fn card(token: &str) -> CardId {
        by_token(token).unwrap()
    }

    #[test]
    fn reset_distributes_hand_sizes_matching_referee_rule() {
        // 18 distributable cards across 4 players: 5,5,4,4.
        let kb = KnowledgeBase::reset(4, 0, &[]).unwrap();
        let sizes: Vec<u8> = kb.players().map(|p| p.n_cards).collect();
        assert_eq!(sizes, vec![5, 5, 4, 4]);
    }

    #[test]
    fn reset_rejects_out_of_range_self_id() {
        assert!(KnowledgeBase::reset(3, 3, &[]).is_err());
        assert!(KnowledgeBase::reset(0, 0, &[]).is_err());
    }

    #[test]
    fn set_owner_rejects_card_already_owned() {
        let mut kb = KnowledgeBase::reset(3, 0, &[]).unwrap();
        kb.set_owner(card("Gr"), PlayerId(1)).unwrap();
        assert!(kb.set_owner(card("Gr"), PlayerId(2)).is_err());
    }

    #[test]
    fn set_solution_rejects_second_solution_in_same_category() {
        let mut kb = KnowledgeBase::reset(3, 0, &[]).unwrap();
        kb.set_solution(card("Gr")).unwrap();
        assert!(kb.set_solution(card("Mu")).is_err());
    }

    #[test]
    fn invariants_reject_a_selection_group_outside_may_have() {
        let mut kb = KnowledgeBase::reset(3, 0, &[]).unwrap();
        kb.exclude(card("Pe"), PlayerId(1));
        let mut group = CardMask::EMPTY;
        group.insert(card("Pe")); // already excluded from player 1's may_have
        group.insert(card("Pi"));
        kb.add_selection_group(PlayerId(1), group);
        assert!(kb.check_invariants().is_err());
    }

    #[test]
    fn invariants_hold_through_a_full_game_shape() {
        let own = vec![
            card("Gr"),
            card("Ca"),
            card("Ba"),
            card("Bi"),
            card("Co"),
            card("Di"),
        ];
        let mut kb = KnowledgeBase::reset(3, 0, &own).unwrap();
        kb.check_invariants().unwrap();
        kb.set_owner(card("Mu"), PlayerId(1)).unwrap();
        kb.check_invariants().unwrap();
        kb.set_solution(card("Wr")).unwrap();
        kb.check_invariants().unwrap();
    }
}
