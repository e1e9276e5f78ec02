//! Solution Enumerator, the stronger variant's extra inference source
//! (spec.md §4.5).
//!
//! Maintains the 324-triple candidate table and, after every event,
//! drops candidates that are no longer consistent with the KB —
//! intersecting what survives can pin down a solution card earlier than
//! local propagation alone would.

use itertools::Itertools;

use crate::bitset::{self, triple_from_index, triple_to_index, TripleSet};
use crate::cards::{self, CardId, Category};
use crate::error::Result;
use crate::kb::{CardMask, KnowledgeBase, PlayerId};

#[derive(Debug, Clone)]
pub struct Enumerator {
    candidates: TripleSet,
}

impl Enumerator {
    pub fn new() -> Self {
        Enumerator {
            candidates: TripleSet::full(),
        }
    }

    pub fn candidate_count(&self) -> usize {
        self.candidates.len()
    }

    /// The unique surviving candidate, if exactly one remains.
    pub fn unique_candidate(&self) -> Option<[CardId; 3]> {
        if self.candidates.len() != 1 {
            return None;
        }
        self.candidates.iter().next().map(triple_from_index)
    }

    pub fn remove_triple(&mut self, triple: [CardId; 3]) {
        self.candidates.remove(triple_to_index(triple));
    }

    /// spec.md §4.5 steps 1-4: discard implausible/inconsistent
    /// candidates, then set any position that every survivor agrees on.
    pub fn refresh(&mut self, kb: &mut KnowledgeBase) -> Result<()> {
        let implausible: Vec<usize> = self
            .candidates
            .iter()
            .filter(|&idx| !plausible(kb, triple_from_index(idx)))
            .collect();
        for idx in implausible {
            self.candidates.remove(idx);
        }

        let inconsistent: Vec<usize> = self
            .candidates
            .iter()
            .filter(|&idx| !consistent(kb, triple_from_index(idx)))
            .collect();
        for idx in inconsistent {
            self.candidates.remove(idx);
        }

        self.apply_positional_intersection(kb)
    }

    fn apply_positional_intersection(&self, kb: &mut KnowledgeBase) -> Result<()> {
        let mut iter = self.candidates.iter().map(triple_from_index);
        let Some(first) = iter.next() else {
            return Ok(());
        };
        let mut agree = [true; 3];
        let mut common = first;
        for triple in iter {
            for i in 0..3 {
                if common[i] != triple[i] {
                    agree[i] = false;
                }
            }
        }
        for i in 0..3 {
            if !agree[i] {
                continue;
            }
            let card = common[i];
            if !kb.card(card).owner.is_unknown() {
                continue;
            }
            let cat = cards::category(card);
            if kb.category_solution(cat).is_none() {
                kb.set_solution(card)?;
            }
        }
        Ok(())
    }
}

impl Default for Enumerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Step 1: a candidate survives only if none of its cards have a known
/// owner, and none of its cards contradict an already-set solution in
/// their own category.
fn plausible(kb: &KnowledgeBase, triple: [CardId; 3]) -> bool {
    for card in triple {
        if !kb.card(card).owner.is_unknown() {
            return false;
        }
        let cat = cards::category(card);
        if let Some(solved) = kb.category_solution(cat) {
            if solved != card {
                return false;
            }
        }
    }
    true
}

/// Steps 2-3: is there at least one way to deal the cards not in
/// `solution` to the players that respects must_have/may_have/hand sizes
/// and every selection group? The original source also counts how many
/// such assignments exist to rank candidates probabilistically; this
/// crate only needs existence (spec.md's Non-goals exclude probabilistic
/// ranking), so the search short-circuits on the first assignment found.
fn consistent(kb: &KnowledgeBase, solution: [CardId; 3]) -> bool {
    let mut avail = CardMask::EMPTY;
    for card in cards::all_cards() {
        if !kb.card(card).possible_owners.is_empty() {
            avail.insert(card);
        }
    }
    for card in solution {
        avail.remove(card);
    }

    // spec.md §4.5: short-circuit to "at least one" above this cutoff —
    // preserves soundness since it can only ever make the check more
    // permissive, never drop a truly-possible candidate.
    if avail.len() >= 10 {
        return true;
    }

    let players: Vec<PlayerId> = kb.player_ids().collect();
    exists_assignment(kb, &players, 0, avail)
}

fn exists_assignment(
    kb: &KnowledgeBase,
    players: &[PlayerId],
    index: usize,
    avail: CardMask,
) -> bool {
    let Some(&player_id) = players.get(index) else {
        return true;
    };
    let player = kb.player(player_id);
    let n_take = player.n_cards.saturating_sub(player.must_have_count()) as usize;
    let pool: Vec<CardId> = avail.intersection(&player.may_have).iter().collect();
    if n_take > pool.len() {
        return false;
    }

    for combo in pool.iter().copied().combinations(n_take) {
        let mut choice = CardMask::EMPTY;
        for card in &combo {
            choice.insert(*card);
        }
        let hand = player.must_have.union(&choice);
        let groups_satisfied = player
            .selection_groups
            .iter()
            .all(|group| !group.intersection(&hand).is_empty());
        if !groups_satisfied {
            continue;
        }
        let remaining = avail.difference(&choice);
        if exists_assignment(kb, players, index + 1, remaining) {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::by_token;

    fn card(token: &str) -> CardId {
        by_token(token).unwrap()
    }

    #[test]
    fn triple_index_roundtrip() {
        let t = [card("Gr"), card("Ca"), card("Ba")];
        assert_eq!(triple_from_index(triple_to_index(t)), t);
    }

    #[test]
    fn fresh_enumerator_has_all_candidates() {
        let e = Enumerator::new();
        assert_eq!(e.candidate_count(), 324);
        assert!(e.unique_candidate().is_none());
    }

    #[test]
    fn removing_a_triple_shrinks_candidates() {
        let mut e = Enumerator::new();
        e.remove_triple([card("Gr"), card("Ca"), card("Ba")]);
        assert_eq!(e.candidate_count(), 323);
    }

    #[test]
    fn refresh_drops_candidates_with_known_owners() {
        let own = vec![
            card("Gr"),
            card("Ca"),
            card("Ba"),
            card("Bi"),
            card("Co"),
            card("Di"),
        ];
        let mut kb = KnowledgeBase::reset(3, 0, &own).unwrap();
        let mut e = Enumerator::new();
        e.refresh(&mut kb).unwrap();
        // Every candidate containing a self-owned card must be gone.
        assert!(e.candidate_count() < 324);
        for idx in 0..bitset::N_TRIPLES {
            if !e_contains(&e, idx) {
                continue;
            }
            let t = triple_from_index(idx);
            assert!(t.iter().all(|c| kb.card(*c).owner.is_unknown()));
        }
    }

    fn e_contains(e: &Enumerator, idx: usize) -> bool {
        // indirect: rebuild a mask by probing remove+contains semantics
        // is awkward without exposing internals, so just compare counts
        // via unique_candidate-style enumeration through refresh tests
        // above; this helper exists to keep the loop readable.
        let mut probe = e.clone();
        let before = probe.candidate_count();
        probe.remove_triple(triple_from_index(idx));
        probe.candidate_count() < before
    }
}
