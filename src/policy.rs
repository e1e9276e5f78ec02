//! Turn-time decisions driven by the KB (spec.md §4.4 `suggest`/
//! `disprove`/`accuse`, §4.6 "Policy interactions with KB").
//!
//! Policy functions are pure reads of the KB except `suggest`, which
//! maintains the unused-suggestion set, and `disprove`, which mutates
//! `disproved_to`. Neither ever reruns the propagator.

use crate::bitset::{self, TripleSet};
use crate::cards::{self, CardId, Category};
use crate::error::{ProtocolError, Result};
use crate::kb::{CardMask, KnowledgeBase, PlayerId};

/// Tracks which of the 324 suggestion triples this agent has already
/// used, plus simple end-of-game diagnostics (how often the
/// information-maximizing pick had already been suggested).
#[derive(Debug, Clone)]
pub struct Policy {
    unused_suggestions: TripleSet,
    suggested_count: u32,
    fallback_count: u32,
}

impl Policy {
    pub fn new() -> Self {
        Policy {
            unused_suggestions: TripleSet::full(),
            suggested_count: 0,
            fallback_count: 0,
        }
    }

    /// `(total suggestions made, how many fell back to an arbitrary
    /// unused triple because the information-maximizing pick was already
    /// used)`.
    pub fn suggestion_stats(&self) -> (u32, u32) {
        (self.suggested_count, self.fallback_count)
    }

    /// spec.md §4.4 `suggest()`: pick, per category, the owner-unknown
    /// card with the fewest remaining possible owners (disproving it
    /// teaches the most), falling back to any unused triple if that
    /// exact combination was already suggested.
    pub fn suggest(&mut self, kb: &KnowledgeBase) -> [CardId; 3] {
        let mut picked = [CardId(0); 3];
        for cat in Category::ALL {
            let best = cards::category_cards(cat)
                .into_iter()
                .filter(|&c| kb.card(c).owner.is_unknown())
                .min_by_key(|&c| kb.card(c).possible_owners.len())
                .expect("a category always has at least its (possibly still unowned) solution card");
            picked[cat.index()] = best;
        }

        self.suggested_count += 1;
        let idx = bitset::triple_to_index(picked);
        if self.unused_suggestions.remove(idx) {
            picked
        } else {
            self.fallback_count += 1;
            let fallback_idx = self
                .unused_suggestions
                .pop_any()
                .expect("every suggestion triple already used");
            bitset::triple_from_index(fallback_idx)
        }
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self::new()
    }
}

/// spec.md §4.4 `disprove()`: self is the disprover. Reuse a card already
/// shown to `suggester` if one qualifies (never leak a second card to the
/// same suggester); otherwise show the card shown to the fewest distinct
/// suggesters so far, to maximize future reuse opportunities.
pub fn disprove(
    kb: &mut KnowledgeBase,
    suggester: PlayerId,
    triple: [CardId; 3],
    own_cards: &CardMask,
) -> Result<CardId> {
    let candidates: Vec<CardId> = triple.into_iter().filter(|c| own_cards.contains(*c)).collect();
    if candidates.is_empty() {
        return Err(ProtocolError::malformed(format!(
            "disprove: none of {:?} are held by this agent",
            triple.map(cards::token)
        )));
    }

    let chosen = candidates
        .iter()
        .find(|&&c| kb.card(c).disproved_to.contains(suggester))
        .copied()
        .unwrap_or_else(|| {
            *candidates
                .iter()
                .max_by_key(|&&c| kb.card(c).disproved_to.len())
                .expect("candidates is non-empty")
        });

    kb.record_disproved_to(chosen, suggester);
    Ok(chosen)
}

/// spec.md §4.4 `accuse()`: only ever returns a triple entailed by the
/// KB — all three category solutions set, or (enumerator variant) the
/// candidate table down to one survivor.
pub fn accuse(kb: &KnowledgeBase, unique_candidate: Option<[CardId; 3]>) -> Option<[CardId; 3]> {
    if let Some(triple) = kb.solution_triple() {
        return Some(triple);
    }
    unique_candidate
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::by_token;

    fn card(token: &str) -> CardId {
        by_token(token).unwrap()
    }

    #[test]
    fn suggest_never_repeats_a_triple() {
        let own = vec![card("Gr"), card("Ca"), card("Ba")];
        let kb = KnowledgeBase::reset(4, 0, &own).unwrap();
        let mut policy = Policy::new();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..50 {
            let t = policy.suggest(&kb);
            assert!(seen.insert(t), "suggest repeated a triple: {t:?}");
        }
    }

    #[test]
    fn disprove_prefers_already_shown_card() {
        let own_vec = vec![card("Gr"), card("Ca"), card("Ba")];
        let mut own = CardMask::EMPTY;
        for &c in &own_vec {
            own.insert(c);
        }
        let mut kb = KnowledgeBase::reset(3, 0, &own_vec).unwrap();
        let suggester = PlayerId(1);
        kb.record_disproved_to(card("Gr"), suggester);

        let shown = disprove(
            &mut kb,
            suggester,
            [card("Gr"), card("Ca"), card("Ba")],
            &own,
        )
        .unwrap();
        assert_eq!(shown, card("Gr"));
    }

    #[test]
    fn disprove_rejects_empty_intersection() {
        let own_vec = vec![card("Gr")];
        let own = {
            let mut m = CardMask::EMPTY;
            m.insert(card("Gr"));
            m
        };
        let mut kb = KnowledgeBase::reset(3, 0, &own_vec).unwrap();
        let result = disprove(&mut kb, PlayerId(1), [card("Mu"), card("Ca"), card("Ba")], &own);
        assert!(result.is_err());
    }

    #[test]
    fn accuse_requires_full_solution() {
        let own = vec![card("Gr")];
        let kb = KnowledgeBase::reset(3, 0, &own).unwrap();
        assert_eq!(accuse(&kb, None), None);
    }
}
