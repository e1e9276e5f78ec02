//! The two agent variants (spec.md §4.6, "Policy interactions with KB",
//! and the design note on a tagged WeakAgent/StrongAgent split rather
//! than one struct with an `Option<Enumerator>` field).
//!
//! Both variants share the same event-handling shape: run the
//! propagator first, then (strong only) refresh the enumerator, which
//! may itself call back into the KB via `set_solution`. Mirrors
//! `original_source/entries/ray/ai00.py` (propagator only) and
//! `ai01.py` (propagator + candidate enumeration).

use crate::cards::CardId;
use crate::enumerator::Enumerator;
use crate::error::Result;
use crate::kb::{CardMask, KnowledgeBase, PlayerId};
use crate::policy::{self, Policy};
use crate::propagator;

/// The behavior a transport dispatcher drives a seated agent through.
/// `reset` starts a game; the rest are wire events in the order the
/// referee emits them (spec.md §6).
pub trait Agent {
    fn reset(&mut self, player_count: usize, self_id: usize, own_cards: &[CardId]) -> Result<()>;

    /// This agent's turn: produce a suggestion and record it as unused.
    fn suggest(&mut self) -> [CardId; 3];

    /// Another player's suggestion was announced; apply R3's selection
    /// group if nobody disproved, or the implied exclusions if someone
    /// did (spec.md §4.4 `on_suggestion`). `revealed` is the disproved
    /// card, present only when this agent is the suggester or the
    /// disprover (the referee never tells third parties which card was
    /// shown).
    fn on_suggestion(
        &mut self,
        suggester: PlayerId,
        triple: [CardId; 3],
        disprover: Option<PlayerId>,
        revealed: Option<CardId>,
    ) -> Result<()>;

    /// This agent must disprove `triple` to `suggester`; returns which
    /// of its own cards it shows.
    fn disprove(&mut self, suggester: PlayerId, triple: [CardId; 3]) -> Result<CardId>;

    /// `self`'s candidate accusation, if the KB (or enumerator) entails
    /// one. `None` means "don't accuse yet".
    fn accuse(&self) -> Option<[CardId; 3]>;

    /// An accusation (by anyone) was announced, with whether it was
    /// correct. A correct accusation ends the game; an incorrect one
    /// reveals nothing new but players are eliminated from suggesting.
    fn on_accusation(&mut self, accuser: PlayerId, triple: [CardId; 3], correct: bool) -> Result<()>;

    fn knowledge_base(&self) -> &KnowledgeBase;

    /// `(suggestions made, of those how many fell back to an arbitrary
    /// unused triple)` — end-of-game diagnostics only, not wire-visible.
    fn suggestion_stats(&self) -> (u32, u32);
}

/// Propagator-only variant (spec.md's "weak" policy tier).
pub struct WeakAgent {
    kb: KnowledgeBase,
    policy: Policy,
    own_cards: CardMask,
}

impl WeakAgent {
    pub fn new() -> Self {
        WeakAgent {
            kb: KnowledgeBase::reset(1, 0, &[]).expect("placeholder KB replaced by reset()"),
            policy: Policy::new(),
            own_cards: CardMask::EMPTY,
        }
    }
}

impl Default for WeakAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl Agent for WeakAgent {
    fn reset(&mut self, player_count: usize, self_id: usize, own_cards: &[CardId]) -> Result<()> {
        self.kb = KnowledgeBase::reset(player_count, self_id, own_cards)?;
        self.policy = Policy::new();
        self.own_cards = CardMask::EMPTY;
        for &c in own_cards {
            self.own_cards.insert(c);
        }
        Ok(())
    }

    fn suggest(&mut self) -> [CardId; 3] {
        self.policy.suggest(&self.kb)
    }

    fn on_suggestion(
        &mut self,
        suggester: PlayerId,
        triple: [CardId; 3],
        disprover: Option<PlayerId>,
        revealed: Option<CardId>,
    ) -> Result<()> {
        handle_suggestion(&mut self.kb, suggester, triple, disprover, revealed)?;
        propagator::run(&mut self.kb)
    }

    fn disprove(&mut self, suggester: PlayerId, triple: [CardId; 3]) -> Result<CardId> {
        policy::disprove(&mut self.kb, suggester, triple, &self.own_cards)
    }

    fn accuse(&self) -> Option<[CardId; 3]> {
        policy::accuse(&self.kb, None)
    }

    fn on_accusation(&mut self, _accuser: PlayerId, _triple: [CardId; 3], _correct: bool) -> Result<()> {
        Ok(())
    }

    fn knowledge_base(&self) -> &KnowledgeBase {
        &self.kb
    }

    fn suggestion_stats(&self) -> (u32, u32) {
        self.policy.suggestion_stats()
    }
}

/// Propagator + Solution Enumerator variant (spec.md's "strong" policy
/// tier).
pub struct StrongAgent {
    kb: KnowledgeBase,
    policy: Policy,
    enumerator: Enumerator,
    own_cards: CardMask,
}

impl StrongAgent {
    pub fn new() -> Self {
        StrongAgent {
            kb: KnowledgeBase::reset(1, 0, &[]).expect("placeholder KB replaced by reset()"),
            policy: Policy::new(),
            enumerator: Enumerator::new(),
            own_cards: CardMask::EMPTY,
        }
    }
}

impl Default for StrongAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl Agent for StrongAgent {
    fn reset(&mut self, player_count: usize, self_id: usize, own_cards: &[CardId]) -> Result<()> {
        self.kb = KnowledgeBase::reset(player_count, self_id, own_cards)?;
        self.policy = Policy::new();
        self.enumerator = Enumerator::new();
        self.own_cards = CardMask::EMPTY;
        for &c in own_cards {
            self.own_cards.insert(c);
        }
        self.enumerator.refresh(&mut self.kb)
    }

    fn suggest(&mut self) -> [CardId; 3] {
        self.policy.suggest(&self.kb)
    }

    fn on_suggestion(
        &mut self,
        suggester: PlayerId,
        triple: [CardId; 3],
        disprover: Option<PlayerId>,
        revealed: Option<CardId>,
    ) -> Result<()> {
        handle_suggestion(&mut self.kb, suggester, triple, disprover, revealed)?;
        // An un-disproved suggestion proves nothing: the suggester may
        // hold one of their own three cards, so the triple stays a live
        // candidate (spec.md §4.5's soundness mandate — only a disprove
        // retires it).
        if disprover.is_some() {
            self.enumerator.remove_triple(triple);
        }
        propagator::run(&mut self.kb)?;
        self.enumerator.refresh(&mut self.kb)?;
        propagator::run(&mut self.kb)
    }

    fn disprove(&mut self, suggester: PlayerId, triple: [CardId; 3]) -> Result<CardId> {
        let card = policy::disprove(&mut self.kb, suggester, triple, &self.own_cards)?;
        self.enumerator.remove_triple(triple);
        Ok(card)
    }

    fn accuse(&self) -> Option<[CardId; 3]> {
        policy::accuse(&self.kb, self.enumerator.unique_candidate())
    }

    fn on_accusation(&mut self, _accuser: PlayerId, triple: [CardId; 3], correct: bool) -> Result<()> {
        if !correct {
            self.enumerator.remove_triple(triple);
        }
        Ok(())
    }

    fn knowledge_base(&self) -> &KnowledgeBase {
        &self.kb
    }

    fn suggestion_stats(&self) -> (u32, u32) {
        self.policy.suggestion_stats()
    }
}

/// spec.md §4.4 `on_suggestion`: players strictly between `suggester`
/// and `disprover` passed, so each is directly excluded from the three
/// suggested cards. A disprover who didn't reveal a card instead only
/// proves "at least one of the three" — recorded as a selection group.
/// When a card *was* revealed (self was the suggester or the disprover)
/// its ownership is immediate: `set_owner`, and if self is the
/// suggester, record that the disprover showed it to self.
fn handle_suggestion(
    kb: &mut KnowledgeBase,
    suggester: PlayerId,
    triple: [CardId; 3],
    disprover: Option<PlayerId>,
    revealed: Option<CardId>,
) -> Result<()> {
    let between: Vec<PlayerId> = players_between(kb, suggester, disprover).collect();
    for player in between {
        for card in triple {
            kb.exclude(card, player);
        }
    }

    if let Some(disprover) = disprover {
        match revealed {
            Some(card) => {
                if kb.card(card).owner.is_unknown() {
                    kb.set_owner(card, disprover)?;
                }
                if suggester == kb.self_id {
                    kb.record_disproved_to(card, suggester);
                }
            }
            None => {
                let mut group = CardMask::EMPTY;
                for card in triple {
                    group.insert(card);
                }
                kb.add_selection_group(disprover, group);
            }
        }
    }

    Ok(())
}

/// Players strictly between `suggester` and `disprover` in turn order
/// (wrapping), excluding both endpoints — or every other player if
/// nobody disproved. `self` is always skipped: the propagator never
/// re-derives self's own hand (spec.md §4.3 note on self exclusion).
fn players_between(
    kb: &KnowledgeBase,
    suggester: PlayerId,
    disprover: Option<PlayerId>,
) -> impl Iterator<Item = PlayerId> + '_ {
    let n = kb.player_count();
    let self_id = kb.self_id;
    let start = suggester.index();
    let end = disprover.map(|d| d.index()).unwrap_or(start);

    let span: Vec<usize> = if disprover.is_some() {
        let mut v = Vec::new();
        let mut i = (start + 1) % n;
        while i != end {
            v.push(i);
            i = (i + 1) % n;
        }
        v
    } else {
        let mut v = Vec::new();
        let mut i = (start + 1) % n;
        while i != start {
            v.push(i);
            i = (i + 1) % n;
        }
        v
    };

    span.into_iter()
        .map(|i| PlayerId(i as u8))
        .filter(move |&p| p != self_id)
}
