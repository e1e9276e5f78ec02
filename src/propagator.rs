//! Fixed-point constraint propagation (spec.md §4.3, rules R1-R6).
//!
//! Runs after every event until a full pass fires no rule. Self is never
//! re-propagated: `reset` already fully resolves self's own hand, so
//! running these rules against self would always be a no-op (mirrors
//! `original_source/entries/ray/ai01.py`'s `for player in self.players: if
//! player is not self.player: player.update()`).

use crate::cards::{self, CardId, Category};
use crate::error::Result;
use crate::kb::{CardMask, KnowledgeBase, PlayerId};

/// Runs R1-R6 to a fixed point. Propagates a KB inconsistency (R3's
/// empty-group case, or a `set_owner`/`set_solution` precondition
/// violation) straight up as fatal, per spec.md §7.
pub fn run(kb: &mut KnowledgeBase) -> Result<()> {
    loop {
        let mut changed = false;

        let player_ids: Vec<PlayerId> = kb.player_ids().filter(|&p| p != kb.self_id).collect();
        for player_id in player_ids {
            if apply_player_rules(kb, player_id)? {
                changed = true;
            }
        }
        if apply_solution_rules(kb)? {
            changed = true;
        }

        if !changed {
            return Ok(());
        }
    }
}

/// R1 (hand full), R2 (hand forced), R3 (selection group reduction), R4
/// (one-slot narrowing), run to a local fixed point for one player since
/// they feed each other (spec.md §4.3).
fn apply_player_rules(kb: &mut KnowledgeBase, player_id: PlayerId) -> Result<bool> {
    let mut any_changed = false;
    loop {
        let mut changed = false;

        // R1: hand full -> exclude player from everything still in may_have.
        let info = kb.player(player_id).clone();
        if info.must_have_count() == info.n_cards {
            for card in info.may_have.iter().collect::<Vec<_>>() {
                if kb.exclude(card, player_id) {
                    changed = true;
                }
            }
        }

        // R2: hand forced -> every may_have card is owned by this player.
        let info = kb.player(player_id).clone();
        if info.may_have_count() > 0 && info.must_have_count() + info.may_have_count() == info.n_cards
        {
            for card in info.may_have.iter().collect::<Vec<_>>() {
                kb.set_owner(card, player_id)?;
            }
            changed = true;
        }

        // R3: selection group reduction. Discharge groups satisfied by
        // must_have first (spec.md §9's preferred ordering over R4
        // re-deriving "active" groups from scratch).
        let info = kb.player(player_id).clone();
        let mut new_groups = Vec::with_capacity(info.selection_groups.len());
        for group in &info.selection_groups {
            if !group.intersection(&info.must_have).is_empty() {
                changed = true; // satisfied, discard
                continue;
            }
            let reduced = group.intersection(&info.may_have);
            match reduced.len() {
                0 => {
                    return Err(crate::error::ProtocolError::inconsistent(format!(
                        "player {player_id}: selection group {group} reduced to empty"
                    )));
                }
                1 => {
                    let card = reduced.iter().next().expect("len==1");
                    kb.set_owner(card, player_id)?;
                    changed = true; // discard, now satisfied
                }
                _ => new_groups.push(reduced),
            }
        }
        if new_groups.len() != info.selection_groups.len()
            || new_groups.iter().zip(&info.selection_groups).any(|(a, b)| a != b)
        {
            kb.set_selection_groups(player_id, new_groups);
        }

        // R4: one-slot narrowing. Every remaining active group already
        // excludes must_have overlap after R3, so intersect them all.
        let info = kb.player(player_id).clone();
        if info.must_have_count() + 1 == info.n_cards {
            let mut allowed = info.may_have;
            for group in &info.selection_groups {
                allowed = allowed.intersection(group);
            }
            for card in info.may_have.iter().collect::<Vec<_>>() {
                if !allowed.contains(card) && kb.exclude(card, player_id) {
                    changed = true;
                }
            }
        }

        any_changed |= changed;
        if !changed {
            return Ok(any_changed);
        }
    }
}

/// R5 (solution by elimination, card) and R6 (solution by elimination,
/// category).
fn apply_solution_rules(kb: &mut KnowledgeBase) -> Result<bool> {
    let mut changed = false;

    for card in cards::all_cards() {
        let belief = kb.card(card);
        if belief.owner.is_unknown() && belief.possible_owners.is_empty() {
            let cat = cards::category(card);
            if kb.category_solution(cat).is_none() {
                kb.set_solution(card)?;
                changed = true;
            }
        }
    }

    for cat in Category::ALL {
        if kb.category_solution(cat).is_none() && kb.category_remaining(cat) == 1 {
            let unresolved: Option<CardId> = cards::category_cards(cat)
                .into_iter()
                .find(|&c| kb.card(c).owner.is_unknown());
            if let Some(card) = unresolved {
                kb.set_solution(card)?;
                changed = true;
            }
        }
    }

    Ok(changed)
}

/// Re-derives the cards still in `player`'s hand that are constrained by
/// at least one active selection group — used by tests to sanity-check
/// R4 without duplicating its internals.
#[cfg(test)]
pub(crate) fn active_group_intersection(kb: &KnowledgeBase, player_id: PlayerId) -> CardMask {
    let info = kb.player(player_id);
    let mut allowed = info.may_have;
    for group in &info.selection_groups {
        allowed = allowed.intersection(group);
    }
    allowed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::by_token;

    fn card(token: &str) -> CardId {
        by_token(token).unwrap()
    }

    #[test]
    fn r1_hand_full_excludes_rest() {
        // 3 players, self=0 holds 6 cards; player 1's hand is pinned down
        // to exactly n_cards (6) must_have cards directly, which should
        // make R1 clear the rest of player 1's may_have.
        let own = vec![
            card("Gr"),
            card("Ca"),
            card("Ba"),
            card("Bi"),
            card("Co"),
            card("Di"),
        ];
        let mut kb = KnowledgeBase::reset(3, 0, &own).unwrap();
        let p1 = PlayerId(1);
        let remaining: Vec<CardId> = cards::all_cards().filter(|c| !own.contains(c)).collect();
        assert_eq!(remaining.len(), 15);
        for &c in remaining.iter().take(6) {
            kb.set_owner(c, p1).unwrap();
        }
        assert_eq!(kb.player(p1).may_have_count(), 9);
        run(&mut kb).unwrap();
        let p1_info = kb.player(p1);
        assert_eq!(p1_info.must_have_count(), 6);
        assert_eq!(p1_info.may_have_count(), 0);
    }

    #[test]
    fn r3_reduces_then_r3_again_resolves() {
        let own = vec![
            card("Gr"),
            card("Ca"),
            card("Ba"),
            card("Bi"),
            card("Co"),
            card("Di"),
        ];
        let mut kb = KnowledgeBase::reset(3, 0, &own).unwrap();
        let p1 = PlayerId(1);
        // Narrow player 1's may_have for {Pe,Pi,Li} down to {Pi,Li} first.
        kb.exclude(card("Pe"), p1);
        let mut group = CardMask::EMPTY;
        group.insert(card("Pe"));
        group.insert(card("Pi"));
        group.insert(card("Li"));
        kb.add_selection_group(p1, group);
        run(&mut kb).unwrap();
        let reduced = active_group_intersection(&kb, p1);
        assert_eq!(reduced.len(), 2);
        assert!(reduced.contains(card("Pi")));
        assert!(reduced.contains(card("Li")));

        // Now Pi is proven to belong to player 2: R3 should re-fire and
        // force Li onto player 1.
        kb.set_owner(card("Pi"), PlayerId(2)).unwrap();
        run(&mut kb).unwrap();
        assert_eq!(kb.player(p1).must_have.contains(card("Li")), true);
    }

    #[test]
    fn r5_elimination_to_solution_once_every_player_excludes_a_card() {
        let own = vec![
            card("Gr"),
            card("Ca"),
            card("Ba"),
            card("Bi"),
            card("Co"),
            card("Di"),
        ];
        let mut kb = KnowledgeBase::reset(3, 0, &own).unwrap();
        // self already excludes Wr (not among own_cards); exclude the
        // other two players by hand to simulate several prior suggestions
        // having ruled it out everywhere.
        kb.exclude(card("Wr"), PlayerId(1));
        kb.exclude(card("Wr"), PlayerId(2));
        run(&mut kb).unwrap();
        assert_eq!(kb.category_solution(Category::Weapon), Some(card("Wr")));
        assert!(kb.card(card("Wr")).owner.is_unknown());
    }

    #[test]
    fn kb_state_is_monotone_under_information() {
        let own = vec![
            card("Gr"),
            card("Ca"),
            card("Ba"),
            card("Bi"),
            card("Co"),
            card("Di"),
        ];
        let mut kb = KnowledgeBase::reset(3, 0, &own).unwrap();

        fn snapshot(kb: &KnowledgeBase) -> (Vec<CardMask>, Vec<crate::kb::PlayerMask>) {
            let must = kb.players().map(|p| p.must_have).collect();
            let possible = cards::all_cards().map(|c| kb.card(c).possible_owners).collect();
            (must, possible)
        }
        fn assert_monotone(
            before: &(Vec<CardMask>, Vec<crate::kb::PlayerMask>),
            after: &(Vec<CardMask>, Vec<crate::kb::PlayerMask>),
        ) {
            for (b, a) in before.0.iter().zip(&after.0) {
                assert!(b.difference(a).is_empty(), "must_have lost a card");
            }
            for (b, a) in before.1.iter().zip(&after.1) {
                assert!(a.difference(b).is_empty(), "possible_owners gained a player back");
            }
        }

        let before = snapshot(&kb);
        kb.exclude(card("Pe"), PlayerId(1));
        let mut group = CardMask::EMPTY;
        group.insert(card("Pe"));
        group.insert(card("Pi"));
        group.insert(card("Li"));
        kb.add_selection_group(PlayerId(1), group);
        run(&mut kb).unwrap();
        let after_first = snapshot(&kb);
        assert_monotone(&before, &after_first);

        kb.set_owner(card("Pi"), PlayerId(2)).unwrap();
        run(&mut kb).unwrap();
        let after_second = snapshot(&kb);
        assert_monotone(&after_first, &after_second);
    }

    #[test]
    fn propagator_is_confluent() {
        let own = vec![card("Gr"), card("Ca"), card("Ba")];
        let mut kb = KnowledgeBase::reset(7, 0, &own).unwrap();
        kb.exclude(card("Wr"), PlayerId(1));
        run(&mut kb).unwrap();
        let before = format!("{kb:?}");
        run(&mut kb).unwrap();
        let after = format!("{kb:?}");
        assert_eq!(before, after);
    }
}
