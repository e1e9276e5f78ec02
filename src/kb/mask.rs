//! Small bitmask types standing in for `HashSet<Card>`/`HashSet<Player>`.
//!
//! spec.md §9 asks for dense bitsets over hash sets wherever the universe
//! is small and fixed; that applies just as well to `must_have`/`may_have`
//! (21 cards) and `possible_owners`/`disproved_to` (a handful of players)
//! as it does to the 324-triple suggestion/candidate tables in
//! [`crate::bitset`].

use std::fmt;

use crate::cards::{self, CardId};
use crate::kb::PlayerId;

macro_rules! mask_type {
    ($name:ident) => {
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
        pub struct $name(u32);

        impl $name {
            pub const EMPTY: Self = Self(0);

            pub fn single(bit: usize) -> Self {
                Self(1 << bit)
            }

            pub fn full(n: usize) -> Self {
                if n == 0 {
                    Self::EMPTY
                } else if n >= 32 {
                    Self(u32::MAX)
                } else {
                    Self((1u32 << n) - 1)
                }
            }

            pub fn insert_bit(&mut self, bit: usize) -> bool {
                let had = self.0 & (1 << bit) != 0;
                self.0 |= 1 << bit;
                !had
            }

            pub fn remove_bit(&mut self, bit: usize) -> bool {
                let had = self.0 & (1 << bit) != 0;
                self.0 &= !(1 << bit);
                had
            }

            pub fn contains_bit(&self, bit: usize) -> bool {
                self.0 & (1 << bit) != 0
            }

            pub fn len(&self) -> u32 {
                self.0.count_ones()
            }

            pub fn is_empty(&self) -> bool {
                self.0 == 0
            }

            pub fn intersection(&self, other: &Self) -> Self {
                Self(self.0 & other.0)
            }

            pub fn union(&self, other: &Self) -> Self {
                Self(self.0 | other.0)
            }

            pub fn difference(&self, other: &Self) -> Self {
                Self(self.0 & !other.0)
            }

            pub fn iter_bits(&self) -> impl Iterator<Item = usize> + '_ {
                let word = self.0;
                (0..32).filter(move |b| word & (1 << b) != 0)
            }
        }
    };
}

mask_type!(CardMaskBits);
mask_type!(PlayerMaskBits);

/// A set of [`CardId`]s.
pub type CardMask = CardMaskBits;
/// A set of [`PlayerId`]s.
pub type PlayerMask = PlayerMaskBits;

impl CardMask {
    pub fn all_cards() -> Self {
        Self::full(cards::N_CARDS)
    }

    pub fn contains(&self, card: CardId) -> bool {
        self.contains_bit(card.index())
    }

    pub fn insert(&mut self, card: CardId) -> bool {
        self.insert_bit(card.index())
    }

    pub fn remove(&mut self, card: CardId) -> bool {
        self.remove_bit(card.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = CardId> + '_ {
        self.iter_bits().map(|b| CardId(b as u8))
    }
}

impl PlayerMask {
    pub fn contains(&self, player: PlayerId) -> bool {
        self.contains_bit(player.index())
    }

    pub fn insert(&mut self, player: PlayerId) -> bool {
        self.insert_bit(player.index())
    }

    pub fn remove(&mut self, player: PlayerId) -> bool {
        self.remove_bit(player.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.iter_bits().map(|b| PlayerId(b as u8))
    }
}

impl fmt::Display for CardMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, card) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", cards::token(card))?;
        }
        write!(f, "}}")
    }
}

impl fmt::Display for PlayerMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, player) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", player.0)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_mask_insert_remove() {
        let mut mask = CardMask::EMPTY;
        let card = CardId(3);
        assert!(!mask.contains(card));
        assert!(mask.insert(card));
        assert!(mask.contains(card));
        assert!(!mask.insert(card));
        assert!(mask.remove(card));
        assert!(!mask.contains(card));
    }

    #[test]
    fn full_mask_has_n_bits() {
        let mask = CardMask::all_cards();
        assert_eq!(mask.len(), cards::N_CARDS as u32);
    }

    #[test]
    fn intersection_and_difference() {
        let mut a = CardMask::EMPTY;
        let mut b = CardMask::EMPTY;
        a.insert(CardId(1));
        a.insert(CardId(2));
        b.insert(CardId(2));
        b.insert(CardId(3));
        assert_eq!(a.intersection(&b).len(), 1);
        assert!(a.intersection(&b).contains(CardId(2)));
        assert_eq!(a.difference(&b).len(), 1);
        assert!(a.difference(&b).contains(CardId(1)));
    }
}
