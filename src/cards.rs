//! Static card/category registry: the 21 immutable card identities and
//! the maps between their two-letter wire tokens and dense indices.

use std::fmt;

/// One of the three fixed card categories.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Suspect,
    Weapon,
    Room,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Suspect, Category::Weapon, Category::Room];

    pub fn index(self) -> usize {
        match self {
            Category::Suspect => 0,
            Category::Weapon => 1,
            Category::Room => 2,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Suspect => write!(f, "suspect"),
            Category::Weapon => write!(f, "weapon"),
            Category::Room => write!(f, "room"),
        }
    }
}

/// A dense index into the 21-card registry. `0..6` are suspects, `6..12`
/// weapons, `12..21` rooms (see [`CATEGORY_RANGES`]).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CardId(pub u8);

impl CardId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", token(*self))
    }
}

pub const N_CARDS: usize = 21;

const SUSPECTS: [&str; 6] = ["Gr", "Mu", "Pe", "Pl", "Sc", "Wh"];
const WEAPONS: [&str; 6] = ["Ca", "Kn", "Pi", "Re", "Ro", "Wr"];
const ROOMS: [&str; 9] = ["Ba", "Bi", "Co", "Di", "Ha", "Ki", "Li", "Lo", "St"];

/// `(first_index, category)` ranges, in wire/registry order.
const CATEGORY_RANGES: [(usize, usize, Category); 3] = [
    (0, 6, Category::Suspect),
    (6, 12, Category::Weapon),
    (12, 21, Category::Room),
];

/// Returns the static token table in registry order (index == array position).
fn tokens() -> [&'static str; N_CARDS] {
    let mut out = [""; N_CARDS];
    let mut i = 0;
    for s in SUSPECTS {
        out[i] = s;
        i += 1;
    }
    for w in WEAPONS {
        out[i] = w;
        i += 1;
    }
    for r in ROOMS {
        out[i] = r;
        i += 1;
    }
    out
}

pub fn token(card: CardId) -> &'static str {
    tokens()[card.index()]
}

pub fn by_token(token: &str) -> Option<CardId> {
    tokens()
        .iter()
        .position(|&t| t == token)
        .map(|i| CardId(i as u8))
}

pub fn category(card: CardId) -> Category {
    for &(start, end, cat) in &CATEGORY_RANGES {
        if card.index() >= start && card.index() < end {
            return cat;
        }
    }
    unreachable!("card index out of range: {:?}", card);
}

/// All card ids belonging to `cat`, in registry order.
pub fn category_cards(cat: Category) -> Vec<CardId> {
    let (start, end, _) = CATEGORY_RANGES[cat.index()];
    (start..end).map(|i| CardId(i as u8)).collect()
}

pub fn category_len(cat: Category) -> usize {
    let (start, end, _) = CATEGORY_RANGES[cat.index()];
    end - start
}

/// All 21 card ids in registry order.
pub fn all_cards() -> impl Iterator<Item = CardId> {
    (0..N_CARDS as u8).map(CardId)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_roundtrip() {
        for card in all_cards() {
            let t = token(card);
            assert_eq!(by_token(t), Some(card));
        }
    }

    #[test]
    fn categories_partition_all_cards() {
        let mut seen = [false; N_CARDS];
        for cat in Category::ALL {
            for card in category_cards(cat) {
                assert!(!seen[card.index()], "card counted twice: {card}");
                seen[card.index()] = true;
                assert_eq!(category(card), cat);
            }
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn category_counts() {
        assert_eq!(category_len(Category::Suspect), 6);
        assert_eq!(category_len(Category::Weapon), 6);
        assert_eq!(category_len(Category::Room), 9);
    }

    #[test]
    fn unknown_token_is_none() {
        assert_eq!(by_token("Zz"), None);
    }
}
