//! Card model and textual parsing.
//!
//! Ranks and suits are small integers indexing the `"23456789TJQKA"` and
//! `"shdc"` alphabets. A card's deck index is `rank * 4 + suit` (0-51),
//! so index order is rank-major.

use std::fmt;

use itertools::{iproduct, Itertools};
use once_cell::sync::Lazy;

use crate::error::{SolverError, SolverResult};

/// Rank alphabet, deuce through ace.
pub const RANKS: &str = "23456789TJQKA";
/// Suit alphabet: spades, hearts, diamonds, clubs.
pub const SUITS: &str = "shdc";

/// One of the 52 cards. Ordering follows the deck index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Card {
    pub rank: u8,
    pub suit: u8,
}

impl Card {
    pub fn new(rank: u8, suit: u8) -> Card {
        debug_assert!(rank < 13 && suit < 4);
        Card { rank, suit }
    }

    /// Deck index 0-51.
    pub fn index(self) -> usize {
        self.rank as usize * 4 + self.suit as usize
    }

    pub fn from_index(index: usize) -> Card {
        debug_assert!(index < 52);
        Card::new((index / 4) as u8, (index % 4) as u8)
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            RANKS.as_bytes()[self.rank as usize] as char,
            SUITS.as_bytes()[self.suit as usize] as char,
        )
    }
}

/// All 52 cards in rank-major order.
pub static DECK: Lazy<Vec<Card>> =
    Lazy::new(|| iproduct!(0..13u8, 0..4u8).map(|(rank, suit)| Card::new(rank, suit)).collect());

/// Parse a two-character card like "As" or "7d".
pub fn parse_card(s: &str) -> SolverResult<Card> {
    let invalid = || SolverError::InvalidCard(s.to_string());
    let chars: Vec<char> = s.chars().collect();
    if chars.len() != 2 {
        return Err(invalid());
    }
    let rank = RANKS.find(chars[0]).ok_or_else(invalid)?;
    let suit = SUITS.find(chars[1]).ok_or_else(invalid)?;
    Ok(Card::new(rank as u8, suit as u8))
}

/// Parse whitespace-separated card tokens like "Ah Kd 2c".
pub fn parse_hand(s: &str) -> SolverResult<Vec<Card>> {
    s.split_whitespace().map(parse_card).collect()
}

/// Parse a river board: exactly five distinct cards, either compact
/// ("2h3h4d6d7s") or whitespace-separated.
pub fn parse_board(s: &str) -> SolverResult<Vec<Card>> {
    let cards = if s.contains(char::is_whitespace) {
        parse_hand(s)?
    } else {
        let chars: Vec<char> = s.chars().collect();
        chars
            .chunks(2)
            .map(|pair| parse_card(&pair.iter().collect::<String>()))
            .collect::<SolverResult<Vec<Card>>>()?
    };
    if cards.len() != 5 || !cards.iter().all_unique() {
        return Err(SolverError::InvalidCard(s.to_string()));
    }
    Ok(cards)
}

/// Two distinct hole cards in canonical order, so equal hands compare and
/// hash identically regardless of construction order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HoleCards {
    lo: Card,
    hi: Card,
}

impl HoleCards {
    pub fn new(a: Card, b: Card) -> HoleCards {
        debug_assert_ne!(a, b, "hole cards must be distinct");
        if a.index() <= b.index() {
            HoleCards { lo: a, hi: b }
        } else {
            HoleCards { lo: b, hi: a }
        }
    }

    pub fn cards(self) -> [Card; 2] {
        [self.lo, self.hi]
    }

    pub fn contains(self, card: Card) -> bool {
        self.lo == card || self.hi == card
    }

    pub fn conflicts_with(self, other: HoleCards) -> bool {
        self.contains(other.lo) || self.contains(other.hi)
    }

    /// True if any of `cards` appears in this hand.
    pub fn blocked_by(self, cards: &[Card]) -> bool {
        cards.iter().any(|&c| self.contains(c))
    }
}

impl fmt::Display for HoleCards {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // High card first, the usual table notation.
        write!(f, "{}{}", self.hi, self.lo)
    }
}

/// Expand canonical hand notation into specific combos.
///
/// Supported forms: pairs ("QQ", 6 combos), suited ("AKs", 4), offsuit
/// ("AKo", 12), any-suits ("AK", 16), and exact combos ("AhKs", 1).
pub fn hand_combos(notation: &str) -> SolverResult<Vec<HoleCards>> {
    let invalid = || SolverError::InvalidCard(notation.to_string());
    let chars: Vec<char> = notation.chars().collect();
    match chars.len() {
        2 | 3 => {
            let r1 = RANKS.find(chars[0]).ok_or_else(invalid)? as u8;
            let r2 = RANKS.find(chars[1]).ok_or_else(invalid)? as u8;
            let suitedness = chars.get(2).copied();
            match suitedness {
                None if r1 == r2 => Ok((0..4u8)
                    .tuple_combinations()
                    .map(|(s1, s2)| HoleCards::new(Card::new(r1, s1), Card::new(r1, s2)))
                    .collect()),
                None => Ok(iproduct!(0..4u8, 0..4u8)
                    .map(|(s1, s2)| HoleCards::new(Card::new(r1, s1), Card::new(r2, s2)))
                    .collect()),
                Some('s') if r1 != r2 => Ok((0..4u8)
                    .map(|s| HoleCards::new(Card::new(r1, s), Card::new(r2, s)))
                    .collect()),
                Some('o') if r1 != r2 => Ok(iproduct!(0..4u8, 0..4u8)
                    .filter(|(s1, s2)| s1 != s2)
                    .map(|(s1, s2)| HoleCards::new(Card::new(r1, s1), Card::new(r2, s2)))
                    .collect()),
                Some(_) => Err(invalid()),
            }
        }
        4 => {
            let c1 = parse_card(&chars[..2].iter().collect::<String>())?;
            let c2 = parse_card(&chars[2..].iter().collect::<String>())?;
            if c1 == c2 {
                return Err(invalid());
            }
            Ok(vec![HoleCards::new(c1, c2)])
        }
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_roundtrip() {
        for i in 0..52 {
            assert_eq!(Card::from_index(i).index(), i, "roundtrip failed for index {}", i);
        }
    }

    #[test]
    fn known_cards() {
        // Two of spades = rank 0, suit 0 → index 0
        assert_eq!(parse_card("2s").unwrap().index(), 0);
        // Ace of clubs = rank 12, suit 3 → index 51
        assert_eq!(parse_card("Ac").unwrap().index(), 51);
        assert_eq!(parse_card("As").unwrap().index(), 48);
    }

    #[test]
    fn deck_has_52_distinct_cards() {
        assert_eq!(DECK.len(), 52);
        assert!(DECK.iter().all_unique());
        assert_eq!(DECK[0], Card::new(0, 0));
        assert_eq!(DECK[51], Card::new(12, 3));
    }

    #[test]
    fn parse_rejects_bad_notation() {
        assert!(matches!(parse_card("1s"), Err(SolverError::InvalidCard(_))));
        assert!(matches!(parse_card("Ax"), Err(SolverError::InvalidCard(_))));
        assert!(matches!(parse_card("A"), Err(SolverError::InvalidCard(_))));
        assert!(matches!(parse_card("Ass"), Err(SolverError::InvalidCard(_))));
    }

    #[test]
    fn display_roundtrip() {
        for notation in ["As", "2s", "Td", "9c", "Kh"] {
            assert_eq!(parse_card(notation).unwrap().to_string(), notation);
        }
    }

    #[test]
    fn board_requires_five_distinct_cards() {
        assert!(parse_board("2h3h4d6d7s").is_ok());
        assert!(parse_board("2h 3h 4d 6d 7s").is_ok());
        assert!(parse_board("2h3h4d6d").is_err());
        assert!(parse_board("2h3h4d6d2h").is_err());
    }

    #[test]
    fn hole_cards_canonical() {
        let a = parse_card("As").unwrap();
        let k = parse_card("Kd").unwrap();
        assert_eq!(HoleCards::new(a, k), HoleCards::new(k, a));
        assert_eq!(HoleCards::new(a, k).to_string(), "AsKd");
    }

    #[test]
    fn combo_counts() {
        assert_eq!(hand_combos("AA").unwrap().len(), 6);
        assert_eq!(hand_combos("AKs").unwrap().len(), 4);
        assert_eq!(hand_combos("AKo").unwrap().len(), 12);
        assert_eq!(hand_combos("AK").unwrap().len(), 16);
        assert_eq!(hand_combos("AhKs").unwrap().len(), 1);
        assert!(hand_combos("AAs").is_err());
        assert!(hand_combos("AhAh").is_err());
    }
}
