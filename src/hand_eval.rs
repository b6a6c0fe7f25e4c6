//! Five-to-seven card hand evaluator.
//!
//! One pass builds a rank histogram and per-suit 13-bit rank masks; the
//! best category is then read straight off the masks. Straight detection
//! goes through a precomputed 8192-entry table covering the wheel.
//!
//! The returned `HandValue` is a totally-ordered key: better poker hands
//! compare strictly greater, identical strength compares equal.

use std::fmt;

use once_cell::sync::Lazy;

use crate::cards::Card;
use crate::error::{SolverError, SolverResult};

/// Hand categories from weakest to strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum HandCategory {
    HighCard = 0,
    OnePair = 1,
    TwoPair = 2,
    ThreeOfAKind = 3,
    Straight = 4,
    Flush = 5,
    FullHouse = 6,
    FourOfAKind = 7,
    StraightFlush = 8,
}

impl fmt::Display for HandCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HandCategory::HighCard => "High Card",
            HandCategory::OnePair => "One Pair",
            HandCategory::TwoPair => "Two Pair",
            HandCategory::ThreeOfAKind => "Three of a Kind",
            HandCategory::Straight => "Straight",
            HandCategory::Flush => "Flush",
            HandCategory::FullHouse => "Full House",
            HandCategory::FourOfAKind => "Four of a Kind",
            HandCategory::StraightFlush => "Straight Flush",
        };
        f.write_str(name)
    }
}

/// Totally-ordered hand strength key: `(category, tiebreak)`.
///
/// The tiebreak is a fixed-width tuple of rank indices (0-12), high to
/// low, zero-padded. Within a category the meaningful arity is constant,
/// so the derived lexicographic order is exactly the poker order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HandValue {
    category: HandCategory,
    tiebreak: [u8; 5],
}

impl HandValue {
    fn new(category: HandCategory, ranks: &[u8]) -> HandValue {
        let mut tiebreak = [0u8; 5];
        tiebreak[..ranks.len()].copy_from_slice(ranks);
        HandValue { category, tiebreak }
    }

    pub fn category(&self) -> HandCategory {
        self.category
    }

    /// The meaningful tiebreak ranks, trimmed to the category's arity.
    pub fn ranks(&self) -> &[u8] {
        let len = match self.category {
            HandCategory::StraightFlush | HandCategory::Straight => 1,
            HandCategory::FourOfAKind | HandCategory::FullHouse => 2,
            HandCategory::ThreeOfAKind | HandCategory::TwoPair => 3,
            HandCategory::OnePair => 4,
            HandCategory::Flush | HandCategory::HighCard => 5,
        };
        &self.tiebreak[..len]
    }
}

// -------------------------------------------------------------------------
// Straight detection table
// -------------------------------------------------------------------------

/// For a 13-bit rank mask (bit 0 = deuce .. bit 12 = ace), the highest
/// straight's top rank plus one, or 0 when no straight exists. The wheel
/// A-2-3-4-5 maps to a 5-high straight (top rank index 3).
static STRAIGHT_TABLE: Lazy<[u8; 8192]> = Lazy::new(|| {
    let mut table = [0u8; 8192];
    for mask in 0..8192u16 {
        let mut best = 0u8;
        for high in 4..=12u8 {
            let pattern = 0x1Fu16 << (high - 4);
            if mask & pattern == pattern {
                best = high + 1;
            }
        }
        let wheel: u16 = (1 << 12) | 0b1111;
        if best == 0 && mask & wheel == wheel {
            best = 3 + 1;
        }
        table[mask as usize] = best;
    }
    table
});

/// Top `n` set bits of a rank mask as rank indices, high to low.
fn top_ranks(mask: u16, n: usize) -> [u8; 5] {
    let mut result = [0u8; 5];
    let mut count = 0;
    for bit in (0..13u8).rev() {
        if mask & (1 << bit) != 0 {
            result[count] = bit;
            count += 1;
            if count == n {
                break;
            }
        }
    }
    result
}

// -------------------------------------------------------------------------
// Evaluator
// -------------------------------------------------------------------------

/// Evaluate the best five-card hand among 5-7 distinct cards.
///
/// Fails with `InvalidHand` outside that count; distinctness is the
/// caller's contract and is not verified.
pub fn evaluate(cards: &[Card]) -> SolverResult<HandValue> {
    if cards.len() < 5 || cards.len() > 7 {
        return Err(SolverError::InvalidHand(cards.len()));
    }

    let mut rank_counts = [0u8; 13];
    let mut suit_masks = [0u16; 4];
    let mut suit_counts = [0u8; 4];
    for card in cards {
        rank_counts[card.rank as usize] += 1;
        suit_masks[card.suit as usize] |= 1 << card.rank;
        suit_counts[card.suit as usize] += 1;
    }

    // Flush path. In at most seven cards a flush rules out quads and full
    // houses (pigeonhole on suits), so only the straight flush outranks it.
    if let Some(suit) = suit_counts.iter().position(|&n| n >= 5) {
        let mask = suit_masks[suit];
        let high = STRAIGHT_TABLE[mask as usize];
        if high > 0 {
            return Ok(HandValue::new(HandCategory::StraightFlush, &[high - 1]));
        }
        return Ok(HandValue::new(HandCategory::Flush, &top_ranks(mask, 5)));
    }

    Ok(evaluate_groups(&rank_counts))
}

/// Best non-flush hand from rank multiplicities.
fn evaluate_groups(rank_counts: &[u8; 13]) -> HandValue {
    // Bucket ranks by multiplicity, scanning ace-down so every bucket is
    // already sorted high to low. Bucket capacities are the 7-card maxima.
    let mut quads = [0u8; 1];
    let mut trips = [0u8; 2];
    let mut pairs = [0u8; 3];
    let mut singles = [0u8; 7];
    let (mut nq, mut nt, mut np, mut ns) = (0, 0, 0, 0);
    let mut rank_mask = 0u16;

    for rank in (0..13usize).rev() {
        let r = rank as u8;
        match rank_counts[rank] {
            0 => continue,
            1 => {
                singles[ns] = r;
                ns += 1;
            }
            2 => {
                pairs[np] = r;
                np += 1;
            }
            3 => {
                trips[nt] = r;
                nt += 1;
            }
            _ => {
                quads[nq] = r;
                nq += 1;
            }
        }
        rank_mask |= 1 << rank;
    }

    if nq >= 1 {
        // Kicker is the best remaining rank whatever its multiplicity.
        let kicker = top_ranks(rank_mask & !(1 << quads[0]), 1)[0];
        return HandValue::new(HandCategory::FourOfAKind, &[quads[0], kicker]);
    }

    if nt >= 1 && (np >= 1 || nt >= 2) {
        let pair = if nt >= 2 { trips[1] } else { pairs[0] };
        return HandValue::new(HandCategory::FullHouse, &[trips[0], pair]);
    }

    let straight_high = STRAIGHT_TABLE[rank_mask as usize];
    if straight_high > 0 {
        return HandValue::new(HandCategory::Straight, &[straight_high - 1]);
    }

    if nt == 1 {
        // No pairs here, otherwise this would be a full house.
        return HandValue::new(HandCategory::ThreeOfAKind, &[trips[0], singles[0], singles[1]]);
    }

    if np >= 2 {
        // Best remaining rank may be a third pair.
        let kicker = top_ranks(rank_mask & !(1 << pairs[0]) & !(1 << pairs[1]), 1)[0];
        return HandValue::new(HandCategory::TwoPair, &[pairs[0], pairs[1], kicker]);
    }

    if np == 1 {
        return HandValue::new(
            HandCategory::OnePair,
            &[pairs[0], singles[0], singles[1], singles[2]],
        );
    }

    HandValue::new(HandCategory::HighCard, &singles[..5])
}
