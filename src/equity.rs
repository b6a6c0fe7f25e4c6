//! Exact equity on a completed board.
//!
//! All five community cards are already dealt, so equity reduces to
//! weighted win/lose/tie counting over a villain distribution. Degenerate
//! cases (hero blocked by the board, empty villain range, every matchup
//! skipped) return the 1.0 sentinel; callers skip or zero-weight such
//! hands, so the sentinel never leaks into a result.

use std::cmp::Ordering;

use crate::cards::{Card, HoleCards};
use crate::hand_eval::{evaluate, HandValue};
use crate::range::Range;

fn showdown_value(hand: HoleCards, board: &[Card]) -> HandValue {
    let [first, second] = hand.cards();
    let cards = [board[0], board[1], board[2], board[3], board[4], first, second];
    evaluate(&cards).expect("five board cards plus two hole cards")
}

/// Equity of one hand against a weighted range.
///
/// Villain hands sharing a card with the hero or the board are skipped.
/// Ties count half a win and half a loss.
pub fn equity_hand_vs_range(hero: HoleCards, villain: &Range, board: &[Card]) -> f64 {
    assert_eq!(board.len(), 5, "equity requires a completed five-card board");

    if hero.blocked_by(board) {
        return 1.0;
    }
    if villain.size() == 0.0 {
        return 1.0;
    }

    let hero_value = showdown_value(hero, board);
    let mut win = 0.0;
    let mut lose = 0.0;
    for (&hand, &weight) in villain.iter() {
        if hand.conflicts_with(hero) || hand.blocked_by(board) {
            continue;
        }
        match hero_value.cmp(&showdown_value(hand, board)) {
            Ordering::Greater => win += weight,
            Ordering::Less => lose += weight,
            Ordering::Equal => {
                win += weight / 2.0;
                lose += weight / 2.0;
            }
        }
    }

    if win + lose == 0.0 {
        1.0
    } else {
        win / (win + lose)
    }
}

/// Equity of one weighted range against another.
///
/// Villain showdown values are computed once up front; the hero loop only
/// compares. Matchup weights multiply.
pub fn equity_range_vs_range(hero: &Range, villain: &Range, board: &[Card]) -> f64 {
    assert_eq!(board.len(), 5, "equity requires a completed five-card board");

    let villain_values: Vec<(HoleCards, f64, HandValue)> = villain
        .iter()
        .filter(|(hand, _)| !hand.blocked_by(board))
        .map(|(&hand, &weight)| (hand, weight, showdown_value(hand, board)))
        .collect();

    let mut win = 0.0;
    let mut lose = 0.0;
    for (&hero_hand, &hero_weight) in hero.iter() {
        if hero_hand.blocked_by(board) {
            continue;
        }
        let hero_value = showdown_value(hero_hand, board);
        for &(villain_hand, villain_weight, villain_value) in &villain_values {
            if hero_hand.conflicts_with(villain_hand) {
                continue;
            }
            let weight = hero_weight * villain_weight;
            match hero_value.cmp(&villain_value) {
                Ordering::Greater => win += weight,
                Ordering::Less => lose += weight,
                Ordering::Equal => {
                    win += weight / 2.0;
                    lose += weight / 2.0;
                }
            }
        }
    }

    if win + lose == 0.0 {
        1.0
    } else {
        win / (win + lose)
    }
}
