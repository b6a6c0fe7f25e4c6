//! Weighted hole-card distributions.

use std::collections::HashMap;
use std::ops::AddAssign;

use crate::cards::{hand_combos, Card, HoleCards};
use crate::error::{SolverError, SolverResult};

/// A mapping from two-card combos to nonnegative weights.
///
/// Hands need not be pairwise disjoint; each combo is its own weighted
/// atom. Card-removal effects are applied at query time via
/// [`Range::size_without`].
#[derive(Debug, Clone, Default)]
pub struct Range {
    weights: HashMap<HoleCards, f64>,
}

impl Range {
    pub fn new() -> Range {
        Range::default()
    }

    pub fn from_weights(weights: impl IntoIterator<Item = (HoleCards, f64)>) -> Range {
        Range { weights: weights.into_iter().collect() }
    }

    /// Parse comma-separated notation with optional `:weight` suffixes,
    /// e.g. `"AA:3,KQs,AhKs:0.5"`. Every expanded combo gets the weight.
    pub fn parse(s: &str) -> SolverResult<Range> {
        let mut range = Range::new();
        for token in s.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            let (notation, weight) = match token.split_once(':') {
                Some((notation, weight)) => {
                    let weight: f64 = weight
                        .parse()
                        .map_err(|_| SolverError::InvalidCard(token.to_string()))?;
                    (notation, weight)
                }
                None => (token, 1.0),
            };
            for combo in hand_combos(notation)? {
                *range.weights.entry(combo).or_insert(0.0) += weight;
            }
        }
        Ok(range)
    }

    pub fn set(&mut self, hand: HoleCards, weight: f64) {
        self.weights.insert(hand, weight);
    }

    pub fn weight(&self, hand: HoleCards) -> f64 {
        self.weights.get(&hand).copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&HoleCards, &f64)> {
        self.weights.iter()
    }

    /// Snapshot of (hand, weight) pairs ordered by deck index. The solver
    /// keys its variable layout off this fixed enumeration.
    pub fn entries(&self) -> Vec<(HoleCards, f64)> {
        let mut entries: Vec<(HoleCards, f64)> =
            self.weights.iter().map(|(&h, &w)| (h, w)).collect();
        entries.sort_by_key(|&(hand, _)| hand);
        entries
    }

    /// Total weight.
    pub fn size(&self) -> f64 {
        self.weights.values().sum()
    }

    /// Total weight of hands sharing no card with `dead`.
    pub fn size_without(&self, dead: &[Card]) -> f64 {
        self.weights
            .iter()
            .filter(|(hand, _)| !hand.blocked_by(dead))
            .map(|(_, weight)| weight)
            .sum()
    }

    /// Scale all weights so the total becomes one.
    pub fn normalize(&mut self) -> SolverResult<()> {
        let total = self.size();
        if total == 0.0 {
            return Err(SolverError::EmptyRange);
        }
        for weight in self.weights.values_mut() {
            *weight /= total;
        }
        Ok(())
    }
}

/// Weights add; the domain is the union.
impl AddAssign<&Range> for Range {
    fn add_assign(&mut self, other: &Range) {
        for (&hand, &weight) in &other.weights {
            *self.weights.entry(hand).or_insert(0.0) += weight;
        }
    }
}
