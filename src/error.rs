//! Error types shared across the crate.
//!
//! Every failure is fatal at the call site and surfaced to the caller
//! unchanged; nothing is retried internally.

use thiserror::Error;

pub type SolverResult<T> = Result<T, SolverError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolverError {
    /// Textual parse failure: unrecognized rank or suit character.
    #[error("invalid card notation: {0:?}")]
    InvalidCard(String),

    /// The evaluator accepts between 5 and 7 cards.
    #[error("hand must have between 5 and 7 cards, got {0}")]
    InvalidHand(usize),

    /// Side identifiers are "ip" and "oop".
    #[error("player must be \"ip\" or \"oop\", got {0:?}")]
    InvalidPlayer(String),

    /// Normalization of a range whose total weight is zero.
    #[error("cannot normalize a range with zero total weight")]
    EmptyRange,
}
