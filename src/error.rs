//! Error kinds raised by the sequence analysis core.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequenceError {
    /// Malformed onset or interval definition
    #[error("invalid sequence: {0}")]
    InvalidSequence(String),
    /// Fewer units after the upbeat than one full group
    #[error("sequence too short to analyse: {len} units grouped in {basegroup} with upbeat {upbeat}")]
    SequenceTooShort {
        len: usize,
        basegroup: usize,
        upbeat: usize,
    },
    /// Beat of interest outside the open range (4, length - 1)
    #[error("beat of interest {boi} invalid for sequence of length {len}")]
    InvalidBeatOfInterest { boi: usize, len: usize },
    /// Every candidate index vector produced a duplicate; the batch was rolled back
    #[error("no feasible assignment for {targets} targets")]
    NoFeasibleAssignment { targets: usize },
    /// The variant generator found no qualifying rearrangement
    #[error("no qualifying variant found after {0} attempts")]
    ExhaustedAttempts(usize),
    /// A caller-supplied step limit ran out before the search finished
    #[error("search budget of {0} steps exhausted")]
    BudgetExhausted(u64),
    /// Selection moved before the first or past the last ranked match
    #[error("match index {index} out of range for {len} matches")]
    MatchOutOfRange { index: isize, len: usize },
}

pub type Result<T> = std::result::Result<T, SequenceError>;
