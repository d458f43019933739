//! "Wrong versions": near-miss variants of a sequence that keep its coarse
//! metric class.

use rand::Rng;

use crate::error::{Result, SequenceError};
use crate::sequence::Sequence;

pub const MAX_ATTEMPTS: usize = 1000;
/// Largest interval a merge may produce.
pub const MAX_MERGED_INTERVAL: u32 = 4;

const METRIC: f64 = 1.0;
const COMPLEX_CEILING: f64 = 0.8;

/// Join two adjacent intervals and split one interval in two, retrying until
/// the result differs from `sequence` and stays metric (beatscore 1.0) or
/// complex (beatscore at most 0.8) when `sequence` was.
pub fn perturb<R: Rng + ?Sized>(sequence: &Sequence, rng: &mut R) -> Result<Sequence> {
    let intervals = sequence.intervals();
    if intervals.len() < 3 {
        return Err(SequenceError::InvalidSequence(format!(
            "{sequence} has too few intervals to perturb"
        )));
    }
    let Some(original) = sequence.beatscore() else {
        return Err(SequenceError::InvalidSequence("empty sequence".to_string()));
    };

    for attempt in 1..MAX_ATTEMPTS {
        let Some(candidate) = rearrange(intervals, rng) else {
            continue;
        };
        if candidate.as_slice() == intervals {
            continue;
        }
        let variant = match Sequence::from_intervals(candidate) {
            Ok(v) => v,
            // an onset moved onto a phase with less than one group after it
            Err(SequenceError::SequenceTooShort { .. }) => continue,
            Err(e) => return Err(e),
        };
        let Some(score) = variant.beatscore() else {
            continue;
        };
        if original == METRIC && score != METRIC {
            continue;
        }
        if original <= COMPLEX_CEILING && score > COMPLEX_CEILING {
            continue;
        }
        log::debug!("{sequence} -> {variant} after {attempt} attempts");
        return Ok(variant);
    }
    Err(SequenceError::ExhaustedAttempts(MAX_ATTEMPTS))
}

/// One random join followed by one random split, or `None` when the draw is unusable.
fn rearrange<R: Rng + ?Sized>(intervals: &[u32], rng: &mut R) -> Option<Vec<u32>> {
    let mut next = intervals.to_vec();

    // the final pair is never joined
    let pos = rng.random_range(0..next.len() - 2);
    let joined = next[pos] + next[pos + 1];
    if joined > MAX_MERGED_INTERVAL {
        return None;
    }
    next[pos] = joined;
    next.remove(pos + 1);

    let pos = rng.random_range(0..next.len());
    let n = next[pos];
    if n == 1 {
        return None;
    }
    let split = rng.random_range(1..n);
    next[pos] = n - split;
    next.insert(pos + 1, split);
    Some(next)
}
