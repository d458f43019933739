//! Complex matches: non-metric rearrangements that look like the target
//! around a beat of interest.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SequenceError};
use crate::sequence::Sequence;

/// Units compared before the beat of interest.
const LEAD: usize = 4;
/// Units compared from the beat of interest onwards.
const TRAIL: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    pub beats_of_interest: Vec<usize>,
    /// Highest beatscore a candidate may have and still count as complex
    pub threshold: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        MatchConfig {
            beats_of_interest: vec![9, 5],
            threshold: 0.8,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComplexMatch {
    pub sequence: Sequence,
    pub beat_of_interest: usize,
}

impl ComplexMatch {
    pub fn beatscore(&self) -> f64 {
        self.sequence.beatscore().unwrap_or(f64::INFINITY)
    }
}

/// A beat of interest needs a full comparison window inside the sequence.
pub fn validate_beat_of_interest(boi: usize, len: usize) -> Result<()> {
    if boi <= LEAD || boi + 1 >= len {
        return Err(SequenceError::InvalidBeatOfInterest { boi, len });
    }
    Ok(())
}

/// Candidates sharing the target's onsets in `[boi - 4, boi + 2)` and scoring
/// at most `config.threshold`, sorted by ascending beatscore.
///
/// A candidate qualifying at several beats of interest is listed once per beat.
pub fn complex_matches(
    target: &Sequence,
    candidates: &[Sequence],
    config: &MatchConfig,
) -> Result<Vec<ComplexMatch>> {
    for &boi in &config.beats_of_interest {
        validate_beat_of_interest(boi, target.len())?;
    }

    let mut matches = Vec::new();
    for &boi in &config.beats_of_interest {
        let window = boi - LEAD..boi + TRAIL;
        let wanted = &target.onsets()[window.clone()];
        for candidate in candidates {
            let close = candidate.onsets().get(window.clone()) == Some(wanted);
            let complex = candidate.beatscore().is_some_and(|b| b <= config.threshold);
            if close && complex {
                matches.push(ComplexMatch {
                    sequence: candidate.clone(),
                    beat_of_interest: boi,
                });
            }
        }
    }
    matches.sort_by(|a, b| a.beatscore().total_cmp(&b.beatscore()));
    Ok(matches)
}
