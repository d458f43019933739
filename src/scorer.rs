//! Beat scoring: how regularly the onsets of a pattern fall on a periodic
//! grouping of 4 or 3 units, and at which phase.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SequenceError};

/// Grouping sizes tried, in scan order.
pub const GROUPINGS: [usize; 2] = [4, 3];

const PENALTY: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeatMetrics {
    pub beatscore: f64,
    pub basegroup: usize,
    pub upbeat: usize,
}

/// Share of beat positions after the upbeat that carry an onset.
///
/// The onset at the upbeat itself is not counted. The number of beats
/// includes an incomplete trailing group unless it is empty.
pub fn beat_ratio(onsets: &[u8], basegroup: usize, upbeat: usize) -> Result<f64> {
    let tail = onsets.get(upbeat..).unwrap_or_default();
    let mut groups = tail.len() / basegroup;
    if tail.len() % basegroup == 0 {
        groups = groups.saturating_sub(1);
    }
    if groups < 1 {
        return Err(SequenceError::SequenceTooShort {
            len: onsets.len(),
            basegroup,
            upbeat,
        });
    }

    let on_beat = tail
        .iter()
        .step_by(basegroup)
        .filter(|&&o| o == 1)
        .count();
    let beats = on_beat as f64 - 1.0;
    Ok(beats / groups as f64)
}

/// Pick the best (basegroup, upbeat) pair and derive the penalised beatscore.
///
/// Groupings of 4 are scanned before 3 and phases in ascending order; a later
/// candidate only wins with a strictly greater ratio.
pub fn score(onsets: &[u8]) -> Result<BeatMetrics> {
    let mut best: Option<(f64, usize, usize)> = None;
    for basegroup in GROUPINGS {
        for upbeat in 0..basegroup {
            if onsets.get(upbeat) != Some(&1) {
                continue;
            }
            let ratio = beat_ratio(onsets, basegroup, upbeat)?;
            if best.is_none_or(|(top, _, _)| ratio > top) {
                best = Some((ratio, basegroup, upbeat));
            }
        }
    }

    let Some((ratio, basegroup, upbeat)) = best else {
        return Err(SequenceError::SequenceTooShort {
            len: onsets.len(),
            basegroup: GROUPINGS[0],
            upbeat: 0,
        });
    };

    let mut beatscore = truncate_hundredths(ratio);
    if upbeat > 0 {
        beatscore -= PENALTY;
    }
    if upbeat == basegroup - 1 {
        beatscore -= PENALTY;
    }
    // an early second onset with a gap after it blurs where the beat starts
    if upbeat == 0 && onsets[1] == 1 && onsets[2] == 0 {
        beatscore -= PENALTY;
    }

    Ok(BeatMetrics {
        beatscore,
        basegroup,
        upbeat,
    })
}

fn truncate_hundredths(ratio: f64) -> f64 {
    let percent = (ratio * 100.0 * 100.0).round() / 100.0;
    percent.trunc() / 100.0
}
