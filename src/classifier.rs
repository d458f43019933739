//! Selection of the "metric simples": rearrangements that group perfectly.

use serde::{Deserialize, Serialize};

use crate::sequence::Sequence;

const BAR: usize = 4;

/// Bar-sized onset windows that make an otherwise perfect grouping unusable.
const EXCLUDED_WINDOWS: [[u8; BAR]; 2] = [[1, 1, 0, 1], [1, 1, 0, 0]];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricConfig {
    pub basegroup: usize,
    pub upbeat: usize,
}

impl Default for MetricConfig {
    fn default() -> Self {
        MetricConfig {
            basegroup: 4,
            upbeat: 0,
        }
    }
}

/// Window of up to `BAR` onsets starting at `start`, shortened at the end.
fn bar(onsets: &[u8], start: usize) -> &[u8] {
    let from = start.min(onsets.len());
    let to = (start + BAR).min(onsets.len());
    &onsets[from..to]
}

/// True for patterns that open a bar with `1101`/`1100` or repeat a bar.
pub fn is_excluded(onsets: &[u8]) -> bool {
    let excluded_window = (0..3 * BAR)
        .step_by(BAR)
        .any(|start| EXCLUDED_WINDOWS.iter().any(|w| bar(onsets, start) == w));
    let repeated_bar = bar(onsets, 0) == bar(onsets, BAR) || bar(onsets, BAR) == bar(onsets, 2 * BAR);
    excluded_window || repeated_bar
}

pub fn is_metric_form(sequence: &Sequence, config: &MetricConfig) -> bool {
    sequence.metrics().is_some_and(|m| {
        m.beatscore == 1.0 && m.basegroup == config.basegroup && m.upbeat == config.upbeat
    }) && !is_excluded(sequence.onsets())
}

/// Keep the candidates that score exactly 1.0 under `config` and are not excluded.
pub fn metric_forms(candidates: &[Sequence], config: &MetricConfig) -> Vec<Sequence> {
    candidates
        .iter()
        .filter(|s| is_metric_form(s, config))
        .cloned()
        .collect()
}
