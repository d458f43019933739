//! Rhythmic sequences with synchronized onset and interval views.
//!
//! A sequence is immutable once built: changing its representation means
//! constructing a new one, so the derived beat metrics and the lazily filled
//! permutation, metric and match caches never need invalidating.

use std::cell::OnceCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::classifier::{self, MetricConfig};
use crate::error::{Result, SequenceError};
use crate::matcher::{self, ComplexMatch, MatchConfig};
use crate::permutation::{SearchBudget, distinct_permutations, distinct_permutations_with_budget};
use crate::scorer::{self, BeatMetrics};

/// How a raw list of digits should be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionKind {
    /// One entry per grid unit, 1 for an onset and 0 for none
    Onsets,
    /// Distance in grid units from each onset to the next
    Intervals,
}

impl DefinitionKind {
    /// Digits containing a 0 can only be onsets; everything else reads as intervals.
    pub fn detect(digits: &[u32]) -> Self {
        if digits.contains(&0) {
            DefinitionKind::Onsets
        } else {
            DefinitionKind::Intervals
        }
    }
}

#[derive(Debug, Clone)]
pub struct Sequence {
    onsets: Vec<u8>,
    intervals: Vec<u32>,
    metrics: Option<BeatMetrics>,
    permutations: OnceCell<Vec<Sequence>>,
    metric_forms: OnceCell<Vec<Sequence>>,
    complex_matches: OnceCell<Vec<ComplexMatch>>,
}

/// Expand intervals into their onset grid.
pub fn onsets_of(intervals: &[u32]) -> Vec<u8> {
    let mut onsets = Vec::with_capacity(intervals.iter().sum::<u32>() as usize);
    for &interval in intervals {
        onsets.push(1);
        onsets.extend(std::iter::repeat_n(0, interval.saturating_sub(1) as usize));
    }
    onsets
}

/// Collapse an onset grid into intervals.
pub fn intervals_of(onsets: &[u8]) -> Result<Vec<u32>> {
    let mut intervals: Vec<u32> = Vec::new();
    for (i, &onset) in onsets.iter().enumerate() {
        match onset {
            1 => intervals.push(1),
            0 => match intervals.last_mut() {
                Some(last) => *last += 1,
                None => {
                    return Err(SequenceError::InvalidSequence(
                        "sequence must start with an onset".to_string(),
                    ));
                }
            },
            other => {
                return Err(SequenceError::InvalidSequence(format!(
                    "onset {other} at position {i} is not 0 or 1"
                )));
            }
        }
    }
    Ok(intervals)
}

impl Sequence {
    /// Build from raw digits, reading them as `kind` or detecting the kind.
    pub fn new(digits: &[u32], kind: Option<DefinitionKind>) -> Result<Self> {
        match kind.unwrap_or_else(|| DefinitionKind::detect(digits)) {
            DefinitionKind::Intervals => Sequence::from_intervals(digits.to_vec()),
            DefinitionKind::Onsets => {
                let onsets = digits
                    .iter()
                    .map(|&d| {
                        u8::try_from(d).ok().filter(|&o| o <= 1).ok_or_else(|| {
                            SequenceError::InvalidSequence(format!("onset {d} is not 0 or 1"))
                        })
                    })
                    .collect::<Result<Vec<u8>>>()?;
                Sequence::from_onsets(onsets)
            }
        }
    }

    pub fn from_intervals(intervals: Vec<u32>) -> Result<Self> {
        if let Some(pos) = intervals.iter().position(|&i| i == 0) {
            return Err(SequenceError::InvalidSequence(format!(
                "interval at position {pos} must be positive"
            )));
        }
        let onsets = onsets_of(&intervals);
        Sequence::build(onsets, intervals)
    }

    pub fn from_onsets(onsets: Vec<u8>) -> Result<Self> {
        let intervals = intervals_of(&onsets)?;
        Sequence::build(onsets, intervals)
    }

    /// Read a non-negative integer digit by digit.
    pub fn from_number(n: u64) -> Result<Self> {
        n.to_string().parse()
    }

    fn build(onsets: Vec<u8>, intervals: Vec<u32>) -> Result<Self> {
        let metrics = if onsets.is_empty() {
            None
        } else {
            Some(scorer::score(&onsets)?)
        };
        Ok(Sequence {
            onsets,
            intervals,
            metrics,
            permutations: OnceCell::new(),
            metric_forms: OnceCell::new(),
            complex_matches: OnceCell::new(),
        })
    }

    pub fn onsets(&self) -> &[u8] {
        &self.onsets
    }

    pub fn intervals(&self) -> &[u32] {
        &self.intervals
    }

    /// Length in grid units.
    pub fn len(&self) -> usize {
        self.onsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.onsets.is_empty()
    }

    /// Beat metrics; `None` only for the empty sequence.
    pub fn metrics(&self) -> Option<BeatMetrics> {
        self.metrics
    }

    pub fn beatscore(&self) -> Option<f64> {
        self.metrics.map(|m| m.beatscore)
    }

    /// All distinct orderings of the intervals, computed once.
    pub fn permutations(&self) -> Result<&[Sequence]> {
        if let Some(cached) = self.permutations.get() {
            return Ok(cached);
        }
        let computed = distinct_permutations(&self.intervals)
            .map(Sequence::from_intervals)
            .collect::<Result<Vec<_>>>()?;
        log::debug!("{}: {} distinct permutations", self, computed.len());
        Ok(self.permutations.get_or_init(|| computed))
    }

    /// Uncached permutations that stop with `BudgetExhausted` once `budget` runs out.
    pub fn permutations_with_budget(&self, budget: &mut SearchBudget) -> Result<Vec<Sequence>> {
        if let Some(cached) = self.permutations.get() {
            return Ok(cached.clone());
        }
        distinct_permutations_with_budget(&self.intervals, budget)?
            .into_iter()
            .map(Sequence::from_intervals)
            .collect()
    }

    /// Metric rearrangements under the default grouping of 4 with no upbeat.
    pub fn metric_forms(&self) -> Result<&[Sequence]> {
        if let Some(cached) = self.metric_forms.get() {
            return Ok(cached);
        }
        let computed = classifier::metric_forms(self.permutations()?, &MetricConfig::default());
        log::debug!("{}: {} metric forms", self, computed.len());
        Ok(self.metric_forms.get_or_init(|| computed))
    }

    pub fn metric_forms_with(&self, config: &MetricConfig) -> Result<Vec<Sequence>> {
        Ok(classifier::metric_forms(self.permutations()?, config))
    }

    /// Complex matches around the default beats of interest, best first.
    pub fn complex_matches(&self) -> Result<&[ComplexMatch]> {
        if let Some(cached) = self.complex_matches.get() {
            return Ok(cached);
        }
        let computed = matcher::complex_matches(self, self.permutations()?, &MatchConfig::default())?;
        log::debug!("{}: {} complex matches", self, computed.len());
        Ok(self.complex_matches.get_or_init(|| computed))
    }

    pub fn complex_matches_with(&self, config: &MatchConfig) -> Result<Vec<ComplexMatch>> {
        matcher::complex_matches(self, self.permutations()?, config)
    }
}

impl PartialEq for Sequence {
    fn eq(&self, other: &Self) -> bool {
        self.intervals == other.intervals
    }
}

impl Eq for Sequence {}

impl Hash for Sequence {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.intervals.hash(state);
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for interval in &self.intervals {
            write!(f, "{interval}")?;
        }
        Ok(())
    }
}

impl FromStr for Sequence {
    type Err = SequenceError;

    fn from_str(s: &str) -> Result<Self> {
        let digits = s
            .trim()
            .chars()
            .map(|c| {
                c.to_digit(10)
                    .ok_or_else(|| SequenceError::InvalidSequence(format!("'{c}' is not a digit")))
            })
            .collect::<Result<Vec<u32>>>()?;
        Sequence::new(&digits, None)
    }
}

impl TryFrom<u64> for Sequence {
    type Error = SequenceError;

    fn try_from(n: u64) -> Result<Self> {
        Sequence::from_number(n)
    }
}

impl TryFrom<Vec<u32>> for Sequence {
    type Error = SequenceError;

    fn try_from(digits: Vec<u32>) -> Result<Self> {
        Sequence::new(&digits, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intervals_to_onsets() {
        let s = Sequence::try_from(vec![1, 3, 2]).unwrap();
        assert_eq!(s.onsets(), &[1, 1, 0, 0, 1, 0]);
        assert_eq!(s.intervals(), &[1, 3, 2]);
    }

    #[test]
    fn test_round_trip() {
        let intervals = vec![2, 1, 1, 3, 1, 4];
        assert_eq!(intervals_of(&onsets_of(&intervals)).unwrap(), intervals);

        let onsets = vec![1, 0, 0, 1, 1, 0, 0, 1, 1, 0, 0, 0];
        assert_eq!(onsets_of(&intervals_of(&onsets).unwrap()), onsets);
    }

    #[test]
    fn test_sum_invariant() {
        for def in ["211314", "31314", "4444", "111111111111", "100100100100"] {
            let s: Sequence = def.parse().unwrap();
            assert_eq!(s.intervals().iter().sum::<u32>() as usize, s.len(), "{def}");
        }
    }

    #[test]
    fn test_auto_detect_kind() {
        let s: Sequence = "100010001000".parse().unwrap();
        assert_eq!(s.intervals(), &[4, 4, 4]);
        assert_eq!(s.to_string(), "444");

        let s = Sequence::from_number(31314).unwrap();
        assert_eq!(s.intervals(), &[3, 1, 3, 1, 4]);
        assert_eq!(s.onsets(), &[1, 0, 0, 1, 1, 0, 0, 1, 1, 0, 0, 0]);
    }

    #[test]
    fn test_explicit_kind() {
        let s = Sequence::new(&[1, 1, 1, 1, 1, 1, 1, 1], Some(DefinitionKind::Onsets)).unwrap();
        assert_eq!(s.intervals(), &[1; 8]);

        let s = Sequence::new(&[4, 4], Some(DefinitionKind::Intervals)).unwrap();
        assert_eq!(s.len(), 8);
    }

    #[test]
    fn test_invalid_definitions() {
        assert!(matches!(
            "0101".parse::<Sequence>(),
            Err(SequenceError::InvalidSequence(_))
        ));
        assert!(matches!(
            Sequence::new(&[1, 2, 0, 1], Some(DefinitionKind::Onsets)),
            Err(SequenceError::InvalidSequence(_))
        ));
        assert!(matches!(
            Sequence::from_intervals(vec![3, 0, 4]),
            Err(SequenceError::InvalidSequence(_))
        ));
        assert!(matches!(
            "12a4".parse::<Sequence>(),
            Err(SequenceError::InvalidSequence(_))
        ));
    }

    #[test]
    fn test_too_short_is_rejected() {
        assert!(matches!(
            "12".parse::<Sequence>(),
            Err(SequenceError::SequenceTooShort { .. })
        ));
    }

    #[test]
    fn test_empty_sequence() {
        let s: Sequence = "".parse().unwrap();
        assert!(s.is_empty());
        assert_eq!(s.metrics(), None);
        assert_eq!(s.to_string(), "");
        assert_eq!(s.permutations().unwrap().len(), 1);
        assert!(s.metric_forms().unwrap().is_empty());
    }

    #[test]
    fn test_equality_by_intervals() {
        let a: Sequence = "444".parse().unwrap();
        let b: Sequence = "100010001000".parse().unwrap();
        let c: Sequence = "4431".parse().unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_derived_metrics() {
        let s: Sequence = "211314".parse().unwrap();
        let m = s.metrics().unwrap();
        assert_eq!((m.beatscore, m.basegroup, m.upbeat), (1.0, 4, 0));
    }

    #[test]
    fn test_permutations_cached_and_distinct() {
        let s: Sequence = "31314".parse().unwrap();
        let perms = s.permutations().unwrap();
        assert_eq!(perms.len(), 30);
        assert_eq!(perms[0], s);
        let again = s.permutations().unwrap();
        assert!(std::ptr::eq(perms, again));

        let mut budget = SearchBudget::limited(10);
        let fresh: Sequence = "31314".parse().unwrap();
        assert!(matches!(
            fresh.permutations_with_budget(&mut budget),
            Err(SequenceError::BudgetExhausted(10))
        ));
    }
}
