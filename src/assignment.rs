//! Conflict-free assignment of complex matches across a batch of targets.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Result, SequenceError};
use crate::matcher::{ComplexMatch, MatchConfig};
use crate::permutation::{SearchBudget, bounded_odometer_with_budget};
use crate::sequence::Sequence;

static ASSIGNMENT_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d*)\s*:\s*(\d*)\s*;\s*(?:boi=)?(\d+)\s*$").unwrap());

/// A target together with its ranked complex matches and the one currently chosen.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchedTarget {
    target: Sequence,
    matches: Vec<ComplexMatch>,
    selected: usize,
}

impl MatchedTarget {
    /// Wrap `target` with its complex matches around the default beats of interest.
    pub fn new(target: Sequence) -> Result<Self> {
        let matches = target.complex_matches()?.to_vec();
        Ok(MatchedTarget::with_matches(target, matches))
    }

    pub fn with_config(target: Sequence, config: &MatchConfig) -> Result<Self> {
        let matches = target.complex_matches_with(config)?;
        Ok(MatchedTarget::with_matches(target, matches))
    }

    /// Use an already ranked candidate list.
    pub fn with_matches(target: Sequence, matches: Vec<ComplexMatch>) -> Self {
        MatchedTarget {
            target,
            matches,
            selected: 0,
        }
    }

    pub fn target(&self) -> &Sequence {
        &self.target
    }

    pub fn matches(&self) -> &[ComplexMatch] {
        &self.matches
    }

    pub fn beats_of_interest(&self) -> impl Iterator<Item = usize> + '_ {
        self.matches.iter().map(|m| m.beat_of_interest)
    }

    pub fn has_matches(&self) -> bool {
        !self.matches.is_empty()
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn set_selected_index(&mut self, index: usize) -> Result<()> {
        if index >= self.matches.len() {
            return Err(SequenceError::MatchOutOfRange {
                index: index as isize,
                len: self.matches.len(),
            });
        }
        self.selected = index;
        Ok(())
    }

    pub fn selected_match(&self) -> Option<&ComplexMatch> {
        self.matches.get(self.selected)
    }

    pub fn to_next_match(&mut self) -> Result<()> {
        self.set_selected_index(self.selected + 1)
    }

    pub fn to_previous_match(&mut self) -> Result<()> {
        match self.selected.checked_sub(1) {
            Some(index) => self.set_selected_index(index),
            None => Err(SequenceError::MatchOutOfRange {
                index: -1,
                len: self.matches.len(),
            }),
        }
    }

    pub fn to_first_match(&mut self) {
        self.selected = 0;
    }

    pub fn assignment(&self) -> Option<Assignment> {
        self.selected_match().map(|m| Assignment {
            target: self.target.to_string(),
            matched: m.sequence.to_string(),
            beat_of_interest: m.beat_of_interest,
        })
    }
}

/// One output line: `<target>:<match>;<beat of interest>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Assignment {
    pub target: String,
    pub matched: String,
    pub beat_of_interest: usize,
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{};{}", self.target, self.matched, self.beat_of_interest)
    }
}

impl FromStr for Assignment {
    type Err = String;

    fn from_str(line: &str) -> std::result::Result<Self, String> {
        let caps = ASSIGNMENT_LINE
            .captures(line)
            .ok_or_else(|| format!("not an assignment line: '{line}'"))?;
        let beat_of_interest = caps[3]
            .parse::<usize>()
            .map_err(|e| format!("bad beat of interest in '{line}': {e}"))?;
        Ok(Assignment {
            target: caps[1].to_string(),
            matched: caps[2].to_string(),
            beat_of_interest,
        })
    }
}

/// Length and selections of a batch, enough to undo a failed addition.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Snapshot {
    len: usize,
    selections: Vec<usize>,
}

/// Ordered targets whose selected matches are pairwise distinct.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssignmentBatch {
    entries: Vec<MatchedTarget>,
}

impl AssignmentBatch {
    pub fn new() -> Self {
        AssignmentBatch::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[MatchedTarget] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&MatchedTarget> {
        self.entries.get(index)
    }

    pub fn assignments(&self) -> Vec<Assignment> {
        self.entries.iter().filter_map(MatchedTarget::assignment).collect()
    }

    pub fn try_add(&mut self, entry: MatchedTarget) -> Result<()> {
        self.try_add_with_budget(entry, &mut SearchBudget::unlimited())
    }

    /// Append `entry` and re-select every entry's match so that all selected
    /// matches differ, preferring the smallest total rank.
    ///
    /// On failure the batch is restored to its state before the call.
    pub fn try_add_with_budget(&mut self, entry: MatchedTarget, budget: &mut SearchBudget) -> Result<()> {
        let snapshot = self.snapshot();
        self.entries.push(entry);

        match self.resolve(budget) {
            Ok(true) => Ok(()),
            Ok(false) => {
                self.restore(snapshot);
                log::debug!("no feasible assignment for {} targets, rolled back", self.len() + 1);
                Err(SequenceError::NoFeasibleAssignment {
                    targets: self.len() + 1,
                })
            }
            Err(e) => {
                self.restore(snapshot);
                Err(e)
            }
        }
    }

    fn resolve(&mut self, budget: &mut SearchBudget) -> Result<bool> {
        let maxima: Vec<usize> = self.entries.iter().map(|e| e.matches.len()).collect();
        for ranks in bounded_odometer_with_budget(&maxima, budget)? {
            budget.spend()?;
            for (entry, rank) in self.entries.iter_mut().zip(&ranks) {
                entry.selected = rank - 1;
            }
            if self.is_conflict_free() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// True when no two entries have selected the same interval sequence.
    pub fn is_conflict_free(&self) -> bool {
        let mut seen = HashSet::new();
        self.entries
            .iter()
            .filter_map(|e| e.selected_match())
            .all(|m| seen.insert(m.sequence.intervals()))
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            len: self.entries.len(),
            selections: self.entries.iter().map(|e| e.selected).collect(),
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.entries.truncate(snapshot.len);
        for (entry, selected) in self.entries.iter_mut().zip(snapshot.selections) {
            entry.selected = selected;
        }
    }
}
