//! Whole-set analysis: every metric form of a sequence paired with a distinct
//! complex match, plus the helpers the drivers build their runs from.

pub mod model;
pub mod report;

use std::collections::HashSet;
use std::ops::RangeInclusive;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::assignment::{Assignment, AssignmentBatch, MatchedTarget};
use crate::classifier;
use crate::error::{Result, SequenceError};
use crate::matcher::{self, ComplexMatch};
use crate::permutation::{SearchBudget, bounded_odometer};
use crate::sequence::Sequence;
use crate::variant::{self, MAX_ATTEMPTS};
use model::AnalysisConfig;

/// Run the analysis `config` asks for and return one line per matched metric form.
pub fn analyse(sequence: &Sequence, config: &AnalysisConfig) -> Result<Vec<Assignment>> {
    let mut budget = SearchBudget::from_limit(config.budget);
    if config.exhaustive {
        Ok(find_matches(sequence, config, &mut budget)?.assignments())
    } else {
        quick_matches(sequence, config, &mut budget)
    }
}

fn metric_forms(sequence: &Sequence, config: &AnalysisConfig, budget: &mut SearchBudget) -> Result<Vec<Sequence>> {
    let perms = sequence.permutations_with_budget(budget)?;
    let forms = classifier::metric_forms(&perms, &config.metric);
    log::debug!("{sequence}: {} metric forms", forms.len());
    Ok(forms)
}

fn ranked_matches(form: &Sequence, config: &AnalysisConfig, budget: &mut SearchBudget) -> Result<Vec<ComplexMatch>> {
    let candidates = form.permutations_with_budget(budget)?;
    matcher::complex_matches(form, &candidates, &config.matching)
}

/// Add every metric form that has complex matches to one batch, skipping the
/// forms that cannot be given a match distinct from the others.
pub fn find_matches(
    sequence: &Sequence,
    config: &AnalysisConfig,
    budget: &mut SearchBudget,
) -> Result<AssignmentBatch> {
    let mut batch = AssignmentBatch::new();
    for form in metric_forms(sequence, config, budget)? {
        let matches = ranked_matches(&form, config, budget)?;
        if matches.is_empty() {
            log::debug!("{form}: no complex matches");
            continue;
        }
        let name = form.to_string();
        match batch.try_add_with_budget(MatchedTarget::with_matches(form, matches), budget) {
            Ok(()) => {}
            Err(SequenceError::NoFeasibleAssignment { .. }) => {
                log::debug!("{name}: no distinct match left, skipped");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(batch)
}

/// Greedy pass: each metric form takes its best match not taken by an earlier form.
pub fn quick_matches(
    sequence: &Sequence,
    config: &AnalysisConfig,
    budget: &mut SearchBudget,
) -> Result<Vec<Assignment>> {
    let mut taken: HashSet<Sequence> = HashSet::new();
    let mut lines = Vec::new();
    for form in metric_forms(sequence, config, budget)? {
        let matches = ranked_matches(&form, config, budget)?;
        let Some(pick) = matches.into_iter().find(|m| !taken.contains(&m.sequence)) else {
            log::debug!("{form}: none found");
            continue;
        };
        lines.push(Assignment {
            target: form.to_string(),
            matched: pick.sequence.to_string(),
            beat_of_interest: pick.beat_of_interest,
        });
        taken.insert(pick.sequence);
    }
    Ok(lines)
}

/// Sorted interval multisets of each length in `lengths`, values in
/// `1..=max_interval`, summing to `total`; in order of first discovery.
pub fn interval_sets(lengths: RangeInclusive<usize>, max_interval: usize, total: u32) -> Vec<Vec<u32>> {
    let mut sets: Vec<Vec<u32>> = Vec::new();
    for length in lengths {
        for digits in bounded_odometer(&vec![max_interval; length]) {
            let mut set: Vec<u32> = digits.iter().map(|&d| d as u32).collect();
            if set.iter().sum::<u32>() != total {
                continue;
            }
            set.sort_unstable();
            if !sets.contains(&set) {
                sets.push(set);
            }
        }
    }
    sets
}

/// One wrong version per input, each different from every one collected before.
pub fn distinct_variants<R: Rng + ?Sized>(sequences: &[Sequence], rng: &mut R) -> Result<Vec<Sequence>> {
    let mut variants: Vec<Sequence> = Vec::with_capacity(sequences.len());
    for sequence in sequences {
        let mut fresh = None;
        for _ in 0..MAX_ATTEMPTS {
            let candidate = variant::perturb(sequence, rng)?;
            if !variants.contains(&candidate) {
                fresh = Some(candidate);
                break;
            }
        }
        let Some(fresh) = fresh else {
            return Err(SequenceError::ExhaustedAttempts(MAX_ATTEMPTS));
        };
        log::debug!("wrong version {} of {sequence}: {fresh}", variants.len() + 1);
        variants.push(fresh);
    }
    Ok(variants)
}

/// Wrong versions of the metric and the complex group of a summary, drawn from
/// one generator seeded with `config.seed`.
pub fn wrong_versions(
    metric: &[Sequence],
    complex: &[Sequence],
    config: &AnalysisConfig,
) -> Result<(Vec<Sequence>, Vec<Sequence>)> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let metric_variants = distinct_variants(metric, &mut rng)?;
    let complex_variants = distinct_variants(complex, &mut rng)?;
    Ok((metric_variants, complex_variants))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(assignments: &[Assignment]) -> Vec<String> {
        assignments.iter().map(|a| a.to_string()).collect()
    }

    #[test]
    fn test_find_matches_211314() {
        let s: Sequence = "211314".parse().unwrap();
        let mut budget = SearchBudget::unlimited();
        let batch = find_matches(&s, &AnalysisConfig::default(), &mut budget).unwrap();
        assert!(batch.is_conflict_free());
        assert_eq!(
            lines(&batch.assignments()),
            vec![
                "211314:214131;9",
                "211431:211341;5",
                "112314:124131;9",
                "112431:112341;5",
                "312114:123114;9",
                "311124:113124;9",
                "421131:241131;9",
                "411231:141231;9",
                "431211:341211;9",
                "431112:432111;5",
            ]
        );
    }

    #[test]
    fn test_quick_matches_211314() {
        let s: Sequence = "211314".parse().unwrap();
        let mut budget = SearchBudget::unlimited();
        let found = quick_matches(&s, &AnalysisConfig::default(), &mut budget).unwrap();
        assert_eq!(
            lines(&found),
            vec![
                "211314:214131;9",
                "211431:211341;5",
                "112314:112341;5",
                "312114:241131;9",
                "311124:141231;9",
                "421131:421311;5",
                "411231:113124;9",
                "431211:432111;5",
                "431112:341112;9",
            ]
        );
    }

    #[test]
    fn test_analyse_respects_budget() {
        let s: Sequence = "211314".parse().unwrap();
        let config = AnalysisConfig {
            budget: Some(100),
            ..AnalysisConfig::default()
        };
        assert_eq!(analyse(&s, &config), Err(SequenceError::BudgetExhausted(100)));

        let config = AnalysisConfig {
            exhaustive: false,
            ..AnalysisConfig::default()
        };
        assert_eq!(analyse(&s, &config).unwrap().len(), 9);
    }

    #[test]
    fn test_interval_sets() {
        let sets = interval_sets(5..=9, 4, 12);
        assert_eq!(sets.len(), 25);
        assert_eq!(
            &sets[..5],
            &[
                vec![1, 1, 2, 4, 4],
                vec![1, 1, 3, 3, 4],
                vec![1, 2, 2, 3, 4],
                vec![1, 2, 3, 3, 3],
                vec![2, 2, 2, 2, 4],
            ]
        );
        for set in &sets {
            assert_eq!(set.iter().sum::<u32>(), 12);
            assert!(set.windows(2).all(|w| w[0] <= w[1]));
        }
    }

    #[test]
    fn test_distinct_variants() {
        let sources: Vec<Sequence> = ["211314", "211314", "312114"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        let mut rng = StdRng::seed_from_u64(42);
        let variants = distinct_variants(&sources, &mut rng).unwrap();
        assert_eq!(variants.len(), 3);
        assert_ne!(variants[0], variants[1]);
        assert_ne!(variants[1], variants[2]);
        assert_ne!(variants[0], variants[2]);
        for v in &variants {
            assert_eq!(v.beatscore(), Some(1.0));
        }
    }

    #[test]
    fn test_wrong_versions_follow_config_seed() {
        let metric: Vec<Sequence> = ["211314", "312114"].iter().map(|s| s.parse().unwrap()).collect();
        let complex: Vec<Sequence> = ["241131"].iter().map(|s| s.parse().unwrap()).collect();
        let config = AnalysisConfig {
            seed: 9,
            ..AnalysisConfig::default()
        };

        let (m, c) = wrong_versions(&metric, &complex, &config).unwrap();
        assert_eq!((m.len(), c.len()), (2, 1));
        assert!(m.iter().all(|v| v.beatscore() == Some(1.0)));
        assert!(c[0].beatscore().unwrap() <= 0.8);

        let mut rng = StdRng::seed_from_u64(9);
        assert_eq!(m, distinct_variants(&metric, &mut rng).unwrap());
        assert_eq!(c, distinct_variants(&complex, &mut rng).unwrap());
        assert_eq!(wrong_versions(&metric, &complex, &config).unwrap(), (m, c));
    }
}
