//! Permutation engine: distinct orderings of a multiset and the bounded
//! odometer used to rank candidate index vectors by total cost.

use std::collections::HashSet;
use std::hash::Hash;

use crate::error::{Result, SequenceError};

/// Step limit for the combinatorial searches.
///
/// Permutation generation grows factorially and the assignment search grows
/// with the product of candidate counts, so callers analysing larger inputs
/// hand one of these to the budgeted entry points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchBudget {
    limit: Option<u64>,
    spent: u64,
}

impl SearchBudget {
    pub fn unlimited() -> Self {
        SearchBudget::default()
    }

    pub fn limited(steps: u64) -> Self {
        SearchBudget {
            limit: Some(steps),
            spent: 0,
        }
    }

    pub fn from_limit(limit: Option<u64>) -> Self {
        SearchBudget { limit, spent: 0 }
    }

    /// Consume one step, failing once the limit has been used up.
    pub fn spend(&mut self) -> Result<()> {
        if let Some(limit) = self.limit {
            if self.spent >= limit {
                return Err(SequenceError::BudgetExhausted(limit));
            }
        }
        self.spent += 1;
        Ok(())
    }

    pub fn spent(&self) -> u64 {
        self.spent
    }

    pub fn remaining(&self) -> Option<u64> {
        self.limit.map(|limit| limit.saturating_sub(self.spent))
    }
}

/// Every ordering of `items`, duplicates included, in lexicographic order of
/// the positions taken from the input.
#[derive(Debug, Clone)]
pub struct Permutations<'a, T> {
    items: &'a [T],
    indices: Vec<usize>,
    done: bool,
}

impl<'a, T: Clone> Permutations<'a, T> {
    pub fn new(items: &'a [T]) -> Self {
        Permutations {
            items,
            indices: (0..items.len()).collect(),
            done: false,
        }
    }

    fn advance(&mut self) {
        let idx = &mut self.indices;
        let Some(pivot) = (1..idx.len()).rev().find(|&i| idx[i - 1] < idx[i]).map(|i| i - 1) else {
            self.done = true;
            return;
        };
        let Some(successor) = (pivot + 1..idx.len()).rev().find(|&j| idx[j] > idx[pivot]) else {
            self.done = true;
            return;
        };
        idx.swap(pivot, successor);
        idx[pivot + 1..].reverse();
    }
}

impl<T: Clone> Iterator for Permutations<'_, T> {
    type Item = Vec<T>;

    fn next(&mut self) -> Option<Vec<T>> {
        if self.done {
            return None;
        }
        let current = self.indices.iter().map(|&i| self.items[i].clone()).collect();
        self.advance();
        Some(current)
    }
}

/// Orderings of a multiset, each distinct value arrangement yielded once at
/// its first occurrence in [`Permutations`] order.
#[derive(Debug, Clone)]
pub struct DistinctPermutations<'a, T> {
    inner: Permutations<'a, T>,
    seen: HashSet<Vec<T>>,
}

impl<T: Clone + Eq + Hash> Iterator for DistinctPermutations<'_, T> {
    type Item = Vec<T>;

    fn next(&mut self) -> Option<Vec<T>> {
        self.inner.by_ref().find(|p| self.seen.insert(p.clone()))
    }
}

pub fn distinct_permutations<T: Clone + Eq + Hash>(items: &[T]) -> DistinctPermutations<'_, T> {
    DistinctPermutations {
        inner: Permutations::new(items),
        seen: HashSet::new(),
    }
}

/// Budgeted variant of [`distinct_permutations`]; every raw ordering visited
/// costs one step, duplicates included.
pub fn distinct_permutations_with_budget<T: Clone + Eq + Hash>(
    items: &[T],
    budget: &mut SearchBudget,
) -> Result<Vec<Vec<T>>> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for p in Permutations::new(items) {
        budget.spend()?;
        if seen.insert(p.clone()) {
            out.push(p);
        }
    }
    Ok(out)
}

/// Mixed-radix counter over `1..=maxima[i]` per position, lowest position
/// turning fastest.
#[derive(Debug, Clone)]
pub struct Odometer {
    maxima: Vec<usize>,
    current: Option<Vec<usize>>,
}

impl Odometer {
    pub fn new(maxima: &[usize]) -> Self {
        let current = if maxima.contains(&0) {
            None
        } else {
            Some(vec![1; maxima.len()])
        };
        Odometer {
            maxima: maxima.to_vec(),
            current,
        }
    }
}

impl Iterator for Odometer {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        let current = self.current.take()?;
        let turning = (0..current.len()).find(|&i| current[i] < self.maxima[i]);
        if let Some(i) = turning {
            let mut following = current.clone();
            following[i] += 1;
            following[..i].fill(1);
            self.current = Some(following);
        }
        Some(current)
    }
}

/// All vectors `v` with `1 <= v[i] <= maxima[i]`, stably sorted by their sum.
pub fn bounded_odometer(maxima: &[usize]) -> Vec<Vec<usize>> {
    let mut all: Vec<Vec<usize>> = Odometer::new(maxima).collect();
    all.sort_by_key(|v| v.iter().sum::<usize>());
    all
}

pub fn bounded_odometer_with_budget(maxima: &[usize], budget: &mut SearchBudget) -> Result<Vec<Vec<usize>>> {
    let mut all = Vec::new();
    for v in Odometer::new(maxima) {
        budget.spend()?;
        all.push(v);
    }
    all.sort_by_key(|v| v.iter().sum::<usize>());
    Ok(all)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distinct_permutations_dedup() {
        let perms: Vec<Vec<u32>> = distinct_permutations(&[1, 1, 2]).collect();
        assert_eq!(perms, vec![vec![1, 1, 2], vec![1, 2, 1], vec![2, 1, 1]]);
    }

    #[test]
    fn test_permutations_order_follows_positions() {
        let perms: Vec<Vec<char>> = Permutations::new(&['a', 'b', 'c']).collect();
        let joined: Vec<String> = perms.iter().map(|p| p.iter().collect()).collect();
        assert_eq!(joined, vec!["abc", "acb", "bac", "bca", "cab", "cba"]);
    }

    #[test]
    fn test_permutations_are_restartable() {
        let items = [3, 1, 2];
        let first: Vec<_> = distinct_permutations(&items).collect();
        let second: Vec<_> = distinct_permutations(&items).collect();
        assert_eq!(first.len(), 6);
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_multiset_has_one_ordering() {
        let perms: Vec<Vec<u32>> = distinct_permutations(&[]).collect();
        assert_eq!(perms, vec![Vec::<u32>::new()]);
    }

    #[test]
    fn test_odometer_lowest_position_turns_fastest() {
        let all: Vec<_> = Odometer::new(&[2, 3]).collect();
        assert_eq!(
            all,
            vec![vec![1, 1], vec![2, 1], vec![1, 2], vec![2, 2], vec![1, 3], vec![2, 3]]
        );
    }

    #[test]
    fn test_bounded_odometer_sorted_by_sum() {
        let all = bounded_odometer(&[2, 3]);
        assert_eq!(
            all,
            vec![vec![1, 1], vec![2, 1], vec![1, 2], vec![2, 2], vec![1, 3], vec![2, 3]]
        );

        let all = bounded_odometer(&[3, 2]);
        assert_eq!(
            all,
            vec![vec![1, 1], vec![2, 1], vec![1, 2], vec![3, 1], vec![2, 2], vec![3, 2]]
        );
    }

    #[test]
    fn test_bounded_odometer_edges() {
        assert_eq!(bounded_odometer(&[]), vec![Vec::<usize>::new()]);
        assert!(bounded_odometer(&[2, 0, 3]).is_empty());
        assert_eq!(bounded_odometer(&[1, 1]), vec![vec![1, 1]]);
    }

    #[test]
    fn test_budget_stops_permutations() {
        let mut budget = SearchBudget::limited(5);
        let err = distinct_permutations_with_budget(&[1, 2, 3], &mut budget).unwrap_err();
        assert_eq!(err, SequenceError::BudgetExhausted(5));

        let mut budget = SearchBudget::limited(6);
        let perms = distinct_permutations_with_budget(&[1, 2, 3], &mut budget).unwrap();
        assert_eq!(perms.len(), 6);
        assert_eq!(budget.remaining(), Some(0));
    }

    #[test]
    fn test_budget_stops_odometer() {
        let mut budget = SearchBudget::limited(3);
        assert!(bounded_odometer_with_budget(&[2, 2], &mut budget).is_err());

        let mut budget = SearchBudget::unlimited();
        let all = bounded_odometer_with_budget(&[2, 2], &mut budget).unwrap();
        assert_eq!(all, bounded_odometer(&[2, 2]));
        assert_eq!(budget.spent(), 4);
    }
}
