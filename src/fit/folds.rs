//! Seeded k-fold partitioning.
//!
//! Indices `0..n` are shuffled with a seeded `StdRng` and dealt round-robin
//! into labels `1..=k`, so fold sizes differ by at most one and the same
//! `(n, k, seed)` always yields the same assignment.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::error::ModelError;

/// Fold label per observation index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldAssignment {
    k: usize,
    labels: Vec<usize>,
}

impl FoldAssignment {
    pub fn k(&self) -> usize {
        self.k
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Fold label (`1..=k`) of observation `idx`.
    pub fn label(&self, idx: usize) -> usize {
        self.labels[idx]
    }

    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Indices held out when `label` is the test fold.
    pub fn test_indices(&self, label: usize) -> Vec<usize> {
        (0..self.labels.len()).filter(|&i| self.labels[i] == label).collect()
    }

    /// Observation count per fold, indexed by `label - 1`.
    pub fn fold_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.k];
        for &l in &self.labels {
            sizes[l - 1] += 1;
        }
        sizes
    }
}

/// Partition `0..n` into `k` labelled folds, reproducibly for `seed`.
pub fn assign_folds(n: usize, k: usize, seed: u64) -> Result<FoldAssignment, ModelError> {
    if k < 2 {
        return Err(ModelError::invalid(format!("fold count must be >= 2 (got {k})")));
    }
    if n < k {
        return Err(ModelError::invalid(format!(
            "need at least as many observations as folds (n={n}, k={k})"
        )));
    }

    let mut order: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    order.shuffle(&mut rng);

    let mut labels = vec![0; n];
    for (pos, &idx) in order.iter().enumerate() {
        labels[idx] = pos % k + 1;
    }

    Ok(FoldAssignment { k, labels })
}
