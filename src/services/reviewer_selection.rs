//! Reviewer selection policy.
//!
//! Pure functions over a candidate pool: no database access. Randomness comes
//! from an injectable [`RandomSource`] so production uses the OS generator
//! while tests can plug in a seeded one.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use rand::rngs::{OsRng, StdRng};
use rand::{Rng, SeedableRng};

use crate::error::AppError;
use crate::models::User;

/// Target number of reviewers on an open pull request.
pub const MAX_REVIEWERS: usize = 2;

/// Source of uniformly distributed indices.
pub trait RandomSource: Send + Sync {
    /// Return an index in `0..upper`. Callers never pass `upper == 0`.
    fn index_below(&self, upper: usize) -> usize;
}

/// Operating-system CSPRNG. Used in production.
#[derive(Debug, Default, Clone, Copy)]
pub struct SecureRandom;

impl RandomSource for SecureRandom {
    fn index_below(&self, upper: usize) -> usize {
        OsRng.gen_range(0..upper)
    }
}

/// Deterministic generator for reproducible selections.
#[derive(Debug)]
pub struct SeededRandom(Mutex<StdRng>);

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self(Mutex::new(StdRng::seed_from_u64(seed)))
    }
}

impl RandomSource for SeededRandom {
    fn index_below(&self, upper: usize) -> usize {
        let mut rng = self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.gen_range(0..upper)
    }
}

/// Chooses reviewers from a pool of eligible users.
#[derive(Clone)]
pub struct ReviewerSelector {
    rng: Arc<dyn RandomSource>,
}

impl Default for ReviewerSelector {
    fn default() -> Self {
        Self::new(Arc::new(SecureRandom))
    }
}

impl std::fmt::Debug for ReviewerSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReviewerSelector").finish_non_exhaustive()
    }
}

impl ReviewerSelector {
    pub fn new(rng: Arc<dyn RandomSource>) -> Self {
        Self { rng }
    }

    /// Pick initial reviewers from `pool`.
    ///
    /// `pool` is expected to already exclude the author and inactive users.
    /// Returns every member when there are at most [`MAX_REVIEWERS`] of them,
    /// otherwise [`MAX_REVIEWERS`] distinct members drawn uniformly without
    /// replacement. An empty pool yields an empty list.
    pub fn select_initial(&self, pool: &[User]) -> Vec<String> {
        self.pick(distinct_ids(pool.iter().map(|u| u.user_id.as_str())))
    }

    /// Pick up to [`MAX_REVIEWERS`] replacement candidates from `pool`,
    /// skipping the author and anyone already assigned.
    ///
    /// # Errors
    /// `AppError::NoCandidate` when nobody remains after filtering.
    pub fn select_replacements(
        &self,
        pool: &[User],
        exclude_author: &str,
        exclude_assigned: &[String],
    ) -> Result<Vec<String>, AppError> {
        let eligible = distinct_ids(
            pool.iter()
                .map(|u| u.user_id.as_str())
                .filter(|id| *id != exclude_author && !exclude_assigned.iter().any(|a| a == id)),
        );

        if eligible.is_empty() {
            return Err(AppError::no_candidate());
        }

        Ok(self.pick(eligible))
    }

    /// Draw up to [`MAX_REVIEWERS`] distinct entries from deduplicated `candidates`.
    fn pick(&self, candidates: Vec<String>) -> Vec<String> {
        if candidates.len() <= MAX_REVIEWERS {
            return candidates;
        }

        // Rejection sampling: redraw until the index is new.
        let mut picked: Vec<usize> = Vec::with_capacity(MAX_REVIEWERS);
        while picked.len() < MAX_REVIEWERS {
            let idx = self.rng.index_below(candidates.len());
            if !picked.contains(&idx) {
                picked.push(idx);
            }
        }

        picked.into_iter().map(|idx| candidates[idx].clone()).collect()
    }
}

/// Deduplicate IDs, keeping first-seen order.
fn distinct_ids<'a>(ids: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.filter(|id| seen.insert(*id))
        .map(str::to_string)
        .collect()
}
