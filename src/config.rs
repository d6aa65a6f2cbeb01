//! Ensemble configuration.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::classifier::ensemble::VotingMethod;

/// Settings for building and running an [`EnsembleClassifier`](crate::EnsembleClassifier).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct EnsembleConfig {
    /// Candidate truncation lengths; one member classifier per length and profile variant.
    pub p_lengths: Vec<usize>,
    /// Voting method of `vote_all` / `vote_many` on the built ensemble.
    pub method: VotingMethod,
    pub show_progress: bool,
}

impl EnsembleConfig {
    pub const DEFAULT_P_LENGTHS: [usize; 6] = [500, 1000, 1500, 2000, 2500, 3000];

    pub fn new(p_lengths: Vec<usize>) -> Self {
        Self { p_lengths, ..Self::default() }
    }

    pub fn with_method(mut self, method: VotingMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self {
            p_lengths: Self::DEFAULT_P_LENGTHS.to_vec(),
            method: VotingMethod::Majority,
            show_progress: false,
        }
    }
}
