//! Ensembles of single classifiers combined by majority or summed-distance voting.

use std::collections::BTreeMap;
use std::fmt::{self, Debug};
use std::str::FromStr;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{SingleClassifier, closest_class};
use crate::common_types::{DistanceMap, Prediction};
use crate::config::EnsembleConfig;
use crate::error::{ClassifierError, Result};
use crate::profile::{Frequency, Profile};

/// How member predictions are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(rename_all = "lowercase"))]
pub enum VotingMethod {
    /// Each member votes for its predicted label; most votes wins.
    #[default]
    Majority,
    /// Member distance maps are summed per class; smallest total wins.
    Weight,
}

impl FromStr for VotingMethod {
    type Err = ClassifierError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "majority" => Ok(VotingMethod::Majority),
            "weight" => Ok(VotingMethod::Weight),
            other => Err(ClassifierError::InvalidMethod(other.to_string())),
        }
    }
}

impl fmt::Display for VotingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VotingMethod::Majority => f.write_str("majority"),
            VotingMethod::Weight => f.write_str("weight"),
        }
    }
}

/// Final ensemble decision for one document.
///
/// `confidence` holds the summed member distance maps when requested, whatever
/// the voting method.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EnsemblePrediction<L: Ord> {
    pub label: L,
    pub confidence: Option<DistanceMap<L>>,
}

/// One [`SingleClassifier`] per (profile variant, truncation length) pair.
#[derive(Debug, Clone)]
pub struct EnsembleClassifier<L, F = u64> {
    classifiers: Vec<SingleClassifier<L, F>>,
    method: VotingMethod,
    show_progress: bool,
}

impl<L, F> EnsembleClassifier<L, F>
where
    L: Ord + Clone + Debug,
    F: Frequency,
{
    /// Builds the Cartesian product of `variants` and `p_lengths`, variant-major.
    ///
    /// Every variant holds one profile per document, parallel to `y_true`.
    pub fn new(
        variants: &[Vec<Profile<F>>],
        y_true: &[L],
        p_lengths: &[usize],
        classes: &[L],
    ) -> Result<Self> {
        if variants.is_empty() || p_lengths.is_empty() {
            return Err(ClassifierError::EmptyEnsemble);
        }
        let mut classifiers = Vec::with_capacity(variants.len() * p_lengths.len());
        for profiles in variants {
            for &p_length in p_lengths {
                classifiers.push(SingleClassifier::new(profiles, y_true, p_length, classes)?);
            }
        }
        debug!(
            n_variants = variants.len(),
            n_lengths = p_lengths.len(),
            n_classifiers = classifiers.len(),
            "built ensemble"
        );
        Ok(Self { classifiers, method: VotingMethod::default(), show_progress: false })
    }

    /// Like [`new`](Self::new), with lengths, voting method and progress taken from `config`.
    pub fn from_config(
        variants: &[Vec<Profile<F>>],
        y_true: &[L],
        classes: &[L],
        config: &EnsembleConfig,
    ) -> Result<Self> {
        let ensemble = Self::new(variants, y_true, &config.p_lengths, classes)?;
        Ok(ensemble.with_method(config.method).with_progress(config.show_progress))
    }

    /// Voting method used by [`vote_all`](Self::vote_all) and [`vote_many`](Self::vote_many).
    pub fn with_method(mut self, method: VotingMethod) -> Self {
        self.method = method;
        self
    }

    /// Shows a progress bar over member classifiers while predicting.
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn classifiers(&self) -> &[SingleClassifier<L, F>] {
        &self.classifiers
    }

    pub fn method(&self) -> VotingMethod {
        self.method
    }

    /// In-sample leave-one-out predictions of every member, combined by `method`.
    pub fn run_all(&self, method: VotingMethod, want_confidence: bool) -> Result<Vec<EnsemblePrediction<L>>> {
        let responses = self.collect_responses(|classifier| classifier.predict_all())?;
        combine(&responses, method, want_confidence)
    }

    /// Predictions for external profiles `xs`, combined by `method`.
    pub fn run_many(
        &self,
        xs: &[Profile<F>],
        truncate: bool,
        method: VotingMethod,
        want_confidence: bool,
    ) -> Result<Vec<EnsemblePrediction<L>>> {
        let responses = self.collect_responses(|classifier| classifier.predict_many(xs, truncate))?;
        combine(&responses, method, want_confidence)
    }

    /// [`run_all`](Self::run_all) with the ensemble's own voting method.
    pub fn vote_all(&self, want_confidence: bool) -> Result<Vec<EnsemblePrediction<L>>> {
        self.run_all(self.method, want_confidence)
    }

    /// [`run_many`](Self::run_many) with the ensemble's own voting method.
    pub fn vote_many(&self, xs: &[Profile<F>], truncate: bool, want_confidence: bool) -> Result<Vec<EnsemblePrediction<L>>> {
        self.run_many(xs, truncate, self.method, want_confidence)
    }

    fn collect_responses<P>(&self, mut predict: P) -> Result<Vec<Vec<Prediction<L>>>>
    where
        P: FnMut(&SingleClassifier<L, F>) -> Result<Vec<Prediction<L>>>,
    {
        let progress = if self.show_progress {
            let bar = ProgressBar::new(self.classifiers.len() as u64);
            if let Ok(style) = ProgressStyle::with_template("{bar:40} {pos}/{len} classifiers [{elapsed}]") {
                bar.set_style(style);
            }
            bar
        } else {
            ProgressBar::hidden()
        };

        let mut responses = Vec::with_capacity(self.classifiers.len());
        for classifier in &self.classifiers {
            responses.push(predict(classifier)?);
            progress.inc(1);
        }
        progress.finish_and_clear();
        Ok(responses)
    }
}

/// Combines per-classifier responses (outer: classifier, inner: document) into one decision per document.
pub fn combine<L: Ord + Clone + Debug>(
    responses: &[Vec<Prediction<L>>],
    method: VotingMethod,
    want_confidence: bool,
) -> Result<Vec<EnsemblePrediction<L>>> {
    let n_docs = responses.first().map_or(0, Vec::len);
    let mut combined = Vec::with_capacity(n_docs);
    for doc in 0..n_docs {
        let member_predictions: Vec<&Prediction<L>> = responses.iter().filter_map(|r| r.get(doc)).collect();

        let summed = match (method, want_confidence) {
            (VotingMethod::Majority, false) => None,
            _ => {
                let maps: Vec<&DistanceMap<L>> = member_predictions.iter().map(|p| &p.distances).collect();
                Some(sum_distance_maps(&maps)?)
            }
        };

        let label = match method {
            VotingMethod::Majority => {
                let votes: Vec<L> = member_predictions.iter().map(|p| p.label.clone()).collect();
                majority_vote(&votes)
            }
            VotingMethod::Weight => summed.as_ref().and_then(closest_class),
        }
        .ok_or(ClassifierError::EmptyEnsemble)?;

        combined.push(EnsemblePrediction {
            label,
            confidence: if want_confidence { summed } else { None },
        });
    }
    Ok(combined)
}

/// Most frequent label; a tie goes to the smallest label.
pub fn majority_vote<L: Ord + Clone>(votes: &[L]) -> Option<L> {
    let mut tally: BTreeMap<&L, usize> = BTreeMap::new();
    for vote in votes {
        *tally.entry(vote).or_insert(0) += 1;
    }
    let mut best: Option<(&L, usize)> = None;
    for (label, count) in tally {
        // Ascending label order, so only a strictly larger count replaces the leader.
        if best.is_none_or(|(_, best_count)| count > best_count) {
            best = Some((label, count));
        }
    }
    best.map(|(label, _)| label.clone())
}

/// Element-wise sum of distance maps that all cover the same classes.
///
/// Each class total is accumulated in ascending value order, so the result
/// does not depend on the order of `maps`.
pub fn sum_distance_maps<L: Ord + Clone + Debug>(maps: &[&DistanceMap<L>]) -> Result<DistanceMap<L>> {
    let Some(first) = maps.first() else {
        return Ok(DistanceMap::new());
    };
    for map in &maps[1..] {
        if !map.keys().eq(first.keys()) {
            return Err(ClassifierError::ClassSetMismatch {
                expected: first.keys().map(|c| format!("{c:?}")).collect(),
                found: map.keys().map(|c| format!("{c:?}")).collect(),
            });
        }
    }

    let mut summed = DistanceMap::new();
    for class in first.keys() {
        let mut values: Vec<f64> = maps.iter().filter_map(|m| m.get(class).copied()).collect();
        values.sort_by(f64::total_cmp);
        summed.insert(class.clone(), values.into_iter().sum());
    }
    Ok(summed)
}
