//! Token frequency profiles and their truncation.

pub mod distance;
pub mod top_k;

use std::collections::BTreeMap;
use std::fmt::Debug;

use num_traits::{AsPrimitive, One, Zero};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use top_k::TopTokens;

pub use distance::{distance, radius, radius_distance};

/// Numeric type usable as a token frequency (`u32`, `u64`, `usize`, `f64`, ...).
pub trait Frequency: Copy + PartialOrd + Zero + AsPrimitive<f64> + Debug {}

impl<T> Frequency for T where T: Copy + PartialOrd + Zero + AsPrimitive<f64> + Debug {}

/// Mapping from token to frequency. Tokens not present have frequency zero.
///
/// Backed by a `BTreeMap`, so every walk over the tokens is in ascending token
/// order and floating point sums over a profile are reproducible.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Profile<F = u64> {
    counts: BTreeMap<String, F>,
}

impl<F: Frequency> Profile<F> {
    pub fn new() -> Self {
        Profile { counts: BTreeMap::new() }
    }

    /// Frequency of `token`, or zero if the token is absent.
    pub fn get(&self, token: &str) -> F {
        self.counts.get(token).copied().unwrap_or_else(F::zero)
    }

    pub fn contains(&self, token: &str) -> bool {
        self.counts.contains_key(token)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Tokens in ascending order.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.counts.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, F)> {
        self.counts.iter().map(|(token, &freq)| (token.as_str(), freq))
    }

    /// Keeps only the `p_length` most frequent tokens.
    ///
    /// Equal frequencies are ranked by ascending token. When `p_length` is at
    /// least the profile size the profile is returned unchanged.
    pub fn truncate(&self, p_length: usize) -> Profile<F> {
        if p_length >= self.counts.len() {
            return self.clone();
        }
        self.most_common(p_length)
            .into_iter()
            .map(|(token, freq)| (token.to_string(), freq))
            .collect()
    }

    /// The `n` most frequent `(token, frequency)` pairs, most frequent first.
    ///
    /// Frequencies are ranked in `F` itself, never through `f64`.
    pub fn most_common(&self, n: usize) -> Vec<(&str, F)> {
        let mut top = TopTokens::new(n.min(self.counts.len()));
        for (token, &freq) in &self.counts {
            top.add(freq, token.as_str());
        }
        top.into_sorted()
    }
}

impl<F> Profile<F>
where
    F: Frequency + One + std::ops::AddAssign,
{
    /// Counts every occurrence of every token.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut counts = BTreeMap::new();
        for token in tokens {
            *counts.entry(token.into()).or_insert_with(F::zero) += F::one();
        }
        Profile { counts }
    }
}

impl<F: Frequency, S: Into<String>> FromIterator<(S, F)> for Profile<F> {
    /// Builds a profile from `(token, frequency)` pairs; a repeated token keeps its last frequency.
    fn from_iter<I: IntoIterator<Item = (S, F)>>(iter: I) -> Self {
        Profile {
            counts: iter.into_iter().map(|(token, freq)| (token.into(), freq)).collect(),
        }
    }
}

impl<F: Frequency> From<BTreeMap<String, F>> for Profile<F> {
    fn from(counts: BTreeMap<String, F>) -> Self {
        Profile { counts }
    }
}
