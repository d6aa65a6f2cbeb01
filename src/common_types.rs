//! This module contains common data structures shared by the single and ensemble classifiers.

use std::collections::BTreeMap;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Distance from one profile to every declared class. Lower means more similar.
///
/// Ordered by label so that iteration (and therefore tie-breaking) never depends on hashing.
pub type DistanceMap<L> = BTreeMap<L, f64>;

/// A class label that may be either an integer or a string.
///
/// The derived order puts every `Int` before every `Text`; within a variant the
/// natural order of the payload applies.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(untagged))]
pub enum ClassLabel {
    Int(i64),
    Text(String),
}

impl fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassLabel::Int(i) => write!(f, "{i}"),
            ClassLabel::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ClassLabel {
    fn from(value: i64) -> Self {
        ClassLabel::Int(value)
    }
}

impl From<&str> for ClassLabel {
    fn from(value: &str) -> Self {
        ClassLabel::Text(value.to_string())
    }
}

impl From<String> for ClassLabel {
    fn from(value: String) -> Self {
        ClassLabel::Text(value)
    }
}

/// Output of a classifier for one profile: the winning label plus the
/// distance to every class it was scored against.
///
/// - `L`: The type of the label (e.g., `&str`, `i32`, [`ClassLabel`]).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Prediction<L: Ord> {
    pub label: L,
    pub distances: DistanceMap<L>,
}

impl<L: Ord> Prediction<L> {
    pub fn new(label: L, distances: DistanceMap<L>) -> Self {
        Prediction { label, distances }
    }
}
