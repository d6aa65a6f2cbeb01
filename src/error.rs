//! Error types for profile attribution.
//!
//! Every failure is detected eagerly: label and class-set problems at
//! construction time, degenerate class pools while scoring. Nothing here is
//! transient, so callers should fix their inputs rather than retry.

use thiserror::Error;

/// A class pool whose internal spread is zero, so radii cannot be normalized.
///
/// Happens when the pool is empty, holds a single profile, or every member is
/// identical to the profile being used as the radius center.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("class pool of {pool_size} profile(s) has no internal spread")]
pub struct DegeneratePool {
    pub pool_size: usize,
}

/// The main error type for classifier construction and prediction.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClassifierError {
    /// A training label that is not one of the declared classes.
    #[error("label {label} is not one of the declared classes")]
    InvalidLabel { label: String },

    /// Unrecognized voting method name.
    #[error("expected method \"majority\" or \"weight\", got \"{0}\"")]
    InvalidMethod(String),

    /// A class pool became degenerate (usually after leave-one-out removal).
    #[error("class {class} cannot be scored")]
    DegenerateClass {
        class: String,
        #[source]
        source: DegeneratePool,
    },

    /// Distance maps being combined do not cover the same classes.
    #[error("distance maps disagree on classes: expected {expected:?}, found {found:?}")]
    ClassSetMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("at least one class must be declared")]
    EmptyClassSet,

    #[error("ensemble needs at least one profile variant and one truncation length")]
    EmptyEnsemble,

    #[error("got {profiles} profiles but {labels} labels")]
    LengthMismatch { profiles: usize, labels: usize },

    /// Scores cannot be normalized because they sum to zero.
    #[error("scores sum to zero and cannot be normalized")]
    ZeroScoreSum,
}

pub type Result<T> = std::result::Result<T, ClassifierError>;
