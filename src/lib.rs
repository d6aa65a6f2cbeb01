//! Attribution of texts to known classes (author, native language, ...) by
//! comparing n-gram frequency profiles.
//!
//! A [`SingleClassifier`] truncates every known profile to its most frequent
//! tokens and assigns a query to the class whose members it sits closest to,
//! measured by a radius normalized by each member's own spread inside the
//! class. An [`EnsembleClassifier`] builds one single classifier per profile
//! variant and truncation length and combines them by majority or by summed
//! distances.

pub mod classifier;
pub mod common_types;
pub mod config;
pub mod error;
pub mod preprocessing;
pub mod profile;
pub mod utils;

#[cfg(feature = "python")]
mod python;

pub use classifier::ensemble::{EnsembleClassifier, EnsemblePrediction, VotingMethod};
pub use classifier::SingleClassifier;
pub use common_types::{ClassLabel, DistanceMap, Prediction};
pub use config::EnsembleConfig;
pub use error::{ClassifierError, DegeneratePool, Result};
pub use profile::{Frequency, Profile};
