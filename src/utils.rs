//! Post-hoc score helpers.

use crate::error::{ClassifierError, Result};

/// Rescales scores so they sum to 1.
///
/// With `inverse` set the scores are negated first, which suits distances
/// where lower means more likely. Not a true softmax: no exponentiation.
pub fn normalize_scores(scores: &[f64], inverse: bool) -> Result<Vec<f64>> {
    if scores.is_empty() {
        return Ok(Vec::new());
    }
    let signed: Vec<f64> = scores.iter().map(|&s| if inverse { -s } else { s }).collect();
    let total: f64 = signed.iter().sum();
    if total == 0.0 {
        return Err(ClassifierError::ZeroScoreSum);
    }
    Ok(signed.into_iter().map(|s| s / total).collect())
}
