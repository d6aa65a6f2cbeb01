//! Relative-difference distance between profiles and the radius scores built on it.

use std::collections::BTreeSet;

use ordered_float::OrderedFloat;

use super::{Frequency, Profile};
use crate::error::DegeneratePool;

/// Sum over the joint vocabulary of `((f1 - f2) / ((f1 + f2) / 2))^2`.
///
/// Symmetric and zero for identical profiles, but not a metric: there is no
/// triangle inequality. Tokens are visited in ascending order so the result is
/// bit-identical whichever argument comes first.
pub fn distance<F: Frequency>(p1: &Profile<F>, p2: &Profile<F>) -> f64 {
    let vocab: BTreeSet<&str> = p1.tokens().chain(p2.tokens()).collect();
    vocab
        .into_iter()
        .map(|token| {
            let f1: f64 = p1.get(token).as_();
            let f2: f64 = p2.get(token).as_();
            relative_difference(f1, f2)
        })
        .sum()
}

fn relative_difference(f1: f64, f2: f64) -> f64 {
    let total = f1 + f2;
    if total == 0.0 {
        // A token stored with zero frequency on both sides contributes nothing.
        return 0.0;
    }
    ((f1 - f2) / (total / 2.0)).powi(2)
}

/// Distance from `di` to `u`, scaled by the largest distance from `di` to any member of `pool`.
///
/// Fails when the pool is empty or that largest distance is zero.
pub fn radius<F: Frequency>(
    di: &Profile<F>,
    u: &Profile<F>,
    pool: &[&Profile<F>],
) -> Result<f64, DegeneratePool> {
    let degenerate = DegeneratePool { pool_size: pool.len() };
    let spread = pool
        .iter()
        .map(|a| OrderedFloat(distance(di, a)))
        .max()
        .ok_or_else(|| degenerate.clone())?;
    if spread.0 <= 0.0 {
        return Err(degenerate);
    }
    Ok(distance(di, u) / spread.0)
}

/// Mean radius of `u` over every member of `pool`.
pub fn radius_distance<F: Frequency>(
    u: &Profile<F>,
    pool: &[&Profile<F>],
) -> Result<f64, DegeneratePool> {
    if pool.is_empty() {
        return Err(DegeneratePool { pool_size: 0 });
    }
    let mut total = 0.0;
    for di in pool {
        total += radius(di, u, pool)?;
    }
    Ok(total / pool.len() as f64)
}
