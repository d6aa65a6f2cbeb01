//! Nearest-class attribution over truncated n-gram profiles.

pub mod ensemble;

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt::Debug;

use ordered_float::OrderedFloat;
use tracing::{debug, trace, warn};

use crate::common_types::{DistanceMap, Prediction};
use crate::error::{ClassifierError, Result};
use crate::profile::{Frequency, Profile, radius_distance};

/// Classifies profiles by their mean radius to the members of each class.
///
/// - `L`: The type of the class label (`&str`, `i32`, [`ClassLabel`](crate::ClassLabel), ...).
/// - `F`: The frequency type stored in the profiles.
#[derive(Debug, Clone)]
pub struct SingleClassifier<L, F = u64> {
    p_length: usize,
    profiles: Vec<Profile<F>>, // already truncated to p_length
    y_true: Vec<L>,
    classes: Vec<L>, // ascending, no duplicates
    members: Vec<Vec<usize>>, // profile indices of each class, parallel to `classes`
}

impl<L, F> SingleClassifier<L, F>
where
    L: Ord + Clone + Debug,
    F: Frequency,
{
    /// Truncates every profile to `p_length` and groups them by class.
    ///
    /// `classes` is treated as a set: it is sorted and duplicates are dropped.
    pub fn new(profiles: &[Profile<F>], y_true: &[L], p_length: usize, classes: &[L]) -> Result<Self> {
        if profiles.len() != y_true.len() {
            return Err(ClassifierError::LengthMismatch {
                profiles: profiles.len(),
                labels: y_true.len(),
            });
        }
        let classes: Vec<L> = classes.iter().cloned().collect::<BTreeSet<_>>().into_iter().collect();
        if classes.is_empty() {
            return Err(ClassifierError::EmptyClassSet);
        }

        let mut members = vec![Vec::new(); classes.len()];
        for (idx, label) in y_true.iter().enumerate() {
            let class_idx = classes
                .binary_search(label)
                .map_err(|_| ClassifierError::InvalidLabel { label: format!("{label:?}") })?;
            members[class_idx].push(idx);
        }

        let profiles: Vec<Profile<F>> = profiles.iter().map(|p| p.truncate(p_length)).collect();
        debug!(
            p_length,
            n_profiles = profiles.len(),
            n_classes = classes.len(),
            "built single classifier"
        );

        Ok(Self { p_length, profiles, y_true: y_true.to_vec(), classes, members })
    }

    pub fn p_length(&self) -> usize {
        self.p_length
    }

    /// Declared classes in ascending order.
    pub fn classes(&self) -> &[L] {
        &self.classes
    }

    /// Training profiles after truncation.
    pub fn profiles(&self) -> &[Profile<F>] {
        &self.profiles
    }

    pub fn labels(&self) -> &[L] {
        &self.y_true
    }

    /// Predicts the class of `x` and reports its distance to every class.
    ///
    /// When `x` equals one of a class's own members, the first such member is
    /// left out of that class's pool so a document is never scored against itself.
    pub fn predict_one(&self, x: &Profile<F>) -> Result<Prediction<L>> {
        let mut distances = DistanceMap::new();
        for (class, members) in self.classes.iter().zip(&self.members) {
            let mut pool: Vec<&Profile<F>> = members.iter().map(|&i| &self.profiles[i]).collect();
            if let Some(pos) = pool.iter().position(|member| *member == x) {
                pool.remove(pos);
            }
            let dist = radius_distance(x, &pool).map_err(|source| {
                warn!(class = ?class, pool_size = source.pool_size, "degenerate class pool");
                ClassifierError::DegenerateClass { class: format!("{class:?}"), source }
            })?;
            distances.insert(class.clone(), dist);
        }

        let label = closest_class(&distances).ok_or(ClassifierError::EmptyClassSet)?;
        trace!(label = ?label, "predicted");
        Ok(Prediction::new(label, distances))
    }

    /// Leave-one-out prediction for every training profile, in training order.
    pub fn predict_all(&self) -> Result<Vec<Prediction<L>>> {
        self.profiles.iter().map(|x| self.predict_one(x)).collect()
    }

    /// Predicts every profile of `xs`, first truncating them to `p_length` if `truncate` is set.
    pub fn predict_many(&self, xs: &[Profile<F>], truncate: bool) -> Result<Vec<Prediction<L>>> {
        xs.iter()
            .map(|x| {
                let x = if truncate { Cow::Owned(x.truncate(self.p_length)) } else { Cow::Borrowed(x) };
                self.predict_one(&x)
            })
            .collect()
    }
}

/// Class with the smallest distance; equal distances resolve to the smallest label.
pub fn closest_class<L: Ord + Clone>(distances: &DistanceMap<L>) -> Option<L> {
    // min_by_key keeps the first minimum and the map iterates in ascending label order.
    distances
        .iter()
        .min_by_key(|&(_, &dist)| OrderedFloat(dist))
        .map(|(label, _)| label.clone())
}

/// Predicted labels only.
pub fn labels_of<L: Ord + Clone>(predictions: &[Prediction<L>]) -> Vec<L> {
    predictions.iter().map(|p| p.label.clone()).collect()
}

/// Distance maps only.
pub fn distances_of<L: Ord + Clone>(predictions: &[Prediction<L>]) -> Vec<DistanceMap<L>> {
    predictions.iter().map(|p| p.distances.clone()).collect()
}

/// Distances as a row per prediction, columns in ascending class order.
///
/// The column labels are taken from the first prediction and every other
/// prediction must cover exactly those classes. An empty input gives empty output.
pub fn distance_matrix<L: Ord + Clone + Debug>(predictions: &[Prediction<L>]) -> Result<(Vec<Vec<f64>>, Vec<L>)> {
    let Some(first) = predictions.first() else {
        return Ok((Vec::new(), Vec::new()));
    };
    let classes: Vec<L> = first.distances.keys().cloned().collect();
    let mut rows = Vec::with_capacity(predictions.len());
    for prediction in predictions {
        if !prediction.distances.keys().eq(classes.iter()) {
            return Err(ClassifierError::ClassSetMismatch {
                expected: classes.iter().map(|c| format!("{c:?}")).collect(),
                found: prediction.distances.keys().map(|c| format!("{c:?}")).collect(),
            });
        }
        rows.push(prediction.distances.values().copied().collect());
    }
    Ok((rows, classes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{distance, radius};

    fn profile(pairs: &[(&str, u64)]) -> Profile<u64> {
        pairs.iter().map(|&(t, f)| (t, f)).collect()
    }

    fn two_class_training() -> (Vec<Profile<u64>>, Vec<&'static str>) {
        let profiles = vec![
            profile(&[("x", 10), ("y", 5)]),
            profile(&[("x", 9), ("y", 6)]),
            profile(&[("x", 1), ("y", 9)]),
            profile(&[("x", 2), ("y", 8)]),
        ];
        (profiles, vec!["A", "A", "B", "B"])
    }

    /// Two classes far apart, each an equilateral triangle of small perturbations.
    fn three_per_class_training() -> (Vec<Profile<u64>>, Vec<&'static str>) {
        let profiles = vec![
            profile(&[("a", 20), ("p", 11), ("q", 10), ("r", 10)]),
            profile(&[("a", 20), ("p", 10), ("q", 11), ("r", 10)]),
            profile(&[("a", 20), ("p", 10), ("q", 10), ("r", 11)]),
            profile(&[("b", 20), ("p", 11), ("q", 10), ("r", 10)]),
            profile(&[("b", 20), ("p", 10), ("q", 11), ("r", 10)]),
            profile(&[("b", 20), ("p", 10), ("q", 10), ("r", 11)]),
        ];
        (profiles, vec!["A", "A", "A", "B", "B", "B"])
    }

    #[test]
    fn test_end_to_end_unknown_profile() {
        let (profiles, y_true) = two_class_training();
        let classifier = SingleClassifier::new(&profiles, &y_true, 10, &["A", "B"]).unwrap();
        let u = profile(&[("x", 9), ("y", 7)]);

        let prediction = classifier.predict_one(&u).unwrap();
        assert_eq!(prediction.label, "A");

        // Reproduce the map from the formula directly.
        let a1 = ((10.0_f64 - 9.0) / (19.0 / 2.0)).powi(2) + ((5.0_f64 - 7.0) / (12.0 / 2.0)).powi(2);
        let a2 = ((9.0_f64 - 9.0) / (18.0 / 2.0)).powi(2) + ((6.0_f64 - 7.0) / (13.0 / 2.0)).powi(2);
        let a_spread = ((10.0_f64 - 9.0) / (19.0 / 2.0)).powi(2) + ((5.0_f64 - 6.0) / (11.0 / 2.0)).powi(2);
        let expected_a = (a1 / a_spread + a2 / a_spread) / 2.0;

        let b1 = ((1.0_f64 - 9.0) / (10.0 / 2.0)).powi(2) + ((9.0_f64 - 7.0) / (16.0 / 2.0)).powi(2);
        let b2 = ((2.0_f64 - 9.0) / (11.0 / 2.0)).powi(2) + ((8.0_f64 - 7.0) / (15.0 / 2.0)).powi(2);
        let b_spread = ((1.0_f64 - 2.0) / (3.0 / 2.0)).powi(2) + ((9.0_f64 - 8.0) / (17.0 / 2.0)).powi(2);
        let expected_b = (b1 / b_spread + b2 / b_spread) / 2.0;

        assert_eq!(prediction.distances["A"], expected_a);
        assert_eq!(prediction.distances["B"], expected_b);
        assert!(expected_a < expected_b);
    }

    #[test]
    fn test_leave_one_out_excludes_self() {
        let (profiles, y_true) = two_class_training();
        let classifier = SingleClassifier::new(&profiles, &y_true, 10, &["A", "B"]).unwrap();

        // Scoring A1 against its full pool would succeed, since A2 gives the pool spread...
        let a1 = &profiles[0];
        let full_pool = [&profiles[0], &profiles[1]];
        assert!(radius_distance(a1, &full_pool).is_ok());

        // ...but leave-one-out drops A1 from its own pool, leaving a single member.
        let err = classifier.predict_one(a1).unwrap_err();
        match err {
            ClassifierError::DegenerateClass { class, source } => {
                assert_eq!(class, "\"A\"");
                assert_eq!(source.pool_size, 1);
            }
            other => panic!("expected DegenerateClass, got {other:?}"),
        }
        assert!(classifier.predict_all().is_err());
    }

    #[test]
    fn test_leave_one_out_changes_own_class_distance() {
        let (profiles, y_true) = three_per_class_training();
        let classifier = SingleClassifier::new(&profiles, &y_true, 10, &["A", "B"]).unwrap();
        let a1 = &profiles[0];

        let prediction = classifier.predict_one(a1).unwrap();
        let without_self = radius_distance(a1, &[&profiles[1], &profiles[2]]).unwrap();
        let with_self = radius_distance(a1, &[&profiles[0], &profiles[1], &profiles[2]]).unwrap();
        assert_eq!(prediction.distances["A"], without_self);
        assert_eq!(without_self, 1.0);
        assert_eq!(with_self, 2.0 / 3.0);
        assert_eq!(prediction.label, "A");
    }

    #[test]
    fn test_leave_one_out_removes_only_first_duplicate() {
        let dup = profile(&[("x", 5), ("y", 5)]);
        let profiles = vec![
            dup.clone(),
            dup.clone(),
            profile(&[("x", 9), ("y", 1)]),
            profile(&[("x", 1), ("y", 9)]),
            profile(&[("x", 2), ("y", 7)]),
        ];
        let y_true = vec!["A", "A", "A", "B", "B"];
        let classifier = SingleClassifier::new(&profiles, &y_true, 10, &["A", "B"]).unwrap();

        let prediction = classifier.predict_one(&dup).unwrap();
        let expected = radius_distance(&dup, &[&profiles[1], &profiles[2]]).unwrap();
        assert_eq!(prediction.distances["A"], expected);
        // The remaining twin sits at distance zero.
        assert_eq!(radius(&profiles[1], &dup, &[&profiles[1], &profiles[2]]), Ok(0.0));
    }

    #[test]
    fn test_predict_all_in_sample() {
        let (profiles, y_true) = three_per_class_training();
        let classifier = SingleClassifier::new(&profiles, &y_true, 10, &["B", "A"]).unwrap();
        let predictions = classifier.predict_all().unwrap();
        assert_eq!(predictions.len(), 6);
        assert_eq!(labels_of(&predictions), y_true);
        for p in &predictions {
            assert_eq!(p.distances.keys().copied().collect::<Vec<_>>(), vec!["A", "B"]);
        }
    }

    #[test]
    fn test_predict_many_truncates_queries() {
        let (profiles, y_true) = three_per_class_training();
        let classifier = SingleClassifier::new(&profiles, &y_true, 2, &["A", "B"]).unwrap();
        assert!(classifier.profiles().iter().all(|p| p.len() == 2));

        let query = profile(&[("a", 19), ("p", 12), ("q", 3), ("w", 1)]);
        let truncated = classifier.predict_many(&[query.clone()], true).unwrap();
        let manual = classifier.predict_one(&query.truncate(2)).unwrap();
        assert_eq!(truncated[0], manual);

        let untruncated = classifier.predict_many(&[query.clone()], false).unwrap();
        assert_eq!(untruncated[0], classifier.predict_one(&query).unwrap());
        assert_eq!(truncated[0].label, "A");
    }

    #[test]
    fn test_predict_many_applies_leave_one_out_to_equal_queries() {
        let (profiles, y_true) = three_per_class_training();
        let classifier = SingleClassifier::new(&profiles, &y_true, 10, &["A", "B"]).unwrap();
        let from_many = classifier.predict_many(&profiles[..1], true).unwrap();
        let from_all = classifier.predict_all().unwrap();
        assert_eq!(from_many[0], from_all[0]);
    }

    #[test]
    fn test_tie_resolves_to_smallest_class() {
        let mut distances = DistanceMap::new();
        distances.insert("fr", 0.5);
        distances.insert("en", 0.5);
        distances.insert("de", 0.9);
        assert_eq!(closest_class(&distances), Some("en"));
        assert_eq!(closest_class(&DistanceMap::<&str>::new()), None);
    }

    #[test]
    fn test_mirror_classes_tie_to_smallest_label() {
        // Class pools that are mirror images give the midpoint query identical distances.
        let profiles = vec![
            profile(&[("x", 8), ("y", 2)]),
            profile(&[("x", 6), ("y", 2)]),
            profile(&[("x", 2), ("y", 8)]),
            profile(&[("x", 2), ("y", 6)]),
        ];
        let y_true = vec![2, 2, 1, 1];
        let classifier = SingleClassifier::new(&profiles, &y_true, 10, &[2, 1]).unwrap();
        let prediction = classifier.predict_one(&profile(&[("x", 5), ("y", 5)])).unwrap();
        assert_eq!(prediction.distances[&1], prediction.distances[&2]);
        assert_eq!(prediction.label, 1);
    }

    #[test]
    fn test_invalid_label_rejected() {
        let (profiles, _) = two_class_training();
        let err = SingleClassifier::new(&profiles, &["A", "A", "B", "C"], 10, &["A", "B"]).unwrap_err();
        assert_eq!(err, ClassifierError::InvalidLabel { label: "\"C\"".into() });
    }

    #[test]
    fn test_empty_classes_rejected() {
        let err = SingleClassifier::<&str>::new(&[], &[], 10, &[]).unwrap_err();
        assert_eq!(err, ClassifierError::EmptyClassSet);
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let (profiles, _) = two_class_training();
        let err = SingleClassifier::new(&profiles, &["A"], 10, &["A", "B"]).unwrap_err();
        assert_eq!(err, ClassifierError::LengthMismatch { profiles: 4, labels: 1 });
    }

    #[test]
    fn test_distance_matrix_columns_follow_class_order() {
        let (profiles, y_true) = three_per_class_training();
        let classifier = SingleClassifier::new(&profiles, &y_true, 10, &["B", "A"]).unwrap();
        let predictions = classifier.predict_all().unwrap();
        let (rows, classes) = distance_matrix(&predictions).unwrap();
        assert_eq!(classes, vec!["A", "B"]);
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[0], vec![predictions[0].distances["A"], predictions[0].distances["B"]]);
        assert_eq!(distances_of(&predictions)[3], predictions[3].distances);
        assert_eq!(distance(&profiles[0], &profiles[0]), 0.0);
    }

    #[test]
    fn test_distance_matrix_rejects_rows_with_other_classes() {
        let a_b = Prediction::new("A", DistanceMap::from([("A", 0.5), ("B", 1.5)]));
        let a_c = Prediction::new("C", DistanceMap::from([("A", 2.0), ("C", 0.25)]));
        let err = distance_matrix(&[a_b.clone(), a_c]).unwrap_err();
        assert_eq!(
            err,
            ClassifierError::ClassSetMismatch {
                expected: vec!["\"A\"".into(), "\"B\"".into()],
                found: vec!["\"A\"".into(), "\"C\"".into()],
            }
        );
        let empty: [Prediction<&str>; 0] = [];
        assert_eq!(distance_matrix(&empty).unwrap(), (Vec::new(), Vec::new()));
        assert_eq!(distance_matrix(&[a_b]).unwrap(), (vec![vec![0.5, 1.5]], vec!["A", "B"]));
    }
}
