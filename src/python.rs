//! Python bindings, built with the `python` feature.

use std::collections::{BTreeMap, HashMap};

use pyo3::exceptions::{PyKeyError, PyTypeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::{PyInt, PyString};

use crate::classifier::ensemble::{EnsembleClassifier, EnsemblePrediction, VotingMethod};
use crate::classifier::SingleClassifier;
use crate::common_types::{ClassLabel, Prediction};
use crate::error::ClassifierError;
use crate::profile::{self, Profile};
use crate::utils::normalize_scores;

type PyProfile = HashMap<String, f64>;

impl From<ClassifierError> for PyErr {
    fn from(err: ClassifierError) -> Self {
        match err {
            ClassifierError::InvalidMethod(_) => PyKeyError::new_err(err.to_string()),
            other => PyValueError::new_err(other.to_string()),
        }
    }
}

impl<'py> FromPyObject<'py> for ClassLabel {
    fn extract_bound(ob: &Bound<'py, PyAny>) -> PyResult<Self> {
        if ob.is_instance_of::<PyInt>() {
            Ok(ClassLabel::Int(ob.extract()?))
        } else if ob.is_instance_of::<PyString>() {
            Ok(ClassLabel::Text(ob.extract()?))
        } else {
            Err(PyTypeError::new_err("class labels must be int or str"))
        }
    }
}

impl IntoPy<PyObject> for ClassLabel {
    fn into_py(self, py: Python<'_>) -> PyObject {
        match self {
            ClassLabel::Int(i) => i.into_py(py),
            ClassLabel::Text(s) => s.into_py(py),
        }
    }
}

fn to_profile(counts: PyProfile) -> Profile<f64> {
    counts.into_iter().collect()
}

fn to_profiles(profiles: Vec<PyProfile>) -> Vec<Profile<f64>> {
    profiles.into_iter().map(to_profile).collect()
}

fn prediction_to_py(py: Python<'_>, prediction: Prediction<ClassLabel>) -> PyObject {
    (prediction.label, prediction.distances).into_py(py)
}

fn ensemble_to_py(py: Python<'_>, predictions: Vec<EnsemblePrediction<ClassLabel>>, confidence: bool) -> PyObject {
    if confidence {
        predictions
            .into_iter()
            .map(|p| (p.label, p.confidence.unwrap_or_default()))
            .collect::<Vec<(ClassLabel, BTreeMap<ClassLabel, f64>)>>()
            .into_py(py)
    } else {
        predictions.into_iter().map(|p| p.label).collect::<Vec<_>>().into_py(py)
    }
}

/// Relative-difference distance between two profiles.
#[pyfunction]
fn distance(profile1: PyProfile, profile2: PyProfile) -> f64 {
    profile::distance(&to_profile(profile1), &to_profile(profile2))
}

/// Mean radius of `u` over the known profiles `known`.
#[pyfunction]
fn radius_distance(u: PyProfile, known: Vec<PyProfile>) -> PyResult<f64> {
    let known = to_profiles(known);
    let pool: Vec<&Profile<f64>> = known.iter().collect();
    profile::radius_distance(&to_profile(u), &pool).map_err(|e| PyValueError::new_err(e.to_string()))
}

/// Normalizes scores to sum to 1, negating them first when `inverse` is true.
#[pyfunction]
#[pyo3(signature = (scores, inverse = true))]
fn softmax(scores: Vec<f64>, inverse: bool) -> PyResult<Vec<f64>> {
    Ok(normalize_scores(&scores, inverse)?)
}

#[pyclass(name = "SingleClassifier")]
struct PySingleClassifier {
    classifier: SingleClassifier<ClassLabel, f64>,
}

#[pymethods]
impl PySingleClassifier {
    #[new]
    fn new(profiles: Vec<PyProfile>, y_true: Vec<ClassLabel>, p_length: usize, classes: Vec<ClassLabel>) -> PyResult<Self> {
        let classifier = SingleClassifier::new(&to_profiles(profiles), &y_true, p_length, &classes)?;
        Ok(PySingleClassifier { classifier })
    }

    #[getter]
    fn p_length(&self) -> usize {
        self.classifier.p_length()
    }

    fn forward_one(&self, py: Python<'_>, x: PyProfile) -> PyResult<PyObject> {
        let prediction = self.classifier.predict_one(&to_profile(x))?;
        Ok(prediction_to_py(py, prediction))
    }

    fn forward_all(&self, py: Python<'_>) -> PyResult<Vec<PyObject>> {
        let predictions = self.classifier.predict_all()?;
        Ok(predictions.into_iter().map(|p| prediction_to_py(py, p)).collect())
    }

    #[pyo3(signature = (xs, truncate = true))]
    fn forward_multiple(&self, py: Python<'_>, xs: Vec<PyProfile>, truncate: bool) -> PyResult<Vec<PyObject>> {
        let predictions = self.classifier.predict_many(&to_profiles(xs), truncate)?;
        Ok(predictions.into_iter().map(|p| prediction_to_py(py, p)).collect())
    }
}

#[pyclass(name = "EnsambleClassifier")]
struct PyEnsembleClassifier {
    ensemble: EnsembleClassifier<ClassLabel, f64>,
}

#[pymethods]
impl PyEnsembleClassifier {
    #[new]
    #[pyo3(signature = (profiles_multiple, y_true, p_length_options, classes, show_progress = false))]
    fn new(
        profiles_multiple: Vec<Vec<PyProfile>>,
        y_true: Vec<ClassLabel>,
        p_length_options: Vec<usize>,
        classes: Vec<ClassLabel>,
        show_progress: bool,
    ) -> PyResult<Self> {
        let variants: Vec<Vec<Profile<f64>>> = profiles_multiple.into_iter().map(to_profiles).collect();
        let ensemble = EnsembleClassifier::new(&variants, &y_true, &p_length_options, &classes)?
            .with_progress(show_progress);
        Ok(PyEnsembleClassifier { ensemble })
    }

    #[pyo3(signature = (method = "majority", confidence = false))]
    fn forward_ensamble(&self, py: Python<'_>, method: &str, confidence: bool) -> PyResult<PyObject> {
        let method: VotingMethod = method.parse()?;
        let predictions = self.ensemble.run_all(method, confidence)?;
        Ok(ensemble_to_py(py, predictions, confidence))
    }

    #[pyo3(signature = (xs, truncate = true, method = "majority", confidence = false))]
    fn forward_multiple(
        &self,
        py: Python<'_>,
        xs: Vec<PyProfile>,
        truncate: bool,
        method: &str,
        confidence: bool,
    ) -> PyResult<PyObject> {
        let method: VotingMethod = method.parse()?;
        let predictions = self.ensemble.run_many(&to_profiles(xs), truncate, method, confidence)?;
        Ok(ensemble_to_py(py, predictions, confidence))
    }
}

/// A Python module implemented in Rust. The name of this function must match
/// the `lib.name` in `Cargo.toml`, which maturin uses for the extension.
#[pymodule]
fn profile_attribution(_py: Python<'_>, m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(distance, m)?)?;
    m.add_function(wrap_pyfunction!(radius_distance, m)?)?;
    m.add_function(wrap_pyfunction!(softmax, m)?)?;
    m.add_class::<PySingleClassifier>()?;
    m.add_class::<PyEnsembleClassifier>()?;
    Ok(())
}
