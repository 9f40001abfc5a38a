//! Estimators behind the classifier: a TF-IDF vectorizer and a KNN classifier,
//! plus the model handle and training-data access that tie them together.

pub mod knn;
pub mod model;
pub mod tfidf;
pub mod traindata;
mod utils;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub use knn::KnnClassifier;
pub use model::{Model, ModelKind, ModelWrapper, SavedModel, TraindataInfo};
pub use tfidf::TfidfVectorizer;
pub use traindata::{TraindataFile, TrainingDataProvider, TrainingSample};

/// A single hyper-parameter value as it appears in configuration files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{}", v),
            Self::Int(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::Str(v) => write!(f, "{}", v),
        }
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

/// Hyper-parameters keyed by name, ordered for stable logging.
pub type Params = BTreeMap<String, ParamValue>;

/// Whether an estimator has learned anything yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FitState<T> {
    Unfitted,
    Fitted(T),
}

impl<T> FitState<T> {
    pub fn is_fitted(&self) -> bool {
        matches!(self, Self::Fitted(_))
    }

    pub fn fitted(&self) -> Option<&T> {
        match self {
            Self::Fitted(inner) => Some(inner),
            Self::Unfitted => None,
        }
    }
}

impl<T> Default for FitState<T> {
    fn default() -> Self {
        Self::Unfitted
    }
}

/// Common surface of the vectorizer and the classifier.
pub trait Estimator {
    /// Current hyper-parameters, including defaults that were never set.
    fn get_params(&self) -> Params;

    /// Overrides hyper-parameters by name.
    ///
    /// # Errors
    /// `ModelError::InvalidParam` for unknown names or values of the wrong type.
    fn set_params(&mut self, params: &Params) -> Result<(), crate::ModelError>;

    fn is_fitted(&self) -> bool;
}

/// Returns true if every configured key/value pair appears among the
/// estimator's own parameters. A missing estimator never matches.
pub fn check_configvalues<E: Estimator>(config_values: &Params, model: Option<&E>) -> bool {
    let Some(model) = model else {
        return false;
    };
    let params = model.get_params();
    config_values
        .iter()
        .all(|(key, value)| params.get(key) == Some(value))
}

pub(crate) fn invalid_param(name: &str, value: &ParamValue) -> crate::ModelError {
    crate::ModelError::InvalidParam(format!("{} = {}", name, value))
}
