use std::fmt;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use super::{Estimator, KnnClassifier, Params, TfidfVectorizer};
use crate::classify_units::ClassId;
use crate::ModelError;

/// The two persisted model kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelKind {
    Vectorizer,
    Classifier,
}

impl ModelKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Vectorizer => "model_tfidf",
            Self::Classifier => "model_knn",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A fitted model as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SavedModel {
    Vectorizer(TfidfVectorizer),
    Classifier(KnnClassifier),
}

impl SavedModel {
    pub fn kind(&self) -> ModelKind {
        match self {
            Self::Vectorizer(_) => ModelKind::Vectorizer,
            Self::Classifier(_) => ModelKind::Classifier,
        }
    }

    pub fn is_fitted(&self) -> bool {
        match self {
            Self::Vectorizer(m) => m.is_fitted(),
            Self::Classifier(m) => m.is_fitted(),
        }
    }

    pub fn get_params(&self) -> Params {
        match self {
            Self::Vectorizer(m) => m.get_params(),
            Self::Classifier(m) => m.get_params(),
        }
    }

    pub fn into_vectorizer(self) -> Option<TfidfVectorizer> {
        match self {
            Self::Vectorizer(m) => Some(m),
            Self::Classifier(_) => None,
        }
    }

    pub fn into_classifier(self) -> Option<KnnClassifier> {
        match self {
            Self::Classifier(m) => Some(m),
            Self::Vectorizer(_) => None,
        }
    }
}

/// First element of a persisted bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelWrapper {
    pub name: SavedModel,
}

/// Identity of the training data a model was fitted on: file name and
/// modification date. Both empty when the data could not be inspected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraindataInfo {
    pub name: String,
    pub date: String,
}

impl TraindataInfo {
    pub fn new(name: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            date: date.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.date.is_empty()
    }
}

/// Fitted vectorizer and classifier together with the traindata fingerprint
/// they were built from.
#[derive(Debug, Clone)]
pub struct Model {
    pub vectorizer: TfidfVectorizer,
    pub knn: KnnClassifier,
    pub traindata: TraindataInfo,
    retrained: bool,
}

impl Model {
    pub fn new(
        vectorizer: TfidfVectorizer,
        knn: KnnClassifier,
        traindata: TraindataInfo,
        retrained: bool,
    ) -> Self {
        Self {
            vectorizer,
            knn,
            traindata,
            retrained,
        }
    }

    /// True if the models were fitted in this process instead of loaded.
    pub fn retrained(&self) -> bool {
        self.retrained
    }

    /// Vectorizes feature-units the same way training documents were.
    pub fn featurevector(&self, fus: &[String]) -> Result<Array1<f32>, ModelError> {
        self.vectorizer.transform(&fus.join(" "))
    }

    pub fn predict(&self, featurevector: &Array1<f32>) -> Result<ClassId, ModelError> {
        self.knn.predict(featurevector)
    }
}
