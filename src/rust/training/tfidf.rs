use std::collections::{BTreeMap, HashMap, HashSet};

use log::{debug, info};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use super::utils::{l1_normalize_vector, normalize_vector};
use super::{invalid_param, Estimator, FitState, ParamValue, Params};
use crate::ModelError;

/// Row normalization applied after weighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Norm {
    L1,
    L2,
    Unnormalized,
}

impl Norm {
    fn as_str(&self) -> &'static str {
        match self {
            Self::L1 => "l1",
            Self::L2 => "l2",
            Self::Unnormalized => "none",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "l1" => Some(Self::L1),
            "l2" => Some(Self::L2),
            "none" => Some(Self::Unnormalized),
            _ => None,
        }
    }
}

/// Learned vocabulary and inverse document frequencies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfVocabulary {
    pub vocabulary: BTreeMap<String, usize>,
    pub idf: Array1<f32>,
}

/// TF-IDF vectorizer over whitespace-separated feature-units.
///
/// Documents are the joined feature-units of a classify-unit, so every
/// whitespace-separated piece is one term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    lowercase: bool,
    use_idf: bool,
    smooth_idf: bool,
    sublinear_tf: bool,
    norm: Norm,
    min_df: usize,
    state: FitState<TfidfVocabulary>,
}

impl Default for TfidfVectorizer {
    fn default() -> Self {
        Self {
            lowercase: true,
            use_idf: true,
            smooth_idf: true,
            sublinear_tf: false,
            norm: Norm::L2,
            min_df: 1,
            state: FitState::Unfitted,
        }
    }
}

impl TfidfVectorizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an unfitted vectorizer with `params` applied over the defaults.
    pub fn with_params(params: &Params) -> Result<Self, ModelError> {
        let mut vectorizer = Self::default();
        vectorizer.set_params(params)?;
        Ok(vectorizer)
    }

    fn analyze(&self, doc: &str) -> Vec<String> {
        doc.split_whitespace()
            .map(|term| {
                if self.lowercase {
                    term.to_lowercase()
                } else {
                    term.to_string()
                }
            })
            .collect()
    }

    /// Learns vocabulary and idf weights from `docs`.
    pub fn fit(&mut self, docs: &[String]) -> Result<(), ModelError> {
        if docs.is_empty() {
            return Err(ModelError::EmptyTrainingSet);
        }

        let mut doc_freq: HashMap<String, usize> = HashMap::new();
        for doc in docs {
            let unique: HashSet<String> = self.analyze(doc).into_iter().collect();
            for term in unique {
                *doc_freq.entry(term).or_insert(0) += 1;
            }
        }

        // BTreeMap keeps terms sorted, so indices are stable across runs
        let kept: BTreeMap<String, usize> = doc_freq
            .into_iter()
            .filter(|(_, df)| *df >= self.min_df)
            .collect();
        if kept.is_empty() {
            return Err(ModelError::EmptyVocabulary);
        }

        let n = docs.len() as f32;
        let mut vocabulary = BTreeMap::new();
        let mut idf = Array1::<f32>::ones(kept.len());
        for (idx, (term, df)) in kept.into_iter().enumerate() {
            if self.use_idf {
                let df = df as f32;
                idf[idx] = if self.smooth_idf {
                    ((1.0 + n) / (1.0 + df)).ln() + 1.0
                } else {
                    (n / df).ln() + 1.0
                };
            }
            vocabulary.insert(term, idx);
        }

        info!("TF-IDF vocabulary fitted with {} terms from {} documents", vocabulary.len(), docs.len());
        self.state = FitState::Fitted(TfidfVocabulary { vocabulary, idf });
        Ok(())
    }

    /// Maps one document onto the fitted vocabulary.
    pub fn transform(&self, doc: &str) -> Result<Array1<f32>, ModelError> {
        let fitted = self
            .state
            .fitted()
            .ok_or_else(|| ModelError::NotFitted("tfidf vectorizer".into()))?;

        let mut vector = Array1::<f32>::zeros(fitted.vocabulary.len());
        for term in self.analyze(doc) {
            if let Some(&idx) = fitted.vocabulary.get(&term) {
                vector[idx] += 1.0;
            }
        }
        if self.sublinear_tf {
            vector.mapv_inplace(|tf: f32| if tf > 0.0 { 1.0 + tf.ln() } else { 0.0 });
        }
        vector = vector * &fitted.idf;

        Ok(match self.norm {
            Norm::L2 => normalize_vector(&vector),
            Norm::L1 => l1_normalize_vector(&vector),
            Norm::Unnormalized => vector,
        })
    }

    /// Transforms every document into one row of the returned matrix.
    pub fn transform_many(&self, docs: &[String]) -> Result<Array2<f32>, ModelError> {
        let dims = self.vocabulary_len();
        let mut matrix = Array2::zeros((docs.len(), dims));
        for (row, doc) in docs.iter().enumerate() {
            matrix.row_mut(row).assign(&self.transform(doc)?);
        }
        Ok(matrix)
    }

    pub fn fit_transform(&mut self, docs: &[String]) -> Result<Array2<f32>, ModelError> {
        self.fit(docs)?;
        self.transform_many(docs)
    }

    pub fn vocabulary_len(&self) -> usize {
        self.state.fitted().map(|f| f.vocabulary.len()).unwrap_or(0)
    }
}

impl Estimator for TfidfVectorizer {
    fn get_params(&self) -> Params {
        let mut params = Params::new();
        params.insert("lowercase".into(), ParamValue::Bool(self.lowercase));
        params.insert("use_idf".into(), ParamValue::Bool(self.use_idf));
        params.insert("smooth_idf".into(), ParamValue::Bool(self.smooth_idf));
        params.insert("sublinear_tf".into(), ParamValue::Bool(self.sublinear_tf));
        params.insert("norm".into(), ParamValue::Str(self.norm.as_str().into()));
        params.insert("min_df".into(), ParamValue::Int(self.min_df as i64));
        params
    }

    fn set_params(&mut self, params: &Params) -> Result<(), ModelError> {
        for (name, value) in params {
            match (name.as_str(), value) {
                ("lowercase", ParamValue::Bool(v)) => self.lowercase = *v,
                ("use_idf", ParamValue::Bool(v)) => self.use_idf = *v,
                ("smooth_idf", ParamValue::Bool(v)) => self.smooth_idf = *v,
                ("sublinear_tf", ParamValue::Bool(v)) => self.sublinear_tf = *v,
                ("norm", ParamValue::Str(v)) => {
                    self.norm = Norm::parse(v).ok_or_else(|| invalid_param(name, value))?
                }
                ("min_df", ParamValue::Int(v)) if *v >= 1 => self.min_df = *v as usize,
                _ => return Err(invalid_param(name, value)),
            }
        }
        debug!("TF-IDF parameters: {:?}", self.get_params());
        Ok(())
    }

    fn is_fitted(&self) -> bool {
        self.state.is_fitted()
    }
}

/// Fits a vectorizer configured by `config` and returns it with the
/// vectorized training matrix.
pub fn start_tfidf(
    all_features: &[String],
    config: &Params,
) -> Result<(TfidfVectorizer, Array2<f32>), ModelError> {
    let mut vectorizer = TfidfVectorizer::with_params(config)?;
    let tfidf_train = vectorizer.fit_transform(all_features)?;
    Ok((vectorizer, tfidf_train))
}
