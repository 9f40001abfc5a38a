use std::cmp::Ordering;
use std::collections::BTreeMap;

use log::{debug, info};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use super::utils::{cosine_distance, euclidean_distance};
use super::{invalid_param, Estimator, FitState, ParamValue, Params};
use crate::classify_units::ClassId;
use crate::ModelError;

/// How neighbours are weighted in the vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Weights {
    Uniform,
    Distance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Metric {
    Euclidean,
    Cosine,
}

/// Training vectors and their labels, one row per label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnnSamples {
    pub samples: Array2<f32>,
    pub labels: Vec<ClassId>,
}

/// K-nearest-neighbours classifier over TF-IDF vectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnnClassifier {
    n_neighbors: usize,
    weights: Weights,
    metric: Metric,
    state: FitState<KnnSamples>,
}

impl Default for KnnClassifier {
    fn default() -> Self {
        Self {
            n_neighbors: 5,
            weights: Weights::Uniform,
            metric: Metric::Euclidean,
            state: FitState::Unfitted,
        }
    }
}

impl KnnClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(params: &Params) -> Result<Self, ModelError> {
        let mut knn = Self::default();
        knn.set_params(params)?;
        Ok(knn)
    }

    /// Stores the training vectors; rows of `x` pair up with `labels`.
    pub fn fit(&mut self, x: Array2<f32>, labels: &[ClassId]) -> Result<(), ModelError> {
        if x.nrows() == 0 {
            return Err(ModelError::EmptyTrainingSet);
        }
        if x.nrows() != labels.len() {
            return Err(ModelError::DimensionMismatch {
                expected: x.nrows(),
                actual: labels.len(),
            });
        }
        info!("KNN fitted on {} samples with {} features", x.nrows(), x.ncols());
        self.state = FitState::Fitted(KnnSamples {
            samples: x,
            labels: labels.to_vec(),
        });
        Ok(())
    }

    /// Predicts the class of one feature vector.
    ///
    /// Ties in the vote go to the smallest class id.
    pub fn predict(&self, x: &Array1<f32>) -> Result<ClassId, ModelError> {
        let fitted = self
            .state
            .fitted()
            .ok_or_else(|| ModelError::NotFitted("knn classifier".into()))?;
        if x.len() != fitted.samples.ncols() {
            return Err(ModelError::DimensionMismatch {
                expected: fitted.samples.ncols(),
                actual: x.len(),
            });
        }

        let mut distances: Vec<(f32, ClassId)> = fitted
            .samples
            .rows()
            .into_iter()
            .zip(fitted.labels.iter())
            .map(|(row, &label)| {
                let d = match self.metric {
                    Metric::Euclidean => euclidean_distance(row, x.view()),
                    Metric::Cosine => cosine_distance(row, x.view()),
                };
                (d, label)
            })
            .collect();
        distances.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
        let neighbours = &distances[..self.n_neighbors.min(distances.len())];

        let exact_match = neighbours.iter().any(|(d, _)| *d <= f32::EPSILON);
        let mut votes: BTreeMap<ClassId, f32> = BTreeMap::new();
        for &(d, label) in neighbours {
            let weight = match self.weights {
                Weights::Uniform => 1.0,
                // exact matches outvote everything else
                Weights::Distance if exact_match => {
                    if d <= f32::EPSILON {
                        1.0
                    } else {
                        0.0
                    }
                }
                Weights::Distance => 1.0 / d,
            };
            *votes.entry(label).or_insert(0.0) += weight;
        }

        let mut best: Option<(ClassId, f32)> = None;
        for (label, weight) in votes {
            match best {
                Some((_, best_weight)) if weight <= best_weight => {}
                _ => best = Some((label, weight)),
            }
        }
        let (label, weight) = best.ok_or(ModelError::EmptyTrainingSet)?;
        debug!("KNN predicted class {} with vote weight {}", label, weight);
        Ok(label)
    }

    pub fn predict_many(&self, x: &Array2<f32>) -> Result<Vec<ClassId>, ModelError> {
        x.rows()
            .into_iter()
            .map(|row| self.predict(&row.to_owned()))
            .collect()
    }
}

impl Estimator for KnnClassifier {
    fn get_params(&self) -> Params {
        let mut params = Params::new();
        params.insert("n_neighbors".into(), ParamValue::Int(self.n_neighbors as i64));
        let weights = match self.weights {
            Weights::Uniform => "uniform",
            Weights::Distance => "distance",
        };
        params.insert("weights".into(), ParamValue::Str(weights.into()));
        let metric = match self.metric {
            Metric::Euclidean => "euclidean",
            Metric::Cosine => "cosine",
        };
        params.insert("metric".into(), ParamValue::Str(metric.into()));
        params
    }

    fn set_params(&mut self, params: &Params) -> Result<(), ModelError> {
        for (name, value) in params {
            match (name.as_str(), value) {
                ("n_neighbors", ParamValue::Int(v)) if *v >= 1 => self.n_neighbors = *v as usize,
                ("weights", ParamValue::Str(v)) if v == "uniform" => self.weights = Weights::Uniform,
                ("weights", ParamValue::Str(v)) if v == "distance" => self.weights = Weights::Distance,
                ("metric", ParamValue::Str(v)) if v == "euclidean" => self.metric = Metric::Euclidean,
                ("metric", ParamValue::Str(v)) if v == "cosine" => self.metric = Metric::Cosine,
                _ => return Err(invalid_param(name, value)),
            }
        }
        Ok(())
    }

    fn is_fitted(&self) -> bool {
        self.state.is_fitted()
    }
}

/// Fits a classifier configured by `config` on the vectorized training data.
pub fn start_knn(
    tfidf_train: Array2<f32>,
    all_classes: &[ClassId],
    config: &Params,
) -> Result<KnnClassifier, ModelError> {
    let mut knn = KnnClassifier::with_params(config)?;
    knn.fit(tfidf_train, all_classes)?;
    Ok(knn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn params(items: &[(&str, ParamValue)]) -> Params {
        items.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    fn training_set() -> (Array2<f32>, Vec<ClassId>) {
        let x = array![[0.0, 0.0], [0.1, 0.0], [5.0, 5.0], [5.1, 5.0], [5.0, 5.2]];
        (x, vec![1, 1, 2, 2, 2])
    }

    #[test]
    fn test_predict_nearest_class() {
        let (x, y) = training_set();
        let knn = start_knn(x, &y, &params(&[("n_neighbors", ParamValue::Int(3))])).unwrap();
        assert_eq!(knn.predict(&array![0.05, 0.0]).unwrap(), 1);
        assert_eq!(knn.predict(&array![4.9, 5.1]).unwrap(), 2);
    }

    #[test]
    fn test_tie_goes_to_smallest_class() {
        let x = array![[0.0, 1.0], [1.0, 0.0]];
        let knn = start_knn(x, &[7, 3], &params(&[("n_neighbors", ParamValue::Int(2))])).unwrap();
        assert_eq!(knn.predict(&array![0.5, 0.5]).unwrap(), 3);
    }

    #[test]
    fn test_distance_weights_prefer_exact_match() {
        let (x, y) = training_set();
        let knn = start_knn(
            x,
            &y,
            &params(&[("n_neighbors", ParamValue::Int(5)), ("weights", "distance".into())]),
        )
        .unwrap();
        assert_eq!(knn.predict(&array![0.0, 0.0]).unwrap(), 1);
    }

    #[test]
    fn test_fit_rejects_label_mismatch() {
        let (x, _) = training_set();
        let mut knn = KnnClassifier::new();
        assert!(matches!(
            knn.fit(x, &[1, 2]),
            Err(ModelError::DimensionMismatch { expected: 5, actual: 2 })
        ));
    }

    #[test]
    fn test_predict_checks_dimensions() {
        let (x, y) = training_set();
        let knn = start_knn(x, &y, &Params::new()).unwrap();
        assert!(matches!(knn.predict(&array![1.0]), Err(ModelError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_unfitted_predict_fails() {
        assert!(matches!(KnnClassifier::new().predict(&array![1.0]), Err(ModelError::NotFitted(_))));
    }

    #[test]
    fn test_params_roundtrip() {
        let config = params(&[("metric", "cosine".into()), ("n_neighbors", ParamValue::Int(1))]);
        let knn = KnnClassifier::with_params(&config).unwrap();
        let reported = knn.get_params();
        assert_eq!(reported["metric"], ParamValue::Str("cosine".into()));
        assert_eq!(reported["n_neighbors"], ParamValue::Int(1));
        assert_eq!(reported["weights"], ParamValue::Str("uniform".into()));
        assert!(KnnClassifier::with_params(&params(&[("metric", "manhattan".into())])).is_err());
    }
}
