//! Loading, validating, retraining and persisting the vectorizer and the
//! classifier.
//!
//! Both models are stored in their own file together with the fingerprint of
//! the training data they were fitted on. A bundle that is missing, corrupt,
//! stale or configured differently from the current configuration causes both
//! models to be retrained.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::classify_units::{ClassId, ClassifyUnitManager};
use crate::config::Config;
use crate::feature_units::FeatureUnits;
use crate::training::knn::start_knn;
use crate::training::tfidf::start_tfidf;
use crate::training::{
    check_configvalues, KnnClassifier, Model, ModelKind, ModelWrapper, Params, SavedModel,
    TfidfVectorizer, TraindataInfo, TrainingDataProvider, TrainingSample,
};

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),
    #[error("Checksum mismatch for {path}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        path: String,
        expected: String,
        actual: String,
    },
    #[error("Model not fitted: {0}")]
    NotFitted(String),
    #[error("Invalid parameter: {0}")]
    InvalidParam(String),
    #[error("Training set is empty")]
    EmptyTrainingSet,
    #[error("Vocabulary is empty")]
    EmptyVocabulary,
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Where the cache stands with respect to its persisted models.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelState {
    NotLoaded,
    /// Both models loaded but at least one is stale or misconfigured.
    LoadedStale,
    LoadedFresh,
    /// At least one model could not be loaded.
    TrainingRequired,
}

/// Why a persisted model cannot be reused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetrainReason {
    Missing(ModelKind),
    StaleTraindata(ModelKind),
    ConfigMismatch(ModelKind),
}

/// On-disk wrapper around a serialized bundle.
#[derive(Serialize, Deserialize)]
struct Envelope {
    sha256: String,
    payload: Vec<u8>,
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

#[derive(Debug)]
pub struct ModelCache {
    tfidf_path: PathBuf,
    knn_path: PathBuf,
    tfidf_config: Params,
    knn_config: Params,
    traindata_path: PathBuf,
    all_features: Vec<String>,
    all_classes: Vec<ClassId>,
    state: ModelState,
}

impl ModelCache {
    pub fn new(config: &Config) -> Self {
        Self {
            tfidf_path: config.models.tfidf_path.clone(),
            knn_path: config.models.knn_path.clone(),
            tfidf_config: config.tfidf_config.clone(),
            knn_config: config.knn_config.clone(),
            traindata_path: config.resources.traindata_path.clone(),
            all_features: Vec::new(),
            all_classes: Vec::new(),
            state: ModelState::NotLoaded,
        }
    }

    pub fn model_path(&self, kind: ModelKind) -> &Path {
        match kind {
            ModelKind::Vectorizer => &self.tfidf_path,
            ModelKind::Classifier => &self.knn_path,
        }
    }

    pub fn state(&self) -> ModelState {
        self.state
    }

    /// Feature strings of every training sample processed so far.
    pub fn all_features(&self) -> &[String] {
        &self.all_features
    }

    /// Class labels parallel to [`all_features`](Self::all_features).
    pub fn all_classes(&self) -> &[ClassId] {
        &self.all_classes
    }

    fn read_bundle(&self, path: &Path) -> Result<(ModelWrapper, TraindataInfo), ModelError> {
        let bytes = fs::read(path)?;
        let envelope: Envelope = bincode::deserialize(&bytes)?;
        let actual = sha256_hex(&envelope.payload);
        if actual != envelope.sha256 {
            return Err(ModelError::ChecksumMismatch {
                path: path.display().to_string(),
                expected: envelope.sha256,
                actual,
            });
        }
        Ok(bincode::deserialize(&envelope.payload)?)
    }

    /// Loads the persisted model of `kind`.
    ///
    /// Never fails: a missing, corrupt, unfitted or wrongly typed bundle
    /// yields `None` and an empty traindata info.
    pub fn load_model(&self, kind: ModelKind) -> (Option<SavedModel>, TraindataInfo) {
        let path = self.model_path(kind);
        if !path.exists() {
            log::info!("No saved {} at {:?}", kind, path);
            return (None, TraindataInfo::default());
        }

        match self.read_bundle(path) {
            Ok((wrapper, _)) if wrapper.name.kind() != kind => {
                log::warn!(
                    "File {:?} holds a {} instead of a {}; ignoring it",
                    path,
                    wrapper.name.kind(),
                    kind
                );
                (None, TraindataInfo::default())
            }
            Ok((wrapper, _)) if !wrapper.name.is_fitted() => {
                log::warn!("Saved {} at {:?} is not fitted; ignoring it", kind, path);
                (None, TraindataInfo::default())
            }
            Ok((wrapper, info)) => {
                log::info!("Loaded {} from {:?} (traindata {} {})", kind, path, info.name, info.date);
                (Some(wrapper.name), info)
            }
            Err(e) => {
                log::warn!("Failed to load {} from {:?}: {}", kind, path, e);
                (None, TraindataInfo::default())
            }
        }
    }

    /// Persists `model` with its traindata info, replacing any existing file
    /// in one rename.
    pub fn save_model(&self, model: &SavedModel, info: &TraindataInfo) -> Result<PathBuf, ModelError> {
        let kind = model.kind();
        let path = self.model_path(kind).to_path_buf();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let wrapper = ModelWrapper { name: model.clone() };
        let payload = bincode::serialize(&(&wrapper, info))?;
        let envelope = Envelope {
            sha256: sha256_hex(&payload),
            payload,
        };
        let bytes = bincode::serialize(&envelope)?;

        if path.exists() {
            log::info!("Overwriting existing {} at {:?}", kind, path);
        }
        let tmp_path = path.with_extension("tmp");
        fs::write(&tmp_path, &bytes)?;
        fs::rename(&tmp_path, &path)?;
        log::info!("Saved {} ({} bytes) to {:?}", kind, bytes.len(), path);
        Ok(path)
    }

    /// Persists both models of `model` with its traindata info.
    pub fn save(&self, model: &Model) -> Result<(), ModelError> {
        self.save_model(&SavedModel::Vectorizer(model.vectorizer.clone()), &model.traindata)?;
        self.save_model(&SavedModel::Classifier(model.knn.clone()), &model.traindata)?;
        Ok(())
    }

    /// File name and modification time of the training data. Both empty if
    /// the file cannot be inspected.
    pub fn traindata_fingerprint(&self) -> TraindataInfo {
        let modified = fs::metadata(&self.traindata_path).and_then(|meta| meta.modified());
        match modified {
            Ok(modified) => {
                let name = self
                    .traindata_path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let date = DateTime::<Local>::from(modified).format(DATE_FORMAT).to_string();
                TraindataInfo::new(name, date)
            }
            Err(e) => {
                log::warn!(
                    "Cannot inspect training data {:?}: {}. Fingerprint left empty.",
                    self.traindata_path,
                    e
                );
                TraindataInfo::default()
            }
        }
    }

    /// Collects every reason the loaded models cannot be reused.
    pub fn retrain_reasons(
        &self,
        vectorizer: Option<&TfidfVectorizer>,
        tfidf_info: &TraindataInfo,
        knn: Option<&KnnClassifier>,
        knn_info: &TraindataInfo,
        current: &TraindataInfo,
    ) -> Vec<RetrainReason> {
        let mut reasons = Vec::new();
        if vectorizer.is_none() {
            reasons.push(RetrainReason::Missing(ModelKind::Vectorizer));
        }
        if knn.is_none() {
            reasons.push(RetrainReason::Missing(ModelKind::Classifier));
        }
        if vectorizer.is_some() && tfidf_info != current {
            reasons.push(RetrainReason::StaleTraindata(ModelKind::Vectorizer));
        }
        if knn.is_some() && knn_info != current {
            reasons.push(RetrainReason::StaleTraindata(ModelKind::Classifier));
        }
        if vectorizer.is_some() && !check_configvalues(&self.tfidf_config, vectorizer) {
            reasons.push(RetrainReason::ConfigMismatch(ModelKind::Vectorizer));
        }
        if knn.is_some() && !check_configvalues(&self.knn_config, knn) {
            reasons.push(RetrainReason::ConfigMismatch(ModelKind::Classifier));
        }
        reasons
    }

    fn bundle_state(reasons: &[RetrainReason]) -> ModelState {
        if reasons.is_empty() {
            ModelState::LoadedFresh
        } else if reasons.iter().any(|r| matches!(r, RetrainReason::Missing(_))) {
            ModelState::TrainingRequired
        } else {
            ModelState::LoadedStale
        }
    }

    /// Returns a ready model: the persisted pair if both are present, fresh
    /// and configured as expected, otherwise a newly trained and saved pair.
    pub fn initialize_model<P>(
        &mut self,
        provider: &P,
        manager: &ClassifyUnitManager,
    ) -> anyhow::Result<Model>
    where
        P: TrainingDataProvider + ?Sized,
    {
        let (tfidf, tfidf_info) = self.load_model(ModelKind::Vectorizer);
        let (knn, knn_info) = self.load_model(ModelKind::Classifier);
        let vectorizer = tfidf.and_then(SavedModel::into_vectorizer);
        let knn = knn.and_then(SavedModel::into_classifier);

        let current = self.traindata_fingerprint();
        let reasons = self.retrain_reasons(
            vectorizer.as_ref(),
            &tfidf_info,
            knn.as_ref(),
            &knn_info,
            &current,
        );
        self.state = Self::bundle_state(&reasons);

        if let (ModelState::LoadedFresh, Some(vectorizer), Some(knn)) = (self.state, vectorizer, knn) {
            log::info!("Reusing saved models trained on {} ({})", tfidf_info.name, tfidf_info.date);
            return Ok(Model::new(vectorizer, knn, tfidf_info, false));
        }

        for reason in &reasons {
            log::warn!("Retraining models: {:?}", reason);
        }

        let mut samples = provider
            .get_traindata()
            .context("Failed to obtain training data")?;
        self.prepare_traindata(&mut samples, manager);
        self.prepare_lists(&samples);

        let (vectorizer, tfidf_train) = start_tfidf(&self.all_features, &self.tfidf_config)
            .context("Failed to fit tfidf vectorizer")?;
        let knn = start_knn(tfidf_train, &self.all_classes, &self.knn_config)
            .context("Failed to fit knn classifier")?;

        let model = Model::new(vectorizer, knn, current, true);
        if let Err(e) = self.save(&model) {
            log::error!("Failed to persist retrained models: {}", e);
        }
        self.state = ModelState::LoadedFresh;
        Ok(model)
    }

    /// Builds the training unit of every sample.
    pub fn prepare_traindata(&self, samples: &mut [TrainingSample], manager: &ClassifyUnitManager) {
        for sample in samples.iter_mut() {
            manager.generate_train_cus(sample);
        }
    }

    /// Appends the feature string and label of every processed sample.
    pub fn prepare_lists(&mut self, samples: &[TrainingSample]) {
        for cu in samples.iter().filter_map(|s| s.children2.as_ref()) {
            self.all_features.push(cu.featureunits().join(" "));
            self.all_classes.push(cu.class_id);
        }
        log::debug!("Training lists hold {} samples", self.all_features.len());
    }
}
