//! Paragraph-level preprocessing and classifier caching for job advertisements.
//!
//! Job ads are split into paragraphs ("classify-units"), each paragraph is
//! turned into feature-units by a configurable pipeline (tokenize, normalize,
//! stopword filtering, stemming, character n-grams), vectorized with TF-IDF
//! and classified with KNN. Fitted models are persisted and reused as long as
//! their configuration and training data are unchanged.
//!
//! # Basic Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use jobad_units::{FeatureUnitPipeline, FusConfig, StopwordSet};
//!
//! let config = FusConfig {
//!     stem: false,
//!     n_grams: vec![3],
//!     ..FusConfig::default()
//! };
//! let stopwords = Arc::new(StopwordSet::from_words(["wir"]));
//! let pipeline = FeatureUnitPipeline::new(config, stopwords);
//!
//! let fus = pipeline.process("Wir bieten flexible Arbeitszeiten!");
//! assert!(fus.contains(&"bie".to_string()));
//! assert!(!fus.contains(&"wir".to_string()));
//! ```
//!
//! # Training and Classification
//!
//! ```rust,no_run
//! # fn main() -> anyhow::Result<()> {
//! use jobad_units::{classify, ClassifyUnitManager, Config, JobAd, ModelCache, TraindataFile, UnitArena};
//!
//! let config = Config::from_file("config.yaml")?;
//! let manager = ClassifyUnitManager::from_config(&config);
//! let mut cache = ModelCache::new(&config);
//! let model = cache.initialize_model(&TraindataFile::new(&config.resources.traindata_path), &manager)?;
//!
//! let mut arena = UnitArena::new();
//! let mut jobad = JobAd::new(1, "Deine Aufgaben:\n- Entwicklung\n- Tests");
//! manager.generate_classifyunits(&mut jobad, &mut arena, &model);
//! classify(&jobad, &mut arena, &model);
//! # Ok(())
//! # }
//! ```

pub mod classify_units;
pub mod config;
pub mod feature_units;
pub mod model_cache;
pub mod training;

pub use classify_units::{
    classify, ClassId, ClassifyUnit, ClassifyUnitManager, ClassifyUnitTrain, JobAd,
    LineParagraphSplitter, ParagraphSplitter, UnitArena, UnitId, UNCLASSIFIED,
};
pub use config::{Config, ConfigError, FusConfig};
pub use feature_units::{FeatureUnitError, FeatureUnitPipeline, FeatureUnits, StopwordSet};
pub use model_cache::{ModelCache, ModelError, ModelState, RetrainReason};
pub use training::{
    KnnClassifier, Model, ModelKind, SavedModel, TfidfVectorizer, TraindataFile, TraindataInfo,
    TrainingDataProvider, TrainingSample,
};

pub fn init_logger() {
    env_logger::init();
}
