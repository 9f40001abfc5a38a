use std::fs;
use std::path::Path;
use std::sync::Arc;

use env_logger::Env;
use jobad_units::training::{Estimator, ParamValue};
use jobad_units::{
    ClassifyUnitManager, Config, FeatureUnitPipeline, FusConfig, ModelCache, ModelKind, ModelState,
    StopwordSet, TraindataFile, TrainingSample,
};
use tempfile::TempDir;

fn init_logger() {
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or("warn")).try_init();
}

const TRAINDATA: &str = r#"{"id": 1, "classID": 1, "content": "Entwicklung von Java Anwendungen"}
{"id": 2, "classID": 1, "content": "Programmierung in Python und Java"}
{"id": 3, "classID": 2, "content": "Flexible Arbeitszeiten und Homeoffice"}
{"id": 4, "classID": 2, "content": "Betriebliche Altersvorsorge und Obstkorb"}
{"id": 5, "classID": 3, "content": "Abgeschlossenes Studium der Informatik"}
"#;

fn setup(dir: &Path) -> Config {
    fs::write(dir.join("traindata.jsonl"), TRAINDATA).unwrap();
    let yaml = format!(
        r#"
models:
  tfidf_path: {dir}/model_tfidf.bin
  knn_path: {dir}/model_knn.bin
tfidf_config:
  use_idf: true
  norm: l2
knn_config:
  n_neighbors: 1
resources:
  traindata_path: {dir}/traindata.jsonl
  stopwords_path: {dir}/stopwords.txt
fus_config:
  normalize: true
  filterSW: true
  stem: true
  nGrams: [3]
  continuousNGrams: false
"#,
        dir = dir.display()
    );
    Config::from_yaml_str(&yaml).unwrap()
}

fn manager(config: &Config) -> ClassifyUnitManager {
    let stopwords = Arc::new(StopwordSet::from_words(["und", "der", "von", "in"]));
    ClassifyUnitManager::new(FeatureUnitPipeline::new(config.fus_config.clone(), stopwords))
}

#[test]
fn test_save_then_load_reuses_models() -> anyhow::Result<()> {
    init_logger();
    let dir = TempDir::new()?;
    let config = setup(dir.path());
    let manager = manager(&config);
    let traindata = TraindataFile::new(&config.resources.traindata_path);

    let mut cache = ModelCache::new(&config);
    let trained = cache.initialize_model(&traindata, &manager)?;
    assert!(trained.retrained());
    assert!(!trained.traindata.is_empty());

    let mut cache = ModelCache::new(&config);
    let loaded = cache.initialize_model(&traindata, &manager)?;
    assert!(!loaded.retrained());
    assert_eq!(cache.state(), ModelState::LoadedFresh);
    assert_eq!(loaded.traindata, trained.traindata);
    assert!(cache.all_features().is_empty());

    let params = loaded.knn.get_params();
    assert_eq!(params.get("n_neighbors"), Some(&ParamValue::Int(1)));
    let params = loaded.vectorizer.get_params();
    assert_eq!(params.get("norm"), Some(&ParamValue::Str("l2".into())));
    assert_eq!(loaded.vectorizer.vocabulary_len(), trained.vectorizer.vocabulary_len());
    Ok(())
}

#[test]
fn test_config_mismatch_retrains_both_models() -> anyhow::Result<()> {
    init_logger();
    let dir = TempDir::new()?;
    let mut config = setup(dir.path());
    let manager = manager(&config);
    let traindata = TraindataFile::new(&config.resources.traindata_path);
    ModelCache::new(&config).initialize_model(&traindata, &manager)?;

    config.knn_config.insert("n_neighbors".into(), ParamValue::Int(3));
    let mut cache = ModelCache::new(&config);
    let model = cache.initialize_model(&traindata, &manager)?;
    assert!(model.retrained());
    assert_eq!(model.knn.get_params().get("n_neighbors"), Some(&ParamValue::Int(3)));

    let (saved, _) = cache.load_model(ModelKind::Classifier);
    let saved = saved.and_then(|m| m.into_classifier()).unwrap();
    assert_eq!(saved.get_params().get("n_neighbors"), Some(&ParamValue::Int(3)));
    Ok(())
}

#[test]
fn test_corrupt_bundle_triggers_retraining() -> anyhow::Result<()> {
    init_logger();
    let dir = TempDir::new()?;
    let config = setup(dir.path());
    let manager = manager(&config);
    let traindata = TraindataFile::new(&config.resources.traindata_path);
    ModelCache::new(&config).initialize_model(&traindata, &manager)?;

    let bytes = fs::read(&config.models.tfidf_path)?;
    fs::write(&config.models.tfidf_path, &bytes[..bytes.len() / 2])?;

    let mut cache = ModelCache::new(&config);
    assert!(cache.load_model(ModelKind::Vectorizer).0.is_none());
    let model = cache.initialize_model(&traindata, &manager)?;
    assert!(model.retrained());
    assert!(cache.load_model(ModelKind::Vectorizer).0.is_some());
    Ok(())
}

#[test]
fn test_changed_fingerprint_triggers_retraining() -> anyhow::Result<()> {
    init_logger();
    let dir = TempDir::new()?;
    let config = setup(dir.path());
    let manager = manager(&config);
    let samples = vec![
        TrainingSample::new(1, 1, "Java Entwicklung"),
        TrainingSample::new(2, 2, "Flexible Arbeitszeiten"),
    ];
    let mut cache = ModelCache::new(&config);
    let model = cache.initialize_model(&samples, &manager)?;

    let mut stale = model.clone();
    stale.traindata.date = "1970-01-01 00:00:00".into();
    cache.save(&stale)?;

    let mut cache = ModelCache::new(&config);
    let model = cache.initialize_model(&samples, &manager)?;
    assert!(model.retrained());
    assert_eq!(model.traindata, cache.traindata_fingerprint());
    Ok(())
}

#[test]
fn test_unreadable_traindata_is_an_error() {
    init_logger();
    let dir = TempDir::new().unwrap();
    let config = setup(dir.path());
    let manager = manager(&config);
    let traindata = TraindataFile::new(dir.path().join("missing.jsonl"));

    let mut cache = ModelCache::new(&config);
    assert!(cache.initialize_model(&traindata, &manager).is_err());
    assert_eq!(cache.state(), ModelState::TrainingRequired);
}

#[test]
fn test_pipeline_settings_from_config() {
    let dir = TempDir::new().unwrap();
    let config = setup(dir.path());
    assert_eq!(
        config.fus_config,
        FusConfig {
            normalize: true,
            filter_sw: true,
            stem: true,
            n_grams: vec![3],
            continuous_n_grams: false,
        }
    );
}
