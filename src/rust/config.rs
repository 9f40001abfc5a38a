use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::training::Params;

/// Settings for the whole preparation and training process.
///
/// Mirrors the layout of the `config.yaml` the service is deployed with:
///
/// ```yaml
/// models:
///   tfidf_path: models/model_tfidf.bin
///   knn_path: models/model_knn.bin
/// tfidf_config:
///   use_idf: true
/// knn_config:
///   n_neighbors: 5
/// resources:
///   traindata_path: resources/traindata.jsonl
///   stopwords_path: resources/stopwords.txt
/// fus_config:
///   normalize: true
///   filterSW: true
///   stem: true
///   nGrams: [3, 4]
///   continuousNGrams: false
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub models: ModelPaths,
    pub tfidf_config: Params,
    pub knn_config: Params,
    pub resources: Resources,
    pub fus_config: FusConfig,
}

/// Where the fitted vectorizer and classifier are persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelPaths {
    pub tfidf_path: PathBuf,
    pub knn_path: PathBuf,
}

impl Default for ModelPaths {
    fn default() -> Self {
        let dir = Config::get_default_models_dir();
        Self {
            tfidf_path: dir.join("model_tfidf.bin"),
            knn_path: dir.join("model_knn.bin"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Resources {
    pub traindata_path: PathBuf,
    pub stopwords_path: PathBuf,
}

impl Default for Resources {
    fn default() -> Self {
        Self {
            traindata_path: PathBuf::from("resources/traindata.jsonl"),
            stopwords_path: PathBuf::from("resources/stopwords.txt"),
        }
    }
}

/// Switches for the feature-unit pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusConfig {
    pub normalize: bool,
    #[serde(rename = "filterSW")]
    pub filter_sw: bool,
    pub stem: bool,
    /// Character n-gram lengths, generated in this order
    #[serde(rename = "nGrams")]
    pub n_grams: Vec<usize>,
    /// Builds n-grams over the space-joined tokens. Grams containing a space
    /// are split again by the TF-IDF analyzer, so they reach the vectorizer
    /// as their whitespace-separated pieces.
    #[serde(rename = "continuousNGrams")]
    pub continuous_n_grams: bool,
}

impl Default for FusConfig {
    fn default() -> Self {
        Self {
            normalize: true,
            filter_sw: true,
            stem: true,
            n_grams: vec![3, 4],
            continuous_n_grams: false,
        }
    }
}

impl Config {
    /// Loads configuration from a `.yaml`, `.yml` or `.json` file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::FileError(format!("{}: {}", path.display(), e)))?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let config = match ext {
            "yaml" | "yml" => Self::from_yaml_str(&content)?,
            "json" => serde_json::from_str(&content)
                .map_err(|e| ConfigError::ParseError(e.to_string()))?,
            _ => return Err(ConfigError::UnsupportedFormat(ext.to_string())),
        };
        log::info!("Configuration loaded from {:?}", path);
        Ok(config)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Returns the default directory for persisted models
    pub fn get_default_models_dir() -> PathBuf {
        // 1. Check environment variable
        if let Ok(path) = env::var("JOBAD_UNITS_CACHE") {
            return PathBuf::from(path).join("models");
        }

        // 2. Use platform-specific cache directory
        if let Some(cache_dir) = dirs::cache_dir() {
            return cache_dir.join("jobad-units").join("models");
        }

        // 3. Fallback to user's home directory
        if let Some(home_dir) = dirs::home_dir() {
            return home_dir.join(".cache").join("jobad-units").join("models");
        }

        env::temp_dir().join("jobad-units").join("models")
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("File error: {0}")]
    FileError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),
}
