use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, info};
use serde::Deserialize;

use crate::classify_units::{ClassId, ClassifyUnitTrain};

/// One labelled training record as stored in the training-data file.
#[derive(Debug, Clone, Deserialize)]
struct TraindataRecord {
    #[serde(default)]
    id: i64,
    #[serde(rename = "classID")]
    class_id: ClassId,
    content: String,
}

/// A labelled paragraph and, once processed, its training unit.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSample {
    pub id: i64,
    pub class_id: ClassId,
    pub content: String,
    pub children2: Option<ClassifyUnitTrain>,
}

impl TrainingSample {
    pub fn new(id: i64, class_id: ClassId, content: impl Into<String>) -> Self {
        Self {
            id,
            class_id,
            content: content.into(),
            children2: None,
        }
    }
}

impl From<TraindataRecord> for TrainingSample {
    fn from(record: TraindataRecord) -> Self {
        Self::new(record.id, record.class_id, record.content)
    }
}

/// Source of labelled training samples.
pub trait TrainingDataProvider {
    fn get_traindata(&self) -> Result<Vec<TrainingSample>>;
}

impl TrainingDataProvider for Vec<TrainingSample> {
    fn get_traindata(&self) -> Result<Vec<TrainingSample>> {
        Ok(self.clone())
    }
}

/// Training data read from a file holding either a JSON array of records or
/// one JSON record per line.
#[derive(Debug, Clone)]
pub struct TraindataFile {
    path: PathBuf,
}

impl TraindataFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parse(&self, content: &str) -> Result<Vec<TraindataRecord>> {
        if content.trim_start().starts_with('[') {
            return serde_json::from_str(content)
                .with_context(|| format!("Invalid JSON array in {}", self.path.display()));
        }

        content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| {
                serde_json::from_str(line).with_context(|| {
                    format!("Invalid record on line {} of {}", i + 1, self.path.display())
                })
            })
            .collect()
    }
}

impl TrainingDataProvider for TraindataFile {
    fn get_traindata(&self) -> Result<Vec<TrainingSample>> {
        info!("Reading training data from {}", self.path.display());
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read training data {}", self.path.display()))?;
        let samples: Vec<TrainingSample> = self.parse(&content)?.into_iter().map(Into::into).collect();
        debug!("Read {} training samples", samples.len());
        Ok(samples)
    }
}
