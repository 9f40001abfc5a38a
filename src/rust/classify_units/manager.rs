use std::collections::HashSet;

use log::{debug, warn};

use super::feature_vectors::get_featurevectors;
use super::paragraphs::{LineParagraphSplitter, ParagraphSplitter};
use super::{ClassifyUnit, ClassifyUnitTrain, JobAd, UnitArena};
use crate::config::Config;
use crate::feature_units::{convert, FeatureUnitPipeline, FeatureUnits};
use crate::training::{Model, TrainingSample};

/// Turns job ads and training samples into processed classify-units.
#[derive(Debug)]
pub struct ClassifyUnitManager {
    pipeline: FeatureUnitPipeline,
    splitter: Box<dyn ParagraphSplitter>,
}

impl ClassifyUnitManager {
    pub fn new(pipeline: FeatureUnitPipeline) -> Self {
        Self {
            pipeline,
            splitter: Box::new(LineParagraphSplitter::new()),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(FeatureUnitPipeline::from_config(config))
    }

    pub fn with_splitter(mut self, splitter: Box<dyn ParagraphSplitter>) -> Self {
        self.splitter = splitter;
        self
    }

    pub fn pipeline(&self) -> &FeatureUnitPipeline {
        &self.pipeline
    }

    /// Splits the job ad into paragraphs and creates or refreshes one
    /// classify-unit per distinct paragraph, then computes feature-units and
    /// feature vectors for every child.
    ///
    /// A paragraph that matches an existing child updates that child; the job
    /// ad never holds two units with the same paragraph.
    pub fn generate_classifyunits(&self, jobad: &mut JobAd, arena: &mut UnitArena, model: &Model) {
        let paragraphs = self
            .splitter
            .clean_paragraphs(self.splitter.get_paragraphs(&jobad.content));

        let mut seeded = HashSet::new();
        for para in paragraphs {
            let fus = convert::replace(&para);
            // a seed of bare spaces would only tokenize to nothing
            if fus.trim().is_empty() {
                warn!("Paragraph '{}' is empty after cleaning. No classify-unit generated.", para);
                continue;
            }

            let existing = jobad.find_child(arena, &para).and_then(|id| {
                arena.get_mut(id).map(|cu| {
                    cu.set_featureunits(vec![fus.clone()]);
                    id
                })
            });
            let id = match existing {
                Some(id) => id,
                None => {
                    let mut cu = ClassifyUnit::new(para);
                    cu.set_featureunits(vec![fus]);
                    let id = arena.insert(cu);
                    jobad.attach(id);
                    id
                }
            };
            seeded.insert(id);
        }

        for &id in jobad.children() {
            let Some(cu) = arena.get_mut(id) else {
                continue;
            };
            if !seeded.contains(&id) {
                cu.reseed();
            }
            self.pipeline.get_featureunits(cu);
            get_featurevectors(cu, model);
        }
        debug!("Job ad {} has {} classify-units", jobad.id, jobad.children().len());
    }

    /// Builds the single training unit of `sample` and runs the feature-unit
    /// pipeline on it. Leaves `children2` untouched if the content is empty
    /// after cleaning.
    pub fn generate_train_cus(&self, sample: &mut TrainingSample) {
        let fus = convert::replace(&sample.content);
        // blank seeds count as empty, same as on the job ad path
        if fus.trim().is_empty() {
            warn!(
                "Training sample {} is empty after cleaning. No classify-unit generated.",
                sample.id
            );
            return;
        }

        let mut cu = ClassifyUnitTrain::new(sample.content.clone(), sample.class_id);
        cu.set_featureunits(vec![fus]);
        self.pipeline.get_featureunits(&mut cu);
        sample.children2 = Some(cu);
    }
}

/// Assigns each unit of `jobad` the class predicted from its feature vector
/// and returns how many units were classified. Units without a feature
/// vector keep their class id.
pub fn classify(jobad: &JobAd, arena: &mut UnitArena, model: &Model) -> usize {
    let mut classified = 0;
    for &id in jobad.children() {
        let Some(cu) = arena.get_mut(id) else {
            continue;
        };
        let Some(vector) = cu.featurevector.as_ref() else {
            continue;
        };
        match model.predict(vector) {
            Ok(class_id) => {
                cu.class_id = class_id;
                classified += 1;
            }
            Err(e) => warn!("Prediction for paragraph '{}' failed: {}", cu.paragraph(), e),
        }
    }
    classified
}
