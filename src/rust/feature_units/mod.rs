//! Feature-unit generation: tokenization, normalization, stopword removal,
//! stemming and n-grams, applied step by step to a classify-unit.

pub mod convert;
pub mod error;
pub mod stopwords;

use std::sync::Arc;

use log::warn;

use crate::config::{Config, FusConfig};

pub use convert::{SnowballStemmer, TokenStemmer};
pub use error::FeatureUnitError;
pub use stopwords::StopwordSet;

/// Anything whose feature-units are rewritten by the pipeline.
pub trait FeatureUnits {
    fn featureunits(&self) -> &[String];

    /// Replaces the feature-units wholesale.
    fn set_featureunits(&mut self, fus: Vec<String>);
}

impl FeatureUnits for Vec<String> {
    fn featureunits(&self) -> &[String] {
        self
    }

    fn set_featureunits(&mut self, fus: Vec<String>) {
        *self = fus;
    }
}

/// Runs the feature-unit steps in order, committing each step's output back
/// into the unit before the next step reads it.
pub struct FeatureUnitPipeline {
    config: FusConfig,
    stopwords: Arc<StopwordSet>,
    stemmer: Box<dyn TokenStemmer>,
}

impl std::fmt::Debug for FeatureUnitPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureUnitPipeline")
            .field("config", &self.config)
            .field("stopwords", &self.stopwords.len())
            .finish()
    }
}

impl FeatureUnitPipeline {
    /// Creates a pipeline with the German Snowball stemmer.
    pub fn new(config: FusConfig, stopwords: Arc<StopwordSet>) -> Self {
        Self {
            config,
            stopwords,
            stemmer: Box::new(SnowballStemmer::german()),
        }
    }

    /// Creates a pipeline from the `fus_config` section, using the
    /// process-wide stopword set loaded from `resources.stopwords_path`.
    pub fn from_config(config: &Config) -> Self {
        let stopwords = StopwordSet::shared(&config.resources.stopwords_path);
        Self::new(config.fus_config.clone(), stopwords)
    }

    /// Swaps in a different stemming algorithm.
    pub fn with_stemmer(mut self, stemmer: Box<dyn TokenStemmer>) -> Self {
        self.stemmer = stemmer;
        self
    }

    pub fn config(&self) -> &FusConfig {
        &self.config
    }

    pub fn stopwords(&self) -> &StopwordSet {
        &self.stopwords
    }

    /// Turns the seeded feature-units of `cu` into its final feature-units.
    ///
    /// An empty tokenization ends processing with a warning. A failing step
    /// is logged and leaves the previously committed feature-units in place.
    pub fn get_featureunits<U: FeatureUnits + ?Sized>(&self, cu: &mut U) {
        let fus = convert::tokenize(&cu.featureunits().join(" "));
        cu.set_featureunits(fus);
        if cu.featureunits().is_empty() {
            warn!("The current classify-unit is empty after tokenization. Prediction for this paragraph will be problematic.");
            return;
        }

        Self::commit(cu, "normalization", |fus| convert::normalize(fus, self.config.normalize));
        let fus = convert::filter_stopwords(cu.featureunits().to_vec(), self.config.filter_sw, &self.stopwords);
        cu.set_featureunits(fus);
        Self::commit(cu, "stemming", |fus| {
            convert::stem(fus, self.config.stem, self.stemmer.as_ref())
        });
        Self::commit(cu, "ngram-generation", |fus| {
            convert::gen_ngrams(fus, &self.config.n_grams, self.config.continuous_n_grams)
        });
    }

    /// Cleans `text` and runs every step on it.
    pub fn process(&self, text: &str) -> Vec<String> {
        let mut fus = vec![convert::replace(text)];
        self.get_featureunits(&mut fus);
        fus
    }

    fn commit<U, F>(cu: &mut U, step: &str, f: F)
    where
        U: FeatureUnits + ?Sized,
        F: FnOnce(Vec<String>) -> Result<Vec<String>, FeatureUnitError>,
    {
        match f(cu.featureunits().to_vec()) {
            Ok(fus) => cu.set_featureunits(fus),
            Err(e) => warn!(
                "While {} error {} raised. Continue without {} step for current paragraph.",
                step, e, step
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    fn pipeline(config: FusConfig, stopwords: &[&str]) -> FeatureUnitPipeline {
        FeatureUnitPipeline::new(config, Arc::new(StopwordSet::from_words(stopwords.iter().copied())))
    }

    fn plain_config() -> FusConfig {
        FusConfig {
            normalize: false,
            filter_sw: false,
            stem: false,
            n_grams: vec![],
            continuous_n_grams: false,
        }
    }

    #[test]
    fn test_token_stage_only() {
        let config = FusConfig { n_grams: vec![1], ..plain_config() };
        let mut fus = tokens(&["Java  Entwickler "]);
        pipeline(config, &[]).get_featureunits(&mut fus);
        assert_eq!(fus.len(), "JavaEntwickler".len());
    }

    #[test]
    fn test_full_pipeline() {
        let config = FusConfig {
            normalize: true,
            filter_sw: true,
            stem: true,
            n_grams: vec![3],
            continuous_n_grams: false,
        };
        let result = pipeline(config, &["und"]).process("Arbeiten und 2024 a");
        // "arbeiten" -> "arbeit", "und" dropped, "2024" -> "NUM" -> "num", "a" dropped
        assert_eq!(result, tokens(&["arb", "rbe", "bei", "eit", "num"]));
    }

    #[test]
    fn test_empty_tokenization_stops() {
        let mut fus = tokens(&[" "]);
        pipeline(FusConfig::default(), &[]).get_featureunits(&mut fus);
        assert!(fus.is_empty());
    }

    #[test]
    fn test_failed_step_keeps_previous_units() {
        let config = FusConfig { n_grams: vec![2, 0], ..plain_config() };
        let mut fus = tokens(&["abc de"]);
        pipeline(config, &[]).get_featureunits(&mut fus);
        assert_eq!(fus, tokens(&["abc", "de"]));
    }

    #[test]
    fn test_stopwords_see_normalized_tokens() {
        let config = FusConfig { normalize: true, filter_sw: true, ..plain_config() };
        let result = pipeline(config, &["Der"]).process("Der Hund der Katze");
        assert_eq!(result, tokens(&["hund", "katze"]));
    }

    #[test]
    fn test_continuous_ngrams_through_pipeline() {
        let config = FusConfig { n_grams: vec![2], continuous_n_grams: true, ..plain_config() };
        let result = pipeline(config, &[]).process("abc, de");
        assert_eq!(result, tokens(&["ab", "bc", "c ", " d", "de"]));
    }
}
