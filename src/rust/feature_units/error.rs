use std::fmt;

/// Errors raised by a single feature-unit processing step.
///
/// None of these ever leave the pipeline: the orchestrator logs them and keeps
/// the feature-units committed by the previous step.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureUnitError {
    /// The paragraph could not be split into tokens
    TokenizeError(String),
    /// A token could not be normalized (e.g. an empty token)
    NormalizeError(String),
    /// The stemmer rejected a token
    StemError(String),
    /// N-gram generation was configured with an unusable length
    NgramError(String),
}

impl fmt::Display for FeatureUnitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TokenizeError(msg) => write!(f, "Tokenize error: {}", msg),
            Self::NormalizeError(msg) => write!(f, "Normalize error: {}", msg),
            Self::StemError(msg) => write!(f, "Stem error: {}", msg),
            Self::NgramError(msg) => write!(f, "N-gram error: {}", msg),
        }
    }
}

impl std::error::Error for FeatureUnitError {}
