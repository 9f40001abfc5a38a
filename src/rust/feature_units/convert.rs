//! The individual feature-unit steps: cleaning, tokenization, normalization,
//! stopword removal, stemming and n-gram generation.
//!
//! Every step is a plain function over owned token lists so the orchestrator
//! can commit each result back into the unit before running the next one.

use lazy_static::lazy_static;
use log::warn;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};

use super::error::FeatureUnitError;
use super::stopwords::StopwordSet;

lazy_static! {
    static ref NON_WORD: Result<Regex, regex::Error> = Regex::new(r"\W+");
    static ref WORD: Result<Regex, regex::Error> = Regex::new(r"\w+");
}

/// Marker that replaces tokens starting and ending with a digit.
pub const NUM_MARKER: &str = "NUM";

/// Replaces every run of non-word characters with a single space.
///
/// Returns the paragraph unchanged if the pattern is unavailable.
pub fn replace(para: &str) -> String {
    match NON_WORD.as_ref() {
        Ok(re) => re.replace_all(para, " ").into_owned(),
        Err(e) => {
            warn!("Cleaning pattern unavailable ({}). Paragraph kept as is.", e);
            para.to_string()
        }
    }
}

/// Splits text into runs of word characters, falling back to whitespace
/// splitting when the word pattern is unavailable.
pub fn tokenize(text: &str) -> Vec<String> {
    match WORD.as_ref() {
        Ok(re) => re.find_iter(text).map(|m| m.as_str().to_string()).collect(),
        Err(e) => {
            warn!("Token pattern unavailable ({}). Falling back to whitespace split.", e);
            text.split_whitespace().map(str::to_string).collect()
        }
    }
}

/// Lowercases tokens, collapses numeric tokens to [`NUM_MARKER`] and keeps
/// only tokens longer than one character.
///
/// # Errors
/// `NormalizeError` if an empty token is encountered.
pub fn normalize(fus: Vec<String>, normalize: bool) -> Result<Vec<String>, FeatureUnitError> {
    if !normalize {
        return Ok(fus);
    }

    let mut norm_fus = Vec::with_capacity(fus.len());
    for (pos, fu) in fus.into_iter().enumerate() {
        let mut fu = fu.to_lowercase();
        let (first, last) = match (fu.chars().next(), fu.chars().last()) {
            (Some(first), Some(last)) => (first, last),
            _ => {
                return Err(FeatureUnitError::NormalizeError(format!(
                    "empty token at position {}",
                    pos
                )))
            }
        };
        if first.is_ascii_digit() && last.is_ascii_digit() {
            fu = NUM_MARKER.to_string();
        }
        if fu.chars().count() > 1 {
            norm_fus.push(fu);
        }
    }
    Ok(norm_fus)
}

/// Drops stopwords when `filter_sw` is set.
pub fn filter_stopwords(fus: Vec<String>, filter_sw: bool, stopwords: &StopwordSet) -> Vec<String> {
    if filter_sw {
        stopwords.filter(fus)
    } else {
        fus
    }
}

/// A stemming algorithm applied token by token.
pub trait TokenStemmer: Send + Sync {
    fn stem_token(&self, token: &str) -> Result<String, FeatureUnitError>;
}

/// Snowball stemmer, German by default. Tokens are lowercased before
/// stemming since the Snowball algorithms only handle lowercase input.
pub struct SnowballStemmer {
    stemmer: Stemmer,
    algorithm: Algorithm,
}

impl SnowballStemmer {
    pub fn new(algorithm: Algorithm) -> Self {
        Self {
            stemmer: Stemmer::create(algorithm),
            algorithm,
        }
    }

    pub fn german() -> Self {
        Self::new(Algorithm::German)
    }
}

impl Default for SnowballStemmer {
    fn default() -> Self {
        Self::german()
    }
}

impl Clone for SnowballStemmer {
    fn clone(&self) -> Self {
        Self::new(self.algorithm)
    }
}

impl std::fmt::Debug for SnowballStemmer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnowballStemmer")
            .field("algorithm", &self.algorithm)
            .finish()
    }
}

impl TokenStemmer for SnowballStemmer {
    fn stem_token(&self, token: &str) -> Result<String, FeatureUnitError> {
        Ok(self.stemmer.stem(&token.to_lowercase()).into_owned())
    }
}

/// Stems every token and drops empty stems.
pub fn stem(
    fus: Vec<String>,
    stem: bool,
    stemmer: &dyn TokenStemmer,
) -> Result<Vec<String>, FeatureUnitError> {
    if !stem {
        return Ok(fus);
    }

    let mut stemmed_fus = Vec::with_capacity(fus.len());
    for token in &fus {
        stemmed_fus.push(stemmer.stem_token(token)?);
    }
    stemmed_fus.retain(|s| !s.is_empty());
    Ok(stemmed_fus)
}

/// All character n-grams of `text`, in order. Empty when `text` is shorter than `n`.
fn char_ngrams(text: &str, n: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if n == 0 || chars.len() < n {
        return Vec::new();
    }
    chars.windows(n).map(|w| w.iter().collect()).collect()
}

/// Generates character n-grams for every configured length.
///
/// With `continuous` unset, grams are built per token: the outer loop runs
/// over `ngram_numbers`, the inner loop over tokens. With `continuous` set,
/// tokens are joined by single spaces and grams may span token borders.
///
/// Without configured lengths the tokens are returned unchanged.
///
/// # Errors
/// `NgramError` if any configured length is zero; the caller keeps its
/// previous feature-units in that case.
pub fn gen_ngrams(
    fus: Vec<String>,
    ngram_numbers: &[usize],
    continuous: bool,
) -> Result<Vec<String>, FeatureUnitError> {
    if ngram_numbers.is_empty() {
        return Ok(fus);
    }
    if let Some(pos) = ngram_numbers.iter().position(|&n| n == 0) {
        return Err(FeatureUnitError::NgramError(format!(
            "n-gram length at position {} must be a positive integer",
            pos
        )));
    }

    let mut ngrams_complete = Vec::new();
    if continuous {
        let onestring = fus.join(" ");
        for &n in ngram_numbers {
            ngrams_complete.extend(char_ngrams(&onestring, n));
        }
    } else {
        for &n in ngram_numbers {
            for fu in &fus {
                ngrams_complete.extend(char_ngrams(fu, n));
            }
        }
    }
    Ok(ngrams_complete)
}
