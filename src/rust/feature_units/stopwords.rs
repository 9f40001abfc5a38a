use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::{Arc, OnceLock};

use log::{info, warn};

static SHARED: OnceLock<Arc<StopwordSet>> = OnceLock::new();

/// Stopwords read from a lookup file, one word per line.
///
/// `Unavailable` is the failure state recorded when the list could not be
/// read. It disables filtering instead of raising.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopwordSet {
    Loaded(HashSet<String>),
    Unavailable,
}

impl StopwordSet {
    /// Reads the stopword list at `path`.
    ///
    /// Lines are trimmed and lowercased, blank lines are skipped. A missing or
    /// unreadable file yields [`StopwordSet::Unavailable`].
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(content) => {
                let set = Self::from_words(content.lines());
                info!("Loaded {} stopwords from {:?}", set.len(), path);
                set
            }
            Err(e) => {
                warn!("Error {} is raised reading stopwords from {:?}. Continue without stopwords removal.", e, path);
                Self::Unavailable
            }
        }
    }

    /// Builds a set from in-memory words.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        Self::Loaded(set)
    }

    /// Returns the process-wide stopword set, loading it on first use.
    ///
    /// The first caller's path wins; later calls get the cached set whatever
    /// path they pass, including the `Unavailable` state.
    pub fn shared<P: AsRef<Path>>(path: P) -> Arc<Self> {
        Arc::clone(SHARED.get_or_init(|| Arc::new(Self::load(path))))
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }

    pub fn contains(&self, token: &str) -> bool {
        match self {
            Self::Loaded(set) => set.contains(token),
            Self::Unavailable => false,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Loaded(set) => set.len(),
            Self::Unavailable => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every occurrence of every stopword, keeping survivor order.
    pub fn filter(&self, fus: Vec<String>) -> Vec<String> {
        match self {
            Self::Loaded(set) => fus.into_iter().filter(|fu| !set.contains(fu)).collect(),
            Self::Unavailable => fus,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn tokens(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_removes_every_occurrence() {
        let stopwords = StopwordSet::from_words(["der"]);
        let result = stopwords.filter(tokens(&["der", "hund", "der"]));
        assert_eq!(result, tokens(&["hund"]));
    }

    #[test]
    fn test_list_is_lowercased_and_trimmed() {
        let stopwords = StopwordSet::from_words(["Und  ", "", "  DIE"]);
        assert_eq!(stopwords.len(), 2);
        assert!(stopwords.contains("und"));
        assert!(stopwords.contains("die"));
        // tokens are compared as given
        assert_eq!(stopwords.filter(tokens(&["Und", "und"])), tokens(&["Und"]));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "der\ndie \ndas").unwrap();
        let stopwords = StopwordSet::load(file.path());
        assert!(stopwords.is_available());
        assert_eq!(stopwords.len(), 3);
    }

    #[test]
    fn test_missing_file_disables_filtering() {
        let stopwords = StopwordSet::load("/nonexistent/stopwords.txt");
        assert_eq!(stopwords, StopwordSet::Unavailable);
        assert_eq!(stopwords.filter(tokens(&["der", "hund"])), tokens(&["der", "hund"]));
    }
}
