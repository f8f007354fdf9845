// Word lists: the abusive-word corpora the matcher is compiled from.
//
// Each supported alphabet ships as a flat text file with one word or phrase
// per line. Lists are read once at startup and never change afterwards.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

/// Failure to produce a usable matcher from the word lists.
///
/// Any of these leaves the matcher uncompiled, and the process must not
/// accept moderation calls.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read word list {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no words left to compile after loading {lists} word list(s)")]
    Empty { lists: usize },

    #[error("failed to compile profanity pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// An immutable, ordered list of abusive words from one corpus.
#[derive(Debug, Clone)]
pub struct WordList {
    source: String,
    words: Vec<String>,
}

impl WordList {
    /// Read a word list from disk, one entry per line.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let content = std::fs::read_to_string(path).map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let list = Self::from_words(path.display().to_string(), content.lines());
        debug!(source = %list.source, words = list.len(), "Loaded word list");
        Ok(list)
    }

    /// Build a word list from in-memory entries.
    ///
    /// Entries are trimmed and blank ones dropped.
    pub fn from_words<I, S>(source: impl Into<String>, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_string())
            .filter(|w| !w.is_empty())
            .collect();

        Self {
            source: source.into(),
            words,
        }
    }

    /// Where this list came from (file path or a caller-supplied label).
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Load every list at `paths`, failing on the first unreadable one.
pub fn load_all(paths: &[PathBuf]) -> Result<Vec<WordList>, LoadError> {
    paths.iter().map(|p| WordList::load(p)).collect()
}

/// Merge several lists into one sequence, keeping first-seen order and
/// dropping case-insensitive duplicates.
pub fn merge(lists: &[WordList]) -> Vec<&str> {
    let mut seen = HashSet::new();
    lists
        .iter()
        .flat_map(|list| list.words.iter())
        .filter(|w| seen.insert(w.to_lowercase()))
        .map(String::as_str)
        .collect()
}
