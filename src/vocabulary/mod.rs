use log::{info, warn};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// Lines starting with this character are treated as comments.
pub const COMMENT_MARKER: char = '.';

/// Failure modes when loading a vocabulary.
#[derive(Debug, Error)]
pub enum VocabularyError {
    #[error("failed to read vocabulary {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("vocabulary {0:?} contains no words")]
    Empty(PathBuf),
}

/// The closed, ordered set of words the game is played over.
/// A word's index is stable and lines up with its row in the embedding matrix.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    words: Vec<String>,
    /// Index of the first occurrence of each word.
    positions: HashMap<String, usize>,
}

impl Vocabulary {
    /// Load a line-delimited word list from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, VocabularyError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| VocabularyError::Io {
            path: path.to_owned(),
            source,
        })?;
        let vocabulary =
            Vocabulary::parse(&contents).ok_or_else(|| VocabularyError::Empty(path.to_owned()))?;
        info!("Loaded {} words from {:?}", vocabulary.len(), path);
        Ok(vocabulary)
    }

    /// Parse a word list, skipping blank lines and comments.
    /// Returns `None` if no words remain.
    pub fn parse(contents: &str) -> Option<Self> {
        let words = contents
            .lines()
            .filter(|l| !l.starts_with(COMMENT_MARKER))
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_owned)
            .collect::<Vec<_>>();
        Vocabulary::from_words(words)
    }

    /// Build a vocabulary from an ordered list of words.
    /// Returns `None` if the list is empty.
    pub fn from_words(words: Vec<String>) -> Option<Self> {
        if words.is_empty() {
            return None;
        }
        let mut positions = HashMap::with_capacity(words.len());
        for (i, word) in words.iter().enumerate() {
            if positions.contains_key(word) {
                warn!("Duplicate vocabulary word {:?} at line {}", word, i);
                continue;
            }
            positions.insert(word.clone(), i);
        }
        Some(Vocabulary { words, positions })
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.words.get(index).map(String::as_str)
    }

    /// Index of the word, if it's in the vocabulary.
    pub fn position(&self, word: &str) -> Option<usize> {
        self.positions.get(word).copied()
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }
}
