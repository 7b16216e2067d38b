use std::path::PathBuf;
use thiserror::Error;

pub use cache::load_or_build;
pub use ollama::OllamaProvider;

pub mod cache;
mod ollama;

/// A single word embedding.
pub type Embedding = Vec<f32>;

/// Failure modes when producing or loading embeddings.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("embedding cache has {rows} rows but the vocabulary has {expected} words")]
    DimensionMismatch { rows: usize, expected: usize },
    #[error("target embedding has {got} dimensions but the vocabulary embeddings have {expected}")]
    TargetDimension { got: usize, expected: usize },
    #[error("embedding row {row} has {got} columns, expected {expected}")]
    RaggedRow {
        row: usize,
        got: usize,
        expected: usize,
    },
    #[error("invalid number {value:?} on row {row} of the embedding cache")]
    Parse { row: usize, value: String },
    #[error("embedding cache {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("provider returned {got} embeddings for {expected} words")]
    BatchSize { got: usize, expected: usize },
    #[error("embedding request failed")]
    Http(#[from] reqwest::Error),
    #[error("malformed embedding response")]
    Json(#[from] serde_json::Error),
}

/// Maps words to fixed-length vectors.
///
/// Calls may be slow, so the game only makes them while warming up the vocabulary and once per
/// round to embed the target word.
pub trait EmbeddingProvider {
    /// Embed a single word.
    fn encode(&self, word: &str) -> Result<Embedding, EmbeddingError>;

    /// Embed many words at once, in order.
    fn encode_batch(&self, words: &[&str]) -> Result<Vec<Embedding>, EmbeddingError> {
        words.iter().map(|w| self.encode(w)).collect()
    }
}

/// One embedding per vocabulary word, in vocabulary order. Every row has the same length.
#[derive(Debug, Clone, Default)]
pub struct EmbeddingMatrix {
    rows: Vec<Embedding>,
}

impl EmbeddingMatrix {
    /// Construct a matrix from rows, checking they all share a dimensionality.
    pub fn new(rows: Vec<Embedding>) -> Result<Self, EmbeddingError> {
        if let Some(first) = rows.first() {
            let expected = first.len();
            for (row, embedding) in rows.iter().enumerate() {
                if embedding.len() != expected {
                    return Err(EmbeddingError::RaggedRow {
                        row,
                        got: embedding.len(),
                        expected,
                    });
                }
            }
        }
        Ok(EmbeddingMatrix { rows })
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Dimensionality of each row (0 for an empty matrix).
    pub fn dimensions(&self) -> usize {
        self.rows.first().map(Vec::len).unwrap_or_default()
    }

    pub fn row(&self, index: usize) -> Option<&[f32]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f32]> {
        self.rows.iter().map(Vec::as_slice)
    }
}
