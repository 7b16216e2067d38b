use log::info;
use std::{fmt::Write as _, fs, io, path::Path};

use super::{EmbeddingError, EmbeddingMatrix, EmbeddingProvider};
use crate::vocabulary::Vocabulary;

/// Number of words sent to the provider per request while warming up.
pub const WARM_UP_BATCH_SIZE: usize = 64;

/// Load the embedding matrix from the cache file, or compute it with `provider` and write the
/// cache if it doesn't exist yet (or `rebuild` is set).
pub fn load_or_build(
    path: &Path,
    vocabulary: &Vocabulary,
    provider: &dyn EmbeddingProvider,
    rebuild: bool,
) -> Result<EmbeddingMatrix, EmbeddingError> {
    if !rebuild {
        match load(path, vocabulary.len()) {
            Ok(matrix) => {
                info!(
                    "Loaded {}x{} embeddings from {:?}",
                    matrix.len(),
                    matrix.dimensions(),
                    path
                );
                return Ok(matrix);
            }
            Err(EmbeddingError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                info!("No embedding cache at {:?}, embedding vocabulary", path);
            }
            Err(e) => return Err(e),
        }
    }

    let matrix = build(vocabulary, provider)?;
    save(path, &matrix)?;
    info!("Wrote embedding cache to {:?}", path);
    Ok(matrix)
}

/// Embed every vocabulary word, in batches.
pub fn build(
    vocabulary: &Vocabulary,
    provider: &dyn EmbeddingProvider,
) -> Result<EmbeddingMatrix, EmbeddingError> {
    let mut rows = Vec::with_capacity(vocabulary.len());
    for chunk in vocabulary.words().chunks(WARM_UP_BATCH_SIZE) {
        let words = chunk.iter().map(String::as_str).collect::<Vec<_>>();
        let embeddings = provider.encode_batch(&words)?;
        if embeddings.len() != words.len() {
            return Err(EmbeddingError::BatchSize {
                got: embeddings.len(),
                expected: words.len(),
            });
        }
        rows.extend(embeddings);
        info!("Embedded {}/{} words", rows.len(), vocabulary.len());
    }
    EmbeddingMatrix::new(rows)
}

/// Read a cache of whitespace-separated floats, one row per vocabulary word.
pub fn load(path: &Path, expected_rows: usize) -> Result<EmbeddingMatrix, EmbeddingError> {
    let contents = fs::read_to_string(path).map_err(|source| EmbeddingError::Io {
        path: path.to_owned(),
        source,
    })?;
    let matrix = parse(&contents)?;
    if matrix.len() != expected_rows {
        return Err(EmbeddingError::DimensionMismatch {
            rows: matrix.len(),
            expected: expected_rows,
        });
    }
    Ok(matrix)
}

/// Parse the cache format. Blank lines are ignored.
pub fn parse(contents: &str) -> Result<EmbeddingMatrix, EmbeddingError> {
    let mut rows = Vec::new();
    for line in contents.lines().filter(|l| !l.trim().is_empty()) {
        let row = rows.len();
        let embedding = line
            .split_whitespace()
            .map(|value| {
                value.parse::<f32>().map_err(|_| EmbeddingError::Parse {
                    row,
                    value: value.to_owned(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        rows.push(embedding);
    }
    EmbeddingMatrix::new(rows)
}

/// Write the matrix in the cache format.
pub fn save(path: &Path, matrix: &EmbeddingMatrix) -> Result<(), EmbeddingError> {
    let mut contents = String::new();
    for row in matrix.rows() {
        let line = row
            .iter()
            .map(|v| format!("{:e}", v))
            .collect::<Vec<_>>()
            .join(" ");
        // Writing to a String can't fail
        let _ = writeln!(contents, "{}", line);
    }
    fs::write(path, contents).map_err(|source| EmbeddingError::Io {
        path: path.to_owned(),
        source,
    })
}
