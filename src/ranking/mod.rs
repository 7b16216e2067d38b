use ordered_float::OrderedFloat;
use std::collections::HashMap;

pub use metric::{Cosine, DistanceMetric, Euclidean, Metric};

use crate::{embedding::EmbeddingMatrix, vocabulary::Vocabulary};

mod metric;

/// A vocabulary word and its distance to the target.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedWord {
    pub word: String,
    pub distance: f32,
}

/// The whole vocabulary ordered by distance to a target, closest first.
#[derive(Debug, Clone, Default)]
pub struct RankedList {
    entries: Vec<RankedWord>,
    /// Rank of the first occurrence of each word.
    ranks: HashMap<String, usize>,
    max_distance: f32,
}

impl RankedList {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// The entry at the given rank.
    pub fn get(&self, rank: usize) -> Option<&RankedWord> {
        self.entries.get(rank)
    }

    /// Position of `word` in the ranking, by exact match.
    pub fn rank_of(&self, word: &str) -> Option<usize> {
        self.ranks.get(word).copied()
    }

    /// The largest distance in the ranking.
    pub fn max_distance(&self) -> f32 {
        self.max_distance
    }

    /// Similarity of the word at `rank`: one minus its distance relative to the furthest word,
    /// rounded to two decimal places and kept within [0, 1].
    pub fn similarity(&self, rank: usize) -> Option<f32> {
        let distance = self.entries.get(rank)?.distance;
        if self.max_distance <= 0.0 {
            return Some(1.0);
        }
        let similarity = 1.0 - distance / self.max_distance;
        Some(((similarity * 100.0).round() / 100.0).clamp(0.0, 1.0))
    }

    pub fn iter(&self) -> impl Iterator<Item = &RankedWord> {
        self.entries.iter()
    }
}

/// Rank every vocabulary word by its distance to `target`.
///
/// The sort is stable, so words at equal distance keep their vocabulary order.
pub fn rank<M: DistanceMetric + ?Sized>(
    target: &[f32],
    matrix: &EmbeddingMatrix,
    vocabulary: &Vocabulary,
    metric: &M,
) -> RankedList {
    debug_assert_eq!(matrix.len(), vocabulary.len());

    let mut entries = vocabulary
        .iter()
        .zip(matrix.rows())
        .map(|(word, embedding)| RankedWord {
            word: word.to_owned(),
            distance: metric.distance(target, embedding),
        })
        .collect::<Vec<_>>();
    entries.sort_by_key(|e| OrderedFloat(e.distance));

    let max_distance = entries
        .iter()
        .map(|e| OrderedFloat(e.distance))
        .max()
        .map(OrderedFloat::into_inner)
        .unwrap_or_default();

    let mut ranks = HashMap::with_capacity(entries.len());
    for (rank, entry) in entries.iter().enumerate() {
        ranks.entry(entry.word.clone()).or_insert(rank);
    }

    RankedList {
        entries,
        ranks,
        max_distance,
    }
}
