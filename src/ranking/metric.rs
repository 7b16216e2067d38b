use serde::Deserialize;
use strum::{Display, EnumIter};

/// A distance between two equal-length vectors. Must be non-negative, and zero for identical
/// vectors.
pub trait DistanceMetric {
    fn distance(&self, a: &[f32], b: &[f32]) -> f32;
}

/// Straight-line (L2) distance.
#[derive(Debug, Clone, Copy, Default)]
pub struct Euclidean;

impl DistanceMetric for Euclidean {
    fn distance(&self, a: &[f32], b: &[f32]) -> f32 {
        a.iter()
            .zip(b)
            .map(|(a, b)| (*a as f64 - *b as f64).powi(2))
            .sum::<f64>()
            .sqrt() as f32
    }
}

/// One minus the cosine of the angle between the vectors.
/// A zero vector is treated as orthogonal to everything, at distance 1.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cosine;

impl DistanceMetric for Cosine {
    fn distance(&self, a: &[f32], b: &[f32]) -> f32 {
        let (mut dot, mut norm_a, mut norm_b) = (0.0f64, 0.0f64, 0.0f64);
        for (a, b) in a.iter().zip(b) {
            let (a, b) = (*a as f64, *b as f64);
            dot += a * b;
            norm_a += a * a;
            norm_b += b * b;
        }
        if norm_a == 0.0 || norm_b == 0.0 {
            return 1.0;
        }
        // Rounding can push the cosine of parallel vectors just over 1
        (1.0 - dot / (norm_a * norm_b).sqrt()).max(0.0) as f32
    }
}

/// The metrics a game can be configured with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Display, EnumIter)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Metric {
    #[default]
    Euclidean,
    Cosine,
}

impl DistanceMetric for Metric {
    fn distance(&self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            Metric::Euclidean => Euclidean.distance(a, b),
            Metric::Cosine => Cosine.distance(a, b),
        }
    }
}
