use log::{debug, info};
use rand::{rngs::StdRng, Rng, SeedableRng};
use thiserror::Error;

use crate::embedding::EmbeddingMatrix;

/// Number of output dimensions.
pub const COMPONENTS: usize = 3;
/// Power iteration stops after this many rounds even if not converged.
const MAX_ITERATIONS: usize = 100;
const TOLERANCE: f64 = 1e-6;
const SEED: u64 = 0x5eed;

/// A point in display space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl std::fmt::Display for Point3 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.3}, {:.3}, {:.3})", self.x, self.y, self.z)
    }
}

#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("cannot fit a projection to an empty embedding matrix")]
    EmptyMatrix,
}

/// Reduces embeddings to 3D for display. Fit once over the whole vocabulary, then reused.
pub trait Projector {
    /// Learn the projection from the full embedding matrix.
    fn fit(&mut self, matrix: &EmbeddingMatrix) -> Result<(), ProjectionError>;

    /// Project one embedding. Returns `None` if the projector hasn't been fit, or the
    /// embedding has the wrong dimensionality.
    fn transform(&self, embedding: &[f32]) -> Option<Point3>;
}

/// Principal component analysis down to three components, followed by scaling each point onto
/// the unit sphere.
#[derive(Debug, Clone, Default)]
pub struct PcaProjector {
    mean: Vec<f64>,
    /// Unit-length principal axes, largest variance first.
    axes: Vec<Vec<f64>>,
}

impl PcaProjector {
    pub fn new() -> Self {
        PcaProjector::default()
    }

    /// Fit a new projector over `matrix`.
    pub fn fitted(matrix: &EmbeddingMatrix) -> Result<Self, ProjectionError> {
        let mut projector = PcaProjector::new();
        projector.fit(matrix)?;
        Ok(projector)
    }

    /// `Xᵀ X v` for the mean-centred data matrix X, without forming the covariance matrix.
    fn covariance_product(&self, matrix: &EmbeddingMatrix, v: &[f64]) -> Vec<f64> {
        let mut out = vec![0.0; v.len()];
        for row in matrix.rows() {
            let projected = row
                .iter()
                .zip(&self.mean)
                .zip(v)
                .map(|((x, m), v)| (*x as f64 - m) * v)
                .sum::<f64>();
            for ((o, x), m) in out.iter_mut().zip(row).zip(&self.mean) {
                *o += (*x as f64 - m) * projected;
            }
        }
        out
    }

    /// Remove the components of `v` along the axes found so far.
    fn orthogonalise(&self, v: &mut [f64]) {
        for axis in &self.axes {
            let d = dot(v, axis);
            for (x, a) in v.iter_mut().zip(axis) {
                *x -= d * a;
            }
        }
    }
}

impl Projector for PcaProjector {
    fn fit(&mut self, matrix: &EmbeddingMatrix) -> Result<(), ProjectionError> {
        if matrix.is_empty() {
            return Err(ProjectionError::EmptyMatrix);
        }
        let dimensions = matrix.dimensions();
        let n = matrix.len() as f64;

        self.mean = vec![0.0; dimensions];
        for row in matrix.rows() {
            for (m, x) in self.mean.iter_mut().zip(row) {
                *m += *x as f64 / n;
            }
        }

        self.axes.clear();
        let mut rng = StdRng::seed_from_u64(SEED);
        for component in 0..COMPONENTS.min(dimensions) {
            let mut v = (0..dimensions)
                .map(|_| rng.gen::<f64>() - 0.5)
                .collect::<Vec<_>>();
            self.orthogonalise(&mut v);
            normalise(&mut v);

            for iteration in 0..MAX_ITERATIONS {
                let mut next = self.covariance_product(matrix, &v);
                self.orthogonalise(&mut next);
                if normalise(&mut next) == 0.0 {
                    // No variance left in this direction; keep the orthogonal start vector
                    break;
                }
                let change = next
                    .iter()
                    .zip(&v)
                    .map(|(a, b)| (a - b).abs())
                    .fold(0.0, f64::max);
                v = next;
                if change < TOLERANCE {
                    debug!(
                        "Component {} converged after {} iterations",
                        component, iteration
                    );
                    break;
                }
            }
            self.axes.push(v);
        }
        info!(
            "Fitted {}-component projection over {} embeddings",
            self.axes.len(),
            matrix.len()
        );
        Ok(())
    }

    fn transform(&self, embedding: &[f32]) -> Option<Point3> {
        if self.axes.is_empty() || embedding.len() != self.mean.len() {
            return None;
        }
        let centred = embedding
            .iter()
            .zip(&self.mean)
            .map(|(x, m)| *x as f64 - m)
            .collect::<Vec<_>>();
        let mut coords = [0.0; COMPONENTS];
        for (c, axis) in coords.iter_mut().zip(&self.axes) {
            *c = dot(&centred, axis);
        }
        normalise(&mut coords);
        Some(Point3 {
            x: coords[0] as f32,
            y: coords[1] as f32,
            z: coords[2] as f32,
        })
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(a, b)| a * b).sum()
}

/// Scale to unit length, returning the original norm. Zero vectors are left alone.
fn normalise(v: &mut [f64]) -> f64 {
    let norm = dot(v, v).sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
    norm
}

#[cfg(test)]
mod tests {
    use super::{PcaProjector, Point3, ProjectionError, Projector};
    use crate::embedding::EmbeddingMatrix;

    fn length(p: Point3) -> f32 {
        (p.x * p.x + p.y * p.y + p.z * p.z).sqrt()
    }

    #[test]
    fn unfitted_projector() {
        assert_eq!(PcaProjector::new().transform(&[1.0, 2.0]), None);
        assert!(matches!(
            PcaProjector::fitted(&EmbeddingMatrix::default()),
            Err(ProjectionError::EmptyMatrix)
        ));
    }

    #[test]
    fn points_land_on_unit_sphere() {
        let rows = (0..20)
            .map(|i| {
                let t = i as f32;
                vec![t, 2.0 * t + 1.0, (t * 0.7).sin(), (t * 1.3).cos(), t * t * 0.01]
            })
            .collect::<Vec<_>>();
        let matrix = EmbeddingMatrix::new(rows.clone()).unwrap();
        let projector = PcaProjector::fitted(&matrix).unwrap();

        for row in &rows {
            let p = projector.transform(row).unwrap();
            assert!((length(p) - 1.0).abs() < 1e-4, "{:?}", p);
        }
        // Wrong dimensionality
        assert_eq!(projector.transform(&[1.0, 2.0]), None);
    }

    #[test]
    fn first_axis_follows_largest_variance() {
        // Points spread along x, barely along y, z and w
        let rows = (0..10)
            .map(|i| vec![i as f32 * 10.0, (i % 2) as f32 * 0.1, 0.0, (i % 3) as f32 * 0.01])
            .collect::<Vec<_>>();
        let matrix = EmbeddingMatrix::new(rows).unwrap();
        let projector = PcaProjector::fitted(&matrix).unwrap();

        let p = projector.transform(&[90.0, 0.0, 0.0, 0.0]).unwrap();
        assert!(p.x.abs() > 0.99, "{:?}", p);
    }

    #[test]
    fn mean_projects_to_origin() {
        let matrix = EmbeddingMatrix::new(vec![vec![1.0, 0.0], vec![-1.0, 0.0]]).unwrap();
        let projector = PcaProjector::fitted(&matrix).unwrap();
        // Two input dimensions, so the third coordinate is always zero
        let p = projector.transform(&[0.0, 0.0]).unwrap();
        assert_eq!(p, Point3::default());
        let p = projector.transform(&[1.0, 0.0]).unwrap();
        assert_eq!(p.z, 0.0);
    }
}
