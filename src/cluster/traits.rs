//! Clustering traits.

use ndarray::Array2;

use crate::error::Result;
use crate::features::FeatureMatrix;

/// Output of one partitioning run at a fixed k.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    /// Cluster index in `[0, k)` for every row, in row order.
    pub assignments: Vec<usize>,
    /// `k × n_features` centroid matrix.
    pub centroids: Array2<f64>,
    /// Within-cluster sum of squared distances.
    pub inertia: f64,
    /// Lloyd iterations performed by the kept run.
    pub iterations: usize,
    /// False when the run stopped at the iteration cap.
    pub converged: bool,
}

impl Partition {
    /// Number of clusters requested.
    pub fn k(&self) -> usize {
        self.centroids.nrows()
    }

    /// Members per cluster index.
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0usize; self.k()];
        for &a in &self.assignments {
            sizes[a] += 1;
        }
        sizes
    }

    /// Clusters with at least one member.
    pub fn non_empty_clusters(&self) -> usize {
        self.cluster_sizes().iter().filter(|&&s| s > 0).count()
    }
}

/// A partitioning algorithm driven by [`ClusterSelector`](super::ClusterSelector).
///
/// Implementations must be deterministic for a fixed `(matrix, k, seed)`
/// and must not depend on hidden global state.
pub trait ClusterEngine {
    /// Partition the rows of `matrix` into `k` clusters.
    fn run(&self, matrix: &FeatureMatrix, k: usize, seed: u64) -> Result<Partition>;
}
