//! Internal clustering-quality metrics.
//!
//! No ground truth is available for support tickets, so cluster quality is
//! judged from the geometry of the partition alone.
//!
//! | Metric | Range | Best | Used for |
//! |--------|-------|------|----------|
//! | [`silhouette_score`] | [-1, 1] | 1 | Choosing k |
//! | [`inertia`] | [0, ∞) | 0 | Choosing among restarts at fixed k |
//!
//! # Silhouette
//!
//! For document i in cluster C:
//!
//! ```text
//! a(i) = mean distance from i to the other members of C
//! b(i) = min over clusters C' ≠ C of mean distance from i to members of C'
//! s(i) = (b(i) - a(i)) / max(a(i), b(i))
//! ```
//!
//! `s(i) = 0` when C is a singleton. Distances are Euclidean.
//!
//! Cost is O(n² · nnz) with no n×n buffer: each row accumulates its
//! per-cluster distance sums on the fly.
//!
//! # References
//!
//! - Rousseeuw (1987). "Silhouettes: a graphical aid to the interpretation
//!   and validation of cluster analysis"

use ndarray::Array2;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::features::FeatureMatrix;

/// Per-document silhouette values, in document order.
///
/// `labels[i]` is the cluster of row i. Clusters are identified by index;
/// unused indices are ignored.
pub fn silhouette_samples(matrix: &FeatureMatrix, labels: &[usize]) -> Result<Vec<f64>> {
    let n = matrix.n_rows();
    if labels.len() != n {
        return Err(Error::DimensionMismatch {
            expected: n,
            found: labels.len(),
        });
    }
    if n == 0 {
        return Err(Error::EmptyInput);
    }

    let k = labels.iter().copied().max().map_or(0, |m| m + 1);
    let mut counts = vec![0usize; k];
    for &l in labels {
        counts[l] += 1;
    }

    let sample = |i: usize| -> f64 {
        let own = labels[i];
        if counts[own] <= 1 {
            return 0.0;
        }

        let row = matrix.row(i);
        let mut sums = vec![0.0f64; k];
        for (j, other) in matrix.rows().iter().enumerate() {
            if j != i {
                sums[labels[j]] += row.distance(other);
            }
        }

        let a = sums[own] / (counts[own] - 1) as f64;
        let b = (0..k)
            .filter(|&c| c != own && counts[c] > 0)
            .map(|c| sums[c] / counts[c] as f64)
            .fold(f64::INFINITY, f64::min);

        if !b.is_finite() {
            return 0.0;
        }
        let denom = a.max(b);
        if denom > 0.0 {
            (b - a) / denom
        } else {
            0.0
        }
    };

    #[cfg(feature = "parallel")]
    let scores: Vec<f64> = (0..n).into_par_iter().map(sample).collect();

    #[cfg(not(feature = "parallel"))]
    let scores: Vec<f64> = (0..n).map(sample).collect();

    Ok(scores)
}

/// Mean silhouette over all documents.
///
/// Summed sequentially in document order so the value does not depend on
/// whether samples were computed in parallel.
pub fn silhouette_score(matrix: &FeatureMatrix, labels: &[usize]) -> Result<f64> {
    let samples = silhouette_samples(matrix, labels)?;
    let total: f64 = samples.iter().sum();
    Ok(total / samples.len() as f64)
}

/// Within-cluster sum of squared distances to the assigned centroid.
pub fn inertia(matrix: &FeatureMatrix, labels: &[usize], centroids: &Array2<f64>) -> Result<f64> {
    if labels.len() != matrix.n_rows() {
        return Err(Error::DimensionMismatch {
            expected: matrix.n_rows(),
            found: labels.len(),
        });
    }
    if centroids.ncols() != matrix.n_cols() {
        return Err(Error::DimensionMismatch {
            expected: matrix.n_cols(),
            found: centroids.ncols(),
        });
    }

    if let Some(&l) = labels.iter().find(|&&l| l >= centroids.nrows()) {
        return Err(Error::DimensionMismatch {
            expected: centroids.nrows(),
            found: l + 1,
        });
    }

    let mut total = 0.0;
    for (row, &l) in matrix.rows().iter().zip(labels) {
        let c = centroids.row(l);
        total += row.squared_distance_dense(c, c.dot(&c));
    }
    Ok(total)
}
