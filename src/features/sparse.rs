//! Sparse row vectors.
//!
//! TF-IDF rows are mostly zeros: a ticket uses a handful of the vocabulary's
//! terms. Rows are stored as parallel `(index, value)` arrays sorted by
//! column; centroids are dense, so the hot path is sparse-vs-dense distance.

use ndarray::{ArrayView1, ArrayViewMut1};

/// A sparse vector with strictly increasing column indices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    indices: Vec<usize>,
    values: Vec<f64>,
}

impl SparseVector {
    /// Build from `(column, value)` pairs. Pairs are sorted by column; zero
    /// values are dropped. Duplicate columns are summed.
    pub fn from_pairs(mut pairs: Vec<(usize, f64)>) -> Self {
        pairs.sort_by_key(|&(i, _)| i);
        let mut merged: Vec<(usize, f64)> = Vec::with_capacity(pairs.len());
        for (i, v) in pairs {
            match merged.last_mut() {
                Some((last, acc)) if *last == i => *acc += v,
                _ => merged.push((i, v)),
            }
        }
        let (indices, values) = merged.into_iter().filter(|&(_, v)| v != 0.0).unzip();
        Self { indices, values }
    }

    /// Number of stored (non-zero) entries.
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    /// True for the all-zero vector.
    pub fn is_zero(&self) -> bool {
        self.indices.is_empty()
    }

    /// Iterate `(column, value)` in column order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.indices.iter().copied().zip(self.values.iter().copied())
    }

    /// Squared L2 norm.
    pub fn squared_norm(&self) -> f64 {
        self.values.iter().map(|v| v * v).sum()
    }

    /// Scale in place so the L2 norm is 1. The zero vector stays zero.
    pub fn l2_normalize(&mut self) {
        let norm = self.squared_norm().sqrt();
        if norm > 0.0 {
            for v in &mut self.values {
                *v /= norm;
            }
        }
    }

    /// Squared Euclidean distance to another sparse vector.
    pub fn squared_distance(&self, other: &SparseVector) -> f64 {
        let (mut i, mut j) = (0, 0);
        let mut acc = 0.0;
        while i < self.indices.len() && j < other.indices.len() {
            let (a, b) = (self.indices[i], other.indices[j]);
            if a == b {
                let d = self.values[i] - other.values[j];
                acc += d * d;
                i += 1;
                j += 1;
            } else if a < b {
                acc += self.values[i] * self.values[i];
                i += 1;
            } else {
                acc += other.values[j] * other.values[j];
                j += 1;
            }
        }
        acc += self.values[i..].iter().map(|v| v * v).sum::<f64>();
        acc += other.values[j..].iter().map(|v| v * v).sum::<f64>();
        acc
    }

    /// Euclidean distance to another sparse vector.
    pub fn distance(&self, other: &SparseVector) -> f64 {
        self.squared_distance(other).sqrt()
    }

    /// Squared Euclidean distance to a dense vector whose squared norm is
    /// `dense_sq_norm` (precomputed once per centroid).
    ///
    /// ```text
    /// ||x - c||² = ||c||² + Σ_{j ∈ nnz(x)} ((x_j - c_j)² - c_j²)
    /// ```
    pub fn squared_distance_dense(&self, dense: ArrayView1<'_, f64>, dense_sq_norm: f64) -> f64 {
        let correction: f64 = self
            .iter()
            .map(|(j, x)| {
                let c = dense[j];
                (x - c) * (x - c) - c * c
            })
            .sum();
        (dense_sq_norm + correction).max(0.0)
    }

    /// `dst += self`.
    pub fn add_to(&self, mut dst: ArrayViewMut1<'_, f64>) {
        for (j, x) in self.iter() {
            dst[j] += x;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array1;

    #[test]
    fn test_from_pairs_sorts_merges_and_drops_zeros() {
        let v = SparseVector::from_pairs(vec![(3, 1.0), (0, 2.0), (3, 0.5), (1, 0.0)]);
        let got: Vec<(usize, f64)> = v.iter().collect();
        assert_eq!(got, vec![(0, 2.0), (3, 1.5)]);
    }

    #[test]
    fn test_l2_normalize() {
        let mut v = SparseVector::from_pairs(vec![(0, 3.0), (2, 4.0)]);
        v.l2_normalize();
        assert!((v.squared_norm() - 1.0).abs() < 1e-12);

        let mut zero = SparseVector::default();
        zero.l2_normalize();
        assert!(zero.is_zero());
    }

    #[test]
    fn test_sparse_distance_matches_dense() {
        let a = SparseVector::from_pairs(vec![(0, 1.0), (2, 2.0)]);
        let b = SparseVector::from_pairs(vec![(1, 1.0), (2, 0.5), (4, 3.0)]);
        // (1)^2 + (1)^2 + (1.5)^2 + (3)^2
        assert!((a.squared_distance(&b) - 13.25).abs() < 1e-12);
        assert!((a.squared_distance(&b) - b.squared_distance(&a)).abs() < 1e-12);

        let dense = Array1::from(vec![0.0, 1.0, 0.5, 0.0, 3.0]);
        let sq = dense.dot(&dense);
        assert!((a.squared_distance_dense(dense.view(), sq) - 13.25).abs() < 1e-12);
    }

    #[test]
    fn test_distance_to_self_is_zero() {
        let a = SparseVector::from_pairs(vec![(0, 0.6), (5, 0.8)]);
        assert_eq!(a.squared_distance(&a), 0.0);
    }

    #[test]
    fn test_add_to() {
        let a = SparseVector::from_pairs(vec![(1, 2.0)]);
        let mut acc = Array1::from(vec![1.0, 1.0]);
        a.add_to(acc.view_mut());
        assert_eq!(acc.to_vec(), vec![1.0, 3.0]);
    }
}
