//! K-means clustering over sparse TF-IDF rows.
//!
//! Partitions documents into k clusters by minimizing **within-cluster sum of
//! squares** (WCSS). The foundational clustering algorithm, dating to 1957 (Lloyd).
//!
//! # The Objective
//!
//! ```text
//! WCSS = Σₖ Σᵢ∈Cₖ ||xᵢ - μₖ||²
//! ```
//!
//! # Lloyd's Algorithm
//!
//! 1. Initialize k centroids via k-means++
//! 2. **Assign**: Each document → nearest centroid (ties → lowest index)
//! 3. **Update**: Each centroid → mean of assigned documents
//! 4. Repeat until no assignment changes, the total centroid shift drops
//!    below `tol`, or `max_iter` is reached
//!
//! Hitting `max_iter` is not an error: the last partition is returned with
//! `converged = false`.
//!
//! ## K-means++ Initialization
//!
//! 1. Choose first centroid uniformly at random
//! 2. Choose next centroid with probability proportional to D(x)²
//!    (squared distance to nearest existing centroid)
//!
//! ## Empty Clusters
//!
//! A cluster left without members is reseeded from the document farthest
//! from its own centroid; that document moves to the empty cluster. If every
//! document already sits on its centroid there is nothing to move and the
//! cluster stays empty, which the selector reports as degenerate.
//!
//! ## Restarts
//!
//! Lloyd only finds a local optimum. `n_init` seeded restarts are run and
//! the one with the lowest inertia is kept (earliest on ties). All restarts
//! draw from one `StdRng` seeded with the caller's seed, so the result is a
//! pure function of `(matrix, k, seed)`.

use log::{trace, warn};
use ndarray::Array2;
use rand::prelude::*;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::traits::{ClusterEngine, Partition};
use crate::error::{Error, Result};
use crate::features::FeatureMatrix;
use crate::metrics;

/// K-means clustering algorithm.
#[derive(Debug, Clone)]
pub struct Kmeans {
    /// Maximum Lloyd iterations per restart.
    max_iter: usize,
    /// Convergence tolerance on total squared centroid shift.
    tol: f64,
    /// Number of seeded restarts.
    n_init: usize,
}

impl Default for Kmeans {
    fn default() -> Self {
        Self::new()
    }
}

impl Kmeans {
    /// Create a new K-means clusterer with 300 iterations and 10 restarts.
    pub fn new() -> Self {
        Self {
            max_iter: 300,
            tol: 1e-4,
            n_init: 10,
        }
    }

    /// Set maximum iterations.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set convergence tolerance.
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Set number of restarts.
    pub fn with_n_init(mut self, n_init: usize) -> Self {
        self.n_init = n_init;
        self
    }

    /// Pick k seed rows with k-means++.
    fn init_centroids(&self, matrix: &FeatureMatrix, k: usize, rng: &mut impl Rng) -> Array2<f64> {
        let n = matrix.n_rows();
        let rows = matrix.rows();
        let mut chosen: Vec<usize> = Vec::with_capacity(k);

        // First centroid: random point
        let first = rng.random_range(0..n);
        chosen.push(first);
        let mut min_dist: Vec<f64> = rows
            .iter()
            .map(|r| r.squared_distance(&rows[first]))
            .collect();

        // Remaining centroids: k-means++ selection
        while chosen.len() < k {
            let total: f64 = min_dist.iter().sum();
            let selected = if total <= 0.0 {
                rng.random_range(0..n)
            } else {
                let threshold = rng.random::<f64>() * total;
                let mut cumsum = 0.0;
                let mut selected = None;
                for (j, &d) in min_dist.iter().enumerate() {
                    if d <= 0.0 {
                        continue;
                    }
                    cumsum += d;
                    selected = Some(j);
                    if cumsum >= threshold {
                        break;
                    }
                }
                selected.unwrap_or(first)
            };

            chosen.push(selected);
            for (d, r) in min_dist.iter_mut().zip(rows) {
                *d = d.min(r.squared_distance(&rows[selected]));
            }
        }

        let mut centroids = Array2::zeros((k, matrix.n_cols()));
        for (c, &idx) in chosen.iter().enumerate() {
            rows[idx].add_to(centroids.row_mut(c));
        }
        centroids
    }

    /// Assignment step. Returns how many labels changed.
    fn assign(matrix: &FeatureMatrix, centroids: &Array2<f64>, labels: &mut [usize]) -> usize {
        let norms: Vec<f64> = centroids.rows().into_iter().map(|c| c.dot(&c)).collect();
        let nearest = |i: usize| -> usize {
            let row = matrix.row(i);
            let mut best_cluster = 0;
            let mut best_dist = f64::INFINITY;
            for (c, centroid) in centroids.rows().into_iter().enumerate() {
                let dist = row.squared_distance_dense(centroid, norms[c]);
                if dist < best_dist {
                    best_dist = dist;
                    best_cluster = c;
                }
            }
            best_cluster
        };

        #[cfg(feature = "parallel")]
        let next: Vec<usize> = (0..labels.len()).into_par_iter().map(nearest).collect();

        #[cfg(not(feature = "parallel"))]
        let next: Vec<usize> = (0..labels.len()).map(nearest).collect();

        let mut changed = 0;
        for (label, new) in labels.iter_mut().zip(next) {
            if *label != new {
                *label = new;
                changed += 1;
            }
        }
        changed
    }

    /// Update step: recompute means, reseeding empty clusters.
    fn update(
        matrix: &FeatureMatrix,
        old: &Array2<f64>,
        labels: &mut [usize],
        k: usize,
    ) -> Array2<f64> {
        let d = matrix.n_cols();
        let mut sums = Array2::<f64>::zeros((k, d));
        let mut counts = vec![0usize; k];
        for (row, &l) in matrix.rows().iter().zip(labels.iter()) {
            row.add_to(sums.row_mut(l));
            counts[l] += 1;
        }

        let empties: Vec<usize> = (0..k).filter(|&c| counts[c] == 0).collect();
        if !empties.is_empty() {
            // Distance of every document to the centroid it was assigned to.
            let mut own_dist: Vec<f64> = matrix
                .rows()
                .iter()
                .zip(labels.iter())
                .map(|(row, &l)| {
                    let c = old.row(l);
                    row.squared_distance_dense(c, c.dot(&c))
                })
                .collect();

            for c in empties {
                let mut donor: Option<usize> = None;
                for (i, &dist) in own_dist.iter().enumerate() {
                    if dist <= 0.0 || counts[labels[i]] <= 1 {
                        continue;
                    }
                    if donor.map_or(true, |best| dist > own_dist[best]) {
                        donor = Some(i);
                    }
                }

                match donor {
                    Some(i) => {
                        let from = labels[i];
                        let row = matrix.row(i);
                        for (j, x) in row.iter() {
                            sums[[from, j]] -= x;
                        }
                        counts[from] -= 1;
                        row.add_to(sums.row_mut(c));
                        counts[c] = 1;
                        labels[i] = c;
                        own_dist[i] = 0.0;
                        trace!("reseeded empty cluster {c} from document {i}");
                    }
                    None => {
                        // Every document sits on its centroid; keep the old position.
                        sums.row_mut(c).assign(&old.row(c));
                    }
                }
            }
        }

        for (c, &count) in counts.iter().enumerate() {
            if count > 0 {
                let mut row = sums.row_mut(c);
                row /= count as f64;
            }
        }
        sums
    }

    /// One seeded Lloyd run from k-means++ seeds.
    fn lloyd(&self, matrix: &FeatureMatrix, k: usize, rng: &mut impl Rng) -> Result<Partition> {
        let mut centroids = self.init_centroids(matrix, k, rng);
        let mut labels = vec![usize::MAX; matrix.n_rows()];
        let mut iterations = 0;
        let mut converged = false;

        for iter in 0..self.max_iter {
            iterations = iter + 1;

            let changed = Self::assign(matrix, &centroids, &mut labels);
            if changed == 0 {
                converged = true;
                break;
            }

            let new_centroids = Self::update(matrix, &centroids, &mut labels, k);
            let shift: f64 = centroids
                .iter()
                .zip(new_centroids.iter())
                .map(|(a, b)| (a - b).powi(2))
                .sum();
            centroids = new_centroids;

            if shift < self.tol {
                converged = true;
                break;
            }
        }

        let inertia = metrics::inertia(matrix, &labels, &centroids)?;
        Ok(Partition {
            assignments: labels,
            centroids,
            inertia,
            iterations,
            converged,
        })
    }
}

impl ClusterEngine for Kmeans {
    fn run(&self, matrix: &FeatureMatrix, k: usize, seed: u64) -> Result<Partition> {
        let n = matrix.n_rows();
        if n == 0 {
            return Err(Error::EmptyInput);
        }
        if k == 0 || k > n {
            return Err(Error::InvalidClusterCount {
                requested: k,
                n_items: n,
            });
        }
        if self.max_iter == 0 {
            return Err(Error::InvalidParameter {
                name: "max_iter",
                message: "must be positive",
            });
        }
        if self.n_init == 0 {
            return Err(Error::InvalidParameter {
                name: "n_init",
                message: "must be positive",
            });
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let mut best: Option<Partition> = None;
        for _ in 0..self.n_init {
            let run = self.lloyd(matrix, k, &mut rng)?;
            if best.as_ref().map_or(true, |b| run.inertia < b.inertia) {
                best = Some(run);
            }
        }

        let best = best.ok_or(Error::EmptyInput)?;
        if !best.converged {
            warn!(
                "k-means (k={k}) stopped at the {}-iteration cap without converging",
                self.max_iter
            );
        }
        Ok(best)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureExtractor;
    use crate::text::NormalizedDocument;

    fn matrix(raw: &[&[&str]]) -> FeatureMatrix {
        let docs: Vec<NormalizedDocument> =
            raw.iter().map(|d| d.iter().copied().collect()).collect();
        FeatureExtractor::new().fit(&docs).unwrap()
    }

    fn two_topics() -> FeatureMatrix {
        matrix(&[
            &["vpn", "connect"],
            &["vpn", "connect", "drop"],
            &["printer", "jam"],
            &["printer", "jam", "paper"],
        ])
    }

    #[test]
    fn test_kmeans_basic() {
        let p = Kmeans::new().run(&two_topics(), 2, 42).unwrap();

        // Documents 0,1 should be in same cluster, documents 2,3 in another
        assert_eq!(p.assignments[0], p.assignments[1]);
        assert_eq!(p.assignments[2], p.assignments[3]);
        assert_ne!(p.assignments[0], p.assignments[2]);
        assert!(p.converged);
        assert_eq!(p.centroids.dim(), (2, 6));
    }

    #[test]
    fn test_kmeans_all_points_assigned() {
        // Property: every document is assigned to exactly one cluster
        let words = ["vpn", "printer", "invoice", "password", "refund", "laptop"];
        let raw: Vec<Vec<&str>> = (0..30)
            .map(|i| vec![words[i % 6], words[(i / 6) % 6]])
            .collect();
        let refs: Vec<&[&str]> = raw.iter().map(Vec::as_slice).collect();
        let m = matrix(&refs);

        let p = Kmeans::new().run(&m, 5, 123).unwrap();

        assert_eq!(p.assignments.len(), m.n_rows());
        for &label in &p.assignments {
            assert!(label < 5, "label {} out of range", label);
        }
    }

    #[test]
    fn test_centroids_are_member_means() {
        let m = two_topics();
        let p = Kmeans::new().run(&m, 2, 7).unwrap();
        let dense = m.to_dense();
        for c in 0..2 {
            let members: Vec<usize> = (0..4).filter(|&i| p.assignments[i] == c).collect();
            for j in 0..m.n_cols() {
                let mean: f64 =
                    members.iter().map(|&i| dense[[i, j]]).sum::<f64>() / members.len() as f64;
                assert!((p.centroids[[c, j]] - mean).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_kmeans_k_equals_n() {
        let m = matrix(&[&["vpn"], &["printer"], &["invoice"]]);
        let p = Kmeans::new().run(&m, 3, 42).unwrap();

        // Each document in a different cluster
        let unique: std::collections::HashSet<_> = p.assignments.iter().collect();
        assert_eq!(unique.len(), 3);
        assert!(p.inertia.abs() < 1e-12);
    }

    #[test]
    fn test_kmeans_deterministic_with_seed() {
        let m = two_topics();
        let a = Kmeans::new().run(&m, 2, 42).unwrap();
        let b = Kmeans::new().run(&m, 2, 42).unwrap();
        assert_eq!(a, b, "same seed should give same result");
    }

    #[test]
    fn test_empty_document_gets_assigned() {
        let m = matrix(&[&["vpn"], &["vpn"], &[], &["printer"], &["printer"]]);
        let p = Kmeans::new().run(&m, 2, 1).unwrap();
        assert_eq!(p.assignments.len(), 5);
        assert!(p.assignments[2] < 2);
    }

    #[test]
    fn test_identical_documents_cannot_fill_extra_clusters() {
        let m = matrix(&[&["vpn"], &["vpn"], &["vpn"], &["printer"], &["printer"]]);
        let p = Kmeans::new().run(&m, 3, 5).unwrap();
        assert!(p.non_empty_clusters() <= 2);
    }

    #[test]
    fn test_iteration_cap_is_not_an_error() {
        let p = Kmeans::new()
            .with_max_iter(1)
            .with_n_init(1)
            .run(&two_topics(), 2, 3)
            .unwrap();
        assert_eq!(p.iterations, 1);
        assert_eq!(p.assignments.len(), 4);
    }

    #[test]
    fn test_invalid_k() {
        let m = two_topics();
        assert!(matches!(
            Kmeans::new().run(&m, 0, 1),
            Err(Error::InvalidClusterCount { .. })
        ));
        assert!(matches!(
            Kmeans::new().run(&m, 5, 1),
            Err(Error::InvalidClusterCount { requested: 5, n_items: 4 })
        ));
    }

    #[test]
    fn test_invalid_parameters() {
        let m = two_topics();
        assert!(Kmeans::new().with_n_init(0).run(&m, 2, 1).is_err());
        assert!(Kmeans::new().with_max_iter(0).run(&m, 2, 1).is_err());
    }
}
