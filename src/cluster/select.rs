//! Automatic cluster-count selection by silhouette.
//!
//! Every k in a candidate range is partitioned by a [`ClusterEngine`] and
//! scored with the mean silhouette; the highest score wins.
//!
//! A candidate k is skipped when
//!
//! - **undefined**: `N ≤ k`, silhouette needs at least one cluster with two
//!   members and one other cluster;
//! - **degenerate**: the engine could not fill all k clusters (typically
//!   many identical documents).
//!
//! Equal scores resolve to the smaller k. Each k runs with sub-seed
//! `seed + k`, so evaluating candidates in parallel (feature `parallel`)
//! gives exactly the sequential result.

use std::fmt;

use log::{debug, info, warn};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::kmeans::Kmeans;
use super::traits::{ClusterEngine, Partition};
use crate::error::{Error, Result};
use crate::features::FeatureMatrix;
use crate::metrics;

/// Upper bound of the automatic range.
pub const DEFAULT_MAX_K: usize = 10;

/// Inclusive range of candidate cluster counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KRange {
    /// Smallest k tried (≥ 2).
    pub min: usize,
    /// Largest k tried.
    pub max: usize,
}

impl KRange {
    /// Range `min..=max`.
    pub fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    /// Default range for `n` documents: `2..=min(10, n - 1)`.
    pub fn auto(n: usize) -> Self {
        Self {
            min: 2,
            max: DEFAULT_MAX_K.min(n.saturating_sub(1)).max(2),
        }
    }

    /// Lower `max` so that clusters average at least `min_size` documents.
    ///
    /// Never drops below `min`.
    pub fn with_min_cluster_size(self, n: usize, min_size: usize) -> Self {
        if min_size == 0 {
            return self;
        }
        Self {
            min: self.min,
            max: self.max.min(n / min_size).max(self.min),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.min < 2 {
            return Err(Error::InvalidParameter {
                name: "k_range",
                message: "minimum k must be at least 2",
            });
        }
        if self.min > self.max {
            return Err(Error::InvalidParameter {
                name: "k_range",
                message: "minimum k exceeds maximum k",
            });
        }
        Ok(())
    }
}

impl fmt::Display for KRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.min, self.max)
    }
}

/// One scored partition at a fixed k.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterCandidate {
    /// Number of clusters.
    pub k: usize,
    /// Mean silhouette over all documents, in [-1, 1].
    pub silhouette: f64,
    /// Assignments, centroids and run statistics.
    pub partition: Partition,
}

impl ClusterCandidate {
    /// Cluster index per document.
    pub fn assignments(&self) -> &[usize] {
        &self.partition.assignments
    }

    /// `k × n_features` centroids.
    pub fn centroids(&self) -> &Array2<f64> {
        &self.partition.centroids
    }
}

/// The candidate that survives selection.
pub type ClusterAssignment = ClusterCandidate;

/// What happened at one k.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CandidateOutcome {
    /// Valid partition.
    Scored {
        /// Mean silhouette.
        silhouette: f64,
        /// Within-cluster sum of squares.
        inertia: f64,
    },
    /// Fewer than k clusters received members.
    Degenerate {
        /// Clusters that did receive members.
        non_empty: usize,
    },
    /// `N ≤ k`; silhouette undefined.
    Undefined,
}

/// Diagnostics for one attempted k.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateScore {
    /// Candidate cluster count.
    pub k: usize,
    /// Result of evaluating it.
    #[serde(flatten)]
    pub outcome: CandidateOutcome,
}

/// Best candidate plus per-k diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// Highest-silhouette candidate.
    pub best: ClusterCandidate,
    /// Every attempted k, ascending.
    pub candidates: Vec<CandidateScore>,
}

/// Searches a k range for the best-scoring partition.
#[derive(Debug, Clone, Default)]
pub struct ClusterSelector<E = Kmeans> {
    engine: E,
}

impl<E: ClusterEngine + Sync> ClusterSelector<E> {
    /// Selector driving `engine`.
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    /// The engine used for each candidate.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    fn evaluate(
        &self,
        matrix: &FeatureMatrix,
        k: usize,
        seed: u64,
    ) -> Result<(CandidateScore, Option<ClusterCandidate>)> {
        if matrix.n_rows() <= k {
            return Ok((
                CandidateScore {
                    k,
                    outcome: CandidateOutcome::Undefined,
                },
                None,
            ));
        }

        let partition = self.engine.run(matrix, k, seed.wrapping_add(k as u64))?;
        let non_empty = partition.non_empty_clusters();
        if non_empty < k {
            warn!("k={k}: degenerate ({non_empty} non-empty clusters)");
            return Ok((
                CandidateScore {
                    k,
                    outcome: CandidateOutcome::Degenerate { non_empty },
                },
                None,
            ));
        }

        let silhouette = metrics::silhouette_score(matrix, &partition.assignments)?;
        debug!(
            "k={k}: silhouette={silhouette:.4} inertia={:.4} iterations={}",
            partition.inertia, partition.iterations
        );
        Ok((
            CandidateScore {
                k,
                outcome: CandidateOutcome::Scored {
                    silhouette,
                    inertia: partition.inertia,
                },
            },
            Some(ClusterCandidate {
                k,
                silhouette,
                partition,
            }),
        ))
    }

    /// Evaluate every k in `k_range` and keep the best.
    ///
    /// Every k ≥ N is undefined, so the range is cut at k = N, which is
    /// reported once as [`CandidateOutcome::Undefined`] on behalf of the
    /// whole tail.
    pub fn select(&self, matrix: &FeatureMatrix, k_range: KRange, seed: u64) -> Result<Selection> {
        k_range.validate()?;
        let upper = k_range.max.min(matrix.n_rows()).max(k_range.min);
        let ks: Vec<usize> = (k_range.min..=upper).collect();

        #[cfg(feature = "parallel")]
        let evaluated: Vec<(CandidateScore, Option<ClusterCandidate>)> = ks
            .par_iter()
            .map(|&k| self.evaluate(matrix, k, seed))
            .collect::<Result<_>>()?;

        #[cfg(not(feature = "parallel"))]
        let evaluated: Vec<(CandidateScore, Option<ClusterCandidate>)> = ks
            .iter()
            .map(|&k| self.evaluate(matrix, k, seed))
            .collect::<Result<_>>()?;

        let mut candidates = Vec::with_capacity(evaluated.len());
        let mut best: Option<ClusterCandidate> = None;
        for (score, candidate) in evaluated {
            candidates.push(score);
            if let Some(c) = candidate {
                if best.as_ref().map_or(true, |b| c.silhouette > b.silhouette) {
                    best = Some(c);
                }
            }
        }

        let best = best.ok_or(Error::NoValidClustering {
            k_min: k_range.min,
            k_max: k_range.max,
        })?;
        info!(
            "selected k={} (silhouette {:.4}) from {k_range}",
            best.k, best.silhouette
        );
        Ok(Selection { best, candidates })
    }

    /// Evaluate every k in `k_range` and return only the winner.
    pub fn select_best(
        &self,
        matrix: &FeatureMatrix,
        k_range: KRange,
        seed: u64,
    ) -> Result<ClusterCandidate> {
        self.select(matrix, k_range, seed).map(|s| s.best)
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

    /// Three topics, five near-identical documents each; variants repeat one
    /// topic term. Row `3 * i + blob`.
    fn three_blobs() -> FeatureMatrix {
        let topics = [
            ["printer", "jam", "paper", "tray"],
            ["vpn", "connect", "drop", "remot"],
            ["invoic", "payment", "refund", "charg"],
        ];
        let mut raw: Vec<Vec<&str>> = Vec::new();
        for i in 0..5 {
            for topic in &topics {
                let mut doc = topic.to_vec();
                if i > 0 {
                    doc.push(topic[i - 1]);
                }
                raw.push(doc);
            }
        }
        let refs: Vec<&[&str]> = raw.iter().map(Vec::as_slice).collect();
        matrix(&refs)
    }

    #[test]
    fn test_auto_range() {
        assert_eq!(KRange::auto(100), KRange::new(2, 10));
        assert_eq!(KRange::auto(4), KRange::new(2, 3));
        assert_eq!(KRange::auto(2), KRange::new(2, 2));
    }

    #[test]
    fn test_min_cluster_size_cap() {
        assert_eq!(KRange::auto(100).with_min_cluster_size(100, 20), KRange::new(2, 5));
        assert_eq!(KRange::auto(10).with_min_cluster_size(10, 8), KRange::new(2, 2));
        assert_eq!(KRange::auto(10).with_min_cluster_size(10, 0), KRange::auto(10));
    }

    #[test]
    fn test_selects_three_blobs() {
        let m = three_blobs();
        let selection = ClusterSelector::<Kmeans>::default()
            .select(&m, KRange::new(2, 6), 42)
            .unwrap();
        assert_eq!(selection.best.k, 3);
        assert!(selection.best.silhouette > 0.5, "{}", selection.best.silhouette);
        assert_eq!(selection.candidates.len(), 5);
        assert_eq!(
            selection.candidates.iter().map(|c| c.k).collect::<Vec<_>>(),
            vec![2, 3, 4, 5, 6]
        );

        // Blob members share a label.
        let a = selection.best.assignments();
        for blob in 0..3 {
            for i in 0..5 {
                assert_eq!(a[blob + 3 * i], a[blob]);
            }
        }
    }

    #[test]
    fn test_selection_is_deterministic() {
        let m = three_blobs();
        let selector = ClusterSelector::new(Kmeans::new());
        let a = selector.select(&m, KRange::new(2, 5), 9).unwrap();
        let b = selector.select(&m, KRange::new(2, 5), 9).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_k_at_or_above_n_is_undefined() {
        let m = matrix(&[&["vpn"], &["vpn"], &["printer"]]);
        let selection = ClusterSelector::new(Kmeans::new())
            .select(&m, KRange::new(2, 4), 1)
            .unwrap();
        assert_eq!(selection.best.k, 2);
        // k = 3 stands for the whole undefined tail.
        assert_eq!(selection.candidates.len(), 2);
        assert_eq!(selection.candidates[1].k, 3);
        assert_eq!(selection.candidates[1].outcome, CandidateOutcome::Undefined);
    }

    #[test]
    fn test_huge_k_max_is_cut_at_n() {
        let m = matrix(&[&["vpn"], &["vpn"], &["printer"], &["printer"]]);
        let selection = ClusterSelector::new(Kmeans::new())
            .select(&m, KRange::new(2, usize::MAX), 3)
            .unwrap();
        assert_eq!(selection.best.k, 2);
        assert_eq!(
            selection.candidates.iter().map(|c| c.k).collect::<Vec<_>>(),
            vec![2, 3, 4]
        );

        let err = ClusterSelector::new(Kmeans::new())
            .select(&matrix(&[&["vpn"], &["printer"]]), KRange::new(2, usize::MAX), 3)
            .unwrap_err();
        assert_eq!(err, Error::NoValidClustering { k_min: 2, k_max: usize::MAX });
    }

    /// Labels `i % k` with zero centroids, whatever the data.
    struct RoundRobin;

    impl ClusterEngine for RoundRobin {
        fn run(&self, matrix: &FeatureMatrix, k: usize, _seed: u64) -> Result<Partition> {
            Ok(Partition {
                assignments: (0..matrix.n_rows()).map(|i| i % k).collect(),
                centroids: Array2::zeros((k, matrix.n_cols())),
                inertia: 0.0,
                iterations: 1,
                converged: true,
            })
        }
    }

    #[test]
    fn test_equal_silhouettes_prefer_smaller_k() {
        // Identical rows: every distance is 0, so every k scores exactly 0.
        let rows: [&[&str]; 6] = [&["vpn"]; 6];
        let m = matrix(&rows);
        let selection = ClusterSelector::new(RoundRobin)
            .select(&m, KRange::new(2, 4), 5)
            .unwrap();
        for c in &selection.candidates {
            assert!(matches!(
                c.outcome,
                CandidateOutcome::Scored { silhouette, .. } if silhouette == 0.0
            ));
        }
        assert_eq!(selection.best.k, 2);
    }

    #[test]
    fn test_degenerate_k_is_skipped() {
        let m = matrix(&[&["vpn"], &["vpn"], &["vpn"], &["printer"], &["printer"]]);
        let selection = ClusterSelector::new(Kmeans::new())
            .select(&m, KRange::new(2, 3), 1)
            .unwrap();
        assert_eq!(selection.best.k, 2);
        assert!(matches!(
            selection.candidates[1].outcome,
            CandidateOutcome::Degenerate { .. }
        ));
    }

    #[test]
    fn test_no_valid_clustering() {
        let m = matrix(&[&["vpn"], &["printer"]]);
        let err = ClusterSelector::new(Kmeans::new())
            .select_best(&m, KRange::new(2, 3), 1)
            .unwrap_err();
        assert_eq!(err, Error::NoValidClustering { k_min: 2, k_max: 3 });
    }

    #[test]
    fn test_invalid_range() {
        let m = matrix(&[&["vpn"], &["printer"], &["invoic"]]);
        let selector = ClusterSelector::new(Kmeans::new());
        assert!(selector.select(&m, KRange::new(1, 3), 1).is_err());
        assert!(selector.select(&m, KRange::new(4, 3), 1).is_err());
    }
}
