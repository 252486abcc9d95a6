//! Clustering of TF-IDF document rows.
//!
//! ## K-means
//!
//! Assign each document to the nearest centroid, then move each centroid to
//! the mean of its documents. Repeat.
//!
//! **Objective**: Minimize within-cluster sum of squares:
//!
//! ```text
//! J = Σ_k Σ_{x ∈ C_k} ||x - μ_k||²
//! ```
//!
//! Rows are L2-normalized, so squared Euclidean distance is a monotone
//! function of cosine similarity (`2 - 2·cos`) and K-means groups tickets by
//! shared vocabulary rather than by length.
//!
//! ## Choosing k
//!
//! K-means needs k up front. [`ClusterSelector`] runs the engine for every k
//! in a [`KRange`] and keeps the partition with the highest mean silhouette.
//!
//! ## Usage
//!
//! ```rust
//! use ticket_cluster::cluster::{ClusterSelector, KRange, Kmeans};
//! use ticket_cluster::features::FeatureExtractor;
//! use ticket_cluster::text::TextNormalizer;
//!
//! let normalizer = TextNormalizer::default();
//! let docs = normalizer.normalize_all([
//!     "printer jammed again",
//!     "printer paper jam",
//!     "vpn keeps disconnecting",
//!     "cannot connect to vpn",
//! ]);
//! let matrix = FeatureExtractor::new().fit(&docs).unwrap();
//!
//! let selection = ClusterSelector::new(Kmeans::new())
//!     .select(&matrix, KRange::new(2, 3), 42)
//!     .unwrap();
//! let labels = selection.best.assignments();
//! assert_eq!(labels[0], labels[1]);
//! assert_ne!(labels[0], labels[2]);
//! ```

mod kmeans;
mod select;
mod traits;

pub use kmeans::Kmeans;
pub use select::{
    CandidateOutcome, CandidateScore, ClusterAssignment, ClusterCandidate, ClusterSelector,
    KRange, Selection, DEFAULT_MAX_K,
};
pub use traits::{ClusterEngine, Partition};
