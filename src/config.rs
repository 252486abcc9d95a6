//! Pipeline configuration.
//!
//! Every field has a default, so a config file only needs the values it
//! changes:
//!
//! ```json
//! { "k_range": { "min": 2, "max": 6 }, "min_doc_freq": 2, "random_seed": 7 }
//! ```

use serde::{Deserialize, Serialize};

use crate::cluster::{KRange, Kmeans};
use crate::features::FeatureExtractor;
use crate::summarize::ClusterSummarizer;
use crate::text::NormalizerConfig;

/// Options for [`TicketClusterer`](crate::TicketClusterer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusteringConfig {
    /// Candidate cluster counts; `None` means `2..=min(10, N - 1)`.
    pub k_range: Option<KRange>,
    /// Vocabulary cap.
    pub max_features: Option<usize>,
    /// Terms in fewer documents are dropped.
    pub min_doc_freq: usize,
    /// Terms in more than this fraction of documents are dropped.
    pub max_doc_freq: f64,
    /// Terms listed per cluster summary.
    pub top_n: usize,
    /// Sample tickets listed per cluster summary.
    pub sample_size: usize,
    /// Seed for centroid initialization.
    pub random_seed: u64,
    /// Lloyd iteration cap.
    pub max_iter: usize,
    /// K-means restarts per candidate k.
    pub n_init: usize,
    /// Centroid-shift convergence tolerance.
    pub tol: f64,
    /// Cap the automatic k range at `N / min_docs_per_cluster`.
    pub min_docs_per_cluster: Option<usize>,
    /// Text cleaning options.
    pub normalizer: NormalizerConfig,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            k_range: None,
            max_features: None,
            min_doc_freq: 1,
            max_doc_freq: 1.0,
            top_n: 10,
            sample_size: 3,
            random_seed: 42,
            max_iter: 300,
            n_init: 10,
            tol: 1e-4,
            min_docs_per_cluster: None,
            normalizer: NormalizerConfig::default(),
        }
    }
}

impl ClusteringConfig {
    /// Set candidate k range.
    pub fn with_k_range(mut self, min: usize, max: usize) -> Self {
        self.k_range = Some(KRange::new(min, max));
        self
    }

    /// Set vocabulary cap.
    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = Some(max_features);
        self
    }

    /// Set minimum document frequency.
    pub fn with_min_doc_freq(mut self, min_doc_freq: usize) -> Self {
        self.min_doc_freq = min_doc_freq;
        self
    }

    /// Set maximum document frequency ratio.
    pub fn with_max_doc_freq(mut self, max_doc_freq: f64) -> Self {
        self.max_doc_freq = max_doc_freq;
        self
    }

    /// Set terms per summary.
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    /// Set samples per summary.
    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = sample_size;
        self
    }

    /// Set random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.random_seed = seed;
        self
    }

    /// Set K-means restarts.
    pub fn with_n_init(mut self, n_init: usize) -> Self {
        self.n_init = n_init;
        self
    }

    /// Set Lloyd iteration cap.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set minimum average cluster size for the automatic k range.
    pub fn with_min_docs_per_cluster(mut self, min_docs: usize) -> Self {
        self.min_docs_per_cluster = Some(min_docs);
        self
    }

    /// Set text cleaning options.
    pub fn with_normalizer(mut self, normalizer: NormalizerConfig) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Range to search for `n` documents.
    pub fn k_range_for(&self, n: usize) -> KRange {
        let range = self.k_range.unwrap_or_else(|| KRange::auto(n));
        match self.min_docs_per_cluster {
            Some(min_docs) if self.k_range.is_none() => range.with_min_cluster_size(n, min_docs),
            _ => range,
        }
    }

    pub(crate) fn feature_extractor(&self) -> FeatureExtractor {
        FeatureExtractor::new()
            .with_max_features(self.max_features)
            .with_min_doc_freq(self.min_doc_freq)
            .with_max_doc_freq(self.max_doc_freq)
    }

    pub(crate) fn kmeans(&self) -> Kmeans {
        Kmeans::new()
            .with_max_iter(self.max_iter)
            .with_n_init(self.n_init)
            .with_tol(self.tol)
    }

    pub(crate) fn summarizer(&self) -> ClusterSummarizer {
        ClusterSummarizer::new(self.top_n, self.sample_size)
    }
}
