//! End-to-end ticket clustering.
//!
//! [`TicketClusterer::run`] chains normalization, TF-IDF, k selection and
//! summarization, and packages the result as a [`ClusteringReport`].
//!
//! A ticket whose text normalizes to nothing is still assigned: its row is
//! the zero vector and lands on the nearest centroid like any other. At
//! least two tickets must carry vocabulary for clustering to mean anything.

use log::{info, warn};
use serde::Serialize;

use crate::cluster::{CandidateScore, ClusterAssignment, ClusterSelector, KRange};
use crate::config::ClusteringConfig;
use crate::error::{Error, Result};
use crate::summarize::ClusterSummary;
use crate::text::{self, TextNormalizer};
use crate::ticket::Ticket;

/// Cluster membership of one ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TicketAssignment {
    /// Ticket id.
    pub ticket_id: String,
    /// Cluster index.
    pub cluster: usize,
}

/// How the final clustering was reached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostics {
    /// Number of clusters chosen.
    pub chosen_k: usize,
    /// Mean silhouette of the chosen partition.
    pub silhouette: f64,
    /// Range searched.
    pub k_range: KRange,
    /// Outcome for every k in the range.
    pub candidates: Vec<CandidateScore>,
    /// Tickets clustered.
    pub n_documents: usize,
    /// Vocabulary size.
    pub n_features: usize,
    /// Tickets with no vocabulary terms.
    pub empty_documents: usize,
    /// Lloyd iterations of the kept K-means run.
    pub iterations: usize,
    /// Whether that run converged before the iteration cap.
    pub converged: bool,
}

/// Output of [`TicketClusterer::run`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusteringReport {
    /// One entry per input ticket, in input order.
    pub assignments: Vec<TicketAssignment>,
    /// One summary per cluster, by index.
    pub clusters: Vec<ClusterSummary>,
    /// Selection details.
    pub diagnostics: Diagnostics,
    /// Final partition with centroids.
    #[serde(skip)]
    pub assignment: ClusterAssignment,
}

impl ClusteringReport {
    /// Cluster index of `ticket_id`, if it was part of the input.
    pub fn cluster_of(&self, ticket_id: &str) -> Option<usize> {
        self.assignments
            .iter()
            .find(|a| a.ticket_id == ticket_id)
            .map(|a| a.cluster)
    }

    /// Ids of the tickets in `cluster`, in input order.
    pub fn members(&self, cluster: usize) -> Vec<&str> {
        self.assignments
            .iter()
            .filter(|a| a.cluster == cluster)
            .map(|a| a.ticket_id.as_str())
            .collect()
    }
}

/// Runs the full pipeline with one configuration.
#[derive(Debug, Clone, Default)]
pub struct TicketClusterer {
    config: ClusteringConfig,
}

impl TicketClusterer {
    /// Clusterer using `config`.
    pub fn new(config: ClusteringConfig) -> Self {
        Self { config }
    }

    /// Active configuration.
    pub fn config(&self) -> &ClusteringConfig {
        &self.config
    }

    /// Cluster `tickets` and summarize the result.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidParameter`] for an empty ticket id or bad config.
    /// - [`Error::InsufficientData`] for fewer than two tickets, or fewer
    ///   than two tickets with any vocabulary term.
    /// - [`Error::NoValidClustering`] when no k in the range scores.
    pub fn run(&self, tickets: &[Ticket]) -> Result<ClusteringReport> {
        let n = tickets.len();
        if n < 2 {
            return Err(Error::InsufficientData {
                documents: n,
                features: 0,
            });
        }
        if tickets.iter().any(|t| t.id.is_empty()) {
            return Err(Error::InvalidParameter {
                name: "ticket.id",
                message: "must be non-empty",
            });
        }
        info!("clustering {n} tickets");

        let normalizer = TextNormalizer::new(&self.config.normalizer);
        let documents = normalizer.normalize_all(tickets.iter().map(|t| t.text.as_str()));
        let matrix = self.config.feature_extractor().fit(&documents)?;

        let usable = matrix.non_empty_rows();
        if usable < 2 {
            return Err(Error::InsufficientData {
                documents: usable,
                features: matrix.n_cols(),
            });
        }
        let empty_documents = n - usable;
        if empty_documents > 0 {
            warn!("{empty_documents} tickets have no vocabulary terms");
        }

        let k_range = self.config.k_range_for(n);
        let selection = ClusterSelector::new(self.config.kmeans()).select(
            &matrix,
            k_range,
            self.config.random_seed,
        )?;
        let best = selection.best;

        let clusters = self
            .config
            .summarizer()
            .with_surface_forms(text::surface_forms(&documents))
            .summarize(&matrix, &best, tickets)?;

        let assignments = tickets
            .iter()
            .zip(best.assignments())
            .map(|(t, &cluster)| TicketAssignment {
                ticket_id: t.id.clone(),
                cluster,
            })
            .collect();

        info!(
            "{n} tickets -> {} clusters (silhouette {:.4}, {} features)",
            best.k,
            best.silhouette,
            matrix.n_cols()
        );

        Ok(ClusteringReport {
            assignments,
            clusters,
            diagnostics: Diagnostics {
                chosen_k: best.k,
                silhouette: best.silhouette,
                k_range,
                candidates: selection.candidates,
                n_documents: n,
                n_features: matrix.n_cols(),
                empty_documents,
                iterations: best.partition.iterations,
                converged: best.partition.converged,
            },
            assignment: best,
        })
    }
}
