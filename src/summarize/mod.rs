//! Per-cluster summaries: top terms and representative tickets.
//!
//! Terms are ranked by the cluster centroid's weight. Since centroids are
//! mean TF-IDF rows, a high weight means the term is both common inside the
//! cluster and distinctive across the corpus.
//!
//! Samples are the members closest to the centroid, which makes them the
//! most typical tickets of the cluster rather than the first ones filed.
//!
//! Everything here is deterministic: ties on weight fall back to vocabulary
//! column order, ties on distance to input order.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;

use crate::cluster::ClusterAssignment;
use crate::error::{Error, Result};
use crate::features::FeatureMatrix;
use crate::ticket::Ticket;

/// A vocabulary term and its centroid weight.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermWeight {
    /// Vocabulary term (a stem).
    pub term: String,
    /// Readable form of the term, the most common word it was stemmed from.
    pub label: String,
    /// Centroid weight.
    pub weight: f64,
}

/// Summary of one cluster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterSummary {
    /// Cluster index in the final assignment.
    pub cluster_index: usize,
    /// Number of member tickets.
    pub size: usize,
    /// Fraction of all tickets in this cluster.
    pub share: f64,
    /// Highest-weight terms, descending.
    pub top_terms: Vec<TermWeight>,
    /// Most representative member ids, closest to the centroid first.
    pub sample_ticket_ids: Vec<String>,
}

/// Builds [`ClusterSummary`] values from a final assignment.
#[derive(Debug, Clone)]
pub struct ClusterSummarizer {
    top_n: usize,
    sample_size: usize,
    surface_forms: HashMap<String, String>,
}

impl Default for ClusterSummarizer {
    fn default() -> Self {
        Self::new(10, 3)
    }
}

impl ClusterSummarizer {
    /// Keep `top_n` terms and `sample_size` samples per cluster.
    pub fn new(top_n: usize, sample_size: usize) -> Self {
        Self {
            top_n,
            sample_size,
            surface_forms: HashMap::new(),
        }
    }

    /// Stem → readable word mapping used for [`TermWeight::label`].
    ///
    /// Terms missing from the map are labelled with themselves.
    pub fn with_surface_forms(mut self, forms: HashMap<String, String>) -> Self {
        self.surface_forms = forms;
        self
    }

    /// One summary per cluster index `0..k`, in index order.
    pub fn summarize(
        &self,
        matrix: &FeatureMatrix,
        assignment: &ClusterAssignment,
        tickets: &[Ticket],
    ) -> Result<Vec<ClusterSummary>> {
        let n = matrix.n_rows();
        if tickets.len() != n {
            return Err(Error::DimensionMismatch {
                expected: n,
                found: tickets.len(),
            });
        }
        if assignment.assignments().len() != n {
            return Err(Error::DimensionMismatch {
                expected: n,
                found: assignment.assignments().len(),
            });
        }
        let centroids = assignment.centroids();
        if centroids.ncols() != matrix.n_cols() {
            return Err(Error::DimensionMismatch {
                expected: matrix.n_cols(),
                found: centroids.ncols(),
            });
        }

        let vocabulary = matrix.vocabulary();
        let mut summaries = Vec::with_capacity(assignment.k);
        for (c, centroid) in centroids.rows().into_iter().enumerate() {
            let mut ranked: Vec<(usize, f64)> = centroid
                .iter()
                .copied()
                .enumerate()
                .filter(|&(_, w)| w > 0.0)
                .collect();
            ranked.sort_by(|a, b| {
                b.1.partial_cmp(&a.1)
                    .unwrap_or(Ordering::Equal)
                    .then_with(|| a.0.cmp(&b.0))
            });
            let top_terms: Vec<TermWeight> = ranked
                .into_iter()
                .take(self.top_n)
                .filter_map(|(col, weight)| {
                    let term = vocabulary.term(col)?;
                    let label = self
                        .surface_forms
                        .get(term)
                        .cloned()
                        .unwrap_or_else(|| term.to_string());
                    Some(TermWeight {
                        term: term.to_string(),
                        label,
                        weight,
                    })
                })
                .collect();

            let sq_norm = centroid.dot(&centroid);
            let mut members: Vec<(usize, f64)> = assignment
                .assignments()
                .iter()
                .enumerate()
                .filter(|&(_, &a)| a == c)
                .map(|(i, _)| (i, matrix.row(i).squared_distance_dense(centroid, sq_norm)))
                .collect();
            let size = members.len();
            members.sort_by(|a, b| {
                a.1.partial_cmp(&b.1)
                    .unwrap_or(Ordering::Equal)
                    .then_with(|| a.0.cmp(&b.0))
            });
            let sample_ticket_ids: Vec<String> = members
                .into_iter()
                .take(self.sample_size)
                .map(|(i, _)| tickets[i].id.clone())
                .collect();

            summaries.push(ClusterSummary {
                cluster_index: c,
                size,
                share: size as f64 / n as f64,
                top_terms,
                sample_ticket_ids,
            });
        }
        Ok(summaries)
    }
}
