//! # ticket-cluster
//!
//! Unsupervised grouping of support tickets into topics.
//!
//! The pipeline:
//!
//! 1. [`text`]: clean, tokenize, drop stop words, stem.
//! 2. [`features`]: TF-IDF rows, L2-normalized and sparse.
//! 3. [`cluster`]: K-means for every candidate k, best mean silhouette wins.
//! 4. [`summarize`]: top terms and representative tickets per cluster.
//!
//! [`TicketClusterer`] runs all four and returns a serializable
//! [`ClusteringReport`]. Every stage is deterministic for a fixed
//! [`ClusteringConfig::random_seed`].
//!
//! ```rust
//! use ticket_cluster::{ClusteringConfig, Ticket, TicketClusterer};
//!
//! let tickets = vec![
//!     Ticket::new("T1", "cannot reset my password"),
//!     Ticket::new("T2", "password reset not working"),
//!     Ticket::new("T3", "invoice payment failed"),
//!     Ticket::new("T4", "payment did not go through"),
//! ];
//! let report = TicketClusterer::new(ClusteringConfig::default().with_k_range(2, 3))
//!     .run(&tickets)
//!     .unwrap();
//! assert_eq!(report.diagnostics.chosen_k, 2);
//! assert_eq!(report.cluster_of("T1"), report.cluster_of("T2"));
//! ```
//!
//! Feature `parallel` evaluates candidate k values and silhouettes on the
//! rayon pool. Results are identical to the sequential build.

pub mod cluster;
pub mod config;
/// Error types used across `ticket-cluster`.
pub mod error;
pub mod features;
pub mod metrics;
pub mod pipeline;
pub mod summarize;
pub mod text;
pub mod ticket;


pub use cluster::{ClusterAssignment, ClusterSelector, KRange, Kmeans};
pub use config::ClusteringConfig;
pub use error::{Error, Result};
pub use features::{FeatureExtractor, FeatureMatrix};
pub use metrics::{silhouette_samples, silhouette_score};
pub use pipeline::{ClusteringReport, Diagnostics, TicketAssignment, TicketClusterer};
pub use summarize::{ClusterSummarizer, ClusterSummary};
pub use text::{NormalizedDocument, TextNormalizer};
pub use ticket::Ticket;
