//! TF-IDF feature extraction.
//!
//! Turns normalized documents into a row-per-document sparse matrix over a
//! fixed, alphabetically ordered vocabulary.
//!
//! # Weighting
//!
//! ```text
//! w(t, d) = tf(t, d) × idf(t)
//! idf(t)  = ln((1 + N) / (1 + df(t))) + 1
//! ```
//!
//! `tf` is the raw count of `t` in `d`, `N` the number of documents and
//! `df(t)` the number of documents containing `t`. The smoothing keeps idf
//! finite and strictly positive, so a term present in every document still
//! contributes. Each row is then L2-normalized; an empty document stays the
//! zero vector.
//!
//! # Vocabulary pruning
//!
//! - `min_doc_freq`: drop terms seen in fewer documents (typos, one-off ids).
//! - `max_doc_freq`: drop terms seen in more than this fraction of documents.
//! - `max_features`: keep only the highest-df terms (ties alphabetical).

mod sparse;

pub use sparse::SparseVector;

use std::collections::{BTreeMap, HashMap, HashSet};

use log::debug;
use ndarray::Array2;

use crate::error::{Error, Result};
use crate::text::NormalizedDocument;

/// Ordered term list defining column semantics of a [`FeatureMatrix`].
///
/// Immutable once built: centroid coordinates are only meaningful relative
/// to this ordering.
#[derive(Debug, Clone, PartialEq)]
pub struct Vocabulary {
    terms: Vec<String>,
    index: HashMap<String, usize>,
    doc_freq: Vec<usize>,
    idf: Vec<f64>,
}

impl Vocabulary {
    /// Number of terms (columns).
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// True when no term survived pruning.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Term at `column`.
    pub fn term(&self, column: usize) -> Option<&str> {
        self.terms.get(column).map(String::as_str)
    }

    /// Column of `term`.
    pub fn column(&self, term: &str) -> Option<usize> {
        self.index.get(term).copied()
    }

    /// All terms in column order.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Document frequency of the term at `column`.
    pub fn doc_freq(&self, column: usize) -> Option<usize> {
        self.doc_freq.get(column).copied()
    }

    /// Inverse document frequency of the term at `column`.
    pub fn idf(&self, column: usize) -> Option<f64> {
        self.idf.get(column).copied()
    }
}

/// Row-per-document TF-IDF matrix plus its vocabulary.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    rows: Vec<SparseVector>,
    vocabulary: Vocabulary,
}

impl FeatureMatrix {
    /// Number of documents.
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Number of features (vocabulary size).
    pub fn n_cols(&self) -> usize {
        self.vocabulary.len()
    }

    /// Row `i`.
    pub fn row(&self, i: usize) -> &SparseVector {
        &self.rows[i]
    }

    /// All rows, in document order.
    pub fn rows(&self) -> &[SparseVector] {
        &self.rows
    }

    /// Column semantics.
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Documents whose row is not the zero vector.
    pub fn non_empty_rows(&self) -> usize {
        self.rows.iter().filter(|r| !r.is_zero()).count()
    }

    /// Dense copy, for inspection and small inputs.
    pub fn to_dense(&self) -> Array2<f64> {
        let mut dense = Array2::zeros((self.n_rows(), self.n_cols()));
        for (i, row) in self.rows.iter().enumerate() {
            row.add_to(dense.row_mut(i));
        }
        dense
    }
}

/// Builds a [`FeatureMatrix`] from normalized documents.
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    /// Vocabulary cap.
    max_features: Option<usize>,
    /// Minimum document frequency (absolute count).
    min_doc_freq: usize,
    /// Maximum document frequency (fraction of documents).
    max_doc_freq: f64,
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureExtractor {
    /// Extractor keeping every term seen in at least one document.
    pub fn new() -> Self {
        Self {
            max_features: None,
            min_doc_freq: 1,
            max_doc_freq: 1.0,
        }
    }

    /// Cap vocabulary size, keeping the highest document-frequency terms.
    pub fn with_max_features(mut self, max_features: Option<usize>) -> Self {
        self.max_features = max_features;
        self
    }

    /// Drop terms appearing in fewer than `min_doc_freq` documents.
    pub fn with_min_doc_freq(mut self, min_doc_freq: usize) -> Self {
        self.min_doc_freq = min_doc_freq;
        self
    }

    /// Drop terms appearing in more than this fraction of documents.
    pub fn with_max_doc_freq(mut self, max_doc_freq: f64) -> Self {
        self.max_doc_freq = max_doc_freq;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.max_features == Some(0) {
            return Err(Error::InvalidParameter {
                name: "max_features",
                message: "must be positive",
            });
        }
        if !(self.max_doc_freq > 0.0 && self.max_doc_freq <= 1.0) {
            return Err(Error::InvalidParameter {
                name: "max_doc_freq",
                message: "must be in (0, 1]",
            });
        }
        Ok(())
    }

    /// Learn the vocabulary and weight every document.
    ///
    /// Fails with [`Error::InsufficientData`] when no term survives pruning.
    pub fn fit(&self, documents: &[NormalizedDocument]) -> Result<FeatureMatrix> {
        self.validate()?;
        if documents.is_empty() {
            return Err(Error::EmptyInput);
        }
        let n = documents.len();

        let mut df: HashMap<&str, usize> = HashMap::new();
        for doc in documents {
            let unique: HashSet<&str> = doc.tokens().iter().map(String::as_str).collect();
            for term in unique {
                *df.entry(term).or_insert(0) += 1;
            }
        }

        let max_count = self.max_doc_freq * n as f64;
        let mut kept: Vec<(&str, usize)> = df
            .into_iter()
            .filter(|&(_, f)| f >= self.min_doc_freq && f as f64 <= max_count)
            .collect();

        if let Some(cap) = self.max_features {
            if kept.len() > cap {
                kept.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
                kept.truncate(cap);
            }
        }
        kept.sort_by(|a, b| a.0.cmp(b.0));

        if kept.is_empty() {
            return Err(Error::InsufficientData {
                documents: 0,
                features: 0,
            });
        }

        let n_f = n as f64;
        let terms: Vec<String> = kept.iter().map(|(t, _)| t.to_string()).collect();
        let doc_freq: Vec<usize> = kept.iter().map(|&(_, f)| f).collect();
        let idf: Vec<f64> = doc_freq
            .iter()
            .map(|&f| ((1.0 + n_f) / (1.0 + f as f64)).ln() + 1.0)
            .collect();
        let index: HashMap<String, usize> = terms
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i))
            .collect();

        let rows: Vec<SparseVector> = documents
            .iter()
            .map(|doc| {
                let mut tf: BTreeMap<usize, f64> = BTreeMap::new();
                for token in doc.tokens() {
                    if let Some(&col) = index.get(token.as_str()) {
                        *tf.entry(col).or_insert(0.0) += 1.0;
                    }
                }
                let mut row = SparseVector::from_pairs(
                    tf.into_iter().map(|(col, count)| (col, count * idf[col])).collect(),
                );
                row.l2_normalize();
                row
            })
            .collect();

        let matrix = FeatureMatrix {
            rows,
            vocabulary: Vocabulary {
                terms,
                index,
                doc_freq,
                idf,
            },
        };
        debug!(
            "tf-idf: {} documents, {} features, {} empty rows",
            matrix.n_rows(),
            matrix.n_cols(),
            matrix.n_rows() - matrix.non_empty_rows()
        );
        Ok(matrix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs(raw: &[&[&str]]) -> Vec<NormalizedDocument> {
        raw.iter().map(|d| d.iter().copied().collect()).collect()
    }

    #[test]
    fn test_shape_and_alphabetical_vocabulary() {
        let d = docs(&[&["reset", "password"], &["payment", "fail"], &[]]);
        let m = FeatureExtractor::new().fit(&d).unwrap();
        assert_eq!(m.n_rows(), 3);
        assert_eq!(m.n_cols(), 4);
        assert_eq!(m.vocabulary().terms(), &["fail", "password", "payment", "reset"]);
        assert_eq!(m.vocabulary().column("payment"), Some(2));
    }

    #[test]
    fn test_smoothed_idf() {
        let d = docs(&[&["a", "b"], &["a"], &["a", "c"]]);
        let m = FeatureExtractor::new().fit(&d).unwrap();
        let v = m.vocabulary();
        // a in all 3 docs: ln(4/4) + 1
        assert!((v.idf(v.column("a").unwrap()).unwrap() - 1.0).abs() < 1e-12);
        // b in 1 doc: ln(4/2) + 1
        let expected = (2.0f64).ln() + 1.0;
        assert!((v.idf(v.column("b").unwrap()).unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_rows_are_unit_or_zero_and_nonnegative() {
        let d = docs(&[&["x", "x", "y"], &[], &["y", "z"]]);
        let m = FeatureExtractor::new().fit(&d).unwrap();
        assert!((m.row(0).squared_norm() - 1.0).abs() < 1e-12);
        assert!(m.row(1).is_zero());
        assert!((m.row(2).squared_norm() - 1.0).abs() < 1e-12);
        for row in m.rows() {
            assert!(row.iter().all(|(_, w)| w >= 0.0));
        }
    }

    #[test]
    fn test_term_frequency_counts() {
        let d = docs(&[&["x", "x", "y"], &["x", "y"]]);
        let m = FeatureExtractor::new().fit(&d).unwrap();
        // Same idf for x and y; doc 0 has x twice.
        let row: Vec<(usize, f64)> = m.row(0).iter().collect();
        assert!((row[0].1 / row[1].1 - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_min_doc_freq_drops_rare_terms() {
        let d = docs(&[&["common", "rare"], &["common"], &["common", "other"]]);
        let m = FeatureExtractor::new().with_min_doc_freq(2).fit(&d).unwrap();
        assert_eq!(m.vocabulary().terms(), &["common"]);
    }

    #[test]
    fn test_max_features_keeps_highest_df() {
        let d = docs(&[&["a", "b", "c"], &["a", "b"], &["a"]]);
        let m = FeatureExtractor::new()
            .with_max_features(Some(2))
            .fit(&d)
            .unwrap();
        assert_eq!(m.vocabulary().terms(), &["a", "b"]);
    }

    #[test]
    fn test_max_doc_freq_drops_ubiquitous_terms() {
        let d = docs(&[&["issue", "vpn"], &["issue", "printer"]]);
        let m = FeatureExtractor::new()
            .with_max_doc_freq(0.5)
            .fit(&d)
            .unwrap();
        assert_eq!(m.vocabulary().terms(), &["printer", "vpn"]);
    }

    #[test]
    fn test_empty_vocabulary_is_insufficient_data() {
        let d = docs(&[&[], &[]]);
        let err = FeatureExtractor::new().fit(&d).unwrap_err();
        assert!(matches!(err, Error::InsufficientData { .. }));
    }

    #[test]
    fn test_invalid_parameters() {
        let d = docs(&[&["a"]]);
        assert!(FeatureExtractor::new().with_max_features(Some(0)).fit(&d).is_err());
        assert!(FeatureExtractor::new().with_max_doc_freq(0.0).fit(&d).is_err());
    }

    #[test]
    fn test_refit_is_identical() {
        let d = docs(&[&["reset", "password"], &["password", "locked"], &["refund"]]);
        let extractor = FeatureExtractor::new();
        assert_eq!(extractor.fit(&d).unwrap(), extractor.fit(&d).unwrap());
    }

    #[test]
    fn test_to_dense() {
        let d = docs(&[&["a"], &["b"]]);
        let dense = FeatureExtractor::new().fit(&d).unwrap().to_dense();
        assert_eq!(dense.shape(), &[2, 2]);
        assert_eq!(dense[[0, 0]], 1.0);
        assert_eq!(dense[[1, 1]], 1.0);
    }
}
