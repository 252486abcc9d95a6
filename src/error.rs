use core::fmt;

/// Result alias for `ticket-cluster`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the clustering pipeline and its stages.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Input was empty.
    EmptyInput,

    /// Not enough usable signal to cluster on.
    ///
    /// Raised when the vocabulary is empty or fewer than two documents
    /// carry any features.
    InsufficientData {
        /// Documents carrying at least one feature.
        documents: usize,
        /// Vocabulary size.
        features: usize,
    },

    /// No candidate k produced a non-degenerate, well-defined clustering.
    NoValidClustering {
        /// Lower bound of the attempted range.
        k_min: usize,
        /// Upper bound of the attempted range.
        k_max: usize,
    },

    /// Dimension mismatch between two inputs that must agree.
    DimensionMismatch {
        /// Expected dimension.
        expected: usize,
        /// Found dimension.
        found: usize,
    },

    /// Invalid number of clusters requested.
    InvalidClusterCount {
        /// Requested count.
        requested: usize,
        /// Number of items.
        n_items: usize,
    },

    /// Invalid parameter value.
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Error message.
        message: &'static str,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::EmptyInput => write!(f, "empty input provided"),
            Error::InsufficientData {
                documents,
                features,
            } => write!(
                f,
                "insufficient data: {documents} usable documents, {features} features"
            ),
            Error::NoValidClustering { k_min, k_max } => {
                write!(f, "no valid clustering for any k in {k_min}..={k_max}")
            }
            Error::DimensionMismatch { expected, found } => {
                write!(f, "dimension mismatch: expected {expected}, found {found}")
            }
            Error::InvalidClusterCount { requested, n_items } => {
                write!(f, "cannot create {requested} clusters from {n_items} items")
            }
            Error::InvalidParameter { name, message } => {
                write!(f, "invalid parameter '{name}': {message}")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_mentions_range() {
        let err = Error::NoValidClustering { k_min: 2, k_max: 6 };
        assert_eq!(err.to_string(), "no valid clustering for any k in 2..=6");
    }
}
