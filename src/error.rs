//! Error types for vicinage.

use thiserror::Error;

/// Errors that can occur while building neighbor lists or running searches.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    /// A neighbor list or search result was requested with capacity 0.
    #[error("invalid capacity: neighbor lists require k > 0")]
    InvalidCapacity,

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The similarity function returned NaN, which has no defined ordering.
    #[error("similarity function returned NaN")]
    InvalidSimilarity,

    /// Two results of differing capacities were merged.
    #[error("capacity mismatch: cannot merge results of capacity {left} and {right}")]
    CapacityMismatch { left: usize, right: usize },
}

/// Result type for vicinage operations.
pub type Result<T> = std::result::Result<T, GraphError>;
