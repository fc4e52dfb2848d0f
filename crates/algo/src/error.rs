//! Error types for the tellus-algo crate.

/// Error type for all fallible operations in the tellus-algo crate.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AlgoError {
    /// Returned when an algorithm's declared signature does not match the
    /// dataset it is applied to.
    #[error("algorithm '{algorithm}' signature mismatch on '{dimension}': {reason}")]
    SignatureMismatch {
        /// Identifier of the algorithm.
        algorithm: String,
        /// Dimension involved in the mismatch.
        dimension: String,
        /// Description of the mismatch.
        reason: String,
    },

    /// Returned when an algorithm fails while transforming a chunk.
    #[error("algorithm '{algorithm}' failed: {reason}")]
    Apply {
        /// Identifier of the algorithm.
        algorithm: String,
        /// Description of the failure.
        reason: String,
    },

    /// Returned when an algorithm is constructed with invalid parameters.
    #[error("invalid parameters for '{algorithm}': {reason}")]
    InvalidParams {
        /// Identifier of the algorithm.
        algorithm: String,
        /// Description of the problem.
        reason: String,
    },

    /// Returned when a chain has no steps.
    #[error("algorithm chain is empty")]
    EmptyChain,
}
