//! Error types for the tellus-dataset crate.

/// Error type for all fallible operations in the tellus-dataset crate.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DatasetError {
    /// Returned when a dimension definition is malformed.
    #[error("invalid dimension '{name}': {reason}")]
    InvalidDimension {
        /// Name of the offending dimension.
        name: String,
        /// Description of the problem.
        reason: String,
    },

    /// Returned when two dimensions of the same name cannot be reconciled,
    /// or when an operation's dimension expectations are not met.
    #[error("dimension mismatch on '{name}': {reason}")]
    DimensionMismatch {
        /// Name of the offending dimension.
        name: String,
        /// Description of the incompatibility.
        reason: String,
    },

    /// Returned when a named dimension is not present in the dataset.
    #[error("unknown dimension '{name}'")]
    UnknownDimension {
        /// The missing dimension name.
        name: String,
    },

    /// Returned when a named variable is not present in the dataset.
    #[error("unknown variable '{name}'")]
    UnknownVariable {
        /// The missing variable name.
        name: String,
    },

    /// Returned when a dimension or variable name is already in use.
    #[error("name '{name}' is already in use")]
    DuplicateName {
        /// The conflicting name.
        name: String,
    },

    /// Returned when a variable's rank disagrees with its dimension list.
    #[error("variable declares {declared} dimension(s) but its array has rank {rank}")]
    RankMismatch {
        /// Number of dimension names declared.
        declared: usize,
        /// Actual array rank.
        rank: usize,
    },

    /// Returned when a variable's extent disagrees with a dimension's
    /// coordinate length.
    #[error("variable '{variable}' has extent {got} along '{dimension}', expected {expected}")]
    ShapeMismatch {
        /// Name of the variable.
        variable: String,
        /// Name of the dimension.
        dimension: String,
        /// Coordinate length of the dimension.
        expected: usize,
        /// Extent found on the array.
        got: usize,
    },

    /// Returned when a selection matches no coordinates.
    #[error("selection along '{dimension}' is empty")]
    EmptySelection {
        /// Dimension the selection was applied to.
        dimension: String,
    },

    /// Returned when an index range exceeds a dimension's extent.
    #[error("range {start}..{end} is out of bounds for '{dimension}' (extent {extent})")]
    RangeOutOfBounds {
        /// Dimension the range was applied to.
        dimension: String,
        /// Range start (inclusive).
        start: usize,
        /// Range end (exclusive).
        end: usize,
        /// Extent of the dimension.
        extent: usize,
    },

    /// Returned when the affine geotransform cannot be inverted.
    #[error("geotransform is singular and cannot be inverted")]
    SingularTransform,

    /// Returned when merge is called with no datasets.
    #[error("merge requires at least one dataset")]
    EmptyMerge,
}
