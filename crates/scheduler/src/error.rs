//! Error types for the tellus-scheduler crate.

use tellus_algo::AlgoError;
use tellus_dataset::DatasetError;

/// Error type for all fallible operations in the tellus-scheduler crate.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    /// Returned when the scheduler configuration is invalid.
    #[error("invalid scheduler configuration: {reason}")]
    InvalidConfig {
        /// Description of the problem.
        reason: String,
    },

    /// Returned when the chain's signature does not match the dataset.
    /// Detected before any tile is dispatched.
    #[error("chain validation failed: {0}")]
    Validation(#[from] AlgoError),

    /// Returned at planning time when even minimal chunks cannot satisfy
    /// the halo requirement within the memory budget.
    #[error(
        "memory budget exhausted at planning: minimal halo-extended tile needs \
         {required_bytes} bytes but the budget is {budget_bytes}"
    )]
    Resource {
        /// Configured budget in bytes.
        budget_bytes: usize,
        /// Bytes needed by the smallest possible tile.
        required_bytes: usize,
    },

    /// Returned when the worker pool cannot be constructed.
    #[error("failed to build worker pool: {reason}")]
    ThreadPool {
        /// Description of the underlying failure.
        reason: String,
    },

    /// Returned when an algorithm fails on a tile. Fatal for the whole
    /// run; the tile's index ranges identify the failing chunk for re-runs.
    #[error("run failed on tile {tile}: {source}")]
    Algorithm {
        /// Index ranges of the failing tile.
        tile: String,
        /// The underlying algorithm error (carries the algorithm id).
        source: AlgoError,
    },

    /// Returned at merge time when a tile's output extent disagrees with
    /// the plan, meaning an algorithm produced data outside its declared
    /// signature.
    #[error(
        "tile {tile}: output variable '{variable}' has extent {got} along \
         '{dimension}', expected {expected}"
    )]
    MergeShape {
        /// Index ranges of the offending tile.
        tile: String,
        /// Output variable name.
        variable: String,
        /// Dimension with the unexpected extent.
        dimension: String,
        /// Extent required by the plan.
        expected: usize,
        /// Extent found on the tile output.
        got: usize,
    },

    /// Returned at merge time when a tile's output variable set or layout
    /// disagrees with the plan derived from the first tile.
    #[error("tile {tile}: output variable '{variable}' does not match the planned output layout")]
    MergeVariables {
        /// Index ranges of the offending tile.
        tile: String,
        /// Variable that is missing, unexpected, or laid out differently.
        variable: String,
    },

    /// Wraps a dataset-layer failure during slicing or assembly.
    #[error("dataset error: {0}")]
    Dataset(#[from] DatasetError),
}
