//! Error types for the tellus-reproject crate.

use tellus_dataset::DatasetError;

/// Error type for all fallible operations in the tellus-reproject crate.
#[derive(Debug, thiserror::Error)]
pub enum ReprojectError {
    /// Returned when source and target grids sit in different coordinate
    /// reference systems. Cross-CRS warping is the job of an external
    /// collaborator, not this crate.
    #[error("CRS mismatch: source is '{source_crs}', target is '{target_crs}'")]
    CrsMismatch {
        /// CRS descriptor of the dataset.
        source_crs: String,
        /// CRS descriptor of the target grid.
        target_crs: String,
    },

    /// Returned when a dataset lacks the georeferencing needed to place
    /// its pixels.
    #[error("dataset is not georeferenced: {reason}")]
    MissingGeoreference {
        /// What is missing.
        reason: String,
    },

    /// Returned for grids or variables the resampler cannot handle.
    #[error("invalid grid: {reason}")]
    InvalidGrid {
        /// Description of the problem.
        reason: String,
    },

    /// Wraps a dataset-layer failure while assembling the output.
    #[error("dataset error: {0}")]
    Dataset(#[from] DatasetError),
}
