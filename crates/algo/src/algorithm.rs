//! The algorithm capability contract.

use tellus_dataset::Dataset;

use crate::error::AlgoError;
use crate::signature::Signature;

/// A polymorphic unit of computation over datasets.
///
/// Implementations declare their dimension requirements through
/// [`signature`](Algorithm::signature) and transform one chunk at a time
/// through [`apply`](Algorithm::apply).
///
/// `apply` must be a pure function of the input chunk and the algorithm's
/// own immutable parameters: the scheduler dispatches chunks to parallel
/// workers and relies on re-executability. Algorithms that are stateful
/// along an axis declare that axis [`FullExtent`] so it is never chunked.
///
/// [`FullExtent`]: crate::signature::DimRequirement::FullExtent
pub trait Algorithm: Send + Sync {
    /// Stable identifier used in logs and error reports.
    fn name(&self) -> &str;

    /// Declared input requirements and output dimension effect.
    fn signature(&self) -> Signature;

    /// Transforms one chunk into its output.
    ///
    /// # Errors
    ///
    /// Returns [`AlgoError::Apply`] on failure; the scheduler treats this
    /// as fatal for the whole run and attaches the chunk's tile range.
    fn apply(&self, chunk: &Dataset) -> Result<Dataset, AlgoError>;
}
