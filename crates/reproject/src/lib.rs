//! Grid resampling for the Tellus engine.
//!
//! Exposes the narrow [`Resample`] contract the engine consumes, a
//! [`GridSpec`] describing a target raster grid, and [`GridResampler`],
//! an affine same-CRS implementation (nearest / bilinear). Warping
//! between coordinate systems is out of scope; datasets in a different
//! CRS than the target grid are rejected with
//! [`ReprojectError::CrsMismatch`].

mod error;
mod grid;
mod resample;

pub use error::ReprojectError;
pub use grid::GridSpec;
pub use resample::{GridResampler, Resample, ResampleMethod};
