//! NetCDF adapter for the Tellus engine.
//!
//! Maps NetCDF files onto [`Dataset`]s and back: [`open`] infers
//! dimension roles from CF attributes (with name heuristics as
//! fallback), reads CRS and affine transform from a `spatial_ref`
//! grid-mapping variable, and synthesizes index coordinates for
//! dimensions without a coordinate variable; [`write`] emits a file
//! [`open`] restores faithfully.
//!
//! [`Dataset`]: tellus_dataset::Dataset

mod error;
mod netcdf_read;
mod netcdf_write;

pub use error::IoError;
pub use netcdf_read::open;
pub use netcdf_write::write;
