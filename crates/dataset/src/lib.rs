//! Labeled n-dimensional datasets for Earth-observation processing.
//!
//! This crate provides the data model the rest of the Tellus engine is
//! built on: named, coordinate-indexed [`Dimension`]s with semantic roles,
//! dense [`Variable`]s backed by `ndarray`, and the [`Dataset`] container
//! tying them together with CRS and affine-transform metadata.
//!
//! # Quick start
//!
//! ```
//! use ndarray::ArrayD;
//! use tellus_dataset::{Dataset, Dimension, Role, Variable};
//!
//! let mut ds = Dataset::new();
//! ds.add_dimension(Dimension::numeric("y", vec![10.0, 20.0], Role::SpatialY)?)?;
//! ds.add_dimension(Dimension::numeric("x", vec![0.0, 1.0, 2.0], Role::SpatialX)?)?;
//!
//! let data = ArrayD::zeros(ndarray::IxDyn(&[2, 3]));
//! ds.add_variable("ndvi", Variable::new(vec!["y".into(), "x".into()], data)?)?;
//!
//! let west = ds.select_index("x", 0..2)?;
//! assert_eq!(west.extent("x"), Some(2));
//! # Ok::<(), tellus_dataset::DatasetError>(())
//! ```
//!
//! All operations are referentially transparent: selection, merging and
//! reduction return new datasets and never mutate their inputs.

mod dataset;
mod dimension;
mod error;
mod geo;
mod merge;
mod reduce;
mod select;
mod variable;

pub use dataset::Dataset;
pub use dimension::{Alignment, Coordinates, Dimension, Role, DEFAULT_ALIGN_TOL};
pub use error::DatasetError;
pub use geo::{GeoMeta, GeoTransform};
pub use reduce::Aggregator;
pub use variable::Variable;
