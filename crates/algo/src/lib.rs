//! Algorithm abstraction for the Tellus engine.
//!
//! An [`Algorithm`] is a pure transform from an input chunk to an output
//! chunk, together with a declared [`Signature`]: which dimensions it
//! needs, how much halo neighborhood it requires along each, whether a
//! dimension must be present at full extent, and which dimensions its
//! output drops or adds. [`Chain`] composes algorithms sequentially; the
//! combined halo is the per-dimension maximum over the chain, computed
//! once.
//!
//! # Quick start
//!
//! ```
//! use tellus_algo::{Chain, MeanFilter, TemporalMean};
//!
//! let chain = Chain::new()
//!     .with_step(Box::new(MeanFilter::new(3)?))
//!     .with_step(Box::new(TemporalMean::new()));
//!
//! assert_eq!(chain.halo().get("x"), Some(&1));
//! assert!(chain.full_extent_dims().contains("time"));
//! # Ok::<(), tellus_algo::AlgoError>(())
//! ```

mod algorithm;
mod chain;
mod error;
mod filters;
mod signature;
mod temporal;

pub use algorithm::Algorithm;
pub use chain::Chain;
pub use error::AlgoError;
pub use filters::MeanFilter;
pub use signature::{DimRequirement, DimSpec, Signature};
pub use temporal::{ChangePoint, TemporalMean};
