//! Tiled parallel scheduler for the Tellus engine.
//!
//! The scheduler takes a dataset and an algorithm [`Chain`], plans a
//! tiling that fits a per-tile memory budget, extends every tile by the
//! chain's combined halo (clamped at the grid edges), applies the chain
//! to the tiles in parallel, and stitches the tile interiors back into a
//! single output dataset. Dimensions any step requires at full extent
//! are never chunked.
//!
//! # Quick start
//!
//! ```
//! use ndarray::ArrayD;
//! use tellus_algo::{Chain, MeanFilter};
//! use tellus_dataset::{Dataset, Dimension, Role, Variable};
//! use tellus_scheduler::{run, SchedulerConfig};
//!
//! let mut ds = Dataset::new();
//! ds.add_dimension(Dimension::numeric(
//!     "y",
//!     (0..8).map(|i| i as f64).collect(),
//!     Role::SpatialY,
//! )?)?;
//! ds.add_dimension(Dimension::numeric(
//!     "x",
//!     (0..8).map(|i| i as f64).collect(),
//!     Role::SpatialX,
//! )?)?;
//! ds.add_variable(
//!     "v",
//!     Variable::new(
//!         vec!["y".to_string(), "x".to_string()],
//!         ArrayD::zeros(ndarray::IxDyn(&[8, 8])),
//!     )?,
//! )?;
//!
//! let chain = Chain::new().with_step(Box::new(MeanFilter::new(3)?));
//! let config = SchedulerConfig::new().with_max_tile_bytes(512);
//! let out = run(&ds, &chain, &config)?;
//! assert_eq!(out.extent("x"), Some(8));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! [`Chain`]: tellus_algo::Chain

mod config;
mod error;
mod plan;
mod run;

pub use config::{SchedulerConfig, DEFAULT_MAX_TILE_BYTES};
pub use error::SchedulerError;
pub use plan::{plan, Plan, Tile, TileRange};
pub use run::{run, RunState};
