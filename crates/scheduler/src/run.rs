//! Tiled, parallel execution of an algorithm chain.

use std::collections::BTreeMap;

use ndarray::{ArrayD, IxDyn, Slice};
use rayon::prelude::*;
use tellus_algo::Chain;
use tellus_dataset::{Dataset, Variable};
use tracing::{debug, error, info};

use crate::config::SchedulerConfig;
use crate::error::SchedulerError;
use crate::plan::{plan, Plan, Tile};

/// Lifecycle of one scheduler run, in order. Surfaced through logs; a run
/// ends in `Done` or `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Tiling computed, nothing dispatched.
    Planned,
    /// Tiles are being handed to the worker pool.
    Dispatching,
    /// Workers are applying the chain to tiles.
    Computing,
    /// Tile interiors are being stitched into the output.
    Merging,
    /// Output dataset assembled.
    Done,
    /// A stage failed; no output is published.
    Failed,
}

/// Cuts the halo-extended chunk for one tile out of the input.
fn extract_chunk(ds: &Dataset, tile: &Tile) -> Result<Dataset, SchedulerError> {
    let mut chunk: Option<Dataset> = None;
    for r in tile.ranges() {
        let outer = r.outer();
        let full = ds.extent(r.dim()).unwrap_or(0);
        if outer.start == 0 && outer.end == full {
            continue;
        }
        let base = chunk.as_ref().unwrap_or(ds);
        chunk = Some(base.select_index(r.dim(), outer)?);
    }
    Ok(chunk.unwrap_or_else(|| ds.clone()))
}

/// Applies the chain to one tile's chunk.
fn compute_tile(ds: &Dataset, chain: &Chain, tile: &Tile) -> Result<Dataset, SchedulerError> {
    let chunk = extract_chunk(ds, tile)?;
    chain.apply(&chunk).map_err(|e| SchedulerError::Algorithm {
        tile: tile.label(),
        source: e,
    })
}

/// Stitches tile outputs into one dataset, writing only interiors.
fn merge_results(
    ds: &Dataset,
    plan: &Plan,
    results: &[(usize, Dataset)],
) -> Result<Dataset, SchedulerError> {
    // Tile order is deterministic, so the first tile fixes the output
    // layout: which dimensions survive, which were added, which
    // variables exist.
    let (_, first) = &results[0];

    let mut out = Dataset::new().with_geo(ds.geo().clone());
    for dim in first.dims() {
        match ds.dim(dim.name()) {
            // Surviving input dimensions come back at full extent.
            Some(full) => out.add_dimension(full.clone())?,
            None => out.add_dimension(dim.clone())?,
        }
    }

    let mut arrays: BTreeMap<String, (Vec<String>, ArrayD<f64>)> = BTreeMap::new();
    for (name, var) in first.variables() {
        let dims = var.dims().to_vec();
        let shape: Vec<usize> = dims
            .iter()
            .enumerate()
            .map(|(ax, d)| match ds.extent(d) {
                Some(full) => full,
                None => var.shape()[ax],
            })
            .collect();
        arrays.insert(name.clone(), (dims, ArrayD::zeros(IxDyn(&shape))));
    }

    for (tile_idx, result) in results {
        let tile = &plan.tiles()[*tile_idx];

        for name in arrays.keys() {
            if result.variable(name).is_none() {
                return Err(SchedulerError::MergeVariables {
                    tile: tile.label(),
                    variable: name.clone(),
                });
            }
        }

        for (name, var) in result.variables() {
            let Some((dims, arr)) = arrays.get_mut(name) else {
                return Err(SchedulerError::MergeVariables {
                    tile: tile.label(),
                    variable: name.clone(),
                });
            };
            if var.dims() != dims.as_slice() {
                return Err(SchedulerError::MergeVariables {
                    tile: tile.label(),
                    variable: name.clone(),
                });
            }

            let mut dest = arr.view_mut();
            let mut src = var.data().view();
            for (ax, d) in dims.iter().enumerate() {
                let (src_range, dest_range, expected) = match tile.range(d) {
                    Some(r) if r.is_chunked() => {
                        let interior = r.interior();
                        (
                            r.halo_lo()..r.halo_lo() + interior.len(),
                            interior,
                            r.outer().len(),
                        )
                    }
                    _ => {
                        let n = dest.shape()[ax];
                        (0..n, 0..n, n)
                    }
                };
                if var.shape()[ax] != expected {
                    return Err(SchedulerError::MergeShape {
                        tile: tile.label(),
                        variable: name.clone(),
                        dimension: d.clone(),
                        expected,
                        got: var.shape()[ax],
                    });
                }
                dest.slice_axis_inplace(ndarray::Axis(ax), Slice::from(dest_range));
                src.slice_axis_inplace(ndarray::Axis(ax), Slice::from(src_range));
            }
            dest.assign(&src);
        }
    }

    for (name, (dims, arr)) in arrays {
        out.add_variable(name, Variable::new(dims, arr)?)?;
    }
    Ok(out)
}

/// Runs `chain` over `ds` in halo-extended tiles and stitches the tile
/// interiors into one output dataset.
///
/// The input is never mutated. Tiles are computed in parallel; the
/// stitched result is bit-identical to applying the chain to the whole
/// dataset at once, provided every algorithm honours its declared
/// signature. Any failure aborts the run without publishing partial
/// output.
///
/// # Errors
///
/// - [`SchedulerError::InvalidConfig`] for a bad configuration.
/// - [`SchedulerError::Validation`] if the chain does not fit the dataset.
/// - [`SchedulerError::Resource`] if no tiling fits the memory budget.
/// - [`SchedulerError::Algorithm`] when a step fails on a tile; the error
///   names the tile's index ranges.
#[tracing::instrument(skip_all)]
pub fn run(
    ds: &Dataset,
    chain: &Chain,
    config: &SchedulerConfig,
) -> Result<Dataset, SchedulerError> {
    let fail = |e: SchedulerError| {
        error!(state = ?RunState::Failed, error = %e, "run aborted");
        e
    };

    config.validate().map_err(fail)?;
    chain
        .validate(ds)
        .map_err(|e| fail(SchedulerError::Validation(e)))?;

    let plan = plan(ds, chain, config).map_err(fail)?;
    debug!(
        state = ?RunState::Planned,
        tiles = plan.tiles().len(),
        "tiling ready"
    );

    debug!(state = ?RunState::Dispatching, workers = ?config.workers(), "dispatching tiles");
    let compute = || {
        debug!(state = ?RunState::Computing, "computing tiles");
        plan.tiles()
            .par_iter()
            .enumerate()
            .map(|(i, tile)| compute_tile(ds, chain, tile).map(|out| (i, out)))
            .collect::<Result<Vec<(usize, Dataset)>, SchedulerError>>()
    };

    let results = match config.workers() {
        Some(n) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .map_err(|e| {
                    fail(SchedulerError::ThreadPool {
                        reason: e.to_string(),
                    })
                })?;
            pool.install(compute)
        }
        None => compute(),
    }
    .map_err(fail)?;

    debug!(state = ?RunState::Merging, "stitching tile interiors");
    let out = merge_results(ds, &plan, &results).map_err(fail)?;

    info!(
        state = ?RunState::Done,
        tiles = plan.tiles().len(),
        vars = out.n_vars(),
        "run complete"
    );
    Ok(out)
}
