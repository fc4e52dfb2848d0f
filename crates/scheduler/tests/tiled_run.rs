//! End-to-end scheduler runs: tiled results must match untiled ones, full
//! extent requirements must be honoured, and failures must name the tile.

use ndarray::{ArrayD, IxDyn};
use tellus_algo::{Algorithm, AlgoError, Chain, ChangePoint, DimRequirement, MeanFilter, Signature, TemporalMean};
use tellus_dataset::{Aggregator, Dataset, Dimension, Role, Variable};
use tellus_scheduler::{run, SchedulerConfig, SchedulerError};

fn spatial_grid(ny: usize, nx: usize) -> Dataset {
    let mut ds = Dataset::new();
    ds.add_dimension(
        Dimension::numeric("y", (0..ny).map(|i| i as f64).collect(), Role::SpatialY).unwrap(),
    )
    .unwrap();
    ds.add_dimension(
        Dimension::numeric("x", (0..nx).map(|i| i as f64).collect(), Role::SpatialX).unwrap(),
    )
    .unwrap();
    let values: Vec<f64> = (0..ny * nx).map(|i| ((i * 31) % 17) as f64).collect();
    ds.add_variable(
        "v",
        Variable::new(
            vec!["y".to_string(), "x".to_string()],
            ArrayD::from_shape_vec(IxDyn(&[ny, nx]), values).unwrap(),
        )
        .unwrap(),
    )
    .unwrap();
    ds
}

fn cube(nt: usize, ny: usize, nx: usize) -> Dataset {
    let mut ds = Dataset::new();
    ds.add_dimension(
        Dimension::numeric("time", (0..nt).map(|i| i as f64).collect(), Role::Temporal).unwrap(),
    )
    .unwrap();
    ds.add_dimension(
        Dimension::numeric("y", (0..ny).map(|i| i as f64).collect(), Role::SpatialY).unwrap(),
    )
    .unwrap();
    ds.add_dimension(
        Dimension::numeric("x", (0..nx).map(|i| i as f64).collect(), Role::SpatialX).unwrap(),
    )
    .unwrap();
    let values: Vec<f64> = (0..nt * ny * nx).map(|i| ((i * 13) % 23) as f64).collect();
    ds.add_variable(
        "v",
        Variable::new(
            vec!["time".to_string(), "y".to_string(), "x".to_string()],
            ArrayD::from_shape_vec(IxDyn(&[nt, ny, nx]), values).unwrap(),
        )
        .unwrap(),
    )
    .unwrap();
    ds
}

#[test]
fn tiled_mean_filter_matches_untiled() {
    let ds = spatial_grid(10, 10);
    let chain = Chain::new().with_step(Box::new(MeanFilter::new(3).unwrap()));

    let direct = chain.apply(&ds).unwrap();
    // 400 bytes force four 5x5 tiles with a 1-pixel halo.
    let cfg = SchedulerConfig::new().with_max_tile_bytes(400);
    let tiled = run(&ds, &chain, &cfg).unwrap();

    assert_eq!(
        tiled.variable("v").unwrap().data(),
        direct.variable("v").unwrap().data()
    );
    assert_eq!(tiled.extent("y"), Some(10));
    assert_eq!(tiled.extent("x"), Some(10));
}

#[test]
fn tiled_chain_with_reducer_matches_untiled() {
    let ds = cube(8, 10, 10);
    let chain = Chain::new()
        .with_step(Box::new(MeanFilter::new(3).unwrap()))
        .with_step(Box::new(TemporalMean::new()));

    let direct = chain.apply(&ds).unwrap();
    let cfg = SchedulerConfig::new().with_max_tile_bytes(3200);
    let tiled = run(&ds, &chain, &cfg).unwrap();

    assert!(tiled.dim("time").is_none());
    assert_eq!(
        tiled.variable("v").unwrap().data(),
        direct.variable("v").unwrap().data()
    );
}

#[test]
fn pinned_worker_pool_gives_same_result() {
    let ds = spatial_grid(10, 10);
    let chain = Chain::new().with_step(Box::new(MeanFilter::new(3).unwrap()));

    let free = run(&ds, &chain, &SchedulerConfig::new().with_max_tile_bytes(400)).unwrap();
    let pinned = run(
        &ds,
        &chain,
        &SchedulerConfig::new().with_max_tile_bytes(400).with_workers(2),
    )
    .unwrap();
    assert_eq!(free, pinned);
}

#[test]
fn input_is_never_mutated() {
    let ds = spatial_grid(10, 10);
    let before = ds.clone();
    let chain = Chain::new().with_step(Box::new(MeanFilter::new(3).unwrap()));
    let _ = run(&ds, &chain, &SchedulerConfig::new().with_max_tile_bytes(400)).unwrap();
    assert_eq!(ds, before);
}

/// Reduces over time, failing unless every chunk carries the whole axis.
struct TimeProbe {
    expected_steps: usize,
}

impl Algorithm for TimeProbe {
    fn name(&self) -> &str {
        "time_probe"
    }

    fn signature(&self) -> Signature {
        Signature::new()
            .requires("time", DimRequirement::FullExtent)
            .drops("time")
    }

    fn apply(&self, chunk: &Dataset) -> Result<Dataset, AlgoError> {
        let steps = chunk.extent("time").unwrap_or(0);
        if steps != self.expected_steps {
            return Err(AlgoError::Apply {
                algorithm: self.name().to_string(),
                reason: format!(
                    "saw {steps} time steps, needs all {}",
                    self.expected_steps
                ),
            });
        }
        chunk
            .reduce("time", &Aggregator::Mean)
            .map_err(|e| AlgoError::Apply {
                algorithm: self.name().to_string(),
                reason: e.to_string(),
            })
    }
}

#[test]
fn full_extent_dimension_reaches_every_tile_whole() {
    let ds = cube(100, 4, 4);
    let chain = Chain::new().with_step(Box::new(TimeProbe {
        expected_steps: 100,
    }));

    // Budget sized for 2x2 spatial tiles carrying the whole time axis.
    let cfg = SchedulerConfig::new().with_max_tile_bytes(100 * 2 * 2 * 8);
    let out = run(&ds, &chain, &cfg).unwrap();

    assert!(out.dim("time").is_none());
    assert_eq!(out.extent("y"), Some(4));
    assert_eq!(out.extent("x"), Some(4));
}

#[test]
fn tiled_change_point_matches_untiled() {
    let nt = 6;
    let mut ds = Dataset::new();
    ds.add_dimension(
        Dimension::numeric(
            "time",
            (0..nt).map(|i| 2000.0 + i as f64).collect(),
            Role::Temporal,
        )
        .unwrap(),
    )
    .unwrap();
    ds.add_dimension(
        Dimension::numeric("y", (0..4).map(|i| i as f64).collect(), Role::SpatialY).unwrap(),
    )
    .unwrap();
    ds.add_dimension(
        Dimension::numeric("x", (0..4).map(|i| i as f64).collect(), Role::SpatialX).unwrap(),
    )
    .unwrap();
    // Step change after time index 2 at every pixel.
    let values: Vec<f64> = (0..nt * 16)
        .map(|i| if i / 16 < 3 { 0.0 } else { 9.0 })
        .collect();
    ds.add_variable(
        "v",
        Variable::new(
            vec!["time".to_string(), "y".to_string(), "x".to_string()],
            ArrayD::from_shape_vec(IxDyn(&[nt, 4, 4]), values).unwrap(),
        )
        .unwrap(),
    )
    .unwrap();

    let chain = Chain::new().with_step(Box::new(ChangePoint::new()));
    let direct = chain.apply(&ds).unwrap();
    let cfg = SchedulerConfig::new().with_max_tile_bytes(nt * 2 * 2 * 8);
    let tiled = run(&ds, &chain, &cfg).unwrap();

    assert_eq!(
        tiled.variable("v").unwrap().data(),
        direct.variable("v").unwrap().data()
    );
    assert_eq!(
        tiled.variable("v_magnitude").unwrap().data(),
        direct.variable("v_magnitude").unwrap().data()
    );
    // The detected change is reported as a time coordinate.
    assert_eq!(tiled.variable("v").unwrap().data()[IxDyn(&[0, 0])], 2002.0);
}

/// Fails on any chunk whose x coordinates contain a poisoned value.
struct PoisonedColumn {
    coord: f64,
}

impl Algorithm for PoisonedColumn {
    fn name(&self) -> &str {
        "poisoned_column"
    }

    fn signature(&self) -> Signature {
        Signature::new().requires("x", DimRequirement::Chunkable)
    }

    fn apply(&self, chunk: &Dataset) -> Result<Dataset, AlgoError> {
        let coords = chunk
            .dim("x")
            .and_then(|d| d.coords().as_numeric().map(<[f64]>::to_vec))
            .unwrap_or_default();
        if coords.contains(&self.coord) {
            return Err(AlgoError::Apply {
                algorithm: self.name().to_string(),
                reason: format!("bad column at x = {}", self.coord),
            });
        }
        Ok(chunk.clone())
    }
}

#[test]
fn failing_tile_is_named_and_nothing_is_published() {
    let ds = spatial_grid(10, 10);
    let chain = Chain::new().with_step(Box::new(PoisonedColumn { coord: 7.0 }));

    // No halo, so 400 bytes split x into [0..5) and [5..10).
    let cfg = SchedulerConfig::new().with_max_tile_bytes(400);
    let err = run(&ds, &chain, &cfg).unwrap_err();

    match err {
        SchedulerError::Algorithm { tile, source } => {
            assert!(tile.contains("x[5..10)"), "tile was {tile}");
            assert!(source.to_string().contains("poisoned_column"));
        }
        other => panic!("expected an algorithm failure, got {other}"),
    }
}

#[test]
fn exhausted_budget_fails_before_dispatch() {
    let ds = spatial_grid(10, 10);
    let chain = Chain::new().with_step(Box::new(MeanFilter::new(3).unwrap()));
    let err = run(&ds, &chain, &SchedulerConfig::new().with_max_tile_bytes(64)).unwrap_err();
    assert!(matches!(err, SchedulerError::Resource { .. }));
}

#[test]
fn mismatched_chain_fails_validation() {
    let ds = spatial_grid(4, 4);
    let chain = Chain::new().with_step(Box::new(TemporalMean::new()));
    let err = run(&ds, &chain, &SchedulerConfig::new()).unwrap_err();
    assert!(matches!(err, SchedulerError::Validation(_)));
}
