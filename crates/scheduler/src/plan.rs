//! Tile planning: partitioning a dataset into halo-extended chunks that
//! fit the memory budget.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;
use std::ops::Range;

use tellus_algo::Chain;
use tellus_dataset::Dataset;
use tracing::debug;

use crate::config::SchedulerConfig;
use crate::error::SchedulerError;

/// The index span of one tile along one dimension.
///
/// The interior is the region the tile owns in the output; the halo
/// widths extend the read region on each side, already clamped at the
/// dimension edges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileRange {
    dim: String,
    interior: Range<usize>,
    halo_lo: usize,
    halo_hi: usize,
    chunked: bool,
}

impl TileRange {
    /// Dimension name.
    pub fn dim(&self) -> &str {
        &self.dim
    }

    /// Owned output region.
    pub fn interior(&self) -> Range<usize> {
        self.interior.clone()
    }

    /// Read region including the clamped halo.
    pub fn outer(&self) -> Range<usize> {
        (self.interior.start - self.halo_lo)..(self.interior.end + self.halo_hi)
    }

    /// Halo width actually available on the low side.
    pub fn halo_lo(&self) -> usize {
        self.halo_lo
    }

    /// Halo width actually available on the high side.
    pub fn halo_hi(&self) -> usize {
        self.halo_hi
    }

    /// True if this dimension was partitioned (rather than carried at
    /// full extent).
    pub fn is_chunked(&self) -> bool {
        self.chunked
    }
}

/// One unit of work: interior index ranges plus halos over every
/// dataset dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    ranges: Vec<TileRange>,
}

impl Tile {
    /// Per-dimension ranges, in dimension name order.
    pub fn ranges(&self) -> &[TileRange] {
        &self.ranges
    }

    /// Range along `dim`, if the dimension exists.
    pub fn range(&self, dim: &str) -> Option<&TileRange> {
        self.ranges.iter().find(|r| r.dim == dim)
    }

    /// Human-readable interior ranges of the partitioned dimensions,
    /// e.g. `y[0..5) x[5..10)`. Used to identify a tile in errors and
    /// logs.
    pub fn label(&self) -> String {
        let mut out = String::new();
        for r in self.ranges.iter().filter(|r| r.chunked) {
            if !out.is_empty() {
                out.push(' ');
            }
            let _ = write!(out, "{}[{}..{})", r.dim, r.interior.start, r.interior.end);
        }
        if out.is_empty() {
            out.push_str("full extent");
        }
        out
    }
}

/// The scheduler's work breakdown for one run.
#[derive(Debug, Clone)]
pub struct Plan {
    tiles: Vec<Tile>,
    chunk_sizes: BTreeMap<String, usize>,
    halo: BTreeMap<String, usize>,
}

impl Plan {
    /// All tiles, in deterministic grid order.
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Chosen chunk size per partitioned dimension.
    pub fn chunk_sizes(&self) -> &BTreeMap<String, usize> {
        &self.chunk_sizes
    }

    /// Combined per-dimension halo of the chain.
    pub fn halo(&self) -> &BTreeMap<String, usize> {
        &self.halo
    }
}

/// Bytes of variable data one tile holds for the given chunk sizes,
/// counting every variable at its halo-extended extents.
fn tile_cost_bytes(
    ds: &Dataset,
    chunk_sizes: &BTreeMap<String, usize>,
    halo: &BTreeMap<String, usize>,
) -> usize {
    let mut total = 0usize;
    for (_, var) in ds.variables() {
        let mut elems = 1usize;
        for dim in var.dims() {
            let full = ds.extent(dim).unwrap_or(0);
            let extent = match chunk_sizes.get(dim) {
                Some(&c) => {
                    let h = halo.get(dim).copied().unwrap_or(0);
                    (c + 2 * h).min(full)
                }
                None => full,
            };
            elems = elems.saturating_mul(extent);
        }
        total = total.saturating_add(elems);
    }
    total.saturating_mul(std::mem::size_of::<f64>())
}

/// Splits `0..extent` into consecutive chunks of `size`, the last one
/// possibly shorter.
fn partition(extent: usize, size: usize) -> Vec<Range<usize>> {
    let mut out = Vec::new();
    let mut start = 0;
    while start < extent {
        let end = (start + size).min(extent);
        out.push(start..end);
        start = end;
    }
    out
}

/// Plans the tiling for one run of `chain` over `ds`.
///
/// Only spatial and temporal dimensions are candidates for partitioning,
/// and any dimension the chain requires at full extent is excluded. The
/// planner starts from whole extents and repeatedly halves the largest
/// chunk size until every halo-extended tile fits `max_tile_bytes`.
///
/// # Errors
///
/// Returns [`SchedulerError::Resource`] if the minimal tiling (chunk
/// size 1 everywhere) still exceeds the budget. Nothing has been
/// dispatched when this is reported.
pub fn plan(
    ds: &Dataset,
    chain: &Chain,
    config: &SchedulerConfig,
) -> Result<Plan, SchedulerError> {
    let halo = chain.halo();
    let full_extent: BTreeSet<String> = chain.full_extent_dims();

    let mut chunk_sizes: BTreeMap<String, usize> = ds
        .dims()
        .filter(|d| d.role().is_tileable() && !full_extent.contains(d.name()))
        .map(|d| (d.name().to_string(), d.len()))
        .collect();

    let budget = config.max_tile_bytes();
    loop {
        let cost = tile_cost_bytes(ds, &chunk_sizes, &halo);
        if cost <= budget {
            break;
        }
        // Halve the largest chunk; ties resolve by name order for
        // deterministic plans.
        let target = chunk_sizes
            .iter()
            .filter(|(_, &c)| c > 1)
            .max_by(|(an, ac), (bn, bc)| ac.cmp(bc).then(bn.cmp(an)))
            .map(|(name, _)| name.clone());
        match target.and_then(|name| chunk_sizes.get_mut(&name)) {
            Some(c) => *c = (*c / 2).max(1),
            None => {
                return Err(SchedulerError::Resource {
                    budget_bytes: budget,
                    required_bytes: cost,
                });
            }
        }
    }

    // Cartesian product of the per-dimension partitions, dims in name
    // order so tile order is deterministic.
    let mut tiles: Vec<Vec<TileRange>> = vec![Vec::new()];
    for dim in ds.dims() {
        let name = dim.name();
        let extent = dim.len();
        let next: Vec<Vec<TileRange>> = match chunk_sizes.get(name) {
            Some(&c) => {
                let h = halo.get(name).copied().unwrap_or(0);
                let pieces = partition(extent, c);
                tiles
                    .iter()
                    .flat_map(|prefix| {
                        pieces.iter().map(move |interior| {
                            let mut ranges = prefix.clone();
                            ranges.push(TileRange {
                                dim: name.to_string(),
                                interior: interior.clone(),
                                halo_lo: h.min(interior.start),
                                halo_hi: h.min(extent - interior.end),
                                chunked: true,
                            });
                            ranges
                        })
                    })
                    .collect()
            }
            None => tiles
                .iter()
                .map(|prefix| {
                    let mut ranges = prefix.clone();
                    ranges.push(TileRange {
                        dim: name.to_string(),
                        interior: 0..extent,
                        halo_lo: 0,
                        halo_hi: 0,
                        chunked: false,
                    });
                    ranges
                })
                .collect(),
        };
        tiles = next;
    }

    let tiles: Vec<Tile> = tiles.into_iter().map(|ranges| Tile { ranges }).collect();
    debug!(
        n_tiles = tiles.len(),
        chunk_sizes = ?chunk_sizes,
        halo = ?halo,
        "tiling planned"
    );

    Ok(Plan {
        tiles,
        chunk_sizes,
        halo,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::ArrayD;
    use tellus_algo::{Chain, MeanFilter, TemporalMean};
    use tellus_dataset::{Dimension, Role, Variable};

    fn grid(ny: usize, nx: usize) -> Dataset {
        let mut ds = Dataset::new();
        ds.add_dimension(
            Dimension::numeric("y", (0..ny).map(|i| i as f64).collect(), Role::SpatialY).unwrap(),
        )
        .unwrap();
        ds.add_dimension(
            Dimension::numeric("x", (0..nx).map(|i| i as f64).collect(), Role::SpatialX).unwrap(),
        )
        .unwrap();
        ds.add_variable(
            "v",
            Variable::new(
                vec!["y".to_string(), "x".to_string()],
                ArrayD::zeros(ndarray::IxDyn(&[ny, nx])),
            )
            .unwrap(),
        )
        .unwrap();
        ds
    }

    fn filter_chain(size: usize) -> Chain {
        Chain::new().with_step(Box::new(MeanFilter::new(size).unwrap()))
    }

    #[test]
    fn generous_budget_yields_one_tile() {
        let ds = grid(10, 10);
        let plan = plan(&ds, &filter_chain(3), &SchedulerConfig::new()).unwrap();
        assert_eq!(plan.tiles().len(), 1);
        assert_eq!(plan.tiles()[0].range("y").unwrap().interior(), 0..10);
    }

    #[test]
    fn tight_budget_splits_into_quadrants() {
        let ds = grid(10, 10);
        // 5x5 interiors with a 1-pixel halo cost at most 7 * 7 * 8 = 392
        // bytes each.
        let cfg = SchedulerConfig::new().with_max_tile_bytes(400);
        let plan = plan(&ds, &filter_chain(3), &cfg).unwrap();
        assert_eq!(plan.tiles().len(), 4);
        assert_eq!(plan.chunk_sizes().get("x"), Some(&5));
        assert_eq!(plan.chunk_sizes().get("y"), Some(&5));
    }

    #[test]
    fn interiors_are_disjoint_and_cover_the_grid() {
        let ds = grid(10, 7);
        let cfg = SchedulerConfig::new().with_max_tile_bytes(200);
        let plan = plan(&ds, &filter_chain(3), &cfg).unwrap();

        let mut seen = vec![vec![0usize; 7]; 10];
        for tile in plan.tiles() {
            for y in tile.range("y").unwrap().interior() {
                for x in tile.range("x").unwrap().interior() {
                    seen[y][x] += 1;
                }
            }
        }
        assert!(seen.iter().flatten().all(|&n| n == 1));
    }

    #[test]
    fn halos_are_clamped_at_edges() {
        let ds = grid(1, 10);
        // Force x chunks of 4 with halo 2.
        let mut chunk_sizes = BTreeMap::new();
        chunk_sizes.insert("x".to_string(), 4usize);
        let pieces = partition(10, 4);
        assert_eq!(pieces, vec![0..4, 4..8, 8..10]);

        let cfg = SchedulerConfig::new().with_max_tile_bytes(6 * 8);
        let plan = plan(&ds, &filter_chain(5), &cfg).unwrap();
        let x_tiles: Vec<&TileRange> = plan
            .tiles()
            .iter()
            .map(|t| t.range("x").unwrap())
            .collect();

        let first = x_tiles.first().unwrap();
        assert_eq!(first.halo_lo(), 0);
        assert_eq!(first.outer().start, 0);
        let last = x_tiles.last().unwrap();
        assert_eq!(last.halo_hi(), 0);
        assert_eq!(last.outer().end, 10);
        for t in &x_tiles[1..x_tiles.len() - 1] {
            assert_eq!(t.halo_lo(), 2);
            assert_eq!(t.halo_hi(), 2);
        }
    }

    #[test]
    fn full_extent_dims_are_never_chunked() {
        let mut ds = Dataset::new();
        ds.add_dimension(
            Dimension::numeric("time", (0..100).map(|i| i as f64).collect(), Role::Temporal)
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
        ds.add_variable(
            "v",
            Variable::new(
                vec!["time".to_string(), "y".to_string(), "x".to_string()],
                ArrayD::zeros(ndarray::IxDyn(&[100, 4, 4])),
            )
            .unwrap(),
        )
        .unwrap();

        let chain = Chain::new().with_step(Box::new(TemporalMean::new()));
        let cfg = SchedulerConfig::new().with_max_tile_bytes(100 * 2 * 2 * 8);
        let plan = plan(&ds, &chain, &cfg).unwrap();

        assert!(plan.chunk_sizes().get("time").is_none());
        assert!(plan.tiles().len() > 1);
        for tile in plan.tiles() {
            let time = tile.range("time").unwrap();
            assert_eq!(time.interior(), 0..100);
            assert!(!time.is_chunked());
        }
    }

    #[test]
    fn impossible_budget_fails_at_planning() {
        let ds = grid(10, 10);
        // A single pixel with a 1-halo still needs 3 * 3 * 8 = 72 bytes.
        let cfg = SchedulerConfig::new().with_max_tile_bytes(64);
        let err = plan(&ds, &filter_chain(3), &cfg).unwrap_err();
        assert!(matches!(err, SchedulerError::Resource { .. }));
    }

    #[test]
    fn label_names_interior_ranges() {
        let ds = grid(10, 10);
        let cfg = SchedulerConfig::new().with_max_tile_bytes(400);
        let plan = plan(&ds, &filter_chain(3), &cfg).unwrap();
        let labels: Vec<String> = plan.tiles().iter().map(Tile::label).collect();
        assert!(labels.contains(&"x[5..10) y[0..5)".to_string()));
    }
}
