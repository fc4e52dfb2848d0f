//! Merging datasets: tolerant variable union with single-axis
//! concatenation.
//!
//! `merge` reconciles the shared dimensions of its inputs. Dimensions whose
//! coordinates align (exactly or within tolerance) are unified; at most one
//! shared dimension may instead carry disjoint coordinate ranges, in which
//! case the inputs are concatenated along it. Splitting a dataset with
//! `select_index` and merging the pieces therefore reconstructs the
//! original.

use std::collections::{BTreeMap, BTreeSet};

use ndarray::{ArrayD, Axis};
use tracing::debug;

use crate::dataset::Dataset;
use crate::dimension::{Alignment, Coordinates, Dimension, DEFAULT_ALIGN_TOL};
use crate::error::DatasetError;
use crate::variable::Variable;

impl Dataset {
    /// Merges several datasets into one.
    ///
    /// Shared dimensions must align identically or within the default
    /// nearest-match tolerance, except for at most one dimension with
    /// pairwise disjoint coordinate ranges, along which the inputs are
    /// concatenated (ordered by coordinate). Variables are unioned; a
    /// variable appearing in several inputs without the concatenation
    /// dimension must be identical in all of them.
    ///
    /// # Errors
    ///
    /// - [`DatasetError::EmptyMerge`] for an empty input slice.
    /// - [`DatasetError::DimensionMismatch`] for irreconcilable shared
    ///   dimensions, more than one concatenation dimension, or overlapping
    ///   coordinate ranges.
    /// - [`DatasetError::DuplicateName`] for conflicting same-named
    ///   variables.
    pub fn merge(pieces: &[Dataset]) -> Result<Dataset, DatasetError> {
        match pieces {
            [] => Err(DatasetError::EmptyMerge),
            [single] => Ok(single.clone()),
            _ => merge_many(pieces),
        }
    }
}

fn merge_many(pieces: &[Dataset]) -> Result<Dataset, DatasetError> {
    let tol = DEFAULT_ALIGN_TOL;

    // Dimension name -> every (piece index, dimension) occurrence.
    let mut occurrences: BTreeMap<&str, Vec<(usize, &Dimension)>> = BTreeMap::new();
    for (i, ds) in pieces.iter().enumerate() {
        for dim in ds.dims() {
            occurrences.entry(dim.name()).or_default().push((i, dim));
        }
    }

    let mut concat_dim: Option<&str> = None;
    for (name, occ) in &occurrences {
        let (_, first) = occ[0];
        let aligned = occ[1..]
            .iter()
            .all(|(_, d)| first.align(d, tol) != Alignment::Incompatible);
        if aligned {
            continue;
        }
        if let Some(existing) = concat_dim {
            return Err(DatasetError::DimensionMismatch {
                name: (*name).to_string(),
                reason: format!(
                    "cannot concatenate along more than one dimension ('{existing}' already differs)"
                ),
            });
        }
        concat_dim = Some(name);
    }

    match concat_dim {
        Some(dim) => merge_concat(pieces, dim, &occurrences),
        None => merge_union(pieces, &occurrences),
    }
}

/// Union-only merge: all shared dimensions already align.
fn merge_union(
    pieces: &[Dataset],
    occurrences: &BTreeMap<&str, Vec<(usize, &Dimension)>>,
) -> Result<Dataset, DatasetError> {
    debug!(n = pieces.len(), "merge: variable union");

    let mut out = Dataset::new().with_geo(pieces[0].geo().clone());
    for occ in occurrences.values() {
        out.add_dimension(occ[0].1.clone())?;
    }

    let mut seen: BTreeMap<&str, &Variable> = BTreeMap::new();
    for ds in pieces {
        for (name, var) in ds.variables() {
            match seen.get(name.as_str()) {
                None => {
                    seen.insert(name, var);
                    out.add_variable(name.clone(), var.clone())?;
                }
                Some(existing) if *existing == var => {}
                Some(_) => {
                    return Err(DatasetError::DuplicateName { name: name.clone() });
                }
            }
        }
    }

    Ok(out)
}

/// Concatenating merge along `dim`.
fn merge_concat(
    pieces: &[Dataset],
    dim: &str,
    occurrences: &BTreeMap<&str, Vec<(usize, &Dimension)>>,
) -> Result<Dataset, DatasetError> {
    let occ = &occurrences[dim];
    if occ.len() != pieces.len() {
        return Err(DatasetError::DimensionMismatch {
            name: dim.to_string(),
            reason: "concatenation dimension is absent from one or more datasets".to_string(),
        });
    }

    let role = occ[0].1.role();
    if occ.iter().any(|(_, d)| d.role() != role) {
        return Err(DatasetError::DimensionMismatch {
            name: dim.to_string(),
            reason: "role differs between datasets".to_string(),
        });
    }

    // Coordinate interval per piece; label coordinates cannot be ordered.
    let mut intervals: Vec<(usize, f64, f64)> = Vec::with_capacity(pieces.len());
    let mut coords_by_piece: BTreeMap<usize, &[f64]> = BTreeMap::new();
    for &(i, d) in occ {
        let coords =
            d.coords()
                .as_numeric()
                .ok_or_else(|| DatasetError::DimensionMismatch {
                    name: dim.to_string(),
                    reason: "concatenation requires numeric coordinates".to_string(),
                })?;
        let min = coords.iter().copied().fold(f64::INFINITY, f64::min);
        let max = coords.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        coords_by_piece.insert(i, coords);
        intervals.push((i, min, max));
    }

    // Preserve the coordinate direction of the inputs (y axes are often
    // descending).
    let descending = occ
        .iter()
        .filter_map(|(_, d)| d.coords().as_numeric())
        .find(|c| c.len() > 1)
        .map(|c| c[c.len() - 1] < c[0])
        .unwrap_or(false);

    intervals.sort_by(|a, b| a.1.total_cmp(&b.1));
    for pair in intervals.windows(2) {
        if pair[1].1 <= pair[0].2 {
            return Err(DatasetError::DimensionMismatch {
                name: dim.to_string(),
                reason: "coordinate ranges overlap; cannot concatenate".to_string(),
            });
        }
    }
    if descending {
        intervals.reverse();
    }
    let order: Vec<usize> = intervals.iter().map(|&(i, _, _)| i).collect();

    debug!(dim, n = pieces.len(), descending, "merge: concatenation");

    // Concatenated coordinates, re-validated (catches broken temporal order).
    let mut coords = Vec::new();
    for &i in &order {
        if let Some(piece_coords) = coords_by_piece.get(&i) {
            coords.extend_from_slice(piece_coords);
        }
    }
    let joined = Dimension::new(dim, Coordinates::Numeric(coords), role)?;

    let mut out = Dataset::new().with_geo(pieces[order[0]].geo().clone());
    for (name, occ) in occurrences {
        if *name == dim {
            out.add_dimension(joined.clone())?;
        } else {
            out.add_dimension(occ[0].1.clone())?;
        }
    }

    let var_names: BTreeSet<&str> = pieces
        .iter()
        .flat_map(|ds| ds.variables().map(|(n, _)| n.as_str()))
        .collect();

    for name in var_names {
        let template = pieces
            .iter()
            .find_map(|ds| ds.variable(name))
            .ok_or_else(|| DatasetError::UnknownVariable {
                name: name.to_string(),
            })?;

        if let Some(axis) = template.axis_of(dim) {
            // Every piece must contribute a slab with identical dim order.
            let mut arrays: Vec<&ArrayD<f64>> = Vec::with_capacity(order.len());
            for &i in &order {
                let var = pieces[i]
                    .variable(name)
                    .ok_or_else(|| DatasetError::UnknownVariable {
                        name: name.to_string(),
                    })?;
                if var.dims() != template.dims() {
                    return Err(DatasetError::DimensionMismatch {
                        name: dim.to_string(),
                        reason: format!("variable '{name}' has differing dimension order"),
                    });
                }
                arrays.push(var.data());
            }
            let views: Vec<_> = arrays.iter().map(|a| a.view()).collect();
            let data = ndarray::concatenate(Axis(axis), &views).map_err(|e| {
                DatasetError::DimensionMismatch {
                    name: dim.to_string(),
                    reason: format!("variable '{name}' cannot be concatenated: {e}"),
                }
            })?;
            out.add_variable(name, Variable::new(template.dims().to_vec(), data)?)?;
        } else {
            // Not on the concat axis: all occurrences must agree.
            for ds in pieces {
                if let Some(var) = ds.variable(name) {
                    if var != template {
                        return Err(DatasetError::DuplicateName {
                            name: name.to_string(),
                        });
                    }
                }
            }
            out.add_variable(name, template.clone())?;
        }
    }

    Ok(out)
}
