//! Pure selection operations producing reduced-range dataset views.

use std::ops::Range;

use tracing::debug;

use crate::dataset::Dataset;
use crate::dimension::Role;
use crate::error::DatasetError;

impl Dataset {
    /// Returns a new dataset restricted to the index range `range` along
    /// `dim`.
    ///
    /// Coordinates are sliced accordingly; variables not declaring `dim`
    /// are carried unchanged. When a spatial dimension is sliced and a
    /// geotransform is present, the transform origin is shifted so pixel
    /// (0, 0) of the result still maps to the correct coordinate.
    ///
    /// # Errors
    ///
    /// - [`DatasetError::UnknownDimension`] if `dim` does not exist.
    /// - [`DatasetError::RangeOutOfBounds`] if the range exceeds the extent.
    /// - [`DatasetError::EmptySelection`] if the range is empty.
    pub fn select_index(&self, dim: &str, range: Range<usize>) -> Result<Dataset, DatasetError> {
        let dimension = self
            .dim(dim)
            .ok_or_else(|| DatasetError::UnknownDimension {
                name: dim.to_string(),
            })?;

        let extent = dimension.len();
        if range.start >= range.end {
            return Err(DatasetError::EmptySelection {
                dimension: dim.to_string(),
            });
        }
        if range.end > extent {
            return Err(DatasetError::RangeOutOfBounds {
                dimension: dim.to_string(),
                start: range.start,
                end: range.end,
                extent,
            });
        }

        debug!(dim, start = range.start, end = range.end, "select_index");

        let mut out = Dataset::new().with_geo(self.geo().clone());

        for d in self.dims() {
            let sliced = if d.name() == dim {
                d.sliced(range.start, range.end)
            } else {
                d.clone()
            };
            out.add_dimension(sliced)?;
        }

        for (name, var) in self.variables() {
            out.add_variable(name.clone(), var.sliced(dim, range.start, range.end))?;
        }

        // Keep the affine transform honest for spatial slices.
        if range.start > 0 {
            if let Some(t) = self.geo().transform {
                let shifted = match dimension.role() {
                    Role::SpatialX => Some(t.shifted(range.start as f64, 0.0)),
                    Role::SpatialY => Some(t.shifted(0.0, range.start as f64)),
                    _ => None,
                };
                if let Some(shifted) = shifted {
                    let mut geo = self.geo().clone();
                    geo.transform = Some(shifted);
                    out.set_geo(geo);
                }
            }
        }

        Ok(out)
    }

    /// Returns a new dataset restricted to coordinates within
    /// `[min, max]` (inclusive) along `dim`.
    ///
    /// # Errors
    ///
    /// In addition to the [`select_index`](Dataset::select_index) errors,
    /// returns [`DatasetError::DimensionMismatch`] for label coordinates.
    pub fn select_coord(&self, dim: &str, min: f64, max: f64) -> Result<Dataset, DatasetError> {
        self.select_by(dim, |c| c >= min && c <= max)
    }

    /// Returns a new dataset keeping the indices along `dim` whose
    /// coordinate satisfies `predicate`.
    ///
    /// The selection need not be contiguous.
    ///
    /// # Errors
    ///
    /// - [`DatasetError::UnknownDimension`] if `dim` does not exist.
    /// - [`DatasetError::DimensionMismatch`] for label coordinates.
    /// - [`DatasetError::EmptySelection`] if nothing matches.
    pub fn select_by<F>(&self, dim: &str, predicate: F) -> Result<Dataset, DatasetError>
    where
        F: Fn(f64) -> bool,
    {
        let dimension = self
            .dim(dim)
            .ok_or_else(|| DatasetError::UnknownDimension {
                name: dim.to_string(),
            })?;

        let coords = dimension
            .coords()
            .as_numeric()
            .ok_or_else(|| DatasetError::DimensionMismatch {
                name: dim.to_string(),
                reason: "coordinate predicates require numeric coordinates".to_string(),
            })?;

        let indices: Vec<usize> = coords
            .iter()
            .enumerate()
            .filter(|(_, &c)| predicate(c))
            .map(|(i, _)| i)
            .collect();

        if indices.is_empty() {
            return Err(DatasetError::EmptySelection {
                dimension: dim.to_string(),
            });
        }

        // Contiguous runs keep the cheaper slice path (and the transform
        // shift that comes with it).
        let contiguous = indices.windows(2).all(|w| w[1] == w[0] + 1);
        if contiguous {
            let start = indices[0];
            let end = indices[indices.len() - 1] + 1;
            return self.select_index(dim, start..end);
        }

        debug!(dim, n = indices.len(), "select_by (non-contiguous)");

        // No affine transform can describe a gapped pixel grid; drop it
        // rather than leave one that misplaces every pixel downstream.
        let mut geo = self.geo().clone();
        if matches!(dimension.role(), Role::SpatialX | Role::SpatialY) {
            geo.transform = None;
        }

        let mut out = Dataset::new().with_geo(geo);
        for d in self.dims() {
            let picked = if d.name() == dim {
                d.selected(&indices)
            } else {
                d.clone()
            };
            out.add_dimension(picked)?;
        }
        for (name, var) in self.variables() {
            out.add_variable(name.clone(), var.selected(dim, &indices))?;
        }
        Ok(out)
    }
}
