//! Target grid description for resampling.

use tellus_dataset::{Dataset, GeoTransform, Role};

use crate::error::ReprojectError;

/// A regular raster grid: CRS, affine transform and pixel extents.
///
/// Coordinates are taken at pixel centers, matching the coordinate
/// vectors a [`Dataset`] carries for its spatial dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct GridSpec {
    crs: Option<String>,
    transform: GeoTransform,
    width: usize,
    height: usize,
}

impl GridSpec {
    /// Grid with the given transform and pixel extents, no CRS.
    ///
    /// # Errors
    ///
    /// Returns [`ReprojectError::InvalidGrid`] for zero extents or a
    /// rotated transform; only axis-aligned grids have per-axis
    /// coordinate vectors.
    pub fn new(
        transform: GeoTransform,
        width: usize,
        height: usize,
    ) -> Result<Self, ReprojectError> {
        if width == 0 || height == 0 {
            return Err(ReprojectError::InvalidGrid {
                reason: format!("extents must be positive, got {width} x {height}"),
            });
        }
        if transform.row_rot != 0.0 || transform.col_rot != 0.0 {
            return Err(ReprojectError::InvalidGrid {
                reason: "rotated transforms are not supported".to_string(),
            });
        }
        Ok(Self {
            crs: None,
            transform,
            width,
            height,
        })
    }

    /// Sets the CRS descriptor, builder style.
    pub fn with_crs(mut self, crs: impl Into<String>) -> Self {
        self.crs = Some(crs.into());
        self
    }

    /// Reads the grid of a dataset's spatial dimensions.
    ///
    /// # Errors
    ///
    /// - [`ReprojectError::MissingGeoreference`] without a transform or
    ///   without one spatial-x and one spatial-y dimension.
    /// - [`ReprojectError::InvalidGrid`] for rotated transforms.
    pub fn from_dataset(ds: &Dataset) -> Result<Self, ReprojectError> {
        let transform =
            ds.geo()
                .transform
                .ok_or_else(|| ReprojectError::MissingGeoreference {
                    reason: "no affine transform".to_string(),
                })?;

        let width = ds
            .dims()
            .find(|d| d.role() == Role::SpatialX)
            .map(|d| d.len())
            .ok_or_else(|| ReprojectError::MissingGeoreference {
                reason: "no spatial-x dimension".to_string(),
            })?;
        let height = ds
            .dims()
            .find(|d| d.role() == Role::SpatialY)
            .map(|d| d.len())
            .ok_or_else(|| ReprojectError::MissingGeoreference {
                reason: "no spatial-y dimension".to_string(),
            })?;

        let mut spec = Self::new(transform, width, height)?;
        spec.crs = ds.geo().crs.clone();
        Ok(spec)
    }

    /// CRS descriptor, if any.
    pub fn crs(&self) -> Option<&str> {
        self.crs.as_deref()
    }

    /// Affine transform.
    pub fn transform(&self) -> &GeoTransform {
        &self.transform
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Pixel-center x coordinate of every column.
    pub fn x_coords(&self) -> Vec<f64> {
        (0..self.width)
            .map(|c| self.transform.pixel_to_coord(c as f64 + 0.5, 0.5).0)
            .collect()
    }

    /// Pixel-center y coordinate of every row.
    pub fn y_coords(&self) -> Vec<f64> {
        (0..self.height)
            .map(|r| self.transform.pixel_to_coord(0.5, r as f64 + 0.5).1)
            .collect()
    }
}
