//! Geospatial metadata: CRS descriptor and affine pixel-to-coordinate
//! transform.
//!
//! The transform follows the GDAL six-coefficient convention:
//!
//! ```text
//! x = origin_x + col * pixel_width + row * row_rot
//! y = origin_y + col * col_rot    + row * pixel_height
//! ```
//!
//! For the common north-up case `row_rot` and `col_rot` are zero and
//! `pixel_height` is negative.

use crate::error::DatasetError;

/// Affine pixel-to-coordinate transform (GDAL coefficient order).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoTransform {
    /// x coordinate of the upper-left corner of pixel (0, 0).
    pub origin_x: f64,
    /// Pixel width (x step per column).
    pub pixel_width: f64,
    /// Row rotation term.
    pub row_rot: f64,
    /// y coordinate of the upper-left corner of pixel (0, 0).
    pub origin_y: f64,
    /// Column rotation term.
    pub col_rot: f64,
    /// Pixel height (y step per row, negative for north-up grids).
    pub pixel_height: f64,
}

impl GeoTransform {
    /// Identity transform: coordinates equal pixel indices.
    pub fn identity() -> Self {
        Self {
            origin_x: 0.0,
            pixel_width: 1.0,
            row_rot: 0.0,
            origin_y: 0.0,
            col_rot: 0.0,
            pixel_height: 1.0,
        }
    }

    /// North-up transform without rotation terms.
    pub fn north_up(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self {
            origin_x,
            pixel_width,
            row_rot: 0.0,
            origin_y,
            col_rot: 0.0,
            pixel_height,
        }
    }

    /// Builds a transform from the GDAL coefficient array
    /// `[origin_x, pixel_width, row_rot, origin_y, col_rot, pixel_height]`.
    pub fn from_gdal(c: [f64; 6]) -> Self {
        Self {
            origin_x: c[0],
            pixel_width: c[1],
            row_rot: c[2],
            origin_y: c[3],
            col_rot: c[4],
            pixel_height: c[5],
        }
    }

    /// The GDAL coefficient array for this transform.
    pub fn to_gdal(&self) -> [f64; 6] {
        [
            self.origin_x,
            self.pixel_width,
            self.row_rot,
            self.origin_y,
            self.col_rot,
            self.pixel_height,
        ]
    }

    /// Maps a fractional pixel index to a coordinate pair `(x, y)`.
    pub fn pixel_to_coord(&self, col: f64, row: f64) -> (f64, f64) {
        (
            self.origin_x + col * self.pixel_width + row * self.row_rot,
            self.origin_y + col * self.col_rot + row * self.pixel_height,
        )
    }

    /// Maps a coordinate pair back to a fractional pixel index `(col, row)`.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::SingularTransform`] if the linear part has no
    /// inverse.
    pub fn coord_to_pixel(&self, x: f64, y: f64) -> Result<(f64, f64), DatasetError> {
        let det = self.pixel_width * self.pixel_height - self.row_rot * self.col_rot;
        if det == 0.0 || !det.is_finite() {
            return Err(DatasetError::SingularTransform);
        }

        let dx = x - self.origin_x;
        let dy = y - self.origin_y;
        let col = (dx * self.pixel_height - dy * self.row_rot) / det;
        let row = (dy * self.pixel_width - dx * self.col_rot) / det;
        Ok((col, row))
    }

    /// Transform for a sub-grid whose pixel (0, 0) sits at `(col_off,
    /// row_off)` of this grid. Used when slicing spatial dimensions.
    pub fn shifted(&self, col_off: f64, row_off: f64) -> GeoTransform {
        let (origin_x, origin_y) = self.pixel_to_coord(col_off, row_off);
        GeoTransform {
            origin_x,
            origin_y,
            ..*self
        }
    }
}

/// Global geospatial metadata of a dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeoMeta {
    /// Opaque CRS descriptor (WKT, EPSG code string, or proj string).
    pub crs: Option<String>,
    /// Affine pixel-to-coordinate transform.
    pub transform: Option<GeoTransform>,
}

impl GeoMeta {
    /// Metadata with a CRS descriptor and transform.
    pub fn new(crs: impl Into<String>, transform: GeoTransform) -> Self {
        Self {
            crs: Some(crs.into()),
            transform: Some(transform),
        }
    }
}
