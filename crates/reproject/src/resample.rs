//! Same-CRS affine grid resampling.

use ndarray::{ArrayD, Dimension as _, IxDyn};
use tellus_dataset::{Dataset, Dimension, GeoMeta, Role, Variable};
use tracing::debug;

use crate::error::ReprojectError;
use crate::grid::GridSpec;

/// Value lookup strategy for resampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResampleMethod {
    /// Value of the nearest source pixel.
    Nearest,
    /// Weighted mean of the four surrounding source pixels; NaN if any
    /// of them is NaN.
    Bilinear,
}

/// The narrow resampling contract the engine consumes. Implementations
/// that warp across coordinate systems can be plugged in here.
pub trait Resample {
    /// Regrids `ds` onto `target`, returning a new dataset.
    fn resample(&self, ds: &Dataset, target: &GridSpec) -> Result<Dataset, ReprojectError>;
}

/// Affine same-CRS resampler.
///
/// Every target pixel center is mapped through the target transform into
/// coordinates and back through the source transform into a fractional
/// source pixel, then sampled with the configured method. Pixels falling
/// outside the source extent become NaN.
#[derive(Debug, Clone)]
pub struct GridResampler {
    method: ResampleMethod,
}

impl GridResampler {
    /// Resampler with the given lookup method.
    pub fn new(method: ResampleMethod) -> Self {
        Self { method }
    }

    /// Lookup method.
    pub fn method(&self) -> ResampleMethod {
        self.method
    }

    /// Samples one source plane at center-based fractional index
    /// `(x, y)`, reading through `pos` with the spatial axes at `ay`/`ax`.
    fn sample(
        &self,
        data: &ArrayD<f64>,
        pos: &mut [usize],
        ay: usize,
        ax: usize,
        x: f64,
        y: f64,
    ) -> f64 {
        let w = data.shape()[ax];
        let h = data.shape()[ay];

        match self.method {
            ResampleMethod::Nearest => {
                let col = x.round();
                let row = y.round();
                if col < 0.0 || row < 0.0 || col >= w as f64 || row >= h as f64 {
                    return f64::NAN;
                }
                pos[ax] = col as usize;
                pos[ay] = row as usize;
                data[IxDyn(pos)]
            }
            ResampleMethod::Bilinear => {
                if x < 0.0 || y < 0.0 || x > (w - 1) as f64 || y > (h - 1) as f64 {
                    return f64::NAN;
                }
                let x0 = x.floor() as usize;
                let y0 = y.floor() as usize;
                let x1 = (x0 + 1).min(w - 1);
                let y1 = (y0 + 1).min(h - 1);
                let xf = x - x0 as f64;
                let yf = y - y0 as f64;

                let mut corner = |row: usize, col: usize| {
                    pos[ay] = row;
                    pos[ax] = col;
                    data[IxDyn(pos)]
                };
                let v00 = corner(y0, x0);
                let v10 = corner(y0, x1);
                let v01 = corner(y1, x0);
                let v11 = corner(y1, x1);
                if v00.is_nan() || v10.is_nan() || v01.is_nan() || v11.is_nan() {
                    return f64::NAN;
                }

                let top = v00 * (1.0 - xf) + v10 * xf;
                let bottom = v01 * (1.0 - xf) + v11 * xf;
                top * (1.0 - yf) + bottom * yf
            }
        }
    }
}

impl Resample for GridResampler {
    fn resample(&self, ds: &Dataset, target: &GridSpec) -> Result<Dataset, ReprojectError> {
        let source = GridSpec::from_dataset(ds)?;
        if let (Some(s), Some(t)) = (source.crs(), target.crs()) {
            if s != t {
                return Err(ReprojectError::CrsMismatch {
                    source_crs: s.to_string(),
                    target_crs: t.to_string(),
                });
            }
        }

        let dim_x = ds
            .dims()
            .find(|d| d.role() == Role::SpatialX)
            .map(|d| d.name().to_string())
            .ok_or_else(|| ReprojectError::MissingGeoreference {
                reason: "no spatial-x dimension".to_string(),
            })?;
        let dim_y = ds
            .dims()
            .find(|d| d.role() == Role::SpatialY)
            .map(|d| d.name().to_string())
            .ok_or_else(|| ReprojectError::MissingGeoreference {
                reason: "no spatial-y dimension".to_string(),
            })?;

        debug!(
            method = ?self.method,
            width = target.width(),
            height = target.height(),
            "resampling onto target grid"
        );

        let crs = target
            .crs()
            .or(source.crs())
            .map(str::to_string);
        let mut out = Dataset::new().with_geo(GeoMeta {
            crs,
            transform: Some(*target.transform()),
        });

        for dim in ds.dims() {
            let replaced = match dim.role() {
                Role::SpatialX => Dimension::numeric(&dim_x, target.x_coords(), Role::SpatialX)?,
                Role::SpatialY => Dimension::numeric(&dim_y, target.y_coords(), Role::SpatialY)?,
                _ => dim.clone(),
            };
            out.add_dimension(replaced)?;
        }

        for (name, var) in ds.variables() {
            let regridded = match (var.axis_of(&dim_y), var.axis_of(&dim_x)) {
                (Some(ay), Some(ax)) => {
                    let mut shape = var.shape().to_vec();
                    shape[ay] = target.height();
                    shape[ax] = target.width();
                    let mut data = ArrayD::zeros(IxDyn(&shape));

                    for (idx, val) in data.indexed_iter_mut() {
                        let mut pos = idx.slice().to_vec();
                        let row = pos[ay];
                        let col = pos[ax];
                        let (cx, cy) = target
                            .transform()
                            .pixel_to_coord(col as f64 + 0.5, row as f64 + 0.5);
                        let (src_col, src_row) = source.transform().coord_to_pixel(cx, cy)?;
                        *val = self.sample(
                            var.data(),
                            &mut pos,
                            ay,
                            ax,
                            src_col - 0.5,
                            src_row - 0.5,
                        );
                    }

                    Variable::new(var.dims().to_vec(), data)?
                }
                (None, None) => var.clone(),
                _ => {
                    return Err(ReprojectError::InvalidGrid {
                        reason: format!("variable '{name}' spans only one spatial dimension"),
                    });
                }
            };
            out.add_variable(name.clone(), regridded)?;
        }

        Ok(out)
    }
}
