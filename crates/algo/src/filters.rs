//! Windowed spatial filters.

use ndarray::{ArrayD, Dimension as _, IxDyn};
use tellus_dataset::{Dataset, Variable};

use crate::algorithm::Algorithm;
use crate::error::AlgoError;
use crate::signature::Signature;

/// NaN-aware moving-average (boxcar) filter over the spatial plane.
///
/// Every output pixel is the mean of the finite values in a `size` x
/// `size` window centred on it, with the window clamped at the grid
/// edges. Declares a halo of `size / 2` on both spatial dimensions, so a
/// tiled run reproduces the untiled result at every pixel.
#[derive(Debug, Clone)]
pub struct MeanFilter {
    size: usize,
    dim_y: String,
    dim_x: String,
}

impl MeanFilter {
    /// Creates a filter with an odd window size (1 is the identity).
    ///
    /// # Errors
    ///
    /// Returns [`AlgoError::InvalidParams`] for even or zero sizes.
    pub fn new(size: usize) -> Result<Self, AlgoError> {
        if size == 0 || size % 2 == 0 {
            return Err(AlgoError::InvalidParams {
                algorithm: "mean_filter".to_string(),
                reason: format!("window size must be odd and positive, got {size}"),
            });
        }
        Ok(Self {
            size,
            dim_y: "y".to_string(),
            dim_x: "x".to_string(),
        })
    }

    /// Overrides the spatial dimension names (defaults: `y`, `x`).
    pub fn with_dims(mut self, dim_y: impl Into<String>, dim_x: impl Into<String>) -> Self {
        self.dim_y = dim_y.into();
        self.dim_x = dim_x.into();
        self
    }

    /// Window size.
    pub fn size(&self) -> usize {
        self.size
    }

    fn filter_array(&self, data: &ArrayD<f64>, ay: usize, ax: usize) -> ArrayD<f64> {
        let shape = data.shape().to_vec();
        let r = self.size / 2;
        let mut out = ArrayD::zeros(IxDyn(&shape));

        for (idx, out_val) in out.indexed_iter_mut() {
            let mut pos = idx.slice().to_vec();
            let cy = pos[ay];
            let cx = pos[ax];
            let y0 = cy.saturating_sub(r);
            let y1 = (cy + r + 1).min(shape[ay]);
            let x0 = cx.saturating_sub(r);
            let x1 = (cx + r + 1).min(shape[ax]);

            let mut sum = 0.0;
            let mut n = 0usize;
            for wy in y0..y1 {
                pos[ay] = wy;
                for wx in x0..x1 {
                    pos[ax] = wx;
                    let v = data[IxDyn(&pos)];
                    if v.is_finite() {
                        sum += v;
                        n += 1;
                    }
                }
            }

            *out_val = if n > 0 { sum / n as f64 } else { f64::NAN };
        }

        out
    }
}

impl Algorithm for MeanFilter {
    fn name(&self) -> &str {
        "mean_filter"
    }

    fn signature(&self) -> Signature {
        let halo = self.size / 2;
        Signature::new()
            .requires_window(self.dim_y.clone(), halo)
            .requires_window(self.dim_x.clone(), halo)
    }

    fn apply(&self, chunk: &Dataset) -> Result<Dataset, AlgoError> {
        let mut out = Dataset::new().with_geo(chunk.geo().clone());
        for dim in chunk.dims() {
            out.add_dimension(dim.clone()).map_err(|e| AlgoError::Apply {
                algorithm: self.name().to_string(),
                reason: e.to_string(),
            })?;
        }

        for (name, var) in chunk.variables() {
            let filtered = match (var.axis_of(&self.dim_y), var.axis_of(&self.dim_x)) {
                (Some(ay), Some(ax)) => Variable::new(
                    var.dims().to_vec(),
                    self.filter_array(var.data(), ay, ax),
                )
                .map_err(|e| AlgoError::Apply {
                    algorithm: self.name().to_string(),
                    reason: e.to_string(),
                })?,
                // Variables without the spatial plane pass through.
                _ => var.clone(),
            };
            out.add_variable(name.clone(), filtered)
                .map_err(|e| AlgoError::Apply {
                    algorithm: self.name().to_string(),
                    reason: e.to_string(),
                })?;
        }

        Ok(out)
    }
}
