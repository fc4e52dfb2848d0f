//! Dimension-collapsing reductions.

use std::fmt;
use std::sync::Arc;

use ndarray::{ArrayView1, Axis};
use tracing::debug;

use crate::dataset::Dataset;
use crate::error::DatasetError;
use crate::variable::Variable;

/// How to collapse a dimension during [`Dataset::reduce`].
#[derive(Clone)]
pub enum Aggregator {
    /// Sum of all values along the dimension.
    Sum,
    /// Arithmetic mean.
    Mean,
    /// Maximum, ignoring NaN.
    Max,
    /// Minimum, ignoring NaN.
    Min,
    /// User-supplied reduction over one lane of values.
    Custom(Arc<dyn Fn(ArrayView1<'_, f64>) -> f64 + Send + Sync>),
}

impl Aggregator {
    /// Collapses one lane of values to a scalar.
    pub fn apply(&self, lane: ArrayView1<'_, f64>) -> f64 {
        match self {
            Aggregator::Sum => lane.sum(),
            Aggregator::Mean => {
                if lane.is_empty() {
                    f64::NAN
                } else {
                    lane.sum() / lane.len() as f64
                }
            }
            Aggregator::Max => lane.iter().copied().fold(f64::NAN, f64::max),
            Aggregator::Min => lane.iter().copied().fold(f64::NAN, f64::min),
            Aggregator::Custom(f) => f(lane),
        }
    }
}

impl fmt::Debug for Aggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Aggregator::Sum => write!(f, "Sum"),
            Aggregator::Mean => write!(f, "Mean"),
            Aggregator::Max => write!(f, "Max"),
            Aggregator::Min => write!(f, "Min"),
            Aggregator::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

impl Dataset {
    /// Collapses `dim` with `aggregator`, producing a dataset without that
    /// dimension.
    ///
    /// Variables declaring `dim` lose the corresponding axis; variables not
    /// declaring it are carried unchanged. Geospatial metadata is carried
    /// through (reducing a spatial dimension leaves the remaining axis
    /// metadata intact).
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::UnknownDimension`] if `dim` does not exist.
    pub fn reduce(&self, dim: &str, aggregator: &Aggregator) -> Result<Dataset, DatasetError> {
        if self.dim(dim).is_none() {
            return Err(DatasetError::UnknownDimension {
                name: dim.to_string(),
            });
        }

        debug!(dim, ?aggregator, "reduce");

        let mut out = Dataset::new().with_geo(self.geo().clone());
        for d in self.dims() {
            if d.name() != dim {
                out.add_dimension(d.clone())?;
            }
        }

        for (name, var) in self.variables() {
            let reduced = match var.axis_of(dim) {
                Some(axis) => {
                    let data = var
                        .data()
                        .map_axis(Axis(axis), |lane| aggregator.apply(lane));
                    let dims: Vec<String> =
                        var.dims().iter().filter(|d| *d != dim).cloned().collect();
                    Variable::new(dims, data)?
                }
                None => var.clone(),
            };
            out.add_variable(name.clone(), reduced)?;
        }

        Ok(out)
    }
}
