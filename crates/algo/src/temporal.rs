//! Algorithms along the time axis.
//!
//! Both algorithms here require the full time extent per chunk: statefulness
//! along time is declared through the signature instead of carrying partial
//! accumulator state across chunk boundaries, so the scheduler simply never
//! chunks the time axis.

use ndarray::{ArrayViewD, Axis};
use tellus_dataset::{Aggregator, Dataset, Variable};

use crate::algorithm::Algorithm;
use crate::error::AlgoError;
use crate::signature::{DimRequirement, Signature};

/// Per-pixel mean over the full time axis; drops the time dimension.
#[derive(Debug, Clone)]
pub struct TemporalMean {
    time_dim: String,
}

impl TemporalMean {
    /// Reducer over the default `time` dimension.
    pub fn new() -> Self {
        Self {
            time_dim: "time".to_string(),
        }
    }

    /// Overrides the time dimension name.
    pub fn with_dim(mut self, time_dim: impl Into<String>) -> Self {
        self.time_dim = time_dim.into();
        self
    }
}

impl Default for TemporalMean {
    fn default() -> Self {
        Self::new()
    }
}

impl Algorithm for TemporalMean {
    fn name(&self) -> &str {
        "temporal_mean"
    }

    fn signature(&self) -> Signature {
        Signature::new()
            .requires(self.time_dim.clone(), DimRequirement::FullExtent)
            .drops(self.time_dim.clone())
    }

    fn apply(&self, chunk: &Dataset) -> Result<Dataset, AlgoError> {
        chunk
            .reduce(&self.time_dim, &Aggregator::Mean)
            .map_err(|e| AlgoError::Apply {
                algorithm: self.name().to_string(),
                reason: e.to_string(),
            })
    }
}

/// CUSUM change-point detector along the time axis.
///
/// For every pixel, accumulates deviations from the lane mean and locates
/// the index of the maximal cumulative excursion. Emits, per input
/// variable, the time coordinate of the detected change and a
/// `<name>_magnitude` companion holding the excursion range. Lanes
/// containing non-finite values, or shorter than two steps, yield NaN.
#[derive(Debug, Clone)]
pub struct ChangePoint {
    time_dim: String,
}

impl ChangePoint {
    /// Detector over the default `time` dimension.
    pub fn new() -> Self {
        Self {
            time_dim: "time".to_string(),
        }
    }

    /// Overrides the time dimension name.
    pub fn with_dim(mut self, time_dim: impl Into<String>) -> Self {
        self.time_dim = time_dim.into();
        self
    }

    /// CUSUM over one lane: (change index, excursion magnitude).
    fn cusum(lane: &[f64]) -> Option<(usize, f64)> {
        if lane.len() < 2 || lane.iter().any(|v| !v.is_finite()) {
            return None;
        }

        let mean = lane.iter().sum::<f64>() / lane.len() as f64;
        let mut s = 0.0_f64;
        let mut s_min = 0.0_f64;
        let mut s_max = 0.0_f64;
        let mut best = 0usize;
        let mut best_abs = 0.0;

        for (i, &v) in lane.iter().enumerate() {
            s += v - mean;
            if s.abs() > best_abs {
                best_abs = s.abs();
                best = i;
            }
            s_min = s_min.min(s);
            s_max = s_max.max(s);
        }

        Some((best, s_max - s_min))
    }

    fn detect(
        &self,
        data: ArrayViewD<'_, f64>,
        axis: usize,
        time_coords: &[f64],
    ) -> (ndarray::ArrayD<f64>, ndarray::ArrayD<f64>) {
        let change = data.map_axis(Axis(axis), |lane| {
            let values: Vec<f64> = lane.iter().copied().collect();
            match Self::cusum(&values) {
                Some((i, _)) => time_coords[i],
                None => f64::NAN,
            }
        });
        let magnitude = data.map_axis(Axis(axis), |lane| {
            let values: Vec<f64> = lane.iter().copied().collect();
            match Self::cusum(&values) {
                Some((_, m)) => m,
                None => f64::NAN,
            }
        });
        (change, magnitude)
    }
}

impl Default for ChangePoint {
    fn default() -> Self {
        Self::new()
    }
}

impl Algorithm for ChangePoint {
    fn name(&self) -> &str {
        "change_point"
    }

    fn signature(&self) -> Signature {
        Signature::new()
            .requires(self.time_dim.clone(), DimRequirement::FullExtent)
            .drops(self.time_dim.clone())
    }

    fn apply(&self, chunk: &Dataset) -> Result<Dataset, AlgoError> {
        let time = chunk
            .dim(&self.time_dim)
            .ok_or_else(|| AlgoError::SignatureMismatch {
                algorithm: self.name().to_string(),
                dimension: self.time_dim.clone(),
                reason: "required dimension not present".to_string(),
            })?;
        let time_coords = time
            .coords()
            .as_numeric()
            .ok_or_else(|| AlgoError::Apply {
                algorithm: self.name().to_string(),
                reason: "time coordinates are not numeric".to_string(),
            })?
            .to_vec();

        let wrap = |e: tellus_dataset::DatasetError| AlgoError::Apply {
            algorithm: self.name().to_string(),
            reason: e.to_string(),
        };

        let mut out = Dataset::new().with_geo(chunk.geo().clone());
        for dim in chunk.dims() {
            if dim.name() != self.time_dim {
                out.add_dimension(dim.clone()).map_err(wrap)?;
            }
        }

        for (name, var) in chunk.variables() {
            match var.axis_of(&self.time_dim) {
                Some(axis) => {
                    let (change, magnitude) =
                        self.detect(var.data().view(), axis, &time_coords);
                    let dims: Vec<String> = var
                        .dims()
                        .iter()
                        .filter(|d| **d != self.time_dim)
                        .cloned()
                        .collect();
                    out.add_variable(name.clone(), Variable::new(dims.clone(), change).map_err(wrap)?)
                        .map_err(wrap)?;
                    out.add_variable(
                        format!("{name}_magnitude"),
                        Variable::new(dims, magnitude).map_err(wrap)?,
                    )
                    .map_err(wrap)?;
                }
                None => {
                    out.add_variable(name.clone(), var.clone()).map_err(wrap)?;
                }
            }
        }

        Ok(out)
    }
}
