use std::path::PathBuf;

use serde::Deserialize;

/// Top-level pipeline configuration.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// I/O settings.
    #[serde(default)]
    pub io: IoToml,

    /// Scheduler settings.
    #[serde(default)]
    pub scheduler: SchedulerToml,

    /// Optional target grid to resample onto before processing.
    #[serde(default)]
    pub resample: Option<ResampleToml>,

    /// Processing steps, applied in order.
    #[serde(default, rename = "step")]
    pub steps: Vec<StepToml>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct IoToml {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchedulerToml {
    #[serde(default = "default_max_tile_bytes")]
    pub max_tile_bytes: usize,
    #[serde(default)]
    pub workers: Option<usize>,
}

impl Default for SchedulerToml {
    fn default() -> Self {
        Self {
            max_tile_bytes: default_max_tile_bytes(),
            workers: None,
        }
    }
}

fn default_max_tile_bytes() -> usize {
    tellus_scheduler::DEFAULT_MAX_TILE_BYTES
}

/// Target grid for the optional resampling stage. North-up grids only;
/// the four affine coefficients describe the upper-left corner and the
/// pixel size (negative `pixel_height` for north-up).
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResampleToml {
    #[serde(default = "default_method")]
    pub method: String,
    pub origin_x: f64,
    pub origin_y: f64,
    pub pixel_width: f64,
    pub pixel_height: f64,
    pub width: usize,
    pub height: usize,
    #[serde(default)]
    pub crs: Option<String>,
}

fn default_method() -> String {
    "nearest".to_string()
}

/// One processing step, tagged by `kind`.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepToml {
    /// NaN-aware spatial boxcar filter.
    MeanFilter {
        size: usize,
    },
    /// Per-pixel mean over the time axis.
    TemporalMean,
    /// CUSUM change-point detection over the time axis.
    ChangePoint,
}
