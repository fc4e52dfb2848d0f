//! Scheduler configuration.

use crate::error::SchedulerError;

/// Default per-tile memory budget: 128 MiB of variable data.
pub const DEFAULT_MAX_TILE_BYTES: usize = 128 * 1024 * 1024;

/// Tiling and dispatch configuration.
///
/// The memory budget bounds the bytes of variable data a single
/// halo-extended tile may hold; the planner shrinks chunk sizes until
/// every tile fits. `workers` pins the size of the worker pool, or leaves
/// it to the runtime default when unset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    max_tile_bytes: usize,
    workers: Option<usize>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_tile_bytes: DEFAULT_MAX_TILE_BYTES,
            workers: None,
        }
    }
}

impl SchedulerConfig {
    /// Configuration with default budget and runtime-sized worker pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the per-tile memory budget in bytes.
    pub fn with_max_tile_bytes(mut self, max_tile_bytes: usize) -> Self {
        self.max_tile_bytes = max_tile_bytes;
        self
    }

    /// Pins the worker pool size.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    /// Per-tile memory budget in bytes.
    pub fn max_tile_bytes(&self) -> usize {
        self.max_tile_bytes
    }

    /// Pinned worker count, if any.
    pub fn workers(&self) -> Option<usize> {
        self.workers
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::InvalidConfig`] if the budget cannot hold
    /// a single element or the worker count is zero.
    pub fn validate(&self) -> Result<(), SchedulerError> {
        if self.max_tile_bytes < std::mem::size_of::<f64>() {
            return Err(SchedulerError::InvalidConfig {
                reason: format!(
                    "max_tile_bytes must be at least {}, got {}",
                    std::mem::size_of::<f64>(),
                    self.max_tile_bytes
                ),
            });
        }
        if self.workers == Some(0) {
            return Err(SchedulerError::InvalidConfig {
                reason: "workers must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
