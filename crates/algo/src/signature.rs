//! Dimension signatures: what an algorithm requires of its input and what
//! its output looks like.

use tellus_dataset::{Dataset, Dimension};

use crate::error::AlgoError;

/// How an algorithm consumes one input dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimRequirement {
    /// The dimension may be split into tiles; the halo gives the extra
    /// neighborhood needed on each side.
    Chunkable,
    /// The algorithm needs the full extent of this dimension in every
    /// chunk. Statefulness along an axis is expressed this way instead of
    /// carrying partial state across chunk boundaries.
    FullExtent,
}

/// One input dimension requirement.
#[derive(Debug, Clone)]
pub struct DimSpec {
    name: String,
    requirement: DimRequirement,
    halo: usize,
}

impl DimSpec {
    /// Dimension name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Chunking requirement.
    pub fn requirement(&self) -> DimRequirement {
        self.requirement
    }

    /// Halo width (per side); always 0 for [`DimRequirement::FullExtent`].
    pub fn halo(&self) -> usize {
        self.halo
    }
}

/// An algorithm's declared input/output dimension signature.
///
/// The input side lists required dimensions with their chunking
/// requirement and halo; the output side records which dimensions the
/// algorithm removes and which it introduces.
#[derive(Debug, Clone, Default)]
pub struct Signature {
    inputs: Vec<DimSpec>,
    drops: Vec<String>,
    adds: Vec<Dimension>,
}

impl Signature {
    /// Empty signature: no requirements, output dimensions identical to
    /// the input.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires `name` to be present, with the given chunking requirement
    /// and no halo.
    pub fn requires(mut self, name: impl Into<String>, requirement: DimRequirement) -> Self {
        self.inputs.push(DimSpec {
            name: name.into(),
            requirement,
            halo: 0,
        });
        self
    }

    /// Requires `name` to be present and chunkable with `halo` extra
    /// indices of neighborhood on each side.
    pub fn requires_window(mut self, name: impl Into<String>, halo: usize) -> Self {
        self.inputs.push(DimSpec {
            name: name.into(),
            requirement: DimRequirement::Chunkable,
            halo,
        });
        self
    }

    /// Declares that the output no longer carries `name`.
    pub fn drops(mut self, name: impl Into<String>) -> Self {
        self.drops.push(name.into());
        self
    }

    /// Declares that the output introduces a new dimension.
    pub fn adds(mut self, dim: Dimension) -> Self {
        self.adds.push(dim);
        self
    }

    /// Input dimension requirements.
    pub fn inputs(&self) -> &[DimSpec] {
        &self.inputs
    }

    /// Dimensions removed by the output.
    pub fn dropped(&self) -> &[String] {
        &self.drops
    }

    /// Dimensions introduced by the output.
    pub fn added(&self) -> &[Dimension] {
        &self.adds
    }

    /// Halo required along `dim`, 0 if unspecified.
    pub fn halo_for(&self, dim: &str) -> usize {
        self.inputs
            .iter()
            .filter(|s| s.name == dim)
            .map(|s| s.halo)
            .max()
            .unwrap_or(0)
    }

    /// Chunking requirement for `dim`, if declared.
    pub fn requirement_for(&self, dim: &str) -> Option<DimRequirement> {
        self.inputs.iter().find(|s| s.name == dim).map(|s| s.requirement)
    }

    /// Checks this signature against a concrete dataset.
    ///
    /// # Errors
    ///
    /// Returns [`AlgoError::SignatureMismatch`] if a required or dropped
    /// dimension is missing, or an added dimension name is already taken.
    pub fn validate(&self, ds: &Dataset, algorithm: &str) -> Result<(), AlgoError> {
        for spec in &self.inputs {
            if ds.dim(&spec.name).is_none() {
                return Err(AlgoError::SignatureMismatch {
                    algorithm: algorithm.to_string(),
                    dimension: spec.name.clone(),
                    reason: "required dimension not present".to_string(),
                });
            }
        }
        for name in &self.drops {
            if ds.dim(name).is_none() {
                return Err(AlgoError::SignatureMismatch {
                    algorithm: algorithm.to_string(),
                    dimension: name.clone(),
                    reason: "dropped dimension not present".to_string(),
                });
            }
        }
        for dim in &self.adds {
            if ds.dim(dim.name()).is_some() && !self.drops.contains(&dim.name().to_string()) {
                return Err(AlgoError::SignatureMismatch {
                    algorithm: algorithm.to_string(),
                    dimension: dim.name().to_string(),
                    reason: "added dimension already exists".to_string(),
                });
            }
        }
        Ok(())
    }
}
