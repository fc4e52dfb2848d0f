//! Sequential composition of algorithms.

use std::collections::{BTreeMap, BTreeSet};

use tellus_dataset::{Dataset, Dimension};
use tracing::debug_span;

use crate::algorithm::Algorithm;
use crate::error::AlgoError;
use crate::signature::DimRequirement;

/// An ordered chain of algorithms applied as one unit.
///
/// The scheduler treats the whole chain as a single transform: the halo is
/// the per-dimension **maximum** over all steps, computed once (halos do
/// not sum across sequential steps, since each step consumes the already
/// halo-extended output region of its predecessor), and a dimension any
/// step requires at full extent is never chunked for the whole run.
#[derive(Default)]
pub struct Chain {
    steps: Vec<Box<dyn Algorithm>>,
}

impl Chain {
    /// Empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a step, builder style.
    pub fn with_step(mut self, step: Box<dyn Algorithm>) -> Self {
        self.steps.push(step);
        self
    }

    /// Appends a step.
    pub fn push(&mut self, step: Box<dyn Algorithm>) {
        self.steps.push(step);
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// True if the chain has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The steps, in application order.
    pub fn steps(&self) -> &[Box<dyn Algorithm>] {
        &self.steps
    }

    /// Combined halo requirement: per-dimension maximum over all steps.
    pub fn halo(&self) -> BTreeMap<String, usize> {
        let mut halo: BTreeMap<String, usize> = BTreeMap::new();
        for step in &self.steps {
            for spec in step.signature().inputs() {
                let entry = halo.entry(spec.name().to_string()).or_insert(0);
                *entry = (*entry).max(spec.halo());
            }
        }
        halo.retain(|_, h| *h > 0);
        halo
    }

    /// Dimensions some step requires at full extent; the scheduler must
    /// never chunk along these.
    pub fn full_extent_dims(&self) -> BTreeSet<String> {
        self.steps
            .iter()
            .flat_map(|s| {
                s.signature()
                    .inputs()
                    .iter()
                    .filter(|spec| spec.requirement() == DimRequirement::FullExtent)
                    .map(|spec| spec.name().to_string())
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// Dimensions removed by the chain's output, in drop order.
    pub fn dropped_dims(&self) -> Vec<String> {
        let mut dropped = Vec::new();
        for step in &self.steps {
            for name in step.signature().dropped() {
                if !dropped.contains(name) {
                    dropped.push(name.clone());
                }
            }
        }
        dropped
    }

    /// Dimensions introduced by the chain's output.
    pub fn added_dims(&self) -> Vec<Dimension> {
        self.steps
            .iter()
            .flat_map(|s| s.signature().added().to_vec())
            .collect()
    }

    /// Validates every step against the dataset, tracking the dimension
    /// set as steps drop and add dimensions.
    ///
    /// # Errors
    ///
    /// - [`AlgoError::EmptyChain`] for a chain with no steps.
    /// - [`AlgoError::SignatureMismatch`] if a step requires a dimension
    ///   that is missing (or already consumed by an earlier step).
    pub fn validate(&self, ds: &Dataset) -> Result<(), AlgoError> {
        if self.steps.is_empty() {
            return Err(AlgoError::EmptyChain);
        }

        let mut dims: BTreeSet<String> =
            ds.dim_names().into_iter().map(str::to_string).collect();

        for step in &self.steps {
            let sig = step.signature();
            for spec in sig.inputs() {
                if !dims.contains(spec.name()) {
                    return Err(AlgoError::SignatureMismatch {
                        algorithm: step.name().to_string(),
                        dimension: spec.name().to_string(),
                        reason: "required dimension not present at this point in the chain"
                            .to_string(),
                    });
                }
            }
            for name in sig.dropped() {
                if !dims.remove(name) {
                    return Err(AlgoError::SignatureMismatch {
                        algorithm: step.name().to_string(),
                        dimension: name.clone(),
                        reason: "dropped dimension not present".to_string(),
                    });
                }
            }
            for dim in sig.added() {
                if !dims.insert(dim.name().to_string()) {
                    return Err(AlgoError::SignatureMismatch {
                        algorithm: step.name().to_string(),
                        dimension: dim.name().to_string(),
                        reason: "added dimension already exists".to_string(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Applies every step in order to one chunk.
    ///
    /// # Errors
    ///
    /// - [`AlgoError::EmptyChain`] for a chain with no steps.
    /// - Any error from a step's [`Algorithm::apply`].
    pub fn apply(&self, chunk: &Dataset) -> Result<Dataset, AlgoError> {
        if self.steps.is_empty() {
            return Err(AlgoError::EmptyChain);
        }

        let mut current: Option<Dataset> = None;
        for step in &self.steps {
            let _span = debug_span!("step", algorithm = step.name()).entered();
            let next = match &current {
                Some(ds) => step.apply(ds)?,
                None => step.apply(chunk)?,
            };
            current = Some(next);
        }
        // The empty-chain check above guarantees at least one step ran.
        current.ok_or(AlgoError::EmptyChain)
    }
}

impl std::fmt::Debug for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.steps.iter().map(|s| s.name()).collect();
        f.debug_struct("Chain").field("steps", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::MeanFilter;
    use crate::temporal::{ChangePoint, TemporalMean};
    use tellus_dataset::{Dimension, Role, Variable};

    fn cube() -> Dataset {
        let mut ds = Dataset::new();
        ds.add_dimension(
            Dimension::numeric("time", (0..4).map(|i| i as f64).collect(), Role::Temporal)
                .unwrap(),
        )
        .unwrap();
        ds.add_dimension(Dimension::numeric("y", vec![0.0, 1.0], Role::SpatialY).unwrap())
            .unwrap();
        ds.add_dimension(Dimension::numeric("x", vec![0.0, 1.0], Role::SpatialX).unwrap())
            .unwrap();
        let data = ndarray::ArrayD::from_shape_vec(
            ndarray::IxDyn(&[4, 2, 2]),
            (0..16).map(f64::from).collect(),
        )
        .unwrap();
        ds.add_variable(
            "v",
            Variable::new(
                vec!["time".to_string(), "y".to_string(), "x".to_string()],
                data,
            )
            .unwrap(),
        )
        .unwrap();
        ds
    }

    #[test]
    fn combined_halo_is_per_dimension_max() {
        let chain = Chain::new()
            .with_step(Box::new(MeanFilter::new(3).unwrap()))
            .with_step(Box::new(MeanFilter::new(7).unwrap()));
        let halo = chain.halo();
        assert_eq!(halo.get("y"), Some(&3));
        assert_eq!(halo.get("x"), Some(&3));
        assert!(halo.get("time").is_none());
    }

    #[test]
    fn full_extent_union() {
        let chain = Chain::new()
            .with_step(Box::new(MeanFilter::new(3).unwrap()))
            .with_step(Box::new(TemporalMean::new()));
        let full = chain.full_extent_dims();
        assert!(full.contains("time"));
        assert!(!full.contains("y"));
    }

    #[test]
    fn validate_tracks_dropped_dims() {
        let ds = cube();
        // TemporalMean drops "time", so a later ChangePoint on "time" is
        // invalid.
        let chain = Chain::new()
            .with_step(Box::new(TemporalMean::new()))
            .with_step(Box::new(ChangePoint::new()));
        let err = chain.validate(&ds).unwrap_err();
        assert!(matches!(err, AlgoError::SignatureMismatch { .. }));
        assert!(err.to_string().contains("time"));
    }

    #[test]
    fn empty_chain_rejected() {
        let ds = cube();
        let chain = Chain::new();
        assert!(matches!(chain.validate(&ds), Err(AlgoError::EmptyChain)));
        assert!(matches!(chain.apply(&ds), Err(AlgoError::EmptyChain)));
    }

    #[test]
    fn chained_apply_runs_in_order() {
        let ds = cube();
        let chain = Chain::new()
            .with_step(Box::new(MeanFilter::new(1).unwrap()))
            .with_step(Box::new(TemporalMean::new()));
        chain.validate(&ds).unwrap();
        let out = chain.apply(&ds).unwrap();
        assert!(out.dim("time").is_none());
        assert_eq!(out.extent("y"), Some(2));
    }
}
