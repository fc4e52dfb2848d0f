//! The labeled n-dimensional dataset container.

use std::collections::BTreeMap;

use crate::dimension::Dimension;
use crate::error::DatasetError;
use crate::geo::GeoMeta;
use crate::variable::Variable;

/// A labeled collection of n-dimensional variables sharing named dimensions
/// and geospatial metadata.
///
/// Variables are exclusively owned by their dataset; operations such as
/// [`select_index`](Dataset::select_index), [`merge`](Dataset::merge) and
/// [`reduce`](Dataset::reduce) always produce new datasets and never mutate
/// their input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    dims: BTreeMap<String, Dimension>,
    vars: BTreeMap<String, Variable>,
    geo: GeoMeta,
}

impl Dataset {
    /// Creates an empty dataset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the geospatial metadata, builder style.
    pub fn with_geo(mut self, geo: GeoMeta) -> Self {
        self.geo = geo;
        self
    }

    /// Geospatial metadata.
    pub fn geo(&self) -> &GeoMeta {
        &self.geo
    }

    /// Replaces the geospatial metadata.
    pub fn set_geo(&mut self, geo: GeoMeta) {
        self.geo = geo;
    }

    /// Registers a dimension.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::DuplicateName`] if a dimension of that name
    /// already exists.
    pub fn add_dimension(&mut self, dim: Dimension) -> Result<(), DatasetError> {
        if self.dims.contains_key(dim.name()) {
            return Err(DatasetError::DuplicateName {
                name: dim.name().to_string(),
            });
        }
        self.dims.insert(dim.name().to_string(), dim);
        Ok(())
    }

    /// Adds a variable under `name`.
    ///
    /// # Errors
    ///
    /// - [`DatasetError::DuplicateName`] if the name is taken.
    /// - [`DatasetError::UnknownDimension`] if the variable declares a
    ///   dimension the dataset does not have.
    /// - [`DatasetError::ShapeMismatch`] if an axis extent disagrees with
    ///   the dimension's coordinate length.
    pub fn add_variable(
        &mut self,
        name: impl Into<String>,
        var: Variable,
    ) -> Result<(), DatasetError> {
        let name = name.into();
        if self.vars.contains_key(&name) {
            return Err(DatasetError::DuplicateName { name });
        }

        for (ax, dim_name) in var.dims().iter().enumerate() {
            let dim = self
                .dims
                .get(dim_name)
                .ok_or_else(|| DatasetError::UnknownDimension {
                    name: dim_name.clone(),
                })?;
            let got = var.shape()[ax];
            if got != dim.len() {
                return Err(DatasetError::ShapeMismatch {
                    variable: name,
                    dimension: dim_name.clone(),
                    expected: dim.len(),
                    got,
                });
            }
        }

        self.vars.insert(name, var);
        Ok(())
    }

    /// Looks up a dimension by name.
    pub fn dim(&self, name: &str) -> Option<&Dimension> {
        self.dims.get(name)
    }

    /// All dimensions, in name order.
    pub fn dims(&self) -> impl Iterator<Item = &Dimension> {
        self.dims.values()
    }

    /// All dimension names, in name order.
    pub fn dim_names(&self) -> Vec<&str> {
        self.dims.keys().map(String::as_str).collect()
    }

    /// Extent of a dimension, if present.
    pub fn extent(&self, dim: &str) -> Option<usize> {
        self.dims.get(dim).map(Dimension::len)
    }

    /// Looks up a variable by name.
    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.vars.get(name)
    }

    /// All variables, keyed by name, in name order.
    pub fn variables(&self) -> impl Iterator<Item = (&String, &Variable)> {
        self.vars.iter()
    }

    /// All variable names, in name order.
    pub fn var_names(&self) -> Vec<&str> {
        self.vars.keys().map(String::as_str).collect()
    }

    /// Number of variables.
    pub fn n_vars(&self) -> usize {
        self.vars.len()
    }

    /// Number of dimensions.
    pub fn n_dims(&self) -> usize {
        self.dims.len()
    }

    /// True if the dataset holds no variables.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Names of all variables whose dimension set is a superset of `dims`.
    pub fn vars_with_dims(&self, dims: &[&str]) -> Vec<String> {
        self.vars
            .iter()
            .filter(|(_, v)| dims.iter().all(|d| v.axis_of(d).is_some()))
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Total number of stored elements across all variables.
    pub fn total_elements(&self) -> usize {
        self.vars.values().map(|v| v.data().len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimension::Role;
    use ndarray::ArrayD;

    fn grid() -> Dataset {
        let mut ds = Dataset::new();
        ds.add_dimension(Dimension::numeric("y", vec![0.0, 1.0], Role::SpatialY).unwrap())
            .unwrap();
        ds.add_dimension(Dimension::numeric("x", vec![0.0, 1.0, 2.0], Role::SpatialX).unwrap())
            .unwrap();
        ds
    }

    #[test]
    fn add_variable_validates_extents() {
        let mut ds = grid();
        let bad = Variable::new(
            vec!["y".to_string(), "x".to_string()],
            ArrayD::zeros(ndarray::IxDyn(&[2, 4])),
        )
        .unwrap();
        let err = ds.add_variable("v", bad).unwrap_err();
        assert!(matches!(
            err,
            DatasetError::ShapeMismatch {
                expected: 3,
                got: 4,
                ..
            }
        ));
    }

    #[test]
    fn add_variable_rejects_unknown_dim() {
        let mut ds = grid();
        let v = Variable::new(
            vec!["time".to_string()],
            ArrayD::zeros(ndarray::IxDyn(&[5])),
        )
        .unwrap();
        let err = ds.add_variable("v", v).unwrap_err();
        assert!(matches!(err, DatasetError::UnknownDimension { .. }));
    }

    #[test]
    fn duplicate_names_rejected() {
        let mut ds = grid();
        let dup = Dimension::numeric("x", vec![0.0], Role::SpatialX).unwrap();
        assert!(matches!(
            ds.add_dimension(dup),
            Err(DatasetError::DuplicateName { .. })
        ));

        let v = Variable::new(
            vec!["y".to_string(), "x".to_string()],
            ArrayD::zeros(ndarray::IxDyn(&[2, 3])),
        )
        .unwrap();
        ds.add_variable("v", v.clone()).unwrap();
        assert!(matches!(
            ds.add_variable("v", v),
            Err(DatasetError::DuplicateName { .. })
        ));
    }

    #[test]
    fn vars_with_dims_filters() {
        let mut ds = grid();
        let v2 = Variable::new(
            vec!["y".to_string(), "x".to_string()],
            ArrayD::zeros(ndarray::IxDyn(&[2, 3])),
        )
        .unwrap();
        let v1 = Variable::new(vec!["x".to_string()], ArrayD::zeros(ndarray::IxDyn(&[3]))).unwrap();
        ds.add_variable("full", v2).unwrap();
        ds.add_variable("profile", v1).unwrap();

        assert_eq!(ds.vars_with_dims(&["y", "x"]), vec!["full".to_string()]);
        assert_eq!(ds.vars_with_dims(&["x"]).len(), 2);
    }
}
