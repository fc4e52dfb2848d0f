//! Dense n-dimensional variables tied to named dimensions.

use ndarray::{ArrayD, Axis, Slice};

use crate::error::DatasetError;

/// A dense n-dimensional array together with the ordered dimension names
/// labelling its axes.
///
/// A variable may declare any subset of its dataset's dimensions, but axis
/// order and per-axis extents must agree with the declared dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    dims: Vec<String>,
    data: ArrayD<f64>,
}

impl Variable {
    /// Creates a variable from dimension names and backing data.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::RankMismatch`] if the number of dimension
    /// names differs from the array rank, or [`DatasetError::DuplicateName`]
    /// if a dimension name is repeated.
    pub fn new(dims: Vec<String>, data: ArrayD<f64>) -> Result<Self, DatasetError> {
        if dims.len() != data.ndim() {
            return Err(DatasetError::RankMismatch {
                declared: dims.len(),
                rank: data.ndim(),
            });
        }

        for (i, name) in dims.iter().enumerate() {
            if dims[..i].contains(name) {
                return Err(DatasetError::DuplicateName { name: name.clone() });
            }
        }

        Ok(Self { dims, data })
    }

    /// Ordered dimension names, one per axis.
    pub fn dims(&self) -> &[String] {
        &self.dims
    }

    /// Backing array.
    pub fn data(&self) -> &ArrayD<f64> {
        &self.data
    }

    /// Consumes the variable, returning the backing array.
    pub fn into_data(self) -> ArrayD<f64> {
        self.data
    }

    /// Array shape.
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// Axis index of `dim` within this variable, if declared.
    pub fn axis_of(&self, dim: &str) -> Option<usize> {
        self.dims.iter().position(|d| d == dim)
    }

    /// Extent along `dim`, if declared.
    pub fn extent(&self, dim: &str) -> Option<usize> {
        self.axis_of(dim).map(|ax| self.data.shape()[ax])
    }

    /// Copy of this variable restricted to `start..end` along `dim`.
    ///
    /// Variables not declaring `dim` are returned unchanged. Bounds are the
    /// caller's responsibility.
    pub(crate) fn sliced(&self, dim: &str, start: usize, end: usize) -> Variable {
        match self.axis_of(dim) {
            Some(ax) => {
                let data = self
                    .data
                    .slice_axis(Axis(ax), Slice::from(start..end))
                    .to_owned();
                Variable {
                    dims: self.dims.clone(),
                    data,
                }
            }
            None => self.clone(),
        }
    }

    /// Copy of this variable restricted to arbitrary `indices` along `dim`.
    pub(crate) fn selected(&self, dim: &str, indices: &[usize]) -> Variable {
        match self.axis_of(dim) {
            Some(ax) => Variable {
                dims: self.dims.clone(),
                data: self.data.select(Axis(ax), indices),
            },
            None => self.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::ArrayD;

    fn var2x3() -> Variable {
        let data = ArrayD::from_shape_vec(
            ndarray::IxDyn(&[2, 3]),
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
        )
        .unwrap();
        Variable::new(vec!["y".to_string(), "x".to_string()], data).unwrap()
    }

    #[test]
    fn rank_mismatch_rejected() {
        let data = ArrayD::zeros(ndarray::IxDyn(&[2, 3]));
        let err = Variable::new(vec!["y".to_string()], data).unwrap_err();
        assert!(matches!(
            err,
            DatasetError::RankMismatch {
                declared: 1,
                rank: 2
            }
        ));
    }

    #[test]
    fn duplicate_dim_rejected() {
        let data = ArrayD::zeros(ndarray::IxDyn(&[2, 2]));
        let err = Variable::new(vec!["x".to_string(), "x".to_string()], data).unwrap_err();
        assert!(matches!(err, DatasetError::DuplicateName { .. }));
    }

    #[test]
    fn axis_lookup() {
        let v = var2x3();
        assert_eq!(v.axis_of("y"), Some(0));
        assert_eq!(v.axis_of("x"), Some(1));
        assert_eq!(v.axis_of("time"), None);
        assert_eq!(v.extent("x"), Some(3));
    }

    #[test]
    fn slicing_declared_dim() {
        let v = var2x3();
        let s = v.sliced("x", 1, 3);
        assert_eq!(s.shape(), &[2, 2]);
        assert_eq!(s.data().as_slice().unwrap(), &[2.0, 3.0, 5.0, 6.0]);
    }

    #[test]
    fn slicing_undeclared_dim_is_identity() {
        let v = var2x3();
        let s = v.sliced("time", 0, 1);
        assert_eq!(s, v);
    }

    #[test]
    fn selecting_indices() {
        let v = var2x3();
        let s = v.selected("x", &[0, 2]);
        assert_eq!(s.shape(), &[2, 2]);
        // Selection along a non-leading axis is not standard layout, so
        // compare element-wise.
        let values: Vec<f64> = s.data().iter().copied().collect();
        assert_eq!(values, vec![1.0, 3.0, 4.0, 6.0]);
    }
}
