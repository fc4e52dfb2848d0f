//! Named, coordinate-indexed axes with semantic roles.

use crate::error::DatasetError;

/// Default tolerance for nearest-match coordinate alignment.
pub const DEFAULT_ALIGN_TOL: f64 = 1e-6;

/// Semantic role of a dimension.
///
/// The role drives how the rest of the engine treats an axis: temporal
/// coordinates must be ordered, spatial axes carry the geotransform, and
/// only spatial/temporal axes are eligible for tiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// East-west pixel axis (columns).
    SpatialX,
    /// North-south pixel axis (rows).
    SpatialY,
    /// Time axis; coordinates must be monotonically non-decreasing.
    Temporal,
    /// Spectral band or derived-product axis.
    Band,
    /// Any other axis (ensemble member, quantile, ...).
    Other,
}

impl Role {
    /// Whether the scheduler may split a dimension of this role into tiles.
    ///
    /// Only spatial and temporal axes are tiled; band and other axes are
    /// always carried whole.
    pub fn is_tileable(&self) -> bool {
        matches!(self, Role::SpatialX | Role::SpatialY | Role::Temporal)
    }
}

/// Coordinate labels along a dimension.
///
/// Numeric coordinates are used for space and time; string labels cover
/// categorical axes such as band names.
#[derive(Debug, Clone, PartialEq)]
pub enum Coordinates {
    /// Scalar coordinate values, one per index.
    Numeric(Vec<f64>),
    /// Categorical labels, one per index.
    Labels(Vec<String>),
}

impl Coordinates {
    /// Number of coordinate entries.
    pub fn len(&self) -> usize {
        match self {
            Coordinates::Numeric(v) => v.len(),
            Coordinates::Labels(v) => v.len(),
        }
    }

    /// True if there are no coordinate entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Numeric values, or `None` for label coordinates.
    pub fn as_numeric(&self) -> Option<&[f64]> {
        match self {
            Coordinates::Numeric(v) => Some(v),
            Coordinates::Labels(_) => None,
        }
    }

    /// Label values, or `None` for numeric coordinates.
    pub fn as_labels(&self) -> Option<&[String]> {
        match self {
            Coordinates::Numeric(_) => None,
            Coordinates::Labels(v) => Some(v),
        }
    }

    pub(crate) fn sliced(&self, start: usize, end: usize) -> Coordinates {
        match self {
            Coordinates::Numeric(v) => Coordinates::Numeric(v[start..end].to_vec()),
            Coordinates::Labels(v) => Coordinates::Labels(v[start..end].to_vec()),
        }
    }

    pub(crate) fn selected(&self, indices: &[usize]) -> Coordinates {
        match self {
            Coordinates::Numeric(v) => {
                Coordinates::Numeric(indices.iter().map(|&i| v[i]).collect())
            }
            Coordinates::Labels(v) => {
                Coordinates::Labels(indices.iter().map(|&i| v[i].clone()).collect())
            }
        }
    }
}

/// Result of aligning two same-named dimensions from different datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    /// Coordinates are exactly equal.
    Identical,
    /// Coordinates match index-by-index within tolerance.
    Nearest,
    /// Coordinates cannot be reconciled.
    Incompatible,
}

/// A named axis with coordinate labels and a semantic role.
#[derive(Debug, Clone, PartialEq)]
pub struct Dimension {
    name: String,
    coords: Coordinates,
    role: Role,
}

impl Dimension {
    /// Defines a new dimension.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::InvalidDimension`] if the coordinates are
    /// empty, if a spatial or temporal role is given label coordinates, or
    /// if temporal coordinates are not monotonically non-decreasing.
    pub fn new(
        name: impl Into<String>,
        coords: Coordinates,
        role: Role,
    ) -> Result<Self, DatasetError> {
        let name = name.into();

        if coords.is_empty() {
            return Err(DatasetError::InvalidDimension {
                name,
                reason: "coordinates are empty".to_string(),
            });
        }

        match role {
            Role::SpatialX | Role::SpatialY | Role::Temporal => {
                let values = coords.as_numeric().ok_or_else(|| {
                    DatasetError::InvalidDimension {
                        name: name.clone(),
                        reason: format!("{role:?} role requires numeric coordinates"),
                    }
                })?;

                if let Some(i) = values.iter().position(|v| !v.is_finite()) {
                    return Err(DatasetError::InvalidDimension {
                        name,
                        reason: format!("non-finite coordinate at index {i}"),
                    });
                }

                if role == Role::Temporal && values.windows(2).any(|w| w[1] < w[0]) {
                    return Err(DatasetError::InvalidDimension {
                        name,
                        reason: "temporal coordinates must be monotonically non-decreasing"
                            .to_string(),
                    });
                }
            }
            Role::Band | Role::Other => {}
        }

        Ok(Self { name, coords, role })
    }

    /// Convenience constructor for numeric coordinates.
    pub fn numeric(
        name: impl Into<String>,
        values: Vec<f64>,
        role: Role,
    ) -> Result<Self, DatasetError> {
        Self::new(name, Coordinates::Numeric(values), role)
    }

    /// Convenience constructor for a categorical band dimension.
    pub fn labels(name: impl Into<String>, labels: Vec<String>) -> Result<Self, DatasetError> {
        Self::new(name, Coordinates::Labels(labels), Role::Band)
    }

    /// Dimension name, unique within a dataset.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Coordinate labels.
    pub fn coords(&self) -> &Coordinates {
        &self.coords
    }

    /// Semantic role.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Extent of the axis (number of coordinate entries).
    pub fn len(&self) -> usize {
        self.coords.len()
    }

    /// True if the axis has no coordinates. Never true for a constructed
    /// dimension; provided for completeness.
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// Determines how this dimension lines up with a same-named dimension
    /// from another dataset.
    ///
    /// Dimensions with different names or roles are always
    /// [`Alignment::Incompatible`]. Numeric coordinates compare exactly for
    /// [`Alignment::Identical`] and within `tol` (index by index) for
    /// [`Alignment::Nearest`]. Label coordinates only align exactly.
    pub fn align(&self, other: &Dimension, tol: f64) -> Alignment {
        if self.name != other.name || self.role != other.role || self.len() != other.len() {
            return Alignment::Incompatible;
        }

        match (&self.coords, &other.coords) {
            (Coordinates::Numeric(a), Coordinates::Numeric(b)) => {
                if a == b {
                    Alignment::Identical
                } else if a.iter().zip(b).all(|(x, y)| (x - y).abs() <= tol) {
                    Alignment::Nearest
                } else {
                    Alignment::Incompatible
                }
            }
            (Coordinates::Labels(a), Coordinates::Labels(b)) => {
                if a == b {
                    Alignment::Identical
                } else {
                    Alignment::Incompatible
                }
            }
            _ => Alignment::Incompatible,
        }
    }

    /// Copy of this dimension restricted to `start..end`.
    ///
    /// Caller is responsible for bounds; used by the selection machinery
    /// after validation.
    pub(crate) fn sliced(&self, start: usize, end: usize) -> Dimension {
        Dimension {
            name: self.name.clone(),
            coords: self.coords.sliced(start, end),
            role: self.role,
        }
    }

    pub(crate) fn selected(&self, indices: &[usize]) -> Dimension {
        Dimension {
            name: self.name.clone(),
            coords: self.coords.selected(indices),
            role: self.role,
        }
    }
}
