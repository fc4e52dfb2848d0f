//! Reading NetCDF files into datasets.

use std::path::Path;

use ndarray::{ArrayD, IxDyn};
use netcdf::AttributeValue;
use tellus_dataset::{Coordinates, Dataset, Dimension, GeoMeta, GeoTransform, Role, Variable};
use tracing::debug;

use crate::error::IoError;

/// Scalar variable carrying CRS and transform attributes, following the
/// GDAL / rioxarray convention.
pub(crate) const GRID_MAPPING_VAR: &str = "spatial_ref";

/// Attribute holding label coordinates on an index coordinate variable.
pub(crate) const LABELS_ATTR: &str = "labels";

fn string_attr(var: &netcdf::Variable<'_>, name: &str) -> Option<String> {
    var.attribute_value(name)
        .and_then(|res| res.ok())
        .and_then(|av| match av {
            AttributeValue::Str(s) => Some(s),
            _ => None,
        })
}

fn strings_attr(var: &netcdf::Variable<'_>, name: &str) -> Option<Vec<String>> {
    var.attribute_value(name)
        .and_then(|res| res.ok())
        .and_then(|av| match av {
            AttributeValue::Strs(v) => Some(v),
            AttributeValue::Str(s) => Some(vec![s]),
            _ => None,
        })
}

/// Infers the role of a dimension from CF attributes, with name
/// heuristics as fallback.
fn infer_role(name: &str, axis: Option<&str>, standard_name: Option<&str>) -> Role {
    if let Some(axis) = axis {
        match axis.to_ascii_lowercase().as_str() {
            "x" => return Role::SpatialX,
            "y" => return Role::SpatialY,
            "t" => return Role::Temporal,
            _ => {}
        }
    }
    if let Some(std_name) = standard_name {
        match std_name.to_ascii_lowercase().as_str() {
            "projection_x_coordinate" | "longitude" => return Role::SpatialX,
            "projection_y_coordinate" | "latitude" => return Role::SpatialY,
            "time" => return Role::Temporal,
            _ => {}
        }
    }
    match name.to_ascii_lowercase().as_str() {
        "x" | "lon" | "longitude" | "easting" => Role::SpatialX,
        "y" | "lat" | "latitude" | "northing" => Role::SpatialY,
        "time" | "t" | "date" => Role::Temporal,
        "band" | "bands" | "channel" | "wavelength" => Role::Band,
        _ => Role::Other,
    }
}

fn read_geo(file: &netcdf::File) -> Result<GeoMeta, IoError> {
    let Some(var) = file.variable(GRID_MAPPING_VAR) else {
        return Ok(GeoMeta::default());
    };

    let crs = string_attr(&var, "spatial_ref").or_else(|| string_attr(&var, "crs_wkt"));

    let transform = match string_attr(&var, "GeoTransform") {
        Some(text) => {
            let coeffs: Vec<f64> = text
                .split_whitespace()
                .map(str::parse::<f64>)
                .collect::<Result<_, _>>()
                .map_err(|e| IoError::Format {
                    reason: format!("malformed GeoTransform attribute '{text}': {e}"),
                })?;
            let coeffs: [f64; 6] = coeffs.try_into().map_err(|v: Vec<f64>| IoError::Format {
                reason: format!("GeoTransform needs 6 coefficients, got {}", v.len()),
            })?;
            Some(GeoTransform::from_gdal(coeffs))
        }
        None => None,
    };

    Ok(GeoMeta { crs, transform })
}

/// Opens a NetCDF file as a [`Dataset`].
///
/// Dimension roles are inferred from CF `axis` / `standard_name`
/// attributes on the coordinate variables, falling back to name
/// heuristics; dimensions without a coordinate variable get index
/// coordinates. CRS and affine transform are read from a `spatial_ref`
/// grid-mapping variable when present.
///
/// # Errors
///
/// - [`IoError::FileNotFound`] if `path` does not exist.
/// - [`IoError::Netcdf`] for failures inside the NetCDF library.
/// - [`IoError::Format`] for files without dimensions, malformed
///   georeferencing, or coordinates the data model rejects (for example
///   a non-monotonic time axis).
pub fn open(path: impl AsRef<Path>) -> Result<Dataset, IoError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(IoError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let file = netcdf::open(path)?;

    let mut ds = Dataset::new().with_geo(read_geo(&file)?);

    let dims: Vec<(String, usize)> = file
        .dimensions()
        .map(|d| (d.name().to_string(), d.len()))
        .collect();
    if dims.is_empty() {
        return Err(IoError::Format {
            reason: format!("{} has no dimensions", path.display()),
        });
    }

    for (name, len) in &dims {
        let dimension = match file.variable(name) {
            Some(coord_var) => {
                let role = infer_role(
                    name,
                    string_attr(&coord_var, "axis").as_deref(),
                    string_attr(&coord_var, "standard_name").as_deref(),
                );
                match strings_attr(&coord_var, LABELS_ATTR) {
                    Some(labels) => Dimension::new(name, Coordinates::Labels(labels), role)?,
                    None => {
                        let values = coord_var.get_values::<f64, _>(..)?;
                        Dimension::new(name, Coordinates::Numeric(values), role)?
                    }
                }
            }
            // No coordinate variable: index coordinates.
            None => Dimension::new(
                name,
                Coordinates::Numeric((0..*len).map(|i| i as f64).collect()),
                infer_role(name, None, None),
            )?,
        };
        ds.add_dimension(dimension)?;
    }

    for var in file.variables() {
        let name = var.name();
        if name == GRID_MAPPING_VAR || dims.iter().any(|(d, _)| *d == name) {
            continue;
        }

        let var_dims: Vec<String> = var.dimensions().iter().map(|d| d.name()).collect();
        let shape: Vec<usize> = var.dimensions().iter().map(netcdf::Dimension::len).collect();
        let values = var.get_values::<f64, _>(..)?;
        let data = ArrayD::from_shape_vec(IxDyn(&shape), values).map_err(|e| IoError::Format {
            reason: format!("variable '{name}' data does not match its shape: {e}"),
        })?;
        ds.add_variable(name.clone(), Variable::new(var_dims, data)?)?;
    }

    debug!(
        path = %path.display(),
        dims = ds.n_dims(),
        vars = ds.n_vars(),
        "opened dataset"
    );
    Ok(ds)
}
