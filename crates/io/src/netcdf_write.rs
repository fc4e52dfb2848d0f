//! Writing datasets to NetCDF files.

use std::path::Path;

use tellus_dataset::{Coordinates, Dataset, Role};
use tracing::debug;

use crate::error::IoError;
use crate::netcdf_read::{GRID_MAPPING_VAR, LABELS_ATTR};

fn axis_attr(role: Role) -> Option<&'static str> {
    match role {
        Role::SpatialX => Some("X"),
        Role::SpatialY => Some("Y"),
        Role::Temporal => Some("T"),
        Role::Band | Role::Other => None,
    }
}

/// Writes a [`Dataset`] to a NetCDF file at `path`, creating or
/// truncating it.
///
/// Every dimension gets a coordinate variable (label coordinates are
/// stored as an index coordinate with a `labels` attribute), roles are
/// recorded as CF `axis` attributes, and CRS plus affine transform go
/// onto a `spatial_ref` grid-mapping variable so that
/// [`open`](crate::open) restores the dataset faithfully.
///
/// # Errors
///
/// Returns [`IoError::Netcdf`] for any failure inside the NetCDF
/// library.
pub fn write(ds: &Dataset, path: impl AsRef<Path>) -> Result<(), IoError> {
    let path = path.as_ref();
    let mut file = netcdf::create(path)?;

    for dim in ds.dims() {
        file.add_dimension(dim.name(), dim.len())?;
    }

    for dim in ds.dims() {
        let mut coord_var = file.add_variable::<f64>(dim.name(), &[dim.name()])?;
        match dim.coords() {
            Coordinates::Numeric(values) => {
                coord_var.put_values(values, ..)?;
            }
            Coordinates::Labels(labels) => {
                let indices: Vec<f64> = (0..labels.len()).map(|i| i as f64).collect();
                coord_var.put_values(&indices, ..)?;
                coord_var.put_attribute(LABELS_ATTR, labels.clone())?;
            }
        }
        if let Some(axis) = axis_attr(dim.role()) {
            coord_var.put_attribute("axis", axis)?;
        }
    }

    let has_geo = ds.geo().crs.is_some() || ds.geo().transform.is_some();
    if has_geo {
        let mut grid_mapping = file.add_variable::<i32>(GRID_MAPPING_VAR, &[])?;
        if let Some(crs) = &ds.geo().crs {
            grid_mapping.put_attribute("spatial_ref", crs.as_str())?;
        }
        if let Some(t) = ds.geo().transform {
            let c = t.to_gdal();
            let text = format!("{} {} {} {} {} {}", c[0], c[1], c[2], c[3], c[4], c[5]);
            grid_mapping.put_attribute("GeoTransform", text)?;
        }
    }

    for (name, var) in ds.variables() {
        let dim_names: Vec<&str> = var.dims().iter().map(String::as_str).collect();
        let mut nc_var = file.add_variable::<f64>(name, &dim_names)?;
        let values: Vec<f64> = var.data().iter().copied().collect();
        nc_var.put_values(&values, ..)?;
        if has_geo {
            nc_var.put_attribute("grid_mapping", GRID_MAPPING_VAR)?;
        }
    }

    debug!(
        path = %path.display(),
        dims = ds.n_dims(),
        vars = ds.n_vars(),
        "wrote dataset"
    );
    Ok(())
}
