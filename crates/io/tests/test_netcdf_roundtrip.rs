//! Write/open round trips and role inference on real NetCDF files.

use approx::assert_abs_diff_eq;
use ndarray::{ArrayD, IxDyn};
use tellus_dataset::{
    Coordinates, Dataset, Dimension, GeoMeta, GeoTransform, Role, Variable,
};
use tellus_io::{open, write, IoError};

/// Builds a small raw NetCDF file directly through the netcdf crate,
/// bypassing the writer, to exercise inference on foreign files.
struct RawFixture {
    time_values: Vec<f64>,
    with_time_coord: bool,
}

impl RawFixture {
    fn new() -> Self {
        Self {
            time_values: vec![0.0, 1.0, 2.0],
            with_time_coord: true,
        }
    }

    fn with_time_values(mut self, values: Vec<f64>) -> Self {
        self.time_values = values;
        self
    }

    fn without_time_coord(mut self) -> Self {
        self.with_time_coord = false;
        self
    }

    fn build(&self, path: &std::path::Path) {
        let mut file = netcdf::create(path).expect("create NetCDF file");
        let nt = self.time_values.len();
        file.add_dimension("time", nt).expect("add time dim");
        file.add_dimension("lat", 2).expect("add lat dim");
        file.add_dimension("lon", 3).expect("add lon dim");

        if self.with_time_coord {
            let mut var = file
                .add_variable::<f64>("time", &["time"])
                .expect("add time coord");
            var.put_values(&self.time_values, ..).expect("put time");
            var.put_attribute("axis", "T").expect("put axis");
        }
        {
            let mut var = file
                .add_variable::<f64>("lat", &["lat"])
                .expect("add lat coord");
            var.put_values(&[10.0, 20.0], ..).expect("put lat");
        }
        {
            let mut var = file
                .add_variable::<f64>("lon", &["lon"])
                .expect("add lon coord");
            var.put_values(&[100.0, 110.0, 120.0], ..).expect("put lon");
        }
        {
            let mut var = file
                .add_variable::<f64>("pr", &["time", "lat", "lon"])
                .expect("add pr");
            let values: Vec<f64> = (0..nt * 6).map(|i| i as f64).collect();
            var.put_values(&values, ..).expect("put pr");
        }
    }
}

fn sample_dataset() -> Dataset {
    let mut ds = Dataset::new().with_geo(GeoMeta::new(
        "EPSG:32633",
        GeoTransform::north_up(500_000.0, 4_600_000.0, 30.0, -30.0),
    ));
    ds.add_dimension(
        Dimension::numeric("time", vec![0.0, 10.0, 20.0, 30.0], Role::Temporal).unwrap(),
    )
    .unwrap();
    ds.add_dimension(
        Dimension::numeric("y", vec![4_599_985.0, 4_599_955.0], Role::SpatialY).unwrap(),
    )
    .unwrap();
    ds.add_dimension(
        Dimension::numeric("x", vec![500_015.0, 500_045.0, 500_075.0], Role::SpatialX).unwrap(),
    )
    .unwrap();
    ds.add_dimension(
        Dimension::labels("band", vec!["red".to_string(), "nir".to_string()]).unwrap(),
    )
    .unwrap();

    let reflectance: Vec<f64> = (0..4 * 2 * 2 * 3).map(|i| (i as f64) / 10.0).collect();
    ds.add_variable(
        "reflectance",
        Variable::new(
            vec![
                "time".to_string(),
                "band".to_string(),
                "y".to_string(),
                "x".to_string(),
            ],
            ArrayD::from_shape_vec(IxDyn(&[4, 2, 2, 3]), reflectance).unwrap(),
        )
        .unwrap(),
    )
    .unwrap();
    ds.add_variable(
        "elevation",
        Variable::new(
            vec!["y".to_string(), "x".to_string()],
            ArrayD::from_shape_vec(IxDyn(&[2, 3]), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap(),
        )
        .unwrap(),
    )
    .unwrap();
    ds
}

#[test]
fn write_then_open_restores_everything() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("cube.nc");

    let ds = sample_dataset();
    write(&ds, &path).expect("write dataset");
    let back = open(&path).expect("open dataset");

    assert_eq!(back.dim_names(), ds.dim_names());
    assert_eq!(back.var_names(), ds.var_names());

    for dim in ds.dims() {
        let restored = back.dim(dim.name()).expect("dimension restored");
        assert_eq!(restored.role(), dim.role(), "role of {}", dim.name());
        assert_eq!(restored.coords(), dim.coords(), "coords of {}", dim.name());
    }

    assert_eq!(
        back.variable("reflectance").unwrap().data(),
        ds.variable("reflectance").unwrap().data()
    );
    assert_eq!(
        back.variable("elevation").unwrap().dims(),
        ds.variable("elevation").unwrap().dims()
    );

    assert_eq!(back.geo().crs.as_deref(), Some("EPSG:32633"));
    let t = back.geo().transform.expect("transform restored");
    assert_abs_diff_eq!(t.origin_x, 500_000.0);
    assert_abs_diff_eq!(t.pixel_height, -30.0);
}

#[test]
fn label_coordinates_round_trip() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("bands.nc");

    let ds = sample_dataset();
    write(&ds, &path).expect("write dataset");
    let back = open(&path).expect("open dataset");

    match back.dim("band").unwrap().coords() {
        Coordinates::Labels(labels) => {
            assert_eq!(labels, &["red".to_string(), "nir".to_string()]);
        }
        Coordinates::Numeric(_) => panic!("band labels were lost"),
    }
}

#[test]
fn foreign_file_roles_are_inferred() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("foreign.nc");
    RawFixture::new().build(&path);

    let ds = open(&path).expect("open foreign file");
    assert_eq!(ds.dim("time").unwrap().role(), Role::Temporal);
    assert_eq!(ds.dim("lat").unwrap().role(), Role::SpatialY);
    assert_eq!(ds.dim("lon").unwrap().role(), Role::SpatialX);
    assert!(ds.geo().crs.is_none());

    let pr = ds.variable("pr").expect("data variable");
    assert_eq!(pr.dims(), &["time", "lat", "lon"]);
    assert_eq!(pr.shape(), &[3, 2, 3]);
}

#[test]
fn dimension_without_coordinate_gets_index_coords() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("no_coord.nc");
    RawFixture::new().without_time_coord().build(&path);

    let ds = open(&path).expect("open file");
    assert_eq!(
        ds.dim("time").unwrap().coords().as_numeric().unwrap(),
        &[0.0, 1.0, 2.0]
    );
}

#[test]
fn non_monotonic_time_is_a_format_error() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("bad_time.nc");
    RawFixture::new()
        .with_time_values(vec![2.0, 0.0, 1.0])
        .build(&path);

    let err = open(&path).unwrap_err();
    assert!(matches!(err, IoError::Format { .. }), "got {err}");
}
