//! Info command: summarize a file's structure.

use anyhow::{Context, Result};
use tellus_dataset::{Coordinates, Dataset, Role};

use crate::cli::InfoArgs;

/// Print a dimensions/variables/georeferencing summary.
pub fn run(args: InfoArgs) -> Result<()> {
    let ds = tellus_io::open(&args.input)
        .with_context(|| format!("failed to open {}", args.input.display()))?;
    print!("{}", summarize(&ds, &args.input.display().to_string()));
    Ok(())
}

fn role_name(role: Role) -> &'static str {
    match role {
        Role::SpatialX => "spatial-x",
        Role::SpatialY => "spatial-y",
        Role::Temporal => "temporal",
        Role::Band => "band",
        Role::Other => "other",
    }
}

fn summarize(ds: &Dataset, source: &str) -> String {
    use std::fmt::Write as _;

    let mut out = String::new();
    let _ = writeln!(out, "{source}");

    let _ = writeln!(out, "dimensions:");
    for dim in ds.dims() {
        let span = match dim.coords() {
            Coordinates::Numeric(values) => match (values.first(), values.last()) {
                (Some(first), Some(last)) => format!("{first} .. {last}"),
                _ => String::new(),
            },
            Coordinates::Labels(labels) => labels.join(", "),
        };
        let _ = writeln!(
            out,
            "  {} ({}, {}): {}",
            dim.name(),
            role_name(dim.role()),
            dim.len(),
            span
        );
    }

    let _ = writeln!(out, "variables:");
    for (name, var) in ds.variables() {
        let _ = writeln!(out, "  {} ({}): {:?}", name, var.dims().join(", "), var.shape());
    }

    match &ds.geo().crs {
        Some(crs) => {
            let _ = writeln!(out, "crs: {crs}");
        }
        None => {
            let _ = writeln!(out, "crs: none");
        }
    }
    if let Some(t) = ds.geo().transform {
        let c = t.to_gdal();
        let _ = writeln!(
            out,
            "transform: {} {} {} {} {} {}",
            c[0], c[1], c[2], c[3], c[4], c[5]
        );
    }

    out
}
