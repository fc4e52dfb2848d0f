use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Tellus tiled processing engine for labeled geospatial datasets.
#[derive(Parser)]
#[command(
    name = "tellus",
    version,
    about = "Tiled processing engine for labeled geospatial datasets"
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Run a processing pipeline described by a TOML file.
    Run(RunArgs),
    /// Summarize the dimensions, variables and georeferencing of a file.
    Info(InfoArgs),
}

/// Arguments for the `run` subcommand.
#[derive(clap::Args)]
pub struct RunArgs {
    /// Path to TOML pipeline file.
    #[arg(short, long, default_value = "tellus.toml")]
    pub config: PathBuf,

    /// Override input NetCDF path from config.
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Override output NetCDF path from config.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the `info` subcommand.
#[derive(clap::Args)]
pub struct InfoArgs {
    /// Path to the NetCDF file to inspect.
    #[arg(short, long)]
    pub input: PathBuf,
}
