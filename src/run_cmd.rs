//! Run command: open, optionally resample, process in tiles, write.

use anyhow::{bail, Context, Result};
use tracing::{info, info_span};

use tellus_algo::{Chain, ChangePoint, MeanFilter, TemporalMean};
use tellus_dataset::GeoTransform;
use tellus_reproject::{GridResampler, GridSpec, Resample, ResampleMethod};
use tellus_scheduler::SchedulerConfig;

use crate::cli::RunArgs;
use crate::config::{PipelineConfig, ResampleToml, StepToml};

/// Run the full processing pipeline.
pub fn run(args: RunArgs) -> Result<()> {
    let _cmd = info_span!("run").entered();
    let toml_str = std::fs::read_to_string(&args.config)
        .with_context(|| format!("failed to read pipeline file: {}", args.config.display()))?;
    let config: PipelineConfig =
        toml::from_str(&toml_str).context("failed to parse TOML pipeline")?;

    let input = args
        .input
        .or(config.io.input)
        .context("no input path: set [io].input in the pipeline file or use --input")?;
    let output = args
        .output
        .or(config.io.output)
        .context("no output path: set [io].output in the pipeline file or use --output")?;

    info!(path = %input.display(), "opening dataset");
    let mut ds = tellus_io::open(&input)
        .with_context(|| format!("failed to open {}", input.display()))?;
    info!(dims = ds.n_dims(), vars = ds.n_vars(), "dataset loaded");

    if let Some(resample) = &config.resample {
        let target = build_grid(resample)?;
        let method = parse_method(&resample.method)?;
        info!(
            width = target.width(),
            height = target.height(),
            method = resample.method,
            "resampling onto target grid"
        );
        ds = GridResampler::new(method)
            .resample(&ds, &target)
            .context("resampling failed")?;
    }

    let chain = build_chain(&config.steps)?;
    let scheduler_cfg = {
        let mut cfg =
            SchedulerConfig::new().with_max_tile_bytes(config.scheduler.max_tile_bytes);
        if let Some(workers) = config.scheduler.workers {
            cfg = cfg.with_workers(workers);
        }
        cfg
    };

    info!(steps = chain.len(), "running pipeline");
    let result = tellus_scheduler::run(&ds, &chain, &scheduler_cfg)?;

    tellus_io::write(&result, &output)
        .with_context(|| format!("failed to write {}", output.display()))?;
    info!(path = %output.display(), vars = result.n_vars(), "output written");

    Ok(())
}

fn parse_method(name: &str) -> Result<ResampleMethod> {
    match name {
        "nearest" => Ok(ResampleMethod::Nearest),
        "bilinear" => Ok(ResampleMethod::Bilinear),
        other => bail!("unknown resample method '{other}' (expected nearest or bilinear)"),
    }
}

fn build_grid(resample: &ResampleToml) -> Result<GridSpec> {
    let transform = GeoTransform::north_up(
        resample.origin_x,
        resample.origin_y,
        resample.pixel_width,
        resample.pixel_height,
    );
    let mut spec = GridSpec::new(transform, resample.width, resample.height)
        .context("invalid [resample] grid")?;
    if let Some(crs) = &resample.crs {
        spec = spec.with_crs(crs.clone());
    }
    Ok(spec)
}

fn build_chain(steps: &[StepToml]) -> Result<Chain> {
    if steps.is_empty() {
        bail!("pipeline has no steps: add at least one [[step]]");
    }
    let mut chain = Chain::new();
    for step in steps {
        match step {
            StepToml::MeanFilter { size } => {
                chain.push(Box::new(MeanFilter::new(*size)?));
            }
            StepToml::TemporalMean => chain.push(Box::new(TemporalMean::new())),
            StepToml::ChangePoint => chain.push(Box::new(ChangePoint::new())),
        }
    }
    Ok(chain)
}
