//! resizer: trim, remove backgrounds from, and resize image files.
//!
//! Runs the pipeline stage by stage on one input file and writes the
//! encoded result. With `-v` each stage is logged with its duration.
//!
//! # Usage
//!
//! ```text
//! resizer [OPTIONS] <INPUT> -o <OUTPUT>
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use anyhow::Context;
use clap::{ArgAction, Parser, ValueEnum};
use resizer_pipeline::pipeline::{Advance, STAGE_COUNT, Stage};
use resizer_pipeline::{
    Dimensions, OutputFormat, Pipeline, PngCompression, ProcessOptions, ResampleFilter,
    normalize_quality,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// Trim borders, remove flat backgrounds, and resize raster images.
///
/// Reads PNG, JPEG, WebP, or BMP and writes PNG or JPEG. When only one of
/// `--width` and `--height` is given the other follows the aspect ratio.
#[derive(Parser)]
#[command(name = "resizer", version)]
struct Cli {
    /// Path to the input image.
    input: PathBuf,

    /// Path to write the result to.
    #[arg(short, long)]
    output: PathBuf,

    /// Output width in pixels.
    #[arg(long, value_parser = clap::builder::RangedU64ValueParser::<u32>::new().range(1..))]
    width: Option<u32>,

    /// Output height in pixels.
    #[arg(long, value_parser = clap::builder::RangedU64ValueParser::<u32>::new().range(1..))]
    height: Option<u32>,

    /// Crop uniform or transparent borders.
    #[arg(long)]
    trim: bool,

    /// Make edge-connected background pixels transparent.
    #[arg(long)]
    remove_background: bool,

    /// Output format. Inferred from the output extension when omitted.
    #[arg(long, value_enum)]
    format: Option<Format>,

    /// JPEG quality (1-100). For PNG, selects a compression level unless
    /// `--png-compression` is given.
    #[arg(long, value_parser = clap::builder::RangedU64ValueParser::<u8>::new().range(1..=100))]
    quality: Option<u8>,

    /// PNG compression effort.
    #[arg(long, value_enum)]
    png_compression: Option<Compression>,

    /// Resampling filter for the final resize.
    #[arg(long, value_enum, default_value_t = Filter::CatmullRom)]
    filter: Filter,

    /// Refuse images larger than this many pixels.
    #[arg(long)]
    max_pixels: Option<u64>,

    /// Full options as a JSON string.
    ///
    /// When provided, all other processing flags are ignored.
    #[arg(long)]
    options_json: Option<String>,

    /// Print a JSON summary instead of a one-line report.
    #[arg(long)]
    json: bool,

    /// Log pipeline stages (-v for info, -vv for debug).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

/// Output format selection.
#[derive(Clone, Copy, ValueEnum)]
enum Format {
    /// Lossless PNG.
    Png,
    /// Lossy JPEG.
    #[value(alias = "jpg")]
    Jpeg,
}

/// PNG compression selection.
#[derive(Clone, Copy, ValueEnum)]
enum Compression {
    /// Fastest encoding, largest files.
    Fast,
    /// Balanced.
    Default,
    /// Smallest files.
    Best,
}

/// Resampling filter selection.
#[derive(Clone, Copy, ValueEnum)]
enum Filter {
    /// Nearest-neighbor (fastest, blocky).
    Nearest,
    /// Bilinear interpolation (fast, decent quality).
    Triangle,
    /// Bicubic Catmull-Rom (moderate, good quality).
    CatmullRom,
    /// Gaussian (moderate, smooth).
    Gaussian,
    /// Lanczos with 3 lobes (slowest, sharpest).
    Lanczos3,
}

/// Pick the output format from the flag, else from the output extension.
fn resolve_format(flag: Option<Format>, output: &Path) -> OutputFormat {
    match flag {
        Some(Format::Png) => OutputFormat::Png,
        Some(Format::Jpeg) => OutputFormat::Jpeg,
        None => output
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or(OutputFormat::Png, OutputFormat::from_name_lenient),
    }
}

/// Build [`ProcessOptions`] from CLI arguments.
///
/// If `--options-json` is provided, the JSON is parsed directly and all
/// individual processing flags are ignored. Its quality is normalized
/// like the worker's.
fn options_from_cli(cli: &Cli) -> anyhow::Result<ProcessOptions> {
    if let Some(ref json) = cli.options_json {
        let mut options: ProcessOptions =
            serde_json::from_str(json).context("failed to parse --options-json")?;
        options.quality = normalize_quality(i64::from(options.quality));
        return Ok(options);
    }

    let quality = cli.quality.unwrap_or(ProcessOptions::DEFAULT_QUALITY);
    let png_compression = match (cli.png_compression, cli.quality) {
        (Some(Compression::Fast), _) => PngCompression::Fast,
        (Some(Compression::Default), _) => PngCompression::Default,
        (Some(Compression::Best), _) => PngCompression::Best,
        (None, Some(q)) => PngCompression::from_quality(q),
        (None, None) => PngCompression::Default,
    };

    Ok(ProcessOptions {
        trim: cli.trim,
        remove_background: cli.remove_background,
        format: resolve_format(cli.format, &cli.output),
        quality,
        width: cli.width.unwrap_or(0),
        height: cli.height.unwrap_or(0),
        png_compression,
        filter: match cli.filter {
            Filter::Nearest => ResampleFilter::Nearest,
            Filter::Triangle => ResampleFilter::Triangle,
            Filter::CatmullRom => ResampleFilter::CatmullRom,
            Filter::Gaussian => ResampleFilter::Gaussian,
            Filter::Lanczos3 => ResampleFilter::Lanczos3,
        },
        max_pixels: cli.max_pixels,
    })
}

/// Machine-readable run summary printed by `--json`.
#[derive(Serialize)]
struct Summary<'a> {
    input: &'a Path,
    output: &'a Path,
    format: OutputFormat,
    mime_type: &'static str,
    original: Dimensions,
    dimensions: Dimensions,
    trimmed: bool,
    cleared_pixels: usize,
    input_bytes: usize,
    output_bytes: usize,
}

/// Facts gathered from intermediate stages while advancing.
#[derive(Default)]
struct Observed {
    trimmed: bool,
    cleared_pixels: usize,
}

impl Observed {
    fn record(&mut self, stage: &Stage) {
        match stage {
            Stage::Trimmed(s) => self.trimmed = s.was_trimmed(),
            Stage::Cleaned(s) => self.cleared_pixels = s.cleared_pixels(),
            _ => {}
        }
    }
}

/// Advance stage by stage, logging how long each one took.
fn drive(start: Stage) -> anyhow::Result<(Stage, Observed)> {
    let mut observed = Observed::default();
    let mut stage = start;
    loop {
        let started = Instant::now();
        match stage.advance()? {
            Advance::Next(next) => {
                tracing::info!(
                    stage = next.name(),
                    step = next.index(),
                    of = STAGE_COUNT - 1,
                    elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
                    "stage finished"
                );
                observed.record(&next);
                stage = next;
            }
            Advance::Complete(done) => return Ok((done, observed)),
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let options = options_from_cli(cli)?;
    tracing::debug!(?options, "resolved options");

    let bytes = std::fs::read(&cli.input)
        .with_context(|| format!("failed to read {}", cli.input.display()))?;
    let input_bytes = bytes.len();

    let (last, observed) = drive(Pipeline::new(bytes, options).into())?;
    let name = last.name();
    let Stage::Encoded(encoded) = last else {
        anyhow::bail!("pipeline stopped at the {name} stage");
    };

    let original = encoded.original_dimensions();
    let output = encoded.into_output();

    std::fs::write(&cli.output, &output.data)
        .with_context(|| format!("failed to write {}", cli.output.display()))?;

    if cli.json {
        let summary = Summary {
            input: &cli.input,
            output: &cli.output,
            format: output.format,
            mime_type: output.mime_type(),
            original,
            dimensions: output.dimensions,
            trimmed: observed.trimmed,
            cleared_pixels: observed.cleared_pixels,
            input_bytes,
            output_bytes: output.size(),
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "{} ({original}) -> {} ({}, {}, {} bytes)",
            cli.input.display(),
            cli.output.display(),
            output.dimensions,
            output.format,
            output.size(),
        );
    }

    Ok(())
}

/// Log to stderr. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
    {
        eprintln!("Warning: logging unavailable: {e}");
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
