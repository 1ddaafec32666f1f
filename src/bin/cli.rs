// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Polyframe Overlay CLI

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use polyframe_overlay::cli::{BatchRunner, Reporter};
use polyframe_overlay::config::{OverlayConfig, PrecisionPolicy};
use polyframe_overlay::geometry::{Geometry, PrecisionModel};
use polyframe_overlay::io::{parse_wkt, read_wkt_file, to_wkt};
use polyframe_overlay::overlay::{overlay_with, reduce_precision, OverlayOp};
use polyframe_overlay::union::{coverage_union, unary_union};
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "polyframe-overlay")]
#[command(about = "Polyframe Overlay - robust 2-D boolean overlay engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Fixed precision scale (grid of 1/scale)
    #[arg(long, global = true)]
    scale: Option<f64>,

    /// Use full floating precision
    #[arg(long, global = true, conflicts_with = "scale")]
    floating: bool,

    /// Strict mode: homogeneous result dimension
    #[arg(long, global = true)]
    strict: bool,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "wkt")]
    format: OutputFormat,

    /// Configuration file (defaults to overlay.toml if present)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Wkt,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Overlay two geometries
    Overlay {
        /// intersection, union, difference or symdifference
        op: OverlayOp,

        /// Operand A as WKT, or @file
        a: String,

        /// Operand B as WKT, or @file
        b: String,
    },

    /// Union all components of one geometry
    Union {
        /// Geometry as WKT, or @file
        geom: String,
    },

    /// Union an edge-matched polygonal or linear coverage
    CoverageUnion {
        /// Geometry as WKT, or @file
        geom: String,
    },

    /// Round a geometry to the --scale grid and repair its topology
    Reduce {
        /// Geometry as WKT, or @file
        geom: String,
    },

    /// Run TOML case files
    Batch {
        /// Case files or directories
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Write a JSON report to the configured output directory
        #[arg(long)]
        report: bool,
    },

    /// Show version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(&cli)?;

    match &cli.command {
        Commands::Overlay { op, a, b } => {
            let a = read_geometry(a)?;
            let b = read_geometry(b)?;
            let options = config.to_options()?;
            let start = Instant::now();
            let result = overlay_with(&a, &b, *op, options)?;
            emit(&cli, op.name(), &result, start)?;
        }
        Commands::Union { geom } => {
            let geom = read_geometry(geom)?;
            let start = Instant::now();
            let result = unary_union(&geom, config.precision_model()?)?;
            emit(&cli, "unary union", &result, start)?;
        }
        Commands::CoverageUnion { geom } => {
            let geom = read_geometry(geom)?;
            let start = Instant::now();
            let result = coverage_union(&geom)?;
            emit(&cli, "coverage union", &result, start)?;
        }
        Commands::Reduce { geom } => {
            let Some(scale) = cli.scale else {
                bail!("reduce requires --scale");
            };
            let geom = read_geometry(geom)?;
            let start = Instant::now();
            let result = reduce_precision(&geom, PrecisionModel::fixed(scale)?)?;
            emit(&cli, "reduce precision", &result, start)?;
        }
        Commands::Batch { inputs, report } => {
            batch_command(&config, inputs, *report, cli.verbose)?;
        }
        Commands::Version => {
            println!("Polyframe Overlay v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<OverlayConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let mut config = OverlayConfig::from_file(path)?;
            config.apply_overrides(|key| std::env::var(key).ok())?;
            config
        }
        None => OverlayConfig::load()?,
    };

    if let Some(scale) = cli.scale {
        config.precision = PrecisionPolicy::Fixed;
        config.scale = Some(scale);
    }
    if cli.floating {
        config.precision = PrecisionPolicy::Floating;
    }
    if cli.strict {
        config.strict_mode = true;
    }
    Ok(config)
}

/// WKT literal, or `@path` to a file holding one
fn read_geometry(arg: &str) -> Result<Geometry> {
    match arg.strip_prefix('@') {
        Some(path) => read_wkt_file(path),
        None => parse_wkt(arg),
    }
}

fn emit(cli: &Cli, label: &str, result: &Geometry, start: Instant) -> Result<()> {
    let duration = start.elapsed();
    match cli.format {
        OutputFormat::Wkt => println!("{}", to_wkt(result)),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(result).context("Failed to serialize result")?;
            println!("{}", json);
        }
    }
    if cli.verbose {
        Reporter::report_result(label, result, duration);
    }
    Ok(())
}

fn batch_command(config: &OverlayConfig, inputs: &[PathBuf], report: bool, verbose: bool) -> Result<()> {
    let files = BatchRunner::discover(inputs)?;
    if files.is_empty() {
        Reporter::report_warning("No case files found");
        return Ok(());
    }
    let cases = BatchRunner::load_cases(&files)?;

    let runner = BatchRunner::new(config.clone()).with_progress(verbose);
    let batch = runner.run(&cases)?;
    Reporter::report_summary(&batch);

    if report {
        let path = batch.write_json(&config.output_dir)?;
        Reporter::success(&format!("Report written to {}", path.display()));
    }

    if !batch.all_passed() {
        Reporter::report_error(&format!("{} of {} cases failed", batch.failed, batch.total));
        std::process::exit(1);
    }

    Ok(())
}
