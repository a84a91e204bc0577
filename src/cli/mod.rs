//! Command-line parsing for the inverse-normal coefficient exporter.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the fitting/math code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{DEFAULT_RIDGE, Region, SolveMethod};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "probit-fit",
    version,
    about = "Derive rational-approximation coefficients for the inverse normal CDF"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Verbose output (debug logging, coefficient listings).
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit both regions and write the coefficient JSON.
    Export(ExportArgs),
    /// Validate a coefficient JSON on holdout data.
    Check(CheckArgs),
    /// Plot the signed error of a coefficient JSON.
    Plot(PlotArgs),
}

/// Options for fitting and exporting.
#[derive(Debug, Args, Clone)]
pub struct ExportArgs {
    /// Output JSON path.
    #[arg(value_name = "OUTPUT", default_value = "coefficients.json")]
    pub output: PathBuf,

    /// Central numerator degree.
    #[arg(long, default_value_t = 6)]
    pub central_m: usize,

    /// Central denominator degree.
    #[arg(long, default_value_t = 6)]
    pub central_n: usize,

    /// Tail numerator degree.
    #[arg(long, default_value_t = 8)]
    pub tail_p: usize,

    /// Tail denominator degree.
    #[arg(long, default_value_t = 8)]
    pub tail_q: usize,

    /// Uniform sweep size over (0, 1) for the central region.
    #[arg(long, default_value_t = 800)]
    pub central_samples: usize,

    /// Points in each of the two dense brackets around the central boundaries.
    #[arg(long, default_value_t = 50)]
    pub central_boundary_samples: usize,

    /// Log-spaced tail points in [1e-16, x_low / 10].
    #[arg(long, default_value_t = 100)]
    pub tail_log_samples: usize,

    /// Linearly spaced tail points in [0.002, x_low].
    #[arg(long, default_value_t = 100)]
    pub tail_linear_samples: usize,

    /// Ridge constant added to the normal-matrix diagonal.
    #[arg(long, default_value_t = DEFAULT_RIDGE)]
    pub ridge: f64,

    /// Least-squares solver.
    #[arg(long, value_enum, default_value_t = SolveMethod::Qr)]
    pub solver: SolveMethod,

    /// Fit the regions one after the other instead of concurrently.
    #[arg(long)]
    pub sequential: bool,

    /// Export per-sample training errors to CSV.
    #[arg(long = "export-errors", value_name = "CSV")]
    pub export_errors: Option<PathBuf>,

    /// Render an ASCII error profile per region.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

/// Options for validating a saved coefficient file.
#[derive(Debug, Args, Clone)]
pub struct CheckArgs {
    /// Coefficient JSON file produced by `probit-fit export`.
    #[arg(value_name = "JSON")]
    pub coefficients: PathBuf,

    /// Uniform holdout draws (the same number of log-uniform tail draws is added).
    #[arg(long, default_value_t = 10_000)]
    pub holdout: usize,

    /// Seed for the holdout draws.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Grid points per region for the monotonicity scan.
    #[arg(long, default_value_t = 20_001)]
    pub grid_points: usize,

    /// Largest accepted jump between the regions at x_low.
    #[arg(long, default_value_t = 1e-4)]
    pub continuity_tolerance: f64,

    /// Largest accepted holdout error per region.
    #[arg(long, default_value_t = 1e-3)]
    pub max_error_tolerance: f64,
}

/// Options for plotting a saved coefficient file.
#[derive(Debug, Args, Clone)]
pub struct PlotArgs {
    /// Coefficient JSON file produced by `probit-fit export`.
    #[arg(value_name = "JSON")]
    pub coefficients: PathBuf,

    /// Plot a single region (default: both).
    #[arg(long, value_enum)]
    pub region: Option<Region>,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}
