//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and sets up logging
//! - runs the export pipeline (sample generation, region fits, errors)
//! - prints summaries/plots
//! - writes the coefficient JSON and optional exports
//! - validates or plots previously written coefficient files

use clap::Parser;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use crate::cli::{CheckArgs, Command, ExportArgs, PlotArgs};
use crate::domain::{ExportConfig, Region, RegionConfig};
use crate::error::{AppError, EXIT_NUMERIC, EXIT_VALIDATION};
use crate::fit::{ValidationOptions, validate_export};

pub mod pipeline;

/// Entry point for the `probit-fit` binary.
pub fn run() -> Result<(), AppError> {
    // `probit-fit` and `probit-fit out.json --ridge 0` behave like `probit-fit export ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);
    setup_logging(cli.verbose);

    match cli.command {
        Command::Export(args) => handle_export(args, cli.verbose),
        Command::Check(args) => handle_check(args),
        Command::Plot(args) => handle_plot(args),
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();
    // A subscriber may already be installed (e.g. by an embedding process).
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn handle_export(args: ExportArgs, verbose: bool) -> Result<(), AppError> {
    let config = export_config_from_args(&args);
    let run = pipeline::run_export(&config)?;

    crate::io::write_coefficients_json(&config.output, &run.export)?;
    info!(path = %config.output.display(), "coefficients written");

    if let Some(path) = &config.export_errors {
        crate::io::write_errors_csv(
            path,
            &[
                (Region::Central, run.central.errors.as_slice()),
                (Region::Tail, run.tail.errors.as_slice()),
            ],
        )?;
    }

    println!("{}", crate::report::format_run_summary(&run, &config, verbose));

    if config.plot {
        for region_run in run.regions() {
            let plot = crate::plot::render_error_plot(
                &region_run.fit,
                Some(region_run.errors.as_slice()),
                config.plot_width,
                config.plot_height,
            )?;
            println!("{plot}");
        }
    }

    Ok(())
}

fn handle_check(args: CheckArgs) -> Result<(), AppError> {
    let export = crate::io::read_coefficients_json(&args.coefficients)?;
    let options = ValidationOptions {
        holdout_samples: args.holdout,
        seed: args.seed,
        grid_points: args.grid_points,
        continuity_tolerance: args.continuity_tolerance,
        max_error_tolerance: args.max_error_tolerance,
    };
    let report = validate_export(&export, &options)?;

    println!("{}", crate::report::format_validation(&report, &args.coefficients));

    if report.passed() {
        Ok(())
    } else {
        Err(AppError::new(
            EXIT_VALIDATION,
            format!("Validation failed for '{}'", args.coefficients.display()),
        ))
    }
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let export = crate::io::read_coefficients_json(&args.coefficients)?;
    let regions = match args.region {
        Some(region) => vec![region],
        None => Region::ALL.to_vec(),
    };

    for region in regions {
        let fit = match region {
            Region::Central => export.central_fit(),
            Region::Tail => export.tail_fit(),
        }
        .map_err(|e| AppError::new(EXIT_NUMERIC, e.to_string()))?;
        let plot = crate::plot::render_error_plot(&fit, None, args.width, args.height)?;
        println!("{plot}");
    }
    Ok(())
}

pub fn export_config_from_args(args: &ExportArgs) -> ExportConfig {
    ExportConfig {
        central: RegionConfig {
            numerator_degree: args.central_m,
            denominator_degree: args.central_n,
            primary_samples: args.central_samples,
            boundary_samples: args.central_boundary_samples,
            ridge: args.ridge,
            solver: args.solver,
        },
        tail: RegionConfig {
            numerator_degree: args.tail_p,
            denominator_degree: args.tail_q,
            primary_samples: args.tail_log_samples,
            boundary_samples: args.tail_linear_samples,
            ridge: args.ridge,
            solver: args.solver,
        },
        output: args.output.clone(),
        export_errors: args.export_errors.clone(),
        sequential: args.sequential,
        plot: args.plot,
        plot_width: args.width,
        plot_height: args.height,
    }
}

/// Rewrite argv so `probit-fit` defaults to `probit-fit export`.
///
/// Rules:
/// - `probit-fit`                      -> `probit-fit export`
/// - `probit-fit out.json ...`         -> `probit-fit export out.json ...`
/// - `probit-fit --ridge 0 ...`        -> `probit-fit export --ridge 0 ...`
/// - `probit-fit --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("export".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "export" | "check" | "plot");
    if is_subcommand {
        return argv;
    }

    // Anything else (a flag or an output path) is an export argument.
    argv.insert(1, "export".to_string());
    argv
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use crate::domain::SolveMethod;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_exports() {
        assert_eq!(rewrite_args(argv(&["probit-fit"])), argv(&["probit-fit", "export"]));
    }

    #[test]
    fn path_or_flag_first_exports() {
        assert_eq!(
            rewrite_args(argv(&["probit-fit", "out.json"])),
            argv(&["probit-fit", "export", "out.json"])
        );
        assert_eq!(
            rewrite_args(argv(&["probit-fit", "--solver", "qr"])),
            argv(&["probit-fit", "export", "--solver", "qr"])
        );
        assert_eq!(
            rewrite_args(argv(&["probit-fit", "-v"])),
            argv(&["probit-fit", "export", "-v"])
        );
    }

    #[test]
    fn subcommands_and_help_are_untouched() {
        for args in [
            &["probit-fit", "check", "c.json"][..],
            &["probit-fit", "plot", "c.json"][..],
            &["probit-fit", "--help"][..],
            &["probit-fit", "-V"][..],
        ] {
            assert_eq!(rewrite_args(argv(args)), argv(args));
        }
    }

    #[test]
    fn flags_map_onto_region_configs() {
        let cli = Cli::parse_from(rewrite_args(argv(&[
            "probit-fit",
            "out.json",
            "--central-m",
            "5",
            "--tail-q",
            "7",
            "--tail-linear-samples",
            "0",
            "--ridge",
            "0",
            "--solver",
            "normal",
            "--sequential",
        ])));
        let Command::Export(args) = cli.command else {
            panic!("expected export");
        };
        let config = export_config_from_args(&args);
        assert_eq!(config.output.to_str(), Some("out.json"));
        assert_eq!(config.central.numerator_degree, 5);
        assert_eq!(config.central.denominator_degree, 6);
        assert_eq!(config.tail.denominator_degree, 7);
        assert_eq!(config.tail.boundary_samples, 0);
        assert_eq!(config.tail.primary_samples, 100);
        assert_eq!(config.central.ridge, 0.0);
        assert_eq!(config.tail.solver, SolveMethod::Normal);
        assert_eq!(config.central.solver, SolveMethod::Normal);
        assert!(config.sequential);
    }

    #[test]
    fn default_flags_match_default_config() {
        let cli = Cli::parse_from(rewrite_args(argv(&["probit-fit"])));
        let Command::Export(args) = cli.command else {
            panic!("expected export");
        };
        let config = export_config_from_args(&args);
        let defaults = ExportConfig::default();
        assert_eq!(config.central, defaults.central);
        assert_eq!(config.tail, defaults.tail);
        assert_eq!(config.output, defaults.output);
        assert_eq!((config.plot_width, config.plot_height), (80, 20));
    }
}
