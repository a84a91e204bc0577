//! Formatted terminal output for export and check runs.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized (and covered by snapshot-style tests)

use std::path::Path;

use crate::app::pipeline::{RegionRun, RunOutput};
use crate::domain::{ExportConfig, Region, RegionConfig};
use crate::fit::ValidationReport;
use crate::report::worst_samples;

/// Format the export summary (output path, per-region degrees and errors).
pub fn format_run_summary(run: &RunOutput, config: &ExportConfig, verbose: bool) -> String {
    let mut out = String::new();

    out.push_str(&format!("Coefficients exported to: {}\n", config.output.display()));
    if let Some(path) = &config.export_errors {
        out.push_str(&format!("Sample errors exported to: {}\n", path.display()));
    }

    out.push_str("\nStatistics:\n");
    for (region_run, region_config) in [(&run.central, &config.central), (&run.tail, &config.tail)] {
        out.push_str(&format_region(region_run, region_config, verbose));
    }

    out
}

fn format_region(run: &RegionRun, config: &RegionConfig, verbose: bool) -> String {
    let mut out = String::new();
    let fit = &run.fit;
    let (num, den) = match fit.region {
        Region::Central => ("m", "n"),
        Region::Tail => ("p", "q"),
    };

    out.push_str(&format!(
        "  {} region: {num}={}, {den}={} ({} samples)\n",
        capitalize(fit.region.display_name()),
        fit.approximation.numerator_degree(),
        fit.approximation.denominator_degree(),
        fit.num_samples,
    ));
    out.push_str(&format!("    - Max error: {:.6e}\n", fit.max_error));
    out.push_str(&format!("    - Mean error: {:.6e}\n", fit.mean_error));
    if let Some(worst) = worst_samples(&run.errors, 1).first() {
        out.push_str(&format!("    - Worst sample: x={:e}\n", worst.x));
    }

    if verbose {
        out.push_str(&format!(
            "    - Solver: {} (ridge={:e})\n",
            config.solver.display_name(),
            config.ridge
        ));
        out.push_str(&format!("    - Numerator  : {}\n", fmt_vec(fit.approximation.numerator())));
        out.push_str(&format!("    - Denominator: {}\n", fmt_vec(fit.approximation.denominator())));
    }

    out
}

/// Format the result of `check`.
pub fn format_validation(report: &ValidationReport, path: &Path) -> String {
    let mut out = String::new();
    let o = &report.options;

    out.push_str(&format!("Validation of {}\n", path.display()));
    out.push_str(&format!(
        "Holdout: {} uniform + {} log-uniform tail draws (seed={})\n\n",
        o.holdout_samples, o.holdout_samples, o.seed
    ));

    out.push_str(&format!(
        "{:<8} {:>8} {:>14} {:>14} {:>14}\n",
        "region", "n", "max_error", "mean_error", "worst_x"
    ));
    out.push_str(&format!("{:-<8} {:-<8} {:-<14} {:-<14} {:-<14}\n", "", "", "", "", ""));
    for s in [&report.central, &report.tail] {
        out.push_str(&format!(
            "{:<8} {:>8} {:>14.6e} {:>14.6e} {:>14.6e}\n",
            s.region.display_name(),
            s.count,
            s.max_error,
            s.mean_error,
            s.worst_x
        ));
    }
    out.push('\n');

    out.push_str(&format!("Symmetry error: {:.6e}\n", report.symmetry_error));
    out.push_str(&format!(
        "Monotonic violations: {} ({} grid points per region)\n",
        report.monotonic_violations, o.grid_points
    ));
    out.push_str(&format!(
        "Boundary gap: {:.6e} (tolerance {:e})\n",
        report.boundary_gap, o.continuity_tolerance
    ));
    out.push_str(&format!(
        "Result: {}\n",
        if report.passed() { "PASS" } else { "FAIL" }
    ));

    out
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn fmt_vec(v: &[f64]) -> String {
    let parts: Vec<String> = v.iter().map(|x| format!("{x:.17e}")).collect();
    format!("[{}]", parts.join(", "))
}
