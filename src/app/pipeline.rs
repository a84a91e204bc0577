//! Shared "export pipeline" logic.
//!
//! Keeping this in one place keeps the command handlers focused on presentation:
//! sample generation -> region fits -> per-sample errors -> coefficient record
//!
//! The two regions are independent, so by default they are fitted concurrently.

use chrono::{DateTime, FixedOffset, Local};
use tracing::info;

use crate::domain::{CoefficientExport, ExportConfig, FitResult, Region, RegionConfig, WeightedSampleSet};
use crate::error::AppError;
use crate::fit::{SampleError, fit_samples, generate_samples};

/// Everything computed for one region.
#[derive(Debug, Clone)]
pub struct RegionRun {
    pub fit: FitResult,
    pub samples: WeightedSampleSet,
    pub errors: Vec<SampleError>,
}

/// All computed outputs of a single export run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub central: RegionRun,
    pub tail: RegionRun,
    pub export: CoefficientExport,
}

impl RunOutput {
    pub fn regions(&self) -> [&RegionRun; 2] {
        [&self.central, &self.tail]
    }
}

/// Fit both regions and assemble the coefficient record, stamped with the local time.
pub fn run_export(config: &ExportConfig) -> Result<RunOutput, AppError> {
    run_export_at(config, Local::now().fixed_offset())
}

/// Like `run_export`, with an explicit `generated_at` timestamp.
pub fn run_export_at(config: &ExportConfig, generated_at: DateTime<FixedOffset>) -> Result<RunOutput, AppError> {
    info!("Deriving coefficients...");

    let (central, tail) = if config.sequential {
        (
            run_region(Region::Central, &config.central),
            run_region(Region::Tail, &config.tail),
        )
    } else {
        rayon::join(
            || run_region(Region::Central, &config.central),
            || run_region(Region::Tail, &config.tail),
        )
    };
    // Central failures are reported first when both regions fail.
    let central = central?;
    let tail = tail?;

    let export = CoefficientExport::from_fits(&central.fit, &tail.fit, generated_at)?;

    Ok(RunOutput { central, tail, export })
}

fn run_region(region: Region, config: &RegionConfig) -> Result<RegionRun, AppError> {
    let samples = generate_samples(region, config)?;
    let fit = fit_samples(&samples, config)?;
    let errors = crate::report::compute_sample_errors(&fit, &samples)?;
    Ok(RegionRun { fit, samples, errors })
}
