//! Reporting utilities: per-sample errors and formatted terminal output.

use crate::domain::{FitResult, WeightedSampleSet};
use crate::error::{AppError, EXIT_NUMERIC};
use crate::fit::{SampleError, sample_errors};

pub mod format;

pub use format::*;

/// Evaluate `fit` on every training sample.
pub fn compute_sample_errors(fit: &FitResult, samples: &WeightedSampleSet) -> Result<Vec<SampleError>, AppError> {
    if fit.region != samples.region {
        return Err(AppError::new(
            EXIT_NUMERIC,
            format!("{} fit evaluated on {} samples", fit.region, samples.region),
        ));
    }
    Ok(sample_errors(&fit.approximation, samples)?)
}

/// The `top_n` samples with the largest absolute error, largest first.
pub fn worst_samples(errors: &[SampleError], top_n: usize) -> Vec<SampleError> {
    let mut sorted = errors.to_vec();
    sorted.sort_by(|a, b| b.abs_error.total_cmp(&a.abs_error));
    sorted.truncate(top_n);
    sorted
}
