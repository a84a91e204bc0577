//! Absolute error of a fitted approximation against the exact quantile.

use rayon::prelude::*;

use crate::domain::{RationalApproximation, WeightedSampleSet};
use crate::error::FitError;

/// Per-sample comparison of the approximation with its target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleError {
    pub x: f64,
    pub abscissa: f64,
    pub weight: f64,
    pub z_exact: f64,
    pub z_fit: f64,
    pub abs_error: f64,
}

/// Max/mean absolute error over a sample set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorStats {
    pub max_error: f64,
    pub mean_error: f64,
    pub count: usize,
}

/// Evaluate the approximation at every sample.
///
/// A non-finite value (e.g. a root of `Q` inside the region) is an error, never a NaN
/// statistic.
pub fn sample_errors(
    approximation: &RationalApproximation,
    samples: &WeightedSampleSet,
) -> Result<Vec<SampleError>, FitError> {
    let region = samples.region;
    samples
        .points
        .par_iter()
        .zip(samples.weights.par_iter())
        .map(|(p, &weight)| {
            let z_fit = approximation.evaluate(region, p.abscissa);
            if !z_fit.is_finite() {
                return Err(FitError::NonFinite {
                    region,
                    probability: p.x,
                });
            }
            Ok(SampleError {
                x: p.x,
                abscissa: p.abscissa,
                weight,
                z_exact: p.z,
                z_fit,
                abs_error: (p.z - z_fit).abs(),
            })
        })
        .collect()
}

/// Reduce per-sample errors to max/mean. Returns `None` for an empty slice.
pub fn summarize(errors: &[SampleError]) -> Option<ErrorStats> {
    if errors.is_empty() {
        return None;
    }
    let max_error = errors.iter().map(|e| e.abs_error).fold(0.0, f64::max);
    let mean_error = errors.iter().map(|e| e.abs_error).sum::<f64>() / errors.len() as f64;
    Some(ErrorStats {
        max_error,
        mean_error,
        count: errors.len(),
    })
}

/// Max/mean absolute error of `approximation` over `samples`.
pub fn evaluate_errors(
    approximation: &RationalApproximation,
    samples: &WeightedSampleSet,
) -> Result<ErrorStats, FitError> {
    let errors = sample_errors(approximation, samples)?;
    summarize(&errors).ok_or(FitError::InsufficientSamples {
        region: samples.region,
        available: 0,
        required: 1,
    })
}
