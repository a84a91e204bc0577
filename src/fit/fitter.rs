//! Region fitting: design-matrix assembly, weighted solve, error evaluation.
//!
//! Given:
//! - a weighted sample set for one region
//! - numerator/denominator degrees `m`, `n`
//!
//! we build the linearized system `A θ ≈ z` (one row per sample, `m + 1 + n` columns),
//! solve it with row weights and a ridge term, split `θ` into `P` and `Q` (prepending
//! the anchor `Q[0] = 1`), and measure the absolute error on the same samples.

use nalgebra::{DMatrix, DVector};
use tracing::{debug, info};

use crate::domain::{FitResult, RationalApproximation, Region, RegionConfig, WeightedSampleSet};
use crate::error::{FitError, SolveError};
use crate::fit::evaluate::evaluate_errors;
use crate::fit::samples::generate_samples;
use crate::math::solve_weighted_ridge;
use crate::models::fill_design_row;

/// Build the linearized design matrix `A` and right-hand side `b`.
///
/// Rows follow the sample order; columns are `m + 1` numerator terms followed by `n`
/// denominator terms (`k = 1..=n`). `b` is the exact target `z` of each sample.
pub fn build_system(
    samples: &WeightedSampleSet,
    numerator_degree: usize,
    denominator_degree: usize,
) -> (DMatrix<f64>, DVector<f64>) {
    let n_rows = samples.len();
    let n_cols = numerator_degree + 1 + denominator_degree;

    let mut a = DMatrix::<f64>::zeros(n_rows, n_cols);
    let mut b = DVector::<f64>::zeros(n_rows);
    let mut row = vec![0.0; n_cols];

    for (i, p) in samples.points.iter().enumerate() {
        fill_design_row(
            samples.region,
            p.abscissa,
            p.z,
            numerator_degree,
            denominator_degree,
            &mut row,
        );
        for (j, &v) in row.iter().enumerate() {
            a[(i, j)] = v;
        }
        b[i] = p.z;
    }

    (a, b)
}

/// Generate the region's samples and fit them.
pub fn fit_region(region: Region, config: &RegionConfig) -> Result<FitResult, FitError> {
    let samples = generate_samples(region, config)?;
    fit_samples(&samples, config)
}

/// Central fit with the given configuration.
pub fn fit_central(config: &RegionConfig) -> Result<FitResult, FitError> {
    fit_region(Region::Central, config)
}

/// Tail fit with the given configuration.
pub fn fit_tail(config: &RegionConfig) -> Result<FitResult, FitError> {
    fit_region(Region::Tail, config)
}

/// Fit a rational approximation to an existing sample set.
pub fn fit_samples(samples: &WeightedSampleSet, config: &RegionConfig) -> Result<FitResult, FitError> {
    config.validate()?;
    let region = samples.region;

    let required = config.num_vars();
    if samples.len() < required {
        return Err(FitError::InsufficientSamples {
            region,
            available: samples.len(),
            required,
        });
    }
    if samples.weights.len() != samples.len() {
        return Err(FitError::InvalidConfig(format!(
            "{region} region: {} weights for {} samples",
            samples.weights.len(),
            samples.len()
        )));
    }
    if let Some((p, w)) = samples.iter().find(|(_, w)| !(w.is_finite() && *w > 0.0)) {
        return Err(FitError::InvalidConfig(format!(
            "{region} region: sample weights must be finite and > 0, got {w} at x={:e}",
            p.x
        )));
    }

    let m = config.numerator_degree;
    let n = config.denominator_degree;
    debug!(
        %region,
        rows = samples.len(),
        cols = required,
        ridge = config.ridge,
        solver = config.solver.display_name(),
        "solving linearized system"
    );

    let (a, b) = build_system(samples, m, n);
    let theta = solve_weighted_ridge(&a, &b, &samples.weights, config.ridge, config.solver)
        .map_err(|source| FitError::SingularSystem { region, source })?;

    let numerator: Vec<f64> = theta.rows(0, m + 1).iter().copied().collect();
    let mut denominator = Vec::with_capacity(n + 1);
    denominator.push(1.0);
    denominator.extend(theta.rows(m + 1, n).iter().copied());

    // The solver only returns finite coefficients, so this cannot trip in practice.
    let approximation = RationalApproximation::new(numerator, denominator).map_err(|_| FitError::SingularSystem {
        region,
        source: SolveError::NonFinite,
    })?;

    let stats = evaluate_errors(&approximation, samples)?;
    info!(
        %region,
        numerator_degree = m,
        denominator_degree = n,
        samples = stats.count,
        max_error = stats.max_error,
        mean_error = stats.mean_error,
        "region fitted"
    );

    Ok(FitResult {
        region,
        approximation,
        max_error: stats.max_error,
        mean_error: stats.mean_error,
        num_samples: stats.count,
    })
}
