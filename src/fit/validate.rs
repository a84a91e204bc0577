//! Checks on an exported coefficient record.
//!
//! The record is rebuilt into the piecewise quantile
//!
//! - `x < x_low`  → tail(x)
//! - `x > x_high` → −tail(1 − x)
//! - otherwise    → central(x)
//!
//! and compared with the exact quantile on seeded holdout draws that were never used for
//! fitting. On top of the holdout errors we measure symmetry, monotonicity on a dense
//! grid and the size of the jump at the lower boundary.

use rand::prelude::*;
use rand::rngs::StdRng;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::domain::{CoefficientExport, FitResult, Region};
use crate::error::{CoefficientError, FitError};
use crate::fit::grid::{linspace, log_space};
use crate::math::standard_normal_quantile;

/// Uniform holdout draws stay inside this interval.
const HOLDOUT_RANGE: (f64, f64) = (1e-10, 1.0 - 1e-10);
/// Lower end of the log-uniform tail draws.
const HOLDOUT_TAIL_MIN: f64 = 1e-16;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidationOptions {
    /// Uniform draws on `HOLDOUT_RANGE`; the same number of log-uniform tail draws is added.
    pub holdout_samples: usize,
    pub seed: u64,
    /// Points per region on the monotonicity grid.
    pub grid_points: usize,
    /// Largest accepted `|central(x_low) - tail(x_low)|`.
    pub continuity_tolerance: f64,
    /// Largest accepted holdout error in either region.
    pub max_error_tolerance: f64,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            holdout_samples: 10_000,
            seed: 42,
            grid_points: 20_001,
            continuity_tolerance: 1e-4,
            max_error_tolerance: 1e-3,
        }
    }
}

/// Holdout error of one region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoldoutStats {
    pub region: Region,
    pub max_error: f64,
    /// Probability where `max_error` was reached.
    pub worst_x: f64,
    pub mean_error: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport {
    pub central: HoldoutStats,
    pub tail: HoldoutStats,
    /// `max |q(x) + q(1 - x)|` over the holdout draws.
    pub symmetry_error: f64,
    pub monotonic_violations: usize,
    pub boundary_gap: f64,
    pub options: ValidationOptions,
}

impl ValidationReport {
    pub fn monotone(&self) -> bool {
        self.monotonic_violations == 0
    }

    pub fn continuous(&self) -> bool {
        self.boundary_gap <= self.options.continuity_tolerance
    }

    pub fn accurate(&self) -> bool {
        self.central.max_error <= self.options.max_error_tolerance
            && self.tail.max_error <= self.options.max_error_tolerance
    }

    pub fn passed(&self) -> bool {
        self.monotone() && self.continuous() && self.accurate()
    }
}

/// Piecewise approximation rebuilt from a coefficient record.
#[derive(Debug, Clone)]
pub struct PiecewiseQuantile {
    central: FitResult,
    tail: FitResult,
    x_low: f64,
    x_high: f64,
}

impl PiecewiseQuantile {
    pub fn from_export(export: &CoefficientExport) -> Result<Self, CoefficientError> {
        export.validate()?;
        Ok(Self {
            central: export.central_fit()?,
            tail: export.tail_fit()?,
            x_low: export.parameters.x_low,
            x_high: export.parameters.x_high,
        })
    }

    /// Which fit serves `x` (the upper tail is served by the mirrored lower tail).
    pub fn region_of(&self, x: f64) -> Region {
        if x < self.x_low || x > self.x_high {
            Region::Tail
        } else {
            Region::Central
        }
    }

    pub fn central_value(&self, x: f64) -> f64 {
        self.central.approximation.quantile(Region::Central, x)
    }

    pub fn tail_value(&self, x: f64) -> f64 {
        self.tail.approximation.quantile(Region::Tail, x)
    }

    pub fn quantile(&self, x: f64) -> f64 {
        if x < self.x_low {
            self.tail_value(x)
        } else if x > self.x_high {
            -self.tail_value(1.0 - x)
        } else {
            self.central_value(x)
        }
    }

    /// `|central(x_low) - tail(x_low)|`.
    pub fn boundary_gap(&self) -> f64 {
        (self.central_value(self.x_low) - self.tail_value(self.x_low)).abs()
    }
}

/// Run every check against `export`.
pub fn validate_export(export: &CoefficientExport, options: &ValidationOptions) -> Result<ValidationReport, FitError> {
    if options.holdout_samples == 0 {
        return Err(FitError::InvalidConfig("holdout sample count must be > 0".to_string()));
    }
    let q = PiecewiseQuantile::from_export(export).map_err(|e| FitError::InvalidConfig(e.to_string()))?;

    let draws = holdout_draws(options.holdout_samples, options.seed, q.x_low);
    let evaluated = draws
        .par_iter()
        .map(|&x| {
            let exact = standard_normal_quantile(x)?;
            let approx = q.quantile(x);
            // Reflect through the upper half so that `1 - hi` is exact.
            let hi = if x >= 0.5 { x } else { 1.0 - x };
            let symmetry = (q.quantile(hi) + q.quantile(1.0 - hi)).abs();
            if !(approx.is_finite() && symmetry.is_finite()) {
                return Err(FitError::NonFinite {
                    region: q.region_of(x),
                    probability: x,
                });
            }
            Ok((x, (approx - exact).abs(), symmetry))
        })
        .collect::<Result<Vec<_>, FitError>>()?;

    let central = holdout_stats(Region::Central, &q, &evaluated);
    let tail = holdout_stats(Region::Tail, &q, &evaluated);
    let symmetry_error = evaluated.iter().map(|e| e.2).fold(0.0, f64::max);

    let central_grid = linspace(q.x_low, q.x_high, options.grid_points)?;
    let tail_grid = log_space(HOLDOUT_TAIL_MIN, q.x_low, options.grid_points)?;
    let monotonic_violations =
        count_decreases(&central_grid, |x| q.central_value(x)) + count_decreases(&tail_grid, |x| q.tail_value(x));

    let boundary_gap = q.boundary_gap();
    debug!(
        central_max = central.max_error,
        tail_max = tail.max_error,
        symmetry_error,
        monotonic_violations,
        boundary_gap,
        "validation finished"
    );

    let report = ValidationReport {
        central,
        tail,
        symmetry_error,
        monotonic_violations,
        boundary_gap,
        options: *options,
    };
    if !report.monotone() {
        warn!(monotonic_violations, "approximation is not monotone");
    }
    if !report.continuous() {
        warn!(boundary_gap, tolerance = options.continuity_tolerance, "boundary gap above tolerance");
    }
    Ok(report)
}

/// Seeded uniform draws over `HOLDOUT_RANGE`, followed by log-uniform draws on
/// `[HOLDOUT_TAIL_MIN, x_low]`.
fn holdout_draws(n: usize, seed: u64, x_low: f64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut xs = Vec::with_capacity(2 * n);
    for _ in 0..n {
        xs.push(rng.gen_range(HOLDOUT_RANGE.0..HOLDOUT_RANGE.1));
    }
    let (lo, hi) = (HOLDOUT_TAIL_MIN.log10(), x_low.log10());
    for _ in 0..n {
        xs.push(10f64.powf(rng.gen_range(lo..=hi)));
    }
    xs
}

fn holdout_stats(region: Region, q: &PiecewiseQuantile, evaluated: &[(f64, f64, f64)]) -> HoldoutStats {
    let mut stats = HoldoutStats {
        region,
        max_error: 0.0,
        worst_x: f64::NAN,
        mean_error: 0.0,
        count: 0,
    };
    let mut sum = 0.0;
    for &(x, err, _) in evaluated.iter().filter(|e| q.region_of(e.0) == region) {
        if stats.count == 0 || err > stats.max_error {
            stats.max_error = err;
            stats.worst_x = x;
        }
        sum += err;
        stats.count += 1;
    }
    if stats.count > 0 {
        stats.mean_error = sum / stats.count as f64;
    }
    stats
}

fn count_decreases(grid: &[f64], f: impl Fn(f64) -> f64) -> usize {
    let values: Vec<f64> = grid.iter().map(|&x| f(x)).collect();
    values.windows(2).filter(|w| w[1] < w[0]).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RegionConfig, X_HIGH, X_LOW};
    use crate::fit::fitter::{fit_central, fit_tail};
    use chrono::{FixedOffset, TimeZone};

    fn fitted_export() -> CoefficientExport {
        let central = fit_central(&RegionConfig::central()).unwrap();
        let tail = fit_tail(&RegionConfig::tail()).unwrap();
        let at = FixedOffset::east_opt(0).unwrap().with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        CoefficientExport::from_fits(&central, &tail, at).unwrap()
    }

    fn small() -> ValidationOptions {
        ValidationOptions {
            holdout_samples: 2_000,
            grid_points: 5_001,
            ..ValidationOptions::default()
        }
    }

    #[test]
    fn piecewise_dispatch() {
        let q = PiecewiseQuantile::from_export(&fitted_export()).unwrap();
        assert_eq!(q.region_of(0.01), Region::Tail);
        assert_eq!(q.region_of(X_LOW), Region::Central);
        assert_eq!(q.region_of(X_HIGH), Region::Central);
        assert_eq!(q.region_of(0.99), Region::Tail);
        assert_eq!(q.quantile(0.01), q.tail_value(0.01));
        assert_eq!(q.quantile(0.99), -q.tail_value(1.0 - 0.99));
        assert_eq!(q.quantile(0.5), 0.0);
    }

    #[test]
    fn fitted_export_passes() {
        let report = validate_export(&fitted_export(), &small()).unwrap();
        assert!(report.passed(), "{report:?}");
        assert_eq!(report.central.count + report.tail.count, 4_000);
        assert!(report.central.max_error < 1e-4);
        assert!(report.tail.max_error < 1e-6);
        assert!(report.symmetry_error < 1e-12);
        assert!(report.boundary_gap < 1e-4);
    }

    #[test]
    fn holdout_is_seeded() {
        let a = holdout_draws(100, 7, X_LOW);
        let b = holdout_draws(100, 7, X_LOW);
        let c = holdout_draws(100, 8, X_LOW);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a[100..].iter().all(|&x| (HOLDOUT_TAIL_MIN..=X_LOW).contains(&x)));
    }

    #[test]
    fn detuned_tail_fails_continuity_and_accuracy() {
        let mut export = fitted_export();
        for c in export.tail_region.coefficients_c.iter_mut() {
            *c *= 1.01;
        }
        let report = validate_export(&export, &small()).unwrap();
        assert!(!report.continuous());
        assert!(!report.accurate());
        assert!(!report.passed());
    }

    #[test]
    fn decreasing_approximation_is_flagged() {
        let grid = [0.1, 0.2, 0.3, 0.4];
        assert_eq!(count_decreases(&grid, |x| x), 0);
        assert_eq!(count_decreases(&grid, |x| -x), 3);
    }

    #[test]
    fn malformed_record_is_rejected() {
        let mut export = fitted_export();
        export.central_region.coefficients_b[0] = 2.0;
        assert!(matches!(
            validate_export(&export, &small()),
            Err(FitError::InvalidConfig(_))
        ));

        let mut export = fitted_export();
        export.parameters.x_low = 0.03;
        assert!(validate_export(&export, &small()).is_err());
    }
}
