//! Rational model evaluation for both regions.
//!
//! The fitter relies on two primitive operations:
//! - build a linearized design row for a given sample (for the least-squares solve)
//! - evaluate `scale · P(r) / Q(r)` given coefficients (for errors, plots and validation)
//!
//! Linearization: multiplying `scale · P(r) / Q(r) = z` through by `Q` and moving the
//! `z`-dependent terms left gives
//!
//! ```text
//! Σ_j a_j · scale·r^j  −  Σ_{k≥1} b_k · z·r^k  =  z · b_0  =  z
//! ```
//!
//! which is linear in every unknown because `b_0` is pinned to 1.

use crate::domain::Region;

/// Fill a design row for one sample.
///
/// Layout: `m + 1` numerator columns `scale·r^j`, then `n` denominator columns `−z·r^k`
/// for `k = 1..=n`. The right-hand side for the row is `z`.
///
/// # Panics
/// Panics if `out.len() != m + 1 + n`. Callers size the row from the region config.
pub fn fill_design_row(
    region: Region,
    abscissa: f64,
    z: f64,
    numerator_degree: usize,
    denominator_degree: usize,
    out: &mut [f64],
) {
    assert_eq!(out.len(), numerator_degree + 1 + denominator_degree);

    let r = region.poly_arg(abscissa);
    let scale = region.scale(abscissa);

    let mut power = 1.0;
    for j in 0..=numerator_degree.max(denominator_degree) {
        if j <= numerator_degree {
            out[j] = scale * power;
        }
        if j >= 1 && j <= denominator_degree {
            out[numerator_degree + j] = -z * power;
        }
        power *= r;
    }
}

/// Evaluate `scale · P(r) / Q(r)` at a region abscissa.
pub fn evaluate_rational(region: Region, abscissa: f64, numerator: &[f64], denominator: &[f64]) -> f64 {
    let r = region.poly_arg(abscissa);
    region.scale(abscissa) * horner(numerator, r) / horner(denominator, r)
}

/// Evaluate a polynomial with ascending coefficients.
pub fn horner(coeffs: &[f64], r: f64) -> f64 {
    coeffs.iter().rev().fold(0.0, |acc, &c| acc * r + c)
}
