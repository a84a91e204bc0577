//! Exact standard normal quantile, used as the reference for every training target.
//!
//! `Φ⁻¹(p) = -√2 · erfc⁻¹(2p)`. For `p > 0.5` we evaluate the mirrored lower-tail value
//! instead: `1 - p` is exact there, while `2p` close to 2 would lose digits inside
//! `erfc_inv`.

use std::f64::consts::SQRT_2;

use statrs::function::erf::erfc_inv;

use crate::error::FitError;

/// `Φ⁻¹(p)` for `p ∈ (0, 1)`.
///
/// Returns `InvalidDomain` for `p` outside the open interval (including NaN).
pub fn standard_normal_quantile(p: f64) -> Result<f64, FitError> {
    if !(p > 0.0 && p < 1.0) {
        return Err(FitError::InvalidDomain { probability: p });
    }
    if p > 0.5 {
        Ok(-lower_quantile(1.0 - p))
    } else {
        Ok(lower_quantile(p))
    }
}

fn lower_quantile(p: f64) -> f64 {
    -SQRT_2 * erfc_inv(2.0 * p)
}
