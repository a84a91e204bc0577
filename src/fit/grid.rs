//! Deterministic sweeps used to place training points.
//!
//! Both helpers include their endpoints exactly, so boundary probabilities such as
//! `X_LOW` land in the sample set bit-for-bit.

use crate::error::FitError;

/// `steps` evenly spaced points on `[start, end]` (inclusive).
pub fn linspace(start: f64, end: f64, steps: usize) -> Result<Vec<f64>, FitError> {
    if !(start.is_finite() && end.is_finite() && end > start) {
        return Err(FitError::InvalidConfig(format!(
            "invalid sweep range: start={start}, end={end} (must be finite and end>start)"
        )));
    }
    if steps < 2 {
        return Err(FitError::InvalidConfig("sweep steps must be >= 2".to_string()));
    }

    let step = (end - start) / (steps as f64 - 1.0);
    let mut out: Vec<f64> = (0..steps).map(|i| start + step * i as f64).collect();
    out[steps - 1] = end;
    Ok(out)
}

/// `steps` log-spaced points between `min` and `max` (inclusive), equally spaced in
/// `log10`.
pub fn log_space(min: f64, max: f64, steps: usize) -> Result<Vec<f64>, FitError> {
    if !(min.is_finite() && max.is_finite() && min > 0.0 && max > min) {
        return Err(FitError::InvalidConfig(format!(
            "invalid log sweep range: min={min}, max={max} (must be finite, >0, and max>min)"
        )));
    }

    let exponents = linspace(min.log10(), max.log10(), steps)?;
    let mut out: Vec<f64> = exponents.into_iter().map(|e| 10f64.powf(e)).collect();
    out[0] = min;
    out[steps - 1] = max;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linspace_includes_endpoints() {
        let v = linspace(0.002, 0.02425, 100).unwrap();
        assert_eq!(v.len(), 100);
        assert_eq!(v[0], 0.002);
        assert_eq!(v[99], 0.02425);
        assert!(v.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn log_space_includes_endpoints() {
        let v = log_space(1e-16, 0.002425, 100).unwrap();
        assert_eq!(v[0], 1e-16);
        assert_eq!(v[v.len() - 1], 0.002425);
        assert!(v.windows(2).all(|w| w[1] > w[0]));
        // Equal ratios between neighbours.
        let r0 = v[1] / v[0];
        let r1 = v[51] / v[50];
        assert!((r0 / r1 - 1.0).abs() < 1e-9);
    }

    #[test]
    fn sweeps_reject_bad_ranges() {
        assert!(linspace(1.0, 1.0, 5).is_err());
        assert!(linspace(0.0, 1.0, 1).is_err());
        assert!(log_space(0.0, 1.0, 5).is_err());
    }
}
