//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - exported to JSON for the C++ runtime
//! - reloaded later for validation and plotting

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, FixedOffset};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{CoefficientError, FitError};

/// Probability separating the lower tail from the central region.
pub const X_LOW: f64 = 0.02425;

/// Upper boundary of the central region (`1 - X_LOW`).
pub const X_HIGH: f64 = 1.0 - X_LOW;

/// Version string written into `metadata.version`.
pub const FORMAT_VERSION: &str = "1.0";

/// Description written into `metadata.description`.
pub const EXPORT_DESCRIPTION: &str = "Rational approximation coefficients for inverse normal CDF";

/// Which side of the boundary a fit covers.
///
/// The upper tail is never fitted; it follows from the lower one by symmetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    /// `x ∈ [X_LOW, X_HIGH]`, abscissa `u = x - 0.5`, polynomial argument `r = u²`.
    Central,
    /// `x ∈ (0, X_LOW]`, abscissa `t = sqrt(-2 ln x)`, used directly as the argument.
    Tail,
}

impl Region {
    pub const ALL: [Region; 2] = [Region::Central, Region::Tail];

    pub fn display_name(self) -> &'static str {
        match self {
            Region::Central => "central",
            Region::Tail => "tail",
        }
    }

    /// Map a probability to the region's abscissa (`u` or `t`).
    pub fn abscissa(self, x: f64) -> f64 {
        match self {
            Region::Central => x - 0.5,
            Region::Tail => (-2.0 * x.ln()).sqrt(),
        }
    }

    /// Argument the numerator and denominator polynomials are evaluated at.
    pub fn poly_arg(self, abscissa: f64) -> f64 {
        match self {
            Region::Central => abscissa * abscissa,
            Region::Tail => abscissa,
        }
    }

    /// Prefactor of the rational form: `u` (central) or the fixed sign `-1` (tail).
    pub fn scale(self, abscissa: f64) -> f64 {
        match self {
            Region::Central => abscissa,
            Region::Tail => -1.0,
        }
    }

    /// Whether `x` lies in the closed probability interval the region is fitted on.
    pub fn contains(self, x: f64) -> bool {
        match self {
            Region::Central => (X_LOW..=X_HIGH).contains(&x),
            Region::Tail => x > 0.0 && x <= X_LOW,
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// How the regularized weighted least-squares system is solved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SolveMethod {
    /// Form `AᵗA + λI` and `Aᵗb` and solve by LU with partial pivoting.
    ///
    /// Rejects the default tail system, which is singular to working precision here.
    Normal,
    /// Householder QR of the augmented system `[A; √λ·I]`.
    ///
    /// Same minimizer as `Normal`, without squaring the condition number.
    Qr,
}

impl SolveMethod {
    pub fn display_name(self) -> &'static str {
        match self {
            SolveMethod::Normal => "normal equations (LU)",
            SolveMethod::Qr => "augmented QR",
        }
    }
}

/// A single training point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplePoint {
    /// Input probability in `(0, 1)`.
    pub x: f64,
    /// `u = x - 0.5` (central) or `t = sqrt(-2 ln x)` (tail).
    pub abscissa: f64,
    /// Exact reference value `Φ⁻¹(x)`.
    pub z: f64,
}

/// Ordered training points with one strictly positive weight per point.
#[derive(Debug, Clone)]
pub struct WeightedSampleSet {
    pub region: Region,
    pub points: Vec<SamplePoint>,
    pub weights: Vec<f64>,
}

impl WeightedSampleSet {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SamplePoint, f64)> {
        self.points.iter().zip(self.weights.iter().copied())
    }
}

#[derive(Debug, Clone, Deserialize)]
struct RationalParts {
    numerator: Vec<f64>,
    denominator: Vec<f64>,
}

impl TryFrom<RationalParts> for RationalApproximation {
    type Error = CoefficientError;

    fn try_from(parts: RationalParts) -> Result<Self, Self::Error> {
        RationalApproximation::new(parts.numerator, parts.denominator)
    }
}

/// `f(r) = scale · P(r) / Q(r)` with `Q[0] == 1.0`.
///
/// Coefficients are stored in ascending powers. The constructor enforces the anchor,
/// so every value of this type satisfies it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RationalParts")]
pub struct RationalApproximation {
    numerator: Vec<f64>,
    denominator: Vec<f64>,
}

impl RationalApproximation {
    pub fn new(numerator: Vec<f64>, denominator: Vec<f64>) -> Result<Self, CoefficientError> {
        if numerator.is_empty() {
            return Err(CoefficientError::EmptyNumerator);
        }
        let Some(&anchor) = denominator.first() else {
            return Err(CoefficientError::EmptyDenominator);
        };
        if anchor != 1.0 {
            return Err(CoefficientError::Anchor(anchor));
        }
        if numerator.iter().any(|c| !c.is_finite()) {
            return Err(CoefficientError::NonFinite { name: "numerator" });
        }
        if denominator.iter().any(|c| !c.is_finite()) {
            return Err(CoefficientError::NonFinite { name: "denominator" });
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }

    /// Like `new`, but also checks the lengths against declared degrees.
    pub fn with_degrees(
        numerator: Vec<f64>,
        denominator: Vec<f64>,
        numerator_degree: usize,
        denominator_degree: usize,
    ) -> Result<Self, CoefficientError> {
        check_len("numerator", &numerator, numerator_degree)?;
        check_len("denominator", &denominator, denominator_degree)?;
        Self::new(numerator, denominator)
    }

    pub fn numerator(&self) -> &[f64] {
        &self.numerator
    }

    pub fn denominator(&self) -> &[f64] {
        &self.denominator
    }

    pub fn numerator_degree(&self) -> usize {
        self.numerator.len() - 1
    }

    pub fn denominator_degree(&self) -> usize {
        self.denominator.len() - 1
    }

    /// Evaluate at a region abscissa (`u` or `t`).
    pub fn evaluate(&self, region: Region, abscissa: f64) -> f64 {
        crate::models::evaluate_rational(region, abscissa, &self.numerator, &self.denominator)
    }

    /// Evaluate at a probability inside the region.
    pub fn quantile(&self, region: Region, x: f64) -> f64 {
        self.evaluate(region, region.abscissa(x))
    }
}

fn check_len(name: &'static str, coeffs: &[f64], degree: usize) -> Result<(), CoefficientError> {
    if coeffs.len() != degree + 1 {
        return Err(CoefficientError::Length {
            name,
            degree,
            expected: degree + 1,
            found: coeffs.len(),
        });
    }
    Ok(())
}

/// Output of one region fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    pub region: Region,
    pub approximation: RationalApproximation,
    pub max_error: f64,
    pub mean_error: f64,
    pub num_samples: usize,
}

/// Per-region fitting configuration.
///
/// `primary_samples` is the main sweep (uniform over `(0, 1)` for central,
/// log-spaced up to `X_LOW / 10` for tail). `boundary_samples` is the denser sweep near
/// the hand-off: each of the two brackets around the boundary (central) or the linear
/// sweep `[0.002, X_LOW]` (tail).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionConfig {
    pub numerator_degree: usize,
    pub denominator_degree: usize,
    pub primary_samples: usize,
    pub boundary_samples: usize,
    /// Ridge constant added to every diagonal entry of the normal matrix.
    pub ridge: f64,
    pub solver: SolveMethod,
}

/// Ridge constant used by the exported fits.
pub const DEFAULT_RIDGE: f64 = 1e-12;

impl RegionConfig {
    pub fn central() -> Self {
        Self {
            numerator_degree: 6,
            denominator_degree: 6,
            primary_samples: 800,
            boundary_samples: 50,
            ridge: DEFAULT_RIDGE,
            solver: SolveMethod::Qr,
        }
    }

    pub fn tail() -> Self {
        Self {
            numerator_degree: 8,
            denominator_degree: 8,
            primary_samples: 100,
            boundary_samples: 100,
            ridge: DEFAULT_RIDGE,
            solver: SolveMethod::Qr,
        }
    }

    pub fn for_region(region: Region) -> Self {
        match region {
            Region::Central => Self::central(),
            Region::Tail => Self::tail(),
        }
    }

    /// Unknowns in the linearized system: `(m + 1) + n` (the anchor is not estimated).
    pub fn num_vars(&self) -> usize {
        self.numerator_degree + 1 + self.denominator_degree
    }

    pub fn validate(&self) -> Result<(), FitError> {
        if self.primary_samples < 2 {
            return Err(FitError::InvalidConfig(format!(
                "primary sample count must be >= 2, got {}",
                self.primary_samples
            )));
        }
        if self.boundary_samples == 1 {
            return Err(FitError::InvalidConfig(
                "boundary sample count must be 0 (disabled) or >= 2".to_string(),
            ));
        }
        if !(self.ridge.is_finite() && self.ridge >= 0.0) {
            return Err(FitError::InvalidConfig(format!(
                "ridge must be finite and >= 0, got {}",
                self.ridge
            )));
        }
        Ok(())
    }
}

/// Full configuration of an `export` run.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub central: RegionConfig,
    pub tail: RegionConfig,
    pub output: PathBuf,
    /// Optional per-sample error CSV.
    pub export_errors: Option<PathBuf>,
    /// Fit the regions one after the other instead of concurrently.
    pub sequential: bool,
    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            central: RegionConfig::central(),
            tail: RegionConfig::tail(),
            output: PathBuf::from("coefficients.json"),
            export_errors: None,
            sequential: false,
            plot: false,
            plot_width: 80,
            plot_height: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportMetadata {
    pub generated_at: DateTime<FixedOffset>,
    pub version: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CentralRegionExport {
    pub coefficients_a: Vec<f64>,
    pub coefficients_b: Vec<f64>,
    pub degree_m: usize,
    pub degree_n: usize,
    pub max_error: f64,
    pub mean_error: f64,
    pub num_samples: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TailRegionExport {
    pub coefficients_c: Vec<f64>,
    pub coefficients_d: Vec<f64>,
    pub degree_p: usize,
    pub degree_q: usize,
    pub max_error: f64,
    pub mean_error: f64,
    pub num_samples: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundaryParameters {
    pub x_low: f64,
    pub x_high: f64,
}

impl Default for BoundaryParameters {
    fn default() -> Self {
        Self {
            x_low: X_LOW,
            x_high: X_HIGH,
        }
    }
}

/// The persisted coefficient file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoefficientExport {
    pub metadata: ExportMetadata,
    pub central_region: CentralRegionExport,
    pub tail_region: TailRegionExport,
    pub parameters: BoundaryParameters,
}

impl CoefficientExport {
    /// Package both fits. Fails if the fits are swapped.
    pub fn from_fits(
        central: &FitResult,
        tail: &FitResult,
        generated_at: DateTime<FixedOffset>,
    ) -> Result<Self, FitError> {
        if central.region != Region::Central || tail.region != Region::Tail {
            return Err(FitError::InvalidConfig(format!(
                "expected (central, tail) fits, got ({}, {})",
                central.region, tail.region
            )));
        }

        let a = &central.approximation;
        let c = &tail.approximation;
        Ok(Self {
            metadata: ExportMetadata {
                generated_at,
                version: FORMAT_VERSION.to_string(),
                description: EXPORT_DESCRIPTION.to_string(),
            },
            central_region: CentralRegionExport {
                coefficients_a: a.numerator().to_vec(),
                coefficients_b: a.denominator().to_vec(),
                degree_m: a.numerator_degree(),
                degree_n: a.denominator_degree(),
                max_error: central.max_error,
                mean_error: central.mean_error,
                num_samples: central.num_samples,
            },
            tail_region: TailRegionExport {
                coefficients_c: c.numerator().to_vec(),
                coefficients_d: c.denominator().to_vec(),
                degree_p: c.numerator_degree(),
                degree_q: c.denominator_degree(),
                max_error: tail.max_error,
                mean_error: tail.mean_error,
                num_samples: tail.num_samples,
            },
            parameters: BoundaryParameters::default(),
        })
    }

    /// Rebuild the central fit, checking lengths and the anchor.
    pub fn central_fit(&self) -> Result<FitResult, CoefficientError> {
        let r = &self.central_region;
        Ok(FitResult {
            region: Region::Central,
            approximation: RationalApproximation::with_degrees(
                r.coefficients_a.clone(),
                r.coefficients_b.clone(),
                r.degree_m,
                r.degree_n,
            )?,
            max_error: checked_error("central max_error", r.max_error)?,
            mean_error: checked_error("central mean_error", r.mean_error)?,
            num_samples: r.num_samples,
        })
    }

    /// Rebuild the tail fit, checking lengths and the anchor.
    pub fn tail_fit(&self) -> Result<FitResult, CoefficientError> {
        let r = &self.tail_region;
        Ok(FitResult {
            region: Region::Tail,
            approximation: RationalApproximation::with_degrees(
                r.coefficients_c.clone(),
                r.coefficients_d.clone(),
                r.degree_p,
                r.degree_q,
            )?,
            max_error: checked_error("tail max_error", r.max_error)?,
            mean_error: checked_error("tail mean_error", r.mean_error)?,
            num_samples: r.num_samples,
        })
    }

    /// Check every region plus the boundary parameters.
    pub fn validate(&self) -> Result<(), CoefficientError> {
        self.central_fit()?;
        self.tail_fit()?;
        let p = self.parameters;
        if p.x_low != X_LOW || p.x_high != X_HIGH {
            return Err(CoefficientError::Boundary {
                x_low: p.x_low,
                x_high: p.x_high,
            });
        }
        Ok(())
    }
}

fn checked_error(name: &'static str, value: f64) -> Result<f64, CoefficientError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(CoefficientError::NonFinite { name })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_parameters_are_exact_complements() {
        let p = BoundaryParameters::default();
        assert_eq!(p.x_low, 0.02425);
        assert_eq!(p.x_high, 1.0 - 0.02425);
    }

    #[test]
    fn rational_rejects_unanchored_denominator() {
        let err = RationalApproximation::new(vec![1.0], vec![0.5, 1.0]).unwrap_err();
        assert_eq!(err, CoefficientError::Anchor(0.5));
    }

    #[test]
    fn rational_checks_declared_degrees() {
        let err = RationalApproximation::with_degrees(vec![1.0, 2.0], vec![1.0], 2, 0).unwrap_err();
        assert!(matches!(err, CoefficientError::Length { name: "numerator", expected: 3, found: 2, .. }));
    }

    #[test]
    fn deserializing_rational_enforces_anchor() {
        let ok: RationalApproximation =
            serde_json::from_str(r#"{"numerator":[1.0,2.0],"denominator":[1.0,0.5]}"#).unwrap();
        assert_eq!(ok.numerator_degree(), 1);
        assert_eq!(ok.denominator()[0], 1.0);

        let bad = serde_json::from_str::<RationalApproximation>(r#"{"numerator":[1.0],"denominator":[2.0]}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn region_abscissa_and_scale() {
        let u = Region::Central.abscissa(0.75);
        assert_eq!(u, 0.25);
        assert_eq!(Region::Central.poly_arg(u), 0.0625);
        assert_eq!(Region::Central.scale(u), 0.25);

        let t = Region::Tail.abscissa((-2.0_f64).exp());
        assert!((t - 2.0).abs() < 1e-15);
        assert_eq!(Region::Tail.poly_arg(t), t);
        assert_eq!(Region::Tail.scale(t), -1.0);
    }

    #[test]
    fn region_config_defaults() {
        let c = RegionConfig::central();
        assert_eq!((c.numerator_degree, c.denominator_degree), (6, 6));
        assert_eq!(c.num_vars(), 13);
        let t = RegionConfig::tail();
        assert_eq!((t.numerator_degree, t.denominator_degree), (8, 8));
        assert_eq!(t.num_vars(), 17);
        assert_eq!(c.ridge, 1e-12);
        assert_eq!((c.solver, t.solver), (SolveMethod::Qr, SolveMethod::Qr));
    }

    #[test]
    fn region_config_rejects_negative_ridge() {
        let cfg = RegionConfig {
            ridge: -1.0,
            ..RegionConfig::central()
        };
        assert!(matches!(cfg.validate(), Err(FitError::InvalidConfig(_))));
    }
}
