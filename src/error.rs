//! Error types.
//!
//! - `FitError`: failures of a single region fit (the core taxonomy)
//! - `SolveError`: failures of the weighted least-squares solver
//! - `CoefficientError`: malformed rational approximations (e.g. a loaded JSON file)
//! - `AppError`: the binary boundary (exit code + message)

use thiserror::Error;

use crate::domain::Region;

/// Exit code for invalid configuration, I/O, and malformed input files.
pub const EXIT_INPUT: u8 = 2;
/// Exit code for an underdetermined fit.
pub const EXIT_INSUFFICIENT: u8 = 3;
/// Exit code for numerical failures inside a fit.
pub const EXIT_NUMERIC: u8 = 4;
/// Exit code for a coefficient file that fails validation.
pub const EXIT_VALIDATION: u8 = 5;

/// Failure of the weighted regularized solver.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolveError {
    #[error("dimension mismatch: {rows} rows, {rhs} rhs entries, {weights} weights")]
    DimensionMismatch {
        rows: usize,
        rhs: usize,
        weights: usize,
    },

    #[error("regularized normal matrix is singular to working precision")]
    Singular,

    #[error("least-squares system is rank deficient (min/max |R_ii| = {ratio:e})")]
    RankDeficient { ratio: f64 },

    #[error("solution contains non-finite coefficients")]
    NonFinite,
}

/// Failure of a single region fit.
///
/// Every variant is fatal for the region it occurs in; the exporter never writes a
/// partial record.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    #[error("{region} region: {available} usable samples for {required} unknowns (underdetermined)")]
    InsufficientSamples {
        region: Region,
        available: usize,
        required: usize,
    },

    #[error("{region} region: {source}")]
    SingularSystem {
        region: Region,
        #[source]
        source: SolveError,
    },

    #[error("probability {probability} is outside (0, 1)")]
    InvalidDomain { probability: f64 },

    #[error("{region} region: fitted approximation is not finite at x = {probability:e}")]
    NonFinite { region: Region, probability: f64 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl FitError {
    pub fn exit_code(&self) -> u8 {
        match self {
            FitError::InvalidConfig(_) => EXIT_INPUT,
            FitError::InsufficientSamples { .. } => EXIT_INSUFFICIENT,
            FitError::SingularSystem { .. } | FitError::InvalidDomain { .. } | FitError::NonFinite { .. } => {
                EXIT_NUMERIC
            }
        }
    }
}

/// A rational approximation whose coefficient vectors break the export contract.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoefficientError {
    #[error("numerator has no coefficients")]
    EmptyNumerator,

    #[error("denominator has no coefficients")]
    EmptyDenominator,

    #[error("denominator anchor must be exactly 1.0, found {0}")]
    Anchor(f64),

    #[error("{name}: expected {expected} coefficients for degree {degree}, found {found}")]
    Length {
        name: &'static str,
        degree: usize,
        expected: usize,
        found: usize,
    },

    #[error("{name} is not a finite, non-negative value")]
    NonFinite { name: &'static str },

    #[error("boundary parameters ({x_low}, {x_high}) do not match the fitted boundary")]
    Boundary { x_low: f64, x_high: f64 },
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<FitError> for AppError {
    fn from(err: FitError) -> Self {
        AppError::new(err.exit_code(), format!("Fit failed: {err}"))
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
