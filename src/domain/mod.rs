//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - region and solver enums (`Region`, `SolveMethod`)
//! - training data (`SamplePoint`, `WeightedSampleSet`)
//! - fit outputs (`RationalApproximation`, `FitResult`)
//! - the persisted record (`CoefficientExport`)

pub mod types;

pub use types::*;
