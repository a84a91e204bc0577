//! Input/output helpers.
//!
//! - coefficient JSON read/write (`coefficients`)
//! - per-sample error exports (`export`)

pub mod coefficients;
pub mod export;

pub use coefficients::*;
pub use export::*;
