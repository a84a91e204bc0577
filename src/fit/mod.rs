//! Coefficient fitting orchestration.
//!
//! Responsibilities:
//!
//! - generate weighted training sets per region (`samples`, `grid`)
//! - solve the linearized rational least-squares problem (`fitter`)
//! - measure training errors (`evaluate`)
//! - check an exported record on holdout data (`validate`)

pub mod evaluate;
pub mod fitter;
pub mod grid;
pub mod samples;
pub mod validate;

pub use evaluate::*;
pub use fitter::*;
pub use samples::*;
pub use validate::*;
