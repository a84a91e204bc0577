//! Mathematical utilities: the reference quantile and weighted least squares.

pub mod ols;
pub mod quantile;

pub use ols::*;
pub use quantile::*;
