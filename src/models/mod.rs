//! Rational model implementations.
//!
//! Models are implemented as small, pure functions so that fitting, validation and
//! plotting code can share them.

pub mod rational;

pub use rational::*;
