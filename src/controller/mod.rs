//! Lifecycle Controller and Readiness Gate.
//!
//! The controller owns the shared cluster slot every test of a class runs
//! against; the readiness gate blocks a fresh start until enough workers are
//! observably healthy.
mod lifecycle;
mod readiness;
pub use lifecycle::*;
pub use readiness::*;

#[cfg(test)]
mod readiness_test;
