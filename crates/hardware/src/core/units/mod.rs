//! Functional units attached to the core.

/// Branch prediction unit (direction predictors).
pub mod bru;
