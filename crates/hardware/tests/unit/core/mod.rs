//! Unit tests for the core.

/// Pipeline behaviour tests (forwarding, hazards, branches, ECALL).
pub mod pipeline;

/// Functional unit tests (branch predictors).
pub mod units;
