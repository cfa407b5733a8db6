//! Pipeline stage implementations.
//!
//! One module per stage. Each stage is a free function over the core plus
//! the latch snapshots taken at the start of the cycle, and returns the
//! latch it produces; the cycle driver in `pipeline` decides what commits.

/// Instruction fetch stage.
pub mod fetch;

/// Instruction decode stage.
pub mod decode;

/// Execute stage.
pub mod execute;

/// Memory access stage.
pub mod memory;

/// Writeback stage.
pub mod writeback;
