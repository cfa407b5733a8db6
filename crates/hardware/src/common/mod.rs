//! Common utilities and types used throughout the simulator.
//!
//! This module provides fundamental building blocks shared across all components:
//! 1. **Bit Manipulation:** Bit-exact slice extraction, insertion, and sign extension.
//! 2. **Constants:** System-wide constants for memory layout and instruction fields.
//! 3. **Memory Access:** Width/sign masks and operation kinds for the memory interface.
//! 4. **Error Handling:** Library error enums for load-time and run-time failures.
//! 5. **Register Management:** The architectural register file.

/// Bit-slice extraction, insertion, and sign-extension helpers.
pub mod bits;

/// Common constants used throughout the simulator.
pub mod constants;

/// Memory access mask and operation definitions.
pub mod data;

/// Error types.
pub mod error;

/// Register file implementation.
pub mod reg;

pub use bits::{sign_extend, BitSlice};
pub use data::{MemMask, MemOp};
pub use error::{ElfError, SimError, SimResult};
pub use reg::RegisterFile;
