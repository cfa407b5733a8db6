//! Hosted simulation layer.
//!
//! This module contains everything that connects the simulated core to the
//! host:
//! 1. **Loader:** ELF32 parsing and DRAM image initialisation.
//! 2. **Syscalls:** Emulation of the Linux-like `ECALL` ABI against host files.
//! 3. **Simulator:** The run loop, argv marshalling, tracing, and the
//!    compliance-signature dump.

/// ELF loader.
pub mod loader;

/// Host-side syscall emulation.
pub mod syscall;

/// Top-level simulator and run loop.
pub mod simulator;
