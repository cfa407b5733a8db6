//! RV32I pipelined core simulator library.
//!
//! This crate implements a cycle-level simulator of a single-issue, in-order,
//! five-stage RV32I core with the following:
//! 1. **Core:** Pipeline (fetch, decode, execute, memory, writeback), register file,
//!    forwarding, stall logic, and branch-misprediction recovery.
//! 2. **Memory:** Flat DRAM backing store and set-associative write-back caches with
//!    a per-access miss state machine.
//! 3. **Prediction:** Branch-direction predictors (saturating bit counters, perceptron).
//! 4. **Hosted ABI:** ECALL interception and emulation of a Linux-like syscall subset.
//! 5. **Simulation:** ELF loader, argv marshalling, compliance-signature dumping,
//!    configuration, and statistics collection.

/// Common types and helpers (bit slicing, constants, access kinds, errors, registers).
pub mod common;
/// Simulator configuration (defaults, enums, hierarchical config structures).
pub mod config;
/// CPU core (architectural state, pipeline, branch prediction units).
pub mod core;
/// Instruction set (RV32I opcodes and instruction decoding).
pub mod isa;
/// Memory system (flat DRAM, write-back cache, memory ports).
pub mod mem;
/// Hosted simulation (ELF loader, syscall emulation, run loop).
pub mod sim;
/// Simulation statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// Library error type returned by all fallible operations.
pub use crate::common::error::SimError;
/// Top-level simulator; loads an ELF and drives the core cycle by cycle.
pub use crate::sim::simulator::Simulator;
