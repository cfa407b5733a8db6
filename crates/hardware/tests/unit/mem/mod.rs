//! Unit tests for the memory system.


/// Flat DRAM tests.
pub mod dram;
