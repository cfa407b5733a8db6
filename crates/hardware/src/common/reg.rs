//! Architectural register file.
//!
//! This module provides the `RegisterFile` struct holding the 32 general
//! purpose registers of the RV32I core. It provides:
//! 1. **Zero Register:** x0 is hard-wired to zero; writes are silently dropped.
//! 2. **Abstraction:** A single pair of read/write methods used by every stage.
//! 3. **Observability:** A debugging dump of the full register state.

/// The 32-entry register file of 32-bit signed words.
#[derive(Debug)]
pub struct RegisterFile {
    regs: [i32; 32],
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterFile {
    /// Creates a new register file with all registers initialized to zero.
    pub fn new() -> Self {
        Self { regs: [0; 32] }
    }

    /// Reads a register value.
    ///
    /// # Arguments
    ///
    /// * `idx` - Register index (0-31). Register `x0` always returns 0.
    #[inline(always)]
    pub fn read(&self, idx: usize) -> i32 {
        self.regs[idx]
    }

    /// Writes a register value.
    ///
    /// # Arguments
    ///
    /// * `idx` - Register index (0-31). Writes to `x0` are dropped.
    /// * `val` - The 32-bit value to write.
    #[inline(always)]
    pub fn write(&mut self, idx: usize, val: i32) {
        if idx != 0 {
            self.regs[idx] = val;
        }
    }

    /// Dumps the contents of all registers to stderr.
    pub fn dump(&self) {
        for (idx, val) in self.regs.iter().enumerate() {
            eprintln!("x{:<2} = {:#010x}", idx, *val as u32);
        }
    }
}
