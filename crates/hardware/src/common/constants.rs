//! Global system constants.
//!
//! This module defines system-wide constants used across the simulator:
//! 1. **Memory Constants:** DRAM size and initial stack address.
//! 2. **Instruction Constants:** Field masks and shifts for instruction words.
//! 3. **ABI Constants:** Register indices with a calling-convention role.

/// Total size of the flat DRAM image in bytes (64 MiB, power of two).
pub const DRAM_SIZE: usize = 64 * 1024 * 1024;

/// Initial stack pointer and base of the argv block.
///
/// The argc word, argv pointer array, and argument strings are materialised
/// upward from this address; the guest stack grows downward from it.
pub const STACK_INIT: u32 = (DRAM_SIZE - 0x1000) as u32;

/// Bit mask for extracting the opcode field (bits 6-0).
pub const OPCODE_MASK: u32 = 0x7F;

/// Bit position shift for the destination register (rd) field.
pub const RD_SHIFT: u32 = 7;

/// Bit position shift for the first source register (rs1) field.
pub const RS1_SHIFT: u32 = 15;

/// Bit position shift for the second source register (rs2) field.
pub const RS2_SHIFT: u32 = 20;

/// Bit mask for a 5-bit register index field.
pub const REG_MASK: u32 = 0x1F;

/// Bit position shift for the funct3 field.
pub const FUNCT3_SHIFT: u32 = 12;

/// Bit mask for the 3-bit funct3 field.
pub const FUNCT3_MASK: u32 = 0x7;

/// Bit position shift for the funct7 field.
pub const FUNCT7_SHIFT: u32 = 25;

/// Instruction word used as a pipeline bubble.
///
/// The zero word is not a valid RV32I encoding, so latches holding it decode
/// to a no-op with no register write, memory operation, or branch commit.
pub const INSTRUCTION_BUBBLE: u32 = 0;

/// Register x2 (stack pointer, sp).
pub const REG_SP: usize = 2;

/// Register x10 (first argument / return value, a0).
pub const REG_A0: usize = 10;

/// Register x11 (second argument, a1).
pub const REG_A1: usize = 11;

/// Register x12 (third argument, a2).
pub const REG_A2: usize = 12;

/// Register x13 (fourth argument, a3).
pub const REG_A3: usize = 13;

/// Register x17 (system call number, a7).
pub const REG_A7: usize = 17;
