//! RV32I instruction set definitions.
//!
//! This module contains the instruction decoding support for the base
//! integer instruction set:
//! 1. **Opcodes:** Major opcode and function-code constants.
//! 2. **Decode:** Raw word to `Decoded` record conversion, including
//!    per-format immediate extraction.

/// Instruction decoding into a structured record.
pub mod decode;

/// Major opcodes and function codes for RV32I.
pub mod opcodes;
