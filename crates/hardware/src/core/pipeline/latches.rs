//! Pipeline latch structures for inter-stage communication.
//!
//! One record per inter-stage boundary of the five-stage pipeline:
//! Fetch → Decode → Execute → Memory → Writeback. Latches are value-typed
//! snapshots: a stage reads what the previous stage wrote in the previous
//! cycle. The default value of every latch is a bubble — no register write,
//! no memory operation, no branch commit.

use crate::common::{MemMask, MemOp};

/// Fetch to Decode latch.
#[derive(Clone, Debug, Default)]
pub struct FtoD {
    /// Program counter of the fetched instruction.
    pub pc: u32,
    /// Raw instruction word; 0 marks a bubble.
    pub instruction: u32,
    /// Whether the predictor called this instruction taken.
    pub predicted_taken: bool,
    /// Predicted target when `predicted_taken` is set.
    pub predicted_target: u32,
    /// A direction prediction is pending for this instruction; it must be
    /// retired with `update` or withdrawn with `undo`.
    pub has_prediction: bool,
}

/// Decode to Execute latch.
#[derive(Clone, Debug, Default)]
pub struct DtoE {
    /// Program counter of the instruction.
    pub pc: u32,
    /// Raw instruction word; 0 marks a bubble.
    pub instruction: u32,
    /// Major opcode.
    pub opcode: u32,
    /// Source register indices.
    pub rs1: usize,
    pub rs2: usize,
    /// Third source slot; carries the store-data register.
    pub rs3: usize,
    /// Destination register index.
    pub rd: usize,
    /// Which source slots are live for forwarding.
    pub use_rs1: bool,
    pub use_rs2: bool,
    pub use_rs3: bool,
    /// Whether the instruction writes a destination register.
    pub use_rd: bool,
    /// First operand, read from the register file at decode.
    pub lhs: i32,
    /// Second operand (register or unused, depending on the opcode).
    pub rhs: i32,
    /// Third operand (store data).
    pub datac: i32,
    /// Sign-extended immediate.
    pub imm: i32,
    /// funct3 field.
    pub funct3: u32,
    /// funct7 field.
    pub funct7: u32,
    /// Conditional branch marker.
    pub is_branch: bool,
    /// Memory access marker.
    pub is_mem: bool,
    /// Access mask when `is_mem` is set.
    pub mem_mask: MemMask,
    /// Memory operation when `is_mem` is set.
    pub mem_op: MemOp,
    /// ECALL marker.
    pub is_syscall: bool,
    /// Prediction metadata carried from fetch for resolution at execute.
    pub predicted_taken: bool,
    pub predicted_target: u32,
    pub has_prediction: bool,
}

/// Execute to Memory latch.
#[derive(Clone, Debug, Default)]
pub struct EtoM {
    /// Program counter of the instruction.
    pub pc: u32,
    /// Major opcode.
    pub opcode: u32,
    /// Raw instruction word; 0 marks a bubble.
    pub instruction: u32,
    /// ALU result (address for memory operations).
    pub result: i32,
    /// Destination register index.
    pub rd: usize,
    /// Whether the instruction names a destination register.
    pub use_rd: bool,
    /// Register write enable.
    pub we: bool,
    /// Memory access address.
    pub mem_addr: u32,
    /// Store data.
    pub mem_value: u32,
    /// Access mask.
    pub mem_mask: MemMask,
    /// Memory operation; `None` for non-memory instructions.
    pub mem_op: MemOp,
}

/// Memory to Writeback latch.
#[derive(Clone, Debug, Default)]
pub struct MtoW {
    /// Destination register index.
    pub rd: usize,
    /// Whether the instruction names a destination register.
    pub use_rd: bool,
    /// Register write enable.
    pub we: bool,
    /// Value to commit.
    pub result: i32,
}
