//! RV32I base integer opcodes.
//!
//! Defines the major opcodes (bits 6-0) and the funct3/funct7 codes used to
//! route instructions through the pipeline.

/// Load instructions (LB, LH, LW, LBU, LHU).
pub const OP_LOAD: u32 = 0b0000011;

/// Memory ordering instructions (FENCE).
pub const OP_MISC_MEM: u32 = 0b0001111;

/// Immediate arithmetic instructions (ADDI, ANDI, SLLI, etc.).
pub const OP_IMM: u32 = 0b0010011;

/// Add Upper Immediate to PC (AUIPC).
pub const OP_AUIPC: u32 = 0b0010111;

/// Store instructions (SB, SH, SW).
pub const OP_STORE: u32 = 0b0100011;

/// Register-register arithmetic (ADD, SUB, SLL, etc.).
pub const OP_REG: u32 = 0b0110011;

/// Load Upper Immediate (LUI).
pub const OP_LUI: u32 = 0b0110111;

/// Conditional branch instructions (BEQ, BNE, etc.).
pub const OP_BRANCH: u32 = 0b1100011;

/// Jump and Link Register (JALR).
pub const OP_JALR: u32 = 0b1100111;

/// Jump and Link (JAL).
pub const OP_JAL: u32 = 0b1101111;

/// System instructions (ECALL, EBREAK).
pub const OP_SYSTEM: u32 = 0b1110011;

/// funct3 codes shared by `OP_IMM` and `OP_REG`.
pub mod alu {
    /// ADD / ADDI / SUB (funct7 bit 5 selects SUB under `OP_REG`).
    pub const ADD_SUB: u32 = 0b000;
    /// Shift left logical.
    pub const SLL: u32 = 0b001;
    /// Set less than (signed).
    pub const SLT: u32 = 0b010;
    /// Set less than (unsigned).
    pub const SLTU: u32 = 0b011;
    /// Exclusive or.
    pub const XOR: u32 = 0b100;
    /// Shift right logical / arithmetic (funct7 bit 5 selects arithmetic).
    pub const SRL_SRA: u32 = 0b101;
    /// Inclusive or.
    pub const OR: u32 = 0b110;
    /// And.
    pub const AND: u32 = 0b111;
}

/// funct3 codes for `OP_BRANCH`.
pub mod branch {
    /// Branch if equal.
    pub const BEQ: u32 = 0b000;
    /// Branch if not equal.
    pub const BNE: u32 = 0b001;
    /// Branch if less than (signed).
    pub const BLT: u32 = 0b100;
    /// Branch if greater or equal (signed).
    pub const BGE: u32 = 0b101;
    /// Branch if less than (unsigned).
    pub const BLTU: u32 = 0b110;
    /// Branch if greater or equal (unsigned).
    pub const BGEU: u32 = 0b111;
}

/// funct3 codes for `OP_LOAD`.
pub mod load {
    /// Load byte, sign-extended.
    pub const LB: u32 = 0b000;
    /// Load halfword, sign-extended.
    pub const LH: u32 = 0b001;
    /// Load word.
    pub const LW: u32 = 0b010;
    /// Load byte, zero-extended.
    pub const LBU: u32 = 0b100;
    /// Load halfword, zero-extended.
    pub const LHU: u32 = 0b101;
}

/// funct3 codes for `OP_STORE`.
pub mod store {
    /// Store byte.
    pub const SB: u32 = 0b000;
    /// Store halfword.
    pub const SH: u32 = 0b001;
    /// Store word.
    pub const SW: u32 = 0b010;
}

/// funct7 bit 5, set for the alternate R-type encodings (SUB, SRA).
pub const FUNCT7_ALT: u32 = 0b0100000;
