//! Instruction decode stage.
//!
//! Converts the fetched word into the D→E record: register indices and
//! usage flags, the format-selected immediate, memory access routing, and
//! the operand values read from the register file. Invalid encodings abort
//! the simulation with a diagnostic.

use crate::common::bits::BitSlice;
use crate::common::constants::INSTRUCTION_BUBBLE;
use crate::common::{MemMask, MemOp};
use crate::core::pipeline::latches::{DtoE, FtoD};
use crate::core::Core;
use crate::isa::decode::decode;
use crate::isa::opcodes::{self, load, store};

/// Executes the decode stage for one cycle.
///
/// # Arguments
///
/// * `core` - Mutable reference to the core state.
/// * `ftod` - F→D latch snapshot from the previous cycle.
///
/// # Returns
///
/// The D→E latch value; a bubble for bubble input or rejected encodings.
pub fn decode_stage(core: &mut Core, ftod: &FtoD) -> DtoE {
    if ftod.instruction == INSTRUCTION_BUBBLE {
        return DtoE::default();
    }

    let d = decode(ftod.instruction);

    let mut out = DtoE {
        pc: ftod.pc,
        instruction: d.raw,
        opcode: d.opcode,
        rs1: d.rs1,
        rs2: d.rs2,
        rd: d.rd,
        imm: d.imm,
        funct3: d.funct3,
        funct7: d.funct7,
        predicted_taken: ftod.predicted_taken,
        predicted_target: ftod.predicted_target,
        has_prediction: ftod.has_prediction,
        ..DtoE::default()
    };

    match d.opcode {
        opcodes::OP_LUI | opcodes::OP_AUIPC | opcodes::OP_JAL => {
            out.use_rd = true;
        }
        opcodes::OP_JALR => {
            out.use_rs1 = true;
            out.use_rd = true;
        }
        opcodes::OP_IMM => {
            out.use_rs1 = true;
            out.use_rd = true;
        }
        opcodes::OP_REG => {
            out.use_rs1 = true;
            out.use_rs2 = true;
            out.use_rd = true;
        }
        opcodes::OP_BRANCH => {
            out.use_rs1 = true;
            out.use_rs2 = true;
            out.is_branch = true;
        }
        opcodes::OP_LOAD => {
            out.use_rs1 = true;
            out.use_rd = true;
            out.is_mem = true;
            out.mem_op = MemOp::Load;
            out.mem_mask = match d.funct3 {
                load::LB => MemMask::Byte,
                load::LH => MemMask::Half,
                load::LW => MemMask::Word,
                load::LBU => MemMask::ByteU,
                load::LHU => MemMask::HalfU,
                _ => {
                    core.abort(format!(
                        "illegal load width {:#x} at pc {:#010x}",
                        d.funct3, ftod.pc
                    ));
                    return DtoE::default();
                }
            };
        }
        opcodes::OP_STORE => {
            out.use_rs1 = true;
            // The store value rides the third source slot so the
            // forwarding network can track it independently of the
            // address operand.
            out.rs3 = d.rs2;
            out.use_rs3 = true;
            out.is_mem = true;
            out.mem_op = MemOp::Store;
            out.mem_mask = match d.funct3 {
                store::SB => MemMask::Byte,
                store::SH => MemMask::Half,
                store::SW => MemMask::Word,
                _ => {
                    core.abort(format!(
                        "illegal store width {:#x} at pc {:#010x}",
                        d.funct3, ftod.pc
                    ));
                    return DtoE::default();
                }
            };
        }
        opcodes::OP_MISC_MEM => {
            // FENCE: single hart, strictly in-order memory; nothing to do.
        }
        opcodes::OP_SYSTEM => {
            if d.raw.slc(20, 12) == 0 {
                out.is_syscall = true;
            } else {
                core.abort(format!(
                    "unhandled system instruction {:#010x} at pc {:#010x}",
                    d.raw, ftod.pc
                ));
                return DtoE::default();
            }
        }
        _ => {
            core.abort(format!(
                "illegal instruction {:#010x} at pc {:#010x}",
                d.raw, ftod.pc
            ));
            return DtoE::default();
        }
    }

    if out.use_rs1 {
        out.lhs = core.regs.read(out.rs1);
    }
    if out.use_rs2 {
        out.rhs = core.regs.read(out.rs2);
    }
    if out.use_rs3 {
        out.datac = core.regs.read(out.rs3);
    }

    out
}
