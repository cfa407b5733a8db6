//! Execute stage.
//!
//! This module implements the third stage of the pipeline. It performs:
//! 1. **Operand Resolution:** Forwarding from the freshest in-flight producer.
//! 2. **Arithmetic Execution:** ALU evaluation for every RV32I instruction class.
//! 3. **Branch Resolution:** Compares the actual outcome with the carried
//!    prediction and requests a front-end redirect on disagreement.

use crate::common::constants::INSTRUCTION_BUBBLE;
use crate::common::MemOp;
use crate::core::pipeline::hazards::forward;
use crate::core::pipeline::latches::{DtoE, EtoM, MtoW};
use crate::core::Core;
use crate::isa::opcodes::{self, alu, branch, FUNCT7_ALT};

/// Result of the execute stage for one cycle.
#[derive(Default)]
pub struct ExecuteResult {
    /// The E→M latch value.
    pub etom: EtoM,
    /// Correct next PC when the front end must be squashed and steered.
    pub redirect: Option<u32>,
    /// `(branch_pc, taken)` of a resolved conditional branch, to be handed
    /// to the predictor after any squash bookkeeping.
    pub branch_update: Option<(u32, bool)>,
}

/// Executes the execute stage for one cycle.
///
/// # Arguments
///
/// * `core` - Mutable reference to the core state.
/// * `dtoe` - D→E latch snapshot (possibly patched by the syscall layer).
/// * `etom` - E→M latch snapshot, forwarding source.
/// * `mtow` - M→W latch snapshot, forwarding source.
pub fn execute_stage(core: &mut Core, dtoe: &DtoE, etom: &EtoM, mtow: &MtoW) -> ExecuteResult {
    if dtoe.instruction == INSTRUCTION_BUBBLE {
        return ExecuteResult::default();
    }

    let lhs = forward(dtoe.use_rs1, dtoe.rs1, dtoe.lhs, etom, mtow);
    let rhs = forward(dtoe.use_rs2, dtoe.rs2, dtoe.rhs, etom, mtow);
    let datac = forward(dtoe.use_rs3, dtoe.rs3, dtoe.datac, etom, mtow);

    let mut out = ExecuteResult {
        etom: EtoM {
            pc: dtoe.pc,
            opcode: dtoe.opcode,
            instruction: dtoe.instruction,
            rd: dtoe.rd,
            mem_mask: dtoe.mem_mask,
            ..EtoM::default()
        },
        ..ExecuteResult::default()
    };

    let link = dtoe.pc.wrapping_add(4) as i32;

    match dtoe.opcode {
        opcodes::OP_LUI => {
            out.etom.result = dtoe.imm;
            write_rd(&mut out.etom);
        }
        opcodes::OP_AUIPC => {
            out.etom.result = (dtoe.pc as i32).wrapping_add(dtoe.imm);
            write_rd(&mut out.etom);
        }
        opcodes::OP_JAL => {
            out.etom.result = link;
            write_rd(&mut out.etom);
            // Fetch never predicts jumps; Execute always redirects them.
            out.redirect = Some(dtoe.pc.wrapping_add(dtoe.imm as u32));
        }
        opcodes::OP_JALR => {
            out.etom.result = link;
            write_rd(&mut out.etom);
            out.redirect = Some((lhs.wrapping_add(dtoe.imm) as u32) & !1);
        }
        opcodes::OP_BRANCH => {
            let Some(taken) = branch_taken(dtoe.funct3, lhs, rhs) else {
                core.abort(format!(
                    "illegal branch condition {:#x} at pc {:#010x}",
                    dtoe.funct3, dtoe.pc
                ));
                return ExecuteResult::default();
            };
            let target = dtoe.pc.wrapping_add(dtoe.imm as u32);
            let fallthrough = dtoe.pc.wrapping_add(4);
            let actual_next = if taken { target } else { fallthrough };
            let predicted_next = if dtoe.predicted_taken {
                dtoe.predicted_target
            } else {
                fallthrough
            };

            core.stats.branch_predictions += 1;
            if actual_next != predicted_next {
                core.stats.branch_mispredictions += 1;
                out.redirect = Some(actual_next);
            }
            out.branch_update = Some((dtoe.pc, taken));
        }
        opcodes::OP_LOAD => {
            out.etom.mem_addr = lhs.wrapping_add(dtoe.imm) as u32;
            out.etom.mem_op = MemOp::Load;
            write_rd(&mut out.etom);
        }
        opcodes::OP_STORE => {
            out.etom.mem_addr = lhs.wrapping_add(dtoe.imm) as u32;
            out.etom.mem_value = datac as u32;
            out.etom.mem_op = MemOp::Store;
        }
        opcodes::OP_IMM => {
            let alt = dtoe.funct3 == alu::SRL_SRA && dtoe.funct7 & FUNCT7_ALT != 0;
            out.etom.result = alu_op(dtoe.funct3, alt, lhs, dtoe.imm);
            write_rd(&mut out.etom);
        }
        opcodes::OP_REG => {
            let alt = dtoe.funct7 & FUNCT7_ALT != 0;
            out.etom.result = alu_op(dtoe.funct3, alt, lhs, rhs);
            write_rd(&mut out.etom);
        }
        opcodes::OP_MISC_MEM | opcodes::OP_SYSTEM => {
            // FENCE is a no-op here; ECALL is intercepted at the Memory stage.
        }
        _ => unreachable!("decode rejects unknown opcodes"),
    }

    out
}

/// Marks the produced entry as a register write.
fn write_rd(etom: &mut EtoM) {
    etom.use_rd = true;
    etom.we = true;
}

/// Shared ALU for `OP_IMM` and `OP_REG`.
fn alu_op(funct3: u32, alt: bool, a: i32, b: i32) -> i32 {
    match funct3 {
        alu::ADD_SUB => {
            if alt {
                a.wrapping_sub(b)
            } else {
                a.wrapping_add(b)
            }
        }
        alu::SLL => a.wrapping_shl(b as u32 & 31),
        alu::SLT => (a < b) as i32,
        alu::SLTU => ((a as u32) < (b as u32)) as i32,
        alu::XOR => a ^ b,
        alu::SRL_SRA => {
            let shamt = b as u32 & 31;
            if alt {
                a.wrapping_shr(shamt)
            } else {
                ((a as u32) >> shamt) as i32
            }
        }
        alu::OR => a | b,
        alu::AND => a & b,
        _ => unreachable!("funct3 is three bits"),
    }
}

/// Evaluates a conditional branch; `None` for the two reserved encodings.
fn branch_taken(funct3: u32, lhs: i32, rhs: i32) -> Option<bool> {
    match funct3 {
        branch::BEQ => Some(lhs == rhs),
        branch::BNE => Some(lhs != rhs),
        branch::BLT => Some(lhs < rhs),
        branch::BGE => Some(lhs >= rhs),
        branch::BLTU => Some((lhs as u32) < (rhs as u32)),
        branch::BGEU => Some((lhs as u32) >= (rhs as u32)),
        _ => None,
    }
}
