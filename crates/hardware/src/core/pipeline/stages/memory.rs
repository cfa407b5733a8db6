//! Memory access stage.
//!
//! This module implements the fourth stage of the pipeline. It drives the
//! data-side memory port for loads and stores, resubmitting the access while
//! the cache stalls, and intercepts `ECALL`: syscall arguments are read with
//! M→W forwarding, the host-side handler runs, and the result replaces the
//! produced M→W entry and back-propagates into the in-flight consumer.

use crate::common::bits::BitSlice;
use crate::common::constants::{REG_A0, REG_A1, REG_A2, REG_A3, REG_A7};
use crate::common::{MemMask, MemOp};
use crate::core::pipeline::latches::{DtoE, EtoM, MtoW};
use crate::core::pipeline::{EcallArgs, EcallHandler};
use crate::core::Core;
use crate::isa::opcodes;

/// Executes the memory stage for one cycle.
///
/// # Arguments
///
/// * `core` - Mutable reference to the core state.
/// * `etom` - E→M latch snapshot being consumed.
/// * `mtow` - M→W latch snapshot, used to forward syscall arguments.
/// * `dtoe` - D→E snapshot for the cycle; a syscall result naming x10 is
///   patched into its operand fields before Execute consumes it.
/// * `handler` - Host-side syscall handler.
///
/// # Returns
///
/// The produced M→W latch value, or `None` while the data port stalls the
/// access (the caller freezes the pipeline and resubmits next cycle).
pub fn memory_stage<H: EcallHandler>(
    core: &mut Core,
    etom: &EtoM,
    mtow: &MtoW,
    dtoe: &mut DtoE,
    handler: &mut H,
) -> Option<MtoW> {
    if etom.opcode == opcodes::OP_SYSTEM
        && etom.instruction != 0
        && etom.instruction.slc(20, 12) == 0
    {
        return Some(solve_syscall(core, mtow, dtoe, handler));
    }

    match etom.mem_op {
        MemOp::None => {
            // Keep the port ticking without starting a transaction.
            core.dm
                .process(&mut core.dram, 0, MemMask::Word, MemOp::None, 0);
            if etom.instruction != 0 {
                core.stats.instructions_retired += 1;
            }
            Some(MtoW {
                rd: etom.rd,
                use_rd: etom.use_rd,
                we: etom.we,
                result: etom.result,
            })
        }
        MemOp::Load => {
            let res = core.dm.process(
                &mut core.dram,
                etom.mem_addr,
                etom.mem_mask,
                MemOp::Load,
                0,
            );
            if res.wait {
                core.stats.stalls_mem += 1;
                return None;
            }
            core.stats.instructions_retired += 1;
            Some(MtoW {
                rd: etom.rd,
                use_rd: etom.use_rd,
                we: etom.we,
                result: res.data as i32,
            })
        }
        MemOp::Store => {
            let res = core.dm.process(
                &mut core.dram,
                etom.mem_addr,
                etom.mem_mask,
                MemOp::Store,
                etom.mem_value,
            );
            if res.wait {
                core.stats.stalls_mem += 1;
                return None;
            }
            core.stats.instructions_retired += 1;
            Some(MtoW {
                rd: etom.rd,
                use_rd: etom.use_rd,
                we: etom.we,
                result: etom.result,
            })
        }
    }
}

/// Gathers syscall arguments, runs the handler, and spreads the result.
fn solve_syscall<H: EcallHandler>(
    core: &mut Core,
    mtow: &MtoW,
    dtoe: &mut DtoE,
    handler: &mut H,
) -> MtoW {
    // Argument registers may still be in flight in M→W; forward them the
    // same way Execute would.
    let read_arg = |core: &Core, reg: usize| -> i32 {
        if mtow.use_rd && mtow.we && mtow.rd == reg {
            mtow.result
        } else {
            core.regs.read(reg)
        }
    };

    let args = EcallArgs {
        id: read_arg(core, REG_A7),
        a0: read_arg(core, REG_A0),
        a1: read_arg(core, REG_A1),
        a2: read_arg(core, REG_A2),
        a3: read_arg(core, REG_A3),
    };

    let result = handler.handle_ecall(core, args);
    core.stats.instructions_retired += 1;

    // The consumer right behind the ECALL reads x10 through its latched
    // operands, which predate the syscall; patch them in place.
    if dtoe.use_rs1 && dtoe.rs1 == REG_A0 {
        dtoe.lhs = result;
    }
    if dtoe.use_rs2 && dtoe.rs2 == REG_A0 {
        dtoe.rhs = result;
    }
    if dtoe.use_rs3 && dtoe.rs3 == REG_A0 {
        dtoe.datac = result;
    }

    MtoW {
        rd: REG_A0,
        use_rd: true,
        we: true,
        result,
    }
}
