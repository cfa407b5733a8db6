//! Instruction fetch stage.
//!
//! Drives the instruction-side memory port with the current fetch address
//! and, once the word arrives, consults the branch predictor to pick the
//! next PC. While the port reports `wait`, the stage emits bubbles and holds
//! the PC; the same address is resubmitted every cycle so the cache miss
//! sequence runs to completion, even when the fetch has been squashed in
//! the meantime.

use crate::common::constants::OPCODE_MASK;
use crate::common::{MemMask, MemOp};
use crate::core::pipeline::latches::FtoD;
use crate::core::units::bru::DirectionPredictor;
use crate::core::Core;
use crate::isa::decode;
use crate::isa::opcodes;

/// Executes the fetch stage for one cycle.
///
/// # Arguments
///
/// * `core` - Mutable reference to the core state.
///
/// # Returns
///
/// The F→D latch value for this cycle; a bubble while the I-side port
/// stalls or when a squashed fetch completes.
///
/// # Behavior
///
/// - Issues the I-side access for the in-flight address, or starts one at
///   the current PC.
/// - On a predicted-taken conditional branch, the next PC becomes
///   `pc + B-imm`, computed directly from the instruction word; otherwise
///   `pc + 4`.
/// - Records the prediction in the latch so Execute can resolve it and the
///   squash path can withdraw it.
pub fn fetch_stage(core: &mut Core) -> FtoD {
    let addr = core.fetch_addr.unwrap_or(core.pc);
    let res = core
        .im
        .process(&mut core.dram, addr, MemMask::Word, MemOp::Load, 0);

    if res.wait {
        core.fetch_addr = Some(addr);
        core.stall_im = true;
        core.stats.stalls_mem += 1;
        return FtoD::default();
    }
    core.fetch_addr = None;
    core.stall_im = false;

    if core.fetch_discard {
        // The transaction belonged to a squashed fetch; the word is dropped
        // and the next cycle starts fetching the redirected PC.
        core.fetch_discard = false;
        return FtoD::default();
    }

    let instruction = res.data;
    let mut out = FtoD {
        pc: addr,
        instruction,
        ..FtoD::default()
    };

    if instruction & OPCODE_MASK == opcodes::OP_BRANCH {
        let taken = core.predictor.predict(addr);
        let target = addr.wrapping_add(decode::branch_offset(instruction) as u32);
        out.predicted_taken = taken;
        out.predicted_target = target;
        out.has_prediction = true;
        core.pc = if taken { target } else { addr.wrapping_add(4) };
    } else {
        core.pc = addr.wrapping_add(4);
    }

    out
}
