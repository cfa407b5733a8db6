//! Five-stage pipeline implementation.
//!
//! This module contains the cycle driver and its supporting pieces:
//! 1. **Hazards:** Forwarding network and load-use detection.
//! 2. **Latches:** Inter-stage value-typed snapshots.
//! 3. **Stages:** Fetch, Decode, Execute, Memory, and Writeback.
//!
//! One call to [`step`] advances the machine by one cycle. Stages run in
//! reverse order (WB, M, E, D, F) against snapshots of the latches taken at
//! the start of the cycle, so every stage observes what its upstream
//! neighbour produced in the previous cycle.

/// Pipeline hazard detection and forwarding logic.
pub mod hazards;

/// Inter-stage pipeline latches.
pub mod latches;

/// Pipeline stage implementations.
pub mod stages;

use crate::common::{MemMask, MemOp};
use crate::core::pipeline::latches::{DtoE, EtoM, FtoD, MtoW};
use crate::core::pipeline::stages::{decode, execute, fetch, memory, writeback};
use crate::core::units::bru::DirectionPredictor;
use crate::core::Core;

/// Syscall arguments captured at the Memory stage, already forwarded.
#[derive(Clone, Copy, Debug)]
pub struct EcallArgs {
    /// Syscall id (x17 / a7).
    pub id: i32,
    /// First argument (x10 / a0).
    pub a0: i32,
    /// Second argument (x11 / a1).
    pub a1: i32,
    /// Third argument (x12 / a2).
    pub a2: i32,
    /// Fourth argument (x13 / a3).
    pub a3: i32,
}

/// Host-side handler invoked when the Memory stage consumes an `ECALL`.
///
/// The handler may drive the core's data port (guest buffer transfers) and
/// set its exit flag. The returned value lands in x10.
pub trait EcallHandler {
    /// Emulates one system call and returns the guest-visible result.
    fn handle_ecall(&mut self, core: &mut Core, args: EcallArgs) -> i32;
}

/// Advances the core by one simulated cycle.
///
/// # Arguments
///
/// * `core` - Mutable reference to the core state.
/// * `handler` - Host-side syscall handler for intercepted `ECALL`s.
pub fn step<H: EcallHandler>(core: &mut Core, handler: &mut H) {
    core.stats.cycles += 1;

    let ftod = core.ftod.clone();
    let mut dtoe = core.dtoe.clone();
    let etom = core.etom.clone();
    let mtow = core.mtow.clone();

    writeback::writeback_stage(core, &mtow);

    let Some(new_mtow) = memory::memory_stage(core, &etom, &mtow, &mut dtoe, handler) else {
        // Data-side wait: M, E, D and F hold, WB has already drained. The
        // frozen E→M entry is resubmitted verbatim next cycle.
        core.stall_dm = true;
        core.stall_signals = [true; 4];
        core.mtow = MtoW::default();
        idle_fetch_port(core);
        return;
    };
    core.stall_dm = false;

    let load_use = hazards::load_use_hazard(&etom, &dtoe);
    core.stall_signals = [load_use, false, false, load_use];

    if load_use {
        // One bubble: the consumer stays in D→E, Execute idles, the load's
        // data becomes forwardable from M→W next cycle.
        core.stats.stalls_data += 1;
        core.mtow = new_mtow;
        core.etom = EtoM::default();
        idle_fetch_port(core);
        return;
    }

    let exec = execute::execute_stage(core, &dtoe, &etom, &mtow);

    if let Some(target) = exec.redirect {
        // Misprediction (or an unconditional jump): the two front-end
        // latches become bubbles, the PC is steered, the squashed pending
        // prediction is withdrawn, then the resolved branch trains the
        // predictor.
        core.mtow = new_mtow;
        core.etom = exec.etom;
        core.dtoe = DtoE::default();
        core.ftod = FtoD::default();
        core.pc = target;

        if ftod.has_prediction {
            core.predictor.undo();
        }
        if let Some((branch_pc, taken)) = exec.branch_update {
            core.predictor.update(branch_pc, taken);
        }

        drain_squashed_fetch(core);
        return;
    }

    if let Some((branch_pc, taken)) = exec.branch_update {
        core.predictor.update(branch_pc, taken);
    }

    let new_dtoe = decode::decode_stage(core, &ftod);
    let new_ftod = fetch::fetch_stage(core);
    core.stall_signals[3] = core.stall_im;

    core.mtow = new_mtow;
    core.etom = exec.etom;
    core.dtoe = new_dtoe;
    core.ftod = new_ftod;
}

/// Commits the final M→W entry after the run loop stops.
pub fn drain_writeback(core: &mut Core) {
    let mtow = core.mtow.clone();
    writeback::writeback_stage(core, &mtow);
    core.mtow = MtoW::default();
}

/// Ticks the I-side port without starting a transaction, holding any
/// in-flight miss sequence in place.
fn idle_fetch_port(core: &mut Core) {
    core.im
        .process(&mut core.dram, core.pc, MemMask::Word, MemOp::None, 0);
}

/// Keeps a squashed in-flight fetch moving to completion; its word is
/// discarded when it arrives. Without a transaction in flight this is an
/// idle tick.
fn drain_squashed_fetch(core: &mut Core) {
    if let Some(addr) = core.fetch_addr {
        let res = core
            .im
            .process(&mut core.dram, addr, MemMask::Word, MemOp::Load, 0);
        if res.wait {
            core.fetch_discard = true;
        } else {
            core.fetch_addr = None;
        }
    } else {
        idle_fetch_port(core);
    }
}
