//! Data hazard detection and forwarding.
//!
//! This module implements the logic for maintaining pipeline consistency when
//! data dependencies exist between in-flight instructions. It provides:
//! 1. **Operand Forwarding:** Resolves read-after-write hazards by bypassing
//!    the register file with the freshest in-flight producer.
//! 2. **Hazard Detection:** Identifies the load-use case that forwarding
//!    cannot cover and therefore requires a one-cycle bubble.

use crate::common::MemOp;
use crate::core::pipeline::latches::{DtoE, EtoM, MtoW};

/// Selects the freshest available value for one source register.
///
/// Producers are considered newest first: the E→M latch (one instruction
/// ahead, unless it is a load whose data has not arrived), then the M→W
/// latch (two ahead), then the value read from the register file at decode.
/// Register x0 never forwards.
///
/// # Arguments
///
/// * `used` - Whether the source slot is live.
/// * `reg` - Source register index.
/// * `latched` - Register-file value captured at decode.
/// * `etom` - E→M latch snapshot.
/// * `mtow` - M→W latch snapshot.
///
/// # Returns
///
/// The operand value the execute stage must use.
pub fn forward(used: bool, reg: usize, latched: i32, etom: &EtoM, mtow: &MtoW) -> i32 {
    if !used || reg == 0 {
        return latched;
    }
    if etom.use_rd && etom.we && etom.rd == reg && etom.mem_op != MemOp::Load {
        return etom.result;
    }
    if mtow.use_rd && mtow.we && mtow.rd == reg {
        return mtow.result;
    }
    latched
}

/// Checks whether a load-use stall is needed this cycle.
///
/// A load whose data arrives at the end of the Memory stage cannot forward
/// from E→M. When the instruction about to execute consumes the load's
/// destination, the front end holds for one cycle and the Execute stage
/// receives a bubble; the consumer then picks the data up from M→W.
///
/// # Arguments
///
/// * `etom` - E→M latch snapshot (the potential load producer).
/// * `dtoe` - D→E latch snapshot (the potential consumer).
///
/// # Returns
///
/// `true` if exactly one bubble must be injected.
pub fn load_use_hazard(etom: &EtoM, dtoe: &DtoE) -> bool {
    if etom.mem_op != MemOp::Load || !etom.use_rd || etom.rd == 0 {
        return false;
    }
    (dtoe.use_rs1 && dtoe.rs1 == etom.rd)
        || (dtoe.use_rs2 && dtoe.rs2 == etom.rd)
        || (dtoe.use_rs3 && dtoe.rs3 == etom.rd)
}
