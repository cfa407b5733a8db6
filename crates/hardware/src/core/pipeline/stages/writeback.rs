//! Writeback stage.
//!
//! Commits the M→W latch to the register file. Runs first in the cycle so
//! the decode stage reads a register file that already reflects the
//! instruction three ahead of it.

use crate::core::pipeline::latches::MtoW;
use crate::core::Core;

/// Executes the writeback stage for one cycle.
///
/// # Arguments
///
/// * `core` - Mutable reference to the core state.
/// * `mtow` - M→W latch snapshot to commit.
pub fn writeback_stage(core: &mut Core, mtow: &MtoW) {
    if mtow.use_rd && mtow.we {
        core.regs.write(mtow.rd, mtow.result);
    }
}
