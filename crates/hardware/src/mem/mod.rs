//! Memory system.
//!
//! This module implements the memory hierarchy behind the per-cycle memory
//! interface contract:
//! 1. **DRAM:** A flat little-endian backing store that completes in one cycle.
//! 2. **Cache:** A set-associative write-back cache with a multi-cycle miss FSM.
//! 3. **Ports:** A static-dispatch wrapper presenting both as one device type.
//!
//! The contract is a single operation `process(addr, mask, op, data_in)`
//! driven once per simulated cycle. A device may answer with `wait = true`,
//! in which case the caller must resubmit identical arguments every cycle
//! until the access completes.

/// Set-associative write-back cache with per-access miss state machine.
pub mod cache;

/// Flat DRAM backing store.
pub mod dram;

pub use cache::CacheMemory;
pub use dram::Dram;

use crate::common::{MemMask, MemOp};

/// Result of driving a memory device for one cycle.
#[derive(Clone, Copy, Debug)]
pub struct MemResult {
    /// Load data, valid in the cycle where `wait` is false. Stores return 0.
    pub data: u32,
    /// True while the device needs the access resubmitted.
    pub wait: bool,
}

/// One side (instruction or data) of the core's memory system.
///
/// An enum rather than a trait object keeps `process` monomorphic in the
/// cycle loop.
#[derive(Debug)]
pub enum MemPort {
    /// Accesses go straight to DRAM and complete in one cycle.
    Direct,
    /// Accesses go through a write-back cache backed by DRAM.
    Cached(CacheMemory),
}

impl MemPort {
    /// Creates a port, cached or direct.
    pub fn new(cached: bool) -> Self {
        if cached {
            Self::Cached(CacheMemory::new())
        } else {
            Self::Direct
        }
    }

    /// Drives the port for one cycle against the backing DRAM.
    ///
    /// # Arguments
    ///
    /// * `dram` - Backing store used as the next memory level.
    /// * `addr` - Byte address of the access.
    /// * `mask` - Width and sign policy of the access.
    /// * `op` - Load, store, or none (advance internal state only).
    /// * `data_in` - Store data, ignored for loads.
    pub fn process(
        &mut self,
        dram: &mut Dram,
        addr: u32,
        mask: MemMask,
        op: MemOp,
        data_in: u32,
    ) -> MemResult {
        match self {
            Self::Direct => MemResult {
                data: dram.process(addr, mask, op, data_in),
                wait: false,
            },
            Self::Cached(cache) => cache.process(dram, addr, mask, op, data_in),
        }
    }

    /// Number of accesses observed by the cache, 0 for a direct port.
    pub fn accesses(&self) -> u64 {
        match self {
            Self::Direct => 0,
            Self::Cached(cache) => cache.accesses,
        }
    }

    /// Number of misses observed by the cache, 0 for a direct port.
    pub fn misses(&self) -> u64 {
        match self {
            Self::Direct => 0,
            Self::Cached(cache) => cache.misses,
        }
    }
}
