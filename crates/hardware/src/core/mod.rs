//! CPU core: architectural state and the units attached to it.
//!
//! The `Core` owns everything the pipeline touches each cycle: the program
//! counter, register file, the four pipeline latches, the DRAM image with
//! its two memory ports, the branch predictor, and the statistics counters.

/// Five-stage pipeline implementation.
pub mod pipeline;

/// Functional units (branch prediction).
pub mod units;

use crate::common::constants::DRAM_SIZE;
use crate::common::{MemMask, MemOp, RegisterFile};
use crate::config::Config;
use crate::core::pipeline::latches::{DtoE, EtoM, FtoD, MtoW};
use crate::core::units::bru::PredictorKind;
use crate::mem::{Dram, MemPort};
use crate::stats::SimStats;

/// Architectural and microarchitectural state of the simulated core.
#[derive(Debug)]
pub struct Core {
    /// Program counter of the next instruction to fetch.
    pub pc: u32,
    /// The 32-entry register file.
    pub regs: RegisterFile,

    /// Fetch → Decode latch.
    pub ftod: FtoD,
    /// Decode → Execute latch.
    pub dtoe: DtoE,
    /// Execute → Memory latch.
    pub etom: EtoM,
    /// Memory → Writeback latch.
    pub mtow: MtoW,

    /// Per-stage freeze indicators for the current cycle:
    /// `[0]` decode (the load-use bubble), `[1]` execute, `[2]` memory,
    /// `[3]` fetch.
    pub stall_signals: [bool; 4],
    /// Instruction-side back-pressure (I-cache wait).
    pub stall_im: bool,
    /// Data-side back-pressure (D-cache wait).
    pub stall_dm: bool,

    /// Flat DRAM image shared by both memory ports.
    pub dram: Dram,
    /// Instruction-side memory port.
    pub im: MemPort,
    /// Data-side memory port.
    pub dm: MemPort,

    /// Branch direction predictor.
    pub predictor: PredictorKind,

    /// Simulation statistics.
    pub stats: SimStats,

    /// Set when the run loop must stop (syscall exit or fatal error).
    pub exit_flag: bool,
    /// Diagnostic of the fatal condition that set `exit_flag`, if any.
    pub fatal: Option<String>,

    /// Address of the in-flight instruction fetch, if the I-side port has
    /// not completed it yet. Resubmitted verbatim every cycle.
    pub(crate) fetch_addr: Option<u32>,
    /// The in-flight fetch was squashed; drain it and discard the word.
    pub(crate) fetch_discard: bool,
}

impl Core {
    /// Creates a core with zeroed state and the configured memory topology
    /// and predictor.
    pub fn new(config: &Config) -> Self {
        let dram_size = if config.memory.dram_size == 0 {
            DRAM_SIZE
        } else {
            config.memory.dram_size
        };
        Self {
            pc: 0,
            regs: RegisterFile::new(),
            ftod: FtoD::default(),
            dtoe: DtoE::default(),
            etom: EtoM::default(),
            mtow: MtoW::default(),
            stall_signals: [false; 4],
            stall_im: false,
            stall_dm: false,
            dram: Dram::new(dram_size),
            im: MemPort::new(config.memory.icache),
            dm: MemPort::new(config.memory.dcache),
            predictor: PredictorKind::new(&config.pipeline),
            stats: SimStats::default(),
            exit_flag: false,
            fatal: None,
            fetch_addr: None,
            fetch_discard: false,
        }
    }

    /// Records a fatal condition and stops the run loop.
    pub fn abort(&mut self, diagnostic: String) {
        if self.fatal.is_none() {
            self.fatal = Some(diagnostic);
        }
        self.exit_flag = true;
    }

    /// Loads one byte through the data port, driving it to completion.
    ///
    /// Used by the syscall layer so that guest memory traffic stays coherent
    /// with the D-cache and is visible in its counters.
    pub fn mem_load_byte(&mut self, addr: u32) -> u8 {
        loop {
            let res = self
                .dm
                .process(&mut self.dram, addr, MemMask::ByteU, MemOp::Load, 0);
            if !res.wait {
                return res.data as u8;
            }
        }
    }

    /// Stores one byte through the data port, driving it to completion.
    pub fn mem_store_byte(&mut self, addr: u32, value: u8) {
        loop {
            let res = self.dm.process(
                &mut self.dram,
                addr,
                MemMask::Byte,
                MemOp::Store,
                value as u32,
            );
            if !res.wait {
                return;
            }
        }
    }

    /// Loads a 32-bit word byte by byte, little-endian.
    pub fn mem_load_word(&mut self, addr: u32) -> u32 {
        let mut word = 0u32;
        for i in 0..4 {
            word |= (self.mem_load_byte(addr.wrapping_add(i)) as u32) << (i * 8);
        }
        word
    }

    /// Stores a 32-bit word byte by byte, little-endian.
    pub fn mem_store_word(&mut self, addr: u32, value: u32) {
        for i in 0..4 {
            self.mem_store_byte(addr.wrapping_add(i), (value >> (i * 8)) as u8);
        }
    }

    /// Stores a 64-bit value as two little-endian words.
    pub fn mem_store_dword(&mut self, addr: u32, value: u64) {
        self.mem_store_word(addr, value as u32);
        self.mem_store_word(addr.wrapping_add(4), (value >> 32) as u32);
    }
}
