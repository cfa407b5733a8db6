//! Top-level simulator and run loop.
//!
//! Owns the core and the host-side syscall state, loads the executable,
//! materialises argc/argv, drives the cycle loop until the exit flag rises,
//! and emits the per-cycle trace and the compliance signature.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use crate::common::constants::{REG_SP, STACK_INIT};
use crate::common::error::{ElfError, SimError, SimResult};
use crate::config::Config;
use crate::core::{pipeline, Core};
use crate::mem::Dram;
use crate::sim::loader;
use crate::sim::syscall::SyscallHost;

/// Host-side file plumbing for one simulation.
#[derive(Clone, Debug, Default)]
pub struct SimulatorOptions {
    /// Path of the RISC-V ELF executable.
    pub binary: PathBuf,
    /// Arguments passed to the guest as `argv[1..]`.
    pub program_args: Vec<String>,
    /// Redirect for guest stdin.
    pub input: Option<PathBuf>,
    /// Redirect for guest stdout.
    pub output: Option<PathBuf>,
    /// Per-cycle trace destination.
    pub trace_file: Option<PathBuf>,
    /// Compliance signature destination.
    pub signature_file: Option<PathBuf>,
}

/// The simulator: core state plus host-side context.
#[derive(Debug)]
pub struct Simulator {
    /// The simulated core.
    pub core: Core,
    host: SyscallHost,
    trace: Option<BufWriter<File>>,
    trace_stderr: bool,
    signature: Option<(PathBuf, u32, u32)>,
}

impl Simulator {
    /// Builds a simulator: loads the ELF, marshals argv, opens host files.
    ///
    /// # Arguments
    ///
    /// * `config` - Hardware configuration.
    /// * `options` - Host file plumbing and guest arguments.
    ///
    /// # Errors
    ///
    /// Fails when the ELF is missing or malformed, when a redirect file
    /// cannot be opened, or when a signature dump is requested from a
    /// binary without signature symbols.
    pub fn new(config: &Config, options: SimulatorOptions) -> SimResult<Self> {
        let mut core = Core::new(config);

        let loaded = loader::load_elf(&mut core.dram, &options.binary)?;
        core.pc = loaded.entry;

        let mut args = vec![options.binary.display().to_string()];
        args.extend(options.program_args.iter().cloned());
        push_args_on_stack(&mut core.dram, &args);
        core.regs.write(REG_SP, STACK_INIT as i32);

        let input = options.input.as_ref().map(File::open).transpose()?;
        let output = options.output.as_ref().map(File::create).transpose()?;
        let trace = options
            .trace_file
            .as_ref()
            .map(|p| File::create(p).map(BufWriter::new))
            .transpose()?;

        let signature = match options.signature_file {
            Some(path) => {
                let begin = loaded
                    .begin_signature
                    .ok_or(ElfError::MissingSymbol("begin_signature"))?;
                let end = loaded
                    .end_signature
                    .ok_or(ElfError::MissingSymbol("end_signature"))?;
                Some((path, begin, end))
            }
            None => None,
        };

        Ok(Self {
            core,
            host: SyscallHost::new(input, output, loaded.heap_top),
            trace,
            trace_stderr: config.general.trace_instructions,
            signature,
        })
    }

    /// Runs the simulation to completion.
    ///
    /// Advances one cycle per iteration until the exit flag rises, drains
    /// the writeback stage, and dumps the signature. Fatal conditions
    /// raised by the syscall layer or the pipeline surface as `Err` after
    /// the loop stops.
    pub fn run(&mut self) -> SimResult<()> {
        while !self.core.exit_flag {
            pipeline::step(&mut self.core, &mut self.host);
            self.trace_cycle()?;
        }
        pipeline::drain_writeback(&mut self.core);

        self.dump_signature()?;
        self.host.flush()?;

        let fatal = self.core.fatal.take();
        if let Some(w) = &mut self.trace {
            if let Some(diag) = &fatal {
                writeln!(w, "FATAL: {}", diag)?;
            }
            w.flush()?;
        }
        match fatal {
            Some(diag) => Err(SimError::Fatal(diag)),
            None => Ok(()),
        }
    }

    /// Prints end-of-run statistics to stderr.
    pub fn print_stats(&self) {
        let mut stats = self.core.stats.clone();
        stats.icache_accesses = self.core.im.accesses();
        stats.icache_misses = self.core.im.misses();
        stats.dcache_accesses = self.core.dm.accesses();
        stats.dcache_misses = self.core.dm.misses();
        stats.print();
    }

    /// Writes one trace line for the instruction sitting in F→D.
    fn trace_cycle(&mut self) -> SimResult<()> {
        if self.trace.is_none() && !self.trace_stderr {
            return Ok(());
        }
        let stalled = self.core.stall_signals[0] || self.core.stall_im || self.core.stall_dm;
        if stalled || self.core.ftod.instruction == 0 {
            return Ok(());
        }
        if let Some(w) = &mut self.trace {
            writeln!(
                w,
                "cycle {:>10}  pc {:08x}  instr {:08x}",
                self.core.stats.cycles, self.core.ftod.pc, self.core.ftod.instruction
            )?;
        }
        if self.trace_stderr {
            eprintln!(
                "cycle {:>10}  pc {:08x}  instr {:08x}",
                self.core.stats.cycles, self.core.ftod.pc, self.core.ftod.instruction
            );
        }
        Ok(())
    }

    /// Dumps the compliance signature region, one word per line.
    fn dump_signature(&mut self) -> SimResult<()> {
        let Some((path, begin, end)) = self.signature.clone() else {
            return Ok(());
        };
        // Align to the lower multiple of 4 so partially aligned regions
        // dump whole words.
        let offset = begin % 4;
        let mut file = BufWriter::new(File::create(path)?);
        let mut addr = begin - offset;
        while addr < end - offset {
            let word = self.core.mem_load_word(addr);
            writeln!(file, "{:08x}", word)?;
            addr += 4;
        }
        file.flush()?;
        Ok(())
    }
}

/// Materialises argc, the argv pointer array, and the argument strings at
/// the stack base.
fn push_args_on_stack(dram: &mut Dram, args: &[String]) {
    let argc = args.len() as u32;
    dram.write_word(STACK_INIT, argc);

    let mut string_addr = STACK_INIT + 4 + 4 * argc;
    for (i, arg) in args.iter().enumerate() {
        dram.write_word(STACK_INIT + 4 + 4 * i as u32, string_addr);
        for byte in arg.as_bytes() {
            dram.write_byte(string_addr, *byte);
            string_addr += 1;
        }
        dram.write_byte(string_addr, 0);
        string_addr += 1;
    }
}
