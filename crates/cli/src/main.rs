//! RV32I pipeline simulator CLI.
//!
//! Loads a statically linked RISC-V ELF executable, runs it to completion
//! on the simulated core, and reports statistics. Exit code 0 on normal
//! guest termination, nonzero on any fatal error.

use std::fs;
use std::path::PathBuf;
use std::process;

use clap::Parser;

use rv32_core::sim::simulator::{Simulator, SimulatorOptions};
use rv32_core::Config;

#[derive(Parser, Debug)]
#[command(
    name = "rv32sim",
    author,
    version,
    about = "Cycle-level RV32I five-stage pipeline simulator",
    long_about = "Runs a statically linked RISC-V (RV32I) ELF executable on a \
                  cycle-level model of a five-stage in-order pipeline with \
                  instruction and data caches and a branch predictor. A curated \
                  subset of Linux syscalls is emulated against the host."
)]
struct Cli {
    /// RISC-V program binary file (ELF).
    #[arg(short, long)]
    file: PathBuf,

    /// Input file used as standard input of the running program.
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output file used as standard output of the running program.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Trace file for per-cycle simulator output.
    #[arg(short = 't', long = "trace-file")]
    trace_file: Option<PathBuf>,

    /// Command line arguments for the binary program (repeatable).
    #[arg(short = 'a', long = "program-args")]
    program_args: Vec<String>,

    /// Signature file for compliance testing.
    #[arg(short = 's', long = "signature-output")]
    signature_output: Option<PathBuf>,

    /// JSON configuration overriding the built-in defaults.
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    let config = match cli.config {
        Some(path) => {
            let text = fs::read_to_string(&path).unwrap_or_else(|e| {
                eprintln!("error: cannot read config '{}': {}", path.display(), e);
                process::exit(1);
            });
            serde_json::from_str::<Config>(&text).unwrap_or_else(|e| {
                eprintln!("error: invalid config '{}': {}", path.display(), e);
                process::exit(1);
            })
        }
        None => Config::default(),
    };

    let options = SimulatorOptions {
        binary: cli.file,
        program_args: cli.program_args,
        input: cli.input,
        output: cli.output,
        trace_file: cli.trace_file,
        signature_file: cli.signature_output,
    };

    let mut sim = match Simulator::new(&config, options) {
        Ok(sim) => sim,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    };

    match sim.run() {
        Ok(()) => {
            sim.print_stats();
        }
        Err(e) => {
            eprintln!("error: {}", e);
            sim.print_stats();
            process::exit(1);
        }
    }
}
