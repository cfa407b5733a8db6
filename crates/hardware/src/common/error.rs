//! Error types for the simulator library.
//!
//! Fatal conditions (malformed ELF, unimplemented or unknown syscalls,
//! ISA-level errors) surface as `SimError` from the public API after the run
//! loop stops. Guest-visible syscall failures are returned to the guest as
//! negative results and never appear here.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the simulator.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("failed to load ELF file: {0}")]
    ElfLoad(#[from] ElfError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    /// Simulation aborted by the syscall layer or an ISA-level error.
    #[error("{0}")]
    Fatal(String),
}

/// Errors related to ELF file loading.
#[derive(Error, Debug)]
pub enum ElfError {
    #[error("failed to read ELF file '{0}': {1}")]
    FileRead(PathBuf, #[source] std::io::Error),

    #[error("failed to parse ELF file '{0}': {1}")]
    Parse(PathBuf, String),

    #[error("invalid ELF machine type: {0}")]
    InvalidMachine(u16),

    #[error("section data out of file bounds")]
    Truncated,

    #[error("required symbol '{0}' not found")]
    MissingSymbol(&'static str),
}

/// Type alias for Result with SimError.
pub type SimResult<T> = Result<T, SimError>;
