//! Memory access types.
//!
//! This module defines the classification of memory accesses used by the
//! memory interface contract:
//! 1. **Masks:** Width and sign-extension policy of a load, or the byte window of a store.
//! 2. **Operations:** Whether a cycle starts a load, a store, or merely advances state.

/// Width and sign-extension policy of a memory access.
///
/// For loads, the mask selects how many bytes are returned and whether the
/// value is sign- or zero-extended to 32 bits. For stores, it selects the
/// byte window that is overwritten inside the addressed word.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum MemMask {
    /// One byte, sign-extended on load.
    Byte,
    /// One byte, zero-extended on load.
    ByteU,
    /// Two bytes, sign-extended on load.
    Half,
    /// Two bytes, zero-extended on load.
    HalfU,
    /// Full 32-bit word.
    #[default]
    Word,
}

/// Operation requested from a memory device for one cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum MemOp {
    /// Advance internal state only; do not start a new transaction.
    #[default]
    None,
    /// Read under the access mask.
    Load,
    /// Write under the access mask.
    Store,
}
