//! Saturating bit-counter branch predictor.
//!
//! A table of n-bit saturating counters indexed by low PC bits. The counter
//! range splits in two halves: the lower half predicts taken, the upper half
//! predicts not-taken. Counters start at the strongly-taken end, move toward
//! taken on an actual taken branch and away from it otherwise.

use super::DirectionPredictor;
use crate::config::BitCounterConfig;

/// Bit-counter predictor state.
#[derive(Debug)]
pub struct BitCounterPredictor {
    /// Counter table; entry count is a power of two.
    table: Vec<u8>,
    /// Index mask over `pc >> 2`.
    index_mask: u32,
    /// Largest counter value predicting taken.
    taken_final: u8,
    /// Saturation value at the not-taken end.
    not_taken_start: u8,
    /// Predictions made but not yet retired or squashed.
    pending: usize,
}

impl BitCounterPredictor {
    /// Creates a predictor with all counters at the strongly-taken value.
    pub fn new(config: &BitCounterConfig) -> Self {
        let entries = config.entries.next_power_of_two();
        let not_taken_start = ((1u32 << config.bits) - 1) as u8;
        Self {
            table: vec![0; entries],
            index_mask: (entries - 1) as u32,
            taken_final: ((1u32 << config.bits) / 2 - 1) as u8,
            not_taken_start,
            pending: 0,
        }
    }

    /// Table index of `pc`: word-aligned PC bits above the alignment bits.
    #[inline]
    fn index(&self, pc: u32) -> usize {
        ((pc >> 2) & self.index_mask) as usize
    }

    /// Predictions currently in flight.
    pub fn in_flight(&self) -> usize {
        self.pending
    }
}

impl DirectionPredictor for BitCounterPredictor {
    /// Predicts taken while the counter sits in the lower half of its range.
    fn predict(&mut self, pc: u32) -> bool {
        self.pending += 1;
        self.table[self.index(pc)] <= self.taken_final
    }

    /// Saturating move toward 0 on taken, toward the top on not-taken.
    fn update(&mut self, pc: u32, taken: bool) {
        self.pending = self.pending.saturating_sub(1);
        let idx = self.index(pc);
        if taken {
            if self.table[idx] != 0 {
                self.table[idx] -= 1;
            }
        } else if self.table[idx] != self.not_taken_start {
            self.table[idx] += 1;
        }
    }

    /// Prediction is a pure table read, so only the bookkeeping reverses.
    fn undo(&mut self) {
        self.pending = self.pending.saturating_sub(1);
    }
}
