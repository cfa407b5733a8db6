//! Set-associative write-back cache.
//!
//! Serves the per-cycle memory interface in front of DRAM. Hits complete in
//! the same cycle. A miss runs a small state machine over the following
//! cycles while the caller resubmits the access:
//!
//! - state 10: capture the victim line, start the write-back
//! - states 10..=7: write the four victim words to the next level
//!   (idle ticks when the victim is invalid)
//! - states 6..=3: fetch the four words of the new line
//! - state 2: final fetched word settles
//! - state 1: commit — apply a pending store, install the line, answer
//!
//! Replacement is least-recently-used: each way carries an age that is
//! cleared when the way is touched and grows as its neighbours are touched;
//! the victim is the oldest way, so it is never the most recently used one.

use crate::common::bits::BitSlice;
use crate::common::{MemMask, MemOp};
use crate::mem::dram::{extract, splice};
use crate::mem::{Dram, MemResult};

/// Cache line size in bytes.
pub const LINE_SIZE: usize = 16;
/// log2 of the line size.
pub const LOG_LINE_SIZE: u32 = 4;
/// Number of sets.
pub const SET_COUNT: usize = 64;
/// log2 of the set count.
pub const LOG_SET_COUNT: u32 = 6;
/// Associativity (ways per set).
pub const WAYS: usize = 4;
/// Words per cache line.
pub const WORDS_PER_LINE: usize = LINE_SIZE / 4;
/// Bit position where the tag begins.
pub const TAG_SHIFT: u32 = LOG_LINE_SIZE + LOG_SET_COUNT;

/// FSM state that starts a miss sequence.
const STATE_MISS_BEGIN: u32 = 10;
/// Lowest FSM state of the write-back phase.
const STATE_EVICT_LOW: u32 = 7;
/// Lowest FSM state of the line-fetch phase.
const STATE_FETCH_LOW: u32 = 2;

/// One way of a set: tag, line data, validity, and replacement age.
#[derive(Clone, Debug, Default)]
struct Line {
    tag: u32,
    data: [u32; WORDS_PER_LINE],
    valid: bool,
    age: u32,
}

/// The cache: line array, miss-sequence scratch state, and counters.
#[derive(Debug)]
pub struct CacheMemory {
    /// Flattened line array; way `w` of set `s` lives at `s * WAYS + w`.
    lines: Vec<Line>,

    /// Miss FSM state; 0 means idle/lookup.
    state: u32,
    /// Way chosen for replacement, captured at miss begin.
    victim_way: usize,
    /// Victim line captured at miss begin, written back word by word.
    old_line: Line,
    /// Replacement line being composed from next-level fetches.
    new_line: Line,

    /// Next-level request, held across cycles.
    next_addr: u32,
    next_op: MemOp,
    next_data: u32,
    /// Next-level response from the previous cycle.
    next_out: u32,

    /// Total accesses observed (counted once per transaction).
    pub accesses: u64,
    /// Total misses observed.
    pub misses: u64,
}

impl Default for CacheMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheMemory {
    /// Creates an empty cache with all lines invalid.
    pub fn new() -> Self {
        Self {
            lines: vec![Line::default(); SET_COUNT * WAYS],
            state: 0,
            victim_way: 0,
            old_line: Line::default(),
            new_line: Line::default(),
            next_addr: 0,
            next_op: MemOp::None,
            next_data: 0,
            next_out: 0,
            accesses: 0,
            misses: 0,
        }
    }

    /// Refreshes the replacement age of `way` in `set`.
    fn touch(&mut self, set: usize, way: usize) {
        let base = set * WAYS;
        for w in 0..WAYS {
            if w == way {
                self.lines[base + w].age = 0;
            } else {
                self.lines[base + w].age = self.lines[base + w].age.saturating_add(1);
            }
        }
    }

    /// Chooses the replacement victim for `set`: an invalid way if one
    /// exists, otherwise the oldest way.
    fn choose_victim(&self, set: usize) -> usize {
        let base = set * WAYS;
        let mut victim = 0;
        let mut oldest = 0;
        for w in 0..WAYS {
            let line = &self.lines[base + w];
            if !line.valid {
                return w;
            }
            if line.age >= oldest {
                oldest = line.age;
                victim = w;
            }
        }
        victim
    }

    /// Drives the cache for one cycle.
    ///
    /// The caller must resubmit identical arguments every cycle until `wait`
    /// comes back false; in that same cycle `data` carries the load result
    /// (0 for stores).
    ///
    /// # Arguments
    ///
    /// * `next` - The next memory level (DRAM), driven once per cycle.
    /// * `addr` - Byte address of the access.
    /// * `mask` - Width and sign policy.
    /// * `op` - Load, store, or none. `None` holds the state machine.
    /// * `data_in` - Store data, ignored for loads.
    pub fn process(
        &mut self,
        next: &mut Dram,
        addr: u32,
        mask: MemMask,
        op: MemOp,
        data_in: u32,
    ) -> MemResult {
        let set = addr.slc(LOG_LINE_SIZE, LOG_SET_COUNT) as usize;
        let tag = addr >> TAG_SHIFT;
        let word_in_line = addr.slc(2, LOG_LINE_SIZE - 2) as usize;

        let mut data_out = 0;

        if op != MemOp::None {
            if self.state == 0 {
                self.accesses += 1;

                let base = set * WAYS;
                let hit_way = (0..WAYS)
                    .find(|&w| self.lines[base + w].valid && self.lines[base + w].tag == tag);

                if let Some(way) = hit_way {
                    match op {
                        MemOp::Store => {
                            splice(
                                &mut self.lines[base + way].data[word_in_line],
                                addr,
                                mask,
                                data_in,
                            );
                        }
                        MemOp::Load => {
                            data_out = extract(self.lines[base + way].data[word_in_line], addr, mask);
                        }
                        MemOp::None => unreachable!(),
                    }
                    self.touch(set, way);
                } else {
                    self.misses += 1;
                    self.state = STATE_MISS_BEGIN;
                }
            } else {
                if self.state == STATE_MISS_BEGIN {
                    self.victim_way = self.choose_victim(set);
                    self.old_line = self.lines[set * WAYS + self.victim_way].clone();
                    self.new_line = Line {
                        tag,
                        ..Line::default()
                    };
                }

                if self.state >= STATE_EVICT_LOW {
                    // Write back one victim word per cycle; invalid victims
                    // turn these into idle ticks with no next-level traffic.
                    let word = (self.state - STATE_EVICT_LOW) as usize;
                    let old_base =
                        (self.old_line.tag << TAG_SHIFT) | ((set as u32) << LOG_LINE_SIZE);
                    self.next_addr = old_base + (word as u32) * 4;
                    self.next_data = self.old_line.data[word];
                    self.next_op = if self.old_line.valid {
                        MemOp::Store
                    } else {
                        MemOp::None
                    };
                } else if self.state >= STATE_FETCH_LOW {
                    // Fetch responses arrive one cycle after their request.
                    if self.state != 6 {
                        let word = (self.state - STATE_FETCH_LOW) as usize;
                        self.new_line.data[word] = self.next_out;
                    }
                    if self.state != STATE_FETCH_LOW {
                        let word = self.state - 3;
                        let line_base = addr & !((LINE_SIZE as u32) - 1);
                        self.next_addr = line_base + word * 4;
                        self.next_op = MemOp::Load;
                    }
                }

                self.state -= 1;

                if self.state == 1 {
                    if op == MemOp::Store {
                        splice(&mut self.new_line.data[word_in_line], addr, mask, data_in);
                    }

                    self.new_line.valid = true;
                    if op == MemOp::Load {
                        data_out = extract(self.new_line.data[word_in_line], addr, mask);
                    }
                    self.lines[set * WAYS + self.victim_way] = self.new_line.clone();
                    self.touch(set, self.victim_way);

                    self.next_op = MemOp::None;
                    self.state = 0;
                }
            }
        }

        self.next_out = next.process(self.next_addr, MemMask::Word, self.next_op, self.next_data);

        MemResult {
            data: data_out,
            wait: self.state != 0,
        }
    }
}
