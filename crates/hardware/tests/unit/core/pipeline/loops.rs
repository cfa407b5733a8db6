//! Loop workloads through the cached memory system.
//!
//! End-to-end microbenchmarks on the full machine (caches enabled):
//! streaming reduction over an array, branch training on the loop branch,
//! and control flow across I-cache line boundaries.

use crate::common::builder::*;
use crate::common::TestContext;

/// Streaming word reduction over a 16 KiB array: one D-cache miss per
/// four-word line, so the miss ratio sits at one quarter; the loop branch
/// trains to a negligible misprediction rate.
#[test]
fn streaming_sum_miss_ratio_and_branch_training() {
    let mut ctx = TestContext::cached().load_program(
        0x1000,
        &[
            lui(5, 0x10),   // x5 = 0x10000, array base
            lui(6, 0x14),   // x6 = 0x14000, array end
            addi(7, 0, 0),  // x7 = sum
            lw(8, 5, 0),    // loop:
            add(7, 7, 8),
            addi(5, 5, 4),
            bne(5, 6, -12), // back to loop while x5 != x6
            ecall(),
        ],
    );

    let words = 0x4000 / 4; // 4096 iterations
    for i in 0..words {
        ctx.core.dram.write_word(0x10000 + 4 * i, 1);
    }

    ctx.run_until_exit(1_000_000);

    assert_eq!(ctx.reg(7), words as i32, "reduction result");

    let accesses = ctx.core.dm.accesses();
    let misses = ctx.core.dm.misses();
    assert_eq!(accesses, words as u64);
    let ratio = misses as f64 / accesses as f64;
    assert!(
        (0.24..=0.26).contains(&ratio),
        "miss ratio {} outside [0.24, 0.26]",
        ratio
    );

    let resolved = ctx.core.stats.branch_predictions;
    let missed = ctx.core.stats.branch_mispredictions;
    assert_eq!(resolved, words as u64);
    assert!(
        (missed as f64 / resolved as f64) <= 0.001,
        "{} mispredictions in {} iterations",
        missed,
        resolved
    );
    assert_eq!(ctx.core.predictor.in_flight(), 0);
}

/// A taken branch in the last word of an I-cache line fetches its target
/// across the line boundary.
#[test]
fn taken_branch_at_line_boundary() {
    let mut ctx = TestContext::cached().load_program(
        0x1000,
        &[
            addi(5, 0, 0),  // 0x1000
            addi(6, 0, 1),  // 0x1004
            addi(7, 0, 2),  // 0x1008
            beq(0, 5, 64),  // 0x100c: last word of the line, taken to 0x104c
        ],
    );
    // Target lands in a different line.
    ctx.core.dram.write_word(0x104c, addi(8, 0, 9));
    ctx.core.dram.write_word(0x1050, ecall());

    ctx.run_until_exit(1000);

    assert_eq!(ctx.reg(8), 9);
    assert!(ctx.core.im.misses() >= 2, "both lines were fetched");
}

/// The I-cache stalls fetch without corrupting the instruction stream:
/// a straight-line program executes identically cached and uncached.
#[test]
fn cached_and_uncached_agree() {
    let program = [
        addi(1, 0, 5),
        addi(2, 1, 6),
        add(3, 2, 1),
        sub(4, 3, 1),
        lui(5, 0x2),
        sw(3, 5, 0),
        lw(6, 5, 0),
        ecall(),
    ];

    let mut cached = TestContext::cached().load_program(0, &program);
    cached.run_until_exit(10_000);
    let mut uncached = TestContext::uncached().load_program(0, &program);
    uncached.run_until_exit(10_000);

    for reg in 1..=6 {
        assert_eq!(cached.reg(reg), uncached.reg(reg), "x{}", reg);
    }
    assert!(
        cached.core.stats.cycles > uncached.core.stats.cycles,
        "cache misses cost cycles"
    );
}
