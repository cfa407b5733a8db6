//! Forwarding network tests.
//!
//! Producers one, two, and three instructions ahead of a consumer must all
//! supply their value without stalls, including the store-data operand.

use crate::common::builder::*;
use crate::common::TestContext;

/// ALU results forward across all three producer distances.
#[test]
fn alu_forwarding_all_distances() {
    let mut ctx = TestContext::uncached().load_program(
        0,
        &[
            addi(1, 0, 5),  // x1 = 5
            addi(2, 1, 3),  // distance 1: x2 = 8
            addi(3, 1, 10), // distance 2: x3 = 15
            addi(4, 1, 20), // distance 3: x4 = 25
            add(5, 2, 3),   // x5 = 23
            ecall(),
        ],
    );
    ctx.run_until_exit(100);

    assert_eq!(ctx.reg(1), 5);
    assert_eq!(ctx.reg(2), 8);
    assert_eq!(ctx.reg(3), 15);
    assert_eq!(ctx.reg(4), 25);
    assert_eq!(ctx.reg(5), 23);
    assert_eq!(ctx.core.stats.stalls_data, 0, "ALU chains never stall");
}

/// The newest producer wins when two in-flight instructions write the
/// same register.
#[test]
fn newest_producer_wins() {
    let mut ctx = TestContext::uncached().load_program(
        0,
        &[
            addi(1, 0, 11),
            addi(1, 0, 22),
            addi(2, 1, 0), // must see 22, not 11
            ecall(),
        ],
    );
    ctx.run_until_exit(100);
    assert_eq!(ctx.reg(2), 22);
}

/// Store data arrives through the third source slot one cycle after its
/// producer.
#[test]
fn store_data_forwards() {
    let mut ctx = TestContext::uncached().load_program(
        0,
        &[
            lui(5, 0x2),    // x5 = 0x2000
            addi(1, 0, 77), // store value
            sw(1, 5, 0),    // distance 1 on the data operand
            lw(6, 5, 0),
            ecall(),
        ],
    );
    ctx.run_until_exit(100);
    assert_eq!(ctx.reg(6), 77);
}

/// Writes to x0 are dropped and x0 never forwards.
#[test]
fn x0_stays_zero() {
    let mut ctx = TestContext::uncached().load_program(
        0,
        &[
            addi(0, 0, 5), // dropped
            addi(1, 0, 0), // reads x0
            add(2, 0, 1),
            ecall(),
        ],
    );
    ctx.run_until_exit(100);

    assert_eq!(ctx.reg(0), 0);
    assert_eq!(ctx.core.regs.read(0), 0);
    assert_eq!(ctx.reg(1), 0);
    assert_eq!(ctx.reg(2), 0);
}

/// Mixed U-type and shift arithmetic lands the expected values.
#[test]
fn alu_operations_compute() {
    let mut ctx = TestContext::uncached().load_program(
        0,
        &[
            lui(1, 0xFFFFF),  // x1 = 0xFFFFF000
            srai(2, 1, 12),   // x2 = 0xFFFFFFFF (arithmetic)
            addi(3, 0, -1),   // x3 = -1
            sltu(4, 0, 3),    // x4 = (0 < 0xFFFFFFFF) = 1
            sub(5, 0, 3),     // x5 = 1
            auipc(6, 0),      // x6 = pc of this instruction
            ecall(),
        ],
    );
    ctx.run_until_exit(100);

    assert_eq!(ctx.reg(1) as u32, 0xFFFF_F000);
    assert_eq!(ctx.reg(2), -1);
    assert_eq!(ctx.reg(4), 1);
    assert_eq!(ctx.reg(5), 1);
    assert_eq!(ctx.reg(6), 20);
}
