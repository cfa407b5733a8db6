//! Branch resolution and misprediction recovery tests.
//!
//! The predictor starts strongly taken, so a not-taken branch exercises
//! the squash path while a taken branch sails through without penalty.
//! Jumps always resolve in Execute.

use crate::common::builder::*;
use crate::common::TestContext;

/// A not-taken branch is initially predicted taken: the wrong-path
/// instruction must be squashed and the fallthrough executed.
#[test]
fn mispredicted_branch_squashes_wrong_path() {
    let mut ctx = TestContext::uncached().load_program(
        0,
        &[
            addi(5, 0, 1),
            beq(0, 5, 12), // 0 != 1: not taken, predicted taken
            addi(6, 0, 9), // fallthrough: must execute
            ecall(),
            addi(6, 0, 7), // branch target: must never commit
        ],
    );
    ctx.run_until_exit(100);

    assert_eq!(ctx.reg(6), 9, "wrong-path instruction leaked");
    assert_eq!(ctx.core.stats.branch_predictions, 1);
    assert_eq!(ctx.core.stats.branch_mispredictions, 1);
    assert_eq!(ctx.core.predictor.in_flight(), 0);
}

/// A taken branch predicted taken commits without a misprediction; the
/// skipped instruction never executes.
#[test]
fn correctly_predicted_taken_branch() {
    let mut ctx = TestContext::uncached().load_program(
        0,
        &[
            addi(5, 0, 0),
            beq(0, 5, 8),  // 0 == 0: taken, predicted taken
            addi(6, 0, 7), // skipped
            addi(6, 0, 9), // target
            ecall(),
        ],
    );
    ctx.run_until_exit(100);

    assert_eq!(ctx.reg(6), 9);
    assert_eq!(ctx.core.stats.branch_predictions, 1);
    assert_eq!(ctx.core.stats.branch_mispredictions, 0);
    assert_eq!(ctx.core.predictor.in_flight(), 0);
}

/// A short loop runs its exit branch three times; every resolution trains
/// the predictor exactly once and the bookkeeping drains to zero.
#[test]
fn predictor_trains_on_repeated_branch() {
    // x1 counts 0,1,2; branch at 0x8 is not-taken until x1 == 3.
    let mut ctx = TestContext::uncached().load_program(
        0,
        &[
            addi(2, 0, 3),   // limit
            addi(1, 1, 1),   // 0x4: x1 += 1
            beq(1, 2, 8),    // 0x8: exit loop when x1 == 3
            jal(0, -8),      // 0xc: back to 0x4
            ecall(),         // 0x10
        ],
    );
    ctx.run_until_exit(1000);

    assert_eq!(ctx.reg(1), 3);
    assert_eq!(ctx.core.stats.branch_predictions, 3);
    assert_eq!(ctx.core.predictor.in_flight(), 0);
}

/// JAL links pc+4 and redirects; its wrong-path successor is squashed.
#[test]
fn jal_links_and_redirects() {
    let mut ctx = TestContext::uncached().load_program(
        0,
        &[
            jal(1, 12),    // 0x0: jump to 0xc, x1 = 4
            addi(6, 0, 7), // fetched wrong path, squashed
            addi(6, 0, 8), // never reached
            addi(6, 0, 9), // 0xc: target
            ecall(),
        ],
    );
    ctx.run_until_exit(100);

    assert_eq!(ctx.reg(1), 4);
    assert_eq!(ctx.reg(6), 9);
}

/// JALR computes the target from a forwarded register and links.
#[test]
fn jalr_jumps_through_register() {
    let mut ctx = TestContext::uncached().load_program(
        0,
        &[
            addi(5, 0, 20), // target address
            jalr(1, 5, 0),  // 0x4: jump to 0x14, x1 = 8
            addi(6, 0, 7),  // squashed
            addi(6, 0, 7),  // skipped
            addi(6, 0, 7),  // skipped
            addi(6, 0, 9),  // 0x14
            ecall(),
        ],
    );
    ctx.run_until_exit(100);

    assert_eq!(ctx.reg(1), 8);
    assert_eq!(ctx.reg(6), 9);
}

/// A branch whose wrong-path shadow contains another branch withdraws
/// that speculative prediction: the bookkeeping drains back to zero.
#[test]
fn squashed_branch_prediction_is_withdrawn() {
    let mut ctx = TestContext::uncached().load_program(
        0,
        &[
            addi(5, 0, 1),
            beq(0, 5, 16),  // not taken, predicted taken -> target 0x14
            addi(6, 0, 9),  // fallthrough
            ecall(),
            addi(7, 0, 1),  // 0x10
            beq(0, 0, -8),  // 0x14: fetched speculatively, then squashed
        ],
    );
    ctx.run_until_exit(100);

    assert_eq!(ctx.reg(6), 9);
    assert_eq!(ctx.reg(7), 0, "squashed path must not commit");
    assert_eq!(ctx.core.predictor.in_flight(), 0);
    assert_eq!(ctx.core.stats.branch_predictions, 1, "only the real branch resolves");
}
