//! Load-use hazard tests.
//!
//! A load followed by an immediate consumer must cost exactly one bubble
//! with the forwarding hazard unit.

use crate::common::harness::{TestContext, TEXT_BASE};

/// `lw $2, 0($0)` ; `add $3, $2, $2`.
const LW_ADD: [u32; 2] = [0x8c02_0000, 0x0042_1820];

#[test]
fn load_use_inserts_exactly_one_bubble() {
    let mut ctx = TestContext::new(TestContext::pipelined_config());
    ctx.poke_words(0, &[7]);
    ctx.load_program(TEXT_BASE, &LW_ADD);
    // _halt sits right after the program.
    ctx.machine
        .load_image(&[], &[("_halt".to_string(), TEXT_BASE + 8)])
        .unwrap();
    ctx.machine.reset();
    ctx.run_to_halt(50);

    assert_eq!(ctx.reg(2), 7, "loaded value");
    assert_eq!(ctx.reg(3), 14, "forwarded consumer result");
    assert_eq!(ctx.machine.stats().stalls_data, 1, "exactly one bubble");
    assert_eq!(
        ctx.machine.stats().cycles,
        7,
        "IF of lw through WB of add, one stall cycle included"
    );
}

#[test]
fn independent_instructions_do_not_stall() {
    let mut ctx = TestContext::new(TestContext::pipelined_config());
    ctx.poke_words(0, &[7]);
    // lw $2, 0($0) ; addi $8, $0, 1 ; add $3, $2, $2
    ctx.load_program(TEXT_BASE, &[0x8c02_0000, 0x2008_0001, 0x0042_1820]);
    ctx.machine
        .load_image(&[], &[("_halt".to_string(), TEXT_BASE + 12)])
        .unwrap();
    ctx.machine.reset();
    ctx.run_to_halt(50);

    assert_eq!(ctx.reg(3), 14, "value forwarded from MEM/WB");
    assert_eq!(
        ctx.machine.stats().stalls_data,
        0,
        "one instruction of distance hides the load latency"
    );
}
