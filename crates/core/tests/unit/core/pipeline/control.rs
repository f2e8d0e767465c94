//! Control hazard tests: branch resolution, flushes, and the delay slot.

use mips_core::config::{HazardUnit, MachineConfig};

use crate::common::harness::{TestContext, TEXT_BASE};

#[test]
fn taken_jump_executes_delay_slot_and_flushes_the_rest() {
    let mut ctx = TestContext::new(TestContext::pipelined_config());
    ctx.assemble(
        r#"
        .text
_start: j target
        addi $1, $0, 1         # delay slot: executes
        addi $2, $0, 99        # wrong path: flushed
target: addi $3, $0, 3
_halt:  nop
"#,
    );
    ctx.run_to_halt(100);
    assert_eq!(ctx.reg(1), 1, "delay slot executed");
    assert_eq!(ctx.reg(2), 0, "wrong-path instruction flushed");
    assert_eq!(ctx.reg(3), 3, "target reached");
    assert!(
        ctx.machine.stats().stalls_control >= 1,
        "a taken jump costs at least one flush"
    );
}

#[test]
fn taken_branch_without_delay_slot_flushes_two() {
    let mut ctx = TestContext::new(MachineConfig {
        delay_slot: false,
        ..TestContext::pipelined_config()
    });
    ctx.assemble(
        r#"
        .text
_start: beq $0, $0, target
        addi $1, $0, 1         # would-be slot: flushed
        addi $2, $0, 2         # wrong path: flushed
target: addi $3, $0, 3
_halt:  nop
"#,
    );
    ctx.run_to_halt(100);
    assert_eq!(ctx.reg(1), 0);
    assert_eq!(ctx.reg(2), 0);
    assert_eq!(ctx.reg(3), 3);
    assert_eq!(ctx.machine.stats().stalls_control, 2);
}

#[test]
fn not_taken_branch_costs_nothing() {
    let mut ctx = TestContext::new(TestContext::pipelined_config());
    ctx.assemble(
        r#"
        .text
_start: bne $0, $0, away
        addi $1, $0, 1
        addi $2, $0, 2
away:   addi $3, $0, 3
_halt:  nop
"#,
    );
    ctx.run_to_halt(100);
    assert_eq!(ctx.reg(1), 1);
    assert_eq!(ctx.reg(2), 2);
    assert_eq!(ctx.reg(3), 3);
    assert_eq!(ctx.machine.stats().stalls_control, 0);
}

#[test]
fn backward_branch_loops_correctly() {
    let mut ctx = TestContext::new(TestContext::pipelined_config());
    ctx.assemble(
        r#"
        .text
_start: addi $8, $0, 5         # counter
        addi $9, $0, 0         # sum
loop:   add  $9, $9, $8
        addi $8, $8, -1
        bne  $8, $0, loop
        nop                    # delay slot
_halt:  nop
"#,
    );
    ctx.run_to_halt(300);
    assert_eq!(ctx.reg(9), 15, "5+4+3+2+1");
    assert_eq!(ctx.reg(8), 0);
}

#[test]
fn deferred_redirect_counts_a_control_stall() {
    // A linking branch writes $ra while its delay slot reads it, so the
    // forwarding-free hazard unit stalls the slot in decode and the taken
    // target must wait until the slot has been consumed.
    let mut ctx = TestContext::new(MachineConfig {
        hazard_unit: HazardUnit::Stall,
        ..TestContext::pipelined_config()
    });
    ctx.assemble(
        r#"
        .text
_start: bgezal $0, target      # always taken, links $ra
        move   $9, $31         # delay slot: waits for the link writeback
        nop                    # wrong path
target: addi   $10, $0, 5
_halt:  nop
"#,
    );
    ctx.run_to_halt(100);
    assert_eq!(ctx.reg(9), TEXT_BASE + 8, "slot reads the committed link value");
    assert_eq!(ctx.reg(10), 5, "deferred target reached");
    assert_eq!(
        ctx.machine.stats().stalls_data,
        2,
        "the slot stalls until the link leaves the pipeline"
    );
    assert_eq!(
        ctx.machine.stats().stalls_control,
        1,
        "applying the deferred target costs one bubble"
    );
}

#[test]
fn jal_links_past_the_delay_slot() {
    let mut ctx = TestContext::new(TestContext::pipelined_config());
    ctx.assemble(
        r#"
        .text
_start: jal leaf
        nop                    # delay slot
        addi $2, $0, 2         # return lands here
_halt:  nop

leaf:   addi $1, $0, 1
        jr $ra
        nop
"#,
    );
    ctx.run_to_halt(200);
    assert_eq!(ctx.reg(1), 1, "subroutine ran");
    assert_eq!(ctx.reg(2), 2, "return address skipped the delay slot");
}
