//! Forwarding and hazard-unit behaviour tests.

use mips_core::config::{HazardUnit, MachineConfig};

use crate::common::harness::{TestContext, TEXT_BASE};

/// addi $1, $0, 5 ; add $2, $1, $1 ; add $3, $2, $1
const DEPENDENT_CHAIN: [u32; 3] = [0x2001_0005, 0x0021_1020, 0x0041_1820];

fn run_chain(hazard_unit: HazardUnit) -> TestContext {
    let mut ctx = TestContext::new(MachineConfig {
        hazard_unit,
        ..TestContext::pipelined_config()
    });
    ctx.load_program(TEXT_BASE, &DEPENDENT_CHAIN);
    ctx.machine
        .load_image(&[], &[("_halt".to_string(), TEXT_BASE + 12)])
        .unwrap();
    ctx.machine.reset();
    ctx.run_to_halt(60);
    ctx
}

#[test]
fn alu_results_forward_without_stalls() {
    let ctx = run_chain(HazardUnit::StallForward);
    assert_eq!(ctx.reg(1), 5);
    assert_eq!(ctx.reg(2), 10, "EX/MEM result forwarded");
    assert_eq!(ctx.reg(3), 15, "both producers forwarded");
    assert_eq!(ctx.machine.stats().stalls_data, 0, "no bubbles needed");
}

#[test]
fn stall_unit_waits_for_writeback() {
    let ctx = run_chain(HazardUnit::Stall);
    assert_eq!(ctx.reg(2), 10, "stalling still yields correct values");
    assert_eq!(ctx.reg(3), 15);
    assert!(
        ctx.machine.stats().stalls_data >= 2,
        "back-to-back dependences stall without forwarding, got {}",
        ctx.machine.stats().stalls_data
    );
}

#[test]
fn no_hazard_unit_reads_stale_registers() {
    let ctx = run_chain(HazardUnit::None);
    assert_eq!(ctx.reg(1), 5, "producer still commits");
    assert_eq!(
        ctx.reg(2),
        0,
        "without interlocks the consumer read the stale value"
    );
}

#[test]
fn forwarding_prefers_the_younger_result() {
    // addi $1, $0, 1 ; addi $1, $0, 2 ; add $2, $1, $1
    let mut ctx = TestContext::new(TestContext::pipelined_config());
    ctx.load_program(TEXT_BASE, &[0x2001_0001, 0x2001_0002, 0x0021_1020]);
    ctx.machine
        .load_image(&[], &[("_halt".to_string(), TEXT_BASE + 12)])
        .unwrap();
    ctx.machine.reset();
    ctx.run_to_halt(60);
    assert_eq!(ctx.reg(2), 4, "EX/MEM (younger write of $1) wins over MEM/WB");
}
