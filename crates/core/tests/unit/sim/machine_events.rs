//! Machine facade tests: change notifications, invariants, breakpoints,
//! and cancellation.

use std::cell::RefCell;
use std::rc::Rc;

use mips_core::common::events::{MachineEvent, RegChange, RegKind};
use mips_core::sim::MachineStatus;

use crate::common::harness::{TestContext, TEXT_BASE};

fn collect_reg_changes(ctx: &mut TestContext) -> Rc<RefCell<Vec<RegChange>>> {
    let collected = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&collected);
    ctx.machine.subscribe(Box::new(move |event| {
        if let MachineEvent::RegChange(change) = event {
            sink.borrow_mut().push(*change);
        }
    }));
    collected
}

#[test]
fn every_effective_write_emits_exactly_one_notification() {
    let mut ctx = TestContext::default();
    let changes = collect_reg_changes(&mut ctx);
    // addi $1, $0, 5
    ctx.load_program(TEXT_BASE, &[0x2001_0005]);
    ctx.machine.step();

    let gp: Vec<RegChange> = changes
        .borrow()
        .iter()
        .filter(|c| c.kind == RegKind::Gp)
        .copied()
        .collect();
    assert_eq!(gp.len(), 1, "one GP write, one notification");
    assert_eq!(gp[0].index, 1);
    assert_eq!(gp[0].old, 0);
    assert_eq!(gp[0].new, 5);
}

#[test]
fn zero_register_writes_are_discarded_silently() {
    let mut ctx = TestContext::default();
    let changes = collect_reg_changes(&mut ctx);
    // addi $0, $0, 7
    ctx.load_program(TEXT_BASE, &[0x2000_0007]);
    ctx.machine.step();

    assert!(
        changes.borrow().iter().all(|c| c.kind != RegKind::Gp),
        "a $zero write emits nothing"
    );
    assert_eq!(ctx.reg(0), 0, "$zero stays zero");
}

#[test]
fn zero_register_is_zero_after_every_cycle() {
    let mut ctx = TestContext::default();
    ctx.assemble(
        r#"
_start: addi $0, $0, 1
        sll  $0, $0, 4
        lui  $0, 0xffff
        addi $1, $0, 3
_halt:  nop
"#,
    );
    for _ in 0..16 {
        ctx.machine.step();
        assert_eq!(ctx.reg(0), 0);
    }
    assert_eq!(ctx.reg(1), 3, "$0 read as 0 by the consumer");
}

#[test]
fn stage_traces_precede_commits_within_a_cycle() {
    let mut ctx = TestContext::default();
    let order = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&order);
    ctx.machine.subscribe(Box::new(move |event| {
        let tag = match event {
            MachineEvent::StageTrace { .. } => "stage",
            MachineEvent::RegChange(_) => "reg",
            _ => return,
        };
        sink.borrow_mut().push(tag);
    }));
    ctx.load_program(TEXT_BASE, &[0x2001_0005]);
    ctx.machine.step();

    let order = order.borrow();
    let first_reg = order.iter().position(|&t| t == "reg").unwrap();
    let last_stage = order.iter().rposition(|&t| t == "stage").unwrap();
    assert!(
        last_stage < first_reg,
        "stage traces fire before commit events: {:?}",
        order
    );
}

#[test]
fn memory_writes_are_observable() {
    let mut ctx = TestContext::default();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    ctx.machine.subscribe(Box::new(move |event| {
        if let MachineEvent::MemoryWrite { addr, value, .. } = event {
            sink.borrow_mut().push((*addr, *value));
        }
    }));
    ctx.assemble(
        r#"
_start: li $8, 0x1000
        li $9, 77
        sw $9, 4($8)
_halt:  nop
"#,
    );
    ctx.run_to_halt(50);
    assert_eq!(seen.borrow().as_slice(), &[(0x1004u32, 77u32)]);
}

#[test]
fn breakpoints_stop_the_run() {
    let mut ctx = TestContext::default();
    ctx.assemble(
        r#"
_start: addi $1, $0, 1
        addi $2, $0, 2
        addi $3, $0, 3
_halt:  nop
"#,
    );
    ctx.machine.add_breakpoint(TEXT_BASE + 8);
    let status = ctx.machine.run();
    assert_eq!(status, MachineStatus::Stopped);
    assert_eq!(ctx.reg(1), 1, "instructions before the breakpoint ran");
    assert_eq!(ctx.reg(3), 0, "instruction at the breakpoint did not");
    assert_eq!(ctx.machine.registers().read_pc(), TEXT_BASE + 8);

    ctx.machine.remove_breakpoint(TEXT_BASE + 8);
    ctx.machine.resume();
    ctx.run_to_halt(50);
    assert_eq!(ctx.reg(3), 3, "execution resumed past the breakpoint");
}

#[test]
fn cancellation_stops_between_cycles_and_stays_inspectable() {
    let mut ctx = TestContext::default();
    // An endless loop: loop: j loop ; nop.
    ctx.assemble("loop: j loop\nnop\n");

    let cancel = ctx.machine.cancel_token();
    let mut count = 0u32;
    ctx.machine.subscribe(Box::new(move |event| {
        if let MachineEvent::StageTrace { .. } = event {
            count += 1;
            if count > 40 {
                cancel.store(true, std::sync::atomic::Ordering::Relaxed);
            }
        }
    }));

    let status = ctx.machine.run_for(10_000);
    assert_eq!(status, MachineStatus::Ready, "cancelled, not halted");
    assert!(
        ctx.machine.stats().cycles < 10_000,
        "the cancel flag stopped the run early"
    );
    let _ = ctx.machine.registers().read_pc();
}

#[test]
fn cycle_budget_bounds_a_run() {
    let mut ctx = TestContext::default();
    ctx.assemble("loop: j loop\nnop\n");
    let status = ctx.machine.run_for(25);
    assert_eq!(status, MachineStatus::Ready);
    assert_eq!(ctx.machine.stats().cycles, 25);
}

#[test]
fn reset_restores_the_entry_point() {
    let mut ctx = TestContext::default();
    ctx.assemble(
        r#"
_start: addi $1, $0, 1
        addi $2, $0, 2
_halt:  nop
"#,
    );
    ctx.run_to_halt(50);
    assert_eq!(ctx.reg(1), 1);

    ctx.machine.reset();
    assert_eq!(*ctx.machine.status(), MachineStatus::Ready);
    assert_eq!(ctx.machine.registers().read_pc(), TEXT_BASE);
    assert_eq!(ctx.reg(1), 0, "registers cleared");
    assert_eq!(ctx.machine.stats().cycles, 0);

    ctx.run_to_halt(50);
    assert_eq!(ctx.reg(1), 1, "the program runs again after reset");
}
