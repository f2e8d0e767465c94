//! ALU operation tests.

use mips_core::common::error::Trap;
use mips_core::core::units::alu::{operate, AluOp};

const PC: u32 = 0x8002_0008;

#[test]
fn arithmetic_basics() {
    assert_eq!(operate(AluOp::Addu, 3, 4, PC), Ok(7));
    assert_eq!(operate(AluOp::Subu, 3, 4, PC), Ok(0xffff_ffff));
    assert_eq!(operate(AluOp::And, 0xff00, 0x0ff0, PC), Ok(0x0f00));
    assert_eq!(operate(AluOp::Or, 0xff00, 0x0ff0, PC), Ok(0xfff0));
    assert_eq!(operate(AluOp::Xor, 0xff00, 0x0ff0, PC), Ok(0xf0f0));
    assert_eq!(operate(AluOp::Nor, 0, 0, PC), Ok(0xffff_ffff));
}

#[test]
fn set_less_than_signed_and_unsigned() {
    assert_eq!(operate(AluOp::Slt, 0xffff_ffff, 1, PC), Ok(1), "-1 < 1 signed");
    assert_eq!(
        operate(AluOp::Sltu, 0xffff_ffff, 1, PC),
        Ok(0),
        "0xffffffff > 1 unsigned"
    );
    assert_eq!(operate(AluOp::Slt, 1, 1, PC), Ok(0));
}

#[test]
fn shifts_use_a_as_amount() {
    assert_eq!(operate(AluOp::Sll, 4, 1, PC), Ok(16));
    assert_eq!(operate(AluOp::Srl, 4, 0x8000_0000, PC), Ok(0x0800_0000));
    assert_eq!(operate(AluOp::Sra, 4, 0x8000_0000, PC), Ok(0xf800_0000));
    assert_eq!(operate(AluOp::Sll, 32, 1, PC), Ok(1), "amount is masked to 5 bits");
}

#[test]
fn trapping_add_overflows() {
    assert_eq!(
        operate(AluOp::Add, 0x7fff_ffff, 1, PC),
        Err(Trap::Overflow(PC))
    );
    assert_eq!(
        operate(AluOp::Add, 0x8000_0000, 0xffff_ffff, PC),
        Err(Trap::Overflow(PC))
    );
    assert_eq!(operate(AluOp::Add, 0x7fff_fffe, 1, PC), Ok(0x7fff_ffff));
}

#[test]
fn trapping_sub_overflows() {
    assert_eq!(
        operate(AluOp::Sub, 0x8000_0000, 1, PC),
        Err(Trap::Overflow(PC))
    );
    assert_eq!(operate(AluOp::Sub, 0, 1, PC), Ok(0xffff_ffff));
}

#[test]
fn unsigned_variants_wrap() {
    assert_eq!(operate(AluOp::Addu, 0x7fff_ffff, 1, PC), Ok(0x8000_0000));
    assert_eq!(operate(AluOp::Subu, 0x8000_0000, 1, PC), Ok(0x7fff_ffff));
}
