//! Pseudo-instruction expansion tests.
//!
//! The expansions are part of the assembler's contract, so these compare
//! emitted words byte-exactly against the documented encodings.

use mips_core::isa::instruction::{encode_i, encode_r};
use mips_core::isa::opcodes::{funct, op};

use crate::common::harness::{TestContext, TEXT_BASE};

fn assemble_words(source: &str, count: u32) -> Vec<u32> {
    let mut ctx = TestContext::default();
    ctx.assemble(source);
    (0..count).map(|i| ctx.peek_word(TEXT_BASE + i * 4)).collect()
}

#[test]
fn nop_is_sll_zero() {
    assert_eq!(assemble_words("nop\n", 1), vec![0]);
}

#[test]
fn move_is_addu_from_zero() {
    assert_eq!(
        assemble_words("move $5, $7\n", 1),
        vec![encode_r(funct::ADDU, 0, 7, 5, 0)]
    );
}

#[test]
fn la_is_lui_ori_pair() {
    let words = assemble_words(
        ".equ target, 0x80031234\nla $5, target\n",
        2,
    );
    assert_eq!(words[0], encode_i(op::LUI, 0, 5, 0x8003));
    assert_eq!(words[1], encode_i(op::ORI, 5, 5, 0x1234));
}

#[test]
fn la_forward_reference_is_patched() {
    let mut ctx = TestContext::default();
    ctx.assemble(
        r#"
        .text
        la $5, later
        .org 0x80031234
later:  nop
"#,
    );
    assert_eq!(ctx.peek_word(TEXT_BASE), encode_i(op::LUI, 0, 5, 0x8003));
    assert_eq!(ctx.peek_word(TEXT_BASE + 4), encode_i(op::ORI, 5, 5, 0x1234));
}

#[test]
fn li_chooses_the_shortest_encoding() {
    // Small signed values: one addiu.
    assert_eq!(
        assemble_words("li $4, 5\n", 1),
        vec![encode_i(op::ADDIU, 0, 4, 5)]
    );
    assert_eq!(
        assemble_words("li $4, -3\n", 1),
        vec![encode_i(op::ADDIU, 0, 4, 0xfffd)]
    );
    // 16-bit unsigned: one ori.
    assert_eq!(
        assemble_words("li $4, 0xffff\n", 1),
        vec![encode_i(op::ORI, 0, 4, 0xffff)]
    );
    // Upper half only: one lui.
    assert_eq!(
        assemble_words("li $4, 0x12340000\n", 1),
        vec![encode_i(op::LUI, 0, 4, 0x1234)]
    );
    // Full 32-bit: lui + ori.
    assert_eq!(
        assemble_words("li $4, 0x12345678\n", 2),
        vec![encode_i(op::LUI, 0, 4, 0x1234), encode_i(op::ORI, 4, 4, 0x5678)]
    );
}

#[test]
fn b_is_unconditional_beq() {
    let words = assemble_words("b next\nnop\nnext: nop\n", 1);
    assert_eq!(words[0], encode_i(op::BEQ, 0, 0, 1), "skip one word");
}

#[test]
fn beqz_and_bnez_compare_against_zero() {
    let words = assemble_words("beqz $3, next\nnop\nnext: bnez $4, next\n", 3);
    assert_eq!(words[0], encode_i(op::BEQ, 3, 0, 1));
    assert_eq!(words[2], encode_i(op::BNE, 4, 0, 0xffff), "branch to itself - 4");
}

#[test]
fn absolute_load_uses_the_assembler_temporary() {
    let words = assemble_words(
        ".equ var, 0x80042000\nlw $8, var\n",
        3,
    );
    assert_eq!(words[0], encode_i(op::LUI, 0, 1, 0x8004));
    assert_eq!(words[1], encode_i(op::ORI, 1, 1, 0x2000));
    assert_eq!(words[2], encode_i(op::LW, 1, 8, 0));
}

#[test]
fn offset_addressing_still_encodes_directly() {
    assert_eq!(
        assemble_words("lw $8, 4($29)\nsw $8, -4($29)\nlw $9, ($29)\n", 3),
        vec![
            encode_i(op::LW, 29, 8, 4),
            encode_i(op::SW, 29, 8, 0xfffc),
            encode_i(op::LW, 29, 9, 0),
        ]
    );
}
