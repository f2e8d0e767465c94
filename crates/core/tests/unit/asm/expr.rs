//! Expression grammar and evaluation tests.

use mips_core::asm::expr::{EvalError, Expr};
use mips_core::sim::symbols::SymbolTable;

fn eval(text: &str, symtab: &SymbolTable, dot: u32) -> Result<u32, EvalError> {
    Expr::parse(text).expect("expression must parse").eval(symtab, dot)
}

fn eval_plain(text: &str) -> u32 {
    eval(text, &SymbolTable::new(), 0).expect("expression must evaluate")
}

#[test]
fn integer_literal_bases() {
    assert_eq!(eval_plain("42"), 42);
    assert_eq!(eval_plain("0x2a"), 42);
    assert_eq!(eval_plain("0X2A"), 42);
    assert_eq!(eval_plain("052"), 42);
    assert_eq!(eval_plain("0b101010"), 42);
    assert_eq!(eval_plain("0"), 0);
}

#[test]
fn additive_and_multiplicative_precedence() {
    assert_eq!(eval_plain("1 + 2 * 3"), 7);
    assert_eq!(eval_plain("(1 + 2) * 3"), 9);
    assert_eq!(eval_plain("10 - 4 - 3"), 3, "left associative");
    assert_eq!(eval_plain("7 % 4"), 3);
    assert_eq!(eval_plain("12 / 4"), 3);
}

#[test]
fn bitwise_and_shift_operators() {
    assert_eq!(eval_plain("0xff & 0x0f"), 0x0f);
    assert_eq!(eval_plain("0xf0 | 0x0f"), 0xff);
    assert_eq!(eval_plain("0xff ^ 0x0f"), 0xf0);
    assert_eq!(eval_plain("1 << 4"), 16);
    assert_eq!(eval_plain("256 >> 4"), 16);
}

#[test]
fn unary_operators() {
    assert_eq!(eval_plain("-1"), 0xffff_ffff);
    assert_eq!(eval_plain("~0"), 0xffff_ffff);
    assert_eq!(eval_plain("+5"), 5);
    assert_eq!(eval_plain("10 + -3"), 7);
}

#[test]
fn symbols_and_the_location_counter() {
    let mut symtab = SymbolTable::new();
    symtab.define("base", 0x8002_0000).unwrap();
    assert_eq!(eval("base + 8", &symtab, 0), Ok(0x8002_0008));
    assert_eq!(eval(". + 4", &symtab, 0x100), Ok(0x104));
    assert_eq!(eval("base - .", &symtab, 0x8001_0000), Ok(0x1_0000));
}

#[test]
fn undefined_symbols_are_reported_by_name() {
    let symtab = SymbolTable::new();
    assert_eq!(
        eval("missing + 1", &symtab, 0),
        Err(EvalError::Undefined("missing".to_string()))
    );
}

#[test]
fn division_by_zero_is_an_error() {
    assert_eq!(
        eval("1 / 0", &SymbolTable::new(), 0),
        Err(EvalError::DivideByZero)
    );
    assert_eq!(
        eval("1 % 0", &SymbolTable::new(), 0),
        Err(EvalError::DivideByZero)
    );
}

#[test]
fn malformed_expressions_fail_to_parse() {
    assert!(Expr::parse("1 +").is_err());
    assert!(Expr::parse("(1").is_err());
    assert!(Expr::parse("1 2").is_err());
    assert!(Expr::parse("").is_err());
}
