//! Range-file loading and dumping tests.

use std::fs;

use mips_core::sim::loader::parse_u32_any;

use crate::common::harness::TestContext;

#[test]
fn parse_accepts_all_standard_bases() {
    assert_eq!(parse_u32_any("123"), Some(123));
    assert_eq!(parse_u32_any("0x10"), Some(16));
    assert_eq!(parse_u32_any("0B11"), Some(3));
    assert_eq!(parse_u32_any("017"), Some(15));
    assert_eq!(parse_u32_any("  42  "), Some(42));
    assert_eq!(parse_u32_any("+7"), Some(7));
    assert_eq!(parse_u32_any("zzz"), None);
    assert_eq!(parse_u32_any(""), None);
}

#[test]
fn load_range_writes_sequential_words() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = dir.path().join("data.txt");
    fs::write(&file, "0x1\n0x2\n\n0x3\n").unwrap();

    let mut ctx = TestContext::default();
    let words = ctx.machine.load_range(0x1000, &file).expect("load range");
    assert_eq!(words, 3);
    assert_eq!(ctx.peek_word(0x1000), 1);
    assert_eq!(ctx.peek_word(0x1004), 2);
    assert_eq!(ctx.peek_word(0x1008), 3);
}

#[test]
fn load_range_start_rounds_down_to_words() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = dir.path().join("data.txt");
    fs::write(&file, "99\n").unwrap();

    let mut ctx = TestContext::default();
    ctx.machine.load_range(0x1003, &file).expect("load range");
    assert_eq!(ctx.peek_word(0x1000), 99);
}

#[test]
fn load_range_accepts_mixed_bases_and_whitespace() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = dir.path().join("data.txt");
    fs::write(&file, "  10  \n0x10\n010\n0b10\n").unwrap();

    let mut ctx = TestContext::default();
    ctx.machine.load_range(0x2000, &file).expect("load range");
    assert_eq!(ctx.peek_word(0x2000), 10);
    assert_eq!(ctx.peek_word(0x2004), 16);
    assert_eq!(ctx.peek_word(0x2008), 8);
    assert_eq!(ctx.peek_word(0x200c), 2);
}

#[test]
fn bad_lines_are_parse_errors() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = dir.path().join("data.txt");
    fs::write(&file, "1\nnot-a-number\n").unwrap();

    let mut ctx = TestContext::default();
    let err = ctx.machine.load_range(0, &file).expect_err("must fail");
    assert!(err.to_string().contains("line 2"), "{}", err);
}

#[test]
fn dump_then_load_round_trips() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = dir.path().join("dump.txt");

    let mut ctx = TestContext::default();
    ctx.poke_words(0x4000, &[0xdead_beef, 0, 42]);
    ctx.machine
        .dump_range(0x4000, 12, &file)
        .expect("dump range");

    let text = fs::read_to_string(&file).unwrap();
    assert_eq!(text.lines().count(), 3, "one word per line");
    assert!(text.lines().next().unwrap().starts_with("0x"), "{}", text);

    let mut other = TestContext::default();
    other.machine.load_range(0x4000, &file).expect("reload");
    assert_eq!(other.peek_word(0x4000), 0xdead_beef);
    assert_eq!(other.peek_word(0x4004), 0);
    assert_eq!(other.peek_word(0x4008), 42);
}
