//! Assembler directive and diagnostic tests.

use std::fs;

use crate::common::harness::TestContext;

#[test]
fn asciz_places_bytes_and_defines_the_symbol() {
    let mut ctx = TestContext::default();
    ctx.assemble(
        r#"
        .text
        .org 0x2000
msg:    .asciz "Hi"
"#,
    );
    assert_eq!(ctx.peek_byte(0x2000), b'H');
    assert_eq!(ctx.peek_byte(0x2001), b'i');
    assert_eq!(ctx.peek_byte(0x2002), 0, "terminating NUL");
    assert_eq!(ctx.machine.symbol_table().lookup("msg"), Some(0x2000));
}

#[test]
fn ascii_has_no_terminator_and_escapes_work() {
    let mut ctx = TestContext::default();
    ctx.assemble(
        r#"
        .org 0x2000
        .ascii "a\tb\n"
        .byte 0x7f
"#,
    );
    assert_eq!(ctx.peek_byte(0x2000), b'a');
    assert_eq!(ctx.peek_byte(0x2001), b'\t');
    assert_eq!(ctx.peek_byte(0x2002), b'b');
    assert_eq!(ctx.peek_byte(0x2003), b'\n');
    assert_eq!(ctx.peek_byte(0x2004), 0x7f, ".byte follows immediately");
}

#[test]
fn word_half_byte_layout() {
    let mut ctx = TestContext::default();
    ctx.assemble(
        r#"
        .data
        .org 0x3000
        .word 0x11223344, 2 + 3
        .half 0xbeef
        .byte 1, 2
"#,
    );
    assert_eq!(ctx.peek_word(0x3000), 0x1122_3344);
    assert_eq!(ctx.peek_word(0x3004), 5);
    assert_eq!(ctx.peek_byte(0x3008), 0xbe);
    assert_eq!(ctx.peek_byte(0x3009), 0xef);
    assert_eq!(ctx.peek_byte(0x300a), 1);
    assert_eq!(ctx.peek_byte(0x300b), 2);
}

#[test]
fn space_fills_with_the_requested_byte() {
    let mut ctx = TestContext::default();
    ctx.assemble(
        r#"
        .org 0x2000
        .space 4, 0xab
        .skip 2
        .byte 7
"#,
    );
    for offset in 0..4 {
        assert_eq!(ctx.peek_byte(0x2000 + offset), 0xab);
    }
    assert_eq!(ctx.peek_byte(0x2004), 0);
    assert_eq!(ctx.peek_byte(0x2005), 0);
    assert_eq!(ctx.peek_byte(0x2006), 7);
}

#[test]
fn equ_and_set_define_constants() {
    let mut ctx = TestContext::default();
    ctx.assemble(
        r#"
        .equ SIZE, 16
        .set DOUBLE, SIZE * 2
        .org 0x2000
        .word SIZE, DOUBLE
"#,
    );
    assert_eq!(ctx.peek_word(0x2000), 16);
    assert_eq!(ctx.peek_word(0x2004), 32);
    assert_eq!(ctx.machine.symbol_table().lookup("DOUBLE"), Some(32));
}

#[test]
fn word_forward_references_are_fixed_up() {
    let mut ctx = TestContext::default();
    ctx.assemble(
        r#"
        .org 0x2000
        .word later, later + 4
later:  .word 0xabcd
"#,
    );
    assert_eq!(ctx.peek_word(0x2000), 0x2008, "patched after definition");
    assert_eq!(ctx.peek_word(0x2004), 0x200c);
}

#[test]
fn duplicate_labels_are_diagnosed() {
    let mut ctx = TestContext::default();
    let err = ctx
        .machine
        .assemble_source(
            "dup.S",
            "one: .word 1\none: .word 2\n",
        )
        .expect_err("duplicate must fail");
    assert!(err.iter().any(|d| d.message.contains("already defined")), "{:?}", err);
    assert_eq!(err[0].line, 2);
}

#[test]
fn undefined_symbols_are_diagnosed_at_finish() {
    let mut ctx = TestContext::default();
    let err = ctx
        .machine
        .assemble_source("undef.S", ".word nowhere\n")
        .expect_err("undefined symbol must fail");
    assert!(
        err.iter().any(|d| d.message.contains("nowhere")),
        "diagnostic names the symbol: {:?}",
        err
    );
}

#[test]
fn branch_out_of_range_is_diagnosed() {
    let mut ctx = TestContext::default();
    let err = ctx
        .machine
        .assemble_source(
            "far.S",
            ".org 0x80020000\nb far\n.org 0x80120000\nfar: nop\n",
        )
        .expect_err("far branch must fail");
    assert!(
        err.iter().any(|d| d.message.contains("out of range")),
        "{:?}",
        err
    );
}

#[test]
fn unknown_directive_and_instruction_are_diagnosed() {
    let mut ctx = TestContext::default();
    let err = ctx
        .machine
        .assemble_source("bad.S", ".frobnicate 1\nfloop $1, $2\n")
        .expect_err("bad source must fail");
    assert_eq!(err.len(), 2);
    assert!(err[0].message.contains("unknown directive"));
    assert!(err[1].message.contains("unknown instruction"));
}

#[test]
fn include_reads_sibling_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    let inc = dir.path().join("defs.S");
    fs::write(&inc, ".equ MAGIC, 0x1234\n").unwrap();
    let main = dir.path().join("main.S");
    fs::write(
        &main,
        ".include \"defs.S\"\n.org 0x2000\n.word MAGIC\n",
    )
    .unwrap();

    let mut ctx = TestContext::default();
    ctx.machine
        .assemble_file(&main)
        .unwrap_or_else(|d| panic!("assembly failed: {:?}", d));
    assert_eq!(ctx.peek_word(0x2000), 0x1234);
}

#[test]
fn missing_include_is_diagnosed() {
    let mut ctx = TestContext::default();
    let err = ctx
        .machine
        .assemble_source("main.S", ".include \"no/such/file.S\"\n")
        .expect_err("missing include must fail");
    assert!(err.iter().any(|d| d.message.contains("no/such/file.S")));
}

#[test]
fn pragmas_are_surfaced_as_events() {
    use std::cell::RefCell;
    use std::rc::Rc;

    use mips_core::common::events::MachineEvent;

    let collected = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&collected);

    let mut ctx = TestContext::default();
    ctx.machine.subscribe(Box::new(move |event| {
        if let MachineEvent::Pragma { tokens } = event {
            sink.borrow_mut().push(tokens.clone());
        }
    }));
    ctx.assemble("#pragma sim show terminal\nnop\n");
    let expected: Vec<Vec<String>> = vec![vec![
        "sim".to_string(),
        "show".to_string(),
        "terminal".to_string(),
    ]];
    assert_eq!(*collected.borrow(), expected);
}

#[test]
fn comments_are_stripped() {
    let mut ctx = TestContext::default();
    ctx.assemble(
        r#"
        # full-line comment
        .org 0x2000        # trailing comment
        .word 1            # another
"#,
    );
    assert_eq!(ctx.peek_word(0x2000), 1);
}
