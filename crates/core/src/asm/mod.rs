//! Integrated assembler.
//!
//! A single-pass assembler with fix-ups: statements are encoded and written
//! into the simulated memory as they are read, forward references are
//! recorded as fix-up records, and `finish()` resolves them against the
//! final symbol table and patches the image. Diagnostics are collected
//! rather than aborting on the first error; the result is only valid when
//! `finish()` reports none.
//!
//! # Directives
//!
//! `.text [addr]`, `.data [addr]`, `.org expr`, `.word v,…`, `.half v,…`,
//! `.byte v,…`, `.ascii "…"`, `.asciz "…"`, `.space n[,fill]` (`.skip`
//! alias), `.set name, expr` (`.equ` alias; `.set` mode flags are accepted
//! and ignored), `.globl name`, `.include "path"`. Forward references are
//! supported in `.word` and in instruction operands; `.half`/`.byte`
//! require already-defined symbols.
//!
//! # Pseudo-instructions
//!
//! | Pseudo | Expansion |
//! |--------|-----------|
//! | `nop` | `sll $0, $0, 0` |
//! | `move rd, rs` | `addu rd, $0, rs` |
//! | `la rd, sym` | `lui rd, hi(sym)` ; `ori rd, rd, lo(sym)` |
//! | `li rd, imm` | shortest of `addiu`/`ori`/`lui` or `lui`+`ori` |
//! | `b label` | `beq $0, $0, label` |
//! | `beqz rs, label` | `beq rs, $0, label` |
//! | `bnez rs, label` | `bne rs, $0, label` |
//! | `lw rt, sym` (no base) | `la $at, sym` ; `lw rt, 0($at)` |
//!
//! `#pragma` lines are collected with their tokens and surfaced to the
//! host; they are only recognised at statement boundaries.

/// Expression grammar and evaluation.
pub mod expr;

/// Fix-up records and relocation kinds.
pub mod fixup;

/// Abstract `.include` source resolution.
pub mod provider;

use std::collections::BTreeSet;

use crate::asm::expr::{EvalError, Expr};
use crate::asm::fixup::{Fixup, RelocKind, SourceLoc};
use crate::asm::provider::SourceProvider;
use crate::common::constants::REGISTER_NAMES;
use crate::common::data::{AccessSource, AccessWidth};
use crate::isa::instruction::{encode_cop0, encode_i, encode_j, encode_r, encode_regimm};
use crate::isa::opcodes::{cop0, funct, op, regimm};
use crate::sim::symbols::SymbolTable;
use crate::soc::bus::Bus;

/// Maximum `.include` nesting before the assembler refuses to recurse.
const MAX_INCLUDE_DEPTH: usize = 16;

/// The assembler temporary register used by pseudo expansions.
const REG_AT: u32 = 1;

/// One collected assembler diagnostic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    /// Source file name.
    pub file: String,
    /// 1-based line number.
    pub line: usize,
    /// Human-readable message.
    pub message: String,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}: {}", self.file, self.line, self.message)
    }
}

/// Active output section.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Section {
    Text,
    Data,
}

/// The single-pass assembler.
///
/// Borrows the physical address space and the symbol table for the
/// duration of one assembly job; fix-up records live until `finish()`.
pub struct Assembler<'a> {
    mem: &'a mut Bus,
    symtab: &'a mut SymbolTable,
    provider: &'a dyn SourceProvider,
    section: Section,
    text_cursor: u32,
    data_cursor: u32,
    fixups: Vec<Fixup>,
    diagnostics: Vec<Diagnostic>,
    pragmas: Vec<Vec<String>>,
    globals: BTreeSet<String>,
    include_depth: usize,
}

impl<'a> Assembler<'a> {
    /// Creates an assembler writing into `mem` and `symtab`.
    ///
    /// # Arguments
    ///
    /// * `mem` - Target address space.
    /// * `symtab` - Symbol table receiving label definitions.
    /// * `provider` - Source resolution for `.include`.
    /// * `text_base` - Initial `.text` cursor.
    /// * `data_base` - Initial `.data` cursor.
    pub fn new(
        mem: &'a mut Bus,
        symtab: &'a mut SymbolTable,
        provider: &'a dyn SourceProvider,
        text_base: u32,
        data_base: u32,
    ) -> Self {
        Self {
            mem,
            symtab,
            provider,
            section: Section::Text,
            text_cursor: text_base,
            data_cursor: data_base,
            fixups: Vec::new(),
            diagnostics: Vec::new(),
            pragmas: Vec::new(),
            globals: BTreeSet::new(),
            include_depth: 0,
        }
    }

    /// Returns the collected diagnostics.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Takes the collected `#pragma` token lists.
    pub fn take_pragmas(&mut self) -> Vec<Vec<String>> {
        std::mem::take(&mut self.pragmas)
    }

    /// Returns the symbols declared `.globl`.
    pub fn globals(&self) -> impl Iterator<Item = &str> {
        self.globals.iter().map(String::as_str)
    }

    /// Reads and assembles one source file.
    ///
    /// # Returns
    ///
    /// `false` when the file itself could not be read (a diagnostic is
    /// recorded); assembly errors are reported through `finish()`.
    pub fn process_file(&mut self, path: &str) -> bool {
        match self.provider.resolve(path, None) {
            Ok(text) => {
                self.process_source(path, &text);
                true
            }
            Err(err) => {
                self.diagnostics.push(Diagnostic {
                    file: path.to_string(),
                    line: 0,
                    message: err.to_string(),
                });
                false
            }
        }
    }

    /// Assembles in-memory source text under the given file name.
    pub fn process_source(&mut self, file: &str, text: &str) {
        for (idx, line) in text.lines().enumerate() {
            self.process_line(file, idx + 1, line);
        }
    }

    /// Resolves fix-ups and reports whether the image is valid.
    ///
    /// Evaluates every deferred expression against the final symbol table,
    /// patches the memory image, and releases the records.
    pub fn finish(&mut self) -> bool {
        let fixups = std::mem::take(&mut self.fixups);
        for fix in fixups {
            let value = match fix.expr.eval(self.symtab, fix.dot) {
                Ok(value) => value,
                Err(err) => {
                    self.diagnostics.push(Diagnostic {
                        file: fix.loc.file.clone(),
                        line: fix.loc.line,
                        message: err.to_string(),
                    });
                    continue;
                }
            };
            let word = match self.read_word_bytes(fix.addr) {
                Some(word) => word,
                None => {
                    self.diagnostics.push(Diagnostic {
                        file: fix.loc.file.clone(),
                        line: fix.loc.line,
                        message: format!("patch address {:#010x} is not mapped", fix.addr),
                    });
                    continue;
                }
            };
            match fix.apply(value, word) {
                Ok(patched) => self.write_word_bytes(fix.addr, patched),
                Err(message) => self.diagnostics.push(Diagnostic {
                    file: fix.loc.file.clone(),
                    line: fix.loc.line,
                    message,
                }),
            }
        }
        self.diagnostics.is_empty()
    }

    // ── Cursor and memory helpers ──────────────────────────────────────

    fn cursor(&self) -> u32 {
        match self.section {
            Section::Text => self.text_cursor,
            Section::Data => self.data_cursor,
        }
    }

    fn cursor_mut(&mut self) -> &mut u32 {
        match self.section {
            Section::Text => &mut self.text_cursor,
            Section::Data => &mut self.data_cursor,
        }
    }

    fn align_to(&mut self, alignment: u32) {
        let cursor = self.cursor_mut();
        *cursor = cursor.wrapping_add(alignment - 1) & !(alignment - 1);
    }

    fn diag(&mut self, loc: &SourceLoc, message: String) {
        self.diagnostics.push(Diagnostic {
            file: loc.file.clone(),
            line: loc.line,
            message,
        });
    }

    fn read_word_bytes(&mut self, addr: u32) -> Option<u32> {
        let mut word = 0u32;
        for i in 0..4 {
            let byte = self
                .mem
                .read(addr.wrapping_add(i), AccessWidth::Byte, AccessSource::Debugger)
                .ok()?;
            word = (word << 8) | byte;
        }
        Some(word)
    }

    fn write_word_bytes(&mut self, addr: u32, word: u32) {
        for i in 0..4 {
            let byte = (word >> (8 * (3 - i))) & 0xff;
            let _ = self.mem.write(
                addr.wrapping_add(i),
                AccessWidth::Byte,
                byte,
                AccessSource::Debugger,
            );
        }
    }

    /// Emits one byte at the cursor.
    fn emit_byte(&mut self, loc: &SourceLoc, byte: u8) {
        let addr = self.cursor();
        if self
            .mem
            .write(addr, AccessWidth::Byte, u32::from(byte), AccessSource::Debugger)
            .is_err()
        {
            self.diag(loc, format!("address {:#010x} is not mapped", addr));
        }
        *self.cursor_mut() = addr.wrapping_add(1);
    }

    /// Emits one word at the cursor (no alignment requirement).
    fn emit_word(&mut self, loc: &SourceLoc, word: u32) {
        for i in 0..4 {
            self.emit_byte(loc, (word >> (8 * (3 - i))) as u8);
        }
    }

    /// Emits one instruction word, aligning the cursor first.
    fn emit_plain(&mut self, loc: &SourceLoc, word: u32) {
        self.align_to(4);
        self.emit_word(loc, word);
    }

    /// Emits an instruction whose immediate field depends on `expr`.
    ///
    /// Resolvable expressions are patched immediately (range errors become
    /// diagnostics); unresolved ones emit the base encoding and record a
    /// fix-up.
    fn emit_with_reloc(&mut self, loc: &SourceLoc, base: u32, kind: RelocKind, expr: Expr) {
        self.align_to(4);
        let addr = self.cursor();
        let fix = Fixup {
            addr,
            kind,
            expr,
            dot: addr,
            loc: loc.clone(),
        };
        match fix.expr.eval(self.symtab, addr) {
            Ok(value) => match fix.apply(value, base) {
                Ok(word) => self.emit_word(loc, word),
                Err(message) => {
                    self.diag(loc, message);
                    self.emit_word(loc, base);
                }
            },
            Err(EvalError::Undefined(_)) => {
                self.emit_word(loc, base);
                self.fixups.push(fix);
            }
            Err(err) => {
                self.diag(loc, err.to_string());
                self.emit_word(loc, base);
            }
        }
    }

    // ── Line handling ──────────────────────────────────────────────────

    fn process_line(&mut self, file: &str, line_no: usize, raw: &str) {
        let loc = SourceLoc {
            file: file.to_string(),
            line: line_no,
        };

        let trimmed = raw.trim_start();
        if let Some(rest) = trimmed.strip_prefix("#pragma") {
            if rest.is_empty() || rest.starts_with(char::is_whitespace) {
                self.pragmas
                    .push(rest.split_whitespace().map(str::to_string).collect());
                return;
            }
        }

        let (code, comment) = split_comment(raw);
        if comment.starts_with("pragma") && !code.trim().is_empty() {
            self.diag(&loc, "#pragma must start a statement".to_string());
        }

        let mut rest = code.trim();
        while let Some((label, tail)) = split_label(rest) {
            if self.symtab.define(label, self.cursor()).is_err() {
                self.diag(&loc, format!("symbol '{}' is already defined", label));
            }
            rest = tail.trim();
        }

        if rest.is_empty() {
            return;
        }
        if rest.starts_with('.') {
            self.directive(&loc, rest);
        } else {
            self.instruction(&loc, rest);
        }
    }

    // ── Operand helpers ────────────────────────────────────────────────

    fn want_ops(&mut self, loc: &SourceLoc, name: &str, ops: &[String], n: usize) -> bool {
        if ops.len() == n {
            true
        } else {
            self.diag(
                loc,
                format!("'{}' expects {} operand(s), got {}", name, n, ops.len()),
            );
            false
        }
    }

    fn want_reg(&mut self, loc: &SourceLoc, text: &str) -> Option<u32> {
        match parse_register(text) {
            Some(reg) => Some(reg),
            None => {
                self.diag(loc, format!("'{}' is not a register", text));
                None
            }
        }
    }

    fn want_expr(&mut self, loc: &SourceLoc, text: &str) -> Option<Expr> {
        match Expr::parse(text) {
            Ok(expr) => Some(expr),
            Err(err) => {
                self.diag(loc, err.to_string());
                None
            }
        }
    }

    /// Evaluates an expression that must resolve immediately.
    fn want_value(&mut self, loc: &SourceLoc, text: &str) -> Option<u32> {
        let expr = self.want_expr(loc, text)?;
        match expr.eval(self.symtab, self.cursor()) {
            Ok(value) => Some(value),
            Err(err) => {
                self.diag(loc, err.to_string());
                None
            }
        }
    }

    /// Evaluates a 16-bit immediate; signed and unsigned ranges accepted.
    fn imm16_or_fixup(
        &mut self,
        loc: &SourceLoc,
        base: u32,
        text: &str,
    ) -> Option<(u32, Option<Expr>)> {
        let expr = self.want_expr(loc, text)?;
        match expr.eval(self.symtab, self.cursor()) {
            Ok(value) => {
                let fits_unsigned = value <= 0xffff;
                let fits_negative = (value as i32) < 0 && (value as i32) >= i32::from(i16::MIN);
                if !fits_unsigned && !fits_negative {
                    self.diag(loc, format!("immediate {:#x} does not fit 16 bits", value));
                    return None;
                }
                Some((base | (value & 0xffff), None))
            }
            Err(EvalError::Undefined(_)) => Some((base, Some(expr))),
            Err(err) => {
                self.diag(loc, err.to_string());
                None
            }
        }
    }

    // ── Directives ─────────────────────────────────────────────────────

    fn directive(&mut self, loc: &SourceLoc, text: &str) {
        let (name, rest) = split_mnemonic(text);
        let name = name.to_ascii_lowercase();
        let ops = split_operands(rest);

        match name.as_str() {
            ".text" | ".data" => {
                self.section = if name == ".text" {
                    Section::Text
                } else {
                    Section::Data
                };
                if let Some(arg) = ops.first() {
                    if let Some(addr) = self.want_value(loc, arg) {
                        *self.cursor_mut() = addr;
                    }
                }
            }
            ".org" => {
                if self.want_ops(loc, ".org", &ops, 1) {
                    if let Some(addr) = self.want_value(loc, &ops[0]) {
                        *self.cursor_mut() = addr;
                    }
                }
            }
            ".word" => {
                for opnd in &ops {
                    if let Some(expr) = self.want_expr(loc, opnd) {
                        self.emit_data_word(loc, expr);
                    }
                }
            }
            ".half" => {
                for opnd in &ops {
                    if let Some(value) = self.want_value(loc, opnd) {
                        let fits = value <= 0xffff
                            || ((value as i32) < 0 && (value as i32) >= i32::from(i16::MIN));
                        if !fits {
                            self.diag(loc, format!("value {:#x} does not fit 16 bits", value));
                            continue;
                        }
                        self.emit_byte(loc, (value >> 8) as u8);
                        self.emit_byte(loc, value as u8);
                    }
                }
            }
            ".byte" => {
                for opnd in &ops {
                    if let Some(value) = self.want_value(loc, opnd) {
                        let fits = value <= 0xff || ((value as i32) < 0 && (value as i32) >= -128);
                        if !fits {
                            self.diag(loc, format!("value {:#x} does not fit 8 bits", value));
                            continue;
                        }
                        self.emit_byte(loc, value as u8);
                    }
                }
            }
            ".ascii" | ".asciz" => {
                for opnd in &ops {
                    match parse_string(opnd) {
                        Ok(bytes) => {
                            for byte in bytes {
                                self.emit_byte(loc, byte);
                            }
                            if name == ".asciz" {
                                self.emit_byte(loc, 0);
                            }
                        }
                        Err(message) => self.diag(loc, message),
                    }
                }
            }
            ".space" | ".skip" => {
                if ops.is_empty() || ops.len() > 2 {
                    self.diag(loc, format!("'{}' expects 1 or 2 operands", name));
                    return;
                }
                let count = match self.want_value(loc, &ops[0]) {
                    Some(count) => count,
                    None => return,
                };
                let fill = match ops.get(1) {
                    Some(arg) => match self.want_value(loc, arg) {
                        Some(fill) => fill as u8,
                        None => return,
                    },
                    None => 0,
                };
                for _ in 0..count {
                    self.emit_byte(loc, fill);
                }
            }
            ".set" | ".equ" => {
                if ops.len() == 1 {
                    // Assembler mode flags; accepted for source compatibility.
                    let mode = ops[0].to_ascii_lowercase();
                    if matches!(
                        mode.as_str(),
                        "noat" | "at" | "noreorder" | "reorder" | "nomacro" | "macro"
                    ) {
                        return;
                    }
                }
                if !self.want_ops(loc, &name, &ops, 2) {
                    return;
                }
                let value = match self.want_value(loc, &ops[1]) {
                    Some(value) => value,
                    None => return,
                };
                if self.symtab.define(&ops[0], value).is_err() {
                    self.diag(loc, format!("symbol '{}' is already defined", ops[0]));
                }
            }
            ".globl" | ".global" => {
                for opnd in &ops {
                    self.globals.insert(opnd.clone());
                }
            }
            ".include" => {
                if !self.want_ops(loc, ".include", &ops, 1) {
                    return;
                }
                match parse_string(&ops[0]) {
                    Ok(bytes) => {
                        let path = String::from_utf8_lossy(&bytes).to_string();
                        self.include(loc, &path);
                    }
                    Err(message) => self.diag(loc, message),
                }
            }
            _ => self.diag(loc, format!("unknown directive '{}'", name)),
        }
    }

    fn include(&mut self, loc: &SourceLoc, path: &str) {
        if self.include_depth >= MAX_INCLUDE_DEPTH {
            self.diag(loc, format!("includes nested too deeply at '{}'", path));
            return;
        }
        match self.provider.resolve(path, Some(&loc.file)) {
            Ok(text) => {
                self.include_depth += 1;
                self.process_source(path, &text);
                self.include_depth -= 1;
            }
            Err(err) => self.diag(loc, err.to_string()),
        }
    }

    fn emit_data_word(&mut self, loc: &SourceLoc, expr: Expr) {
        let addr = self.cursor();
        let fix = Fixup {
            addr,
            kind: RelocKind::Word32,
            expr,
            dot: addr,
            loc: loc.clone(),
        };
        match fix.expr.eval(self.symtab, addr) {
            Ok(value) => self.emit_word(loc, value),
            Err(EvalError::Undefined(_)) => {
                self.emit_word(loc, 0);
                self.fixups.push(fix);
            }
            Err(err) => {
                self.diag(loc, err.to_string());
                self.emit_word(loc, 0);
            }
        }
    }

    // ── Instructions ───────────────────────────────────────────────────

    fn instruction(&mut self, loc: &SourceLoc, text: &str) {
        let (mnemonic, rest) = split_mnemonic(text);
        let mnemonic = mnemonic.to_ascii_lowercase();
        let ops = split_operands(rest);

        match mnemonic.as_str() {
            "add" | "addu" | "sub" | "subu" | "and" | "or" | "xor" | "nor" | "slt" | "sltu" => {
                let code = match mnemonic.as_str() {
                    "add" => funct::ADD,
                    "addu" => funct::ADDU,
                    "sub" => funct::SUB,
                    "subu" => funct::SUBU,
                    "and" => funct::AND,
                    "or" => funct::OR,
                    "xor" => funct::XOR,
                    "nor" => funct::NOR,
                    "slt" => funct::SLT,
                    _ => funct::SLTU,
                };
                if self.want_ops(loc, &mnemonic, &ops, 3) {
                    if let (Some(rd), Some(rs), Some(rt)) = (
                        self.want_reg(loc, &ops[0]),
                        self.want_reg(loc, &ops[1]),
                        self.want_reg(loc, &ops[2]),
                    ) {
                        self.emit_plain(loc, encode_r(code, rs, rt, rd, 0));
                    }
                }
            }
            "sll" | "srl" | "sra" => {
                let code = match mnemonic.as_str() {
                    "sll" => funct::SLL,
                    "srl" => funct::SRL,
                    _ => funct::SRA,
                };
                if self.want_ops(loc, &mnemonic, &ops, 3) {
                    if let (Some(rd), Some(rt), Some(sa)) = (
                        self.want_reg(loc, &ops[0]),
                        self.want_reg(loc, &ops[1]),
                        self.want_value(loc, &ops[2]),
                    ) {
                        if sa > 31 {
                            self.diag(loc, format!("shift amount {} out of range", sa));
                        } else {
                            self.emit_plain(loc, encode_r(code, 0, rt, rd, sa));
                        }
                    }
                }
            }
            "sllv" | "srlv" | "srav" => {
                let code = match mnemonic.as_str() {
                    "sllv" => funct::SLLV,
                    "srlv" => funct::SRLV,
                    _ => funct::SRAV,
                };
                if self.want_ops(loc, &mnemonic, &ops, 3) {
                    if let (Some(rd), Some(rt), Some(rs)) = (
                        self.want_reg(loc, &ops[0]),
                        self.want_reg(loc, &ops[1]),
                        self.want_reg(loc, &ops[2]),
                    ) {
                        self.emit_plain(loc, encode_r(code, rs, rt, rd, 0));
                    }
                }
            }
            "jr" => {
                if self.want_ops(loc, "jr", &ops, 1) {
                    if let Some(rs) = self.want_reg(loc, &ops[0]) {
                        self.emit_plain(loc, encode_r(funct::JR, rs, 0, 0, 0));
                    }
                }
            }
            "jalr" => match ops.len() {
                1 => {
                    if let Some(rs) = self.want_reg(loc, &ops[0]) {
                        self.emit_plain(loc, encode_r(funct::JALR, rs, 0, 31, 0));
                    }
                }
                2 => {
                    if let (Some(rd), Some(rs)) =
                        (self.want_reg(loc, &ops[0]), self.want_reg(loc, &ops[1]))
                    {
                        self.emit_plain(loc, encode_r(funct::JALR, rs, 0, rd, 0));
                    }
                }
                n => self.diag(loc, format!("'jalr' expects 1 or 2 operands, got {}", n)),
            },
            "syscall" => self.emit_plain(loc, encode_r(funct::SYSCALL, 0, 0, 0, 0)),
            "break" => self.emit_plain(loc, encode_r(funct::BREAK, 0, 0, 0, 0)),
            "mfhi" | "mflo" => {
                let code = if mnemonic == "mfhi" {
                    funct::MFHI
                } else {
                    funct::MFLO
                };
                if self.want_ops(loc, &mnemonic, &ops, 1) {
                    if let Some(rd) = self.want_reg(loc, &ops[0]) {
                        self.emit_plain(loc, encode_r(code, 0, 0, rd, 0));
                    }
                }
            }
            "mthi" | "mtlo" => {
                let code = if mnemonic == "mthi" {
                    funct::MTHI
                } else {
                    funct::MTLO
                };
                if self.want_ops(loc, &mnemonic, &ops, 1) {
                    if let Some(rs) = self.want_reg(loc, &ops[0]) {
                        self.emit_plain(loc, encode_r(code, rs, 0, 0, 0));
                    }
                }
            }
            "mult" | "multu" | "div" | "divu" => {
                let code = match mnemonic.as_str() {
                    "mult" => funct::MULT,
                    "multu" => funct::MULTU,
                    "div" => funct::DIV,
                    _ => funct::DIVU,
                };
                if self.want_ops(loc, &mnemonic, &ops, 2) {
                    if let (Some(rs), Some(rt)) =
                        (self.want_reg(loc, &ops[0]), self.want_reg(loc, &ops[1]))
                    {
                        self.emit_plain(loc, encode_r(code, rs, rt, 0, 0));
                    }
                }
            }
            "addi" | "addiu" | "slti" | "sltiu" | "andi" | "ori" | "xori" => {
                let opcode = match mnemonic.as_str() {
                    "addi" => op::ADDI,
                    "addiu" => op::ADDIU,
                    "slti" => op::SLTI,
                    "sltiu" => op::SLTIU,
                    "andi" => op::ANDI,
                    "ori" => op::ORI,
                    _ => op::XORI,
                };
                if self.want_ops(loc, &mnemonic, &ops, 3) {
                    if let (Some(rt), Some(rs)) =
                        (self.want_reg(loc, &ops[0]), self.want_reg(loc, &ops[1]))
                    {
                        let base = encode_i(opcode, rs, rt, 0);
                        if let Some((word, pending)) = self.imm16_or_fixup(loc, base, &ops[2]) {
                            match pending {
                                None => self.emit_plain(loc, word),
                                Some(expr) => {
                                    self.emit_with_reloc(loc, base, RelocKind::Lo16, expr)
                                }
                            }
                        }
                    }
                }
            }
            "lui" => {
                if self.want_ops(loc, "lui", &ops, 2) {
                    if let Some(rt) = self.want_reg(loc, &ops[0]) {
                        let base = encode_i(op::LUI, 0, rt, 0);
                        if let Some((word, pending)) = self.imm16_or_fixup(loc, base, &ops[1]) {
                            match pending {
                                None => self.emit_plain(loc, word),
                                Some(expr) => {
                                    self.emit_with_reloc(loc, base, RelocKind::Lo16, expr)
                                }
                            }
                        }
                    }
                }
            }
            "lb" | "lh" | "lw" | "lbu" | "lhu" | "sb" | "sh" | "sw" => {
                let opcode = match mnemonic.as_str() {
                    "lb" => op::LB,
                    "lh" => op::LH,
                    "lw" => op::LW,
                    "lbu" => op::LBU,
                    "lhu" => op::LHU,
                    "sb" => op::SB,
                    "sh" => op::SH,
                    _ => op::SW,
                };
                if self.want_ops(loc, &mnemonic, &ops, 2) {
                    self.memory_op(loc, opcode, &ops[0], &ops[1]);
                }
            }
            "beq" | "bne" => {
                let opcode = if mnemonic == "beq" { op::BEQ } else { op::BNE };
                if self.want_ops(loc, &mnemonic, &ops, 3) {
                    if let (Some(rs), Some(rt), Some(target)) = (
                        self.want_reg(loc, &ops[0]),
                        self.want_reg(loc, &ops[1]),
                        self.want_expr(loc, &ops[2]),
                    ) {
                        let base = encode_i(opcode, rs, rt, 0);
                        self.emit_with_reloc(loc, base, RelocKind::Branch16, target);
                    }
                }
            }
            "blez" | "bgtz" => {
                let opcode = if mnemonic == "blez" {
                    op::BLEZ
                } else {
                    op::BGTZ
                };
                if self.want_ops(loc, &mnemonic, &ops, 2) {
                    if let (Some(rs), Some(target)) =
                        (self.want_reg(loc, &ops[0]), self.want_expr(loc, &ops[1]))
                    {
                        let base = encode_i(opcode, rs, 0, 0);
                        self.emit_with_reloc(loc, base, RelocKind::Branch16, target);
                    }
                }
            }
            "bltz" | "bgez" | "bltzal" | "bgezal" => {
                let code = match mnemonic.as_str() {
                    "bltz" => regimm::BLTZ,
                    "bgez" => regimm::BGEZ,
                    "bltzal" => regimm::BLTZAL,
                    _ => regimm::BGEZAL,
                };
                if self.want_ops(loc, &mnemonic, &ops, 2) {
                    if let (Some(rs), Some(target)) =
                        (self.want_reg(loc, &ops[0]), self.want_expr(loc, &ops[1]))
                    {
                        let base = encode_regimm(code, rs, 0);
                        self.emit_with_reloc(loc, base, RelocKind::Branch16, target);
                    }
                }
            }
            "j" | "jal" => {
                let opcode = if mnemonic == "j" { op::J } else { op::JAL };
                if self.want_ops(loc, &mnemonic, &ops, 1) {
                    if let Some(target) = self.want_expr(loc, &ops[0]) {
                        let base = encode_j(opcode, 0);
                        self.emit_with_reloc(loc, base, RelocKind::Jump26, target);
                    }
                }
            }
            "mfc0" | "mtc0" => {
                let sel = if mnemonic == "mfc0" {
                    cop0::MFC0
                } else {
                    cop0::MTC0
                };
                if self.want_ops(loc, &mnemonic, &ops, 2) {
                    if let (Some(rt), Some(rd)) =
                        (self.want_reg(loc, &ops[0]), self.want_cp0_reg(loc, &ops[1]))
                    {
                        self.emit_plain(loc, encode_cop0(sel, rt, rd));
                    }
                }
            }
            // Pseudo-instructions.
            "nop" => self.emit_plain(loc, 0),
            "move" => {
                if self.want_ops(loc, "move", &ops, 2) {
                    if let (Some(rd), Some(rs)) =
                        (self.want_reg(loc, &ops[0]), self.want_reg(loc, &ops[1]))
                    {
                        self.emit_plain(loc, encode_r(funct::ADDU, 0, rs, rd, 0));
                    }
                }
            }
            "la" => {
                if self.want_ops(loc, "la", &ops, 2) {
                    if let (Some(rd), Some(expr)) =
                        (self.want_reg(loc, &ops[0]), self.want_expr(loc, &ops[1]))
                    {
                        self.emit_la(loc, rd, expr);
                    }
                }
            }
            "li" => {
                if self.want_ops(loc, "li", &ops, 2) {
                    if let (Some(rd), Some(expr)) =
                        (self.want_reg(loc, &ops[0]), self.want_expr(loc, &ops[1]))
                    {
                        self.emit_li(loc, rd, expr);
                    }
                }
            }
            "b" => {
                if self.want_ops(loc, "b", &ops, 1) {
                    if let Some(target) = self.want_expr(loc, &ops[0]) {
                        let base = encode_i(op::BEQ, 0, 0, 0);
                        self.emit_with_reloc(loc, base, RelocKind::Branch16, target);
                    }
                }
            }
            "beqz" | "bnez" => {
                let opcode = if mnemonic == "beqz" { op::BEQ } else { op::BNE };
                if self.want_ops(loc, &mnemonic, &ops, 2) {
                    if let (Some(rs), Some(target)) =
                        (self.want_reg(loc, &ops[0]), self.want_expr(loc, &ops[1]))
                    {
                        let base = encode_i(opcode, rs, 0, 0);
                        self.emit_with_reloc(loc, base, RelocKind::Branch16, target);
                    }
                }
            }
            _ => self.diag(loc, format!("unknown instruction '{}'", mnemonic)),
        }
    }

    /// Parses a COP0 register operand: `$n` or a plain expression.
    fn want_cp0_reg(&mut self, loc: &SourceLoc, text: &str) -> Option<u32> {
        let text = text.trim();
        let value = if let Some(number) = text.strip_prefix('$') {
            number.parse::<u32>().ok()
        } else {
            self.want_value(loc, text)
        };
        match value {
            Some(reg) if reg < 32 => Some(reg),
            _ => {
                self.diag(loc, format!("'{}' is not a coprocessor register", text));
                None
            }
        }
    }

    /// Emits a load/store with either `offset(base)` or absolute addressing.
    fn memory_op(&mut self, loc: &SourceLoc, opcode: u32, rt_text: &str, addr_text: &str) {
        let rt = match self.want_reg(loc, rt_text) {
            Some(rt) => rt,
            None => return,
        };
        match split_mem_operand(addr_text) {
            Some((offset_text, base_text)) => {
                let base_reg = match self.want_reg(loc, base_text) {
                    Some(reg) => reg,
                    None => return,
                };
                let base = encode_i(opcode, base_reg, rt, 0);
                if offset_text.trim().is_empty() {
                    self.emit_plain(loc, base);
                    return;
                }
                if let Some((word, pending)) = self.imm16_or_fixup(loc, base, offset_text) {
                    match pending {
                        None => self.emit_plain(loc, word),
                        Some(expr) => self.emit_with_reloc(loc, base, RelocKind::Lo16, expr),
                    }
                }
            }
            None => {
                // Absolute address: la $at, addr ; op rt, 0($at).
                match self.want_expr(loc, addr_text) {
                    Some(expr) => {
                        self.emit_la(loc, REG_AT, expr);
                        self.emit_plain(loc, encode_i(opcode, REG_AT, rt, 0));
                    }
                    None => {}
                }
            }
        }
    }

    /// Emits `lui rd, hi` ; `ori rd, rd, lo` for a 32-bit address.
    fn emit_la(&mut self, loc: &SourceLoc, rd: u32, expr: Expr) {
        let lui = encode_i(op::LUI, 0, rd, 0);
        let ori = encode_i(op::ORI, rd, rd, 0);
        self.emit_with_reloc(loc, lui, RelocKind::Hi16, expr.clone());
        self.emit_with_reloc(loc, ori, RelocKind::Lo16, expr);
    }

    /// Emits the shortest encoding of `li rd, value`.
    fn emit_li(&mut self, loc: &SourceLoc, rd: u32, expr: Expr) {
        self.align_to(4);
        match expr.eval(self.symtab, self.cursor()) {
            Ok(value) => {
                let signed = value as i32;
                if (-0x8000..0x8000).contains(&signed) {
                    self.emit_plain(loc, encode_i(op::ADDIU, 0, rd, value as u16));
                } else if value <= 0xffff {
                    self.emit_plain(loc, encode_i(op::ORI, 0, rd, value as u16));
                } else if value & 0xffff == 0 {
                    self.emit_plain(loc, encode_i(op::LUI, 0, rd, (value >> 16) as u16));
                } else {
                    self.emit_plain(loc, encode_i(op::LUI, 0, rd, (value >> 16) as u16));
                    self.emit_plain(loc, encode_i(op::ORI, rd, rd, value as u16));
                }
            }
            Err(EvalError::Undefined(_)) => self.emit_la(loc, rd, expr),
            Err(err) => self.diag(loc, err.to_string()),
        }
    }
}

// ── Lexical helpers ────────────────────────────────────────────────────

/// Splits a line into code and comment at the first `#` outside a string.
fn split_comment(line: &str) -> (&str, &str) {
    let mut in_string = false;
    let mut escaped = false;
    for (idx, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '#' if !in_string => return (&line[..idx], &line[idx + 1..]),
            _ => {}
        }
    }
    (line, "")
}

/// Splits a leading `label:` off a statement, if present.
fn split_label(text: &str) -> Option<(&str, &str)> {
    let mut end = 0;
    for (idx, c) in text.char_indices() {
        if idx == 0 {
            if !(c.is_ascii_alphabetic() || c == '_') {
                return None;
            }
        } else if !(c.is_ascii_alphanumeric() || c == '_' || c == '.') {
            end = idx;
            break;
        }
        end = idx + c.len_utf8();
    }
    if end == 0 {
        return None;
    }
    let rest = text[end..].trim_start();
    let label = &text[..end];
    rest.strip_prefix(':').map(|tail| (label, tail))
}

/// Splits a statement into its mnemonic and the operand text.
fn split_mnemonic(text: &str) -> (&str, &str) {
    match text.find(char::is_whitespace) {
        Some(idx) => (&text[..idx], text[idx..].trim_start()),
        None => (text, ""),
    }
}

/// Splits operand text at top-level commas (outside quotes and parens).
fn split_operands(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    let mut current = String::new();
    for c in text.chars() {
        if escaped {
            escaped = false;
            current.push(c);
            continue;
        }
        match c {
            '\\' if in_string => {
                escaped = true;
                current.push(c);
            }
            '"' => {
                in_string = !in_string;
                current.push(c);
            }
            '(' if !in_string => {
                depth += 1;
                current.push(c);
            }
            ')' if !in_string => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' if !in_string && depth == 0 => {
                out.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    let last = current.trim();
    if !last.is_empty() {
        out.push(last.to_string());
    }
    out
}

/// Splits `offset(base)` into its parts; `None` when there is no base.
fn split_mem_operand(text: &str) -> Option<(&str, &str)> {
    let text = text.trim();
    if !text.ends_with(')') {
        return None;
    }
    let open = text.rfind('(')?;
    let base = &text[open + 1..text.len() - 1];
    if !base.trim_start().starts_with('$') {
        return None;
    }
    Some((&text[..open], base.trim()))
}

/// Parses a register operand: `$0`-`$31` or a conventional `$name`.
fn parse_register(text: &str) -> Option<u32> {
    let name = text.trim().strip_prefix('$')?;
    if let Ok(index) = name.parse::<u32>() {
        return (index < 32).then_some(index);
    }
    REGISTER_NAMES
        .iter()
        .position(|&reg| reg == name)
        .map(|index| index as u32)
}

/// Parses a double-quoted string literal with escapes.
fn parse_string(text: &str) -> Result<Vec<u8>, String> {
    let text = text.trim();
    let inner = text
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .ok_or_else(|| format!("'{}' is not a string literal", text))?;
    let mut bytes = Vec::new();
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            let mut buf = [0u8; 4];
            bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            continue;
        }
        match chars.next() {
            Some('n') => bytes.push(b'\n'),
            Some('t') => bytes.push(b'\t'),
            Some('r') => bytes.push(b'\r'),
            Some('0') => bytes.push(0),
            Some('\\') => bytes.push(b'\\'),
            Some('"') => bytes.push(b'"'),
            Some(other) => return Err(format!("unknown escape '\\{}'", other)),
            None => return Err("trailing backslash in string".to_string()),
        }
    }
    Ok(bytes)
}
