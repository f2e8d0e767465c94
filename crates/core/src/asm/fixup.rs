//! Assembler fix-up records.
//!
//! A fix-up is a deferred write whose value depends on symbols that were
//! not yet defined when the statement was emitted. Each record remembers
//! the patch address, the relocation kind, the expression, the location
//! counter to evaluate it with, and the source location for diagnostics.
//! `finish()` is a pure pass over the collected records once all sections
//! have their final sizes.

use crate::asm::expr::Expr;

/// How an evaluated value patches the emitted bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RelocKind {
    /// The full 32-bit value replaces the word.
    Word32,
    /// The value's upper half-word goes into the immediate field.
    Hi16,
    /// The value's lower half-word goes into the immediate field.
    Lo16,
    /// PC-relative word displacement into the immediate field.
    Branch16,
    /// Absolute word target within the current 256 MiB region.
    Jump26,
}

/// Source position for diagnostics.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceLoc {
    /// Source file name.
    pub file: String,
    /// 1-based line number.
    pub line: usize,
}

/// One deferred patch.
#[derive(Clone, Debug)]
pub struct Fixup {
    /// Address of the word to patch.
    pub addr: u32,
    /// Relocation kind.
    pub kind: RelocKind,
    /// The expression producing the value.
    pub expr: Expr,
    /// Location counter (`.`) to evaluate the expression with.
    pub dot: u32,
    /// Where the statement came from.
    pub loc: SourceLoc,
}

impl Fixup {
    /// Patches `word` with the evaluated `value`.
    ///
    /// # Arguments
    ///
    /// * `value` - The evaluated expression value (an absolute address for
    ///   branch and jump kinds).
    /// * `word` - The previously emitted word at `self.addr`.
    ///
    /// # Returns
    ///
    /// The patched word, or a range-error message for the diagnostic.
    pub fn apply(&self, value: u32, word: u32) -> Result<u32, String> {
        match self.kind {
            RelocKind::Word32 => Ok(value),
            RelocKind::Hi16 => Ok((word & !0xffff) | (value >> 16)),
            RelocKind::Lo16 => Ok((word & !0xffff) | (value & 0xffff)),
            RelocKind::Branch16 => {
                let base = self.addr.wrapping_add(4);
                let diff = value.wrapping_sub(base);
                if diff & 3 != 0 {
                    return Err(format!("branch target {:#x} is not word aligned", value));
                }
                let disp = (diff as i32) >> 2;
                if disp < i32::from(i16::MIN) || disp > i32::from(i16::MAX) {
                    return Err(format!("branch target {:#x} is out of range", value));
                }
                Ok((word & !0xffff) | (disp as u32 & 0xffff))
            }
            RelocKind::Jump26 => {
                if value & 3 != 0 {
                    return Err(format!("jump target {:#x} is not word aligned", value));
                }
                let base = self.addr.wrapping_add(4);
                if value >> 28 != base >> 28 {
                    return Err(format!(
                        "jump target {:#x} is outside the current 256 MiB region",
                        value
                    ));
                }
                Ok((word & !0x03ff_ffff) | ((value >> 2) & 0x03ff_ffff))
            }
        }
    }
}
