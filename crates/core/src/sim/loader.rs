//! Range-file loading and dumping, plus raw image population.
//!
//! This module performs:
//! 1. **Range load:** Parses a text file of one integer per non-empty line
//!    (decimal, `0x`, `0o`/leading `0`, or `0b`) and writes the values as
//!    consecutive words starting at an address rounded down to 4.
//! 2. **Range dump:** Writes a text hex dump, one word per line, addresses
//!    ascending.
//! 3. **Image population:** Writes word segments and symbol definitions
//!    into the machine; executable loading reduces to this operation.

use std::fs;
use std::io::Write;
use std::path::Path;

use crate::common::error::Trap;
use crate::sim::symbols::SymbolTable;
use crate::soc::bus::Bus;

/// Error raised by the loader operations.
#[derive(Debug)]
pub enum LoadError {
    /// The underlying file could not be read or written.
    Io(std::io::Error),
    /// A line could not be parsed as an integer.
    Parse {
        /// 1-based line number.
        line: usize,
        /// Offending text.
        text: String,
    },
    /// The target address range is not fully mapped.
    Bus(Trap),
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Io(e) => write!(f, "i/o error: {}", e),
            LoadError::Parse { line, text } => {
                write!(f, "cannot parse range data '{}' on line {}", text, line)
            }
            LoadError::Bus(trap) => write!(f, "range not mapped: {}", trap),
        }
    }
}

impl std::error::Error for LoadError {}

impl From<std::io::Error> for LoadError {
    fn from(e: std::io::Error) -> Self {
        LoadError::Io(e)
    }
}

impl From<Trap> for LoadError {
    fn from(t: Trap) -> Self {
        LoadError::Bus(t)
    }
}

/// Parses an unsigned integer in any standard base.
///
/// Accepts `0x`/`0X` hexadecimal, `0b`/`0B` binary, a leading `0` as octal,
/// and decimal otherwise, with an optional leading `+`.
pub fn parse_u32_any(text: &str) -> Option<u32> {
    let t = text.trim().strip_prefix('+').unwrap_or(text.trim());
    if t.is_empty() {
        return None;
    }
    let lower = t.to_ascii_lowercase();
    if let Some(hex) = lower.strip_prefix("0x") {
        u32::from_str_radix(hex, 16).ok()
    } else if let Some(bin) = lower.strip_prefix("0b") {
        u32::from_str_radix(bin, 2).ok()
    } else if lower.len() > 1 && lower.starts_with('0') {
        u32::from_str_radix(&lower[1..], 8).ok()
    } else {
        lower.parse().ok()
    }
}

/// Loads a range file into memory.
///
/// # Arguments
///
/// * `bus` - The physical address space to write.
/// * `start` - First target address; rounded down to a word boundary.
/// * `path` - Range file: one integer per non-empty line.
///
/// # Returns
///
/// The number of words written.
pub fn load_range(bus: &mut Bus, start: u32, path: &Path) -> Result<u32, LoadError> {
    let content = fs::read_to_string(path)?;
    let mut addr = start & !3;
    let mut written = 0;
    for (idx, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let value = parse_u32_any(trimmed).ok_or_else(|| LoadError::Parse {
            line: idx + 1,
            text: trimmed.to_string(),
        })?;
        bus.write_range(addr, &[value])?;
        addr = addr.wrapping_add(4);
        written += 1;
    }
    Ok(written)
}

/// Dumps `length` bytes starting at `start` as a hex text file.
///
/// One word per line, addresses ascending; the length is rounded up to a
/// whole number of words.
pub fn dump_range(bus: &mut Bus, start: u32, length: u32, path: &Path) -> Result<(), LoadError> {
    let mut file = fs::File::create(path)?;
    let start = start & !3;
    let words = length.div_ceil(4);
    for i in 0..words {
        let word = bus
            .probe_word(start.wrapping_add(i * 4))
            .ok_or(LoadError::Bus(Trap::BusError(start.wrapping_add(i * 4))))?;
        writeln!(file, "0x{:08x}", word)?;
    }
    Ok(())
}

/// One contiguous piece of a program image.
#[derive(Clone, Debug)]
pub struct ImageSegment {
    /// Load address of the first word.
    pub base: u32,
    /// The words to place there.
    pub words: Vec<u32>,
}

/// Populates memory and the symbol table from a prepared image.
///
/// This is the loading contract an executable front end reduces to:
/// segments of words plus symbol definitions. Existing symbols win over
/// image symbols with the same name.
pub fn load_image(
    bus: &mut Bus,
    symtab: &mut SymbolTable,
    segments: &[ImageSegment],
    symbols: &[(String, u32)],
) -> Result<(), LoadError> {
    for segment in segments {
        bus.write_range(segment.base, &segment.words)?;
    }
    for (name, value) in symbols {
        let _ = symtab.define(name, *value);
    }
    Ok(())
}
