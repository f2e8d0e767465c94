//! ELF executable loading.
//!
//! Reduces a linked 32-bit big-endian MIPS executable to the core's
//! loading contract: word segments plus symbol definitions. Only loadable
//! program headers and the symbol table are consulted; relocation,
//! dynamic linking, and section metadata are ignored.

use std::fs;
use std::path::Path;

use goblin::elf::program_header::PT_LOAD;
use goblin::elf::Elf;
use mips_core::sim::loader::ImageSegment;

/// A parsed executable ready for `Machine::load_image`.
#[derive(Clone, Debug)]
pub struct ElfImage {
    /// Loadable segments as word runs.
    pub segments: Vec<ImageSegment>,
    /// Symbol table entries with their values.
    pub symbols: Vec<(String, u32)>,
    /// Entry point from the ELF header.
    pub entry: u32,
}

/// Parses an ELF executable from disk.
///
/// # Arguments
///
/// * `path` - The executable file.
///
/// # Returns
///
/// The image, or a message describing why the file is unusable.
pub fn load(path: &Path) -> Result<ElfImage, String> {
    let data = fs::read(path).map_err(|e| format!("cannot read '{}': {}", path.display(), e))?;
    let elf = Elf::parse(&data).map_err(|e| format!("'{}' is not an ELF: {}", path.display(), e))?;

    let mut segments = Vec::new();
    for ph in &elf.program_headers {
        if ph.p_type != PT_LOAD || ph.p_memsz == 0 {
            continue;
        }
        let file_start = ph.p_offset as usize;
        let file_end = file_start + ph.p_filesz as usize;
        if file_end > data.len() {
            return Err(format!(
                "segment at {:#x} extends past the end of the file",
                ph.p_vaddr
            ));
        }
        let mut bytes = data[file_start..file_end].to_vec();
        bytes.resize(ph.p_memsz as usize, 0);
        while bytes.len() % 4 != 0 {
            bytes.push(0);
        }
        let words = bytes
            .chunks_exact(4)
            .map(|chunk| u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect();
        segments.push(ImageSegment {
            base: ph.p_vaddr as u32,
            words,
        });
    }

    let mut symbols = Vec::new();
    for sym in elf.syms.iter() {
        if let Some(name) = elf.strtab.get_at(sym.st_name) {
            if !name.is_empty() {
                symbols.push((name.to_string(), sym.st_value as u32));
            }
        }
    }

    Ok(ElfImage {
        segments,
        symbols,
        entry: elf.header.e_entry as u32,
    })
}
