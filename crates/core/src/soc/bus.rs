//! Physical address space (bus) for memory and MMIO access.
//!
//! This module implements the bus that routes physical address accesses to
//! backends. It provides:
//! 1. **Backend registration:** Backends are added by base address; ranges must
//!    be disjoint and are kept sorted for binary-search lookup.
//! 2. **Access routing:** Width-tagged reads and writes with strict alignment
//!    checking; unmapped accesses raise a bus error.
//! 3. **Bulk operations:** Word-range reads and writes powering the loader and
//!    the assembler.
//! 4. **Host access:** Side-effect-free debugger probes and downcast lookup of
//!    the RAM and peripheral backends.

use crate::common::data::{AccessSource, AccessWidth};
use crate::common::error::Trap;
use crate::soc::devices::{LcdDisplay, SerialPort, Spiled};
use crate::soc::memory::Memory;
use crate::soc::traits::Backend;

/// One mapped address range.
struct Region {
    base: u32,
    size: u32,
    backend: Box<dyn Backend>,
}

impl Region {
    fn contains(&self, addr: u32) -> bool {
        addr.wrapping_sub(self.base) < self.size
    }
}

/// Physical address space; routes accesses by address to registered backends.
///
/// Ranges are half-open `[base, base + size)`, disjoint, and sorted by base.
/// Lookup is O(log N) over the region list.
#[derive(Default)]
pub struct Bus {
    regions: Vec<Region>,
}

impl Bus {
    /// Creates an empty address space with no backends.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a backend at the given base address.
    ///
    /// The backend's window is `[base, base + backend.size())`.
    ///
    /// # Panics
    ///
    /// Panics if the new range overlaps an existing one or wraps past the
    /// end of the address space; both indicate a broken machine build.
    pub fn add_backend(&mut self, base: u32, backend: Box<dyn Backend>) {
        let size = backend.size();
        assert!(size > 0, "backend {} has zero size", backend.name());
        assert!(
            base.checked_add(size - 1).is_some(),
            "backend {} wraps the address space",
            backend.name()
        );
        let overlaps = self
            .regions
            .iter()
            .any(|r| base < r.base.wrapping_add(r.size) && r.base < base.wrapping_add(size));
        assert!(!overlaps, "backend {} overlaps an existing range", backend.name());

        self.regions.push(Region {
            base,
            size,
            backend,
        });
        self.regions.sort_by_key(|r| r.base);
    }

    /// Finds the region containing `addr` and returns it with the offset.
    fn find(&mut self, addr: u32) -> Option<(&mut Region, u32)> {
        let idx = match self.regions.binary_search_by(|r| {
            if r.contains(addr) {
                std::cmp::Ordering::Equal
            } else if r.base > addr {
                std::cmp::Ordering::Greater
            } else {
                std::cmp::Ordering::Less
            }
        }) {
            Ok(idx) => idx,
            Err(_) => return None,
        };
        let region = &mut self.regions[idx];
        let offset = addr - region.base;
        Some((region, offset))
    }

    /// Checks that a whole access lies within one region and is aligned.
    fn check(&mut self, addr: u32, width: AccessWidth) -> Result<(), Trap> {
        if !width.is_aligned(addr) {
            return Err(Trap::UnalignedAccess(addr));
        }
        match self.find(addr) {
            Some(_) => Ok(()),
            None => Err(Trap::BusError(addr)),
        }
    }

    /// Reads a value from the address space.
    ///
    /// # Arguments
    ///
    /// * `addr` - Physical address.
    /// * `width` - Access width; `addr` must be aligned to it.
    /// * `source` - Originator; peripherals suppress side effects for
    ///   debugger probes.
    ///
    /// # Returns
    ///
    /// The value zero-extended in the low bits, or an alignment/bus trap.
    pub fn read(&mut self, addr: u32, width: AccessWidth, source: AccessSource) -> Result<u32, Trap> {
        self.check(addr, width)?;
        let (region, offset) = self.find(addr).ok_or(Trap::BusError(addr))?;
        Ok(region.backend.read(offset, width, source))
    }

    /// Writes a value to the address space.
    ///
    /// Sub-word values are taken from the low bits of `value`.
    pub fn write(
        &mut self,
        addr: u32,
        width: AccessWidth,
        value: u32,
        source: AccessSource,
    ) -> Result<(), Trap> {
        self.check(addr, width)?;
        let (region, offset) = self.find(addr).ok_or(Trap::BusError(addr))?;
        region.backend.write(offset, width, value, source);
        Ok(())
    }

    /// Reads one word as the CPU would.
    pub fn read_word(&mut self, addr: u32) -> Result<u32, Trap> {
        self.read(addr, AccessWidth::Word, AccessSource::Cpu)
    }

    /// Writes one word as the CPU would.
    pub fn write_word(&mut self, addr: u32, value: u32) -> Result<(), Trap> {
        self.write(addr, AccessWidth::Word, value, AccessSource::Cpu)
    }

    /// Reads one word without side effects; `None` for unmapped addresses.
    pub fn probe_word(&mut self, addr: u32) -> Option<u32> {
        self.read(addr, AccessWidth::Word, AccessSource::Debugger).ok()
    }

    /// Reads `count` consecutive words starting at `addr`.
    pub fn read_range(&mut self, addr: u32, count: u32) -> Result<Vec<u32>, Trap> {
        let mut words = Vec::with_capacity(count as usize);
        for i in 0..count {
            words.push(self.read(
                addr.wrapping_add(i * 4),
                AccessWidth::Word,
                AccessSource::Debugger,
            )?);
        }
        Ok(words)
    }

    /// Writes consecutive words starting at `addr`.
    pub fn write_range(&mut self, addr: u32, words: &[u32]) -> Result<(), Trap> {
        for (i, word) in words.iter().enumerate() {
            self.write(
                addr.wrapping_add(i as u32 * 4),
                AccessWidth::Word,
                *word,
                AccessSource::Debugger,
            )?;
        }
        Ok(())
    }

    /// Returns whether `addr` is backed by any region.
    pub fn is_mapped(&self, addr: u32) -> bool {
        self.regions.iter().any(|r| r.contains(addr))
    }

    /// Returns whether `addr` may be held in a cache.
    ///
    /// Peripheral windows and unmapped addresses are uncacheable; the
    /// caches pass such accesses straight through to the bus.
    pub fn is_cacheable(&self, addr: u32) -> bool {
        self.regions
            .iter()
            .find(|r| r.contains(addr))
            .is_some_and(|r| r.backend.cacheable())
    }

    /// Returns the RAM backend, if one is registered.
    pub fn memory_mut(&mut self) -> Option<&mut Memory> {
        self.regions
            .iter_mut()
            .find_map(|r| r.backend.as_memory_mut())
    }

    /// Returns the serial port peripheral, if one is registered.
    pub fn serial_mut(&mut self) -> Option<&mut SerialPort> {
        self.regions
            .iter_mut()
            .find_map(|r| r.backend.as_serial_mut())
    }

    /// Returns the dial/LED peripheral, if one is registered.
    pub fn spiled_mut(&mut self) -> Option<&mut Spiled> {
        self.regions
            .iter_mut()
            .find_map(|r| r.backend.as_spiled_mut())
    }

    /// Returns the LCD peripheral, if one is registered.
    pub fn lcd_mut(&mut self) -> Option<&mut LcdDisplay> {
        self.regions.iter_mut().find_map(|r| r.backend.as_lcd_mut())
    }
}
