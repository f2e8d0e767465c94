//! Backend trait for memory and memory-mapped I/O.
//!
//! This module defines the `Backend` trait implemented by all bus-attached
//! components. It provides:
//! 1. **Identification:** `name` and `size` for bus registration and reporting.
//! 2. **Access:** Width-tagged reads and writes at backend-relative offsets.
//! 3. **Downcasting:** Optional casts to the concrete RAM and peripheral types
//!    for host-side access (output draining, input injection, inspection).
//!
//! Alignment and range checking happen in the bus before dispatch, so backends
//! receive only in-range, aligned offsets. Backends must honour the access
//! source: a `Debugger` probe may not trigger observable side effects.

use crate::common::data::{AccessSource, AccessWidth};
use crate::soc::devices::{LcdDisplay, SerialPort, Spiled};
use crate::soc::memory::Memory;

/// Trait for components attached to the physical address space.
pub trait Backend {
    /// Returns a short name for this backend (e.g. `"RAM"`, `"SERP"`).
    fn name(&self) -> &str;

    /// Returns the size of the backend's address window in bytes.
    fn size(&self) -> u32;

    /// Reads a value at the given backend-relative offset.
    ///
    /// Sub-word values are returned zero-extended in the low bits. Offsets
    /// with no defined register read as 0.
    fn read(&mut self, offset: u32, width: AccessWidth, source: AccessSource) -> u32;

    /// Writes a value at the given backend-relative offset.
    ///
    /// Sub-word values are taken from the low bits. Writes to offsets with
    /// no defined register are discarded.
    fn write(&mut self, offset: u32, width: AccessWidth, value: u32, source: AccessSource);

    /// Returns whether this backend's window may be held in a cache.
    ///
    /// Peripheral registers change underneath the CPU and observe every
    /// access, so only plain memory returns `true`; the caches pass
    /// accesses to uncacheable windows straight through to the bus.
    fn cacheable(&self) -> bool {
        false
    }

    /// Returns a mutable reference as `Memory` if this backend is RAM.
    fn as_memory_mut(&mut self) -> Option<&mut Memory> {
        None
    }

    /// Returns a mutable reference as `SerialPort` if this backend is the serial port.
    fn as_serial_mut(&mut self) -> Option<&mut SerialPort> {
        None
    }

    /// Returns a mutable reference as `Spiled` if this backend is the dial/LED peripheral.
    fn as_spiled_mut(&mut self) -> Option<&mut Spiled> {
        None
    }

    /// Returns a mutable reference as `LcdDisplay` if this backend is the LCD.
    fn as_lcd_mut(&mut self) -> Option<&mut LcdDisplay> {
        None
    }
}
