//! LCD frame buffer peripheral.
//!
//! A 480x320 display with 16-bit RGB565 pixels exposed as a flat frame
//! buffer. The program renders by storing pixels; the host reads the
//! buffer back for presentation. Reads and writes of any width are
//! supported and big-endian within each word, matching RAM semantics.

use crate::common::constants::{LCD_HEIGHT, LCD_WIDTH};
use crate::common::data::{AccessSource, AccessWidth};
use crate::soc::memory::Memory;
use crate::soc::traits::Backend;

/// LCD frame buffer device state.
///
/// Pixel storage reuses the paged RAM backend; a full-screen render touches
/// every page, an idle program costs nothing.
pub struct LcdDisplay {
    fb: Memory,
}

impl LcdDisplay {
    /// Creates a cleared display.
    pub fn new() -> Self {
        Self {
            fb: Memory::new(Self::window()),
        }
    }

    /// Size of the frame buffer window in bytes.
    fn window() -> u32 {
        LCD_WIDTH * LCD_HEIGHT * 2
    }

    /// Returns the RGB565 pixel at the given coordinates.
    ///
    /// Out-of-range coordinates return 0.
    pub fn pixel(&self, x: u32, y: u32) -> u16 {
        if x >= LCD_WIDTH || y >= LCD_HEIGHT {
            return 0;
        }
        let offset = (y * LCD_WIDTH + x) * 2;
        let word = self.fb.read_word(offset);
        if offset & 2 == 0 {
            (word >> 16) as u16
        } else {
            word as u16
        }
    }
}

impl Default for LcdDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for LcdDisplay {
    fn name(&self) -> &str {
        "LCD"
    }

    fn size(&self) -> u32 {
        Self::window()
    }

    fn read(&mut self, offset: u32, width: AccessWidth, source: AccessSource) -> u32 {
        self.fb.read(offset, width, source)
    }

    fn write(&mut self, offset: u32, width: AccessWidth, value: u32, source: AccessSource) {
        // Frame buffer writes are plain stores; debugger writes are allowed
        // so the host can clear or preload the display.
        self.fb.write(offset, width, value, source);
    }

    fn as_lcd_mut(&mut self) -> Option<&mut LcdDisplay> {
        Some(self)
    }
}
