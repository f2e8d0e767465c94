//! Dial knobs and LED peripheral.
//!
//! Models a small I/O board: a line of 32 LEDs, two RGB LEDs, and three
//! 8-bit dial knobs with push buttons. The program drives the LEDs with
//! stores; the host sets knob positions and button states between cycles
//! and inspects the LED registers.
//!
//! # Registers
//!
//! * `0x04`: LED line (read/write): 32 individual LEDs.
//! * `0x10`: RGB LED 1 (read/write): `0x00RRGGBB`.
//! * `0x14`: RGB LED 2 (read/write): `0x00RRGGBB`.
//! * `0x24`: Knobs (read): buttons in bits 26-24, knob bytes in bits 23-0.

use crate::common::data::{AccessSource, AccessWidth};
use crate::soc::traits::Backend;

/// LED line register offset.
const REG_LED_LINE: u32 = 0x04;
/// First RGB LED register offset.
const REG_LED_RGB1: u32 = 0x10;
/// Second RGB LED register offset.
const REG_LED_RGB2: u32 = 0x14;
/// Knob and button register offset.
const REG_KNOBS: u32 = 0x24;

/// Size of the register window in bytes.
const WINDOW: u32 = 0x100;

/// Dial/LED device state.
#[derive(Default)]
pub struct Spiled {
    led_line: u32,
    led_rgb1: u32,
    led_rgb2: u32,
    knobs: [u8; 3],
    buttons: u8,
}

impl Spiled {
    /// Creates the peripheral with all LEDs off and knobs at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the three knob positions; call between cycles only.
    pub fn set_knobs(&mut self, r: u8, g: u8, b: u8) {
        self.knobs = [r, g, b];
    }

    /// Sets the three push-button states in bits 2-0; call between cycles only.
    pub fn set_buttons(&mut self, buttons: u8) {
        self.buttons = buttons & 0x7;
    }

    /// Returns the LED line register.
    pub fn led_line(&self) -> u32 {
        self.led_line
    }

    /// Returns the first RGB LED register.
    pub fn led_rgb1(&self) -> u32 {
        self.led_rgb1
    }

    /// Returns the second RGB LED register.
    pub fn led_rgb2(&self) -> u32 {
        self.led_rgb2
    }

    fn knob_word(&self) -> u32 {
        (u32::from(self.buttons) << 24)
            | (u32::from(self.knobs[0]) << 16)
            | (u32::from(self.knobs[1]) << 8)
            | u32::from(self.knobs[2])
    }
}

impl Backend for Spiled {
    fn name(&self) -> &str {
        "SPILED"
    }

    fn size(&self) -> u32 {
        WINDOW
    }

    fn read(&mut self, offset: u32, _width: AccessWidth, _source: AccessSource) -> u32 {
        match offset & !3 {
            REG_LED_LINE => self.led_line,
            REG_LED_RGB1 => self.led_rgb1,
            REG_LED_RGB2 => self.led_rgb2,
            REG_KNOBS => self.knob_word(),
            _ => 0,
        }
    }

    fn write(&mut self, offset: u32, _width: AccessWidth, value: u32, source: AccessSource) {
        if !source.allows_side_effects() {
            return;
        }
        match offset & !3 {
            REG_LED_LINE => self.led_line = value,
            REG_LED_RGB1 => self.led_rgb1 = value & 0x00ff_ffff,
            REG_LED_RGB2 => self.led_rgb2 = value & 0x00ff_ffff,
            _ => {}
        }
    }

    fn as_spiled_mut(&mut self) -> Option<&mut Spiled> {
        Some(self)
    }
}
