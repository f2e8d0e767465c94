//! Memory-mapped peripherals.
//!
//! Each peripheral occupies a contiguous address range on the bus and may
//! accept external input from the host between cycles (knob turns, received
//! serial bytes). Debugger probes never trigger side effects.

/// Serial port (terminal) peripheral.
pub mod serial;

/// LCD frame buffer peripheral.
pub mod lcd;

/// Dial knobs and LED peripheral.
pub mod spiled;

pub use lcd::LcdDisplay;
pub use serial::SerialPort;
pub use spiled::Spiled;
