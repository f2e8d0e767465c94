//! Serial port peripheral.
//!
//! A minimal memory-mapped UART-style terminal. Receive data is injected by
//! the host between cycles with `receive_byte`; transmitted bytes are
//! buffered and either drained by the host or forwarded to an attached
//! writer (the CLI attaches stdout).
//!
//! # Registers
//!
//! * `0x00`: Receive status (read): bit 0 set when a received byte is ready.
//! * `0x04`: Receive data (read): pops the oldest received byte.
//! * `0x08`: Transmit status (read): bit 0 set when the transmitter is ready.
//! * `0x0c`: Transmit data (write): sends the low byte.

use std::collections::VecDeque;
use std::io::Write;

use crate::common::data::{AccessSource, AccessWidth};
use crate::soc::traits::Backend;

/// Receive status register offset.
const REG_RX_ST: u32 = 0x00;
/// Receive data register offset.
const REG_RX_DATA: u32 = 0x04;
/// Transmit status register offset.
const REG_TX_ST: u32 = 0x08;
/// Transmit data register offset.
const REG_TX_DATA: u32 = 0x0c;

/// Status register: data-ready / transmitter-ready bit.
const ST_READY: u32 = 0x1;

/// Size of the register window in bytes.
const WINDOW: u32 = 0x10;

/// Serial port device state.
#[derive(Default)]
pub struct SerialPort {
    rx_queue: VecDeque<u8>,
    tx_buffer: Vec<u8>,
    sink: Option<Box<dyn Write>>,
}

impl SerialPort {
    /// Creates a serial port with no attached output writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a writer that receives every transmitted byte immediately.
    pub fn set_sink(&mut self, sink: Box<dyn Write>) {
        self.sink = Some(sink);
    }

    /// Injects one received byte; the program sees it on its next poll.
    ///
    /// Must only be called between machine cycles.
    pub fn receive_byte(&mut self, byte: u8) {
        self.rx_queue.push_back(byte);
    }

    /// Returns the transmitted bytes accumulated so far and clears the buffer.
    pub fn take_output(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.tx_buffer)
    }

    /// Returns a view of the transmitted bytes accumulated so far.
    pub fn output(&self) -> &[u8] {
        &self.tx_buffer
    }

    /// Returns the number of received bytes not yet read by the program.
    pub fn pending_rx(&self) -> usize {
        self.rx_queue.len()
    }
}

impl Backend for SerialPort {
    fn name(&self) -> &str {
        "SERP"
    }

    fn size(&self) -> u32 {
        WINDOW
    }

    fn read(&mut self, offset: u32, _width: AccessWidth, source: AccessSource) -> u32 {
        match offset & !3 {
            REG_RX_ST => {
                if self.rx_queue.is_empty() {
                    0
                } else {
                    ST_READY
                }
            }
            REG_RX_DATA => {
                if source.allows_side_effects() {
                    self.rx_queue.pop_front().map_or(0, u32::from)
                } else {
                    self.rx_queue.front().copied().map_or(0, u32::from)
                }
            }
            REG_TX_ST => ST_READY,
            _ => 0,
        }
    }

    fn write(&mut self, offset: u32, _width: AccessWidth, value: u32, source: AccessSource) {
        if offset & !3 == REG_TX_DATA && source.allows_side_effects() {
            let byte = value as u8;
            self.tx_buffer.push(byte);
            if let Some(sink) = self.sink.as_mut() {
                let _ = sink.write_all(&[byte]);
                let _ = sink.flush();
            }
        }
    }

    fn as_serial_mut(&mut self) -> Option<&mut SerialPort> {
        Some(self)
    }
}
