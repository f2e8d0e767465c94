//! Operating-system call emulation.
//!
//! Services the SYSCALL instruction for console programs when enabled in
//! the configuration. The service number is taken from `$v0`, arguments
//! from `$a0`-`$a3`, results go to `$v0`. Output is written to a
//! configurable writer (stdout in the CLI); input comes from a line queue
//! the host fills between cycles.
//!
//! # Services
//!
//! | `$v0` | Service          | Arguments         | Result |
//! |-------|------------------|-------------------|--------|
//! | 1     | print integer    | `$a0` value       | —      |
//! | 4     | print string     | `$a0` address     | —      |
//! | 5     | read integer     | —                 | `$v0`  |
//! | 10    | exit             | —                 | halt   |
//! | 11    | print character  | `$a0` low byte    | —      |

use std::collections::VecDeque;
use std::io::Write;

use crate::common::constants::SYSCALL_EXIT;
use crate::common::data::{AccessSource, AccessWidth};
use crate::soc::bus::Bus;

/// Print a signed integer.
const SERVICE_PRINT_INT: u32 = 1;
/// Print a NUL-terminated string.
const SERVICE_PRINT_STR: u32 = 4;
/// Read a signed integer.
const SERVICE_READ_INT: u32 = 5;
/// Print one character.
const SERVICE_PRINT_CHAR: u32 = 11;

/// Longest string a single print-string call will emit, as a runaway guard.
const MAX_STRING: u32 = 64 * 1024;

/// Effect of servicing one syscall.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SyscallEffect {
    /// The program requested termination.
    pub exit: bool,
    /// New value for `$v0`, for input services.
    pub result: Option<u32>,
}

/// Syscall emulator state.
pub struct OsEmu {
    output: Box<dyn Write>,
    input_lines: VecDeque<String>,
}

impl OsEmu {
    /// Creates an emulator writing to the given sink.
    pub fn new(output: Box<dyn Write>) -> Self {
        Self {
            output,
            input_lines: VecDeque::new(),
        }
    }

    /// Creates an emulator that buffers output internally (for tests).
    pub fn sink() -> (Self, std::sync::mpsc::Receiver<Vec<u8>>) {
        // Simple channel-backed writer so tests can observe output without
        // sharing ownership.
        struct ChannelWriter(std::sync::mpsc::Sender<Vec<u8>>);
        impl Write for ChannelWriter {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                let _ = self.0.send(buf.to_vec());
                Ok(buf.len())
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }
        let (tx, rx) = std::sync::mpsc::channel();
        (Self::new(Box::new(ChannelWriter(tx))), rx)
    }

    /// Queues one line of console input; call between cycles.
    pub fn push_input_line(&mut self, line: &str) {
        self.input_lines.push_back(line.to_string());
    }

    /// Services one syscall.
    ///
    /// # Arguments
    ///
    /// * `service` - Service number from `$v0`.
    /// * `args` - Argument registers `$a0`-`$a3`.
    /// * `bus` - Address space, for string arguments.
    ///
    /// # Returns
    ///
    /// The effect to apply between cycles. Unknown services are ignored.
    pub fn service(&mut self, service: u32, args: [u32; 4], bus: &mut Bus) -> SyscallEffect {
        let mut effect = SyscallEffect::default();
        match service {
            SERVICE_PRINT_INT => {
                let _ = write!(self.output, "{}", args[0] as i32);
                let _ = self.output.flush();
            }
            SERVICE_PRINT_STR => {
                let mut addr = args[0];
                let mut count = 0;
                while count < MAX_STRING {
                    let byte = match bus.read(addr, AccessWidth::Byte, AccessSource::Debugger) {
                        Ok(b) => b as u8,
                        Err(_) => break,
                    };
                    if byte == 0 {
                        break;
                    }
                    let _ = self.output.write_all(&[byte]);
                    addr = addr.wrapping_add(1);
                    count += 1;
                }
                let _ = self.output.flush();
            }
            SERVICE_READ_INT => {
                let value = self
                    .input_lines
                    .pop_front()
                    .and_then(|line| line.trim().parse::<i64>().ok())
                    .unwrap_or(0);
                effect.result = Some(value as u32);
            }
            SYSCALL_EXIT => effect.exit = true,
            SERVICE_PRINT_CHAR => {
                let _ = self.output.write_all(&[args[0] as u8]);
                let _ = self.output.flush();
            }
            _ => {}
        }
        effect
    }
}
