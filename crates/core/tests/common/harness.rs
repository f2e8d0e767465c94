//! Test harness for machine-level tests.

use mips_core::config::MachineConfig;
use mips_core::sim::loader::ImageSegment;
use mips_core::sim::MachineStatus;
use mips_core::Machine;

/// Default text base used by the harness programs.
pub const TEXT_BASE: u32 = 0x8002_0000;

/// `addiu $v0, $zero, 10` ; `syscall` — the exit sequence.
pub const HALT_SEQ: [u32; 2] = [0x2402_000a, 0x0000_000c];

/// Machine wrapper with loading and run helpers.
pub struct TestContext {
    pub machine: Machine,
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new(Self::config())
    }
}

impl TestContext {
    /// Baseline configuration for tests: single-cycle, no OS emulation.
    pub fn config() -> MachineConfig {
        MachineConfig {
            osemu_enable: false,
            ..MachineConfig::default()
        }
    }

    /// Baseline configuration for pipelined-core tests.
    pub fn pipelined_config() -> MachineConfig {
        MachineConfig {
            pipelined: true,
            ..Self::config()
        }
    }

    /// Creates a context around a fresh machine.
    pub fn new(config: MachineConfig) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        Self {
            machine: Machine::new(config),
        }
    }

    /// Loads raw instruction words at `addr` and points the PC there.
    pub fn load_program(&mut self, addr: u32, words: &[u32]) -> &mut Self {
        let segments = [ImageSegment {
            base: addr,
            words: words.to_vec(),
        }];
        self.machine
            .load_image(&segments, &[("_start".to_string(), addr)])
            .expect("program image must load");
        self
    }

    /// Loads raw words followed by the exit sequence at the text base.
    pub fn load_with_halt(&mut self, words: &[u32]) -> &mut Self {
        let mut program = words.to_vec();
        program.extend_from_slice(&HALT_SEQ);
        self.load_program(TEXT_BASE, &program)
    }

    /// Assembles source text into the machine.
    pub fn assemble(&mut self, source: &str) -> &mut Self {
        if let Err(diagnostics) = self.machine.assemble_source("test.S", source) {
            panic!("assembly failed: {:?}", diagnostics);
        }
        self
    }

    /// Writes words into memory at `addr` (debugger access).
    pub fn poke_words(&mut self, addr: u32, words: &[u32]) -> &mut Self {
        self.machine
            .bus_mut()
            .write_range(addr, words)
            .expect("poke target must be mapped");
        self
    }

    /// Reads one word from memory without side effects.
    pub fn peek_word(&mut self, addr: u32) -> u32 {
        self.machine
            .bus_mut()
            .probe_word(addr)
            .expect("peek target must be mapped")
    }

    /// Reads one byte from memory without side effects.
    pub fn peek_byte(&mut self, addr: u32) -> u8 {
        use mips_core::common::data::{AccessSource, AccessWidth};
        self.machine
            .bus_mut()
            .read(addr, AccessWidth::Byte, AccessSource::Debugger)
            .expect("peek target must be mapped") as u8
    }

    /// Reads a general-purpose register.
    pub fn reg(&self, idx: usize) -> u32 {
        self.machine.registers().read_gp(idx)
    }

    /// Runs up to `budget` cycles and asserts the machine halted.
    pub fn run_to_halt(&mut self, budget: u64) -> &mut Self {
        let status = self.machine.run_for(budget);
        assert_eq!(
            status,
            MachineStatus::Halted,
            "program did not halt within {} cycles",
            budget
        );
        self
    }

    /// Runs up to `budget` cycles and returns the resulting status.
    pub fn run(&mut self, budget: u64) -> MachineStatus {
        self.machine.run_for(budget)
    }
}
