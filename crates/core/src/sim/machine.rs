//! Machine facade.
//!
//! Owns every component of the simulated machine and drives the logical
//! clock. One `step` advances exactly one cycle in the configured core;
//! `run` repeats until halt, a breakpoint, cancellation, or an optional
//! cycle budget. Between cycles the machine services syscalls, dispatches
//! buffered change notifications to observers, and lets the host inject
//! peripheral input. Observers hold no references into the model and may
//! mutate machine state only between cycles.

use std::collections::HashSet;
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::asm::provider::FileProvider;
use crate::asm::{Assembler, Diagnostic};
use crate::common::constants::{
    ENTRY_SYMBOL, HALT_SYMBOL, LCD_BASE, SERIAL_BASE, SPILED_BASE, SYSCALL_EXIT,
};
use crate::common::error::Trap;
use crate::common::events::MachineEvent;
use crate::config::MachineConfig;
use crate::core::arch::Registers;
use crate::core::pipeline::PipelinedCore;
use crate::core::single::SingleCycleCore;
use crate::core::units::cache::CacheStats;
use crate::core::{Cpu, TrapEvent};
use crate::sim::loader::{self, ImageSegment, LoadError};
use crate::sim::osemu::OsEmu;
use crate::sim::symbols::SymbolTable;
use crate::soc::bus::Bus;
use crate::soc::devices::{LcdDisplay, SerialPort, Spiled};
use crate::soc::memory::Memory;
use crate::stats::MachineStats;

/// Execution state of the machine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MachineStatus {
    /// The machine can execute cycles.
    Ready,
    /// The program reached a halt condition.
    Halted,
    /// Execution stopped at a BREAK instruction or a breakpoint.
    Stopped,
    /// Execution stopped on a CPU trap.
    Trapped(Trap),
}

/// Observer callback receiving machine events between cycles.
type Observer = Box<dyn FnMut(&MachineEvent)>;

/// The selected execution engine.
enum Engine {
    Single(SingleCycleCore),
    Pipelined(PipelinedCore),
}

/// The complete simulated machine.
pub struct Machine {
    config: MachineConfig,
    bus: Bus,
    cpu: Cpu,
    engine: Engine,
    symtab: SymbolTable,
    status: MachineStatus,
    observers: Vec<Observer>,
    cancel: Arc<AtomicBool>,
    breakpoints: HashSet<u32>,
    osemu: Option<OsEmu>,
    entry: u32,
    last_trap: Option<TrapEvent>,
}

impl Machine {
    /// Builds a machine for the given configuration.
    ///
    /// RAM covers the space below the LCD window; the LCD, serial port,
    /// and dial/LED peripherals register above it. The program counter
    /// starts at the text base.
    pub fn new(config: MachineConfig) -> Self {
        let mut bus = Bus::new();
        bus.add_backend(0, Box::new(Memory::new(LCD_BASE)));
        bus.add_backend(LCD_BASE, Box::new(LcdDisplay::new()));
        bus.add_backend(SERIAL_BASE, Box::new(SerialPort::new()));
        bus.add_backend(SPILED_BASE, Box::new(Spiled::new()));

        let cpu = Cpu::new(&config);
        let engine = if config.pipelined {
            Engine::Pipelined(PipelinedCore::new())
        } else {
            Engine::Single(SingleCycleCore::new())
        };
        let osemu = config
            .osemu_enable
            .then(|| OsEmu::new(Box::new(io::stdout())));

        Self {
            entry: config.text_base,
            config,
            bus,
            cpu,
            engine,
            symtab: SymbolTable::new(),
            status: MachineStatus::Ready,
            observers: Vec::new(),
            cancel: Arc::new(AtomicBool::new(false)),
            breakpoints: HashSet::new(),
            osemu,
            last_trap: None,
        }
    }

    /// Registers an observer for change notifications.
    pub fn subscribe(&mut self, observer: Observer) {
        self.observers.push(observer);
    }

    /// Returns the flag that cancels a `run` in progress.
    ///
    /// Setting it from another thread stops the run between cycles and
    /// leaves the machine inspectable.
    pub fn cancel_token(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Adds a breakpoint; `run` stops before fetching this address.
    pub fn add_breakpoint(&mut self, addr: u32) {
        self.breakpoints.insert(addr);
    }

    /// Removes a breakpoint.
    pub fn remove_breakpoint(&mut self, addr: u32) {
        self.breakpoints.remove(&addr);
    }

    /// Resumes a machine stopped at a BREAK or a breakpoint.
    ///
    /// Halted and trapped machines stay stopped; use `reset` for those.
    pub fn resume(&mut self) {
        if self.status == MachineStatus::Stopped {
            self.status = MachineStatus::Ready;
        }
    }

    /// Dispatches all buffered events to the observers.
    fn dispatch_events(&mut self) {
        if self.cpu.events.is_empty() {
            return;
        }
        let events = self.cpu.events.drain();
        for event in &events {
            for observer in &mut self.observers {
                observer(event);
            }
        }
    }

    /// Emits one event directly to the observers.
    fn emit(&mut self, event: MachineEvent) {
        for observer in &mut self.observers {
            observer(&event);
        }
    }

    /// Advances the machine by exactly one cycle.
    ///
    /// Returns the status after the cycle. Stepping a machine that is not
    /// `Ready` is a no-op.
    pub fn step(&mut self) -> MachineStatus {
        if self.status != MachineStatus::Ready {
            return self.status.clone();
        }

        let result = match &mut self.engine {
            Engine::Single(core) => core.step(&mut self.cpu, &mut self.bus),
            Engine::Pipelined(core) => core.step(&mut self.cpu, &mut self.bus),
        };
        self.cpu.stats.cycles += 1;

        match result {
            Err(event) => {
                log::warn!("trap at {:#010x}: {}", event.pc, event.trap);
                self.cpu.latch_trap(&event);
                self.cpu
                    .events
                    .push(MachineEvent::TrapTaken(event.trap.clone()));
                self.status = MachineStatus::Trapped(event.trap.clone());
                self.last_trap = Some(event);
            }
            Ok(outcome) => {
                if let Some(request) = outcome.syscall {
                    let mut exit = request.service == SYSCALL_EXIT;
                    if let Some(osemu) = self.osemu.as_mut() {
                        let effect = osemu.service(request.service, request.args, &mut self.bus);
                        exit |= effect.exit;
                        if let Some(value) = effect.result {
                            self.cpu.set_gp(2, value);
                        }
                    }
                    if exit {
                        self.status = MachineStatus::Halted;
                    }
                }
                if outcome.break_hit {
                    self.status = MachineStatus::Stopped;
                }
                if outcome.halted {
                    self.status = MachineStatus::Halted;
                }
                if self.status == MachineStatus::Halted {
                    self.cpu.events.push(MachineEvent::Halted);
                }
            }
        }

        self.dispatch_events();
        self.status.clone()
    }

    /// Runs until halt, trap, BREAK, a breakpoint, or cancellation.
    pub fn run(&mut self) -> MachineStatus {
        self.run_for(u64::MAX)
    }

    /// Runs at most `budget` cycles.
    ///
    /// # Arguments
    ///
    /// * `budget` - Maximum number of cycles to execute.
    ///
    /// # Returns
    ///
    /// The status when the run stopped; `Ready` means the budget or a
    /// breakpoint/cancellation stopped it, not the program.
    pub fn run_for(&mut self, budget: u64) -> MachineStatus {
        self.cancel.store(false, Ordering::Relaxed);
        for _ in 0..budget {
            if self.status != MachineStatus::Ready {
                break;
            }
            if self.cancel.load(Ordering::Relaxed) {
                break;
            }
            self.step();
            if self.status == MachineStatus::Ready
                && self.breakpoints.contains(&self.cpu.regs.read_pc())
            {
                self.status = MachineStatus::Stopped;
                break;
            }
        }
        self.status.clone()
    }

    /// Flushes and invalidates both caches.
    ///
    /// Must be called whenever memory is mutated behind the caches (the
    /// assembler rewriting code, range loads).
    pub fn cache_sync(&mut self) -> Result<(), Trap> {
        self.cpu.icache.sync(&mut self.bus)?;
        self.cpu.dcache.sync(&mut self.bus)?;
        Ok(())
    }

    /// Resets the machine to its entry point.
    ///
    /// Clears registers, empties the pipeline, invalidates the caches, and
    /// zeroes the statistics. The memory image and symbols are kept.
    pub fn reset(&mut self) {
        let seed = self.cpu.stats.cycles;
        self.refresh_halt_address();
        self.cpu.reset(self.entry, seed);
        match &mut self.engine {
            Engine::Single(core) => core.reset(),
            Engine::Pipelined(core) => core.reset(),
        }
        self.status = MachineStatus::Ready;
        self.last_trap = None;
    }

    /// Reloads the entry point and halt address from the symbol table.
    fn refresh_halt_address(&mut self) {
        if let Some(entry) = self.symtab.lookup(ENTRY_SYMBOL) {
            self.entry = entry;
        }
        self.cpu.halt_address = self.symtab.lookup(HALT_SYMBOL);
    }

    /// Runs one assembly job, synchronising caches around the rewrite and
    /// surfacing pragmas afterwards.
    fn assemble_with(
        &mut self,
        feed: impl FnOnce(&mut Assembler<'_>) -> bool,
    ) -> Result<(), Vec<Diagnostic>> {
        if self.config.reset_at_assembly {
            self.reset();
        }
        let _ = self.cache_sync();

        let provider = FileProvider::new();
        let pragmas;
        let ok;
        let diagnostics;
        {
            let mut assembler = Assembler::new(
                &mut self.bus,
                &mut self.symtab,
                &provider,
                self.config.text_base,
                self.config.data_base,
            );
            let loaded = feed(&mut assembler);
            ok = assembler.finish() && loaded;
            diagnostics = assembler.diagnostics().to_vec();
            pragmas = assembler.take_pragmas();
        }
        for tokens in pragmas {
            self.emit(MachineEvent::Pragma { tokens });
        }
        let _ = self.cache_sync();

        if !ok {
            return Err(diagnostics);
        }
        self.refresh_halt_address();
        self.cpu.regs.set_pc_silent(self.entry);
        self.status = MachineStatus::Ready;
        log::debug!(
            "assembly complete: {} symbols, entry {:#010x}",
            self.symtab.len(),
            self.entry
        );
        Ok(())
    }

    /// Assembles a source file into memory.
    ///
    /// Honours `reset_at_assembly`, synchronises the caches around the
    /// memory rewrite, installs the entry point (`_start` or the text
    /// base), and surfaces `#pragma` lines as events.
    ///
    /// # Arguments
    ///
    /// * `path` - The source file to assemble.
    ///
    /// # Returns
    ///
    /// `Ok(())` when assembly produced a valid image; the collected
    /// diagnostics otherwise.
    pub fn assemble_file(&mut self, path: &Path) -> Result<(), Vec<Diagnostic>> {
        let name = path.to_string_lossy().to_string();
        self.assemble_with(|assembler| assembler.process_file(&name))
    }

    /// Assembles in-memory source text (primarily for tests and tooling).
    pub fn assemble_source(&mut self, name: &str, text: &str) -> Result<(), Vec<Diagnostic>> {
        self.assemble_with(|assembler| {
            assembler.process_source(name, text);
            true
        })
    }

    /// Populates memory and symbols from a prepared executable image.
    pub fn load_image(
        &mut self,
        segments: &[ImageSegment],
        symbols: &[(String, u32)],
    ) -> Result<(), LoadError> {
        let _ = self.cache_sync();
        loader::load_image(&mut self.bus, &mut self.symtab, segments, symbols)?;
        let _ = self.cache_sync();
        self.refresh_halt_address();
        self.cpu.regs.set_pc_silent(self.entry);
        Ok(())
    }

    /// Loads a range file (one integer per line) at `start`.
    pub fn load_range(&mut self, start: u32, path: &Path) -> Result<u32, LoadError> {
        let _ = self.cache_sync();
        let words = loader::load_range(&mut self.bus, start, path)?;
        let _ = self.cache_sync();
        Ok(words)
    }

    /// Dumps `length` bytes starting at `start` into a hex text file.
    pub fn dump_range(&mut self, start: u32, length: u32, path: &Path) -> Result<(), LoadError> {
        let _ = self.cpu.dcache.flush(&mut self.bus);
        loader::dump_range(&mut self.bus, start, length, path)
    }

    /// Queues one line of console input for the OS emulation.
    pub fn push_input_line(&mut self, line: &str) {
        if let Some(osemu) = self.osemu.as_mut() {
            osemu.push_input_line(line);
        }
    }

    /// Returns the machine configuration.
    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    /// Returns the current status.
    pub fn status(&self) -> &MachineStatus {
        &self.status
    }

    /// Returns the trap that stopped the machine, if any.
    pub fn last_trap(&self) -> Option<&TrapEvent> {
        self.last_trap.as_ref()
    }

    /// Returns the architectural registers.
    pub fn registers(&self) -> &Registers {
        &self.cpu.regs
    }

    /// Returns the machine statistics.
    pub fn stats(&self) -> &MachineStats {
        &self.cpu.stats
    }

    /// Returns the instruction cache statistics.
    pub fn icache_stats(&self) -> &CacheStats {
        self.cpu.icache.stats()
    }

    /// Returns the data cache statistics.
    pub fn dcache_stats(&self) -> &CacheStats {
        self.cpu.dcache.stats()
    }

    /// Emulated speed ratios of the two caches versus no cache.
    pub fn cache_speed_improvement(&self) -> (f64, f64) {
        (
            self.cpu.icache.speed_improvement(),
            self.cpu.dcache.speed_improvement(),
        )
    }

    /// Returns the symbol table.
    pub fn symbol_table(&self) -> &SymbolTable {
        &self.symtab
    }

    /// Returns the physical address space, for host probes and input.
    pub fn bus_mut(&mut self) -> &mut Bus {
        &mut self.bus
    }

    /// Attaches a writer receiving serial-port output as it is transmitted.
    pub fn attach_serial_sink(&mut self, sink: Box<dyn std::io::Write>) {
        if let Some(serial) = self.bus.serial_mut() {
            serial.set_sink(sink);
        }
    }
}
