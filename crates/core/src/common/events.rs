//! Change-notification events and the per-cycle event log.
//!
//! The cores record typed events into an `EventLog` while a cycle executes;
//! the machine facade drains the log at the end of each cycle and dispatches
//! the events to registered observers. Observers hold no references into the
//! model, and they may mutate machine state only between cycles.
//!
//! Events for one cycle are recorded in stage order IF→ID→EX→MEM→WB followed
//! by the commit-time register and PC changes.

use crate::common::data::AccessWidth;
use crate::common::error::Trap;

/// Kind of architectural register a change event refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegKind {
    /// General-purpose register; `index` selects it.
    Gp,
    /// Program counter.
    Pc,
    /// Multiplier HI register.
    Hi,
    /// Multiplier LO register.
    Lo,
    /// Coprocessor 0 register; `index` is the CP0 register number.
    Cp0,
}

/// A single architectural register mutation.
///
/// Exactly one `RegChange` is emitted for every effective register write;
/// discarded writes to `$zero` emit nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegChange {
    /// Which register file the change happened in.
    pub kind: RegKind,
    /// Register index within the file; 0 for PC, HI, and LO.
    pub index: u8,
    /// Value before the write.
    pub old: u32,
    /// Value after the write.
    pub new: u32,
}

/// Pipeline stage identifier used by trace events.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    /// Instruction fetch.
    If,
    /// Instruction decode.
    Id,
    /// Execute.
    Ex,
    /// Memory access.
    Mem,
    /// Write back.
    Wb,
}

impl Stage {
    /// Returns the conventional two-letter stage label.
    pub fn label(self) -> &'static str {
        match self {
            Stage::If => "IF",
            Stage::Id => "ID",
            Stage::Ex => "EX",
            Stage::Mem => "MEM",
            Stage::Wb => "WB",
        }
    }
}

/// Typed event delivered to machine observers.
#[derive(Clone, Debug, PartialEq)]
pub enum MachineEvent {
    /// An architectural register changed value.
    RegChange(RegChange),
    /// An instruction occupied a stage this cycle (bubbles are not traced).
    StageTrace {
        /// Which stage the instruction occupied.
        stage: Stage,
        /// Address of the instruction.
        pc: u32,
        /// Raw machine word, for disassembly by the observer.
        word: u32,
    },
    /// A store reached the physical address space.
    MemoryWrite {
        /// Target address.
        addr: u32,
        /// Store width.
        width: AccessWidth,
        /// Value written (in the low bits for sub-word widths).
        value: u32,
    },
    /// Execution stopped on a CPU trap.
    TrapTaken(Trap),
    /// An assembler `#pragma` line was encountered.
    Pragma {
        /// Tokens following `#pragma`.
        tokens: Vec<String>,
    },
    /// The machine reached a halt condition.
    Halted,
}

/// Ordered event buffer filled during a cycle and drained between cycles.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<MachineEvent>,
}

impl EventLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one event.
    #[inline]
    pub fn push(&mut self, event: MachineEvent) {
        self.events.push(event);
    }

    /// Records an effective register change.
    #[inline]
    pub fn reg_change(&mut self, kind: RegKind, index: u8, old: u32, new: u32) {
        self.events.push(MachineEvent::RegChange(RegChange {
            kind,
            index,
            old,
            new,
        }));
    }

    /// Removes and returns all buffered events in recording order.
    pub fn drain(&mut self) -> Vec<MachineEvent> {
        std::mem::take(&mut self.events)
    }

    /// Returns whether no events are buffered.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
