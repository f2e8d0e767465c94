//! Memory access (MEM) stage.
//!
//! Performs data-side loads and stores through the data cache. Loaded
//! sub-words are extended here (sign or zero, per the signals), so the
//! write-back stage commits a ready value. Access faults ride the latch to
//! write-back, tagged with the store flag for the correct cause code.

use crate::common::data::{AccessSource, AccessWidth};
use crate::common::events::MachineEvent;
use crate::core::pipeline::latches::{ExMem, MemWb};
use crate::core::Cpu;
use crate::soc::bus::Bus;

/// Extends a loaded value to 32 bits.
fn extend(value: u32, width: AccessWidth, signed: bool) -> u32 {
    match (width, signed) {
        (AccessWidth::Byte, true) => value as u8 as i8 as i32 as u32,
        (AccessWidth::Half, true) => value as u16 as i16 as i32 as u32,
        _ => value,
    }
}

/// Executes the memory access stage.
///
/// # Arguments
///
/// * `cpu` - The CPU state (provides the data cache and the event log).
/// * `bus` - The physical address space.
/// * `ex_mem` - The EX/MEM latch; `alu` holds the effective address.
///
/// # Returns
///
/// The MEM/WB latch with loaded data or a recorded access fault.
pub fn memory_stage(cpu: &mut Cpu, bus: &mut Bus, ex_mem: &ExMem) -> MemWb {
    if !ex_mem.valid {
        return MemWb::bubble();
    }

    let mut out = MemWb {
        valid: true,
        pc: ex_mem.pc,
        inst: ex_mem.inst,
        ctrl: ex_mem.ctrl,
        alu: ex_mem.alu,
        mem_data: 0,
        trap: ex_mem.trap.clone(),
        trap_store: false,
    };

    if out.trap.is_some() {
        return out;
    }

    let addr = ex_mem.alu;
    let width = ex_mem.ctrl.mem_width;

    if ex_mem.ctrl.mem_read {
        match cpu.dcache.read(bus, addr, width, AccessSource::Cpu) {
            Ok(value) => out.mem_data = extend(value, width, ex_mem.ctrl.mem_signed),
            Err(trap) => out.trap = Some(trap),
        }
    } else if ex_mem.ctrl.mem_write {
        match cpu
            .dcache
            .write(bus, addr, width, ex_mem.store_data, AccessSource::Cpu)
        {
            Ok(()) => cpu.events.push(MachineEvent::MemoryWrite {
                addr,
                width,
                value: ex_mem.store_data,
            }),
            Err(trap) => {
                out.trap = Some(trap);
                out.trap_store = true;
            }
        }
    }

    out
}
