//! Exit reporter.
//!
//! After a run finishes, dumps whatever the command line asked for
//! (registers, cache statistics, cycle counts, memory ranges) and
//! evaluates the `--expect-fail`/`--fail-match` expectations to produce
//! the process exit code.

use std::path::PathBuf;

use mips_core::common::constants::REGISTER_NAMES;
use mips_core::core::units::cache::CacheStats;
use mips_core::sim::MachineStatus;
use mips_core::Machine;

/// One `--dump-range START,LENGTH,FNAME` request.
#[derive(Clone, Debug)]
pub struct DumpRange {
    /// First address (already resolved from a number or symbol).
    pub start: u32,
    /// Length in bytes.
    pub length: u32,
    /// Output file.
    pub path: PathBuf,
}

/// Report configuration assembled from the command line.
#[derive(Clone, Debug, Default)]
pub struct Reporter {
    /// Dump the architectural registers at exit.
    pub dump_registers: bool,
    /// Dump cache statistics at exit.
    pub dump_cache_stats: bool,
    /// Dump the cycle counters at exit.
    pub dump_cycles: bool,
    /// Memory ranges to dump into files.
    pub dump_ranges: Vec<DumpRange>,
    /// Expect the program to trap.
    pub expect_fail: bool,
    /// Letters from {I, A, O, J} restricting the expected trap kinds.
    pub fail_match: String,
}

impl Reporter {
    fn print_registers(machine: &Machine) {
        let regs = machine.registers();
        for (index, name) in REGISTER_NAMES.iter().enumerate() {
            print!("${:<4} {:#010x}", name, regs.read_gp(index));
            if index % 4 == 3 {
                println!();
            } else {
                print!("  ");
            }
        }
        println!(
            "PC    {:#010x}  HI    {:#010x}  LO    {:#010x}",
            regs.read_pc(),
            regs.read_hi(),
            regs.read_lo()
        );
    }

    fn print_cache(label: &str, stats: &CacheStats, speed: f64) {
        let accesses = stats.total_accesses();
        let rate = if accesses == 0 {
            0.0
        } else {
            100.0 * stats.hits() as f64 / accesses as f64
        };
        println!(
            "{}: accesses {}, hits {}, misses {} ({:.1}% hit rate)",
            label,
            accesses,
            stats.hits(),
            stats.misses(),
            rate
        );
        println!(
            "{}: memory reads {}, memory writes {}, stall cycles {}, speed {:.2}x",
            label, stats.mem_reads, stats.mem_writes, stats.stall_cycles, speed
        );
    }

    /// Prints the configured dumps and returns the process exit code.
    ///
    /// Exit code 0 means the run met expectations: normal completion
    /// without `--expect-fail`, or a trap of an expected kind with it.
    pub fn report(&self, machine: &mut Machine) -> i32 {
        if self.dump_registers {
            Self::print_registers(machine);
        }
        if self.dump_cache_stats {
            let (i_speed, d_speed) = machine.cache_speed_improvement();
            let i_stats = *machine.icache_stats();
            let d_stats = *machine.dcache_stats();
            Self::print_cache("i-cache", &i_stats, i_speed);
            Self::print_cache("d-cache", &d_stats, d_speed);
        }
        if self.dump_cycles {
            let stats = machine.stats();
            println!("Cycles: {}", stats.cycles);
            println!(
                "Stalls: data {}, control {}, structural {}",
                stats.stalls_data, stats.stalls_control, stats.stalls_structural
            );
        }
        for range in &self.dump_ranges {
            if let Err(err) = machine.dump_range(range.start, range.length, &range.path) {
                eprintln!("cannot dump range to '{}': {}", range.path.display(), err);
                return 1;
            }
        }

        let trapped = match machine.status() {
            MachineStatus::Trapped(trap) => Some(trap.clone()),
            _ => None,
        };

        match trapped {
            Some(trap) => {
                eprintln!("Machine trapped: {}", trap);
                if !self.expect_fail && self.fail_match.is_empty() {
                    return 1;
                }
                if self.fail_match.is_empty() {
                    return 0;
                }
                let matched = trap
                    .fail_letter()
                    .map_or(false, |letter| {
                        self.fail_match
                            .chars()
                            .any(|c| c.eq_ignore_ascii_case(&letter))
                    });
                i32::from(!matched)
            }
            None => {
                if self.expect_fail || !self.fail_match.is_empty() {
                    eprintln!("Expected the program to trap, but it did not");
                    return 1;
                }
                0
            }
        }
    }
}
