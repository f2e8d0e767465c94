//! MIPS machine simulator CLI.
//!
//! This binary provides the command-line front end. It performs:
//! 1. **Configuration:** Builds the machine configuration from flags
//!    (core selection, delay slot, hazard unit, caches, memory timing).
//! 2. **Loading:** Assembles a source file (`--asm`) or loads a linked ELF
//!    executable, then applies `--load-range` files.
//! 3. **Execution:** Runs to completion with optional per-stage and
//!    per-register tracing.
//! 4. **Reporting:** Dumps registers, cache statistics, cycles, and memory
//!    ranges, and evaluates `--expect-fail` expectations for the exit code.

mod elf;
mod reporter;
mod tracer;

use std::path::PathBuf;
use std::process;

use clap::Parser;

use mips_core::config::{CacheConfig, HazardUnit, ReplacementPolicy, WritePolicy};
use mips_core::sim::loader::parse_u32_any;
use mips_core::{Machine, MachineConfig};

use crate::reporter::{DumpRange, Reporter};
use crate::tracer::Tracer;

#[derive(Parser, Debug)]
#[command(
    name = "mipsim",
    version,
    about = "MIPS CLI machine simulator",
    long_about = "Simulate a MIPS-I subset machine.\n\nThe input is a linked ELF executable, or an assembler source with --asm.\n\nExamples:\n  mipsim program.elf --dump-registers\n  mipsim --asm program.S --pipelined --d-cache lru,4,2,2,wb --dump-cache-stats"
)]
struct Cli {
    /// Input ELF executable file or assembler source.
    file: PathBuf,

    /// Treat the file argument as assembler source.
    #[arg(long)]
    asm: bool,

    /// Configure the CPU to use the five-stage pipeline.
    #[arg(long)]
    pipelined: bool,

    /// Disable the jump delay slot.
    #[arg(long)]
    no_delay_slot: bool,

    /// Hazard resolution strategy for the pipelined core.
    #[arg(long, value_parser = parse_hazard_unit, default_value = "forward")]
    hazard_unit: HazardUnit,

    /// Trace fetched instructions (both cores).
    #[arg(long, visible_alias = "tr-fetch")]
    trace_fetch: bool,

    /// Trace instructions in the decode stage (pipelined core only).
    #[arg(long, visible_alias = "tr-decode")]
    trace_decode: bool,

    /// Trace instructions in the execute stage (pipelined core only).
    #[arg(long, visible_alias = "tr-execute")]
    trace_execute: bool,

    /// Trace instructions in the memory stage (pipelined core only).
    #[arg(long, visible_alias = "tr-memory")]
    trace_memory: bool,

    /// Trace instructions in the write-back stage (pipelined core only).
    #[arg(long, visible_alias = "tr-writeback")]
    trace_writeback: bool,

    /// Print program counter changes.
    #[arg(long, visible_alias = "tr-pc")]
    trace_pc: bool,

    /// Print general-purpose register changes; REG is a number or '*'.
    #[arg(long, visible_alias = "tr-gp", value_name = "REG")]
    trace_gp: Vec<String>,

    /// Print HI register changes.
    #[arg(long, visible_alias = "tr-hi")]
    trace_hi: bool,

    /// Print LO register changes.
    #[arg(long, visible_alias = "tr-lo")]
    trace_lo: bool,

    /// Dump register state at program exit.
    #[arg(long, visible_alias = "d-regs")]
    dump_registers: bool,

    /// Dump cache statistics at program exit.
    #[arg(long)]
    dump_cache_stats: bool,

    /// Dump the number of CPU cycles at program exit.
    #[arg(long)]
    dump_cycles: bool,

    /// Dump a memory range: START,LENGTH,FNAME (symbols allowed).
    #[arg(long, value_name = "START,LENGTH,FNAME")]
    dump_range: Vec<String>,

    /// Load a memory range: START,FNAME (symbols allowed).
    #[arg(long, value_name = "START,FNAME")]
    load_range: Vec<String>,

    /// Expect the program to cause a CPU trap; fail if it does not.
    #[arg(long)]
    expect_fail: bool,

    /// Expected trap letters from {I, A, O, J}; implies --expect-fail.
    #[arg(long, value_name = "TRAP")]
    fail_match: Option<String>,

    /// Data cache: policy,sets,words_in_block,associativity[,write].
    #[arg(long, value_name = "DCACHE")]
    d_cache: Option<String>,

    /// Instruction cache: policy,sets,words_in_block,associativity[,write].
    #[arg(long, value_name = "ICACHE")]
    i_cache: Option<String>,

    /// Memory read access time in cycles.
    #[arg(long, value_name = "RTIME")]
    read_time: Option<u32>,

    /// Memory write access time in cycles.
    #[arg(long, value_name = "WTIME")]
    write_time: Option<u32>,

    /// Memory burst access time in cycles.
    #[arg(long, value_name = "BTIME")]
    burst_time: Option<u32>,
}

/// Parses the hazard-unit flag value.
fn parse_hazard_unit(text: &str) -> Result<HazardUnit, String> {
    match text.to_ascii_lowercase().as_str() {
        "none" => Ok(HazardUnit::None),
        "stall" => Ok(HazardUnit::Stall),
        "forward" | "stall-forward" => Ok(HazardUnit::StallForward),
        _ => Err("expected none, stall, or forward".to_string()),
    }
}

/// Parses a cache specification: `[policy,]sets,words,assoc[,write]`.
fn parse_cache_spec(which: &str, spec: &str) -> CacheConfig {
    let mut cfg = CacheConfig {
        enabled: true,
        ..CacheConfig::default()
    };
    let mut pieces: Vec<&str> = spec.split(',').map(str::trim).collect();

    if let Some(first) = pieces.first() {
        if !first.chars().next().map_or(false, |c| c.is_ascii_digit()) {
            cfg.policy = match first.to_ascii_lowercase().as_str() {
                "random" | "rand" => ReplacementPolicy::Rand,
                "lru" => ReplacementPolicy::Lru,
                "lfu" => ReplacementPolicy::Lfu,
                _ => {
                    eprintln!("Policy for {} cache is incorrect.", which);
                    process::exit(1);
                }
            };
            pieces.remove(0);
        }
    }
    if pieces.len() < 3 {
        eprintln!(
            "Parameters for {} cache incorrect (correct lru,4,2,2,wb).",
            which
        );
        process::exit(1);
    }
    let dims: Vec<u32> = pieces[..3]
        .iter()
        .map(|p| {
            parse_u32_any(p).unwrap_or_else(|| {
                eprintln!("Parameters for {} cache incorrect.", which);
                process::exit(1);
            })
        })
        .collect();
    if dims.iter().any(|&d| d == 0) {
        eprintln!("Parameters for {} cache cannot have zero component.", which);
        process::exit(1);
    }
    cfg.sets = dims[0];
    cfg.block_words = dims[1];
    cfg.ways = dims[2];
    if let Some(write) = pieces.get(3) {
        cfg.write_policy = match write.to_ascii_lowercase().as_str() {
            "wb" => WritePolicy::WriteBack,
            "wt" | "wtna" => WritePolicy::WriteThroughNoAlloc,
            "wta" => WritePolicy::WriteThroughAlloc,
            _ => {
                eprintln!(
                    "Write policy for {} cache is incorrect (correct wb/wt/wtna/wta).",
                    which
                );
                process::exit(1);
            }
        };
    }
    cfg
}

/// Resolves a number-or-symbol field from a range argument.
fn resolve_value(machine: &Machine, text: &str) -> Option<u32> {
    parse_u32_any(text).or_else(|| machine.symbol_table().lookup(text))
}

/// Builds the tracer from the trace flags.
fn build_tracer(cli: &Cli) -> Tracer {
    let mut tracer = Tracer {
        fetch: cli.trace_fetch,
        pc: cli.trace_pc,
        hi: cli.trace_hi,
        lo: cli.trace_lo,
        ..Tracer::default()
    };
    if cli.pipelined {
        tracer.decode = cli.trace_decode;
        tracer.execute = cli.trace_execute;
        tracer.memory = cli.trace_memory;
        tracer.writeback = cli.trace_writeback;
    }
    for spec in &cli.trace_gp {
        if spec == "*" {
            tracer.gp = [true; 32];
        } else {
            match spec.parse::<usize>() {
                Ok(index) if index < 32 => tracer.gp[index] = true,
                _ => {
                    eprintln!("Unknown register number given for trace-gp: {}", spec);
                    process::exit(1);
                }
            }
        }
    }
    tracer
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = MachineConfig {
        pipelined: cli.pipelined,
        delay_slot: !cli.no_delay_slot,
        hazard_unit: cli.hazard_unit,
        ..MachineConfig::default()
    };
    if let Some(spec) = &cli.d_cache {
        config.dcache = parse_cache_spec("data", spec);
    }
    if let Some(spec) = &cli.i_cache {
        config.icache = parse_cache_spec("instruction", spec);
    }
    if let Some(time) = cli.read_time {
        config.memory.read_time = time;
    }
    if let Some(time) = cli.write_time {
        config.memory.write_time = time;
    }
    if let Some(time) = cli.burst_time {
        config.memory.burst_time = time;
    }

    let mut machine = Machine::new(config);
    machine.attach_serial_sink(Box::new(std::io::stdout()));
    build_tracer(&cli).install(&mut machine);

    if cli.asm {
        if let Err(diagnostics) = machine.assemble_file(&cli.file) {
            for diagnostic in &diagnostics {
                eprintln!("{}", diagnostic);
            }
            process::exit(1);
        }
    } else {
        let image = elf::load(&cli.file).unwrap_or_else(|message| {
            eprintln!("{}", message);
            process::exit(1);
        });
        let mut symbols = image.symbols.clone();
        if !symbols.iter().any(|(name, _)| name == "_start") {
            symbols.push(("_start".to_string(), image.entry));
        }
        if let Err(err) = machine.load_image(&image.segments, &symbols) {
            eprintln!("cannot load '{}': {}", cli.file.display(), err);
            process::exit(1);
        }
        machine.reset();
    }

    for spec in &cli.load_range {
        let (start_text, file) = match spec.split_once(',') {
            Some(parts) => parts,
            None => {
                eprintln!("Range start missing");
                process::exit(1);
            }
        };
        let start = resolve_value(&machine, start_text).unwrap_or_else(|| {
            eprintln!("Range start/length specification error.");
            process::exit(1);
        });
        if let Err(err) = machine.load_range(start, &PathBuf::from(file)) {
            eprintln!("cannot load range from '{}': {}", file, err);
            process::exit(1);
        }
    }

    let mut reporter = Reporter {
        dump_registers: cli.dump_registers,
        dump_cache_stats: cli.dump_cache_stats,
        dump_cycles: cli.dump_cycles,
        expect_fail: cli.expect_fail || cli.fail_match.is_some(),
        fail_match: cli.fail_match.clone().unwrap_or_default(),
        ..Reporter::default()
    };
    for letter in reporter.fail_match.chars() {
        if !"iaojIAOJ".contains(letter) {
            eprintln!("Unknown fail condition: {}", letter);
            process::exit(1);
        }
    }
    for spec in &cli.dump_range {
        let mut parts = spec.splitn(3, ',');
        let (start_text, length_text, file) = match (parts.next(), parts.next(), parts.next()) {
            (Some(start), Some(length), Some(file)) => (start, length, file),
            _ => {
                eprintln!("Range start/length/name missing");
                process::exit(1);
            }
        };
        let start = resolve_value(&machine, start_text);
        let length = resolve_value(&machine, length_text);
        match (start, length) {
            (Some(start), Some(length)) => reporter.dump_ranges.push(DumpRange {
                start,
                length,
                path: PathBuf::from(file),
            }),
            _ => {
                eprintln!("Range start/length specification error.");
                process::exit(1);
            }
        }
    }

    machine.run();
    process::exit(reporter.report(&mut machine));
}
