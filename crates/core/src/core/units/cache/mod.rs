//! Set-associative cache model.
//!
//! This module implements the configurable L1 cache that fronts the physical
//! address space. It supports the RAND/LRU/LFU replacement policies and the
//! write-back, write-through-no-allocate, and write-through-allocate write
//! policies, and it collects hit/miss/traffic statistics.
//!
//! # Addressing
//!
//! For an address `a` with `W` words per block and `S` sets:
//! `offset = (a/4) mod W`, `set = (a/(4W)) mod S`, `tag = a/(4WS)`.
//!
//! # Timing
//!
//! A hit consumes one cycle. A miss consumes `read_time + (W-1)*burst_time`
//! for the fill, plus `write_time + (W-1)*burst_time` when a dirty victim
//! must be written back first; a write-through store consumes `write_time`.
//! The cycles beyond the base one accumulate in `stall_cycles`; timing is
//! reported through the statistics and does not gate execution.
//!
//! # Uncacheable windows
//!
//! Memory-mapped peripheral registers change underneath the CPU and must
//! observe every access, so addresses the bus reports as uncacheable
//! (`Bus::is_cacheable`) take the same pass-through path as a disabled
//! cache: the access goes straight to the bus, no line is allocated, and
//! stores reach the device immediately.

/// Cache replacement policy implementations (LRU, LFU, RAND).
pub mod policies;

use self::policies::{LfuPolicy, LruPolicy, RandPolicy, ReplacementPolicy};
use crate::common::data::{subword_get, subword_set, AccessSource, AccessWidth};
use crate::common::error::Trap;
use crate::config::{CacheConfig, MemoryTiming, ReplacementPolicy as PolicyKind, WritePolicy};
use crate::soc::bus::Bus;

/// Cache line entry: tag, state bits, and the block's data words.
#[derive(Clone, Default)]
struct CacheLine {
    tag: u32,
    valid: bool,
    dirty: bool,
    data: Vec<u32>,
}

/// Access statistics of one cache.
///
/// All counters are monotonic; `hits + misses` equals the number of CPU
/// accesses and burst transfers count once regardless of block size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Read accesses that hit.
    pub hit_read: u64,
    /// Write accesses that hit.
    pub hit_write: u64,
    /// Read accesses that missed.
    pub miss_read: u64,
    /// Write accesses that missed.
    pub miss_write: u64,
    /// Memory read transactions (a block fill counts as one).
    pub mem_reads: u64,
    /// Memory write transactions (a block write-back counts as one).
    pub mem_writes: u64,
    /// Cycles spent beyond the one-cycle lookup, derived from miss penalties.
    pub stall_cycles: u64,
}

impl CacheStats {
    /// Total hit count.
    pub fn hits(&self) -> u64 {
        self.hit_read + self.hit_write
    }

    /// Total miss count.
    pub fn misses(&self) -> u64 {
        self.miss_read + self.miss_write
    }

    /// Total number of CPU accesses.
    pub fn total_accesses(&self) -> u64 {
        self.hits() + self.misses()
    }
}

/// Set-associative L1 cache in front of the bus.
///
/// A disabled cache degrades to a pass-through that still accounts memory
/// traffic, so both cores use the same access path unconditionally.
pub struct Cache {
    enabled: bool,
    sets: u32,
    block_words: u32,
    ways: u32,
    write_policy: WritePolicy,
    policy_kind: PolicyKind,
    timing: MemoryTiming,
    lines: Vec<CacheLine>,
    policy: Box<dyn ReplacementPolicy>,
    stats: CacheStats,
}

impl Cache {
    /// Creates a cache from its configuration and the memory timing.
    pub fn new(config: &CacheConfig, timing: &MemoryTiming) -> Self {
        let cfg = config.sanitized();
        let line_count = (cfg.sets * cfg.ways) as usize;
        let mut cache = Self {
            enabled: cfg.enabled,
            sets: cfg.sets,
            block_words: cfg.block_words,
            ways: cfg.ways,
            write_policy: cfg.write_policy,
            policy_kind: cfg.policy,
            timing: *timing,
            lines: vec![CacheLine::default(); line_count],
            policy: Self::build_policy(cfg.policy, cfg.sets, cfg.ways, 0),
            stats: CacheStats::default(),
        };
        for line in &mut cache.lines {
            line.data = vec![0; cfg.block_words as usize];
        }
        cache
    }

    fn build_policy(
        kind: PolicyKind,
        sets: u32,
        ways: u32,
        seed: u64,
    ) -> Box<dyn ReplacementPolicy> {
        match kind {
            PolicyKind::Lru => Box::new(LruPolicy::new(sets as usize, ways as usize)),
            PolicyKind::Lfu => Box::new(LfuPolicy::new(sets as usize, ways as usize)),
            PolicyKind::Rand => Box::new(RandPolicy::new(ways as usize, seed)),
        }
    }

    /// Returns whether this cache is enabled.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Returns the access statistics.
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Splits an address into `(set, tag, word offset)`.
    #[inline]
    fn index(&self, addr: u32) -> (u32, u32, usize) {
        let word = addr / 4;
        let offset = (word % self.block_words) as usize;
        let set = (word / self.block_words) % self.sets;
        let tag = word / (self.block_words * self.sets);
        (set, tag, offset)
    }

    /// Base address of the block identified by `(set, tag)`.
    #[inline]
    fn block_base(&self, set: u32, tag: u32) -> u32 {
        (tag * self.sets + set) * self.block_words * 4
    }

    #[inline]
    fn line_idx(&self, set: u32, way: usize) -> usize {
        (set * self.ways) as usize + way
    }

    /// Looks up `tag` in `set`, returning the hit way.
    fn lookup(&self, set: u32, tag: u32) -> Option<usize> {
        (0..self.ways as usize).find(|&way| {
            let line = &self.lines[self.line_idx(set, way)];
            line.valid && line.tag == tag
        })
    }

    /// Cycles for one burst transfer of a whole block.
    #[inline]
    fn burst_cycles(&self, access_time: u32) -> u32 {
        access_time + (self.block_words - 1) * self.timing.burst_time
    }

    /// Charges an access that consumed `cycles` in total.
    #[inline]
    fn charge(&mut self, cycles: u32) {
        self.stats.stall_cycles += u64::from(cycles.saturating_sub(1));
    }

    /// Writes the block held in `(set, way)` back to memory.
    fn write_back(&mut self, bus: &mut Bus, set: u32, way: usize) -> Result<u32, Trap> {
        let idx = self.line_idx(set, way);
        let base = self.block_base(set, self.lines[idx].tag);
        for w in 0..self.block_words as usize {
            let word = self.lines[idx].data[w];
            bus.write(
                base + 4 * w as u32,
                AccessWidth::Word,
                word,
                AccessSource::Burst,
            )?;
        }
        self.lines[idx].dirty = false;
        self.stats.mem_writes += 1;
        Ok(self.burst_cycles(self.timing.write_time))
    }

    /// Selects a victim way in `set`, preferring invalid ways (lowest index).
    fn select_victim(&mut self, set: u32) -> usize {
        for way in 0..self.ways as usize {
            if !self.lines[self.line_idx(set, way)].valid {
                return way;
            }
        }
        self.policy.victim(set as usize)
    }

    /// Fills a line with the block containing `addr`.
    ///
    /// Writes back a dirty victim first (write-back caches only). Returns
    /// the way that now holds the block and the cycles consumed.
    fn fill(&mut self, bus: &mut Bus, set: u32, tag: u32) -> Result<(usize, u32), Trap> {
        let way = self.select_victim(set);
        let idx = self.line_idx(set, way);
        let mut cycles = 0;

        if self.lines[idx].valid && self.lines[idx].dirty {
            cycles += self.write_back(bus, set, way)?;
        }

        let base = self.block_base(set, tag);
        for w in 0..self.block_words as usize {
            let word = bus.read(base + 4 * w as u32, AccessWidth::Word, AccessSource::Burst)?;
            self.lines[idx].data[w] = word;
        }
        self.lines[idx].tag = tag;
        self.lines[idx].valid = true;
        self.lines[idx].dirty = false;
        self.stats.mem_reads += 1;
        cycles += self.burst_cycles(self.timing.read_time);

        self.policy.fill(set as usize, way);
        self.policy.touch(set as usize, way);
        Ok((way, cycles))
    }

    /// Reads through the cache.
    ///
    /// # Arguments
    ///
    /// * `bus` - The physical address space backing this cache.
    /// * `addr` - Target address; must be aligned to `width`.
    /// * `width` - Access width.
    /// * `source` - Originator, forwarded to the bus on pass-through.
    ///
    /// # Returns
    ///
    /// The value zero-extended in the low bits, or an alignment/bus trap.
    pub fn read(
        &mut self,
        bus: &mut Bus,
        addr: u32,
        width: AccessWidth,
        source: AccessSource,
    ) -> Result<u32, Trap> {
        if !width.is_aligned(addr) {
            return Err(Trap::UnalignedAccess(addr));
        }
        if !self.enabled || !bus.is_cacheable(addr) {
            let value = bus.read(addr, width, source)?;
            self.stats.mem_reads += 1;
            self.charge(self.timing.read_time);
            return Ok(value);
        }

        let (set, tag, offset) = self.index(addr);
        let (way, cycles) = match self.lookup(set, tag) {
            Some(way) => {
                self.policy.touch(set as usize, way);
                self.stats.hit_read += 1;
                (way, 1)
            }
            None => {
                self.stats.miss_read += 1;
                self.fill(bus, set, tag)?
            }
        };
        self.charge(cycles);
        let word = self.lines[self.line_idx(set, way)].data[offset];
        Ok(subword_get(word, addr, width))
    }

    /// Writes through the cache according to the configured write policy.
    pub fn write(
        &mut self,
        bus: &mut Bus,
        addr: u32,
        width: AccessWidth,
        value: u32,
        source: AccessSource,
    ) -> Result<(), Trap> {
        if !width.is_aligned(addr) {
            return Err(Trap::UnalignedAccess(addr));
        }
        if !self.enabled || !bus.is_cacheable(addr) {
            bus.write(addr, width, value, source)?;
            self.stats.mem_writes += 1;
            self.charge(self.timing.write_time);
            return Ok(());
        }

        let (set, tag, offset) = self.index(addr);
        let hit = self.lookup(set, tag);

        match self.write_policy {
            WritePolicy::WriteBack => {
                let (way, cycles) = match hit {
                    Some(way) => {
                        self.policy.touch(set as usize, way);
                        self.stats.hit_write += 1;
                        (way, 1)
                    }
                    None => {
                        self.stats.miss_write += 1;
                        self.fill(bus, set, tag)?
                    }
                };
                let idx = self.line_idx(set, way);
                self.lines[idx].data[offset] =
                    subword_set(self.lines[idx].data[offset], addr, width, value);
                self.lines[idx].dirty = true;
                self.charge(cycles);
            }
            WritePolicy::WriteThroughNoAlloc => {
                bus.write(addr, width, value, source)?;
                self.stats.mem_writes += 1;
                let mut cycles = self.timing.write_time;
                if let Some(way) = hit {
                    self.policy.touch(set as usize, way);
                    self.stats.hit_write += 1;
                    let idx = self.line_idx(set, way);
                    self.lines[idx].data[offset] =
                        subword_set(self.lines[idx].data[offset], addr, width, value);
                } else {
                    self.stats.miss_write += 1;
                }
                cycles = cycles.max(1);
                self.charge(cycles);
            }
            WritePolicy::WriteThroughAlloc => {
                bus.write(addr, width, value, source)?;
                self.stats.mem_writes += 1;
                let mut cycles = self.timing.write_time.max(1);
                let way = match hit {
                    Some(way) => {
                        self.policy.touch(set as usize, way);
                        self.stats.hit_write += 1;
                        way
                    }
                    None => {
                        self.stats.miss_write += 1;
                        let (way, fill_cycles) = self.fill(bus, set, tag)?;
                        cycles += fill_cycles;
                        way
                    }
                };
                let idx = self.line_idx(set, way);
                self.lines[idx].data[offset] =
                    subword_set(self.lines[idx].data[offset], addr, width, value);
                self.charge(cycles);
            }
        }
        Ok(())
    }

    /// Writes all dirty blocks back to memory, leaving the lines clean.
    pub fn flush(&mut self, bus: &mut Bus) -> Result<(), Trap> {
        for set in 0..self.sets {
            for way in 0..self.ways as usize {
                let idx = self.line_idx(set, way);
                if self.lines[idx].valid && self.lines[idx].dirty {
                    let cycles = self.write_back(bus, set, way)?;
                    self.charge(cycles);
                }
            }
        }
        Ok(())
    }

    /// Drops all lines without writing anything back.
    pub fn invalidate(&mut self) {
        for line in &mut self.lines {
            line.valid = false;
            line.dirty = false;
        }
    }

    /// Flushes dirty data and invalidates every line.
    ///
    /// Called when memory is mutated behind the cache's back (assembler
    /// rewriting code, range loads) so stale copies cannot be observed.
    pub fn sync(&mut self, bus: &mut Bus) -> Result<(), Trap> {
        self.flush(bus)?;
        self.invalidate();
        Ok(())
    }

    /// Returns whether the block containing `addr` is resident.
    pub fn contains(&self, addr: u32) -> bool {
        if !self.enabled {
            return false;
        }
        let (set, tag, _) = self.index(addr);
        self.lookup(set, tag).is_some()
    }

    /// Clears all lines and statistics; `seed` reseeds random replacement.
    pub fn reset(&mut self, seed: u64) {
        self.invalidate();
        self.stats = CacheStats::default();
        self.policy = Self::build_policy(self.policy_kind, self.sets, self.ways, seed);
    }

    /// Emulated execution-speed ratio versus running without this cache.
    ///
    /// Compares every access at memory speed against the measured lookup
    /// plus stall cycles. Returns 1.0 until the first access.
    pub fn speed_improvement(&self) -> f64 {
        let s = &self.stats;
        let accesses = s.total_accesses();
        if accesses == 0 {
            return 1.0;
        }
        let baseline = u64::from(self.timing.read_time) * (s.hit_read + s.miss_read)
            + u64::from(self.timing.write_time) * (s.hit_write + s.miss_write);
        let actual = accesses + s.stall_cycles;
        baseline as f64 / actual as f64
    }
}
