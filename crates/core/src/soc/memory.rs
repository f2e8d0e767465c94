//! Paged RAM backing.
//!
//! This module provides the main memory backend. Storage is a page table of
//! fixed-size pages (256 words) allocated on first write; reads from pages
//! that were never written return 0 without allocating. The architectural
//! view is big-endian: byte offset 0 within a word is the most significant
//! byte, and sub-word accesses round-trip with byte reads.

use std::collections::BTreeMap;

use crate::common::constants::PAGE_WORDS;
use crate::common::data::{subword_get, subword_set, AccessSource, AccessWidth};
use crate::soc::traits::Backend;

/// Main memory backend: a demand-allocated page table of word storage.
pub struct Memory {
    size: u32,
    pages: BTreeMap<u32, Box<[u32; PAGE_WORDS]>>,
}

impl Memory {
    /// Creates a RAM backend covering `size` bytes.
    ///
    /// # Arguments
    ///
    /// * `size` - Window size in bytes; rounded down to a whole word.
    pub fn new(size: u32) -> Self {
        Self {
            size: size & !3,
            pages: BTreeMap::new(),
        }
    }

    /// Splits a byte offset into (page index, word index within page).
    #[inline]
    fn locate(offset: u32) -> (u32, usize) {
        let word = offset / 4;
        (
            word / PAGE_WORDS as u32,
            (word % PAGE_WORDS as u32) as usize,
        )
    }

    /// Reads the word containing `offset`; unallocated pages read as 0.
    pub fn read_word(&self, offset: u32) -> u32 {
        let (page, word) = Self::locate(offset);
        match self.pages.get(&page) {
            Some(data) => data[word],
            None => 0,
        }
    }

    /// Writes the word containing `offset`, allocating its page if needed.
    pub fn write_word(&mut self, offset: u32, value: u32) {
        let (page, word) = Self::locate(offset);
        let data = self
            .pages
            .entry(page)
            .or_insert_with(|| Box::new([0u32; PAGE_WORDS]));
        data[word] = value;
    }

    /// Reads `count` consecutive words starting at `offset`.
    pub fn read_range(&self, offset: u32, count: u32) -> Vec<u32> {
        (0..count)
            .map(|i| self.read_word(offset.wrapping_add(i * 4)))
            .collect()
    }

    /// Writes consecutive words starting at `offset`.
    pub fn write_range(&mut self, offset: u32, words: &[u32]) {
        for (i, word) in words.iter().enumerate() {
            self.write_word(offset.wrapping_add(i as u32 * 4), *word);
        }
    }

    /// Returns the number of allocated pages (for inspection and tests).
    pub fn allocated_pages(&self) -> usize {
        self.pages.len()
    }
}

impl Backend for Memory {
    fn name(&self) -> &str {
        "RAM"
    }

    fn size(&self) -> u32 {
        self.size
    }

    fn read(&mut self, offset: u32, width: AccessWidth, _source: AccessSource) -> u32 {
        subword_get(self.read_word(offset), offset, width)
    }

    fn write(&mut self, offset: u32, width: AccessWidth, value: u32, _source: AccessSource) {
        let merged = subword_set(self.read_word(offset), offset, width, value);
        self.write_word(offset, merged);
    }

    fn cacheable(&self) -> bool {
        true
    }

    fn as_memory_mut(&mut self) -> Option<&mut Memory> {
        Some(self)
    }
}
