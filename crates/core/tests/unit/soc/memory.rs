//! Paged RAM tests.

use mips_core::common::data::{AccessSource, AccessWidth};
use mips_core::soc::memory::Memory;
use mips_core::soc::traits::Backend;

const CPU: AccessSource = AccessSource::Cpu;

#[test]
fn never_written_pages_read_zero_without_allocating() {
    let mut ram = Memory::new(0x10_0000);
    assert_eq!(ram.read(0x1234 & !3, AccessWidth::Word, CPU), 0);
    assert_eq!(ram.read(0xf_fffc, AccessWidth::Word, CPU), 0);
    assert_eq!(ram.allocated_pages(), 0, "reads must not allocate");
}

#[test]
fn pages_allocate_on_first_write() {
    let mut ram = Memory::new(0x10_0000);
    ram.write(0x0, AccessWidth::Word, 1, CPU);
    assert_eq!(ram.allocated_pages(), 1);
    ram.write(0x3fc, AccessWidth::Word, 2, CPU);
    assert_eq!(ram.allocated_pages(), 1, "same 256-word page");
    ram.write(0x400, AccessWidth::Word, 3, CPU);
    assert_eq!(ram.allocated_pages(), 2, "next page");
}

#[test]
fn words_are_big_endian_through_byte_reads() {
    let mut ram = Memory::new(0x1000);
    ram.write(0x10, AccessWidth::Word, 0x1122_3344, CPU);
    assert_eq!(ram.read(0x10, AccessWidth::Byte, CPU), 0x11);
    assert_eq!(ram.read(0x11, AccessWidth::Byte, CPU), 0x22);
    assert_eq!(ram.read(0x12, AccessWidth::Byte, CPU), 0x33);
    assert_eq!(ram.read(0x13, AccessWidth::Byte, CPU), 0x44);
    assert_eq!(ram.read(0x10, AccessWidth::Half, CPU), 0x1122);
    assert_eq!(ram.read(0x12, AccessWidth::Half, CPU), 0x3344);
}

#[test]
fn byte_writes_round_trip_to_words() {
    let mut ram = Memory::new(0x1000);
    for (i, byte) in [0xde, 0xad, 0xbe, 0xef].iter().enumerate() {
        ram.write(0x20 + i as u32, AccessWidth::Byte, *byte, CPU);
    }
    assert_eq!(ram.read(0x20, AccessWidth::Word, CPU), 0xdead_beef);

    ram.write(0x20, AccessWidth::Half, 0xcafe, CPU);
    assert_eq!(ram.read(0x20, AccessWidth::Word, CPU), 0xcafe_beef);
}

#[test]
fn bulk_range_operations() {
    let mut ram = Memory::new(0x1000);
    let words: Vec<u32> = (0..64).collect();
    ram.write_range(0x100, &words);
    assert_eq!(ram.read_range(0x100, 64), words);
    assert_eq!(ram.read_range(0x200, 2), vec![0, 0], "past the written range");
}
