//! Physical address space routing tests.

use mips_core::common::data::{AccessSource, AccessWidth};
use mips_core::common::error::Trap;
use mips_core::soc::traits::Backend;
use mips_core::soc::{Bus, Memory};

mockall::mock! {
    pub Device {}

    impl Backend for Device {
        fn name(&self) -> &str;
        fn size(&self) -> u32;
        fn read(&mut self, offset: u32, width: AccessWidth, source: AccessSource) -> u32;
        fn write(&mut self, offset: u32, width: AccessWidth, value: u32, source: AccessSource);
    }
}

#[test]
fn routes_to_the_backend_by_offset() {
    let mut device = MockDevice::new();
    device.expect_name().return_const("MOCK".to_string());
    device.expect_size().return_const(0x100u32);
    device
        .expect_read()
        .withf(|offset, width, source| {
            *offset == 0x24 && *width == AccessWidth::Word && *source == AccessSource::Cpu
        })
        .times(1)
        .return_const(0x55u32);

    let mut bus = Bus::new();
    bus.add_backend(0x1000, Box::new(device));
    assert_eq!(bus.read_word(0x1024), Ok(0x55));
}

#[test]
fn writes_carry_value_and_source() {
    let mut device = MockDevice::new();
    device.expect_name().return_const("MOCK".to_string());
    device.expect_size().return_const(0x100u32);
    device
        .expect_write()
        .withf(|offset, width, value, source| {
            *offset == 0x10
                && *width == AccessWidth::Half
                && *value == 0xbeef
                && *source == AccessSource::Debugger
        })
        .times(1)
        .return_const(());

    let mut bus = Bus::new();
    bus.add_backend(0x2000, Box::new(device));
    bus.write(0x2010, AccessWidth::Half, 0xbeef, AccessSource::Debugger)
        .unwrap();
}

#[test]
fn unmapped_addresses_are_bus_errors() {
    let mut bus = Bus::new();
    bus.add_backend(0x1000, Box::new(Memory::new(0x1000)));

    assert_eq!(bus.read_word(0x0ffc), Err(Trap::BusError(0x0ffc)));
    assert_eq!(bus.read_word(0x2000), Err(Trap::BusError(0x2000)));
    assert_eq!(bus.write_word(0x3000, 1), Err(Trap::BusError(0x3000)));
    assert!(bus.read_word(0x1ffc).is_ok(), "last word of the range maps");
}

#[test]
fn misaligned_accesses_fault() {
    let mut bus = Bus::new();
    bus.add_backend(0, Box::new(Memory::new(0x1000)));

    assert_eq!(bus.read_word(2), Err(Trap::UnalignedAccess(2)));
    assert_eq!(
        bus.read(1, AccessWidth::Half, AccessSource::Cpu),
        Err(Trap::UnalignedAccess(1))
    );
    assert!(bus.read(1, AccessWidth::Byte, AccessSource::Cpu).is_ok());
    assert_eq!(
        bus.write(6, AccessWidth::Word, 0, AccessSource::Cpu),
        Err(Trap::UnalignedAccess(6))
    );
}

#[test]
#[should_panic(expected = "overlaps")]
fn overlapping_ranges_are_rejected() {
    let mut bus = Bus::new();
    bus.add_backend(0x1000, Box::new(Memory::new(0x1000)));
    bus.add_backend(0x1800, Box::new(Memory::new(0x1000)));
}

#[test]
fn range_operations_round_trip() {
    let mut bus = Bus::new();
    bus.add_backend(0, Box::new(Memory::new(0x1000)));
    bus.write_range(0x100, &[1, 2, 3, 4]).unwrap();
    assert_eq!(bus.read_range(0x100, 4).unwrap(), vec![1, 2, 3, 4]);
}

#[test]
fn lookup_works_across_many_regions() {
    let mut bus = Bus::new();
    for i in 0..8u32 {
        bus.add_backend(i * 0x1000, Box::new(Memory::new(0x800)));
    }
    for i in 0..8u32 {
        let base = i * 0x1000;
        assert!(bus.write_word(base + 4, i).is_ok());
        assert_eq!(bus.read_word(base + 4), Ok(i));
        assert_eq!(
            bus.read_word(base + 0x800),
            Err(Trap::BusError(base + 0x800)),
            "hole between regions"
        );
    }
}
