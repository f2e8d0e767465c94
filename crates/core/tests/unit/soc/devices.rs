//! Peripheral tests: serial port, dial/LEDs, and LCD.

use mips_core::common::data::{AccessSource, AccessWidth};
use mips_core::soc::devices::{LcdDisplay, SerialPort, Spiled};
use mips_core::soc::traits::Backend;

const CPU: AccessSource = AccessSource::Cpu;
const DBG: AccessSource = AccessSource::Debugger;

#[test]
fn serial_transmit_collects_output() {
    let mut serial = SerialPort::new();
    assert_eq!(serial.read(0x08, AccessWidth::Word, CPU), 1, "tx always ready");
    for byte in b"Hi\n" {
        serial.write(0x0c, AccessWidth::Word, u32::from(*byte), CPU);
    }
    assert_eq!(serial.output(), b"Hi\n");
    assert_eq!(serial.take_output(), b"Hi\n".to_vec());
    assert!(serial.output().is_empty(), "take drains the buffer");
}

#[test]
fn serial_receive_queue() {
    let mut serial = SerialPort::new();
    assert_eq!(serial.read(0x00, AccessWidth::Word, CPU), 0, "no data yet");

    serial.receive_byte(b'a');
    serial.receive_byte(b'b');
    assert_eq!(serial.read(0x00, AccessWidth::Word, CPU), 1, "data ready");
    assert_eq!(serial.read(0x04, AccessWidth::Word, CPU), u32::from(b'a'));
    assert_eq!(serial.read(0x04, AccessWidth::Word, CPU), u32::from(b'b'));
    assert_eq!(serial.read(0x00, AccessWidth::Word, CPU), 0, "queue drained");
}

#[test]
fn debugger_probes_have_no_side_effects() {
    let mut serial = SerialPort::new();
    serial.receive_byte(b'x');

    assert_eq!(serial.read(0x04, AccessWidth::Word, DBG), u32::from(b'x'));
    assert_eq!(serial.pending_rx(), 1, "probe must not pop the queue");
    assert_eq!(serial.read(0x04, AccessWidth::Word, CPU), u32::from(b'x'));
    assert_eq!(serial.pending_rx(), 0, "cpu read pops");

    serial.write(0x0c, AccessWidth::Word, u32::from(b'q'), DBG);
    assert!(serial.output().is_empty(), "probe writes do not transmit");
}

#[test]
fn spiled_leds_and_knobs() {
    let mut spiled = Spiled::new();
    spiled.write(0x04, AccessWidth::Word, 0xaaaa_5555, CPU);
    spiled.write(0x10, AccessWidth::Word, 0xff11_2233, CPU);
    assert_eq!(spiled.led_line(), 0xaaaa_5555);
    assert_eq!(spiled.led_rgb1(), 0x0011_2233, "RGB registers are 24-bit");
    assert_eq!(spiled.read(0x04, AccessWidth::Word, CPU), 0xaaaa_5555);

    spiled.set_knobs(0x10, 0x20, 0x30);
    spiled.set_buttons(0b101);
    assert_eq!(
        spiled.read(0x24, AccessWidth::Word, CPU),
        0x0510_2030,
        "buttons in bits 26-24, knobs packed below"
    );

    spiled.write(0x04, AccessWidth::Word, 1, DBG);
    assert_eq!(spiled.led_line(), 0xaaaa_5555, "probe writes are ignored");
}

#[test]
fn lcd_pixels_map_into_the_frame_buffer() {
    let mut lcd = LcdDisplay::new();
    // Pixel (0, 0) is the high half of word 0; pixel (1, 0) the low half.
    lcd.write(0x0, AccessWidth::Half, 0xf800, CPU);
    lcd.write(0x2, AccessWidth::Half, 0x07e0, CPU);
    assert_eq!(lcd.pixel(0, 0), 0xf800);
    assert_eq!(lcd.pixel(1, 0), 0x07e0);

    // Second row starts 480 pixels in.
    let row_offset = 480 * 2;
    lcd.write(row_offset, AccessWidth::Half, 0x001f, CPU);
    assert_eq!(lcd.pixel(0, 1), 0x001f);
    assert_eq!(lcd.pixel(2, 0), 0, "untouched pixels are dark");
    assert_eq!(lcd.pixel(999, 999), 0, "out of range reads as zero");
}
