//! Common constants shared by the cores, the assembler, and the peripherals.

/// Size of one instruction in bytes. The MIPS-I subset has no compressed forms.
pub const INSTRUCTION_SIZE: u32 = 4;

/// Number of general-purpose registers.
pub const GP_REG_COUNT: usize = 32;

/// Words per RAM page; pages are allocated on first write.
pub const PAGE_WORDS: usize = 256;

/// Base address of the LCD frame buffer peripheral.
pub const LCD_BASE: u32 = 0xffe0_0000;

/// LCD resolution and pixel format: 480 x 320, 16-bit RGB565.
pub const LCD_WIDTH: u32 = 480;
/// LCD height in pixels.
pub const LCD_HEIGHT: u32 = 320;

/// Base address of the serial port peripheral.
pub const SERIAL_BASE: u32 = 0xffff_c000;

/// Base address of the dial/LED peripheral.
pub const SPILED_BASE: u32 = 0xffff_c100;

/// Name of the symbol that marks the program entry point.
pub const ENTRY_SYMBOL: &str = "_start";

/// Name of the symbol whose address halts the machine when fetched.
pub const HALT_SYMBOL: &str = "_halt";

/// SYSCALL service selector held in `$v0` that terminates the program.
pub const SYSCALL_EXIT: u32 = 10;

/// Conventional MIPS register names, indexed by register number.
pub static REGISTER_NAMES: [&str; GP_REG_COUNT] = [
    "zero", "at", "v0", "v1", "a0", "a1", "a2", "a3", "t0", "t1", "t2", "t3", "t4", "t5", "t6",
    "t7", "s0", "s1", "s2", "s3", "s4", "s5", "s6", "s7", "t8", "t9", "k0", "k1", "gp", "sp",
    "fp", "ra",
];
