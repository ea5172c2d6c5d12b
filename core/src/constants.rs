/// Bytes of addressable memory.
pub const MEMORY_SIZE: usize = 4096;

/// Programs are loaded (and execution begins) at this address.
/// Everything below it belongs to the interpreter; only the font set lives there.
pub const PROGRAM_START: u16 = 0x200;

/// The largest program image that fits between `PROGRAM_START` and the end of memory.
pub const MAX_PROGRAM_SIZE: usize = MEMORY_SIZE - PROGRAM_START as usize;

pub const DISPLAY_WIDTH: usize = 64;
pub const DISPLAY_HEIGHT: usize = 32;

pub const REGISTER_COUNT: usize = 16;
pub const STACK_DEPTH: usize = 16;
pub const KEY_COUNT: usize = 16;

/// Rate at which the host ticks the delay and sound timers.
pub const TIMER_HZ: u32 = 60;

/// Instructions per second a host should schedule when it isn't told otherwise.
pub const DEFAULT_IPS: u32 = 700;

/// Number of instruction snapshots kept for rewinding by default (~1s at `DEFAULT_IPS`).
pub const MAX_SAVED_STATES: usize = 600;

/// Each font glyph is 5 rows of 8 pixels; only the high nibble of each row is lit.
pub const FONT_GLYPH_SIZE: u16 = 5;

/// # Font set
/// The hexadecimal digits 0..F, installed at address 0x000.
///
/// ```text
/// 0xF0  ****
/// 0x90  *  *
/// 0x90  *  *
/// 0x90  *  *
/// 0xF0  ****
/// ```
pub const FONT_SET: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

/// Number of instructions to run per timer tick for a target instruction rate.
/// Never less than one so a very low rate still makes progress.
pub fn instructions_per_frame(ips: u32) -> u32 {
    (ips / TIMER_HZ).max(1)
}

#[cfg(test)]
mod test_constants {
    use super::*;

    #[test]
    fn test_program_fits_after_start() {
        assert_eq!(MAX_PROGRAM_SIZE, 0xE00);
    }

    #[test]
    fn test_instructions_per_frame() {
        assert_eq!(instructions_per_frame(DEFAULT_IPS), 11);
        assert_eq!(instructions_per_frame(600), 10);
        assert_eq!(instructions_per_frame(30), 1);
    }
}
