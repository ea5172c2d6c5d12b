use crate::constants::{
    DISPLAY_HEIGHT, DISPLAY_WIDTH, FONT_SET, KEY_COUNT, MEMORY_SIZE, PROGRAM_START,
    REGISTER_COUNT, STACK_DEPTH,
};
use crate::error::{Chip8Error, Result};

/// The FrameBuffer is indexed as [y][x]; `true` is a lit pixel.
pub type FrameBuffer = [[bool; DISPLAY_WIDTH]; DISPLAY_HEIGHT];

/// Pressed status of the 16 hexadecimal keys 0..F.
pub type Keypad = [bool; KEY_COUNT];

/// A snapshot of the Chip8 internal state
///
/// ## CPU
/// Registers
/// - (v) 16 primary 8-bit registers (V0..VF)
///     - the first 15 (V0..VE) are general purpose registers
///     - the 16th (VF) doubles as the carry, borrow and collision flag
/// - (i) a 16-bit memory address register
///
/// Counter
/// - (pc) a 16-bit program counter, advanced past each opcode as it is fetched
///
/// Pointer
/// - (sp) the number of occupied stack slots, 0..=16
///
/// Timers
/// - 2 8-bit timers (delay & sound), decremented at 60Hz by the host and floored at 0
///
/// ## Memory
/// - 16 slot stack of return addresses
/// - 4096 bytes of addressable memory
///     - 0x000..0x050 holds the font set
///     - 0x200.. holds the program
///     - addresses wrap at 4096 rather than faulting
/// - 64x32 frame buffer and a flag marking it as changed since it was last taken
///
/// ## Input
/// - the pressed status of keys 0..F, written by the host between frames
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct State {
    pub v: [u8; REGISTER_COUNT],
    pub i: u16,
    pub pc: u16,
    pub sp: u8,
    pub delay_timer: u8,
    pub sound_timer: u8,
    pub stack: [u16; STACK_DEPTH],
    pub memory: [u8; MEMORY_SIZE],
    pub frame_buffer: FrameBuffer,
    pub draw_flag: bool,
    pub keypad: Keypad,
}

impl State {
    pub fn new() -> Self {
        let mut memory = [0; MEMORY_SIZE];
        memory[..FONT_SET.len()].copy_from_slice(&FONT_SET);

        State {
            v: [0; REGISTER_COUNT],
            i: 0,
            pc: PROGRAM_START,
            sp: 0,
            delay_timer: 0,
            sound_timer: 0,
            stack: [0; STACK_DEPTH],
            memory,
            frame_buffer: [[false; DISPLAY_WIDTH]; DISPLAY_HEIGHT],
            draw_flag: false,
            keypad: [false; KEY_COUNT],
        }
    }

    /// Reads the byte at `addr`, wrapping past the end of memory.
    pub fn read(&self, addr: u16) -> u8 {
        self.memory[addr as usize % MEMORY_SIZE]
    }

    /// Writes the byte at `addr`, wrapping past the end of memory.
    pub fn write(&mut self, addr: u16, value: u8) {
        self.memory[addr as usize % MEMORY_SIZE] = value;
    }

    /// Gets the opcode currently pointed at by the pc and moves the pc past it.
    /// Memory is stored as bytes, but opcodes are 16 bits so we combine two subsequent bytes.
    pub fn fetch(&mut self) -> u16 {
        let left = u16::from(self.read(self.pc));
        let right = u16::from(self.read(self.pc.wrapping_add(1)));
        self.pc = self.pc.wrapping_add(2);
        left << 8 | right
    }

    /// Pushes a return address.
    /// A full stack is left untouched and reported against the calling instruction.
    pub fn push(&mut self, addr: u16) -> Result<()> {
        let sp = self.sp as usize;
        if sp >= STACK_DEPTH {
            return Err(Chip8Error::StackOverflow {
                pc: self.pc.wrapping_sub(2),
                depth: STACK_DEPTH,
            });
        }
        self.stack[sp] = addr;
        self.sp += 1;
        Ok(())
    }

    /// Pops the most recent return address.
    /// An empty stack is left untouched and reported against the returning instruction.
    pub fn pop(&mut self) -> Result<u16> {
        if self.sp == 0 {
            return Err(Chip8Error::StackUnderflow {
                pc: self.pc.wrapping_sub(2),
            });
        }
        self.sp -= 1;
        Ok(self.stack[self.sp as usize])
    }

    /// Decrements both timers independently, never below 0.
    pub fn tick_timers(&mut self) {
        self.delay_timer = self.delay_timer.saturating_sub(1);
        self.sound_timer = self.sound_timer.saturating_sub(1);
    }

    /// The lowest numbered key currently held down, if any.
    pub fn first_pressed_key(&self) -> Option<u8> {
        self.keypad.iter().position(|&pressed| pressed).map(|key| key as u8)
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test_state {
    use super::*;

    #[test]
    fn test_new_state_loads_font_and_starts_at_program() {
        let state = State::new();
        assert_eq!(state.memory[..80], FONT_SET[..]);
        assert!(state.memory[80..].iter().all(|&b| b == 0));
        assert_eq!(state.pc, 0x200);
        assert_eq!(state.sp, 0);
        assert!(!state.draw_flag);
        assert!(state.frame_buffer.iter().flatten().all(|&p| !p));
        assert!(state.keypad.iter().all(|&k| !k));
    }

    #[test]
    fn test_fetch_is_big_endian_and_advances_pc() {
        let mut state = State::new();
        state.memory[0x200..0x202].copy_from_slice(&[0xAA, 0xBB]);
        assert_eq!(state.fetch(), 0xAABB);
        assert_eq!(state.pc, 0x202);
    }

    #[test]
    fn test_fetch_at_odd_address() {
        let mut state = State::new();
        state.pc = 0x201;
        state.memory[0x201..0x203].copy_from_slice(&[0x12, 0x34]);
        assert_eq!(state.fetch(), 0x1234);
        assert_eq!(state.pc, 0x203);
    }

    #[test]
    fn test_memory_wraps() {
        let mut state = State::new();
        state.write(0x1000, 0xAB);
        assert_eq!(state.memory[0x0], 0xAB);
        assert_eq!(state.read(0x1000), 0xAB);

        state.pc = 0x0FFF;
        state.memory[0xFFF] = 0x12;
        assert_eq!(state.fetch(), 0x12AB);
    }

    #[test]
    fn test_push_pop() {
        let mut state = State::new();
        state.push(0x0ABC).unwrap();
        state.push(0x0DEF).unwrap();
        assert_eq!(state.sp, 2);
        assert_eq!(state.pop().unwrap(), 0x0DEF);
        assert_eq!(state.pop().unwrap(), 0x0ABC);
        assert_eq!(state.sp, 0);
    }

    #[test]
    fn test_push_overflow_clamps() {
        let mut state = State::new();
        for addr in 0..STACK_DEPTH as u16 {
            state.push(addr).unwrap();
        }
        state.pc = 0x302;
        let err = state.push(0xFFF).unwrap_err();
        assert!(matches!(err, Chip8Error::StackOverflow { pc: 0x300, .. }));
        assert_eq!(state.sp as usize, STACK_DEPTH);
        assert_eq!(state.stack[STACK_DEPTH - 1], 15);
    }

    #[test]
    fn test_pop_underflow_clamps() {
        let mut state = State::new();
        let err = state.pop().unwrap_err();
        assert!(matches!(err, Chip8Error::StackUnderflow { pc: 0x1FE }));
        assert_eq!(state.sp, 0);
    }

    #[test]
    fn test_tick_timers_floor_at_zero() {
        let mut state = State::new();
        state.delay_timer = 1;
        state.sound_timer = 0;
        state.tick_timers();
        assert_eq!(state.delay_timer, 0);
        assert_eq!(state.sound_timer, 0);
        state.tick_timers();
        assert_eq!(state.delay_timer, 0);
        assert_eq!(state.sound_timer, 0);
    }

    #[test]
    fn test_tick_timers_independently() {
        let mut state = State::new();
        state.delay_timer = 5;
        state.sound_timer = 2;
        state.tick_timers();
        assert_eq!((state.delay_timer, state.sound_timer), (4, 1));
    }

    #[test]
    fn test_first_pressed_key() {
        let mut state = State::new();
        assert_eq!(state.first_pressed_key(), None);
        state.keypad[0xC] = true;
        state.keypad[0x3] = true;
        assert_eq!(state.first_pressed_key(), Some(0x3));
    }
}
