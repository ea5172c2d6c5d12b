use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tracing::{debug, info, warn};

use crate::constants::{MAX_PROGRAM_SIZE, MAX_SAVED_STATES, PROGRAM_START};
use crate::error::{Chip8Error, Result};
use crate::instruction;
use crate::state::{FrameBuffer, Keypad, State};

/// Whether the machine is allowed to make progress.
///
/// ```text
/// Running <-> Paused
///    \         /
///     v       v
///      Halted
/// ```
/// Transitions are made by the host; the interpreter never changes this on its own.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExecutionState {
    Running,
    Paused,
    Halted,
}

/// # Chip-8
/// Chip-8 is a virtual machine and corresponding interpreted language.
///
/// Tracks:
///  - current `state`
///  - `previous_states` for rewinding
///  - the `execution_state` the host has put it in
///  - the random source used by `CXNN`
///
/// Supplies interfaces for:
/// - loading roms
/// - pressing and releasing keys
/// - advancing and reversing the CPU
/// - advancing its timers
/// - inspecting its frame buffer for rendering by some display
///
/// A `Chip8` isn't internally synchronised; a host sharing one between threads must
/// serialise execution, timer ticks, frame reads and key writes itself.
pub struct Chip8 {
    state: State,
    previous_states: VecDeque<State>,
    history_limit: usize,
    execution_state: ExecutionState,
    rng: Box<dyn RngCore + Send>,
}

impl Chip8 {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// A machine whose `CXNN` results are reproducible for a given seed
    pub fn from_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    /// A machine drawing its random bytes from `rng`
    pub fn with_rng(rng: impl RngCore + Send + 'static) -> Self {
        Chip8 {
            state: State::new(),
            previous_states: VecDeque::with_capacity(MAX_SAVED_STATES),
            history_limit: MAX_SAVED_STATES,
            execution_state: ExecutionState::Running,
            rng: Box::new(rng),
        }
    }

    /// Load a rom from a source file
    ///
    /// # Arguments
    /// * `reader` a reader that yields the whole ROM image
    pub fn load_rom(&mut self, reader: &mut dyn Read) -> Result<usize> {
        let mut program = Vec::with_capacity(MAX_PROGRAM_SIZE);
        reader.read_to_end(&mut program)?;
        self.load_program(&program)
    }

    /// Load a rom from the file at `path`
    pub fn load_rom_file(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let file = File::open(path)?;
        self.load_rom(&mut BufReader::new(file))
    }

    /// Resets the machine and copies `program` to `PROGRAM_START`
    ///
    /// Returns the number of bytes loaded.
    pub fn load_program(&mut self, program: &[u8]) -> Result<usize> {
        if program.len() > MAX_PROGRAM_SIZE {
            return Err(Chip8Error::RomTooLarge {
                size: program.len(),
                max: MAX_PROGRAM_SIZE,
            });
        }

        let start = PROGRAM_START as usize;
        self.state = State::new();
        self.state.memory[start..start + program.len()].copy_from_slice(program);
        self.previous_states.clear();
        debug!("loaded {} byte program at {:04X}", program.len(), start);
        Ok(program.len())
    }

    /// Set the pressed status of key
    ///
    /// # Arguments
    /// * `key` the hexadecimal key 0..F that was pressed
    pub fn key_press(&mut self, key: u8) {
        self.set_key(key, true);
    }

    /// Unset the pressed status of key
    ///
    /// # Arguments
    /// * `key` the hexadecimal key 0..F that was released
    pub fn key_release(&mut self, key: u8) {
        self.set_key(key, false);
    }

    fn set_key(&mut self, key: u8, pressed: bool) {
        match self.state.keypad.get_mut(key as usize) {
            Some(slot) => *slot = pressed,
            None => warn!("ignoring key {:#X}; there are only 16 keys", key),
        }
    }

    /// Replace the pressed status of every key at once
    pub fn set_keys(&mut self, keypad: Keypad) {
        self.state.keypad = keypad;
    }

    pub fn keypad(&self) -> &Keypad {
        &self.state.keypad
    }

    /// Advances the CPU by a single instruction
    /// - does nothing unless running
    /// - saves the current state so it can be rewound to, unless the last
    ///   instruction left the pc where it was (key waits, jumps to self)
    /// - gets and executes the next opcode
    pub fn execute(&mut self) -> Result<()> {
        if self.execution_state != ExecutionState::Running {
            return Ok(());
        }
        let spinning = matches!(
            self.previous_states.front(),
            Some(prev) if prev.pc == self.state.pc
        );
        if !spinning {
            self.save_state();
        }
        instruction::execute(&mut self.state, &mut *self.rng).map(|_| ())
    }

    /// Decrements the delay and sound timers; called once per 60Hz frame.
    /// Timers are frozen unless running.
    pub fn tick_timers(&mut self) {
        if self.execution_state == ExecutionState::Running {
            self.state.tick_timers();
        }
    }

    /// Runs one frame's worth of work: `budget` instructions followed by a single timer tick.
    ///
    /// Stops at the first fatal error, leaving the timers unticked.
    pub fn run_frame(&mut self, budget: u32) -> Result<()> {
        if self.execution_state != ExecutionState::Running {
            return Ok(());
        }
        for _ in 0..budget {
            self.execute()?;
        }
        self.tick_timers();
        Ok(())
    }

    /// Reverses the CPU by a single instruction if possible
    /// - if there are previous_states, pops the last one and restores it
    /// - the keypad is left as the host last set it
    pub fn rewind(&mut self) -> bool {
        if self.execution_state == ExecutionState::Halted {
            return false;
        }
        match self.previous_states.pop_front() {
            Some(state) => {
                let keypad = self.state.keypad;
                self.state = state;
                self.state.keypad = keypad;
                self.state.draw_flag = true;
                true
            }
            None => false,
        }
    }

    /// Limits how many instructions can be rewound; 0 disables rewinding
    pub fn set_history_limit(&mut self, limit: usize) {
        self.history_limit = limit;
        self.previous_states.truncate(limit);
    }

    /// Puts the current state in previous_states
    /// - if there are already `history_limit` saved then the oldest is dropped
    fn save_state(&mut self) {
        if self.history_limit == 0 {
            return;
        }
        if self.previous_states.len() >= self.history_limit {
            self.previous_states.pop_back();
        }
        self.previous_states.push_front(self.state);
    }

    /// Returns the FrameBuffer if the display should be redrawn, clearing the draw flag
    pub fn take_frame(&mut self) -> Option<FrameBuffer> {
        if self.state.draw_flag {
            self.state.draw_flag = false;
            Some(self.state.frame_buffer)
        } else {
            None
        }
    }

    pub fn frame_buffer(&self) -> &FrameBuffer {
        &self.state.frame_buffer
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    /// Whether a tone should currently be playing
    pub fn sound_active(&self) -> bool {
        self.state.sound_timer > 0
    }

    pub fn execution_state(&self) -> ExecutionState {
        self.execution_state
    }

    pub fn is_halted(&self) -> bool {
        self.execution_state == ExecutionState::Halted
    }

    pub fn pause(&mut self) {
        if self.execution_state == ExecutionState::Running {
            self.execution_state = ExecutionState::Paused;
            info!("paused");
        }
    }

    pub fn resume(&mut self) {
        if self.execution_state == ExecutionState::Paused {
            self.execution_state = ExecutionState::Running;
            info!("resumed");
        }
    }

    pub fn toggle_pause(&mut self) {
        match self.execution_state {
            ExecutionState::Running => self.pause(),
            ExecutionState::Paused => self.resume(),
            ExecutionState::Halted => {}
        }
    }

    /// Stops the machine for good
    pub fn halt(&mut self) {
        if self.execution_state != ExecutionState::Halted {
            self.execution_state = ExecutionState::Halted;
            info!("halted at {:04X}", self.state.pc);
        }
    }
}

impl Default for Chip8 {
    fn default() -> Self {
        Self::new()
    }
}
