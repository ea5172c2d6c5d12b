//! A CHIP-8 interpreter core.
//!
//! The [`Chip8`] owns the whole machine. A host pushes key state in, runs
//! [`Chip8::run_frame`] once per 60Hz frame and reads the frame buffer back out.
pub use chip8::{Chip8, ExecutionState};
pub use error::{Chip8Error, Result};
pub use state::{FrameBuffer, Keypad, State};

mod chip8;
pub mod constants;
mod error;
pub mod instruction;
pub mod opcode;
pub mod operations;
pub mod state;
