use rand::RngCore;
use tracing::trace;

use crate::error::Result;
use crate::opcode::Opcode;
use crate::operations::*;
use crate::state::State;

/// Selects the correct Operation for a given Opcode
pub fn from_op(op: u16) -> Operation {
    match op.nibbles() {
        (0x0, 0x0, 0xE, 0x0) => cls,
        (0x0, 0x0, 0xE, 0xE) => ret,
        (0x1, ..) => jump,
        (0x2, ..) => call,
        (0x3, ..) => skip_eq,
        (0x4, ..) => skip_ne,
        (0x5, .., 0x0) => skip_eq_reg,
        (0x6, ..) => load,
        (0x7, ..) => add,
        (0x8, .., 0x0) => mv,
        (0x8, .., 0x1) => or,
        (0x8, .., 0x2) => and,
        (0x8, .., 0x3) => xor,
        (0x8, .., 0x4) => add_reg,
        (0x8, .., 0x5) => sub,
        (0x8, .., 0x6) => shr,
        (0x8, .., 0x7) => subn,
        (0x8, .., 0xE) => shl,
        (0x9, .., 0x0) => skip_ne_reg,
        (0xA, ..) => load_i,
        (0xB, ..) => jump_v0,
        (0xC, ..) => random,
        (0xD, ..) => draw,
        (0xE, .., 0x9, 0xE) => skip_pressed,
        (0xE, .., 0xA, 0x1) => skip_released,
        (0xF, .., 0x0, 0x7) => get_delay,
        (0xF, .., 0x0, 0xA) => await_key,
        (0xF, .., 0x1, 0x5) => set_delay,
        (0xF, .., 0x1, 0x8) => set_sound,
        (0xF, .., 0x1, 0xE) => add_i,
        (0xF, .., 0x2, 0x9) => load_glyph,
        (0xF, .., 0x3, 0x3) => bcd,
        (0xF, .., 0x5, 0x5) => store,
        (0xF, .., 0x6, 0x5) => read,
        _ => unknown,
    }
}

/// Fetches, decodes and executes a single opcode, returning it.
///
/// The pc is moved past the opcode before it runs, then adjusted by the operation's `Flow`.
/// If the operation fails the pc is put back on the failing opcode.
pub fn execute(state: &mut State, rng: &mut dyn RngCore) -> Result<u16> {
    let pc = state.pc;
    let op = state.fetch();
    trace!(
        "{:04X} v{:02X?} i{:04X} pc{:04X}",
        op,
        state.v,
        state.i,
        pc
    );

    match from_op(op)(op, state, rng) {
        Ok(flow) => {
            state.pc = match flow {
                Flow::Next => state.pc,
                Flow::Skip => state.pc.wrapping_add(2),
                Flow::Jump(addr) => addr,
                Flow::Retry => pc,
            };
            Ok(op)
        }
        Err(e) => {
            state.pc = pc;
            Err(e)
        }
    }
}
