use rand::{Rng, RngCore};
use tracing::warn;

use crate::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH, FONT_GLYPH_SIZE};
use crate::error::Result;
use crate::opcode::Opcode;
use crate::state::State;

/// What the engine should do with the pc once an operation has run.
/// The pc already points past the executing opcode when an operation is called.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Flow {
    /// Continue with the following opcode
    Next,
    /// Skip the following opcode
    Skip,
    /// Continue at an absolute address
    Jump(u16),
    /// Execute this opcode again on the next cycle
    Retry,
}

impl Flow {
    fn skip_if(condition: bool) -> Self {
        if condition {
            Flow::Skip
        } else {
            Flow::Next
        }
    }
}

/// The signature shared by every operation.
pub type Operation = fn(op: u16, state: &mut State, rng: &mut dyn RngCore) -> Result<Flow>;

/// clear
pub fn cls(_op: u16, state: &mut State, _rng: &mut dyn RngCore) -> Result<Flow> {
    state.frame_buffer = [[false; DISPLAY_WIDTH]; DISPLAY_HEIGHT];
    state.draw_flag = true;
    Ok(Flow::Next)
}

/// PC = STACK.pop()
pub fn ret(_op: u16, state: &mut State, _rng: &mut dyn RngCore) -> Result<Flow> {
    state.pop().map(Flow::Jump)
}

/// PC = nnn
pub fn jump(op: u16, _state: &mut State, _rng: &mut dyn RngCore) -> Result<Flow> {
    Ok(Flow::Jump(op.nnn()))
}

/// STACK.push(PC); PC = nnn
pub fn call(op: u16, state: &mut State, _rng: &mut dyn RngCore) -> Result<Flow> {
    state.push(state.pc)?;
    Ok(Flow::Jump(op.nnn()))
}

/// if Vx == nn then skip
pub fn skip_eq(op: u16, state: &mut State, _rng: &mut dyn RngCore) -> Result<Flow> {
    Ok(Flow::skip_if(state.v[op.x()] == op.nn()))
}

/// if Vx != nn then skip
pub fn skip_ne(op: u16, state: &mut State, _rng: &mut dyn RngCore) -> Result<Flow> {
    Ok(Flow::skip_if(state.v[op.x()] != op.nn()))
}

/// if Vx == Vy then skip
pub fn skip_eq_reg(op: u16, state: &mut State, _rng: &mut dyn RngCore) -> Result<Flow> {
    Ok(Flow::skip_if(state.v[op.x()] == state.v[op.y()]))
}

/// Vx = nn
pub fn load(op: u16, state: &mut State, _rng: &mut dyn RngCore) -> Result<Flow> {
    state.v[op.x()] = op.nn();
    Ok(Flow::Next)
}

/// Vx += nn
/// Overflow wraps and VF is left alone
pub fn add(op: u16, state: &mut State, _rng: &mut dyn RngCore) -> Result<Flow> {
    state.v[op.x()] = state.v[op.x()].wrapping_add(op.nn());
    Ok(Flow::Next)
}

/// Vx = Vy
pub fn mv(op: u16, state: &mut State, _rng: &mut dyn RngCore) -> Result<Flow> {
    state.v[op.x()] = state.v[op.y()];
    Ok(Flow::Next)
}

/// Vx |= Vy
pub fn or(op: u16, state: &mut State, _rng: &mut dyn RngCore) -> Result<Flow> {
    state.v[op.x()] |= state.v[op.y()];
    Ok(Flow::Next)
}

/// Vx &= Vy
pub fn and(op: u16, state: &mut State, _rng: &mut dyn RngCore) -> Result<Flow> {
    state.v[op.x()] &= state.v[op.y()];
    Ok(Flow::Next)
}

/// Vx ^= Vy
pub fn xor(op: u16, state: &mut State, _rng: &mut dyn RngCore) -> Result<Flow> {
    state.v[op.x()] ^= state.v[op.y()];
    Ok(Flow::Next)
}

// The flag is written after the result in all of the following, so VF holds the
// flag even when it is also the destination register.

/// Vx += Vy; VF = overflow
pub fn add_reg(op: u16, state: &mut State, _rng: &mut dyn RngCore) -> Result<Flow> {
    let (res, over) = state.v[op.x()].overflowing_add(state.v[op.y()]);
    state.v[op.x()] = res;
    state.v[0xF] = over as u8;
    Ok(Flow::Next)
}

/// Vx -= Vy; VF = !underflow
pub fn sub(op: u16, state: &mut State, _rng: &mut dyn RngCore) -> Result<Flow> {
    let (res, under) = state.v[op.x()].overflowing_sub(state.v[op.y()]);
    state.v[op.x()] = res;
    state.v[0xF] = !under as u8;
    Ok(Flow::Next)
}

/// Vx >>= 1; VF = lsb before the shift
pub fn shr(op: u16, state: &mut State, _rng: &mut dyn RngCore) -> Result<Flow> {
    let lsb = state.v[op.x()] & 0x1;
    state.v[op.x()] >>= 1;
    state.v[0xF] = lsb;
    Ok(Flow::Next)
}

/// Vx = Vy - Vx; VF = !underflow
pub fn subn(op: u16, state: &mut State, _rng: &mut dyn RngCore) -> Result<Flow> {
    let (res, under) = state.v[op.y()].overflowing_sub(state.v[op.x()]);
    state.v[op.x()] = res;
    state.v[0xF] = !under as u8;
    Ok(Flow::Next)
}

/// Vx <<= 1; VF = msb before the shift
pub fn shl(op: u16, state: &mut State, _rng: &mut dyn RngCore) -> Result<Flow> {
    let msb = state.v[op.x()] >> 7;
    state.v[op.x()] <<= 1;
    state.v[0xF] = msb;
    Ok(Flow::Next)
}

/// if Vx != Vy then skip
pub fn skip_ne_reg(op: u16, state: &mut State, _rng: &mut dyn RngCore) -> Result<Flow> {
    Ok(Flow::skip_if(state.v[op.x()] != state.v[op.y()]))
}

/// I = nnn
pub fn load_i(op: u16, state: &mut State, _rng: &mut dyn RngCore) -> Result<Flow> {
    state.i = op.nnn();
    Ok(Flow::Next)
}

/// PC = V0 + nnn
pub fn jump_v0(op: u16, state: &mut State, _rng: &mut dyn RngCore) -> Result<Flow> {
    Ok(Flow::Jump(op.nnn() + u16::from(state.v[0x0])))
}

/// Vx = rand_byte & nn
pub fn random(op: u16, state: &mut State, rng: &mut dyn RngCore) -> Result<Flow> {
    let rand_byte: u8 = rng.gen();
    state.v[op.x()] = rand_byte & op.nn();
    Ok(Flow::Next)
}

/// draw_sprite(x=Vx y=Vy size=n)
/// XORs a sprite from memory I..I+n at position x, y on the FrameBuffer.
/// The origin wraps onto the screen but the sprite itself is clipped at the edges.
/// Sets VF if any pixels are erased
pub fn draw(op: u16, state: &mut State, _rng: &mut dyn RngCore) -> Result<Flow> {
    let origin_x = state.v[op.x()] as usize % DISPLAY_WIDTH;
    let origin_y = state.v[op.y()] as usize % DISPLAY_HEIGHT;

    // Reset the flag (used for collision detection)
    state.v[0xF] = 0x0;

    for row in 0..op.n() as usize {
        let y = origin_y + row;
        if y >= DISPLAY_HEIGHT {
            break;
        }
        let sprite = state.read(state.i.wrapping_add(row as u16));
        for bit in 0..8 {
            let x = origin_x + bit;
            if x >= DISPLAY_WIDTH {
                break;
            }
            if sprite & (0x80 >> bit) == 0 {
                continue;
            }
            let pixel = &mut state.frame_buffer[y][x];
            if *pixel {
                state.v[0xF] = 0x1;
            }
            *pixel = !*pixel;
        }
    }

    state.draw_flag = true;
    Ok(Flow::Next)
}

/// if keypad[Vx] then skip
pub fn skip_pressed(op: u16, state: &mut State, _rng: &mut dyn RngCore) -> Result<Flow> {
    Ok(Flow::skip_if(state.keypad[key_in(state, op)]))
}

/// if !keypad[Vx] then skip
pub fn skip_released(op: u16, state: &mut State, _rng: &mut dyn RngCore) -> Result<Flow> {
    Ok(Flow::skip_if(!state.keypad[key_in(state, op)]))
}

/// Only the low nibble of Vx names a key
fn key_in(state: &State, op: u16) -> usize {
    (state.v[op.x()] & 0xF) as usize
}

/// Vx = DT
pub fn get_delay(op: u16, state: &mut State, _rng: &mut dyn RngCore) -> Result<Flow> {
    state.v[op.x()] = state.delay_timer;
    Ok(Flow::Next)
}

/// Vx = first pressed key, or retry until there is one
pub fn await_key(op: u16, state: &mut State, _rng: &mut dyn RngCore) -> Result<Flow> {
    match state.first_pressed_key() {
        Some(key) => {
            state.v[op.x()] = key;
            Ok(Flow::Next)
        }
        None => Ok(Flow::Retry),
    }
}

/// DT = Vx
pub fn set_delay(op: u16, state: &mut State, _rng: &mut dyn RngCore) -> Result<Flow> {
    state.delay_timer = state.v[op.x()];
    Ok(Flow::Next)
}

/// ST = Vx
pub fn set_sound(op: u16, state: &mut State, _rng: &mut dyn RngCore) -> Result<Flow> {
    state.sound_timer = state.v[op.x()];
    Ok(Flow::Next)
}

/// I += Vx
pub fn add_i(op: u16, state: &mut State, _rng: &mut dyn RngCore) -> Result<Flow> {
    state.i = state.i.wrapping_add(u16::from(state.v[op.x()]));
    Ok(Flow::Next)
}

/// I = Vx * 5
/// Set I to the memory address of the font glyph for Vx
/// See constants::FONT_SET for more details
pub fn load_glyph(op: u16, state: &mut State, _rng: &mut dyn RngCore) -> Result<Flow> {
    state.i = u16::from(state.v[op.x()]) * FONT_GLYPH_SIZE;
    Ok(Flow::Next)
}

/// mem[I..I+3] = bcd(Vx)
/// Store the hundreds, tens and units digits of Vx in memory starting at address I
pub fn bcd(op: u16, state: &mut State, _rng: &mut dyn RngCore) -> Result<Flow> {
    let value = state.v[op.x()];
    let digits = [value / 100, value / 10 % 10, value % 10];
    for (offset, digit) in (0u16..).zip(digits.iter()) {
        state.write(state.i.wrapping_add(offset), *digit);
    }
    Ok(Flow::Next)
}

/// mem[I..=I+x] = V0..=Vx
/// I itself is left unchanged
pub fn store(op: u16, state: &mut State, _rng: &mut dyn RngCore) -> Result<Flow> {
    for register in 0..=op.x() {
        state.write(state.i.wrapping_add(register as u16), state.v[register]);
    }
    Ok(Flow::Next)
}

/// V0..=Vx = mem[I..=I+x]
/// I itself is left unchanged
pub fn read(op: u16, state: &mut State, _rng: &mut dyn RngCore) -> Result<Flow> {
    for register in 0..=op.x() {
        state.v[register] = state.read(state.i.wrapping_add(register as u16));
    }
    Ok(Flow::Next)
}

/// Anything without a defined meaning is logged and otherwise ignored
pub fn unknown(op: u16, state: &mut State, _rng: &mut dyn RngCore) -> Result<Flow> {
    warn!(
        "unknown opcode {:04X} at {:04X}; skipping",
        op,
        state.pc.wrapping_sub(2)
    );
    Ok(Flow::Next)
}
