use std::thread::sleep;
use std::time::{Duration, Instant};

use anyhow::{Context, Error, Result};
use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use tracing::{debug, error, info};

use vm8_core::constants::TIMER_HZ;
use vm8_core::Chip8;
use vm8_display::{Display, Palette};

use crate::config::Config;
use crate::keymap::keymap;

pub fn run(config: &Config) -> Result<()> {
    let mut chip8 = match config.seed {
        Some(seed) => Chip8::from_seed(seed),
        None => Chip8::new(),
    };
    chip8.set_history_limit(config.history);

    // Load ROM
    let size = chip8
        .load_rom_file(&config.rom)
        .with_context(|| format!("unable to load ROM {}", config.rom.display()))?;
    info!("loaded {} ({} bytes)", config.rom.display(), size);

    // Get SDL2 context
    let sdl = sdl2::init()
        .map_err(Error::msg)
        .context("unable to initialise SDL")?;
    let palette = Palette::from_rgba(config.fg, config.bg);
    let mut display = Display::new(&sdl, config.scale, palette, config.outline())
        .map_err(Error::msg)
        .context("unable to open a window")?;
    let mut events = sdl.event_pump().map_err(Error::msg)?;
    display.render(chip8.frame_buffer()).map_err(Error::msg)?;

    // Set initial timing
    let frame_time = Duration::from_secs(1) / TIMER_HZ;
    let budget = config.instructions_per_frame();

    // Whether or not the frame rate should be respected
    let mut fast_forward = false;
    // Whether the game's state should be cycled forwards or backwards
    let mut rewind = false;
    let mut beeping = false;

    while !chip8.is_halted() {
        let frame_start = Instant::now();

        // Handle input
        for event in events.poll_iter() {
            match event {
                Event::Quit { .. } => chip8.halt(),
                Event::KeyDown {
                    keycode: Some(key),
                    repeat: false,
                    ..
                } => match (key, keymap(key)) {
                    (_, Some(kc)) => chip8.key_press(kc),
                    (Keycode::Escape, _) => chip8.halt(),
                    (Keycode::Space, _) => chip8.toggle_pause(),
                    (Keycode::Backspace, _) => rewind = true,
                    (Keycode::Tab, _) => fast_forward = true,
                    _ => continue,
                },
                Event::KeyUp {
                    keycode: Some(key), ..
                } => match (key, keymap(key)) {
                    (_, Some(kc)) => chip8.key_release(kc),
                    (Keycode::Backspace, _) => rewind = false,
                    (Keycode::Tab, _) => fast_forward = false,
                    _ => continue,
                },
                _ => continue,
            };
        }
        if chip8.is_halted() {
            break;
        }

        // Update state
        if rewind {
            for _ in 0..budget {
                if !chip8.rewind() {
                    break;
                }
            }
        } else if let Err(e) = chip8.run_frame(budget) {
            error!("{}", e);
            chip8.halt();
            return Err(e.into());
        }

        if let Some(frame) = chip8.take_frame() {
            display.render(&frame).map_err(Error::msg)?;
        }

        if chip8.sound_active() != beeping {
            beeping = !beeping;
            debug!(beeping, "sound timer changed");
        }

        // Handle timing
        if !fast_forward {
            if let Some(remaining) = frame_time.checked_sub(frame_start.elapsed()) {
                sleep(remaining);
            }
        }
    }

    Ok(())
}
