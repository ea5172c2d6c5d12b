use std::path::PathBuf;

use clap::Parser;

use vm8_core::constants::{instructions_per_frame, DEFAULT_IPS, MAX_SAVED_STATES};

/// Runs a CHIP-8 program in a window.
///
/// Keys 1-4, Q-R, A-F and Z-V form the hexadecimal keypad. Space pauses, Escape quits,
/// holding Backspace rewinds and holding Tab runs without frame pacing.
#[derive(Debug, Parser)]
#[command(name = "vm8")]
pub struct Config {
    /// Program image to load at 0x200.
    pub rom: PathBuf,

    /// Size of each CHIP-8 pixel on screen.
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..))]
    pub scale: u32,

    /// Colour of lit pixels as RRGGBB or RRGGBBAA hex.
    #[arg(long, default_value = "FFA4FFFF", value_parser = parse_rgba)]
    pub fg: u32,

    /// Colour of unlit pixels as RRGGBB or RRGGBBAA hex.
    #[arg(long, default_value = "000000FF", value_parser = parse_rgba)]
    pub bg: u32,

    /// Outline lit pixels in the background colour (the default).
    #[arg(long, overrides_with = "no_outline")]
    pub outline: bool,

    /// Don't outline lit pixels.
    #[arg(long, overrides_with = "outline")]
    pub no_outline: bool,

    /// Instructions executed per second.
    #[arg(long, default_value_t = DEFAULT_IPS, value_parser = clap::value_parser!(u32).range(1..))]
    pub ips: u32,

    /// How many instructions can be rewound (0 disables rewinding).
    #[arg(long, default_value_t = MAX_SAVED_STATES)]
    pub history: usize,

    /// Seed for the random number source, for reproducible runs.
    #[arg(long)]
    pub seed: Option<u64>,
}

impl Config {
    pub fn outline(&self) -> bool {
        !self.no_outline
    }

    pub fn instructions_per_frame(&self) -> u32 {
        instructions_per_frame(self.ips)
    }
}

/// Parses `RRGGBBAA`, or `RRGGBB` with an opaque alpha, optionally prefixed by `#` or `0x`.
fn parse_rgba(value: &str) -> Result<u32, String> {
    let hex = value
        .strip_prefix('#')
        .or_else(|| value.strip_prefix("0x"))
        .unwrap_or(value);
    let parsed = u32::from_str_radix(hex, 16).map_err(|e| format!("{value:?}: {e}"));
    match hex.len() {
        6 => parsed.map(|rgb| rgb << 8 | 0xFF),
        8 => parsed,
        _ => Err(format!("{value:?}: expected 6 or 8 hex digits")),
    }
}
