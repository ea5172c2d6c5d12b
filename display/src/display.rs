use sdl2::pixels::{Color, PixelFormatEnum};
use sdl2::rect::Rect;

use vm8_core::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH};
use vm8_core::FrameBuffer;

/// The two colours a frame is drawn with.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Palette {
    pub foreground: Color,
    pub background: Color,
}

impl Palette {
    /// Builds a palette from `0xRRGGBBAA` values
    pub fn from_rgba(foreground: u32, background: u32) -> Self {
        Palette {
            foreground: rgba(foreground),
            background: rgba(background),
        }
    }
}

fn rgba(value: u32) -> Color {
    Color::RGBA(
        (value >> 24) as u8,
        (value >> 16) as u8,
        (value >> 8) as u8,
        value as u8,
    )
}

/// # Display
/// The Chip-8 display is composed of 64x32 pixels that are either lit or unlit.
/// Lit pixels are drawn in the palette's foreground colour and unlit ones in its background.
/// The display only gets a call to `render` when the Chip-8 FrameBuffer is updated.
pub struct Display {
    canvas: sdl2::render::WindowCanvas,
    palette: Palette,
    scale: u32,
    outline: bool,
}

impl Display {
    /// Creates a new display object bound to an sdl2 context.
    ///
    /// # Arguments
    /// * `sdl` an sdl2 context with which to draw
    /// * `scale` the size multiplier for each pixel
    /// * `palette` the colours of lit and unlit pixels
    /// * `outline` whether lit pixels get a background coloured border
    pub fn new(sdl: &sdl2::Sdl, scale: u32, palette: Palette, outline: bool) -> Result<Self, String> {
        let video_subsystem = sdl.video()?;
        let window = video_subsystem
            .window(
                "vm8",
                DISPLAY_WIDTH as u32 * scale,
                DISPLAY_HEIGHT as u32 * scale,
            )
            .position_centered()
            .build()
            .map_err(|e| e.to_string())?;
        let canvas = window.into_canvas().build().map_err(|e| e.to_string())?;

        Ok(Display {
            canvas,
            palette,
            scale,
            outline,
        })
    }

    /// Formats a Chip-8 FrameBuffer for rendering as an SDL2 texture.
    ///
    /// An SDL2 RGB24 texture is a 1D array of bytes that represent concatenated rows of RGB pixels.
    /// Every pixel is replaced by the three colour components of its palette colour.
    ///
    /// # Arguments
    /// * `frame` a Chip-8 FrameBuffer
    /// * `palette` the colours to draw with
    fn frame_to_sdl_texture(frame: &FrameBuffer, palette: &Palette) -> Vec<u8> {
        frame
            .iter()
            .flat_map(|row| row.iter())
            .flat_map(|&lit| {
                let color = if lit {
                    palette.foreground
                } else {
                    palette.background
                };
                [color.r, color.g, color.b]
            })
            .collect()
    }

    /// Formats the Chip-8 FrameBuffer as an SDL2 RGB24 texture and renders it.
    ///
    /// # Arguments
    /// * `frame` a Chip-8 FrameBuffer
    pub fn render(&mut self, frame: &FrameBuffer) -> Result<(), String> {
        let texture_creator = self.canvas.texture_creator();

        let mut texture = texture_creator
            .create_texture_streaming(
                PixelFormatEnum::RGB24,
                DISPLAY_WIDTH as u32,
                DISPLAY_HEIGHT as u32,
            )
            .map_err(|e| e.to_string())?;

        let pixels = Display::frame_to_sdl_texture(frame, &self.palette);
        texture.with_lock(None, |buffer: &mut [u8], pitch: usize| {
            // rows may be padded out past the visible width
            for (y, row) in pixels.chunks(DISPLAY_WIDTH * 3).enumerate() {
                buffer[y * pitch..y * pitch + row.len()].copy_from_slice(row);
            }
        })?;

        self.canvas.copy(&texture, None, None)?;
        if self.outline {
            self.draw_outlines(frame)?;
        }
        self.canvas.present();
        Ok(())
    }

    fn draw_outlines(&mut self, frame: &FrameBuffer) -> Result<(), String> {
        self.canvas.set_draw_color(self.palette.background);
        for (y, row) in frame.iter().enumerate() {
            for (x, _) in row.iter().enumerate().filter(|(_, lit)| **lit) {
                self.canvas.draw_rect(Rect::new(
                    (x as u32 * self.scale) as i32,
                    (y as u32 * self.scale) as i32,
                    self.scale,
                    self.scale,
                ))?;
            }
        }
        Ok(())
    }
}
