//! Built-in apps.

pub mod clock;
pub mod launcher;
pub mod starfield;
pub mod weather;

use ledgrid::{PixelBuffer, Rgb};

/// Palette-coded 8x8 icon, one nibble-ish code per pixel. Zero is
/// transparent; the rest map through [`palette_color`].
pub type Icon = [[u8; 8]; 8];

/// The launcher icon palette.
pub fn palette_color(code: u8) -> Rgb {
    match code {
        1 => Rgb::WHITE,
        2 => Rgb::new(255, 0, 0),
        3 => Rgb::new(0, 255, 0),
        4 => Rgb::new(0, 0, 255),
        5 => Rgb::new(255, 255, 0),
        6 => Rgb::new(0, 255, 255),
        7 => Rgb::new(255, 0, 255),
        _ => Rgb::new(100, 100, 100),
    }
}

/// Draw a palette-coded icon with its top-left corner at `(x, y)`.
/// Zero pixels are skipped, not painted black.
pub fn draw_icon(frame: &mut PixelBuffer, icon: &Icon, x: i32, y: i32) {
    for (row, codes) in icon.iter().enumerate() {
        for (col, &code) in codes.iter().enumerate() {
            if code != 0 {
                frame.set(x + col as i32, y + row as i32, palette_color(code));
            }
        }
    }
}
