//! Small shared helpers for the built-in apps.

use ledgrid::{PixelBuffer, Rgb};

/// Draw `s` horizontally centered at row `y`.
pub fn centered_text(frame: &mut PixelBuffer, y: i32, s: &str, color: Rgb) {
    let x = (frame.width() as i32 - PixelBuffer::text_width(s) as i32) / 2;
    frame.text(x, y, s, color);
}
