//! Drawing primitives over [`PixelBuffer`].

use crate::buffer::PixelBuffer;
use crate::color::Rgb;
use crate::font;

impl PixelBuffer {
    /// Draw a rectangle. `fill` draws the interior, otherwise just the outline.
    pub fn rect(&mut self, x: i32, y: i32, w: u16, h: u16, color: Rgb, fill: bool) {
        if w == 0 || h == 0 {
            return;
        }
        let (w, h) = (w as i32, h as i32);
        if fill {
            for dy in 0..h {
                for dx in 0..w {
                    self.set(x + dx, y + dy, color);
                }
            }
        } else {
            for dx in 0..w {
                self.set(x + dx, y, color);
                self.set(x + dx, y + h - 1, color);
            }
            for dy in 0..h {
                self.set(x, y + dy, color);
                self.set(x + w - 1, y + dy, color);
            }
        }
    }

    /// Draw a line with Bresenham's algorithm.
    pub fn line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgb) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let (mut x, mut y) = (x0, y0);
        loop {
            self.set(x, y, color);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Draw a circle centered at `(cx, cy)`.
    pub fn circle(&mut self, cx: i32, cy: i32, radius: u16, color: Rgb, fill: bool) {
        let r = radius as i32;
        let r2 = r * r;
        // Clamp so a zero-radius outline still plots the center pixel.
        let inner = (r - 1).max(0);
        for dy in -r..=r {
            for dx in -r..=r {
                let d2 = dx * dx + dy * dy;
                let on_edge = d2 <= r2 && d2 >= inner * inner;
                if (fill && d2 <= r2) || (!fill && on_edge) {
                    self.set(cx + dx, cy + dy, color);
                }
            }
        }
    }

    /// Draw text with the built-in 3x5 pixel font. Unknown characters
    /// render as blanks. Returns nothing; clipping is per-pixel.
    pub fn text(&mut self, x: i32, y: i32, s: &str, color: Rgb) {
        let mut pen_x = x;
        for ch in s.chars() {
            if let Some(glyph) = font::glyph(ch) {
                for (row, bits) in glyph.iter().enumerate() {
                    for col in 0..font::GLYPH_WIDTH {
                        if bits & (0b100 >> col) != 0 {
                            self.set(pen_x + col as i32, y + row as i32, color);
                        }
                    }
                }
            }
            pen_x += (font::GLYPH_WIDTH + 1) as i32;
        }
    }

    /// Pixel width of `s` in the built-in font.
    pub fn text_width(s: &str) -> u16 {
        let n = s.chars().count() as u16;
        if n == 0 {
            0
        } else {
            n * (font::GLYPH_WIDTH as u16 + 1) - 1
        }
    }
}
