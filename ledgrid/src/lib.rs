//! LED matrix drawing surface and terminal-simulated display.
//!
//! A [`PixelBuffer`] is a plain grid of RGB pixels that apps draw into;
//! [`Terminal`] presents one on a real terminal using half-block glyphs
//! (two matrix rows per terminal row) and polls keyboard input.

pub mod buffer;
pub mod color;
pub mod draw;
pub mod font;
pub mod terminal;

pub use buffer::PixelBuffer;
pub use color::Rgb;
pub use terminal::Terminal;
