//! Terminal-simulated LED matrix with safe setup and teardown.

use std::io::{self, Write};
use std::panic;
use std::time::Duration;

use crossterm::{
    cursor,
    event::{self, Event as CrosstermEvent},
    execute, queue,
    style::{Color as CtColor, Print, SetBackgroundColor, SetForegroundColor},
    terminal,
};
use log::debug;

use crate::buffer::PixelBuffer;
use crate::color::Rgb;

/// Upper half block: foreground paints the top matrix row of the pair,
/// background paints the bottom one.
const HALF_BLOCK: char = '\u{2580}';

/// A terminal display for a [`PixelBuffer`], two matrix rows per
/// terminal row. Restores the terminal on drop and on panic.
pub struct Terminal {
    stdout: io::Stdout,
    presented: Option<PixelBuffer>,
}

impl Terminal {
    pub fn new() -> io::Result<Self> {
        // Restore the terminal before the default panic output so the
        // message is readable outside raw mode.
        let original_hook = panic::take_hook();
        panic::set_hook(Box::new(move |panic_info| {
            let _ = restore_terminal();
            original_hook(panic_info);
        }));

        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(
            stdout,
            terminal::EnterAlternateScreen,
            terminal::Clear(terminal::ClearType::All),
            cursor::Hide
        )?;

        Ok(Self {
            stdout,
            presented: None,
        })
    }

    /// Terminal size in cells.
    pub fn size(&self) -> io::Result<(u16, u16)> {
        terminal::size()
    }

    /// Poll for at most one pending input event.
    pub fn poll(&self, timeout: Duration) -> io::Result<Option<CrosstermEvent>> {
        if event::poll(timeout)? {
            Ok(Some(event::read()?))
        } else {
            Ok(None)
        }
    }

    /// Forget the previously presented buffer so the next `present`
    /// repaints everything (e.g. after a terminal resize).
    pub fn invalidate(&mut self) {
        self.presented = None;
    }

    /// Present `frame`, rewriting only the cells whose pixel pair changed
    /// since the previous call.
    pub fn present(&mut self, frame: &PixelBuffer) -> io::Result<()> {
        let full = match &self.presented {
            Some(prev) => {
                prev.width() != frame.width() || prev.height() != frame.height()
            }
            None => true,
        };
        if full {
            execute!(self.stdout, terminal::Clear(terminal::ClearType::All))?;
            debug!("full matrix repaint {}x{}", frame.width(), frame.height());
        }

        let mut last_fg: Option<Rgb> = None;
        let mut last_bg: Option<Rgb> = None;
        let mut cursor_at: Option<(u16, u16)> = None;

        let rows = frame.height().div_ceil(2);
        for cell_y in 0..rows {
            for x in 0..frame.width() {
                let top = frame.get(x, cell_y * 2).unwrap_or(Rgb::BLACK);
                let bottom = frame.get(x, cell_y * 2 + 1).unwrap_or(Rgb::BLACK);

                if !full {
                    // prev buffer has the same size here
                    let prev = self.presented.as_ref().unwrap();
                    let prev_top = prev.get(x, cell_y * 2).unwrap_or(Rgb::BLACK);
                    let prev_bottom = prev.get(x, cell_y * 2 + 1).unwrap_or(Rgb::BLACK);
                    if top == prev_top && bottom == prev_bottom {
                        continue;
                    }
                }

                if cursor_at != Some((x, cell_y)) {
                    queue!(self.stdout, cursor::MoveTo(x, cell_y))?;
                }
                if last_fg != Some(top) {
                    queue!(self.stdout, SetForegroundColor(to_ct_color(top)))?;
                    last_fg = Some(top);
                }
                if last_bg != Some(bottom) {
                    queue!(self.stdout, SetBackgroundColor(to_ct_color(bottom)))?;
                    last_bg = Some(bottom);
                }
                queue!(self.stdout, Print(HALF_BLOCK))?;
                cursor_at = Some((x + 1, cell_y));
            }
        }

        self.stdout.flush()?;
        self.presented = Some(frame.clone());
        Ok(())
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = restore_terminal();
    }
}

fn to_ct_color(c: Rgb) -> CtColor {
    CtColor::Rgb {
        r: c.r,
        g: c.g,
        b: c.b,
    }
}

/// Restore the terminal to its original state.
fn restore_terminal() -> io::Result<()> {
    terminal::disable_raw_mode()?;
    execute!(
        io::stdout(),
        terminal::LeaveAlternateScreen,
        cursor::Show
    )?;
    Ok(())
}
