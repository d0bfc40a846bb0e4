//! Digital clock.

use std::time::Duration;

use chrono::Local;
use matrixos::prelude::*;

use super::Icon;
use crate::util::centered_text;

pub const ICON: Icon = [
    [0, 0, 6, 6, 6, 6, 0, 0],
    [0, 6, 0, 0, 0, 0, 6, 0],
    [6, 0, 0, 1, 0, 0, 0, 6],
    [6, 0, 0, 1, 0, 0, 0, 6],
    [6, 0, 0, 1, 1, 0, 0, 6],
    [6, 0, 0, 0, 0, 0, 0, 6],
    [0, 6, 0, 0, 0, 0, 6, 0],
    [0, 0, 6, 6, 6, 6, 0, 0],
];

pub struct ClockApp {
    time_text: String,
    date_text: String,
    show_date: bool,
    dirty: bool,
}

impl ClockApp {
    pub fn new() -> Self {
        Self {
            time_text: String::new(),
            date_text: String::new(),
            show_date: true,
            dirty: true,
        }
    }

    fn refresh(&mut self) {
        let now = Local::now();
        let time_text = now.format("%H:%M:%S").to_string();
        let date_text = now.format("%d %b %Y").to_string().to_uppercase();
        if time_text != self.time_text || date_text != self.date_text {
            self.time_text = time_text;
            self.date_text = date_text;
            self.dirty = true;
        }
    }
}

impl App for ClockApp {
    fn name(&self) -> &str {
        "clock"
    }

    fn on_activate(&mut self, _cx: &mut OsContext) {
        self.refresh();
        self.dirty = true;
    }

    fn on_event(&mut self, event: InputEvent, _cx: &mut OsContext) -> bool {
        match event {
            InputEvent::Up | InputEvent::Down => {
                self.show_date = !self.show_date;
                self.dirty = true;
                true
            }
            _ => false,
        }
    }

    fn on_update(&mut self, _delta: Duration, _cx: &mut OsContext) {
        // Redraws only when the displayed second actually changes.
        self.refresh();
    }

    fn render(&mut self, frame: &mut PixelBuffer) {
        let mid = frame.height() as i32 / 2;
        centered_text(frame, mid - 5, &self.time_text, Rgb::new(0, 255, 255));
        if self.show_date {
            centered_text(frame, mid + 3, &self.date_text, Rgb::new(100, 100, 100));
        }
    }

    fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn clear_dirty(&mut self) {
        self.dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_formats_time() {
        let mut clock = ClockApp::new();
        clock.refresh();
        assert_eq!(clock.time_text.len(), 8);
        assert_eq!(clock.time_text.as_bytes()[2], b':');
        assert!(clock.dirty);
    }
}
