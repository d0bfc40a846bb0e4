//! Launcher: app tiles in a grid, navigated with the arrows.

use std::time::Duration;

use matrixos::prelude::*;

use super::{Icon, draw_icon};
use crate::util::centered_text;

const TILE_SIZE: i32 = 12;
const TILE_GAP: i32 = 2;

/// One selectable app tile.
pub struct Tile {
    /// Registered app name (the switch target).
    pub name: &'static str,
    /// Short label drawn under the grid for the selection.
    pub label: &'static str,
    pub icon: Icon,
}

impl Tile {
    pub fn new(name: &'static str, label: &'static str, icon: Icon) -> Self {
        Self { name, label, icon }
    }
}

pub struct Launcher {
    tiles: Vec<Tile>,
    selected: usize,
    /// Tiles whose app asked for attention, refreshed every update.
    badges: Vec<bool>,
    /// Last rendered frame width, for navigation geometry.
    frame_width: u16,
    dirty: bool,
}

impl Launcher {
    pub fn new(tiles: Vec<Tile>) -> Self {
        let badges = vec![false; tiles.len()];
        Self {
            tiles,
            selected: 0,
            badges,
            frame_width: 64,
            dirty: true,
        }
    }

    fn columns(&self, frame_width: u16) -> usize {
        let step = (TILE_SIZE + TILE_GAP) as u16;
        ((frame_width.saturating_sub(TILE_GAP as u16)) / step).max(1) as usize
    }

    fn move_selection(&mut self, dx: i32, dy: i32, columns: usize) {
        let count = self.tiles.len() as i32;
        if count == 0 {
            return;
        }
        let columns = columns as i32;
        let next = self.selected as i32 + dx + dy * columns;
        if (0..count).contains(&next) {
            self.selected = next as usize;
            self.dirty = true;
        }
    }
}

impl App for Launcher {
    fn name(&self) -> &str {
        "launcher"
    }

    fn on_activate(&mut self, _cx: &mut OsContext) {
        self.dirty = true;
    }

    fn on_event(&mut self, event: InputEvent, cx: &mut OsContext) -> bool {
        let columns = self.columns(self.frame_width).min(self.tiles.len().max(1));
        match event {
            InputEvent::Left => self.move_selection(-1, 0, columns),
            InputEvent::Right => self.move_selection(1, 0, columns),
            InputEvent::Up => self.move_selection(0, -1, columns),
            InputEvent::Down => self.move_selection(0, 1, columns),
            InputEvent::Ok => {
                if let Some(tile) = self.tiles.get(self.selected) {
                    cx.request_switch(tile.name);
                }
            }
            InputEvent::Back => cx.request_exit(),
            _ => return false,
        }
        true
    }

    fn on_update(&mut self, _delta: Duration, cx: &mut OsContext) {
        for (i, tile) in self.tiles.iter().enumerate() {
            let badge = cx.attention_for(tile.name).is_some();
            if badge != self.badges[i] {
                self.badges[i] = badge;
                self.dirty = true;
            }
        }
    }

    fn render(&mut self, frame: &mut PixelBuffer) {
        self.frame_width = frame.width();
        let columns = self.columns(frame.width()).min(self.tiles.len().max(1));
        for (i, tile) in self.tiles.iter().enumerate() {
            let col = (i % columns) as i32;
            let row = (i / columns) as i32;
            let x = TILE_GAP + col * (TILE_SIZE + TILE_GAP);
            let y = TILE_GAP + row * (TILE_SIZE + TILE_GAP);

            let border = if i == self.selected {
                Rgb::WHITE
            } else {
                Rgb::new(60, 60, 60)
            };
            frame.rect(x, y, TILE_SIZE as u16, TILE_SIZE as u16, border, false);
            draw_icon(frame, &tile.icon, x + 2, y + 2);

            if self.badges[i] {
                frame.set(x + TILE_SIZE - 2, y + 1, Rgb::new(255, 0, 0));
                frame.set(x + TILE_SIZE - 3, y + 1, Rgb::new(255, 0, 0));
            }
        }

        if let Some(tile) = self.tiles.get(self.selected) {
            let y = frame.height() as i32 - 7;
            centered_text(frame, y, tile.label, Rgb::new(0, 255, 255));
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

    fn launcher3() -> Launcher {
        let icon = [[0u8; 8]; 8];
        Launcher::new(vec![
            Tile::new("a", "A", icon),
            Tile::new("b", "B", icon),
            Tile::new("c", "C", icon),
        ])
    }

    #[test]
    fn test_selection_stays_in_bounds() {
        let mut launcher = launcher3();
        launcher.move_selection(-1, 0, 4);
        assert_eq!(launcher.selected, 0);
        launcher.move_selection(1, 0, 4);
        launcher.move_selection(1, 0, 4);
        launcher.move_selection(1, 0, 4);
        assert_eq!(launcher.selected, 2);
    }
}
