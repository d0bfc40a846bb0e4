//! Input events: converting crossterm events to logical matrix keys.

use crossterm::event::{
    Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
};
use log::trace;

/// A logical input key delivered to the active app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputEvent {
    Up,
    Down,
    Left,
    Right,
    /// Confirm / launch (Enter).
    Ok,
    /// Primary action (Space).
    Action,
    /// Back out (Escape).
    Back,
    /// Return to the home app.
    Home,
    /// Show help (Tab).
    Help,
    /// Any other printable character.
    Char(char),
}

/// Shell-level event produced from a terminal event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermEvent {
    Input(InputEvent),
    /// Ctrl+C, quits the shell.
    Quit,
    /// Terminal resized; the display needs a full repaint.
    Resize,
}

fn convert_key_event(event: KeyEvent) -> Option<InputEvent> {
    match event.code {
        KeyCode::Up => Some(InputEvent::Up),
        KeyCode::Down => Some(InputEvent::Down),
        KeyCode::Left => Some(InputEvent::Left),
        KeyCode::Right => Some(InputEvent::Right),
        KeyCode::Enter => Some(InputEvent::Ok),
        KeyCode::Esc => Some(InputEvent::Back),
        KeyCode::Home => Some(InputEvent::Home),
        KeyCode::Tab => Some(InputEvent::Help),
        KeyCode::Char(' ') => Some(InputEvent::Action),
        KeyCode::Char(c) => Some(InputEvent::Char(c)),
        _ => None,
    }
}

/// Convert a crossterm event. Returns `None` for events the shell
/// ignores (key releases, mouse, focus changes).
pub fn convert_event(event: CrosstermEvent) -> Option<TermEvent> {
    match event {
        CrosstermEvent::Key(key_event) => {
            trace!(
                "key event: code={:?}, modifiers={:?}, kind={:?}",
                key_event.code, key_event.modifiers, key_event.kind
            );

            // Only key presses, not releases or repeats.
            if key_event.kind != KeyEventKind::Press {
                return None;
            }

            if key_event.modifiers.contains(KeyModifiers::CONTROL)
                && key_event.code == KeyCode::Char('c')
            {
                return Some(TermEvent::Quit);
            }

            convert_key_event(key_event).map(TermEvent::Input)
        }
        CrosstermEvent::Resize(..) => Some(TermEvent::Resize),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEvent, KeyEventKind};

    fn press(code: KeyCode) -> CrosstermEvent {
        CrosstermEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_named_keys_map() {
        assert_eq!(
            convert_event(press(KeyCode::Up)),
            Some(TermEvent::Input(InputEvent::Up))
        );
        assert_eq!(
            convert_event(press(KeyCode::Enter)),
            Some(TermEvent::Input(InputEvent::Ok))
        );
        assert_eq!(
            convert_event(press(KeyCode::Char(' '))),
            Some(TermEvent::Input(InputEvent::Action))
        );
        assert_eq!(
            convert_event(press(KeyCode::Char('r'))),
            Some(TermEvent::Input(InputEvent::Char('r')))
        );
    }

    #[test]
    fn test_ctrl_c_quits() {
        let event = CrosstermEvent::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(convert_event(event), Some(TermEvent::Quit));
    }

    #[test]
    fn test_release_ignored() {
        let mut key = KeyEvent::new(KeyCode::Up, KeyModifiers::NONE);
        key.kind = KeyEventKind::Release;
        assert_eq!(convert_event(CrosstermEvent::Key(key)), None);
    }
}
