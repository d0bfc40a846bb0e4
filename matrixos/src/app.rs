//! The app lifecycle contract.

use std::time::Duration;

use ledgrid::PixelBuffer;

use crate::context::OsContext;
use crate::input::InputEvent;

/// Priority of an attention request from a background app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AttentionPriority {
    Normal,
    Urgent,
}

/// Trait every app implements. All hooks have safe no-op defaults, so a
/// concrete app overrides only what it needs.
///
/// Exactly one registered app is *active* at a time: it receives input,
/// a full-rate [`App::on_update`] each tick, and is rendered when dirty.
/// Every other registered app gets [`App::on_background_tick`] instead,
/// a deliberately timing-free hook for "is it time to refresh yet"
/// logic; apps track their own last-refresh timestamps.
///
/// All hooks run on the main thread, serialized with the frame pump.
/// Long-running work goes through [`OsContext::schedule_task`]; the
/// completion callback runs back on the main thread.
pub trait App {
    /// Diagnostic name, also used as the switch target.
    fn name(&self) -> &str;

    /// Called when this app becomes the active app. The shell forces at
    /// least one render afterwards, so the app is guaranteed to draw
    /// itself upon becoming visible.
    fn on_activate(&mut self, cx: &mut OsContext) {
        let _ = cx;
    }

    /// Called when this app stops being active. Must not block.
    fn on_deactivate(&mut self, cx: &mut OsContext) {
        let _ = cx;
    }

    /// Handle one input event. Return true if the event was consumed.
    fn on_event(&mut self, event: InputEvent, cx: &mut OsContext) -> bool {
        let _ = (event, cx);
        false
    }

    /// Per-frame update while active, with the wall-clock time elapsed
    /// since the previous tick.
    fn on_update(&mut self, delta: Duration, cx: &mut OsContext) {
        let _ = (delta, cx);
    }

    /// Per-tick update while *not* active. No delta argument on purpose.
    fn on_background_tick(&mut self, cx: &mut OsContext) {
        let _ = cx;
    }

    /// Draw the current state into `frame`. The shell clears the frame
    /// first and calls [`App::clear_dirty`] afterwards.
    fn render(&mut self, frame: &mut PixelBuffer) {
        let _ = frame;
    }

    /// Whether the app needs a redraw. Default: always re-render
    /// (conservative).
    fn is_dirty(&self) -> bool {
        true
    }

    /// Clear dirty flags after render.
    fn clear_dirty(&mut self) {}
}
