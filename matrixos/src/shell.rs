//! The shell: app registry, lifecycle switching, and the frame pump.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use ledgrid::{PixelBuffer, Terminal};
use log::{debug, error, info, warn};

use crate::app::App;
use crate::context::{OsContext, ShellRequest};
use crate::error::{ShellError, extract_panic_message};
use crate::input::{InputEvent, TermEvent, convert_event};
use crate::tasks::TaskManager;

/// Default frame rate of the run loop.
pub const DEFAULT_FPS: u32 = 60;

/// How long each tick waits for one input event. Short, so the loop
/// never truly blocks.
const POLL_TIMEOUT: Duration = Duration::from_millis(2);

struct AppEntry {
    app: Box<dyn App>,
    active: bool,
    /// Render at least once after activation, regardless of `is_dirty`.
    force_render: bool,
}

/// What one tick did; used by tests and the run loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    /// Completed tasks drained this tick.
    pub completed_tasks: usize,
    /// Whether the active app was rendered into the frame.
    pub rendered: bool,
    /// Whether the delivered event was consumed.
    pub event_consumed: bool,
}

/// The MatrixOS shell.
///
/// Owns the registered apps, the task manager, and the frame buffer.
/// [`Shell::tick`] is the per-frame algorithm and is terminal-free so
/// tests can drive it headless; [`Shell::run`] wraps it in the
/// fixed-tick loop against a real [`Terminal`].
pub struct Shell {
    entries: Vec<AppEntry>,
    active: Option<usize>,
    home: Option<usize>,
    frame: PixelBuffer,
    cx: OsContext,
    tasks: Arc<TaskManager>,
    frame_interval: Duration,
    /// No app receives any hook before the first switch.
    switched_once: bool,
    exit: bool,
}

impl Shell {
    /// Create a shell with a matrix of the given size and a default
    /// two-worker task manager.
    pub fn new(width: u16, height: u16) -> Self {
        Self::with_task_manager(width, height, TaskManager::default())
    }

    /// Create a shell around an explicit task manager (test isolation).
    pub fn with_task_manager(width: u16, height: u16, tasks: TaskManager) -> Self {
        let tasks = Arc::new(tasks);
        Self {
            entries: Vec::new(),
            active: None,
            home: None,
            frame: PixelBuffer::new(width, height),
            cx: OsContext::new(Arc::clone(&tasks)),
            tasks,
            frame_interval: Duration::from_secs(1) / DEFAULT_FPS,
            switched_once: false,
            exit: false,
        }
    }

    pub fn set_frame_rate(&mut self, fps: u32) {
        self.frame_interval = Duration::from_secs(1) / fps.max(1);
    }

    /// Register an app in background state. It receives no ticks at all
    /// until the first switch has happened. Returns the app's slot.
    pub fn register<A: App + 'static>(&mut self, app: A) -> usize {
        let name = app.name().to_string();
        self.entries.push(AppEntry {
            app: Box::new(app),
            active: false,
            force_render: false,
        });
        let slot = self.entries.len() - 1;
        debug!("registered app '{name}' in slot {slot}");
        slot
    }

    /// Mark the app an unconsumed `Home` event switches to.
    pub fn set_home(&mut self, slot: usize) {
        self.home = Some(slot);
    }

    pub fn active_slot(&self) -> Option<usize> {
        self.active
    }

    pub fn active_name(&self) -> Option<&str> {
        self.active.map(|i| self.entries[i].app.name())
    }

    /// The frame buffer the active app last rendered into.
    pub fn frame(&self) -> &PixelBuffer {
        &self.frame
    }

    pub fn exit_requested(&self) -> bool {
        self.exit
    }

    /// Hooks reach the context through their `cx` argument; tests reach
    /// it here.
    pub fn context(&self) -> &OsContext {
        &self.cx
    }

    /// Make the app in `slot` the active app.
    ///
    /// Deactivation of the old app strictly precedes activation of the
    /// new one, and a switch to the already-active app repeats the
    /// deactivate-then-activate pair on the same object. The frame is
    /// cleared as a transition side effect, and the new app is forced to
    /// render at least once.
    ///
    /// A panicking activation hook is a fatal startup error for that
    /// app: it is logged and the shell is left with no active app.
    pub fn switch_to(&mut self, slot: usize) {
        if slot >= self.entries.len() {
            warn!("switch_to: slot {slot} out of range");
            return;
        }
        self.switched_once = true;

        if let Some(old) = self.active {
            let entry = &mut self.entries[old];
            entry.active = false;
            let name = entry.app.name().to_string();
            self.cx.set_current_app(Some(&name));
            guard_hook(&name, "on_deactivate", || {
                entry.app.on_deactivate(&mut self.cx)
            });
        }

        self.active = Some(slot);
        let entry = &mut self.entries[slot];
        entry.active = true;
        let name = entry.app.name().to_string();
        info!("switching to app '{name}'");
        self.cx.set_current_app(Some(&name));
        self.cx.clear_attention(&name);
        let activated = guard_hook(&name, "on_activate", || {
            entry.app.on_activate(&mut self.cx)
        });
        if activated {
            entry.force_render = true;
        } else {
            // Partially initialized app; do not keep it active.
            error!("app '{name}' failed to activate, no app is active");
            entry.active = false;
            self.active = None;
        }

        self.frame.clear();
        self.cx.set_current_app(None);
    }

    /// Switch by app name (first registered match).
    pub fn switch_to_named(&mut self, name: &str) -> Result<(), ShellError> {
        match self.entries.iter().position(|e| e.app.name() == name) {
            Some(slot) => {
                self.switch_to(slot);
                Ok(())
            }
            None => Err(ShellError::UnknownApp(name.to_string())),
        }
    }

    /// One frame tick.
    ///
    /// In order: drain task completions (always, active app or not),
    /// deliver at most one input event to the active app, update the
    /// active app with `delta`, background-tick every other registered
    /// app, act on queued shell requests, then render the active app if
    /// it is dirty. Every per-app hook is isolated: a panicking app is
    /// logged and the loop carries on.
    pub fn tick(&mut self, event: Option<InputEvent>, delta: Duration) -> TickReport {
        let completed_tasks = self.tasks.process_completed();

        let mut event_consumed = false;
        if let (Some(ev), Some(idx)) = (event, self.active) {
            let entry = &mut self.entries[idx];
            let name = entry.app.name().to_string();
            self.cx.set_current_app(Some(&name));
            let mut consumed = false;
            guard_hook(&name, "on_event", || {
                consumed = entry.app.on_event(ev, &mut self.cx);
            });
            event_consumed = consumed;

            // The shell itself handles an unconsumed Home: back to the
            // home app from anywhere.
            if !event_consumed && ev == InputEvent::Home {
                if let Some(home) = self.home {
                    if Some(home) != self.active {
                        self.switch_to(home);
                    }
                    event_consumed = true;
                }
            }
        }

        if let Some(idx) = self.active {
            let entry = &mut self.entries[idx];
            let name = entry.app.name().to_string();
            self.cx.set_current_app(Some(&name));
            guard_hook(&name, "on_update", || {
                entry.app.on_update(delta, &mut self.cx)
            });
        }

        for idx in 0..self.entries.len() {
            if !self.switched_once || Some(idx) == self.active {
                continue;
            }
            let entry = &mut self.entries[idx];
            let name = entry.app.name().to_string();
            self.cx.set_current_app(Some(&name));
            guard_hook(&name, "on_background_tick", || {
                entry.app.on_background_tick(&mut self.cx)
            });
        }
        self.cx.set_current_app(None);

        self.handle_requests();

        let mut rendered = false;
        if let Some(idx) = self.active {
            let entry = &mut self.entries[idx];
            if entry.force_render || entry.app.is_dirty() {
                self.frame.clear();
                let name = entry.app.name().to_string();
                guard_hook(&name, "render", || entry.app.render(&mut self.frame));
                entry.app.clear_dirty();
                entry.force_render = false;
                rendered = true;
            }
        }

        TickReport {
            completed_tasks,
            rendered,
            event_consumed,
        }
    }

    fn handle_requests(&mut self) {
        for request in self.cx.take_requests() {
            match request {
                ShellRequest::Switch(name) => {
                    if let Err(e) = self.switch_to_named(&name) {
                        warn!("switch request ignored: {e}");
                    }
                }
                ShellRequest::Exit => {
                    info!("exit requested");
                    self.exit = true;
                }
            }
        }
    }

    /// Run the fixed-tick loop against a terminal until exit.
    pub fn run(&mut self, terminal: &mut Terminal) -> Result<(), ShellError> {
        let mut last_tick = Instant::now();
        while !self.exit {
            let tick_start = Instant::now();

            let event = match terminal.poll(POLL_TIMEOUT)? {
                Some(raw) => match convert_event(raw) {
                    Some(TermEvent::Input(input)) => Some(input),
                    Some(TermEvent::Quit) => {
                        self.exit = true;
                        None
                    }
                    Some(TermEvent::Resize) => {
                        terminal.invalidate();
                        None
                    }
                    None => None,
                },
                None => None,
            };

            let delta = tick_start.duration_since(last_tick);
            last_tick = tick_start;

            let report = self.tick(event, delta);
            if report.rendered {
                terminal.present(&self.frame)?;
            }

            // Saturating: a long tick just starts the next one
            // immediately.
            let elapsed = tick_start.elapsed();
            if elapsed < self.frame_interval {
                thread::sleep(self.frame_interval - elapsed);
            }
        }

        self.tasks.stop();
        Ok(())
    }
}

/// Run one app hook with panic isolation. Returns false if it panicked.
fn guard_hook(app_name: &str, hook_name: &str, hook: impl FnOnce()) -> bool {
    match panic::catch_unwind(AssertUnwindSafe(hook)) {
        Ok(()) => true,
        Err(payload) => {
            error!(
                "app '{app_name}' hook '{hook_name}' panicked: {}",
                extract_panic_message(&payload)
            );
            false
        }
    }
}
