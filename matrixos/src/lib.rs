//! MatrixOS core: background task scheduler, frame pump, and app
//! lifecycle.
//!
//! The shell drives a fixed-tick loop on the main thread. Each tick it
//! drains completed background tasks (invoking their callbacks), hands
//! at most one input event to the active app, updates the active app at
//! full rate, background-ticks every other registered app, and renders
//! the active app when it is dirty. Worker threads only ever execute
//! task bodies; everything an app can observe happens on the main
//! thread.

pub mod app;
pub mod context;
pub mod error;
pub mod input;
pub mod prelude;
pub mod shell;
pub mod tasks;

pub use app::{App, AttentionPriority};
pub use context::OsContext;
pub use error::ShellError;
pub use input::InputEvent;
pub use shell::{Shell, TickReport};
pub use tasks::{TaskError, TaskId, TaskManager, TaskResult};
