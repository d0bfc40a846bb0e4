//! Convenience re-exports for app crates.

pub use ledgrid::{PixelBuffer, Rgb};

pub use crate::app::{App, AttentionPriority};
pub use crate::context::OsContext;
pub use crate::input::InputEvent;
pub use crate::shell::Shell;
pub use crate::tasks::{TaskError, TaskId, TaskResult};
