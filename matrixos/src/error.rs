//! Error types for the shell runtime.

use std::any::Any;

use thiserror::Error;

/// Error from the shell's run loop.
#[derive(Debug, Error)]
pub enum ShellError {
    /// Terminal I/O failed.
    #[error("terminal I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A switch targeted an app name that is not registered.
    #[error("no registered app named '{0}'")]
    UnknownApp(String),
}

/// Extract a human-readable message from a panic payload.
///
/// Panics carry either `&str` or `String` payloads; anything else falls
/// back to a generic message.
pub fn extract_panic_message(panic: &Box<dyn Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_panic_message_str() {
        let panic: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(extract_panic_message(&panic), "boom");
    }

    #[test]
    fn test_extract_panic_message_string() {
        let panic: Box<dyn Any + Send> = Box::new(String::from("boom"));
        assert_eq!(extract_panic_message(&panic), "boom");
    }

    #[test]
    fn test_extract_panic_message_unknown() {
        let panic: Box<dyn Any + Send> = Box::new(7i32);
        assert_eq!(extract_panic_message(&panic), "Unknown panic");
    }
}
