//! Host context handed to every app hook.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use log::info;

use crate::app::AttentionPriority;
use crate::tasks::{TaskError, TaskId, TaskManager, TaskResult};

/// A request queued by an app for the shell to act on after the hook
/// returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellRequest {
    /// Switch the active app to the named one.
    Switch(String),
    /// Exit the run loop.
    Exit,
}

/// The shell-facing surface available inside app hooks.
///
/// Wraps the shared [`TaskManager`] and collects requests (switch, exit,
/// attention) that the shell consumes once the hook has returned;
/// hooks never re-enter the shell directly.
pub struct OsContext {
    tasks: Arc<TaskManager>,
    current_app: Option<String>,
    requests: Vec<ShellRequest>,
    attention: HashMap<String, AttentionPriority>,
}

impl OsContext {
    pub(crate) fn new(tasks: Arc<TaskManager>) -> Self {
        Self {
            tasks,
            current_app: None,
            requests: Vec::new(),
            attention: HashMap::new(),
        }
    }

    /// Schedule background work with a completion callback.
    ///
    /// The owner name recorded for diagnostics is the app the hook
    /// belongs to. See [`TaskManager::schedule`] for the contract.
    pub fn schedule_task<T, F, C>(&self, func: F, callback: C) -> TaskId
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T, TaskError> + Send + 'static,
        C: FnOnce(TaskResult) + Send + 'static,
    {
        self.tasks.schedule(func, callback, self.owner_name())
    }

    /// Schedule background work whose outcome is discarded.
    pub fn schedule_detached<T, F>(&self, func: F) -> TaskId
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T, TaskError> + Send + 'static,
    {
        self.tasks.schedule_detached(func, self.owner_name())
    }

    /// Best-effort cancellation; see [`TaskManager::cancel`].
    pub fn cancel_task(&self, id: TaskId) -> bool {
        self.tasks.cancel(id)
    }

    /// Monotonic clock read for app-level refresh timing. The scheduler
    /// has no timer facility on purpose; apps compare against their own
    /// stored instants.
    pub fn now(&self) -> Instant {
        Instant::now()
    }

    /// The shared task manager, for direct access.
    pub fn tasks(&self) -> &TaskManager {
        &self.tasks
    }

    /// Ask the shell to foreground the named app.
    pub fn request_switch(&mut self, name: impl Into<String>) {
        self.requests.push(ShellRequest::Switch(name.into()));
    }

    /// Ask the shell to exit its run loop.
    pub fn request_exit(&mut self) {
        self.requests.push(ShellRequest::Exit);
    }

    /// Advisory request to be noticed while backgrounded. The shell logs
    /// it and records it; the launcher shows a badge until the app is
    /// next activated. It never forces a switch.
    pub fn request_attention(&mut self, priority: AttentionPriority) {
        let name = self.owner_name();
        info!("app '{name}' requests attention ({priority:?})");
        let entry = self.attention.entry(name).or_insert(priority);
        *entry = (*entry).max(priority);
    }

    /// Pending attention priority for the named app, if any.
    pub fn attention_for(&self, name: &str) -> Option<AttentionPriority> {
        self.attention.get(name).copied()
    }

    fn owner_name(&self) -> String {
        self.current_app.clone().unwrap_or_else(|| "Unknown".to_string())
    }

    pub(crate) fn set_current_app(&mut self, name: Option<&str>) {
        self.current_app = name.map(str::to_string);
    }

    pub(crate) fn clear_attention(&mut self, name: &str) {
        self.attention.remove(name);
    }

    pub(crate) fn take_requests(&mut self) -> Vec<ShellRequest> {
        std::mem::take(&mut self.requests)
    }
}
