//! The PTY registry: sole owner of all pseudo-terminal process handles.
//!
//! Constructed once at host startup and passed by reference to whatever
//! dispatches IPC requests; deliberately a plain value, not a global.
//! All operations run on the host's single event loop, so the handle map
//! is never touched concurrently.

use std::collections::HashMap;
use std::path::PathBuf;

use quill_common::{PtyId, TerminalError};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::events::{PtyEvent, PtyEventBus};
use crate::handle::PtyHandle;
use crate::shell;

/// Default terminal columns.
pub const DEFAULT_COLS: u16 = 80;

/// Default terminal rows.
pub const DEFAULT_ROWS: u16 = 24;

/// Options for `terminal.create`. Every field is optional; the registry
/// resolves defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateOptions {
    pub working_directory: Option<PathBuf>,
    pub shell: Option<String>,
    pub cols: Option<u16>,
    pub rows: Option<u16>,
}

/// Owns every live PTY handle, keyed by [`PtyId`].
///
/// Only `create` can fail observably. `write`, `resize` and `destroy` are
/// silently tolerant of unknown ids: terminal I/O is inherently racy against
/// process exit and UI teardown, and surfacing every such race would be
/// noise.
pub struct PtyRegistry {
    handles: HashMap<PtyId, PtyHandle>,
    events: PtyEventBus,
}

impl PtyRegistry {
    pub fn new() -> Self {
        Self {
            handles: HashMap::new(),
            events: PtyEventBus::new(),
        }
    }

    /// Register a UI surface for `terminal:data` / `terminal:exit` fan-out.
    pub fn subscribe(&self) -> broadcast::Receiver<PtyEvent> {
        self.events.subscribe()
    }

    /// Spawn a new shell in a PTY and return its fresh id.
    ///
    /// Shell and working directory are resolved permissively (see
    /// [`shell::resolve_cwd`]); cols/rows are clamped to at least 1 and
    /// default to 80x24. Spawn failure is the only propagated error; the
    /// registry never retries.
    pub fn create(&mut self, options: CreateOptions) -> Result<PtyId, TerminalError> {
        let shell_cmd = options.shell.unwrap_or_else(shell::default_shell);
        let cwd = shell::resolve_cwd(options.working_directory.as_deref());
        let cols = options.cols.unwrap_or(DEFAULT_COLS).max(1);
        let rows = options.rows.unwrap_or(DEFAULT_ROWS).max(1);

        tracing::info!(
            shell = %shell_cmd,
            cwd = %cwd.display(),
            cols,
            rows,
            "Creating PTY"
        );

        let handle = PtyHandle::spawn(&shell_cmd, cwd, cols, rows).map_err(|e| {
            tracing::error!("Failed to spawn PTY: {e}");
            e
        })?;

        let id = PtyId::new();
        self.handles.insert(id, handle);
        Ok(id)
    }

    /// Forward raw bytes to the process's input stream verbatim.
    /// No-op if `id` is unknown (already exited or never existed).
    pub fn write(&mut self, id: PtyId, data: &str) {
        if let Some(handle) = self.handles.get_mut(&id) {
            if let Err(e) = handle.write_input(data.as_bytes()) {
                tracing::warn!(pty_id = %id, error = %e, "PTY write failed");
            }
        }
    }

    /// Update the process's terminal dimensions. No-op if `id` is unknown;
    /// dimensions are passed through unclamped.
    pub fn resize(&mut self, id: PtyId, cols: u16, rows: u16) {
        if let Some(handle) = self.handles.get(&id) {
            handle.resize(cols, rows);
            tracing::debug!(pty_id = %id, cols, rows, "PTY resized");
        }
    }

    /// Kill the process and forget the handle immediately, without waiting
    /// for its exit event: a destroyed id can never produce a second
    /// notification. Idempotent: unknown ids are ignored.
    pub fn destroy(&mut self, id: PtyId) {
        if let Some(mut handle) = self.handles.remove(&id) {
            handle.kill();
            tracing::info!(pty_id = %id, "PTY destroyed");
        }
    }

    /// Shutdown sweep: destroy every registered handle. Safe on an empty
    /// registry.
    pub fn destroy_all(&mut self) {
        let ids: Vec<PtyId> = self.handles.keys().copied().collect();
        let count = ids.len();
        for id in ids {
            self.destroy(id);
        }
        if count > 0 {
            tracing::info!(count, "All PTYs destroyed");
        }
    }

    /// Event-loop tick: drain pending output from every handle and publish
    /// it, then reap exited children and publish their exit events.
    ///
    /// Output for a given id is published in production order. An id removed
    /// by `destroy` is gone before this runs again, so late exits for it are
    /// never emitted.
    pub fn pump(&mut self) {
        let ids: Vec<PtyId> = self.handles.keys().copied().collect();

        for id in &ids {
            let Some(handle) = self.handles.get_mut(id) else {
                continue;
            };
            let output = handle.drain_output();
            if !output.is_empty() {
                self.events.publish(PtyEvent::Output {
                    pty_id: *id,
                    data: String::from_utf8_lossy(&output).into_owned(),
                });
            }
        }

        for id in ids {
            let finished = self
                .handles
                .get(&id)
                .is_some_and(|handle| handle.is_finished());
            if !finished {
                continue;
            }
            tracing::info!(pty_id = %id, "PTY process exited");
            let mut handle = self.handles.remove(&id).expect("checked above");
            let exit_code = handle.wait_exit_code().unwrap_or(0);
            self.events.publish(PtyEvent::Exit {
                pty_id: id,
                exit_code,
                signal: None,
            });
        }
    }

    /// Whether `id` currently maps to a live handle.
    pub fn contains(&self, id: PtyId) -> bool {
        self.handles.contains_key(&id)
    }

    /// Number of live handles.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

impl Default for PtyRegistry {
    fn default() -> Self {
        Self::new()
    }
}
