//! Per-tab session bridge: container polling, PTY provisioning, debounced
//! resize.
//!
//! Provisioning is split into a ticket (captured tab generation and fitted
//! geometry) and a completion step. A tab closed or re-initialized while its
//! create was in flight fails the generation check, and the orphan PTY is
//! destroyed instead of adopted.

use std::time::{Duration, Instant};

use quill_common::TabId;
use quill_terminal::{CreateOptions, Emulator};

use super::core::QuillApp;
use super::ipc::{self, TerminalRequest, TerminalResponse};
use super::types::{BridgePhase, PendingResize};

/// Give up on a container that never becomes measurable after this many
/// polls (~50ms apart).
pub(super) const MAX_INIT_ATTEMPTS: u32 = 40;

/// How long a resize request sits before it is applied.
pub(super) const RESIZE_DEBOUNCE: Duration = Duration::from_millis(50);

/// Captured state for an in-flight PTY creation.
#[derive(Debug, Clone, Copy)]
pub(super) struct InitTicket {
    pub(super) tab_id: TabId,
    pub(super) generation: u64,
    pub(super) cols: u16,
    pub(super) rows: u16,
}

impl QuillApp {
    /// One poll of a tab's container. Returns a ticket once the container
    /// has a measurable size; `None` while still waiting, after giving up,
    /// or when the tab is already past initialization.
    pub(super) fn poll_init(
        &mut self,
        tab_id: TabId,
        container: Option<(f32, f32)>,
    ) -> Option<InitTicket> {
        let metrics = self.metrics;
        let tab = self.find_tab_mut(tab_id)?;

        match tab.phase {
            BridgePhase::Uninitialized => {
                tab.phase = BridgePhase::Initializing;
                tab.init_attempts = 0;
            }
            // Only one create may be in flight per tab, however rapidly
            // activation toggles.
            BridgePhase::Initializing if tab.init_in_flight => return None,
            BridgePhase::Initializing => {}
            // Ready tabs refit on activation; they never re-create.
            _ => return None,
        }

        let Some((width, height)) = container else {
            tab.init_attempts += 1;
            if tab.init_attempts >= MAX_INIT_ATTEMPTS {
                tracing::error!(
                    tab = tab.tab_id.0,
                    attempts = tab.init_attempts,
                    "Terminal container never became measurable, giving up"
                );
                tab.generation += 1;
                tab.phase = BridgePhase::Uninitialized;
                tab.init_attempts = 0;
                // Same inline surfacing as a spawn failure. The container
                // was never measured, so the notice pane uses the default
                // geometry.
                tab.emulator
                    .get_or_insert_with(|| {
                        Emulator::new(
                            quill_terminal::registry::DEFAULT_COLS,
                            quill_terminal::registry::DEFAULT_ROWS,
                        )
                    })
                    .feed_line("failed to create terminal: container never became ready");
            }
            return None;
        };

        let (cols, rows) = metrics.fit(width, height);
        tab.init_in_flight = true;
        Some(InitTicket {
            tab_id,
            generation: tab.generation,
            cols,
            rows,
        })
    }

    /// Create the PTY for a ticket and attach it to its tab, unless the tab
    /// was torn down while the create was in flight.
    pub(super) fn complete_init(&mut self, ticket: InitTicket) {
        let options = CreateOptions {
            shell: self.default_shell.clone(),
            working_directory: self.store.active_repo.clone().map(Into::into),
            cols: Some(ticket.cols),
            rows: Some(ticket.rows),
        };

        match ipc::dispatch(&mut self.ptys, TerminalRequest::Create(options)) {
            Some(TerminalResponse::Created { pty_id }) => {
                let fresh = matches!(
                    self.find_tab_mut(ticket.tab_id),
                    Some(tab) if tab.generation == ticket.generation
                );
                if !fresh {
                    tracing::info!(
                        pty_id = %pty_id,
                        "Tab closed during PTY creation, destroying orphan"
                    );
                    self.ptys.destroy(pty_id);
                    return;
                }
                if let Some(tab) = self.find_tab_mut(ticket.tab_id) {
                    tab.pty_id = Some(pty_id);
                    tab.emulator = Some(Emulator::new(ticket.cols, ticket.rows));
                    tab.phase = BridgePhase::Ready;
                    tab.init_attempts = 0;
                    tab.init_in_flight = false;
                    tracing::info!(
                        tab = ticket.tab_id.0,
                        pty_id = %pty_id,
                        cols = ticket.cols,
                        rows = ticket.rows,
                        "Terminal session ready"
                    );
                }
            }
            Some(TerminalResponse::Error { message }) => {
                tracing::error!(
                    tab = ticket.tab_id.0,
                    error = %message,
                    "Terminal session creation failed"
                );
                if let Some(tab) = self.find_tab_mut(ticket.tab_id) {
                    tab.generation += 1;
                    tab.phase = BridgePhase::Uninitialized;
                    tab.init_in_flight = false;
                    // Failure notice shows inline in the pane, like any
                    // other terminal output.
                    tab.emulator
                        .get_or_insert_with(|| Emulator::new(ticket.cols, ticket.rows))
                        .feed_line(&message);
                }
            }
            None => {}
        }
    }

    /// Drive one tab through a full init step: poll, then create.
    pub(super) fn drive_init(&mut self, tab_id: TabId, container: Option<(f32, f32)>) {
        if let Some(ticket) = self.poll_init(tab_id, container) {
            self.complete_init(ticket);
        }
    }

    /// Record a resize request, applied once the debounce window elapses.
    /// Ignored before the session is ready.
    pub(super) fn request_resize(&mut self, tab_id: TabId, width: f32, height: f32) {
        if let Some(tab) = self.find_tab_mut(tab_id) {
            if tab.phase != BridgePhase::Ready {
                return;
            }
            tab.pending_resize = Some(PendingResize {
                width,
                height,
                requested_at: Instant::now(),
            });
        }
    }

    /// Apply debounced resizes whose hold time has elapsed. Rapid requests
    /// overwrite each other, so only the latest geometry reaches the PTY.
    pub(super) fn flush_pending_resizes(&mut self) {
        let metrics = self.metrics;
        let mut resizes = Vec::new();

        for tab in &mut self.tabs {
            if tab.phase != BridgePhase::Ready {
                continue;
            }
            let due = match tab.pending_resize.as_ref() {
                Some(p) => p.requested_at.elapsed() >= RESIZE_DEBOUNCE,
                None => false,
            };
            if !due {
                continue;
            }
            if let Some(pending) = tab.pending_resize.take() {
                let (cols, rows) = metrics.fit(pending.width, pending.height);
                if let Some(emulator) = tab.emulator.as_mut() {
                    if emulator.cols() == cols && emulator.rows() == rows {
                        continue;
                    }
                    emulator.resize(cols, rows);
                }
                if let Some(pty_id) = tab.pty_id {
                    resizes.push((pty_id, cols, rows));
                }
            }
        }

        for (pty_id, cols, rows) in resizes {
            self.ptys.resize(pty_id, cols, rows);
        }
    }
}
