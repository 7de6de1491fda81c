//! Per-tab state for the terminal session bridge.

use std::time::Instant;

use quill_common::{PtyId, TabId};
use quill_terminal::Emulator;

/// Lifecycle of a tab's PTY session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum BridgePhase {
    /// Nothing provisioned yet.
    Uninitialized,
    /// Waiting for the container to report a size, or create in flight.
    Initializing,
    /// PTY live, emulator attached.
    Ready,
    /// The process exited; the emulator is kept so scrollback survives.
    Detached,
}

/// A resize waiting out the debounce window.
pub(super) struct PendingResize {
    pub(super) width: f32,
    pub(super) height: f32,
    pub(super) requested_at: Instant,
}

/// One terminal tab. The PTY and emulator are provisioned lazily once the
/// tab's container reports a measurable size.
pub(super) struct TerminalTab {
    pub(super) tab_id: TabId,
    pub(super) display_name: String,
    pub(super) phase: BridgePhase,
    pub(super) pty_id: Option<PtyId>,
    pub(super) emulator: Option<Emulator>,
    /// Bumped whenever the tab's session is torn down or re-initialized.
    /// A create completing against an older value is stale.
    pub(super) generation: u64,
    pub(super) init_attempts: u32,
    /// Guard flag: a create ticket has been issued and not yet completed.
    pub(super) init_in_flight: bool,
    pub(super) pending_resize: Option<PendingResize>,
}

impl TerminalTab {
    pub(super) fn new(tab_id: TabId, display_name: String) -> Self {
        Self {
            tab_id,
            display_name,
            phase: BridgePhase::Uninitialized,
            pty_id: None,
            emulator: None,
            generation: 0,
            init_attempts: 0,
            init_in_flight: false,
            pending_resize: None,
        }
    }
}
