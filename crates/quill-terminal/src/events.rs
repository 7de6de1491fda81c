//! PTY notifications fanned out to every connected UI surface.
//!
//! The Electron-era design pushed to "all open windows" by enumerating them;
//! here surfaces subscribe explicitly and the registry publishes to the
//! broadcast channel without knowing who is listening.

use quill_common::PtyId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Broadcast capacity. A surface that falls more than this many events
/// behind will observe a lag error and skip ahead.
const BROADCAST_CAPACITY: usize = 256;

/// One notification from the PTY registry, tagged with the handle it
/// concerns. Serialized form matches the wire channels.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "channel", content = "payload")]
pub enum PtyEvent {
    /// Bytes the process wrote to its terminal, in production order.
    #[serde(rename = "terminal:data", rename_all = "camelCase")]
    Output { pty_id: PtyId, data: String },

    /// The process exited (cleanly or not); the handle is already gone.
    #[serde(rename = "terminal:exit", rename_all = "camelCase")]
    Exit {
        pty_id: PtyId,
        exit_code: u32,
        signal: Option<String>,
    },
}

/// Fan-out bus owned by the registry. `publish` is non-blocking and a no-op
/// with zero subscribers.
pub struct PtyEventBus {
    tx: broadcast::Sender<PtyEvent>,
}

impl PtyEventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self { tx }
    }

    /// Push an event to every subscribed surface.
    pub fn publish(&self, event: PtyEvent) {
        let _ = self.tx.send(event);
    }

    /// Register a new UI surface. Dropping the receiver unsubscribes it.
    pub fn subscribe(&self) -> broadcast::Receiver<PtyEvent> {
        self.tx.subscribe()
    }
}

impl Default for PtyEventBus {
    fn default() -> Self {
        Self::new()
    }
}
