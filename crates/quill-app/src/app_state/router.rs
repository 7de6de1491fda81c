//! Routes registry broadcast events into the owning tab's emulator.

use tokio::sync::broadcast::error::TryRecvError;

use quill_terminal::PtyEvent;

use super::core::QuillApp;
use super::types::BridgePhase;

impl QuillApp {
    /// Drain the event feed. Output lands in the matching tab's emulator;
    /// exit appends a readable notice and detaches the tab. Events whose id
    /// matches no tab (already closed, or another surface's) are dropped.
    pub(super) fn route_pty_events(&mut self) {
        loop {
            match self.events_rx.try_recv() {
                Ok(PtyEvent::Output { pty_id, data }) => {
                    if let Some(tab) =
                        self.tabs.iter_mut().find(|t| t.pty_id == Some(pty_id))
                    {
                        if let Some(emulator) = tab.emulator.as_mut() {
                            emulator.process(data.as_bytes());
                        }
                    }
                }
                Ok(PtyEvent::Exit {
                    pty_id, exit_code, ..
                }) => {
                    if let Some(tab) =
                        self.tabs.iter_mut().find(|t| t.pty_id == Some(pty_id))
                    {
                        if let Some(emulator) = tab.emulator.as_mut() {
                            emulator.feed_line(&format!(
                                "[process exited with code {exit_code}]"
                            ));
                        }
                        tab.pty_id = None;
                        tab.phase = BridgePhase::Detached;
                        tracing::info!(
                            tab = tab.tab_id.0,
                            exit_code,
                            "Terminal session ended"
                        );
                    }
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Tab routing fell behind PTY events");
                }
            }
        }
    }
}
