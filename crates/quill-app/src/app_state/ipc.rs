//! Wire-level terminal IPC: typed request/response envelopes and dispatch.
//!
//! The envelope shape (`channel` + `payload`) matches what UI surfaces put
//! on the wire. `terminal.create` is the only request with an observable
//! outcome; the rest are fire-and-forget and tolerate stale ids.

use quill_common::PtyId;
use quill_terminal::{CreateOptions, PtyRegistry};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "channel", content = "payload")]
pub enum TerminalRequest {
    #[serde(rename = "terminal.create")]
    Create(CreateOptions),

    #[serde(rename = "terminal.write", rename_all = "camelCase")]
    Write { pty_id: PtyId, data: String },

    #[serde(rename = "terminal.resize", rename_all = "camelCase")]
    Resize { pty_id: PtyId, cols: u16, rows: u16 },

    #[serde(rename = "terminal.destroy", rename_all = "camelCase")]
    Destroy { pty_id: PtyId },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "channel", content = "payload")]
pub enum TerminalResponse {
    #[serde(rename = "terminal.created", rename_all = "camelCase")]
    Created { pty_id: PtyId },

    #[serde(rename = "terminal.error", rename_all = "camelCase")]
    Error { message: String },
}

/// Route one request to the registry. Only `Create` produces a response.
pub fn dispatch(registry: &mut PtyRegistry, request: TerminalRequest) -> Option<TerminalResponse> {
    match request {
        TerminalRequest::Create(options) => Some(match registry.create(options) {
            Ok(pty_id) => TerminalResponse::Created { pty_id },
            Err(e) => {
                tracing::error!(error = %e, "terminal.create failed");
                TerminalResponse::Error {
                    message: e.to_string(),
                }
            }
        }),
        TerminalRequest::Write { pty_id, data } => {
            registry.write(pty_id, &data);
            None
        }
        TerminalRequest::Resize { pty_id, cols, rows } => {
            registry.resize(pty_id, cols, rows);
            None
        }
        TerminalRequest::Destroy { pty_id } => {
            registry.destroy(pty_id);
            None
        }
    }
}
