//! Persisted UI state schema.
//!
//! One JSON document, written atomically. Every field defaults so blobs
//! written by older versions still load.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowBounds {
    pub width: u32,
    pub height: u32,
}

impl Default for WindowBounds {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 800,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoreState {
    pub window: WindowBounds,
    /// User-facing labels of the open terminal tabs ("Terminal 1", ...).
    pub terminal_tabs: Vec<String>,
    /// Index into `terminal_tabs` of the active tab, if any.
    pub active_tab: Option<usize>,
    /// Repository path the user last had open.
    pub active_repo: Option<String>,
}
