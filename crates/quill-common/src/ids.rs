//! Identifier newtypes shared between the PTY registry and the UI layer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier for a live pseudo-terminal handle.
///
/// Generated once at creation, stable for the handle's lifetime, never
/// reused: every `create` yields a fresh UUID v4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PtyId(uuid::Uuid);

impl PtyId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for PtyId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PtyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// UI-local identifier for a terminal tab, independent of any [`PtyId`]
/// the tab may later be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TabId(pub u32);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
