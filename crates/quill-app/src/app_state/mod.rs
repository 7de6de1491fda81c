//! Top-level application state.
//!
//! Coordinates the PTY registry, terminal tabs, the per-tab session bridge,
//! IPC dispatch and graceful shutdown around a cooperative poll loop.

mod bridge;
mod core;
pub mod ipc;
mod router;
mod shutdown;
mod tabs;
mod types;

pub use self::core::QuillApp;
