//! Backend server launcher.
//!
//! Spawns the agent CLI in server mode on a free localhost port, waits for
//! it to accept TCP connections, and hands back a websocket URL plus a
//! handle that kills the process on shutdown.

pub mod launcher;
pub mod ports;

pub use launcher::{launch_server, ServerConfig, ServerInstance};
pub use ports::find_free_port;
