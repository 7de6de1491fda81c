//! Free port scanning on localhost.

use std::net::TcpListener;

use quill_common::ServerError;

/// Default port range the server launcher scans.
pub const PORT_RANGE_START: u16 = 7001;
pub const PORT_RANGE_END: u16 = 7100;

/// Find the first port in `[start, end]` that can be bound on 127.0.0.1.
///
/// The probe listener is dropped before returning, so the port is free but
/// not reserved. The launcher hands it straight to the server process.
pub fn find_free_port(start: u16, end: u16) -> Result<u16, ServerError> {
    for port in start..=end {
        if TcpListener::bind(("127.0.0.1", port)).is_ok() {
            return Ok(port);
        }
    }
    Err(ServerError::NoFreePort { start, end })
}
