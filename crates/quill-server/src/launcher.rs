//! Spawn the agent server and wait for TCP readiness.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use quill_common::ServerError;
use tokio::net::TcpStream;
use tokio::process::{Child, Command};
use tokio::time::Instant;

use crate::ports::{find_free_port, PORT_RANGE_END, PORT_RANGE_START};

/// Interval between TCP readiness probes.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// How long to wait for the server to start accepting connections.
pub const STARTUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Environment variable that forces a launch failure. Lets the UI's error
/// surface be exercised without breaking a real server install.
pub const FAKE_ERROR_ENV: &str = "QUILL_FAKE_SERVER_ERROR";

/// How to launch the backend server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Path to the agent CLI binary.
    pub executable: PathBuf,
    pub hostname: String,
    /// Fixed port. `None` scans `port_range` for a free one.
    pub port: Option<u16>,
    pub port_range: (u16, u16),
    pub poll_interval: Duration,
    pub startup_timeout: Duration,
}

impl ServerConfig {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            hostname: "127.0.0.1".to_string(),
            port: None,
            port_range: (PORT_RANGE_START, PORT_RANGE_END),
            poll_interval: POLL_INTERVAL,
            startup_timeout: STARTUP_TIMEOUT,
        }
    }
}

/// A running server process and the websocket URL it serves.
#[derive(Debug)]
pub struct ServerInstance {
    pub url: String,
    pub port: u16,
    child: Child,
}

impl ServerInstance {
    /// Kill the server process. Safe to call if it already exited.
    pub async fn shutdown(&mut self) {
        if let Err(e) = self.child.kill().await {
            tracing::debug!(error = %e, "Server process already gone");
        }
    }
}

/// Launch the server and wait until it accepts TCP connections.
///
/// The process is spawned as `<executable> server --hostname=H --port=P
/// --quiet`. Readiness is a successful TCP connect; the returned URL is the
/// websocket endpoint. On timeout the process is killed before returning.
pub async fn launch_server(config: &ServerConfig) -> Result<ServerInstance, ServerError> {
    if let Ok(message) = std::env::var(FAKE_ERROR_ENV) {
        if !message.is_empty() {
            return Err(ServerError::SpawnFailed(message));
        }
    }

    let port = match config.port {
        Some(port) => port,
        None => find_free_port(config.port_range.0, config.port_range.1)?,
    };

    let mut child = Command::new(&config.executable)
        .arg("server")
        .arg(format!("--hostname={}", config.hostname))
        .arg(format!("--port={port}"))
        .arg("--quiet")
        .env("QUILL_CLIENT", "desktop")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| ServerError::SpawnFailed(e.to_string()))?;

    tracing::info!(
        executable = %config.executable.display(),
        port,
        "Server process spawned, waiting for readiness"
    );

    wait_until_ready(&mut child, &config.hostname, port, config).await?;

    let url = format!("ws://{}:{port}/ws", config.hostname);
    tracing::info!(url = %url, "Server ready");

    Ok(ServerInstance { url, port, child })
}

/// Poll until the server accepts a TCP connection or the deadline passes.
///
/// A premature exit of the child fails fast with its exit code; a timeout
/// kills the child so no orphan keeps the port.
async fn wait_until_ready(
    child: &mut Child,
    hostname: &str,
    port: u16,
    config: &ServerConfig,
) -> Result<(), ServerError> {
    let deadline = Instant::now() + config.startup_timeout;

    loop {
        if let Some(status) = child
            .try_wait()
            .map_err(|e| ServerError::SpawnFailed(e.to_string()))?
        {
            return Err(ServerError::Exited(status.code().unwrap_or(-1)));
        }

        if TcpStream::connect((hostname, port)).await.is_ok() {
            return Ok(());
        }

        if Instant::now() >= deadline {
            tracing::warn!(port, "Server readiness timed out, killing process");
            let _ = child.kill().await;
            return Err(ServerError::Timeout);
        }

        tokio::time::sleep(config.poll_interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    fn script(dir: &std::path::Path, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("fake-server.sh");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn premature_exit_reports_exit_code() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut config = ServerConfig::new(script(dir.path(), "exit 7"));
        config.startup_timeout = Duration::from_secs(5);
        config.poll_interval = Duration::from_millis(10);

        let err = launch_server(&config).await.unwrap_err();
        assert!(matches!(err, ServerError::Exited(7)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn timeout_kills_the_child() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut config = ServerConfig::new(script(dir.path(), "sleep 30"));
        config.startup_timeout = Duration::from_millis(300);
        config.poll_interval = Duration::from_millis(50);
        // A port nothing listens on.
        let probe = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = probe.local_addr().unwrap().port();
        drop(probe);
        config.port = Some(port);

        let err = launch_server(&config).await.unwrap_err();
        assert!(matches!(err, ServerError::Timeout));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn ready_when_port_accepts_connections() {
        // The child just sleeps; a listener we own plays the server socket.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let dir = tempfile::TempDir::new().unwrap();
        let mut config = ServerConfig::new(script(dir.path(), "sleep 30"));
        config.port = Some(port);
        config.startup_timeout = Duration::from_secs(5);
        config.poll_interval = Duration::from_millis(10);

        let mut instance = launch_server(&config).await.unwrap();
        assert_eq!(instance.url, format!("ws://127.0.0.1:{port}/ws"));
        assert_eq!(instance.port, port);
        instance.shutdown().await;
    }

    #[tokio::test]
    async fn missing_executable_is_spawn_failure() {
        let config = ServerConfig::new("/nonexistent/quill-agent");
        let err = launch_server(&config).await.unwrap_err();
        assert!(matches!(err, ServerError::SpawnFailed(_)));
    }
}
