use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum TerminalError {
    #[error("failed to create terminal: {0}")]
    SpawnFailed(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("store serialize error: {0}")]
    Serialize(String),

    #[error("failed to write store to {path}: {message}")]
    Write { path: PathBuf, message: String },
}

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("failed to spawn server: {0}")]
    SpawnFailed(String),

    #[error("no free port in range {start}-{end}")]
    NoFreePort { start: u16, end: u16 },

    #[error("server exited with code {0} before becoming ready")]
    Exited(i32),

    #[error("connection timeout waiting for server readiness")]
    Timeout,
}

#[derive(Debug, thiserror::Error)]
pub enum QuillError {
    #[error(transparent)]
    Terminal(#[from] TerminalError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Server(#[from] ServerError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_error_display() {
        let err = TerminalError::SpawnFailed("shell binary not found".into());
        assert_eq!(
            err.to_string(),
            "failed to create terminal: shell binary not found"
        );
    }

    #[test]
    fn server_error_display() {
        let err = ServerError::NoFreePort {
            start: 7001,
            end: 7100,
        };
        assert_eq!(err.to_string(), "no free port in range 7001-7100");

        let err = ServerError::Exited(3);
        assert_eq!(
            err.to_string(),
            "server exited with code 3 before becoming ready"
        );

        let err = ServerError::Timeout;
        assert_eq!(
            err.to_string(),
            "connection timeout waiting for server readiness"
        );
    }

    #[test]
    fn quill_error_from_terminal() {
        let err: QuillError = TerminalError::SpawnFailed("nope".into()).into();
        assert!(matches!(err, QuillError::Terminal(_)));
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn quill_error_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: QuillError = io.into();
        assert!(matches!(err, QuillError::Io(_)));
        assert!(err.to_string().contains("file missing"));
    }

    #[test]
    fn config_error_display() {
        let err = ConfigError::Write {
            path: PathBuf::from("/tmp/store.json"),
            message: "permission denied".into(),
        };
        assert_eq!(
            err.to_string(),
            "failed to write store to /tmp/store.json: permission denied"
        );
    }
}
