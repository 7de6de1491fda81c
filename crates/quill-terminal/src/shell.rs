//! Shell detection and working-directory resolution.

use std::path::{Path, PathBuf};

/// Get the default shell for the current platform.
///
/// - Unix: reads `$SHELL`, falls back to `/bin/zsh`
/// - Windows: reads `%COMSPEC%`, falls back to `cmd.exe`
pub fn default_shell() -> String {
    #[cfg(unix)]
    {
        std::env::var("SHELL").unwrap_or_else(|_| "/bin/zsh".to_string())
    }
    #[cfg(windows)]
    {
        std::env::var("COMSPEC").unwrap_or_else(|_| "cmd.exe".to_string())
    }
}

/// Resolve the working directory a shell should start in.
///
/// An explicit directory is used only if it stats as an existing directory;
/// anything else (missing, not a directory, unreadable) falls back to the
/// user's home directory with a warning. This is a permissive policy, not a
/// hard failure: terminal creation never fails on a bad working directory.
pub fn resolve_cwd(requested: Option<&Path>) -> PathBuf {
    let home = home_dir();

    let Some(cwd) = requested else {
        return home;
    };
    if cwd.as_os_str().is_empty() {
        return home;
    }

    match std::fs::metadata(cwd) {
        Ok(meta) if meta.is_dir() => cwd.to_path_buf(),
        Ok(_) => {
            tracing::warn!(
                cwd = %cwd.display(),
                "PTY cwd is not a directory, falling back to home directory"
            );
            home
        }
        Err(_) => {
            tracing::warn!(
                cwd = %cwd.display(),
                "PTY cwd doesn't exist, falling back to home directory"
            );
            home
        }
    }
}

fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_shell_is_non_empty() {
        assert!(!default_shell().is_empty());
    }

    #[test]
    fn resolve_cwd_none_is_home() {
        let cwd = resolve_cwd(None);
        assert_eq!(cwd, dirs::home_dir().unwrap());
    }

    #[test]
    fn resolve_cwd_empty_is_home() {
        let cwd = resolve_cwd(Some(Path::new("")));
        assert_eq!(cwd, dirs::home_dir().unwrap());
    }

    #[test]
    fn resolve_cwd_existing_dir_is_kept() {
        let dir = tempfile::TempDir::new().unwrap();
        let cwd = resolve_cwd(Some(dir.path()));
        assert_eq!(cwd, dir.path());
    }

    #[test]
    fn resolve_cwd_missing_dir_falls_back_to_home() {
        let cwd = resolve_cwd(Some(Path::new("/nonexistent/xyz")));
        assert_eq!(cwd, dirs::home_dir().unwrap());
    }

    #[test]
    fn resolve_cwd_file_falls_back_to_home() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let cwd = resolve_cwd(Some(file.path()));
        assert_eq!(cwd, dirs::home_dir().unwrap());
    }
}
