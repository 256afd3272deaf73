use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error type shared by every launcher service.
///
/// None of these ever reach the UI directly: the [`Launcher`](crate::launcher::Launcher)
/// turns them into `Offline` or `Error` states.
#[derive(Debug, Error)]
pub enum LauncherError {
    // ── Network ─────────────────────────────────────────
    #[error("network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("request to {url} failed: HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("request to {url} timed out")]
    Timeout { url: String },

    // ── IO ──────────────────────────────────────────────
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    // ── Archive ─────────────────────────────────────────
    #[error("zip extraction error: {0}")]
    Archive(#[from] zip::result::ZipError),

    // ── Launch ──────────────────────────────────────────
    #[error("{0}")]
    NotFound(String),

    // ── JSON ────────────────────────────────────────────
    #[error("JSON error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("background task failed: {0}")]
    Task(String),
}

pub type LauncherResult<T> = Result<T, LauncherError>;

impl LauncherError {
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        LauncherError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// True for failures that mean "could not talk to the server".
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            LauncherError::Http(_) | LauncherError::Status { .. } | LauncherError::Timeout { .. }
        )
    }
}

impl From<std::io::Error> for LauncherError {
    fn from(source: std::io::Error) -> Self {
        LauncherError::Io {
            path: PathBuf::new(),
            source,
        }
    }
}

impl From<tokio::task::JoinError> for LauncherError {
    fn from(e: tokio::task::JoinError) -> Self {
        LauncherError::Task(e.to_string())
    }
}
