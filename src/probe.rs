use std::path::{Path, PathBuf};

use crate::config::LauncherConfig;
use crate::error::{LauncherError, LauncherResult};

/// Answers "is a game installed here, and what do we run?".
pub trait InstallationProbe: Send + Sync {
    fn is_installed(&self, path: &Path) -> bool;
    fn find_entry_point(&self, path: &Path) -> LauncherResult<PathBuf>;
}

/// Looks at the top level of the install directory only.
///
/// Entry point selection is a heuristic, not a guarantee:
/// 1. an executable named exactly like the expected build (case-insensitive),
/// 2. otherwise the first executable (by name) that is not a crash handler.
#[derive(Debug, Clone)]
pub struct DirectoryProbe {
    expected_build_name: String,
    crash_handler_prefix: String,
    executable_extensions: Vec<String>,
}

impl DirectoryProbe {
    pub fn new(config: &LauncherConfig) -> Self {
        Self {
            expected_build_name: config.expected_build_name.clone(),
            crash_handler_prefix: config.crash_handler_prefix.clone(),
            executable_extensions: config
                .executable_extensions
                .iter()
                .map(|e| e.to_lowercase())
                .collect(),
        }
    }

    fn is_executable(&self, path: &Path) -> bool {
        let ext_match = path
            .extension()
            .and_then(|s| s.to_str())
            .map(|ext| self.executable_extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
            .unwrap_or(false);
        if ext_match {
            return true;
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Ok(md) = std::fs::metadata(path) {
                return md.permissions().mode() & 0o111 != 0;
            }
        }
        false
    }

    /// Executables directly under `dir`, sorted by file name.
    fn executables(&self, dir: &Path) -> Vec<PathBuf> {
        let Ok(rd) = std::fs::read_dir(dir) else {
            return vec![];
        };

        let mut out: Vec<PathBuf> = rd
            .flatten()
            .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
            .map(|e| e.path())
            .filter(|p| self.is_executable(p))
            .collect();
        out.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        out
    }

    fn is_crash_handler(&self, name: &str) -> bool {
        name.to_lowercase()
            .starts_with(&self.crash_handler_prefix.to_lowercase())
    }
}

impl InstallationProbe for DirectoryProbe {
    fn is_installed(&self, path: &Path) -> bool {
        if path.as_os_str().is_empty() || !path.is_dir() {
            return false;
        }
        !self.executables(path).is_empty()
    }

    fn find_entry_point(&self, path: &Path) -> LauncherResult<PathBuf> {
        if path.as_os_str().is_empty() || !path.is_dir() {
            return Err(LauncherError::NotFound("Game files not found.".to_string()));
        }

        let candidates = self.executables(path);
        let file_name = |p: &PathBuf| {
            p.file_name()
                .and_then(|s| s.to_str())
                .unwrap_or_default()
                .to_string()
        };

        if let Some(exact) = candidates
            .iter()
            .find(|p| file_name(*p).eq_ignore_ascii_case(&self.expected_build_name))
        {
            return Ok(exact.clone());
        }

        candidates
            .iter()
            .find(|p| !self.is_crash_handler(&file_name(*p)))
            .cloned()
            .ok_or_else(|| {
                LauncherError::NotFound(
                    "No suitable executable found in game directory.".to_string(),
                )
            })
    }
}
