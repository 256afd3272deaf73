use std::path::Path;

/// Starts the game. The launcher never waits on or supervises the child.
pub trait ProcessSpawner: Send + Sync {
    /// Returns the pid of the new process.
    fn spawn_detached(&self, exe: &Path, working_dir: &Path) -> std::io::Result<u32>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct OsProcessSpawner;

impl ProcessSpawner for OsProcessSpawner {
    fn spawn_detached(&self, exe: &Path, working_dir: &Path) -> std::io::Result<u32> {
        let mut child = std::process::Command::new(exe)
            .current_dir(working_dir)
            .spawn()?;
        let pid = child.id();

        // Reap on exit so a long-lived front end doesn't collect zombies.
        std::thread::Builder::new()
            .name(format!("reap-{pid}"))
            .spawn(move || match child.wait() {
                Ok(status) => log::info!("Game (pid {pid}) exited: {status}"),
                Err(e) => log::warn!("Failed to wait for game (pid {pid}): {e}"),
            })?;
        Ok(pid)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn spawns_and_returns_pid() {
        let dir = tempfile::tempdir().unwrap();
        let pid = OsProcessSpawner
            .spawn_detached(Path::new("/usr/bin/env"), dir.path())
            .unwrap();
        assert!(pid > 0);
    }

    #[test]
    fn exited_child_is_reaped() {
        let dir = tempfile::tempdir().unwrap();
        let pid = OsProcessSpawner
            .spawn_detached(Path::new("/usr/bin/env"), dir.path())
            .unwrap();

        // A zombie keeps its /proc entry until it is waited on.
        let proc_dir = Path::new("/proc").join(pid.to_string());
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(10);
        while proc_dir.exists() && std::time::Instant::now() < deadline {
            std::thread::sleep(std::time::Duration::from_millis(20));
        }
        if Path::new("/proc/self").exists() {
            assert!(!proc_dir.exists(), "pid {pid} was not reaped");
        }
    }

    #[test]
    fn missing_working_dir_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = OsProcessSpawner.spawn_detached(Path::new("/usr/bin/env"), &dir.path().join("gone"));
        assert!(err.is_err());
    }

    #[test]
    fn missing_exe_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = OsProcessSpawner
            .spawn_detached(&dir.path().join("Game.exe"), dir.path())
            .unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }
}
