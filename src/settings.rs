use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{LauncherError, LauncherResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LauncherSettings {
    #[serde(default)]
    pub install_path: PathBuf,
    #[serde(default = "default_local_version")]
    pub local_version: String,
}

fn default_local_version() -> String {
    "0.0.0".to_string()
}

impl LauncherSettings {
    pub fn with_install_path(install_path: impl Into<PathBuf>) -> Self {
        Self {
            install_path: install_path.into(),
            local_version: default_local_version(),
        }
    }
}

/// Owns the one live copy of the settings and the file it is persisted to.
#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    settings: LauncherSettings,
}

impl SettingsStore {
    /// Never fails. Missing/unreadable/corrupt files fall back to defaults, and an
    /// install path that no longer exists is reset to `default_install_path`.
    pub fn load(path: impl Into<PathBuf>, default_install_path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let default_install_path = default_install_path.into();

        let mut settings = match read_settings(&path) {
            Ok(Some(s)) => s,
            Ok(None) => LauncherSettings::with_install_path(&default_install_path),
            Err(e) => {
                log::warn!(
                    "Ignoring unreadable settings {}: {e}",
                    path.to_string_lossy()
                );
                LauncherSettings::with_install_path(&default_install_path)
            }
        };

        if settings.install_path.as_os_str().is_empty() || !settings.install_path.is_dir() {
            if !settings.install_path.as_os_str().is_empty() {
                log::info!(
                    "Install path {} is gone; using {}",
                    settings.install_path.to_string_lossy(),
                    default_install_path.to_string_lossy()
                );
            }
            settings.install_path = default_install_path;
        }

        // An empty install dir still has to exist for the "is installed" checks.
        if let Err(e) = std::fs::create_dir_all(&settings.install_path) {
            log::error!(
                "Failed to create install dir {}: {e}",
                settings.install_path.to_string_lossy()
            );
        }

        let store = Self { path, settings };
        store.save();
        store
    }

    pub fn settings(&self) -> &LauncherSettings {
        &self.settings
    }

    /// Best-effort write; failures are logged.
    pub fn save(&self) {
        if let Err(e) = write_settings(&self.path, &self.settings) {
            log::error!("Error saving settings: {e}");
        }
    }

    pub fn update(&mut self, mutate: impl FnOnce(&mut LauncherSettings)) {
        mutate(&mut self.settings);
        self.save();
    }

    pub fn set_local_version(&mut self, version: impl Into<String>) {
        let version = version.into();
        self.update(|s| s.local_version = version);
    }

    pub fn set_install_path(&mut self, install_path: impl Into<PathBuf>) {
        let install_path = install_path.into();
        self.update(|s| s.install_path = install_path);
    }
}

fn read_settings(path: &Path) -> LauncherResult<Option<LauncherSettings>> {
    if !path.exists() {
        return Ok(None);
    }
    let text = std::fs::read_to_string(path).map_err(|e| LauncherError::io(path, e))?;
    Ok(Some(serde_json::from_str(&text)?))
}

fn write_settings(path: &Path, settings: &LauncherSettings) -> LauncherResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| LauncherError::io(parent, e))?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    std::fs::write(path, json).map_err(|e| LauncherError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        _dir: tempfile::TempDir,
        file: PathBuf,
        default_install: PathBuf,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("launcher_settings.json");
        let default_install = dir.path().join("Games");
        Fixture {
            file,
            default_install,
            _dir: dir,
        }
    }

    #[test]
    fn missing_file_yields_defaults_and_creates_dir() {
        let f = fixture();
        let store = SettingsStore::load(&f.file, &f.default_install);
        assert_eq!(store.settings().install_path, f.default_install);
        assert_eq!(store.settings().local_version, "0.0.0");
        assert!(f.default_install.is_dir());
        // Written right away.
        assert!(f.file.exists());
    }

    #[test]
    fn corrupt_file_yields_defaults() {
        let f = fixture();
        std::fs::write(&f.file, "{ not json").unwrap();
        let store = SettingsStore::load(&f.file, &f.default_install);
        assert_eq!(store.settings(), &LauncherSettings::with_install_path(&f.default_install));
    }

    #[test]
    fn round_trip() {
        let f = fixture();
        let custom = f.default_install.parent().unwrap().join("Custom");
        std::fs::create_dir_all(&custom).unwrap();

        let mut store = SettingsStore::load(&f.file, &f.default_install);
        store.set_install_path(&custom);
        store.set_local_version("1.2.0");

        let reloaded = SettingsStore::load(&f.file, &f.default_install);
        assert_eq!(reloaded.settings(), store.settings());
    }

    #[test]
    fn vanished_install_path_is_repaired() {
        let f = fixture();
        let gone = f.default_install.parent().unwrap().join("Deleted");
        std::fs::write(
            &f.file,
            serde_json::json!({ "installPath": gone, "localVersion": "1.2.0" }).to_string(),
        )
        .unwrap();

        let store = SettingsStore::load(&f.file, &f.default_install);
        assert_eq!(store.settings().install_path, f.default_install);
        assert_eq!(store.settings().local_version, "1.2.0");
        assert!(!gone.exists());
    }

    #[test]
    fn file_uses_camel_case_keys() {
        let f = fixture();
        let mut store = SettingsStore::load(&f.file, &f.default_install);
        store.set_local_version("2.0");
        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&f.file).unwrap()).unwrap();
        assert_eq!(raw["localVersion"], "2.0");
        assert!(raw["installPath"].is_string());
    }
}
