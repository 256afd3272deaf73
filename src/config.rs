use std::path::{Path, PathBuf};
use std::time::Duration;

/// Version descriptor endpoint. Hardcoded; the CLI can override it for testing builds.
pub const MANIFEST_URL: &str =
    "https://github.com/vismaymaurya/LauncherTest/releases/download/Launcher/version.json";

pub const SETTINGS_FILE_NAME: &str = "launcher_settings.json";
pub const DEFAULT_INSTALL_DIR_NAME: &str = "Games";
pub const USER_AGENT: &str = concat!("game-launcher/", env!("CARGO_PKG_VERSION"));

/// Name of the build executable shipped in the archive (guessed from the zip name).
pub const EXPECTED_BUILD_NAME: &str = "TestBuild.exe";
/// Unity bundles a crash reporter next to the game; it must never be launched.
pub const CRASH_HANDLER_PREFIX: &str = "UnityCrashHandler";

#[derive(Debug, Clone)]
pub struct LauncherConfig {
    pub manifest_url: String,
    pub request_timeout: Duration,
    pub user_agent: String,

    /// Directory of the launcher executable. Settings and the default install dir live here.
    pub base_dir: PathBuf,
    pub settings_file: PathBuf,
    pub default_install_path: PathBuf,
    pub logs_dir: PathBuf,

    pub expected_build_name: String,
    pub crash_handler_prefix: String,
    /// Lowercase, without the dot.
    pub executable_extensions: Vec<String>,
}

impl LauncherConfig {
    pub fn from_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        let logs_dir = dirs::data_local_dir()
            .map(|d| d.join("game-launcher").join("logs"))
            .unwrap_or_else(|| base_dir.join("logs"));

        Self {
            manifest_url: MANIFEST_URL.to_string(),
            request_timeout: Duration::from_secs(30),
            user_agent: USER_AGENT.to_string(),
            settings_file: base_dir.join(SETTINGS_FILE_NAME),
            default_install_path: base_dir.join(DEFAULT_INSTALL_DIR_NAME),
            logs_dir,
            base_dir,
            expected_build_name: EXPECTED_BUILD_NAME.to_string(),
            crash_handler_prefix: CRASH_HANDLER_PREFIX.to_string(),
            executable_extensions: vec!["exe".to_string(), "x86_64".to_string()],
        }
    }

    /// Resolves the base dir from the running executable.
    pub fn for_current_exe() -> Result<Self, String> {
        let exe = std::env::current_exe()
            .map_err(|e| format!("failed to resolve launcher executable: {e}"))?;
        let base = exe
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| format!("launcher executable has no parent dir: {}", exe.display()))?;
        Ok(Self::from_base_dir(base))
    }

    pub fn with_manifest_url(mut self, url: impl Into<String>) -> Self {
        self.manifest_url = url.into();
        self
    }

    pub fn with_settings_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.settings_file = path.into();
        self
    }

    pub fn with_build_name(mut self, name: impl Into<String>) -> Self {
        self.expected_build_name = name.into();
        self
    }
}
