use serde::Serialize;

use crate::manifest::VersionDescriptor;
use crate::progress::DownloadProgress;

/// Which action stays available after a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RetryAction {
    Check,
    Install,
    Update,
    Play,
}

/// The one state the launcher is in. Every state can be left again by a user action.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum LauncherState {
    Checking,
    NeedsInstall,
    NeedsUpdate { target: VersionDescriptor },
    ReadyToPlay,
    Offline { installed: bool },
    Downloading { progress: DownloadProgress },
    Error { message: String, retry: RetryAction },
}

/// Intents for the presentation layer. The core never opens windows itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum LauncherEvent {
    SettingsRequested,
    BrowseRequested,
    GameLaunched { pid: u32 },
}

/// What a UI binds to: status line, progress bar and button visibility.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LauncherView {
    pub status_text: String,
    /// `None` while hidden or indeterminate.
    pub progress: Option<f64>,
    pub progress_visible: bool,
    pub play_visible: bool,
    pub update_visible: bool,
    pub install_visible: bool,
    pub version_text: String,
}

impl LauncherView {
    pub fn from_state(state: &LauncherState, local_version: &str) -> Self {
        let mut view = LauncherView {
            status_text: String::new(),
            progress: None,
            progress_visible: false,
            play_visible: false,
            update_visible: false,
            install_visible: false,
            version_text: format!("Current: v{local_version}"),
        };

        match state {
            LauncherState::Checking => {
                view.status_text = "Checking for updates...".to_string();
                view.progress_visible = true;
            }
            LauncherState::NeedsInstall => {
                view.status_text = "Game not installed".to_string();
                view.install_visible = true;
            }
            LauncherState::NeedsUpdate { target } => {
                view.status_text = format!("New version available: v{}", target.version);
                view.update_visible = true;
            }
            LauncherState::ReadyToPlay => {
                view.status_text = "Ready to play".to_string();
                view.play_visible = true;
            }
            LauncherState::Offline { installed } => {
                view.status_text = "Failed to check for updates. Offline mode?".to_string();
                view.play_visible = *installed;
                // Install will most likely fail too, but don't block the user from trying.
                view.install_visible = !*installed;
            }
            LauncherState::Downloading { progress } => {
                // Unknown length and extraction both show an indeterminate bar.
                view.status_text = "Downloading update...".to_string();
                view.progress = progress.percent();
                view.progress_visible = true;
            }
            LauncherState::Error { message, retry } => {
                view.status_text = message.clone();
                match retry {
                    RetryAction::Check => {}
                    RetryAction::Install => view.install_visible = true,
                    RetryAction::Update => view.update_visible = true,
                    RetryAction::Play => view.play_visible = true,
                }
            }
        }
        view
    }
}
