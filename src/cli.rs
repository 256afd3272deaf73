use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::LauncherConfig;
use crate::launcher::Launcher;
use crate::state::{LauncherState, LauncherView};

#[derive(Parser, Debug)]
#[command(version, about = "Checks for, installs and launches the game build")]
pub struct Cli {
    /// Override the version manifest URL.
    #[arg(long)]
    pub manifest_url: Option<String>,

    /// Override the settings file location.
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Executable name to prefer when launching.
    #[arg(long)]
    pub build_name: Option<String>,

    /// Also log to stderr.
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Check for updates and print the launcher status.
    Status,
    /// Check, then download and install the latest build.
    Install,
    /// Check, then launch the installed game.
    Play,
    /// Change the install directory, then re-check.
    SetPath { path: PathBuf },
    /// Print the current settings as JSON.
    Settings,
}

impl Cli {
    pub fn config(&self, base: LauncherConfig) -> LauncherConfig {
        let mut cfg = base;
        if let Some(url) = &self.manifest_url {
            cfg = cfg.with_manifest_url(url.clone());
        }
        if let Some(path) = &self.settings {
            cfg = cfg.with_settings_file(path.clone());
        }
        if let Some(name) = &self.build_name {
            cfg = cfg.with_build_name(name.clone());
        }
        cfg
    }
}

pub fn render(view: &LauncherView) -> String {
    let mut line = format!("[{}] {}", view.version_text, view.status_text);
    if view.progress_visible {
        match view.progress {
            Some(p) => line.push_str(&format!(" {p:.0}%")),
            None => line.push_str(" ..."),
        }
    }
    let actions: Vec<&str> = [
        (view.play_visible, "play"),
        (view.update_visible, "install (update)"),
        (view.install_visible, "install"),
    ]
    .into_iter()
    .filter_map(|(visible, name)| visible.then_some(name))
    .collect();
    if !actions.is_empty() {
        line.push_str(&format!("  -> available: {}", actions.join(", ")));
    }
    line
}

/// Drives one command to completion, printing every state change once.
pub async fn execute(launcher: &Launcher, command: &Command) -> LauncherState {
    execute_with(launcher, command, |line| println!("{line}")).await
}

async fn execute_with(
    launcher: &Launcher,
    command: &Command,
    mut emit: impl FnMut(String),
) -> LauncherState {
    let mut rx = launcher.subscribe();
    let mut last = String::new();
    let printer = async {
        while rx.changed().await.is_ok() {
            let line = render(&launcher.view());
            if line != last {
                last = line.clone();
                emit(line);
            }
        }
    };

    let work = async {
        match command {
            Command::Status => launcher.check_for_updates().await,
            Command::Install => {
                launcher.check_for_updates().await;
                launcher.install_or_update().await
            }
            Command::Play => {
                let checked = launcher.check_for_updates().await;
                if matches!(checked, LauncherState::NeedsInstall) {
                    return checked;
                }
                launcher.play().await
            }
            Command::SetPath { path } => {
                launcher.change_install_path(path.clone());
                launcher.check_for_updates().await
            }
            Command::Settings => launcher.state(),
        }
    };

    // The printer never finishes on its own; the select ends when the work does.
    let state = tokio::select! {
        state = work => state,
        _ = printer => launcher.state(),
    };

    // The work can finish before the printer has seen its last change.
    let line = render(&launcher.view());
    if line != last {
        emit(line);
    }
    state
}
