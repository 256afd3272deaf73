pub mod cli;
pub mod config;
pub mod error;
pub mod installer;
pub mod launcher;
pub mod logger;
pub mod manifest;
pub mod probe;
pub mod process;
pub mod progress;
pub mod settings;
pub mod state;
pub mod version;
mod zip_utils;

use clap::Parser;

pub use config::LauncherConfig;
pub use error::{LauncherError, LauncherResult};
pub use launcher::{Launcher, LauncherServices};
pub use manifest::VersionDescriptor;
pub use progress::DownloadProgress;
pub use settings::{LauncherSettings, SettingsStore};
pub use state::{LauncherEvent, LauncherState, LauncherView, RetryAction};

use crate::cli::{Cli, Command};

fn fatal(msg: impl std::fmt::Display) -> ! {
    eprintln!("fatal: {msg}");
    log::error!("fatal: {msg}");
    std::process::exit(1);
}

pub fn run() {
    let cli = Cli::parse();

    let config = match LauncherConfig::for_current_exe() {
        Ok(base) => cli.config(base),
        Err(e) => fatal(e),
    };

    // File logging (<data dir>/game-launcher/logs/game-launcher.log)
    if let Err(e) = logger::init(&config.logs_dir, cli.verbose) {
        fatal(format!("failed to initialize logging: {e}"));
    }

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => fatal(format!("failed to start async runtime: {e}")),
    };

    let launcher = match Launcher::from_config(&config) {
        Ok(l) => l,
        Err(e) => fatal(format!("failed to initialize launcher: {e}")),
    };

    if cli.command == Command::Settings {
        match serde_json::to_string_pretty(&launcher.settings()) {
            Ok(json) => println!("{json}"),
            Err(e) => fatal(e),
        }
        return;
    }

    let final_state = runtime.block_on(cli::execute(&launcher, &cli.command));

    if matches!(final_state, LauncherState::Error { .. }) {
        std::process::exit(2);
    }
}
