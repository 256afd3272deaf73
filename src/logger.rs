use std::path::{Path, PathBuf};

use log::LevelFilter;
use log4rs::{
    append::{
        console::{ConsoleAppender, Target},
        rolling_file::{
            policy::compound::{
                roll::fixed_window::FixedWindowRoller, trigger::size::SizeTrigger, CompoundPolicy,
            },
            RollingFileAppender,
        },
    },
    config::{Appender, Config, Root},
    encode::pattern::PatternEncoder,
};

type AnyError = Box<dyn std::error::Error>;

fn err(msg: impl Into<String>) -> AnyError {
    Box::new(std::io::Error::new(std::io::ErrorKind::Other, msg.into()))
}

pub fn log_file(logs_dir: &Path) -> PathBuf {
    logs_dir.join("game-launcher.log")
}

/// File logging under `logs_dir`, plus stderr in debug builds (or when `verbose`).
///
/// A second call is a no-op.
pub fn init(logs_dir: &Path, verbose: bool) -> Result<(), AnyError> {
    let log_file = log_file(logs_dir);
    std::fs::create_dir_all(logs_dir).map_err(|e| err(format!("{}: {e}", logs_dir.display())))?;

    // 10MB per file, keep 5 rolled files.
    let roller = FixedWindowRoller::builder()
        .build(
            &logs_dir
                .join("game-launcher.{}.log")
                .to_string_lossy()
                .to_string(),
            5,
        )
        .map_err(|e| err(e.to_string()))?;
    let policy = CompoundPolicy::new(Box::new(SizeTrigger::new(10 * 1024 * 1024)), Box::new(roller));

    let file_appender = RollingFileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S%.3f)} [{l}] {t} {M} - {m}{n}",
        )))
        .build(&log_file, Box::new(policy))
        .map_err(|e| err(e.to_string()))?;

    let console = verbose || cfg!(debug_assertions);

    let mut cfg_builder =
        Config::builder().appender(Appender::builder().build("file", Box::new(file_appender)));
    let mut root_builder = Root::builder().appender("file");

    if console {
        // stderr, so stdout stays clean for `settings` JSON output.
        let stderr = ConsoleAppender::builder()
            .target(Target::Stderr)
            .encoder(Box::new(PatternEncoder::new("[{l}] {m}{n}")))
            .build();
        cfg_builder = cfg_builder.appender(Appender::builder().build("stderr", Box::new(stderr)));
        root_builder = root_builder.appender("stderr");
    }

    let cfg = cfg_builder
        .build(root_builder.build(LevelFilter::Info))
        .map_err(|e| err(e.to_string()))?;

    // Ignore error if already initialized.
    if log4rs::init_config(cfg).is_err() {
        return Ok(());
    }

    std::panic::set_hook(Box::new(|info| {
        log::error!("panic: {info}");
        eprintln!("panic: {info}");
    }));

    log::info!("logger initialized");
    log::info!("log file: {}", log_file.to_string_lossy());
    Ok(())
}
