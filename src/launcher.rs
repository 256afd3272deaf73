use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::{broadcast, watch};

use crate::config::LauncherConfig;
use crate::error::LauncherResult;
use crate::installer::{BuildInstaller, HttpBuildInstaller};
use crate::manifest::{HttpManifestSource, ManifestSource, VersionDescriptor};
use crate::probe::{DirectoryProbe, InstallationProbe};
use crate::process::{OsProcessSpawner, ProcessSpawner};
use crate::progress::DownloadProgress;
use crate::settings::{LauncherSettings, SettingsStore};
use crate::state::{LauncherEvent, LauncherState, LauncherView, RetryAction};
use crate::version;

/// Collaborators the launcher drives. Swapped for fakes in tests.
pub struct LauncherServices {
    pub manifest: Arc<dyn ManifestSource>,
    pub probe: Arc<dyn InstallationProbe>,
    pub installer: Arc<dyn BuildInstaller>,
    pub spawner: Arc<dyn ProcessSpawner>,
}

impl LauncherServices {
    /// Real HTTP/filesystem/OS implementations sharing one HTTP client.
    pub fn from_config(config: &LauncherConfig) -> LauncherResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .connect_timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            manifest: Arc::new(HttpManifestSource::new(client.clone(), config)),
            probe: Arc::new(DirectoryProbe::new(config)),
            installer: Arc::new(HttpBuildInstaller::new(client, config)),
            spawner: Arc::new(OsProcessSpawner),
        })
    }
}

/// The update/install/play state machine.
///
/// Every public operation returns the state it ended in; errors never escape; they
/// become `Offline` or `Error` states. `check_for_updates`, `install_or_update`,
/// `play` and `change_install_path` share a busy flag: a trigger that arrives while
/// another one is running is ignored and returns the current state.
pub struct Launcher {
    services: LauncherServices,
    settings: Mutex<SettingsStore>,
    latest: Mutex<Option<VersionDescriptor>>,
    state: watch::Sender<LauncherState>,
    events: broadcast::Sender<LauncherEvent>,
    busy: AtomicBool,
}

struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// A poisoned lock only means a panic happened mid-update; the data is still usable.
fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Launcher {
    pub fn new(services: LauncherServices, settings: SettingsStore) -> Self {
        let (state, _) = watch::channel(LauncherState::Checking);
        let (events, _) = broadcast::channel(16);
        Self {
            services,
            settings: Mutex::new(settings),
            latest: Mutex::new(None),
            state,
            events,
            busy: AtomicBool::new(false),
        }
    }

    /// Loads settings and wires the real services.
    pub fn from_config(config: &LauncherConfig) -> LauncherResult<Self> {
        let services = LauncherServices::from_config(config)?;
        let settings = SettingsStore::load(&config.settings_file, &config.default_install_path);
        Ok(Self::new(services, settings))
    }

    // ---------- Observation ----------

    pub fn state(&self) -> LauncherState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<LauncherState> {
        self.state.subscribe()
    }

    pub fn events(&self) -> broadcast::Receiver<LauncherEvent> {
        self.events.subscribe()
    }

    pub fn settings(&self) -> LauncherSettings {
        lock(&self.settings).settings().clone()
    }

    pub fn latest_version(&self) -> Option<VersionDescriptor> {
        lock(&self.latest).clone()
    }

    pub fn view(&self) -> LauncherView {
        LauncherView::from_state(&self.state(), &self.settings().local_version)
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    // ---------- Operations ----------

    pub async fn check_for_updates(&self) -> LauncherState {
        let Some(_busy) = self.begin("check for updates") else {
            return self.state();
        };

        self.set_state(LauncherState::Checking);

        let fetched = self.services.manifest.fetch().await;
        let LauncherSettings {
            install_path,
            local_version,
        } = self.settings();
        let installed = self.services.probe.is_installed(&install_path);

        let next = match fetched {
            Some(remote) => {
                log::info!(
                    "Remote version: {}, local version: {local_version}, installed: {installed}",
                    remote.version
                );
                let newer = version::is_newer(&remote.version, &local_version);
                *lock(&self.latest) = Some(remote.clone());

                match (newer, installed) {
                    (true, true) => LauncherState::NeedsUpdate { target: remote },
                    (false, true) => LauncherState::ReadyToPlay,
                    (_, false) => LauncherState::NeedsInstall,
                }
            }
            None => {
                *lock(&self.latest) = None;
                LauncherState::Offline { installed }
            }
        };

        self.set_state(next)
    }

    /// Install and update are the same download; only the UI label differs.
    pub async fn install_or_update(&self) -> LauncherState {
        let Some(_busy) = self.begin("install/update") else {
            return self.state();
        };

        let install_path = self.settings().install_path;
        let retry = if self.services.probe.is_installed(&install_path) {
            RetryAction::Update
        } else {
            RetryAction::Install
        };

        // Offline at check time: give the manifest one more try instead of refusing outright.
        let descriptor = match self.latest_version() {
            Some(d) => d,
            None => match self.services.manifest.fetch().await {
                Some(d) => {
                    *lock(&self.latest) = Some(d.clone());
                    d
                }
                None => {
                    return self.fail(
                        "Update failed: no version information available. Are you offline?",
                        retry,
                    )
                }
            },
        };

        if descriptor.build_url.trim().is_empty() {
            return self.fail("Update failed: version manifest has no build URL", retry);
        }

        log::info!(
            "Installing v{} from {} into {}",
            descriptor.version,
            descriptor.build_url,
            install_path.to_string_lossy()
        );
        self.set_state(LauncherState::Downloading {
            progress: DownloadProgress::Indeterminate,
        });

        let state_tx = &self.state;
        let mut on_progress = |progress: DownloadProgress| {
            state_tx.send_replace(LauncherState::Downloading { progress });
        };

        let res = self
            .services
            .installer
            .download_and_install(&descriptor.build_url, &install_path, &mut on_progress)
            .await;

        match res {
            Ok(()) => {
                lock(&self.settings).set_local_version(descriptor.version.clone());
                log::info!("Update complete: now at v{}", descriptor.version);
                self.set_state(LauncherState::ReadyToPlay)
            }
            Err(e) => self.fail(format!("Update failed: {e}"), retry),
        }
    }

    pub async fn play(&self) -> LauncherState {
        let Some(_busy) = self.begin("play") else {
            return self.state();
        };

        let previous = self.state();
        let install_path = self.settings().install_path;

        if !self.services.probe.is_installed(&install_path) {
            return self.fail("Launch failed: Game files not found.", RetryAction::Install);
        }

        let exe = match self.services.probe.find_entry_point(&install_path) {
            Ok(exe) => exe,
            Err(e) => return self.fail(format!("Launch failed: {e}"), RetryAction::Play),
        };

        log::info!(
            "Launching {} (cwd {})",
            exe.to_string_lossy(),
            install_path.to_string_lossy()
        );
        match self.services.spawner.spawn_detached(&exe, &install_path) {
            Ok(pid) => {
                log::info!("Game launched (pid {pid})");
                let _ = self.events.send(LauncherEvent::GameLaunched { pid });
                self.set_state(after_launch(previous))
            }
            Err(e) => self.fail(format!("Launch failed: {e}"), RetryAction::Play),
        }
    }

    /// Persists the new path. Callers re-run `check_for_updates` afterwards.
    ///
    /// Returns `false` if an operation is in flight and the change was ignored.
    pub fn change_install_path(&self, install_path: impl Into<PathBuf>) -> bool {
        let Some(_busy) = self.begin("change install path") else {
            return false;
        };
        let install_path = install_path.into();
        log::info!("Install path changed to {}", install_path.to_string_lossy());
        lock(&self.settings).set_install_path(install_path);
        true
    }

    pub fn request_settings(&self) {
        let _ = self.events.send(LauncherEvent::SettingsRequested);
    }

    pub fn request_browse(&self) {
        let _ = self.events.send(LauncherEvent::BrowseRequested);
    }

    // ---------- Internals ----------

    fn begin(&self, what: &str) -> Option<BusyGuard<'_>> {
        match self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => Some(BusyGuard(&self.busy)),
            Err(_) => {
                log::warn!("Ignoring {what}: another operation is in progress");
                None
            }
        }
    }

    fn set_state(&self, next: LauncherState) -> LauncherState {
        self.state.send_replace(next.clone());
        next
    }

    fn fail(&self, message: impl Into<String>, retry: RetryAction) -> LauncherState {
        let message = message.into();
        log::error!("{message}");
        self.set_state(LauncherState::Error { message, retry })
    }
}

/// Launching doesn't change what the launcher knows about updates.
fn after_launch(previous: LauncherState) -> LauncherState {
    match previous {
        LauncherState::NeedsUpdate { .. } | LauncherState::Offline { installed: true } => previous,
        _ => LauncherState::ReadyToPlay,
    }
}
