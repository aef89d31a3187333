//! One install cycle: resolve, build, spawn, stream, route the exit.
//!
//! ```text
//! Idle → Resolving → Building → Spawning → Streaming → Idle
//!           │                      │           │
//!           └─ not found ──────────┴─ failed ──┴─ superseded / exited
//! ```
//!
//! Resolver and spawn failures go to the [`Notifier`] and leave the display
//! untouched. A zero exit hides the display; any other exit leaves it visible
//! with the captured output.

use super::command::InstallCommand;
use super::error::InstallError;
use super::manager::{InstallRequest, ManagerChoice};
use super::render::{render_line, RenderedLine};
use super::resolve::{resolve_binary, Platform, SearchPath};
use super::supervisor::{InstallHandle, InstallId, Supervisor, SupervisorEvent};
use super::surface::{DisplaySurface, Notifier};
use std::collections::VecDeque;
use tracing::{debug, info};

/// Lines kept for the failure report.
pub const FAILURE_TAIL_LINES: usize = 20;

/// Where the orchestrator is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Resolving,
    Building,
    Spawning,
    Streaming,
}

/// How a finished install ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    Succeeded,
    /// Non-zero exit (`-1` when killed by a signal), with the last lines shown.
    Failed { code: i32, tail: Vec<RenderedLine> },
}

impl InstallOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

struct ActiveInstall {
    id: InstallId,
    title: String,
}

/// Drives installs for one session against a display and a notifier.
pub struct Orchestrator<S, N> {
    manager: ManagerChoice,
    search_path: SearchPath,
    platform: Platform,
    supervisor: Supervisor,
    surface: S,
    notifier: N,
    active: Option<ActiveInstall>,
    tail: VecDeque<RenderedLine>,
    phase: Phase,
}

impl<S: DisplaySurface, N: Notifier> Orchestrator<S, N> {
    /// Children get `search_path` as their `PATH`, so a package manager found
    /// in a fallback directory can still find `node`.
    pub fn new(manager: ManagerChoice, search_path: SearchPath, surface: S, notifier: N) -> Self {
        let supervisor = Supervisor::new().with_path_env(search_path.to_os_string());
        Self {
            manager,
            search_path,
            platform: Platform::current(),
            supervisor,
            surface,
            notifier,
            active: None,
            tail: VecDeque::with_capacity(FAILURE_TAIL_LINES),
            phase: Phase::Idle,
        }
    }

    #[must_use]
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    #[must_use]
    pub fn manager(&self) -> ManagerChoice {
        self.manager
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn notifier_mut(&mut self) -> &mut N {
        &mut self.notifier
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether an install is streaming.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.active.is_some()
    }

    /// Title of the running install.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.active.as_ref().map(|active| active.title.as_str())
    }

    /// Start installing `request`, replacing any running install.
    ///
    /// Returns once the process is spawned; output is consumed by [`wait`].
    /// Failures are also sent to the notifier.
    ///
    /// [`wait`]: Self::wait
    pub async fn install(
        &mut self,
        request: &InstallRequest,
    ) -> Result<InstallHandle, InstallError> {
        match self.launch(request).await {
            Ok(handle) => Ok(handle),
            Err(err) => {
                // A request rejected before spawning leaves the running install alone.
                self.phase = if self.active.is_some() {
                    Phase::Streaming
                } else {
                    Phase::Idle
                };
                info!(code = err.code(), error = %err, "install not started");
                self.notifier.error(&err.to_string());
                Err(err)
            }
        }
    }

    async fn launch(&mut self, request: &InstallRequest) -> Result<InstallHandle, InstallError> {
        let root = request
            .project_root()
            .filter(|root| root.is_dir())
            .ok_or(InstallError::NoProjectRoot)?
            .to_path_buf();

        self.phase = Phase::Resolving;
        let binary = resolve_binary(self.manager, &self.search_path, self.platform, &root)?;
        debug!(binary = %binary.display(), "resolved package manager");

        self.phase = Phase::Building;
        let command = InstallCommand::new(self.manager, request.kind(), request.names());
        let title = command.title();

        self.phase = Phase::Spawning;
        let spawned = self.supervisor.start(&binary, command.args(), &root).await;
        if spawned.is_err() {
            // The previous install, if any, is gone either way.
            self.active = None;
        }
        let handle = spawned?;

        if let Some(old) = handle.superseded {
            debug!(install_id = old, "superseded by new install");
        }

        self.surface.set_title(&title);
        self.surface.clear();
        self.surface.show();
        self.tail.clear();
        self.active = Some(ActiveInstall {
            id: handle.id,
            title,
        });
        self.phase = Phase::Streaming;

        Ok(handle)
    }

    /// Stream output of the running install until it exits.
    ///
    /// Returns `None` right away when idle. Cancel-safe: every received line
    /// is rendered before the next await point.
    pub async fn wait(&mut self) -> Option<InstallOutcome> {
        while let Some(active_id) = self.active.as_ref().map(|active| active.id) {
            let event = self.supervisor.next_event().await?;
            match event {
                SupervisorEvent::Line { id, line, .. } if id == active_id => {
                    self.append(render_line(&line));
                }
                SupervisorEvent::Exited { id, code } if id == active_id => {
                    return Some(self.finish(id, code));
                }
                // Leftovers from a superseded install.
                SupervisorEvent::Line { .. } | SupervisorEvent::Exited { .. } => {}
            }
        }
        None
    }

    /// Kill the running install without reporting an outcome.
    pub async fn cancel(&mut self) {
        if self.supervisor.cancel_current().await.is_some() {
            info!("install cancelled");
        }
        self.active = None;
        self.phase = Phase::Idle;
    }

    fn append(&mut self, line: RenderedLine) {
        self.surface.append_line(&line);
        if self.tail.len() == FAILURE_TAIL_LINES {
            self.tail.pop_front();
        }
        self.tail.push_back(line);
    }

    fn finish(&mut self, id: InstallId, code: Option<i32>) -> InstallOutcome {
        self.supervisor.release(id);
        let title = self.active.take().map(|active| active.title).unwrap_or_default();
        self.phase = Phase::Idle;

        let code = code.unwrap_or(-1);
        info!(install_id = id, code, "install finished");

        if code == 0 {
            self.surface.hide();
            self.tail.clear();
            InstallOutcome::Succeeded
        } else {
            self.append(render_line(&format!("{title} exited with code {code}")));
            InstallOutcome::Failed {
                code,
                tail: self.tail.drain(..).collect(),
            }
        }
    }
}
