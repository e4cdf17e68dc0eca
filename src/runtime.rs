//! Command dispatch for the session process.
//!
//! Wires a [`SessionCoordinator`] to a [`HostBridge`] and translates each
//! incoming [`SessionCommand`] into coordinator calls and outgoing events.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::capture::{CaptureSession, TeardownReport};
use crate::config::paths::get_staging_dir;
use crate::config::SessionConfig;
use crate::coordinator::{RecordingToggle, SessionCoordinator};
use crate::downloads::FileDownloads;
use crate::host::HostBridge;
use crate::ipc::{SessionCommand, SessionEvent};
use crate::playback::EditorChange;
use crate::randomness::IdSource;

pub struct SessionRuntime {
    coordinator: SessionCoordinator,
    host: HostBridge,
    events: mpsc::UnboundedSender<SessionEvent>,
}

impl SessionRuntime {
    /// Build a runtime that saves recordings through `downloads`.
    pub fn new(
        config: &SessionConfig,
        downloads: FileDownloads,
        events: mpsc::UnboundedSender<SessionEvent>,
    ) -> Self {
        let host = HostBridge::new(events.clone());
        let capture = CaptureSession::new(
            Box::new(host.clone()),
            Box::new(downloads),
            config.artifact_naming(),
            config.mime_preferences.clone(),
        );
        let coordinator = SessionCoordinator::new(
            Box::new(host.clone()),
            capture,
            Box::new(host.clone()),
            config.share_base_url.clone(),
        );
        Self {
            coordinator,
            host,
            events,
        }
    }

    /// Runtime with file downloads resolved from `config`.
    pub fn from_config(
        config: &SessionConfig,
        events: mpsc::UnboundedSender<SessionEvent>,
    ) -> Self {
        let downloads = FileDownloads::new(
            get_staging_dir(),
            config.resolved_downloads_dir(),
            &config.file_extension,
            IdSource::new(config.randomness),
        );
        Self::new(config, downloads, events)
    }

    pub fn coordinator(&self) -> &SessionCoordinator {
        &self.coordinator
    }

    fn emit(&self, event: SessionEvent) {
        // receiver only goes away during shutdown
        let _ = self.events.send(event);
    }

    fn emit_state(&self) {
        self.emit(SessionEvent::State {
            snapshot: self.coordinator.snapshot(),
        });
    }

    fn emit_saved(&self, report: TeardownReport) {
        if report.degraded() {
            warn!(filename = %report.filename, "Recording saved but tap was not detached cleanly");
        }
        self.emit(SessionEvent::RecordingSaved {
            path: report.path.as_ref().map(|p| p.display().to_string()),
            degraded: report.degraded(),
            filename: report.filename,
            bytes: report.bytes,
        });
    }

    /// Handle a single command from the host.
    /// Returns `false` if the main loop should exit.
    pub fn handle_command(&mut self, cmd: SessionCommand) -> bool {
        match cmd {
            SessionCommand::Ping {} => {
                self.emit(SessionEvent::Pong {});
                return true;
            }

            SessionCommand::Stop {} => {
                self.emit(SessionEvent::Stopping {});
                self.shutdown();
                return false;
            }

            SessionCommand::Status {} => {}

            SessionCommand::TogglePlay {} => {
                self.coordinator.toggle_play();
            }

            SessionCommand::Evaluate {} => {
                self.coordinator.evaluate();
            }

            SessionCommand::ToggleRecording {} => match self.coordinator.toggle_recording() {
                Ok(RecordingToggle::Saved(report)) => self.emit_saved(report),
                Ok(_) => {}
                Err(e) => self.emit(SessionEvent::Error {
                    message: e.to_string(),
                }),
            },

            SessionCommand::Share {} => {
                self.coordinator.share();
            }

            SessionCommand::EditorChange {
                is_dirty,
                active_code,
            } => {
                self.coordinator.on_editor_change(EditorChange {
                    is_dirty,
                    active_code,
                });
            }

            SessionCommand::EngineStarted {} => {
                self.coordinator.on_engine_started();
            }

            SessionCommand::EngineStartFailed { message } => {
                if self.coordinator.on_engine_start_failed(&message) {
                    self.emit(SessionEvent::Error { message });
                }
            }

            SessionCommand::EngineStopped {} => {
                self.coordinator.on_engine_stopped();
            }

            SessionCommand::GraphReady {
                context_id,
                output_node,
            } => {
                self.host.set_graph(context_id, output_node);
                return true;
            }

            SessionCommand::GraphLost {} => {
                self.host.clear_graph();
                return true;
            }

            SessionCommand::Capabilities {
                supported_mime_types,
            } => {
                self.host.set_supported_mime_types(supported_mime_types);
                return true;
            }

            SessionCommand::RecorderData { data } => {
                match STANDARD.decode(data.as_bytes()) {
                    Ok(chunk) => self.coordinator.on_recorder_data(chunk),
                    Err(e) => self.emit(SessionEvent::Error {
                        message: format!("Invalid recorder data: {}", e),
                    }),
                }
                return true;
            }

            SessionCommand::RecorderStopped {} => {
                self.host.mark_recorder_stopped();
                if let Some(report) = self.coordinator.on_recorder_stopped() {
                    self.emit_saved(report);
                }
            }
        }

        self.emit_state();
        true
    }

    /// Drive the runtime from the command channel until a `stop` command or
    /// until the channel closes (host gone).
    pub async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Result<SessionCommand, String>>,
    ) {
        loop {
            match commands.recv().await {
                Some(Ok(command)) => {
                    if !self.handle_command(command) {
                        break;
                    }
                }
                Some(Err(message)) => self.emit(SessionEvent::Error { message }),
                None => {
                    info!("Command channel closed, shutting down");
                    self.shutdown();
                    break;
                }
            }
        }
    }

    /// Stop playback and finish any recording before exit.
    pub fn shutdown(&mut self) {
        info!("Session shutting down");
        if let Some(report) = self.coordinator.shutdown() {
            self.emit_saved(report);
        }
        self.emit_state();
    }
}
