//! The session façade used by the UI layer.
//!
//! Routes user actions to the playback controller and the capture session,
//! and delivers asynchronous engine/recorder callbacks to them. All calls
//! happen on one event loop; every toggle is judged against the state at the
//! moment it is called.

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::capture::{
    CaptureError, CaptureSession, RecordingState, StartOutcome, StopOutcome, TeardownReport,
};
use crate::engine::SynthEngine;
use crate::graph::AudioGraphHandle;
use crate::playback::{EditorChange, PlaybackController, PlaybackState};
use crate::share::{self, ShareTarget};

/// Read-only state for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub playback: PlaybackState,
    pub started: bool,
    pub pending: bool,
    pub is_dirty: bool,
    pub can_evaluate: bool,
    pub recording: RecordingState,
    pub stop_requested: bool,
}

/// Result of a recording toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordingToggle {
    Started { mime_type: String },
    StopRequested,
    /// A stop was already in flight.
    Ignored,
    Saved(TeardownReport),
}

pub struct SessionCoordinator {
    engine: Box<dyn SynthEngine>,
    share_target: Box<dyn ShareTarget>,
    share_base_url: String,
    playback: PlaybackController,
    capture: CaptureSession,
}

impl SessionCoordinator {
    pub fn new(
        engine: Box<dyn SynthEngine>,
        capture: CaptureSession,
        share_target: Box<dyn ShareTarget>,
        share_base_url: impl Into<String>,
    ) -> Self {
        Self {
            engine,
            share_target,
            share_base_url: share_base_url.into(),
            playback: PlaybackController::new(),
            capture,
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let playback = self.playback.state();
        SessionSnapshot {
            playback,
            started: playback == PlaybackState::Started,
            pending: playback == PlaybackState::Pending,
            is_dirty: self.playback.is_dirty(),
            can_evaluate: self.playback.can_evaluate(),
            recording: self.capture.state(),
            stop_requested: self.capture.stop_requested(),
        }
    }

    pub fn playback(&self) -> &PlaybackController {
        &self.playback
    }

    pub fn capture(&self) -> &CaptureSession {
        &self.capture
    }

    // -- user actions -------------------------------------------------------

    pub fn toggle_play(&mut self) -> PlaybackState {
        self.playback.toggle_play(self.engine.as_mut())
    }

    pub fn evaluate(&mut self) -> bool {
        self.playback.evaluate(self.engine.as_mut())
    }

    /// Start or stop recording, independent of playback state.
    ///
    /// Starting still needs a ready graph; a not-ready graph is returned as
    /// an error with nothing changed.
    pub fn toggle_recording(&mut self) -> Result<RecordingToggle, CaptureError> {
        match self.capture.state() {
            RecordingState::Idle => {
                let graph = AudioGraphHandle::new(self.engine.as_ref());
                match self.capture.start_recording(&graph) {
                    Ok(StartOutcome::Started { mime_type }) => {
                        Ok(RecordingToggle::Started { mime_type })
                    }
                    Ok(StartOutcome::AlreadyRecording) => Ok(RecordingToggle::Ignored),
                    Err(e) => {
                        warn!("Recording not started: {}", e);
                        Err(e)
                    }
                }
            }
            RecordingState::Recording => Ok(match self.capture.stop_recording(Utc::now()) {
                StopOutcome::Requested => RecordingToggle::StopRequested,
                StopOutcome::Finished(report) => RecordingToggle::Saved(report),
                StopOutcome::AlreadyRequested | StopOutcome::Idle => RecordingToggle::Ignored,
            }),
        }
    }

    /// Build a permalink for the active code and hand it to the share
    /// target. Returns the link, or `None` when there is no code.
    pub fn share(&mut self) -> Option<String> {
        let Some(code) = self.playback.active_code() else {
            debug!("Share ignored: no active code");
            return None;
        };
        let url = share::permalink(&self.share_base_url, code);
        match self.share_target.share(&url) {
            Ok(()) => {
                info!("Permalink shared");
                Some(url)
            }
            Err(e) => {
                error!("Share failed: {:#}", e);
                None
            }
        }
    }

    // -- collaborator callbacks --------------------------------------------

    pub fn on_editor_change(&mut self, change: EditorChange) {
        self.playback.apply_editor_change(change);
    }

    pub fn on_engine_started(&mut self) -> bool {
        self.playback.on_engine_started()
    }

    pub fn on_engine_start_failed(&mut self, reason: &str) -> bool {
        self.playback.on_engine_start_failed(reason)
    }

    pub fn on_engine_stopped(&mut self) -> bool {
        self.playback.on_engine_stopped()
    }

    pub fn on_recorder_data(&mut self, chunk: Vec<u8>) {
        self.capture.on_data(chunk);
    }

    pub fn on_recorder_stopped(&mut self) -> Option<TeardownReport> {
        self.capture.on_recorder_stopped(Utc::now())
    }

    /// Stop everything before the host goes away. A recording whose stop
    /// cannot complete any more is torn down with what it has.
    pub fn shutdown(&mut self) -> Option<TeardownReport> {
        self.playback.force_stop(self.engine.as_mut());
        match self.capture.stop_recording(Utc::now()) {
            StopOutcome::Finished(report) => Some(report),
            StopOutcome::Idle => None,
            StopOutcome::Requested | StopOutcome::AlreadyRequested => {
                self.capture.on_recorder_stopped(Utc::now())
            }
        }
    }
}
