//! Play/stop state and the "dirty since last evaluation" flag.

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::engine::SynthEngine;

/// Whether sound is currently emitting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    #[default]
    Stopped,
    /// Start requested, waiting for the engine to confirm.
    Pending,
    Started,
}

impl std::fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stopped => write!(f, "stopped"),
            Self::Pending => write!(f, "pending"),
            Self::Started => write!(f, "started"),
        }
    }
}

/// Change notification from the code editor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorChange {
    pub is_dirty: bool,
    #[serde(default)]
    pub active_code: Option<String>,
}

#[derive(Debug, Default)]
pub struct PlaybackController {
    state: PlaybackState,
    is_dirty: bool,
    active_code: Option<String>,
}

impl PlaybackController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_dirty(&self) -> bool {
        self.is_dirty
    }

    pub fn active_code(&self) -> Option<&str> {
        self.active_code.as_deref()
    }

    pub fn can_evaluate(&self) -> bool {
        self.is_dirty && self.active_code.is_some()
    }

    /// `Stopped -> Pending` (engine asked to start), `Started -> Stopped`.
    /// Ignored while `Pending`.
    pub fn toggle_play(&mut self, engine: &mut dyn SynthEngine) -> PlaybackState {
        match self.state {
            PlaybackState::Stopped => {
                self.state = PlaybackState::Pending;
                if let Err(e) = engine.start() {
                    error!("Engine failed to start: {:#}", e);
                    self.state = PlaybackState::Stopped;
                }
            }
            PlaybackState::Pending => debug!("Toggle play ignored: start pending"),
            PlaybackState::Started => {
                if let Err(e) = engine.stop() {
                    warn!("Engine stop reported an error: {:#}", e);
                }
                self.state = PlaybackState::Stopped;
                info!("Playback stopped");
            }
        }
        self.state
    }

    /// Stop from any state, including while a start is still pending.
    /// Returns whether the engine was asked to stop.
    pub fn force_stop(&mut self, engine: &mut dyn SynthEngine) -> bool {
        if self.state == PlaybackState::Stopped {
            return false;
        }
        if let Err(e) = engine.stop() {
            warn!("Engine stop reported an error: {:#}", e);
        }
        info!(from = %self.state, "Playback stopped");
        self.state = PlaybackState::Stopped;
        true
    }

    /// Engine confirmed a start. Returns whether the state changed.
    pub fn on_engine_started(&mut self) -> bool {
        if self.state != PlaybackState::Pending {
            debug!(state = %self.state, "Unexpected engine start confirmation");
            return false;
        }
        self.state = PlaybackState::Started;
        info!("Playback started");
        true
    }

    pub fn on_engine_start_failed(&mut self, reason: &str) -> bool {
        if self.state != PlaybackState::Pending {
            return false;
        }
        error!(reason, "Engine start failed");
        self.state = PlaybackState::Stopped;
        true
    }

    /// The engine stopped on its own.
    pub fn on_engine_stopped(&mut self) -> bool {
        if self.state == PlaybackState::Stopped {
            return false;
        }
        info!(from = %self.state, "Engine stopped");
        self.state = PlaybackState::Stopped;
        true
    }

    pub fn apply_editor_change(&mut self, change: EditorChange) {
        self.is_dirty = change.is_dirty;
        self.active_code = change.active_code;
    }

    /// Forward the active code to the engine and clear the dirty flag.
    /// Returns `false` without calling the engine when there is nothing to
    /// evaluate; a failed evaluation keeps the code dirty.
    pub fn evaluate(&mut self, engine: &mut dyn SynthEngine) -> bool {
        if !self.is_dirty {
            debug!("Evaluate ignored: code is clean");
            return false;
        }
        let Some(code) = self.active_code.as_deref() else {
            debug!("Evaluate ignored: no active code");
            return false;
        };
        match engine.evaluate(code) {
            Ok(()) => {
                self.is_dirty = false;
                info!(chars = code.len(), "Code evaluated");
                true
            }
            Err(e) => {
                error!("Evaluation failed: {:#}", e);
                false
            }
        }
    }
}
