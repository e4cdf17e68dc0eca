//! Recording of the live audio output.
//!
//! A [`CaptureSession`] owns at most one active recording. Starting taps the
//! engine's output node into a capture-only sink and starts the recorder.
//! Stopping is two-phase: the recorder is asked to stop, and its completion
//! (`on_recorder_stopped`) assembles the artifact, hands it to the download
//! target, releases the handle, detaches the tap and returns to idle.

pub mod artifact;
pub mod backend;

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::downloads::DownloadTarget;
use crate::graph::{AudioGraphHandle, GraphError, OutputNode};

pub use artifact::{Artifact, ArtifactNaming};
pub use backend::{select_mime_type, CaptureBackend, RecorderState, SinkId};

/// Whether output capture is active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordingState {
    #[default]
    Idle,
    Recording,
}

impl std::fmt::Display for RecordingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Recording => write!(f, "recording"),
        }
    }
}

/// A start request that aborted without changing state.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error("capture backend failed: {0:#}")]
    Backend(anyhow::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    Started { mime_type: String },
    AlreadyRecording,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopOutcome {
    /// Nothing was recording.
    Idle,
    /// The recorder was asked to stop; teardown follows its completion.
    Requested,
    /// A stop is already in flight.
    AlreadyRequested,
    /// The recorder was already inactive, so teardown ran immediately.
    Finished(TeardownReport),
}

/// What happened during teardown. Every step is attempted regardless of
/// earlier failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeardownReport {
    pub filename: String,
    pub bytes: usize,
    pub chunks: usize,
    pub path: Option<PathBuf>,
    pub detached: bool,
}

impl TeardownReport {
    pub fn downloaded(&self) -> bool {
        self.path.is_some()
    }

    /// The tap could not be removed cleanly.
    pub fn degraded(&self) -> bool {
        !self.detached
    }
}

/// The tap and data of the recording in progress.
struct ActiveCapture {
    output: OutputNode,
    sink: SinkId,
    mime_type: String,
    chunks: Vec<Vec<u8>>,
    stop_requested: bool,
}

pub struct CaptureSession {
    backend: Box<dyn CaptureBackend>,
    downloads: Box<dyn DownloadTarget>,
    naming: ArtifactNaming,
    mime_preferences: Vec<String>,
    active: Option<ActiveCapture>,
}

impl CaptureSession {
    pub fn new(
        backend: Box<dyn CaptureBackend>,
        downloads: Box<dyn DownloadTarget>,
        naming: ArtifactNaming,
        mime_preferences: Vec<String>,
    ) -> Self {
        Self {
            backend,
            downloads,
            naming,
            mime_preferences,
            active: None,
        }
    }

    pub fn state(&self) -> RecordingState {
        if self.active.is_some() {
            RecordingState::Recording
        } else {
            RecordingState::Idle
        }
    }

    pub fn stop_requested(&self) -> bool {
        self.active.as_ref().is_some_and(|a| a.stop_requested)
    }

    /// Encoding of the current recording.
    pub fn mime_type(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.mime_type.as_str())
    }

    pub fn chunk_count(&self) -> usize {
        self.active.as_ref().map_or(0, |a| a.chunks.len())
    }

    /// Tap the output node and start the recorder.
    ///
    /// On error nothing is left connected and the state stays `Idle`.
    pub fn start_recording(
        &mut self,
        graph: &AudioGraphHandle<'_>,
    ) -> Result<StartOutcome, CaptureError> {
        if self.active.is_some() {
            debug!("Start recording ignored: already recording");
            return Ok(StartOutcome::AlreadyRecording);
        }

        let ready = graph.ready()?;

        let sink = self
            .backend
            .open_sink(&ready.context)
            .map_err(CaptureError::Backend)?;
        self.backend
            .tap(&ready.output, sink)
            .map_err(CaptureError::Backend)?;

        let mime_type = select_mime_type(self.backend.as_ref(), &self.mime_preferences);
        if let Err(e) = self.backend.start_recorder(sink, &mime_type) {
            if let Err(detach_err) = self.backend.detach(&ready.output, sink) {
                warn!("Error disconnecting recorder: {:#}", detach_err);
            }
            return Err(CaptureError::Backend(e));
        }

        info!(mime = %mime_type, %sink, output = %ready.output, "Recording started");
        self.active = Some(ActiveCapture {
            output: ready.output,
            sink,
            mime_type: mime_type.clone(),
            chunks: Vec::new(),
            stop_requested: false,
        });
        Ok(StartOutcome::Started { mime_type })
    }

    /// Recorder flush. Empty chunks and chunks with no recording are dropped.
    pub fn on_data(&mut self, chunk: Vec<u8>) {
        if chunk.is_empty() {
            return;
        }
        match self.active.as_mut() {
            Some(active) => active.chunks.push(chunk),
            None => debug!(bytes = chunk.len(), "Dropping recorder data while idle"),
        }
    }

    /// Ask the recorder to stop.
    ///
    /// Teardown runs here instead of waiting for a completion when the
    /// recorder is already inactive or refuses the stop request.
    pub fn stop_recording(&mut self, now: DateTime<Utc>) -> StopOutcome {
        let Some(active) = self.active.as_mut() else {
            debug!("Stop recording ignored: not recording");
            return StopOutcome::Idle;
        };
        if active.stop_requested {
            debug!("Stop recording ignored: stop already requested");
            return StopOutcome::AlreadyRequested;
        }
        active.stop_requested = true;

        if self.backend.recorder_state().is_terminal() {
            debug!("Recorder already inactive, tearing down now");
            return self.finish(now);
        }
        match self.backend.request_stop() {
            Ok(()) => {
                info!("Recording stop requested");
                StopOutcome::Requested
            }
            Err(e) => {
                error!("Recorder refused stop: {:#}", e);
                self.finish(now)
            }
        }
    }

    /// Recorder stop completion: run teardown and return to idle.
    pub fn on_recorder_stopped(&mut self, now: DateTime<Utc>) -> Option<TeardownReport> {
        if self.active.is_none() {
            debug!("Recorder stop completion ignored: not recording");
            return None;
        }
        match self.finish(now) {
            StopOutcome::Finished(report) => Some(report),
            _ => None,
        }
    }

    /// assemble -> finalize -> download -> release -> detach -> idle
    fn finish(&mut self, now: DateTime<Utc>) -> StopOutcome {
        let Some(active) = self.active.take() else {
            return StopOutcome::Idle;
        };
        let ActiveCapture {
            output,
            sink,
            chunks,
            ..
        } = active;

        let chunk_count = chunks.len();
        let artifact = self.naming.assemble(chunks, now);
        if artifact.bytes.is_empty() {
            warn!("Recording produced no audio data");
        }

        let mut path = None;
        match self.downloads.finalize_artifact(&artifact) {
            Ok(handle) => {
                match self.downloads.download(&handle, &artifact.filename) {
                    Ok(saved) => path = Some(saved),
                    Err(e) => error!("Failed to download recording: {:#}", e),
                }
                self.downloads.release_handle(&handle);
            }
            Err(e) => error!("Failed to finalize recording: {:#}", e),
        }

        let detached = match self.backend.detach(&output, sink) {
            Ok(()) => true,
            Err(e) => {
                warn!("Error disconnecting recorder: {:#}", e);
                false
            }
        };

        info!(
            filename = %artifact.filename,
            bytes = artifact.bytes.len(),
            chunks = chunk_count,
            detached,
            "Recording finished"
        );
        StopOutcome::Finished(TeardownReport {
            filename: artifact.filename,
            bytes: artifact.bytes.len(),
            chunks: chunk_count,
            path,
            detached,
        })
    }
}
