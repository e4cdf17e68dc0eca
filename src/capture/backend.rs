//! Platform media capabilities used by a capture session.

use serde::{Deserialize, Serialize};

use crate::graph::{AudioContext, OutputNode};

/// Used when no preference list is configured at all.
pub const FALLBACK_MIME_TYPE: &str = "audio/webm";

/// Identifier of a capture-only destination node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SinkId(pub u32);

impl std::fmt::Display for SinkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sink-{}", self.0)
    }
}

/// State of the underlying media recorder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RecorderState {
    #[default]
    Inactive,
    Recording,
    Paused,
}

impl RecorderState {
    /// An inactive recorder will not fire another stop completion.
    pub fn is_terminal(self) -> bool {
        self == Self::Inactive
    }
}

/// Sink, tap and recorder operations of the host media platform.
///
/// Recorder output arrives asynchronously through
/// [`super::CaptureSession::on_data`], and a requested stop completes through
/// [`super::CaptureSession::on_recorder_stopped`].
pub trait CaptureBackend {
    fn is_type_supported(&self, mime_type: &str) -> bool;

    /// Create a capture-only destination inside `context`.
    fn open_sink(&mut self, context: &AudioContext) -> anyhow::Result<SinkId>;

    /// Connect `output` to `sink` without touching the output's existing routing.
    fn tap(&mut self, output: &OutputNode, sink: SinkId) -> anyhow::Result<()>;

    /// Remove only the `output -> sink` connection.
    fn detach(&mut self, output: &OutputNode, sink: SinkId) -> anyhow::Result<()>;

    fn start_recorder(&mut self, sink: SinkId, mime_type: &str) -> anyhow::Result<()>;

    fn request_stop(&mut self) -> anyhow::Result<()>;

    fn recorder_state(&self) -> RecorderState;
}

/// Pick the first supported encoding from a descending preference list.
///
/// The last preference is the generic container and is used even when the
/// runtime does not claim support for it.
pub fn select_mime_type(backend: &dyn CaptureBackend, preferences: &[String]) -> String {
    preferences
        .iter()
        .find(|mime| backend.is_type_supported(mime))
        .or_else(|| preferences.last())
        .cloned()
        .unwrap_or_else(|| FALLBACK_MIME_TYPE.to_string())
}
