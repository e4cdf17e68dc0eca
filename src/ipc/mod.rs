//! IPC protocol types for communication with the UI host.
//!
//! Events use `{"event": "<name>", "data": {...}}` format (core -> host).
//! Commands use `{"command": "<name>", ...}` format (host -> core).

pub mod bridge;

use serde::{Deserialize, Serialize};

use crate::capture::SinkId;
use crate::coordinator::SessionSnapshot;
use crate::graph::{AudioContext, OutputNode};

// ---------------------------------------------------------------------------
// Events: core -> host (stdout)
// ---------------------------------------------------------------------------

/// All events emitted to the host via stdout as JSON lines.
///
/// Serialized as `{"event": "<variant>", "data": {...}}`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data")]
#[serde(rename_all = "snake_case")]
pub enum SessionEvent {
    Starting {},
    Ready {},
    Pong {},
    State {
        snapshot: SessionSnapshot,
    },
    EngineStart {},
    EngineStop {},
    EngineEvaluate {
        code: String,
    },
    SinkOpen {
        #[serde(rename = "contextId")]
        context_id: AudioContext,
        sink: SinkId,
    },
    TapConnect {
        #[serde(rename = "outputNode")]
        output_node: OutputNode,
        sink: SinkId,
    },
    TapDetach {
        #[serde(rename = "outputNode")]
        output_node: OutputNode,
        sink: SinkId,
    },
    RecorderStart {
        sink: SinkId,
        #[serde(rename = "mimeType")]
        mime_type: String,
    },
    RecorderStop {},
    RecordingSaved {
        filename: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        path: Option<String>,
        bytes: usize,
        degraded: bool,
    },
    ShareLink {
        url: String,
    },
    Error {
        message: String,
    },
    Stopping {},
}

// ---------------------------------------------------------------------------
// Commands: host -> core (stdin)
// ---------------------------------------------------------------------------

/// All commands received from the host via stdin as JSON lines.
///
/// Deserialized from `{"command": "<variant>", ...}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "command")]
#[serde(rename_all = "snake_case")]
pub enum SessionCommand {
    Ping {},
    TogglePlay {},
    Evaluate {},
    ToggleRecording {},
    Share {},
    EditorChange {
        #[serde(rename = "isDirty")]
        is_dirty: bool,
        #[serde(rename = "activeCode", default)]
        active_code: Option<String>,
    },
    EngineStarted {},
    EngineStartFailed {
        #[serde(default)]
        message: String,
    },
    EngineStopped {},
    GraphReady {
        #[serde(rename = "contextId")]
        context_id: AudioContext,
        #[serde(rename = "outputNode", default)]
        output_node: Option<OutputNode>,
    },
    GraphLost {},
    Capabilities {
        #[serde(rename = "supportedMimeTypes", default)]
        supported_mime_types: Vec<String>,
    },
    /// Base64-encoded recorder chunk.
    RecorderData {
        data: String,
    },
    RecorderStopped {},
    Status {},
    Stop {},
}
