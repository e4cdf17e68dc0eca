//! NeuroRAVE session core.
//!
//! Arbitrates playback, code evaluation and recording of the live output
//! for the live-coding environment. The engine, editor and media platform are
//! collaborators behind traits; [`host::HostBridge`] binds them to a UI host
//! over JSON-line IPC.

pub mod capture;
pub mod config;
pub mod coordinator;
pub mod downloads;
pub mod engine;
pub mod graph;
pub mod host;
pub mod ipc;
pub mod logger;
pub mod playback;
pub mod randomness;
pub mod runtime;
pub mod share;

#[cfg(test)]
pub(crate) mod test_support;

pub use capture::{CaptureSession, RecordingState};
pub use coordinator::{SessionCoordinator, SessionSnapshot};
pub use playback::{PlaybackController, PlaybackState};
