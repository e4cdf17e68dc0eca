//! Interface to the pattern/synthesis engine.
//!
//! The engine is the sole producer of sound. This crate only asks it to
//! start, stop and evaluate code, and observes its audio graph.

use crate::graph::{AudioContext, OutputController};

/// The synthesis engine collaborator.
///
/// `start` only requests a start; the engine confirms later through
/// [`crate::coordinator::SessionCoordinator::on_engine_started`].
pub trait SynthEngine {
    fn start(&mut self) -> anyhow::Result<()>;

    fn stop(&mut self) -> anyhow::Result<()>;

    /// Apply `code` to the running pattern.
    fn evaluate(&mut self, code: &str) -> anyhow::Result<()>;

    /// The live audio context, or `None` before it has been created.
    fn audio_context(&self) -> Option<AudioContext>;

    fn output_controller(&self) -> Option<OutputController>;
}
