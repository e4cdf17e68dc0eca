//! Read-only view of the synthesis engine's audio graph.
//!
//! The engine creates the audio context lazily, so "not ready" is the normal
//! state until playback has started at least once. Nothing here creates,
//! mutates or tears down graph objects.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::SynthEngine;

/// Opaque handle to the engine's live audio context.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AudioContext(String);

impl AudioContext {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

/// Opaque handle to the node carrying the final mixed signal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutputNode(String);

impl OutputNode {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OutputNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The engine's output controller. It can exist before its output node does.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputController {
    pub output_node: Option<OutputNode>,
}

/// Why the graph cannot be tapped right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("audio system not ready, start playback first")]
    ContextNotReady,
    #[error("could not find the audio output node")]
    OutputNodeMissing,
}

/// A context and output node that were both present at the same moment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadyGraph {
    pub context: AudioContext,
    pub output: OutputNode,
}

/// Thin accessor over the engine's graph collaborator.
pub struct AudioGraphHandle<'a> {
    engine: &'a dyn SynthEngine,
}

impl<'a> AudioGraphHandle<'a> {
    pub fn new(engine: &'a dyn SynthEngine) -> Self {
        Self { engine }
    }

    pub fn context(&self) -> Result<AudioContext, GraphError> {
        self.engine
            .audio_context()
            .ok_or(GraphError::ContextNotReady)
    }

    /// A missing controller means the engine has not initialized yet; a
    /// controller without a node is reported separately.
    pub fn output_node(&self) -> Result<OutputNode, GraphError> {
        let controller = self
            .engine
            .output_controller()
            .ok_or(GraphError::ContextNotReady)?;
        controller.output_node.ok_or(GraphError::OutputNodeMissing)
    }

    /// Context first, then output node.
    pub fn ready(&self) -> Result<ReadyGraph, GraphError> {
        let context = self.context()?;
        let output = self.output_node()?;
        Ok(ReadyGraph { context, output })
    }
}
