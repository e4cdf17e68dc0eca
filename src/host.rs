//! Binding of the collaborator traits to the IPC host.
//!
//! The UI host owns the real engine and media APIs. `HostBridge` turns each
//! request into an outgoing [`SessionEvent`] and keeps the bits of host state
//! the core needs to answer synchronously (graph readiness, supported
//! encodings, recorder state). Clones share that state.

use std::cell::RefCell;
use std::rc::Rc;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::capture::{CaptureBackend, RecorderState, SinkId};
use crate::engine::SynthEngine;
use crate::graph::{AudioContext, OutputController, OutputNode};
use crate::ipc::SessionEvent;
use crate::share::ShareTarget;

#[derive(Debug, Default)]
struct HostState {
    context: Option<AudioContext>,
    controller: Option<OutputController>,
    supported_mime_types: Vec<String>,
    recorder: RecorderState,
    next_sink: u32,
}

#[derive(Debug, Clone)]
pub struct HostBridge {
    state: Rc<RefCell<HostState>>,
    events: mpsc::UnboundedSender<SessionEvent>,
}

impl HostBridge {
    pub fn new(events: mpsc::UnboundedSender<SessionEvent>) -> Self {
        Self {
            state: Rc::new(RefCell::new(HostState::default())),
            events,
        }
    }

    fn emit(&self, event: SessionEvent) -> anyhow::Result<()> {
        self.events
            .send(event)
            .map_err(|_| anyhow::anyhow!("Host event channel closed"))
    }

    /// The engine created its graph. `output` may still be missing.
    pub fn set_graph(&self, context: AudioContext, output: Option<OutputNode>) {
        info!(context = context.id(), has_output = output.is_some(), "Audio graph ready");
        let mut st = self.state.borrow_mut();
        st.context = Some(context);
        st.controller = Some(OutputController {
            output_node: output,
        });
    }

    pub fn clear_graph(&self) {
        info!("Audio graph lost");
        let mut st = self.state.borrow_mut();
        st.context = None;
        st.controller = None;
    }

    pub fn set_supported_mime_types(&self, mime_types: Vec<String>) {
        debug!(?mime_types, "Host capabilities updated");
        self.state.borrow_mut().supported_mime_types = mime_types;
    }

    /// The host's recorder fired its stop completion.
    pub fn mark_recorder_stopped(&self) {
        self.state.borrow_mut().recorder = RecorderState::Inactive;
    }
}

impl SynthEngine for HostBridge {
    fn start(&mut self) -> anyhow::Result<()> {
        self.emit(SessionEvent::EngineStart {})
    }

    fn stop(&mut self) -> anyhow::Result<()> {
        self.emit(SessionEvent::EngineStop {})
    }

    fn evaluate(&mut self, code: &str) -> anyhow::Result<()> {
        self.emit(SessionEvent::EngineEvaluate {
            code: code.to_string(),
        })
    }

    fn audio_context(&self) -> Option<AudioContext> {
        self.state.borrow().context.clone()
    }

    fn output_controller(&self) -> Option<OutputController> {
        self.state.borrow().controller.clone()
    }
}

impl CaptureBackend for HostBridge {
    fn is_type_supported(&self, mime_type: &str) -> bool {
        self.state
            .borrow()
            .supported_mime_types
            .iter()
            .any(|m| m == mime_type)
    }

    fn open_sink(&mut self, context: &AudioContext) -> anyhow::Result<SinkId> {
        let sink = {
            let mut st = self.state.borrow_mut();
            st.next_sink += 1;
            SinkId(st.next_sink)
        };
        self.emit(SessionEvent::SinkOpen {
            context_id: context.clone(),
            sink,
        })?;
        Ok(sink)
    }

    fn tap(&mut self, output: &OutputNode, sink: SinkId) -> anyhow::Result<()> {
        self.emit(SessionEvent::TapConnect {
            output_node: output.clone(),
            sink,
        })
    }

    fn detach(&mut self, output: &OutputNode, sink: SinkId) -> anyhow::Result<()> {
        self.emit(SessionEvent::TapDetach {
            output_node: output.clone(),
            sink,
        })
    }

    fn start_recorder(&mut self, sink: SinkId, mime_type: &str) -> anyhow::Result<()> {
        self.emit(SessionEvent::RecorderStart {
            sink,
            mime_type: mime_type.to_string(),
        })?;
        self.state.borrow_mut().recorder = RecorderState::Recording;
        Ok(())
    }

    fn request_stop(&mut self) -> anyhow::Result<()> {
        self.emit(SessionEvent::RecorderStop {})
    }

    fn recorder_state(&self) -> RecorderState {
        self.state.borrow().recorder
    }
}

impl ShareTarget for HostBridge {
    fn share(&mut self, url: &str) -> anyhow::Result<()> {
        self.emit(SessionEvent::ShareLink {
            url: url.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::AudioGraphHandle;

    fn drain(rx: &mut mpsc::UnboundedReceiver<SessionEvent>) -> Vec<SessionEvent> {
        let mut out = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            out.push(ev);
        }
        out
    }

    #[test]
    fn graph_readiness_follows_host_reports() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let host = HostBridge::new(tx);
        assert!(AudioGraphHandle::new(&host).ready().is_err());

        host.set_graph(AudioContext::new("ctx"), Some(OutputNode::new("gain")));
        let ready = AudioGraphHandle::new(&host).ready().unwrap();
        assert_eq!(ready.output.id(), "gain");

        host.clear_graph();
        assert!(AudioGraphHandle::new(&host).context().is_err());
    }

    #[test]
    fn capture_requests_become_events() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut host = HostBridge::new(tx);
        let out = OutputNode::new("gain");

        let sink = host.open_sink(&AudioContext::new("ctx")).unwrap();
        host.tap(&out, sink).unwrap();
        host.start_recorder(sink, "audio/webm").unwrap();
        assert_eq!(host.recorder_state(), RecorderState::Recording);
        host.request_stop().unwrap();
        // still recording until the host confirms
        assert_eq!(host.recorder_state(), RecorderState::Recording);
        host.mark_recorder_stopped();
        assert_eq!(host.recorder_state(), RecorderState::Inactive);
        host.detach(&out, sink).unwrap();

        let events = drain(&mut rx);
        assert_eq!(events.len(), 5);
        assert!(matches!(events[0], SessionEvent::SinkOpen { sink: SinkId(1), .. }));
        assert!(matches!(events[1], SessionEvent::TapConnect { .. }));
        assert!(matches!(events[2], SessionEvent::RecorderStart { .. }));
        assert!(matches!(events[3], SessionEvent::RecorderStop {}));
        assert!(matches!(events[4], SessionEvent::TapDetach { .. }));
    }

    #[test]
    fn sink_ids_are_monotonic() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut host = HostBridge::new(tx);
        let ctx = AudioContext::new("ctx");
        assert_eq!(host.open_sink(&ctx).unwrap(), SinkId(1));
        assert_eq!(host.open_sink(&ctx).unwrap(), SinkId(2));
    }

    #[test]
    fn closed_channel_is_an_error() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let mut host = HostBridge::new(tx);
        assert!(host.start().is_err());
        assert!(host.detach(&OutputNode::new("gain"), SinkId(1)).is_err());
    }

    #[test]
    fn supported_types_come_from_host() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let host = HostBridge::new(tx);
        assert!(!host.is_type_supported("audio/webm;codecs=opus"));
        host.set_supported_mime_types(vec!["audio/webm;codecs=opus".into()]);
        assert!(host.is_type_supported("audio/webm;codecs=opus"));
    }
}
