//! Scripted collaborators shared by unit tests.

use std::cell::{RefCell, RefMut};
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::bail;

use crate::capture::{Artifact, CaptureBackend, RecorderState, SinkId};
use crate::downloads::{ArtifactHandle, DownloadTarget};
use crate::engine::SynthEngine;
use crate::graph::{AudioContext, OutputController, OutputNode};
use crate::share::ShareTarget;

#[derive(Debug, Default)]
pub(crate) struct RigState {
    pub calls: Vec<String>,
    pub context: Option<AudioContext>,
    pub controller: Option<OutputController>,
    pub supported: Vec<String>,
    pub recorder: RecorderState,
    pub open_taps: usize,
    pub live_handles: Vec<(String, Vec<u8>)>,
    pub downloaded: Vec<(String, Vec<u8>)>,
    pub shared: Vec<String>,
    pub evaluated: Vec<String>,
    pub fail_start: bool,
    pub fail_stop: bool,
    pub fail_evaluate: bool,
    pub fail_recorder_start: bool,
    pub fail_request_stop: bool,
    pub fail_finalize: bool,
    pub fail_download: bool,
    pub fail_detach: bool,
    next_sink: u32,
    next_handle: u32,
}

/// One fake host implementing every collaborator trait over shared state.
#[derive(Debug, Clone, Default)]
pub(crate) struct Rig(Rc<RefCell<RigState>>);

impl Rig {
    /// A rig whose engine has already created its graph.
    pub fn ready() -> Self {
        let rig = Self::default();
        {
            let mut st = rig.state();
            st.context = Some(AudioContext::new("ctx-1"));
            st.controller = Some(OutputController {
                output_node: Some(OutputNode::new("destination-gain")),
            });
            st.supported = vec!["audio/webm;codecs=opus".into(), "audio/webm".into()];
        }
        rig
    }

    pub fn state(&self) -> RefMut<'_, RigState> {
        self.0.borrow_mut()
    }

    pub fn calls(&self) -> Vec<String> {
        self.0.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    fn record(&self, call: String) {
        self.state().calls.push(call);
    }
}

impl SynthEngine for Rig {
    fn start(&mut self) -> anyhow::Result<()> {
        self.record("engine.start".into());
        if self.state().fail_start {
            bail!("engine failed to start");
        }
        Ok(())
    }

    fn stop(&mut self) -> anyhow::Result<()> {
        self.record("engine.stop".into());
        if self.state().fail_stop {
            bail!("engine failed to stop");
        }
        Ok(())
    }

    fn evaluate(&mut self, code: &str) -> anyhow::Result<()> {
        self.record(format!("engine.evaluate {code}"));
        let mut st = self.state();
        if st.fail_evaluate {
            bail!("syntax error");
        }
        st.evaluated.push(code.to_string());
        Ok(())
    }

    fn audio_context(&self) -> Option<AudioContext> {
        self.0.borrow().context.clone()
    }

    fn output_controller(&self) -> Option<OutputController> {
        self.0.borrow().controller.clone()
    }
}

impl CaptureBackend for Rig {
    fn is_type_supported(&self, mime_type: &str) -> bool {
        self.0.borrow().supported.iter().any(|m| m == mime_type)
    }

    fn open_sink(&mut self, context: &AudioContext) -> anyhow::Result<SinkId> {
        self.record(format!("sink.open {}", context.id()));
        let mut st = self.state();
        st.next_sink += 1;
        Ok(SinkId(st.next_sink))
    }

    fn tap(&mut self, output: &OutputNode, sink: SinkId) -> anyhow::Result<()> {
        self.record(format!("tap {output} {sink}"));
        self.state().open_taps += 1;
        Ok(())
    }

    fn detach(&mut self, output: &OutputNode, sink: SinkId) -> anyhow::Result<()> {
        self.record(format!("detach {output} {sink}"));
        let mut st = self.state();
        // the node is gone either way
        st.open_taps = st.open_taps.saturating_sub(1);
        if st.fail_detach {
            bail!("InvalidAccessError: node not connected");
        }
        Ok(())
    }

    fn start_recorder(&mut self, sink: SinkId, mime_type: &str) -> anyhow::Result<()> {
        self.record(format!("recorder.start {sink} {mime_type}"));
        let mut st = self.state();
        if st.fail_recorder_start {
            bail!("NotSupportedError");
        }
        st.recorder = RecorderState::Recording;
        Ok(())
    }

    fn request_stop(&mut self) -> anyhow::Result<()> {
        self.record("recorder.stop".into());
        let mut st = self.state();
        if st.fail_request_stop {
            bail!("InvalidStateError");
        }
        st.recorder = RecorderState::Inactive;
        Ok(())
    }

    fn recorder_state(&self) -> RecorderState {
        self.0.borrow().recorder
    }
}

impl DownloadTarget for Rig {
    fn finalize_artifact(&mut self, artifact: &Artifact) -> anyhow::Result<ArtifactHandle> {
        let mut st = self.state();
        st.next_handle += 1;
        let handle = format!("handle-{}", st.next_handle);
        st.calls.push(format!("finalize {handle}"));
        if st.fail_finalize {
            bail!("out of memory");
        }
        st.live_handles.push((handle.clone(), artifact.bytes.clone()));
        Ok(ArtifactHandle(handle))
    }

    fn download(&mut self, handle: &ArtifactHandle, filename: &str) -> anyhow::Result<PathBuf> {
        let mut st = self.state();
        st.calls.push(format!("download {} {filename}", handle.0));
        if st.fail_download {
            bail!("download blocked");
        }
        let bytes = st
            .live_handles
            .iter()
            .find(|(h, _)| *h == handle.0)
            .map(|(_, b)| b.clone())
            .unwrap_or_default();
        st.downloaded.push((filename.to_string(), bytes));
        Ok(PathBuf::from("/downloads").join(filename))
    }

    fn release_handle(&mut self, handle: &ArtifactHandle) {
        let mut st = self.state();
        st.calls.push(format!("release {}", handle.0));
        st.live_handles.retain(|(h, _)| *h != handle.0);
    }
}

impl ShareTarget for Rig {
    fn share(&mut self, url: &str) -> anyhow::Result<()> {
        self.record(format!("share {url}"));
        self.state().shared.push(url.to_string());
        Ok(())
    }
}
