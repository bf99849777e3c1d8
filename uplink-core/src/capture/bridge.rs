use std::sync::Arc;

use parking_lot::Mutex;

use super::source::CaptureSource;
use crate::models::capture::CaptureResult;
use crate::models::config::AudioFormat;
use crate::models::error::PipelineError;

/// Shared-slot bridge between an external capture widget and the session.
///
/// The widget side holds a clone and publishes a finished buffer from its
/// own thread; the session side polls with `try_capture`. The slot holds at
/// most one result; a new capture overwrites the previous one, so
/// re-recording replaces the buffer.
#[derive(Clone, Default)]
pub struct WidgetBridge {
    slot: Arc<Mutex<Option<CaptureResult>>>,
}

impl WidgetBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a completed capture from the widget side.
    pub fn publish(&self, result: CaptureResult) {
        *self.slot.lock() = Some(result);
    }

    /// Publish raw PCM from the recorder widget. Zero bytes (cancel before
    /// any audio, or no device permission) publishes `Empty`.
    pub fn publish_audio(&self, pcm: Vec<u8>, format: AudioFormat) {
        self.publish(CaptureResult::audio(pcm, format));
    }
}

impl CaptureSource for WidgetBridge {
    fn is_available(&self) -> bool {
        true
    }

    fn try_capture(&mut self) -> Result<CaptureResult, PipelineError> {
        Ok(self.slot.lock().take().unwrap_or(CaptureResult::Empty))
    }
}
