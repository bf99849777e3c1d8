use crate::models::capture::CaptureResult;
use crate::models::error::PipelineError;

/// Interface for capture adapters.
///
/// Implemented by whatever sits between the pipeline and the user-facing
/// widget: the microphone-recorder bridge, a file-upload control, a scripted
/// source in tests. `Empty` from [`try_capture`](Self::try_capture) means
/// "nothing yet" and is always re-checkable; errors are reserved for a
/// source that is actually broken (no device, no permission).
pub trait CaptureSource: Send + Sync {
    /// Whether this source can currently produce captures at all.
    fn is_available(&self) -> bool;

    /// Take the completed capture if one is ready.
    fn try_capture(&mut self) -> Result<CaptureResult, PipelineError>;
}
