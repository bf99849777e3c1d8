use super::config::AudioFormat;
use crate::transform::dataset::Dataset;

/// MIME kind of a completed capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Wav,
    Csv,
}

impl MediaKind {
    pub fn mime(&self) -> &'static str {
        match self {
            Self::Wav => "audio/wav",
            Self::Csv => "text/csv",
        }
    }
}

/// Outcome of a capture-adapter poll.
///
/// `Empty` is the normal "nothing yet" answer: the widget has not produced
/// a buffer, or the user cancelled before any audio arrived. Callers
/// re-check; they never treat it as a failure.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureResult {
    Empty,
    Audio { pcm: Vec<u8>, format: AudioFormat },
    Table { name: String, dataset: Dataset },
}

impl CaptureResult {
    /// Builds an audio capture, normalizing a zero-byte buffer to `Empty`.
    pub fn audio(pcm: Vec<u8>, format: AudioFormat) -> Self {
        if pcm.is_empty() {
            Self::Empty
        } else {
            Self::Audio { pcm, format }
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn kind(&self) -> Option<MediaKind> {
        match self {
            Self::Empty => None,
            Self::Audio { .. } => Some(MediaKind::Wav),
            Self::Table { .. } => Some(MediaKind::Csv),
        }
    }

    /// Size of the raw captured payload in bytes.
    pub fn size_bytes(&self) -> u64 {
        match self {
            Self::Empty => 0,
            Self::Audio { pcm, .. } => pcm.len() as u64,
            Self::Table { dataset, .. } => dataset.approx_size_bytes(),
        }
    }

    /// The record quantity for this capture: duration in seconds for audio,
    /// row count for tables.
    pub fn quantity(&self) -> f64 {
        match self {
            Self::Empty => 0.0,
            Self::Audio { pcm, format } => pcm.len() as f64 / format.byte_rate() as f64,
            Self::Table { dataset, .. } => dataset.row_count() as f64,
        }
    }
}

impl Default for CaptureResult {
    fn default() -> Self {
        Self::Empty
    }
}
