/// PCM format parameters for a captured audio buffer.
///
/// Defaults match the recorder variants: 44.1 kHz, 16-bit, mono.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioFormat {
    /// Sample rate in Hz.
    pub sample_rate: u32,

    /// Bit depth for PCM data. Valid values: 16, 24, 32.
    pub bit_depth: u16,

    /// Number of interleaved channels. Valid values: 1, 2.
    pub channels: u16,
}

impl AudioFormat {
    pub fn validate(&self) -> Result<(), String> {
        if self.sample_rate == 0 {
            return Err("sample rate must be positive".into());
        }
        if ![16, 24, 32].contains(&self.bit_depth) {
            return Err(format!("unsupported bit depth: {}", self.bit_depth));
        }
        if ![1, 2].contains(&self.channels) {
            return Err(format!("unsupported channel count: {}", self.channels));
        }
        Ok(())
    }

    /// Bytes of PCM data per second of audio.
    pub fn byte_rate(&self) -> u32 {
        self.sample_rate * self.channels as u32 * self.bit_depth as u32 / 8
    }

    /// Bytes per interleaved frame (all channels, one sample each).
    pub fn block_align(&self) -> u16 {
        self.channels * self.bit_depth / 8
    }
}

impl Default for AudioFormat {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            bit_depth: 16,
            channels: 1,
        }
    }
}

/// Configuration for a pipeline session.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Format expected from the audio capture widget.
    pub audio: AudioFormat,

    /// Bound on a single webhook dispatch. One attempt, no retry.
    pub webhook_timeout_secs: u64,

    /// Failure detail surfaced to the user is truncated to this many chars.
    pub max_error_detail: usize,
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.audio.validate()?;
        if self.webhook_timeout_secs == 0 {
            return Err("webhook timeout must be positive".into());
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            audio: AudioFormat::default(),
            webhook_timeout_secs: 30,
            max_error_detail: 300,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_bad_bit_depth() {
        let format = AudioFormat {
            bit_depth: 12,
            ..Default::default()
        };
        assert!(format.validate().is_err());
    }

    #[test]
    fn rejects_zero_sample_rate() {
        let format = AudioFormat {
            sample_rate: 0,
            ..Default::default()
        };
        assert!(format.validate().is_err());
    }

    #[test]
    fn byte_rate_mono_16bit() {
        let format = AudioFormat::default();
        assert_eq!(format.byte_rate(), 88_200);
        assert_eq!(format.block_align(), 2);
    }
}
