//! WAV container framing.
//!
//! Wraps raw PCM bytes from the capture widget in a standard 44-byte RIFF
//! header, and recovers the PCM plus its declared format from a framed
//! stream. Format: PCM (format code 1), little-endian.

use crate::models::config::AudioFormat;
use crate::models::error::PipelineError;

/// Size of the standard WAV RIFF header in bytes.
pub const WAV_HEADER_SIZE: usize = 44;

/// Generate a 44-byte WAV RIFF header.
///
/// Layout:
/// ```text
/// [0-3]    "RIFF"
/// [4-7]    file size - 8 (36 + data_size)
/// [8-11]   "WAVE"
/// [12-15]  "fmt "
/// [16-19]  16 (PCM format chunk size)
/// [20-21]  1 (PCM format code)
/// [22-23]  channels
/// [24-27]  sample_rate
/// [28-31]  byte_rate = sample_rate * channels * bit_depth / 8
/// [32-33]  block_align = channels * bit_depth / 8
/// [34-35]  bit_depth
/// [36-39]  "data"
/// [40-43]  data_size
/// ```
pub fn generate_wav_header(format: &AudioFormat, data_size: u32) -> [u8; WAV_HEADER_SIZE] {
    let byte_rate = format.byte_rate();
    let block_align = format.block_align();
    let chunk_size = 36 + data_size;

    let mut header = [0u8; WAV_HEADER_SIZE];

    // RIFF chunk descriptor
    header[0..4].copy_from_slice(b"RIFF");
    header[4..8].copy_from_slice(&chunk_size.to_le_bytes());
    header[8..12].copy_from_slice(b"WAVE");

    // fmt sub-chunk
    header[12..16].copy_from_slice(b"fmt ");
    header[16..20].copy_from_slice(&16u32.to_le_bytes()); // PCM format size
    header[20..22].copy_from_slice(&1u16.to_le_bytes()); // PCM format code
    header[22..24].copy_from_slice(&format.channels.to_le_bytes());
    header[24..28].copy_from_slice(&format.sample_rate.to_le_bytes());
    header[28..32].copy_from_slice(&byte_rate.to_le_bytes());
    header[32..34].copy_from_slice(&block_align.to_le_bytes());
    header[34..36].copy_from_slice(&format.bit_depth.to_le_bytes());

    // data sub-chunk
    header[36..40].copy_from_slice(b"data");
    header[40..44].copy_from_slice(&data_size.to_le_bytes());

    header
}

/// Frame raw PCM bytes as a complete in-memory WAV byte stream.
pub fn wrap_pcm(pcm: &[u8], format: &AudioFormat) -> Result<Vec<u8>, PipelineError> {
    format.validate().map_err(PipelineError::Encoding)?;
    if pcm.len() > u32::MAX as usize - 36 {
        return Err(PipelineError::Encoding(format!(
            "PCM payload too large for a RIFF container: {} bytes",
            pcm.len()
        )));
    }

    let header = generate_wav_header(format, pcm.len() as u32);
    let mut out = Vec::with_capacity(WAV_HEADER_SIZE + pcm.len());
    out.extend_from_slice(&header);
    out.extend_from_slice(pcm);
    Ok(out)
}

/// Recover the declared format and the raw PCM payload from a framed stream.
///
/// Rejects streams with bad magic, a non-PCM format code, or a data-size
/// field that disagrees with the actual payload length.
pub fn unwrap_wav(bytes: &[u8]) -> Result<(AudioFormat, &[u8]), PipelineError> {
    if bytes.len() < WAV_HEADER_SIZE {
        return Err(PipelineError::Parse(format!(
            "WAV stream too short: {} bytes",
            bytes.len()
        )));
    }
    if &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" || &bytes[12..16] != b"fmt " {
        return Err(PipelineError::Parse("not a RIFF/WAVE stream".into()));
    }
    if &bytes[36..40] != b"data" {
        return Err(PipelineError::Parse("missing data chunk".into()));
    }

    let format_code = u16::from_le_bytes([bytes[20], bytes[21]]);
    if format_code != 1 {
        return Err(PipelineError::Parse(format!(
            "unsupported format code: {format_code}"
        )));
    }

    let format = AudioFormat {
        channels: u16::from_le_bytes([bytes[22], bytes[23]]),
        sample_rate: u32::from_le_bytes([bytes[24], bytes[25], bytes[26], bytes[27]]),
        bit_depth: u16::from_le_bytes([bytes[34], bytes[35]]),
    };

    let declared = u32::from_le_bytes([bytes[40], bytes[41], bytes[42], bytes[43]]) as usize;
    let payload = &bytes[WAV_HEADER_SIZE..];
    if declared != payload.len() {
        return Err(PipelineError::Parse(format!(
            "data size mismatch: header says {declared}, payload is {}",
            payload.len()
        )));
    }

    Ok((format, payload))
}
