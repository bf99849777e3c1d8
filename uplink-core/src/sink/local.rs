//! Local-disk round trip.
//!
//! Some collaborators only accept a file path, not bytes. This sink writes
//! the buffer to a uniquely named temporary file, hands the path to the
//! caller, and removes the file when the call returns, on the error path
//! too. The random identifier in the name avoids collisions between
//! concurrent sessions on the same machine.

use std::io::Write;
use std::path::Path;

use crate::models::error::PipelineError;

/// Run `f` against an on-disk copy of `bytes`.
///
/// The file name is `uplink_<random>.<suffix>` under the system temp dir and
/// is deleted when this function returns, whatever `f` did.
pub fn with_local_copy<T>(
    bytes: &[u8],
    suffix: &str,
    f: impl FnOnce(&Path) -> Result<T, PipelineError>,
) -> Result<T, PipelineError> {
    let mut file = tempfile::Builder::new()
        .prefix("uplink_")
        .suffix(suffix)
        .tempfile()
        .map_err(|e| PipelineError::Storage(format!("failed to create temp file: {}", e)))?;

    file.write_all(bytes)
        .map_err(|e| PipelineError::Storage(format!("failed to write temp file: {}", e)))?;
    file.flush()
        .map_err(|e| PipelineError::Storage(format!("failed to flush temp file: {}", e)))?;

    // The NamedTempFile guard removes the file when it drops, so both the
    // Ok and Err returns of `f` leave no file behind.
    f(file.path())
}
