use std::path::Path;

use crate::error::{Error, Result};

/// Read the duration of a WAV file, in seconds, from its header.
///
/// Only the header is inspected; no samples are decoded. The duration is
/// needed solely to decide whether a result is device-dependent, so a cheap
/// probe keeps scenario setup fast even for long inputs.
pub fn duration_seconds(path: &Path) -> Result<f64> {
    if !path.is_file() {
        return Err(Error::missing(path));
    }
    let reader = hound::WavReader::open(path)?;
    let spec = reader.spec();
    Ok(f64::from(reader.duration()) / f64::from(spec.sample_rate))
}
