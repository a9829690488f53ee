//! Compute-backend detection.
//!
//! Long inputs produce results that differ between CPU and GPU runs of the
//! transcription model, so their references are stored per backend. The
//! harness only needs the backend *identifier*, not access to the device
//! itself.

use std::process::{Command, Stdio};

/// Environment variable overriding detection (e.g. `GOLDENEAR_DEVICE=cuda`).
pub const DEVICE_ENV: &str = "GOLDENEAR_DEVICE";

/// Identify the compute backend the external tool will run on.
///
/// The env override comes first so CI can pin the identifier explicitly;
/// otherwise we probe for a working `nvidia-smi`, which is the same signal
/// the tool's own CUDA detection keys off.
pub fn detect() -> String {
    if let Ok(device) = std::env::var(DEVICE_ENV) {
        let device = device.trim().to_string();
        if !device.is_empty() {
            return device;
        }
    }
    if cuda_available() { "cuda".into() } else { "cpu".into() }
}

fn cuda_available() -> bool {
    Command::new("nvidia-smi")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_returns_a_known_identifier_without_override() {
        // No override set by the test harness; either answer is valid, but it
        // must be one of the two identifiers references are keyed by.
        if std::env::var(DEVICE_ENV).is_err() {
            let device = detect();
            assert!(device == "cpu" || device == "cuda", "{device}");
        }
    }
}
