//! Camera capture capability.
//!
//! Production capture shells out to a configurable camera command that
//! writes a JPEG to a spool directory. The trait seam lets tests inject a
//! fake camera.

use std::path::PathBuf;
use std::process::Command;
use thiserror::Error;

use crate::config::CaptureConfig;

#[derive(Debug, Error)]
pub enum CaptureError {
    /// The user aborted the capture (camera command exited non-zero).
    #[error("capture cancelled")]
    Cancelled,

    #[error("capture failed: {0}")]
    Failed(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A freshly captured frame, spooled to disk outside the album.
#[derive(Debug, Clone)]
pub struct CapturedFrame {
    pub path: PathBuf,
    pub format: String,
}

pub trait CaptureDevice {
    fn capture(&self) -> Result<CapturedFrame, CaptureError>;
}

/// Captures by running an external camera command.
///
/// The configured command template must contain an `{output}` placeholder,
/// replaced with the spool path the command is expected to write. The
/// template is split on whitespace; paths with spaces are not supported.
pub struct CommandCapture {
    config: CaptureConfig,
}

impl CommandCapture {
    pub fn new(config: CaptureConfig) -> Self {
        Self { config }
    }

    fn spool_path(&self) -> PathBuf {
        let stamp = chrono::Utc::now().timestamp_millis();
        self.config.spool_dir.join(format!("frame_{}.jpeg", stamp))
    }
}

impl CaptureDevice for CommandCapture {
    fn capture(&self) -> Result<CapturedFrame, CaptureError> {
        std::fs::create_dir_all(&self.config.spool_dir)?;
        let output = self.spool_path();
        let output_str = output.to_string_lossy().to_string();

        let mut parts = self
            .config
            .command
            .split_whitespace()
            .map(|part| part.replace("{output}", &output_str));
        let program = parts
            .next()
            .ok_or_else(|| CaptureError::Failed("empty capture command".to_string()))?;

        tracing::debug!("Running capture command: {}", self.config.command);
        let status = Command::new(program).args(parts).status()?;

        if !status.success() {
            // Interactive capture programs exit non-zero when the user
            // closes them without taking a shot.
            tracing::info!("Capture command exited with {}", status);
            return Err(CaptureError::Cancelled);
        }

        if !output.exists() {
            return Err(CaptureError::Failed(format!(
                "capture command produced no file at {}",
                output.display()
            )));
        }

        Ok(CapturedFrame {
            path: output,
            format: "jpeg".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn config(command: &str, spool: PathBuf) -> CaptureConfig {
        CaptureConfig {
            command: command.to_string(),
            spool_dir: spool,
        }
    }

    #[test]
    fn test_successful_capture() {
        let dir = tempdir().unwrap();
        // "cp" stands in for a camera: copies a fixture to the output path
        let fixture = dir.path().join("fixture.jpeg");
        std::fs::write(&fixture, b"frame").unwrap();

        let command = format!("cp {} {{output}}", fixture.display());
        let capture = CommandCapture::new(config(&command, dir.path().join("spool")));

        let frame = capture.capture().unwrap();
        assert_eq!(frame.format, "jpeg");
        assert_eq!(std::fs::read(&frame.path).unwrap(), b"frame");
    }

    #[test]
    fn test_nonzero_exit_is_cancellation() {
        let dir = tempdir().unwrap();
        let capture = CommandCapture::new(config("false", dir.path().to_path_buf()));

        assert!(matches!(capture.capture(), Err(CaptureError::Cancelled)));
    }

    #[test]
    fn test_missing_output_is_failure() {
        let dir = tempdir().unwrap();
        let capture = CommandCapture::new(config("true", dir.path().to_path_buf()));

        assert!(matches!(capture.capture(), Err(CaptureError::Failed(_))));
    }
}
