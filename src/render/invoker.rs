use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::task;
use tracing::{debug, error, info, warn};

use crate::{
    config::RenderConfig,
    error::{CompositorError, RenderError, Result},
    render::{encoder::Encoder, probe::probe_duration, spec::RenderSpec},
};

/// A finished, validated video
#[derive(Debug, Clone, PartialEq)]
pub struct RenderResult {
    pub output_path: PathBuf,
    pub duration_seconds: f64,
    pub byte_size: u64,
}

/// Runs the encoder and checks what it left behind
pub struct RenderInvoker<'a, E: Encoder + ?Sized> {
    encoder: &'a E,
    config: &'a RenderConfig,
}

impl<'a, E: Encoder + ?Sized> RenderInvoker<'a, E> {
    pub fn new(encoder: &'a E, config: &'a RenderConfig) -> Self {
        Self { encoder, config }
    }

    /// Encode `spec` and move the validated artifact to `destination`
    ///
    /// The encoder writes to `spec.output_path`, normally inside the job's
    /// scratch directory. `destination` is only written once the artifact
    /// has been checked, so a failed job never touches an existing file
    /// there. On failure the working file is removed before returning.
    pub async fn invoke(&self, spec: &RenderSpec, destination: &Path) -> Result<RenderResult> {
        let output_path = spec.output_path();
        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        info!(
            "   Encoding {} inputs with {} -> {:?}",
            spec.images.len(),
            self.encoder.name(),
            output_path
        );

        if let Err(e) = self.encoder.encode(spec).await {
            error!("Encoding failed: {}", e);
            discard_output(output_path).await;
            return Err(e);
        }

        let byte_size = match tokio::fs::metadata(output_path).await {
            Ok(meta) if meta.is_file() && meta.len() > 0 => meta.len(),
            _ => {
                discard_output(output_path).await;
                return Err(RenderError::IncompleteOutput {
                    path: output_path.display().to_string(),
                }
                .into());
            }
        };

        let duration_seconds = if self.config.probe_output {
            let timeout = Duration::from_secs(self.config.probe_timeout_secs);
            match probe_duration(&self.config.ffprobe, output_path, timeout).await {
                Ok(duration) => duration,
                Err(e) => {
                    warn!("Could not measure output, reporting planned duration: {}", e);
                    spec.duration
                }
            }
        } else {
            spec.duration
        };

        if let Err(e) = publish(output_path, destination).await {
            error!("Could not move {:?} to {:?}: {}", output_path, destination, e);
            discard_output(output_path).await;
            return Err(e);
        }

        Ok(RenderResult {
            output_path: destination.to_path_buf(),
            duration_seconds,
            byte_size,
        })
    }
}

/// Move a finished file into place, replacing whatever is there
async fn publish(from: &Path, to: &Path) -> Result<()> {
    if let Some(parent) = to.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    if tokio::fs::rename(from, to).await.is_ok() {
        debug!("Published {:?}", to);
        return Ok(());
    }

    // Scratch may sit on another filesystem: stage a copy next to `to`, then rename it
    let (from, to) = (from.to_path_buf(), to.to_path_buf());
    task::spawn_blocking(move || -> Result<()> {
        let parent = to
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut staged = tempfile::Builder::new()
            .prefix(".video_")
            .suffix(".part")
            .tempfile_in(parent)?;
        let mut source = std::fs::File::open(&from)?;
        std::io::copy(&mut source, staged.as_file_mut())?;
        staged.persist(&to).map_err(|e| e.error)?;
        std::fs::remove_file(&from)?;
        debug!("Published {:?} by copy", to);
        Ok(())
    })
    .await
    .map_err(|e| CompositorError::generic(format!("Publish task failed: {}", e)))?
}

/// Best-effort removal of a failed job's working output
async fn discard_output(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => warn!("Removed partial output {:?}", path),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove partial output {:?}: {}", path, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use crate::test_support::{sample_spec, EncoderBehavior, ScriptedEncoder};
    use tempfile::tempdir;

    fn config() -> RenderConfig {
        RenderConfig {
            probe_output: false,
            ..RenderConfig::default()
        }
    }

    #[tokio::test]
    async fn test_success_publishes_to_destination() {
        let dir = tempdir().unwrap();
        let spec = sample_spec(dir.path().join("scratch/render.mp4"));
        let destination = dir.path().join("out/video_a.mp4");
        let encoder = ScriptedEncoder::new(EncoderBehavior::Write(2048));
        let config = config();

        let result = RenderInvoker::new(&encoder, &config)
            .invoke(&spec, &destination)
            .await
            .unwrap();

        assert_eq!(result.byte_size, 2048);
        assert_eq!(result.duration_seconds, spec.duration);
        assert_eq!(result.output_path, destination);
        assert_eq!(std::fs::metadata(&destination).unwrap().len(), 2048);
        assert!(!spec.output_path.exists());
        assert_eq!(encoder.calls(), 1);
    }

    #[tokio::test]
    async fn test_success_replaces_previous_artifact() {
        let dir = tempdir().unwrap();
        let spec = sample_spec(dir.path().join("render.mp4"));
        let destination = dir.path().join("video_a.mp4");
        std::fs::write(&destination, b"old").unwrap();
        let encoder = ScriptedEncoder::new(EncoderBehavior::Write(512));
        let config = config();

        RenderInvoker::new(&encoder, &config)
            .invoke(&spec, &destination)
            .await
            .unwrap();

        assert_eq!(std::fs::metadata(&destination).unwrap().len(), 512);
    }

    #[tokio::test]
    async fn test_failed_encode_removes_partial_and_keeps_destination() {
        let dir = tempdir().unwrap();
        let spec = sample_spec(dir.path().join("render.mp4"));
        let destination = dir.path().join("video_b.mp4");
        std::fs::write(&destination, b"earlier good render").unwrap();
        let encoder = ScriptedEncoder::new(EncoderBehavior::WritePartialThenFail);
        let config = config();

        let err = RenderInvoker::new(&encoder, &config)
            .invoke(&spec, &destination)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), FailureKind::EncodeFailed);
        assert!(err.to_string().contains("moov atom not found"));
        assert!(!spec.output_path.exists());
        assert_eq!(std::fs::read(&destination).unwrap(), b"earlier good render");
    }

    #[tokio::test]
    async fn test_empty_output_is_incomplete() {
        let dir = tempdir().unwrap();
        let spec = sample_spec(dir.path().join("render.mp4"));
        let destination = dir.path().join("video_c.mp4");
        let encoder = ScriptedEncoder::new(EncoderBehavior::Write(0));
        let config = config();

        let err = RenderInvoker::new(&encoder, &config)
            .invoke(&spec, &destination)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), FailureKind::IncompleteOutput);
        assert!(!spec.output_path.exists());
        assert!(!destination.exists());
    }

    #[tokio::test]
    async fn test_missing_output_is_incomplete() {
        let dir = tempdir().unwrap();
        let spec = sample_spec(dir.path().join("render.mp4"));
        let encoder = ScriptedEncoder::new(EncoderBehavior::SucceedSilently);
        let config = config();

        let err = RenderInvoker::new(&encoder, &config)
            .invoke(&spec, &dir.path().join("video_d.mp4"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::IncompleteOutput);
    }

    #[tokio::test]
    async fn test_publish_creates_destination_directory() {
        let dir = tempdir().unwrap();
        let from = dir.path().join("render.mp4");
        let to = dir.path().join("nested/out/video_e.mp4");
        std::fs::write(&from, b"mp4").unwrap();

        publish(&from, &to).await.unwrap();

        assert_eq!(std::fs::read(&to).unwrap(), b"mp4");
        assert!(!from.exists());
    }
}
