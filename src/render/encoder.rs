use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use crate::{
    config::RenderConfig,
    error::{CompositorError, RenderError, Result},
    render::spec::RenderSpec,
};

/// Lines of encoder stderr kept in failure diagnostics
const DIAGNOSTIC_LINES: usize = 30;

/// Runs a [`RenderSpec`] to completion
#[async_trait]
pub trait Encoder: Send + Sync {
    fn name(&self) -> &str;

    /// Produce `spec.output_path`, or fail without guaranteeing its absence
    async fn encode(&self, spec: &RenderSpec) -> Result<()>;
}

/// Encoder backed by an external ffmpeg process
#[derive(Debug, Clone)]
pub struct FfmpegEncoder {
    binary: String,
    timeout: Duration,
}

impl FfmpegEncoder {
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            binary: config.ffmpeg.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn check_available(binary: &str) -> bool {
        std::process::Command::new(binary)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }
}

#[async_trait]
impl Encoder for FfmpegEncoder {
    fn name(&self) -> &str {
        &self.binary
    }

    async fn encode(&self, spec: &RenderSpec) -> Result<()> {
        let args = spec.to_ffmpeg_args();
        debug!("{} {}", self.binary, args.join(" "));

        let child = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    CompositorError::from(RenderError::EncoderNotFound { binary: self.binary.clone() })
                } else {
                    CompositorError::Io(e)
                }
            })?;

        // Dropping the wait future on timeout drops the child, which kills it
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(output) => output?,
            Err(_) => {
                return Err(RenderError::TimedOut { seconds: self.timeout.as_secs() }.into());
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RenderError::EncodeFailed {
                status: output.status.to_string(),
                diagnostic: stderr_tail(&stderr, DIAGNOSTIC_LINES),
            }
            .into());
        }

        info!("   Encoder finished: {}", spec.output_path.display());
        Ok(())
    }
}

/// Last `lines` non-empty lines of encoder output
fn stderr_tail(stderr: &str, lines: usize) -> String {
    let kept: Vec<&str> = stderr.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = kept.len().saturating_sub(lines);
    kept[start..].join("\n")
}
