use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use crate::error::{RenderError, Result};

/// Container duration of `path` in seconds, as reported by ffprobe
///
/// ffprobe is killed if it has not answered within `timeout`.
pub async fn probe_duration(ffprobe: &str, path: &Path, timeout: Duration) -> Result<f64> {
    let probe_failed = |reason: String| RenderError::ProbeFailed {
        path: path.display().to_string(),
        reason,
    };

    let run = Command::new(ffprobe)
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output();

    let output = tokio::time::timeout(timeout, run)
        .await
        .map_err(|_| probe_failed(format!("timed out after {:?}", timeout)))?
        .map_err(|e| probe_failed(e.to_string()))?;

    if !output.status.success() {
        return Err(probe_failed(String::from_utf8_lossy(&output.stderr).trim().to_string()).into());
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_duration(&stdout)
        .ok_or_else(|| probe_failed(format!("unparseable duration {:?}", stdout.trim())).into())
}

/// Parse ffprobe's bare `format=duration` output
pub fn parse_duration(text: &str) -> Option<f64> {
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .and_then(|line| line.parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0)
}
