use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Main configuration for the Reel-Compositor
///
/// Every field has a default; a TOML file only needs to name the values it
/// wants to change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Output frame geometry
    pub frame: FrameConfig,

    /// Segment and transition timing
    pub timing: TimingConfig,

    /// Narration and ambient mixing
    pub audio: AudioConfig,

    /// Image download settings
    pub acquisition: AcquisitionConfig,

    /// Encoder invocation settings
    pub render: RenderConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound { path: path.display().to_string() })?;

        let config: Config = toml::from_str(&content)
            .map_err(|_| ConfigError::ParseFailed { path: path.display().to_string() })?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::InvalidValue {
                key: "config".to_string(),
                value: e.to_string()
            })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.frame.validate()?;
        self.timing.validate()?;
        self.audio.validate()?;
        self.acquisition.validate()?;
        self.render.validate()?;
        Ok(())
    }
}

fn invalid(key: &str, value: impl ToString) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

/// How a still image is fitted into the output frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitMode {
    /// Scale down to fit inside the frame and pad with black bars
    Pad,
    /// Scale up to cover the frame and crop the overflow
    Crop,
    /// Blurred cover-crop background with a fitted foreground on top
    BlurredBackdrop,
}

/// Output frame configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub fit: FitMode,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            width: 1080,
            height: 1920,
            fps: 30,
            fit: FitMode::Pad,
        }
    }
}

impl FrameConfig {
    fn validate(&self) -> Result<()> {
        // yuv420p needs even dimensions
        if self.width == 0 || self.width % 2 != 0 {
            return Err(invalid("frame.width", self.width).into());
        }
        if self.height == 0 || self.height % 2 != 0 {
            return Err(invalid("frame.height", self.height).into());
        }
        if self.fps == 0 {
            return Err(invalid("frame.fps", self.fps).into());
        }
        Ok(())
    }

    /// Duration of one frame in seconds
    pub fn frame_period(&self) -> f64 {
        1.0 / self.fps as f64
    }
}

/// Timing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Crossfade overlap between consecutive images (seconds)
    pub transition_duration: f64,

    /// Silence appended after the narration (seconds)
    pub end_buffer: f64,

    /// Total duration used when there is no narration (seconds)
    pub default_duration: f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            transition_duration: 0.5,
            end_buffer: 1.5,
            default_duration: 18.0,
        }
    }
}

impl TimingConfig {
    fn validate(&self) -> Result<()> {
        if !self.transition_duration.is_finite() || self.transition_duration < 0.0 {
            return Err(invalid("timing.transition_duration", self.transition_duration).into());
        }
        if !self.end_buffer.is_finite() || self.end_buffer < 0.0 {
            return Err(invalid("timing.end_buffer", self.end_buffer).into());
        }
        if !self.default_duration.is_finite() || self.default_duration <= self.transition_duration {
            return Err(invalid("timing.default_duration", self.default_duration).into());
        }
        Ok(())
    }
}

/// Audio mixing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Linear gain applied to the narration
    pub narration_gain: f64,

    /// Linear gain applied to the ambient bed
    pub ambient_gain: f64,

    /// Shared ambient track, used when the file exists
    pub ambient_track: Option<PathBuf>,

    /// Output sample rate (Hz)
    pub sample_rate: u32,

    /// Output channel count
    pub channels: u16,

    /// Output AAC bitrate (kbit/s)
    pub bitrate_kbps: u32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            narration_gain: 2.0,
            ambient_gain: 0.05,
            ambient_track: Some(PathBuf::from("assets/background_music.mp3")),
            sample_rate: 44100,
            channels: 2,
            bitrate_kbps: 192,
        }
    }
}

impl AudioConfig {
    fn validate(&self) -> Result<()> {
        if !(self.narration_gain > 0.0) {
            return Err(invalid("audio.narration_gain", self.narration_gain).into());
        }
        // The ambient bed must stay well under the voice
        if !(self.ambient_gain >= 0.0) || self.ambient_gain >= self.narration_gain {
            return Err(ConfigError::InvalidValue {
                key: "audio.gain_ratio".to_string(),
                value: format!("{}/{}", self.ambient_gain, self.narration_gain),
            }.into());
        }
        if self.sample_rate == 0 {
            return Err(invalid("audio.sample_rate", self.sample_rate).into());
        }
        if self.channels == 0 {
            return Err(invalid("audio.channels", self.channels).into());
        }
        Ok(())
    }
}

/// Image download configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquisitionConfig {
    /// Maximum number of image URLs considered per job
    pub max_assets: usize,

    /// Per-download timeout (seconds)
    pub timeout_secs: u64,

    /// Smallest accepted image payload (bytes)
    pub min_bytes: u64,

    /// Largest accepted image payload (bytes)
    pub max_bytes: u64,

    /// Downloads in flight at once
    pub concurrency: usize,

    /// User-Agent header sent with each request
    pub user_agent: String,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            max_assets: 7,
            timeout_secs: 10,
            min_bytes: 1024,
            max_bytes: 20 * 1024 * 1024,
            concurrency: 4,
            user_agent: format!("reel-compositor/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl AcquisitionConfig {
    fn validate(&self) -> Result<()> {
        if self.max_assets == 0 {
            return Err(invalid("acquisition.max_assets", self.max_assets).into());
        }
        if self.timeout_secs == 0 {
            return Err(invalid("acquisition.timeout_secs", self.timeout_secs).into());
        }
        if self.min_bytes == 0 || self.max_bytes < self.min_bytes {
            return Err(ConfigError::InvalidValue {
                key: "acquisition.byte_range".to_string(),
                value: format!("{}-{}", self.min_bytes, self.max_bytes),
            }.into());
        }
        if self.concurrency == 0 {
            return Err(invalid("acquisition.concurrency", self.concurrency).into());
        }
        Ok(())
    }
}

/// Encoder configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// ffmpeg binary name or path
    pub ffmpeg: String,

    /// ffprobe binary name or path
    pub ffprobe: String,

    /// Directory receiving finished videos
    pub output_dir: PathBuf,

    /// Parent for per-job scratch directories (system temp when unset)
    pub scratch_dir: Option<PathBuf>,

    /// Wall-clock limit for one encode (seconds)
    pub timeout_secs: u64,

    /// x264 constant rate factor
    pub crf: u8,

    /// x264 preset
    pub preset: String,

    /// Measure finished videos with ffprobe
    pub probe_output: bool,

    /// Wall-clock limit for one ffprobe call (seconds)
    pub probe_timeout_secs: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            ffmpeg: "ffmpeg".to_string(),
            ffprobe: "ffprobe".to_string(),
            output_dir: PathBuf::from("output_videos"),
            scratch_dir: None,
            timeout_secs: 300,
            crf: 23,
            preset: "medium".to_string(),
            probe_output: true,
            probe_timeout_secs: 30,
        }
    }
}

impl RenderConfig {
    fn validate(&self) -> Result<()> {
        if self.ffmpeg.trim().is_empty() {
            return Err(invalid("render.ffmpeg", &self.ffmpeg).into());
        }
        if self.timeout_secs == 0 {
            return Err(invalid("render.timeout_secs", self.timeout_secs).into());
        }
        if self.probe_timeout_secs == 0 {
            return Err(invalid("render.probe_timeout_secs", self.probe_timeout_secs).into());
        }
        if self.crf > 51 {
            return Err(invalid("render.crf", self.crf).into());
        }
        Ok(())
    }
}
