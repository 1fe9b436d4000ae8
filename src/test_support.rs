//! Fixtures shared by the unit tests.

use std::collections::HashMap;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use image::{ImageFormat, ImageOutputFormat, Rgb, RgbImage};

use crate::assets::{ImageAsset, ImageSource};
use crate::audio::{AudioMix, NarrationTrack};
use crate::composition::{graph::GraphBuilder, planner::DurationPlanner};
use crate::config::Config;
use crate::error::{AssetError, RenderError, Result};
use crate::render::{CompatibilityProfile, Encoder, RenderSpec};

/// Encode a gradient test card as PNG bytes
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 7 % 256) as u8, (y * 5 % 256) as u8, ((x + y) % 256) as u8])
    });
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, ImageOutputFormat::Png)
        .expect("encode test png");
    buffer.into_inner()
}

/// Write a mono 16-bit WAV tone of the given length
pub fn write_wav(path: &Path, seconds: f64, sample_rate: u32) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).expect("create wav");
    let total = (seconds * sample_rate as f64).round() as u32;
    for n in 0..total {
        let t = n as f64 / sample_rate as f64;
        let sample = (t * 440.0 * std::f64::consts::TAU).sin() * 0.3 * i16::MAX as f64;
        writer.write_sample(sample as i16).expect("write sample");
    }
    writer.finalize().expect("finalize wav");
}

/// In-memory image source keyed by URL
#[derive(Default)]
pub struct MemoryImageSource {
    images: HashMap<String, Vec<u8>>,
}

impl MemoryImageSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: &str, bytes: Vec<u8>) -> Self {
        self.images.insert(url.to_string(), bytes);
        self
    }
}

#[async_trait]
impl ImageSource for MemoryImageSource {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.images.get(url).cloned().ok_or_else(|| {
            AssetError::FetchFailed {
                url: url.to_string(),
                reason: "404 Not Found".to_string(),
            }
            .into()
        })
    }
}

/// What a [`ScriptedEncoder`] does when asked to encode
#[derive(Debug, Clone, Copy)]
pub enum EncoderBehavior {
    /// Write this many bytes to the output and succeed
    Write(usize),
    /// Leave a truncated file behind and report a non-zero exit
    WritePartialThenFail,
    /// Report success without producing anything
    SucceedSilently,
}

/// Encoder double that never spawns a process
pub struct ScriptedEncoder {
    behavior: EncoderBehavior,
    calls: AtomicUsize,
}

impl ScriptedEncoder {
    pub fn new(behavior: EncoderBehavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Encoder for ScriptedEncoder {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn encode(&self, spec: &RenderSpec) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            EncoderBehavior::Write(bytes) => {
                tokio::fs::write(&spec.output_path, vec![0u8; bytes]).await?;
                Ok(())
            }
            EncoderBehavior::WritePartialThenFail => {
                tokio::fs::write(&spec.output_path, b"ftypisom").await?;
                Err(RenderError::EncodeFailed {
                    status: "exit status: 1".to_string(),
                    diagnostic: "moov atom not found".to_string(),
                }
                .into())
            }
            EncoderBehavior::SucceedSilently => Ok(()),
        }
    }
}

/// Two-image narration-only spec writing to `output_path`
pub fn sample_spec(output_path: PathBuf) -> RenderSpec {
    let config = Config::default();
    let plan = DurationPlanner::from_config(&config.timing)
        .plan(12.0, 2)
        .expect("plan");
    let assets: Vec<ImageAsset> = (0..2)
        .map(|i| ImageAsset {
            source_url: format!("https://img/{}.png", i),
            local_path: PathBuf::from(format!("img_{:02}.png", i)),
            byte_size: 1024,
            width: 100,
            height: 100,
            format: ImageFormat::Png,
            valid: true,
        })
        .collect();
    let graph = GraphBuilder::new(&config.frame)
        .build(&plan, &assets)
        .expect("graph");
    let audio = AudioMix::NarrationOnly {
        narration: NarrationTrack::new("voice.mp3", 12.0),
        gain: config.audio.narration_gain,
        duration: plan.target_total_duration,
    };

    RenderSpec::new(
        &assets,
        &plan,
        graph,
        audio,
        CompatibilityProfile::from_config(&config),
        output_path,
    )
    .expect("spec")
}

/// True when ffmpeg with libx264 and ffprobe are installed
pub fn ffmpeg_with_x264() -> bool {
    let encoders = std::process::Command::new("ffmpeg")
        .args(["-hide_banner", "-encoders"])
        .output();
    let has_x264 = matches!(
        encoders,
        Ok(ref out) if out.status.success() && String::from_utf8_lossy(&out.stdout).contains("libx264")
    );
    has_x264 && crate::render::FfmpegEncoder::check_available("ffprobe")
}

/// Executable shell script that ignores its arguments and sleeps
#[cfg(unix)]
pub fn hanging_binary(dir: &Path, name: &str, seconds: u32) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\nsleep {}\n", seconds)).expect("write script");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).expect("chmod script");
    path
}
