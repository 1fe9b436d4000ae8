use std::fs::File;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use symphonia::core::codecs::CODEC_TYPE_NULL;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::units::TimeBase;
use tokio::task;
use tracing::debug;

use crate::audio::types::{NarrationFormat, NarrationTrack};
use crate::error::{AudioError, CompositorError, Result};

/// Measures narration files so the planner can be fed a real duration
pub struct NarrationLoader;

impl NarrationLoader {
    /// Measure a container-format narration file
    pub async fn measure<P: AsRef<Path>>(path: P) -> Result<NarrationTrack> {
        let path = path.as_ref().to_path_buf();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_lowercase();

        let duration = match extension.as_str() {
            "wav" => Self::blocking(path.clone(), |p| Self::wav_duration(&p)).await?,
            "mp3" | "flac" | "ogg" | "m4a" | "aac" => {
                Self::blocking(path.clone(), |p| Self::container_duration(&p)).await?
            }
            _ => return Err(AudioError::UnsupportedFormat { format: extension }.into()),
        };

        Self::finish(NarrationTrack::new(path, duration))
    }

    /// Measure a headerless s16le PCM narration file from its byte length
    pub async fn measure_pcm<P: AsRef<Path>>(path: P, sample_rate: u32, channels: u16) -> Result<NarrationTrack> {
        let path = path.as_ref().to_path_buf();
        let format = NarrationFormat::PcmS16le { sample_rate, channels };
        let byte_rate = format
            .byte_rate()
            .filter(|rate| *rate > 0)
            .ok_or_else(|| AudioError::InvalidParameters {
                details: format!("{} Hz x {} channels", sample_rate, channels),
            })?;

        let size = tokio::fs::metadata(&path)
            .await
            .map_err(|_| AudioError::LoadFailed { path: path.display().to_string() })?
            .len();

        let duration = size as f64 / byte_rate as f64;
        Self::finish(NarrationTrack::raw_pcm(path, duration, sample_rate, channels))
    }

    fn finish(track: NarrationTrack) -> Result<NarrationTrack> {
        if !(track.duration_seconds > 0.0) {
            return Err(AudioError::InvalidParameters {
                details: format!("{} has no audible duration", track.path.display()),
            }
            .into());
        }
        debug!("Measured narration {:?}: {:.3}s", track.path, track.duration_seconds);
        Ok(track)
    }

    async fn blocking<F>(path: PathBuf, f: F) -> Result<f64>
    where
        F: FnOnce(PathBuf) -> Result<f64> + Send + 'static,
    {
        task::spawn_blocking(move || f(path))
            .await
            .map_err(|e| CompositorError::generic(format!("Audio probe task failed: {}", e)))?
    }

    /// WAV length from the header via hound
    fn wav_duration(path: &Path) -> Result<f64> {
        let reader = hound::WavReader::open(path)
            .map_err(|_| AudioError::LoadFailed { path: path.display().to_string() })?;

        let spec = reader.spec();
        if spec.sample_rate == 0 {
            return Err(AudioError::InvalidParameters {
                details: "WAV header reports a 0 Hz sample rate".to_string(),
            }
            .into());
        }

        // `duration()` counts frames, not interleaved samples
        Ok(reader.duration() as f64 / spec.sample_rate as f64)
    }

    /// Length of any symphonia-readable container
    ///
    /// Uses the track's frame count when the container declares one,
    /// otherwise sums packet durations without decoding.
    fn container_duration(path: &Path) -> Result<f64> {
        let load_failed = || AudioError::LoadFailed { path: path.display().to_string() };

        let file = File::open(path).map_err(|_| load_failed())?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(extension) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(extension);
        }

        let probed = symphonia::default::get_probe()
            .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
            .map_err(|_| load_failed())?;
        let mut format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(load_failed)?;
        let track_id = track.id;
        let params = track.codec_params.clone();

        if let (Some(frames), Some(rate)) = (params.n_frames, params.sample_rate) {
            if rate > 0 {
                return Ok(frames as f64 / rate as f64);
            }
        }

        let time_base = params
            .time_base
            .or_else(|| params.sample_rate.map(|rate| TimeBase::new(1, rate)))
            .ok_or_else(|| AudioError::InvalidParameters {
                details: "No time base or sample rate found".to_string(),
            })?;

        let mut total_ts: u64 = 0;
        loop {
            match format.next_packet() {
                Ok(packet) => {
                    if packet.track_id() == track_id {
                        total_ts += packet.dur;
                    }
                }
                Err(SymphoniaError::IoError(e)) if e.kind() == ErrorKind::UnexpectedEof => break,
                Err(SymphoniaError::ResetRequired) => continue,
                Err(_) => return Err(load_failed().into()),
            }
        }

        let time = time_base.calc_time(total_ts);
        Ok(time.seconds as f64 + time.frac)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::write_wav;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_measure_wav() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("voice.wav");
        write_wav(&path, 2.5, 22050);

        let track = NarrationLoader::measure(&path).await.unwrap();
        assert!((track.duration_seconds - 2.5).abs() < 1e-3);
        assert_eq!(track.format, NarrationFormat::Container);
    }

    #[tokio::test]
    async fn test_measure_raw_pcm_from_size() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("voice.pcm");
        // 24 kHz mono s16le: 48000 bytes per second
        std::fs::write(&path, vec![0u8; 48000 * 3]).unwrap();

        let track = NarrationLoader::measure_pcm(&path, 24000, 1).await.unwrap();
        assert!((track.duration_seconds - 3.0).abs() < 1e-9);
        assert_eq!(track.format, NarrationFormat::PcmS16le { sample_rate: 24000, channels: 1 });
    }

    #[tokio::test]
    async fn test_empty_pcm_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("silent.pcm");
        std::fs::write(&path, b"").unwrap();

        assert!(NarrationLoader::measure_pcm(&path, 24000, 1).await.is_err());
    }

    #[tokio::test]
    async fn test_unsupported_extension() {
        let result = NarrationLoader::measure("voice.txt").await;
        assert!(matches!(
            result,
            Err(CompositorError::Audio(AudioError::UnsupportedFormat { .. }))
        ));
    }
}
