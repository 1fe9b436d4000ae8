use std::path::{Path, PathBuf};

/// How the narration payload is encoded on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NarrationFormat {
    /// A self-describing container (mp3, wav, m4a, ogg, flac)
    Container,

    /// Headerless signed 16-bit little-endian PCM
    PcmS16le { sample_rate: u32, channels: u16 },
}

impl NarrationFormat {
    /// Bytes per second of audio, when the format has a fixed rate
    pub fn byte_rate(&self) -> Option<u64> {
        match self {
            Self::Container => None,
            Self::PcmS16le { sample_rate, channels } => Some(*sample_rate as u64 * 2 * *channels as u64),
        }
    }
}

/// Synthesized speech the video is timed against
///
/// The duration is measured from the payload by the caller (see
/// [`NarrationLoader`](crate::audio::NarrationLoader)); the compositor only
/// reads the file.
#[derive(Debug, Clone, PartialEq)]
pub struct NarrationTrack {
    pub path: PathBuf,
    pub duration_seconds: f64,
    pub format: NarrationFormat,
}

impl NarrationTrack {
    pub fn new<P: Into<PathBuf>>(path: P, duration_seconds: f64) -> Self {
        Self {
            path: path.into(),
            duration_seconds,
            format: NarrationFormat::Container,
        }
    }

    pub fn raw_pcm<P: Into<PathBuf>>(path: P, duration_seconds: f64, sample_rate: u32, channels: u16) -> Self {
        Self {
            path: path.into(),
            duration_seconds,
            format: NarrationFormat::PcmS16le { sample_rate, channels },
        }
    }

    /// True when the file exists, is a regular file and is non-empty
    pub fn is_readable(&self) -> bool {
        is_nonempty_file(&self.path)
    }
}

/// Shared background bed looped under the narration
///
/// Never written to; many jobs may reference the same file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmbientTrack {
    pub path: PathBuf,
}

impl AmbientTrack {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// The track at `path`, if that file is present
    pub fn discover(path: &Path) -> Option<Self> {
        is_nonempty_file(path).then(|| Self::new(path))
    }

    pub fn is_readable(&self) -> bool {
        is_nonempty_file(&self.path)
    }
}

fn is_nonempty_file(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.len() > 0)
        .unwrap_or(false)
}
