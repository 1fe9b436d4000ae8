use std::fmt;

use thiserror::Error;

/// Main error type for the Reel-Compositor library
#[derive(Error, Debug)]
pub enum CompositorError {
    #[error("Asset acquisition error: {0}")]
    Asset(#[from] AssetError),

    #[error("Timing error: {0}")]
    Timing(#[from] TimingError),

    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Generic error: {0}")]
    Generic(String),
}

/// Image download and validation errors
#[derive(Error, Debug)]
pub enum AssetError {
    #[error("No usable images out of {attempted} candidates: {reasons}")]
    NoUsableAssets { attempted: usize, reasons: String },

    #[error("Failed to fetch {url}: {reason}")]
    FetchFailed { url: String, reason: String },

    #[error("Image {url} is {size} bytes, outside the accepted range {min}..={max}")]
    SizeOutOfBounds { url: String, size: u64, min: u64, max: u64 },

    #[error("Image {url} could not be decoded: {reason}")]
    Undecodable { url: String, reason: String },
}

/// Duration planning errors
#[derive(Error, Debug)]
pub enum TimingError {
    #[error(
        "Segment duration {segment:.4}s does not exceed the {overlap:.2}s transition \
         ({asset_count} images over {target:.2}s)"
    )]
    Degenerate {
        segment: f64,
        overlap: f64,
        asset_count: usize,
        target: f64,
    },
}

/// Narration and ambient audio errors
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Narration is required: {reason}")]
    MissingNarration { reason: String },

    #[error("Failed to load audio file: {path}")]
    LoadFailed { path: String },

    #[error("Unsupported audio format: {format}")]
    UnsupportedFormat { format: String },

    #[error("Invalid audio parameters: {details}")]
    InvalidParameters { details: String },
}

/// External encoder errors
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Encoder failed ({status}): {diagnostic}")]
    EncodeFailed { status: String, diagnostic: String },

    #[error("Encoder timed out after {seconds}s")]
    TimedOut { seconds: u64 },

    #[error("Encoder binary not found: {binary}")]
    EncoderNotFound { binary: String },

    #[error("Encoder reported success but {path} is missing or empty")]
    IncompleteOutput { path: String },

    #[error("Probe of {path} failed: {reason}")]
    ProbeFailed { path: String, reason: String },
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file: {path}")]
    ParseFailed { path: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Convenience type alias for Results using CompositorError
pub type Result<T> = std::result::Result<T, CompositorError>;

/// Terminal failure categories reported for a render job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    NoUsableAssets,
    DegenerateTiming,
    MissingNarration,
    EncodeFailed,
    IncompleteOutput,
    /// Configuration, I/O or other problems outside the job taxonomy
    Internal,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NoUsableAssets => "NoUsableAssets",
            Self::DegenerateTiming => "DegenerateTiming",
            Self::MissingNarration => "MissingNarration",
            Self::EncodeFailed => "EncodeFailed",
            Self::IncompleteOutput => "IncompleteOutput",
            Self::Internal => "Internal",
        };
        f.write_str(name)
    }
}

impl CompositorError {
    /// Create a generic error with a custom message
    pub fn generic<S: Into<String>>(message: S) -> Self {
        Self::Generic(message.into())
    }

    /// Classify this error into a job failure kind
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Asset(_) => FailureKind::NoUsableAssets,
            Self::Timing(_) => FailureKind::DegenerateTiming,
            Self::Audio(AudioError::MissingNarration { .. }) => FailureKind::MissingNarration,
            Self::Audio(_) => FailureKind::Internal,
            Self::Render(RenderError::IncompleteOutput { .. }) => FailureKind::IncompleteOutput,
            Self::Render(_) => FailureKind::EncodeFailed,
            Self::Config(_) | Self::Io(_) | Self::Generic(_) => FailureKind::Internal,
        }
    }

    /// True when the remedy lies with the caller's inputs rather than the encoder
    pub fn is_input_problem(&self) -> bool {
        matches!(
            self.kind(),
            FailureKind::NoUsableAssets | FailureKind::DegenerateTiming | FailureKind::MissingNarration
        )
    }

    /// Human-readable diagnostic naming the failed area
    pub fn diagnostic(&self) -> String {
        match self {
            Self::Asset(AssetError::NoUsableAssets { attempted, reasons }) => {
                format!(
                    "None of the {} product images could be used. Check the image URLs upstream. Details: {}",
                    attempted, reasons
                )
            }
            Self::Timing(TimingError::Degenerate { asset_count, target, .. }) => {
                format!(
                    "{} images cannot fit into {:.2}s with crossfades. Supply fewer images or a longer narration.",
                    asset_count, target
                )
            }
            Self::Audio(AudioError::MissingNarration { reason }) => {
                format!("A narration track is required and none was usable: {}", reason)
            }
            Self::Render(RenderError::EncoderNotFound { binary }) => {
                format!("Encoder '{}' was not found. Please install FFmpeg.", binary)
            }
            _ => self.to_string(),
        }
    }
}
