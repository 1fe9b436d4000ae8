use std::path::PathBuf;

use image::ImageFormat;

/// A downloaded product image stored in a job's scratch directory
#[derive(Debug, Clone)]
pub struct ImageAsset {
    /// URL the image was fetched from
    pub source_url: String,

    /// Location of the downloaded file
    pub local_path: PathBuf,

    /// Payload size in bytes
    pub byte_size: u64,

    /// Decoded width in pixels
    pub width: u32,

    /// Decoded height in pixels
    pub height: u32,

    /// Detected image format
    pub format: ImageFormat,

    /// Whether the payload decoded successfully
    pub valid: bool,
}

impl ImageAsset {
    /// True for images taller than they are wide
    pub fn is_portrait(&self) -> bool {
        self.height > self.width
    }
}
