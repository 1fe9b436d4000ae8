use std::collections::HashSet;

use futures::stream::{self, StreamExt};
use image::{GenericImageView, ImageFormat};
use tokio::task;
use tracing::{debug, info, warn};

use crate::{
    assets::{source::ImageSource, types::ImageAsset},
    config::AcquisitionConfig,
    error::{AssetError, CompositorError, Result},
    scratch::ScratchDir,
};

/// Downloads and validates the product images for one job
pub struct AssetAcquirer<'a, S: ImageSource + ?Sized> {
    source: &'a S,
    config: &'a AcquisitionConfig,
}

impl<'a, S: ImageSource + ?Sized> AssetAcquirer<'a, S> {
    pub fn new(source: &'a S, config: &'a AcquisitionConfig) -> Self {
        Self { source, config }
    }

    /// Fetch, validate and store every usable image, preserving source order
    ///
    /// Blank and repeated URLs are skipped, and at most
    /// `max_assets` distinct URLs are attempted. Fails with
    /// [`AssetError::NoUsableAssets`] when nothing survives.
    pub async fn acquire(&self, urls: &[String], scratch: &ScratchDir) -> Result<Vec<ImageAsset>> {
        let (candidates, mut rejections) = self.select_candidates(urls);

        debug!(
            "Fetching {} candidate images ({} in flight)",
            candidates.len(),
            self.config.concurrency
        );

        // `buffered` yields in input order even when downloads finish out of order
        let outcomes: Vec<(String, Result<ImageAsset>)> = stream::iter(candidates.into_iter().enumerate())
            .map(|(index, url)| async move {
                let outcome = self.acquire_one(index, &url, scratch).await;
                (url, outcome)
            })
            .buffered(self.config.concurrency)
            .collect()
            .await;

        let mut assets = Vec::with_capacity(outcomes.len());
        for (url, outcome) in outcomes {
            match outcome {
                Ok(asset) => assets.push(asset),
                Err(e) => {
                    warn!("Discarding image {}: {}", url, e);
                    rejections.push(format!("{}: {}", url, e));
                }
            }
        }

        if assets.is_empty() {
            return Err(AssetError::NoUsableAssets {
                attempted: urls.len(),
                reasons: if rejections.is_empty() {
                    "no image URLs supplied".to_string()
                } else {
                    rejections.join("; ")
                },
            }
            .into());
        }

        info!("   Accepted {} of {} images", assets.len(), urls.len());
        Ok(assets)
    }

    /// Drop blanks and duplicates, then cap the list
    fn select_candidates(&self, urls: &[String]) -> (Vec<String>, Vec<String>) {
        let mut seen = HashSet::new();
        let mut candidates = Vec::new();
        let mut rejections = Vec::new();

        for url in urls.iter().map(|u| u.trim()) {
            if url.is_empty() {
                rejections.push("<blank>: empty URL".to_string());
                continue;
            }
            if !seen.insert(url) {
                debug!("Skipping duplicate image URL {}", url);
                rejections.push(format!("{}: duplicate", url));
                continue;
            }
            if candidates.len() == self.config.max_assets {
                debug!("Ignoring {} beyond the {}-image limit", url, self.config.max_assets);
                continue;
            }
            candidates.push(url.to_string());
        }

        (candidates, rejections)
    }

    async fn acquire_one(&self, index: usize, url: &str, scratch: &ScratchDir) -> Result<ImageAsset> {
        let bytes = self.source.fetch(url).await?;
        let byte_size = bytes.len() as u64;

        if byte_size < self.config.min_bytes || byte_size > self.config.max_bytes {
            return Err(AssetError::SizeOutOfBounds {
                url: url.to_string(),
                size: byte_size,
                min: self.config.min_bytes,
                max: self.config.max_bytes,
            }
            .into());
        }

        // Full decodes are CPU-bound, keep them off the async workers
        let owned_url = url.to_string();
        let (bytes, (format, width, height)) = task::spawn_blocking(move || {
            let decoded = decode_image(&owned_url, &bytes);
            decoded.map(|meta| (bytes, meta))
        })
        .await
        .map_err(|e| CompositorError::generic(format!("Image decode task failed: {}", e)))??;

        let extension = format.extensions_str().first().copied().unwrap_or("img");
        let local_path = scratch.join(format!("img_{:02}.{}", index, extension));

        tokio::fs::write(&local_path, &bytes).await?;

        let on_disk = tokio::fs::metadata(&local_path).await?.len();
        if on_disk != byte_size {
            return Err(CompositorError::generic(format!(
                "Short write for {:?}: {} of {} bytes",
                local_path, on_disk, byte_size
            )));
        }

        debug!("   {:02} - {}x{} {:?} ({} bytes) from {}", index, width, height, format, byte_size, url);

        Ok(ImageAsset {
            source_url: url.to_string(),
            local_path,
            byte_size,
            width,
            height,
            format,
            valid: true,
        })
    }
}

/// Decode the payload fully so truncated files are rejected here, not by the encoder
fn decode_image(url: &str, bytes: &[u8]) -> Result<(ImageFormat, u32, u32)> {
    let undecodable = |reason: String| AssetError::Undecodable {
        url: url.to_string(),
        reason,
    };

    let format = image::guess_format(bytes).map_err(|e| undecodable(e.to_string()))?;
    let decoded = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| undecodable(e.to_string()))?;
    let (width, height) = decoded.dimensions();

    if width == 0 || height == 0 {
        return Err(undecodable("zero-sized image".to_string()).into());
    }

    Ok((format, width, height))
}
