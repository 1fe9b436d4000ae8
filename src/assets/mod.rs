//! # Asset Acquisition Module
//!
//! Fetches product images referenced by URL, rejects anything that is
//! missing, out of size bounds, duplicated or undecodable, and stores the
//! survivors in the job's scratch directory.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use reel_compositor::assets::{AssetAcquirer, HttpImageSource};
//! use reel_compositor::config::AcquisitionConfig;
//! use reel_compositor::scratch::ScratchDir;
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let config = AcquisitionConfig::default();
//! let source = HttpImageSource::new(&config)?;
//! let scratch = ScratchDir::create(None, "B0EXAMPLE")?;
//!
//! let urls = vec!["https://example.com/front.jpg".to_string()];
//! let assets = AssetAcquirer::new(&source, &config).acquire(&urls, &scratch).await?;
//! println!("Downloaded {} images", assets.len());
//! # Ok(())
//! # }
//! ```

pub mod acquirer;
pub mod source;
pub mod types;

pub use acquirer::AssetAcquirer;
pub use source::{HttpImageSource, ImageSource};
pub use types::ImageAsset;
