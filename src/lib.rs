//! # Reel-Compositor
//!
//! Turn a product's images and a narration track into a short vertical
//! video ready for social platforms.
//!
//! Images are downloaded and validated, shown one after another with
//! crossfades timed so the visuals end a moment after the narration, and
//! encoded together with the narration (and an optional quiet music bed)
//! into an H.264/AAC mp4.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use reel_compositor::{
//!     audio::NarrationLoader,
//!     composition::{CompositionEngine, RenderRequest},
//!     config::Config,
//! };
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let engine = CompositionEngine::new(Config::default())?;
//! let narration = NarrationLoader::measure("voice.mp3").await?;
//!
//! let request = RenderRequest::new(
//!     "B08N5WRWNW",
//!     vec![
//!         "https://cdn.example.com/front.jpg".to_string(),
//!         "https://cdn.example.com/side.jpg".to_string(),
//!     ],
//! )
//! .with_narration(narration);
//!
//! let result = engine.render(request).await?;
//! println!("{:?} ({:.2}s)", result.output_path, result.duration_seconds);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`assets`] - Image download and validation
//! - [`audio`] - Narration measurement and audio mixing
//! - [`composition`] - Timing, visual graph and the job pipeline
//! - [`render`] - Encoder invocation and output validation
//! - [`config`] - Configuration management

pub mod assets;
pub mod audio;
pub mod composition;
pub mod config;
pub mod error;
pub mod render;
pub mod scratch;

#[cfg(test)]
mod test_support;

// Re-export commonly used types for convenience
pub use crate::{
    audio::{AmbientTrack, NarrationTrack},
    composition::{CompositionEngine, RenderRequest},
    config::Config,
    error::{CompositorError, FailureKind, Result},
    render::RenderResult,
};
