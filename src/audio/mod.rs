//! # Audio Module
//!
//! Narration and ambient track handling.
//!
//! - **Measurement**: narration duration is read from the payload itself
//!   (WAV headers via hound, other containers via symphonia, raw PCM from
//!   its byte length) so the video is never timed against a guess.
//! - **Mixing**: narration is boosted and padded to the video length; an
//!   optional ambient bed is looped far below it.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use reel_compositor::audio::NarrationLoader;
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let narration = NarrationLoader::measure("voice.mp3").await?;
//! println!("Narration runs {:.2}s", narration.duration_seconds);
//! # Ok(())
//! # }
//! ```

pub mod loader;
pub mod mixer;
pub mod types;

pub use loader::NarrationLoader;
pub use mixer::{AudioMix, AudioMixer};
pub use types::{AmbientTrack, NarrationFormat, NarrationTrack};
