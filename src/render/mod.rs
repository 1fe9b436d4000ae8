//! # Render Module
//!
//! Turns a composition graph and audio mix into a publish-ready mp4.
//!
//! The graph and mix are first captured in a [`RenderSpec`], a plain value
//! that is serialized to encoder arguments in one place. The
//! [`RenderInvoker`] runs an [`Encoder`] against it, checks that a
//! non-empty file was produced and moves it into place. A working file
//! from a failed encode is removed.

pub mod encoder;
pub mod filtergraph;
pub mod invoker;
pub mod probe;
pub mod profile;
pub mod spec;

pub use encoder::{Encoder, FfmpegEncoder};
pub use invoker::{RenderInvoker, RenderResult};
pub use profile::CompatibilityProfile;
pub use spec::{ImageInput, RenderSpec};
