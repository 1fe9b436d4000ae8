//! # Composition Engine
//!
//! Plans segment timing, builds the declarative visual graph and drives a
//! render job through acquisition, planning, composition and encoding.

pub mod engine;
pub mod graph;
pub mod job;
pub mod planner;

// Re-exports for convenience
pub use engine::{CompositionEngine, RenderRequest};
pub use graph::{CompositionGraph, GraphBuilder};
pub use job::{JobStage, RenderJob};
pub use planner::{DurationPlanner, RenderPlan};
