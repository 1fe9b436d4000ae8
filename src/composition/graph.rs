use std::fmt;

use tracing::debug;

use crate::{
    assets::ImageAsset,
    composition::planner::RenderPlan,
    config::{FitMode, FrameConfig},
    error::{CompositorError, Result},
};

/// Name of an intermediate stream in the graph
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StreamLabel(String);

impl StreamLabel {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StreamLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0)
    }
}

/// Fit one input image into the output frame
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizeNode {
    /// Position of the image among the encoder's inputs
    pub input: usize,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub fit: FitMode,
    pub output: StreamLabel,
}

impl NormalizeNode {
    /// Foreground width for [`FitMode::BlurredBackdrop`], kept even
    pub fn foreground_width(&self) -> u32 {
        (self.width * 5 / 6) & !1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    /// Linear cross-dissolve
    Fade,
}

impl TransitionKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Fade => "fade",
        }
    }
}

/// Crossfade joining the running composite with the next image
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionEdge {
    pub from: StreamLabel,
    pub to: StreamLabel,
    pub kind: TransitionKind,
    pub duration: f64,
    pub offset: f64,
    pub output: StreamLabel,
}

/// Declarative description of the visual pipeline for one job
#[derive(Debug, Clone, PartialEq)]
pub struct CompositionGraph {
    pub nodes: Vec<NormalizeNode>,
    pub transitions: Vec<TransitionEdge>,

    /// The stream carrying the finished picture
    pub output: StreamLabel,

    /// Length of `output` in seconds
    pub duration: f64,
}

impl CompositionGraph {
    pub fn input_count(&self) -> usize {
        self.nodes.len()
    }
}

/// Builds a [`CompositionGraph`] from a plan and the accepted images
///
/// Pure: labels and offsets only, nothing is read from disk.
pub struct GraphBuilder<'a> {
    frame: &'a FrameConfig,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(frame: &'a FrameConfig) -> Self {
        Self { frame }
    }

    pub fn build(&self, plan: &RenderPlan, assets: &[ImageAsset]) -> Result<CompositionGraph> {
        if assets.is_empty() || assets.len() != plan.asset_count {
            return Err(CompositorError::generic(format!(
                "Plan covers {} images but {} were supplied",
                plan.asset_count,
                assets.len()
            )));
        }

        let nodes: Vec<NormalizeNode> = (0..assets.len())
            .map(|input| NormalizeNode {
                input,
                width: self.frame.width,
                height: self.frame.height,
                fps: self.frame.fps,
                fit: self.frame.fit,
                output: StreamLabel::new(format!("v{}_base", input)),
            })
            .collect();

        let mut transitions = Vec::with_capacity(plan.transition_count());
        let mut current = nodes[0].output.clone();

        for (i, node) in nodes.iter().enumerate().skip(1) {
            let output = StreamLabel::new(format!("v_fade{}", i));
            transitions.push(TransitionEdge {
                from: current,
                to: node.output.clone(),
                kind: TransitionKind::Fade,
                duration: plan.transition_overlap,
                offset: plan.transition_offset(i),
                output: output.clone(),
            });
            current = output;
        }

        debug!(
            "Composition graph: {} normalize nodes, {} transitions, output {}",
            nodes.len(),
            transitions.len(),
            current
        );

        Ok(CompositionGraph {
            nodes,
            transitions,
            output: current,
            duration: plan.target_total_duration,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composition::planner::DurationPlanner;
    use image::ImageFormat;
    use std::path::PathBuf;

    fn assets(count: usize) -> Vec<ImageAsset> {
        (0..count)
            .map(|i| ImageAsset {
                source_url: format!("https://img/{}.jpg", i),
                local_path: PathBuf::from(format!("img_{:02}.jpg", i)),
                byte_size: 2048,
                width: 800,
                height: 800,
                format: ImageFormat::Jpeg,
                valid: true,
            })
            .collect()
    }

    #[test]
    fn test_single_image_graph() {
        let frame = FrameConfig::default();
        let plan = DurationPlanner::new(0.5, 1.5, 18.0).plan(8.0, 1).unwrap();
        let graph = GraphBuilder::new(&frame).build(&plan, &assets(1)).unwrap();

        assert_eq!(graph.nodes.len(), 1);
        assert!(graph.transitions.is_empty());
        assert_eq!(graph.output, StreamLabel::new("v0_base"));
        assert_eq!(graph.duration, 9.5);
    }

    #[test]
    fn test_transitions_chain_in_order() {
        let frame = FrameConfig::default();
        let plan = DurationPlanner::new(0.5, 1.5, 18.0).plan(12.0, 3).unwrap();
        let graph = GraphBuilder::new(&frame).build(&plan, &assets(3)).unwrap();

        assert_eq!(graph.transitions.len(), 2);

        let first = &graph.transitions[0];
        assert_eq!(first.from, StreamLabel::new("v0_base"));
        assert_eq!(first.to, StreamLabel::new("v1_base"));
        assert_eq!(first.offset, plan.transition_offset(1));
        assert_eq!(first.duration, 0.5);

        let second = &graph.transitions[1];
        assert_eq!(second.from, first.output);
        assert_eq!(second.to, StreamLabel::new("v2_base"));
        assert_eq!(second.offset, plan.transition_offset(2));
        assert_eq!(graph.output, second.output);
    }

    #[test]
    fn test_nodes_fill_configured_frame() {
        let frame = FrameConfig {
            fit: FitMode::BlurredBackdrop,
            ..FrameConfig::default()
        };
        let plan = DurationPlanner::new(0.5, 1.5, 18.0).plan(12.0, 2).unwrap();
        let graph = GraphBuilder::new(&frame).build(&plan, &assets(2)).unwrap();

        for (i, node) in graph.nodes.iter().enumerate() {
            assert_eq!(node.input, i);
            assert_eq!((node.width, node.height, node.fps), (1080, 1920, 30));
            assert_eq!(node.fit, FitMode::BlurredBackdrop);
        }
        assert_eq!(graph.nodes[0].foreground_width(), 900);
    }

    #[test]
    fn test_mismatched_asset_count_rejected() {
        let frame = FrameConfig::default();
        let plan = DurationPlanner::new(0.5, 1.5, 18.0).plan(12.0, 3).unwrap();
        assert!(GraphBuilder::new(&frame).build(&plan, &assets(2)).is_err());
    }
}
