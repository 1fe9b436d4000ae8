use std::path::{Path, PathBuf};

use crate::{
    assets::ImageAsset,
    audio::{AudioMix, NarrationFormat},
    composition::{graph::CompositionGraph, planner::RenderPlan},
    error::{CompositorError, Result},
    render::{
        filtergraph::{self, seconds, AUDIO_OUT, VIDEO_OUT},
        profile::CompatibilityProfile,
    },
};

/// A still image fed to the encoder as a looped input
#[derive(Debug, Clone, PartialEq)]
pub struct ImageInput {
    pub path: PathBuf,
    pub duration: f64,
}

/// Everything the encoder needs for one job, as plain data
#[derive(Debug, Clone)]
pub struct RenderSpec {
    pub images: Vec<ImageInput>,
    pub graph: CompositionGraph,
    pub audio: AudioMix,
    pub profile: CompatibilityProfile,

    /// Hard upper bound on output length (seconds)
    pub duration: f64,
    pub output_path: PathBuf,
}

impl RenderSpec {
    pub fn new(
        assets: &[ImageAsset],
        plan: &RenderPlan,
        graph: CompositionGraph,
        audio: AudioMix,
        profile: CompatibilityProfile,
        output_path: PathBuf,
    ) -> Result<Self> {
        if assets.len() != graph.input_count() {
            return Err(CompositorError::generic(format!(
                "Graph expects {} inputs but {} images were acquired",
                graph.input_count(),
                assets.len()
            )));
        }

        let images = assets
            .iter()
            .map(|asset| ImageInput {
                path: asset.local_path.clone(),
                duration: plan.segment_duration,
            })
            .collect();

        Ok(Self {
            images,
            graph,
            audio,
            profile,
            duration: plan.target_total_duration,
            output_path,
        })
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// The complete `-filter_complex` argument
    pub fn filter_complex(&self) -> String {
        let mut chains = filtergraph::video_chains(&self.graph);
        chains.extend(filtergraph::audio_chains(&self.audio, self.images.len()));
        chains.join(";")
    }

    /// Argument vector for an ffmpeg invocation, without the binary name
    pub fn to_ffmpeg_args(&self) -> Vec<String> {
        let mut args: Vec<String> = vec!["-hide_banner".into(), "-nostdin".into(), "-y".into()];

        let framerate = self.profile.fps.to_string();
        for image in &self.images {
            args.extend([
                "-loop".to_string(),
                "1".to_string(),
                "-framerate".to_string(),
                framerate.clone(),
                "-t".to_string(),
                seconds(image.duration),
                "-i".to_string(),
                image.path.display().to_string(),
            ]);
        }

        let narration = self.audio.narration();
        if let NarrationFormat::PcmS16le { sample_rate, channels } = narration.format {
            args.extend([
                "-f".to_string(),
                "s16le".to_string(),
                "-ar".to_string(),
                sample_rate.to_string(),
                "-ac".to_string(),
                channels.to_string(),
            ]);
        }
        args.push("-i".to_string());
        args.push(narration.path.display().to_string());

        if let Some(ambient) = self.audio.ambient() {
            args.extend([
                "-stream_loop".to_string(),
                "-1".to_string(),
                "-i".to_string(),
                ambient.path.display().to_string(),
            ]);
        }

        args.push("-filter_complex".to_string());
        args.push(self.filter_complex());
        args.push("-map".to_string());
        args.push(format!("[{}]", VIDEO_OUT));
        args.push("-map".to_string());
        args.push(format!("[{}]", AUDIO_OUT));

        args.extend(self.profile.output_args());

        args.push("-t".to_string());
        args.push(seconds(self.duration));
        args.push(self.output_path.display().to_string());

        args
    }
}
