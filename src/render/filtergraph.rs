//! Serialization of composition graphs and audio mixes into ffmpeg
//! `-filter_complex` syntax.
//!
//! Timing values are written with `f64`'s shortest round-trip formatting so
//! ffmpeg parses back exactly the offsets the planner computed.

use crate::{
    audio::AudioMix,
    composition::graph::{CompositionGraph, NormalizeNode, TransitionEdge},
    config::FitMode,
};

/// Label of the finished video stream
pub const VIDEO_OUT: &str = "vout";

/// Label of the finished audio stream
pub const AUDIO_OUT: &str = "aout";

/// Seconds as ffmpeg expects them
pub fn seconds(value: f64) -> String {
    format!("{}", value)
}

/// Filter chains for the visual stream, ending in `[vout]`
pub fn video_chains(graph: &CompositionGraph) -> Vec<String> {
    let mut chains: Vec<String> = graph.nodes.iter().flat_map(normalize_chains).collect();
    chains.extend(graph.transitions.iter().map(transition_chain));
    chains.push(format!("{}format=yuv420p[{}]", graph.output, VIDEO_OUT));
    chains
}

fn normalize_chains(node: &NormalizeNode) -> Vec<String> {
    let (w, h) = (node.width, node.height);
    let i = node.input;
    let finish = format!("setsar=1,fps={},format=yuv420p{}", node.fps, node.output);

    match node.fit {
        FitMode::Pad => vec![format!(
            "[{i}:v]scale={w}:{h}:force_original_aspect_ratio=decrease,\
             pad={w}:{h}:(ow-iw)/2:(oh-ih)/2:color=black,{finish}"
        )],
        FitMode::Crop => vec![format!(
            "[{i}:v]scale={w}:{h}:force_original_aspect_ratio=increase,crop={w}:{h},{finish}"
        )],
        FitMode::BlurredBackdrop => {
            let fg = node.foreground_width();
            vec![
                format!("[{i}:v]split=2[v{i}_bgsrc][v{i}_fgsrc]"),
                format!(
                    "[v{i}_bgsrc]scale={w}:{h}:force_original_aspect_ratio=increase,\
                     crop={w}:{h},boxblur=20:10[v{i}_bg]"
                ),
                format!("[v{i}_fgsrc]scale={fg}:{h}:force_original_aspect_ratio=decrease[v{i}_fg]"),
                format!("[v{i}_bg][v{i}_fg]overlay=(W-w)/2:(H-h)/2,{finish}"),
            ]
        }
    }
}

fn transition_chain(edge: &TransitionEdge) -> String {
    format!(
        "{}{}xfade=transition={}:duration={}:offset={}{}",
        edge.from,
        edge.to,
        edge.kind.name(),
        seconds(edge.duration),
        seconds(edge.offset),
        edge.output
    )
}

/// Filter chains for the audio stream, ending in `[aout]`
///
/// `narration_input` is the encoder input index of the narration; the
/// ambient bed, when present, is the input right after it.
pub fn audio_chains(mix: &AudioMix, narration_input: usize) -> Vec<String> {
    let duration = seconds(mix.duration());
    match mix {
        AudioMix::NarrationOnly { gain, .. } => vec![format!(
            "[{}:a]volume={},apad=whole_dur={}[{}]",
            narration_input, gain, duration, AUDIO_OUT
        )],
        AudioMix::WithAmbient {
            narration_gain,
            ambient_gain,
            ..
        } => vec![
            format!(
                "[{}:a]volume={},apad=whole_dur={}[v_a]",
                narration_input, narration_gain, duration
            ),
            format!(
                "[{}:a]volume={},atrim=0:{}[m_a]",
                narration_input + 1,
                ambient_gain,
                duration
            ),
            format!("[v_a][m_a]amix=inputs=2:duration=first[{}]", AUDIO_OUT),
        ],
    }
}
