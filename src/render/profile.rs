use crate::config::Config;

/// Container and codec parameters for publish-ready output
///
/// H.264 High@4.0 in yuv420p with bt709 tags, stereo 44.1 kHz AAC, and
/// the moov atom up front so playback can start before the download ends.
#[derive(Debug, Clone, PartialEq)]
pub struct CompatibilityProfile {
    pub width: u32,
    pub height: u32,
    pub fps: u32,

    pub video_codec: String,
    pub codec_profile: String,
    pub level: String,
    pub pixel_format: String,
    pub crf: u8,
    pub preset: String,

    pub color_primaries: String,
    pub color_trc: String,
    pub colorspace: String,
    pub color_range: String,

    pub audio_codec: String,
    pub audio_bitrate_kbps: u32,
    pub sample_rate: u32,
    pub channels: u16,

    pub faststart: bool,
}

impl CompatibilityProfile {
    pub fn from_config(config: &Config) -> Self {
        Self {
            width: config.frame.width,
            height: config.frame.height,
            fps: config.frame.fps,
            video_codec: "libx264".to_string(),
            codec_profile: "high".to_string(),
            level: "4.0".to_string(),
            pixel_format: "yuv420p".to_string(),
            crf: config.render.crf,
            preset: config.render.preset.clone(),
            color_primaries: "bt709".to_string(),
            color_trc: "bt709".to_string(),
            colorspace: "bt709".to_string(),
            color_range: "tv".to_string(),
            audio_codec: "aac".to_string(),
            audio_bitrate_kbps: config.audio.bitrate_kbps,
            sample_rate: config.audio.sample_rate,
            channels: config.audio.channels,
            faststart: true,
        }
    }

    /// Encoder output options, excluding mapping, duration and the path
    pub fn output_args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(32);
        let mut push = |flag: &str, value: String| {
            args.push(flag.to_string());
            args.push(value);
        };

        push("-c:v", self.video_codec.clone());
        push("-preset", self.preset.clone());
        push("-profile:v", self.codec_profile.clone());
        push("-level:v", self.level.clone());
        push("-pix_fmt", self.pixel_format.clone());
        push("-crf", self.crf.to_string());
        push("-r", self.fps.to_string());
        push("-color_range", self.color_range.clone());
        push("-colorspace", self.colorspace.clone());
        push("-color_trc", self.color_trc.clone());
        push("-color_primaries", self.color_primaries.clone());
        push("-c:a", self.audio_codec.clone());
        push("-b:a", format!("{}k", self.audio_bitrate_kbps));
        push("-ar", self.sample_rate.to_string());
        push("-ac", self.channels.to_string());
        if self.faststart {
            push("-movflags", "+faststart".to_string());
        }

        args
    }
}
