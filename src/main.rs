use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, Level};

use reel_compositor::{
    audio::{AmbientTrack, NarrationLoader},
    composition::{CompositionEngine, RenderRequest},
    config::Config,
};

#[derive(Parser)]
#[command(
    name = "reel-compositor",
    version,
    about = "Compose product images and narration into a vertical video",
    long_about = "Reel-Compositor downloads product images, crossfades them in time with a narration track and encodes a platform-ready 9:16 mp4."
)]
struct Cli {
    /// Product identifier used to name the output file
    #[arg(long)]
    id: String,

    /// Image URL, repeat for each image in display order
    #[arg(short, long = "image", required = true)]
    images: Vec<String>,

    /// Narration audio file (WAV, MP3, FLAC, OGG, M4A or raw PCM)
    #[arg(short, long)]
    narration: Option<PathBuf>,

    /// Treat the narration as raw signed 16-bit PCM, e.g. 24000:1
    #[arg(long, value_name = "RATE:CHANNELS", value_parser = parse_pcm)]
    narration_pcm: Option<(u32, u16)>,

    /// Ambient music bed overriding the configured one
    #[arg(short, long)]
    ambient: Option<PathBuf>,

    /// Configuration file (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory for finished videos
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn parse_pcm(value: &str) -> std::result::Result<(u32, u16), String> {
    let (rate, channels) = value
        .split_once(':')
        .ok_or_else(|| format!("expected RATE:CHANNELS, got '{}'", value))?;
    let rate = rate.parse().map_err(|_| format!("invalid sample rate '{}'", rate))?;
    let channels = channels
        .parse()
        .map_err(|_| format!("invalid channel count '{}'", channels))?;
    Ok((rate, channels))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt().with_max_level(log_level).init();

    info!("Starting Reel-Compositor v{}", env!("CARGO_PKG_VERSION"));
    info!("Job: {}", cli.id);
    info!("Images: {}", cli.images.len());
    info!("Narration: {:?}", cli.narration);

    // Load configuration
    let mut config = match cli.config {
        Some(config_path) => {
            info!("Loading configuration from {:?}", config_path);
            Config::from_file(&config_path)?
        }
        None => {
            info!("Using default configuration");
            Config::default()
        }
    };
    if let Some(output_dir) = cli.output_dir {
        config.render.output_dir = output_dir;
    }

    let narration = match (cli.narration, cli.narration_pcm) {
        (Some(path), Some((rate, channels))) => Some(
            NarrationLoader::measure_pcm(&path, rate, channels)
                .await
                .with_context(|| format!("measuring raw narration {:?}", path))?,
        ),
        (Some(path), None) => Some(
            NarrationLoader::measure(&path)
                .await
                .with_context(|| format!("measuring narration {:?}", path))?,
        ),
        (None, _) => None,
    };

    let mut request = RenderRequest::new(cli.id, cli.images);
    if let Some(narration) = narration {
        info!("Narration length: {:.2}s", narration.duration_seconds);
        request = request.with_narration(narration);
    }
    if let Some(ambient) = cli.ambient {
        request = request.with_ambient(AmbientTrack::new(ambient));
    }

    let engine = CompositionEngine::new(config)?;
    info!("Output directory: {:?}", engine.config().render.output_dir);

    match engine.render(request).await {
        Ok(result) => {
            info!("Video saved to: {:?}", result.output_path);
            println!(
                "{}\t{:.3}\t{}",
                result.output_path.display(),
                result.duration_seconds,
                result.byte_size
            );
            Ok(())
        }
        Err(e) => {
            error!("Render failed ({}): {}", e.kind(), e.diagnostic());
            Err(e.into())
        }
    }
}
