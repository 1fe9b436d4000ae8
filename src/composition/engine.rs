use std::path::PathBuf;

use tracing::{debug, info};

use crate::{
    assets::{AssetAcquirer, HttpImageSource, ImageSource},
    audio::{AmbientTrack, AudioMixer, NarrationTrack},
    composition::{
        graph::GraphBuilder,
        job::{JobStage, RenderJob},
        planner::DurationPlanner,
    },
    config::Config,
    error::Result,
    render::{
        CompatibilityProfile, Encoder, FfmpegEncoder, RenderInvoker, RenderResult, RenderSpec,
    },
    scratch::ScratchDir,
};

/// Encoder output inside the job's scratch directory
const WORKING_FILE: &str = "render.mp4";

/// Inputs for one render job
#[derive(Debug, Clone)]
pub struct RenderRequest {
    /// Caller's key for the output, e.g. a product ASIN
    pub job_id: String,

    /// Product images in display order
    pub image_urls: Vec<String>,

    /// Measured narration; required for a successful render
    pub narration: Option<NarrationTrack>,

    /// Ambient bed overriding the configured one
    pub ambient: Option<AmbientTrack>,
}

impl RenderRequest {
    pub fn new<S: Into<String>>(job_id: S, image_urls: Vec<String>) -> Self {
        Self {
            job_id: job_id.into(),
            image_urls,
            narration: None,
            ambient: None,
        }
    }

    pub fn with_narration(mut self, narration: NarrationTrack) -> Self {
        self.narration = Some(narration);
        self
    }

    pub fn with_ambient(mut self, ambient: AmbientTrack) -> Self {
        self.ambient = Some(ambient);
        self
    }
}

/// Main composition engine that drives render jobs
///
/// Each call to [`render`](Self::render) is one job with a clear pipeline:
/// 1. Acquisition - Download and validate the product images
/// 2. Planning - Fit segment durations to the narration length
/// 3. Composition - Build the visual graph and the audio mix
/// 4. Rendering - Encode, validate and report the artifact
///
/// The engine holds no per-job state, so independent jobs may run
/// concurrently on one engine.
pub struct CompositionEngine<S = HttpImageSource, E = FfmpegEncoder> {
    config: Config,
    source: S,
    encoder: E,
}

impl CompositionEngine<HttpImageSource, FfmpegEncoder> {
    /// Create an engine that downloads over HTTP and encodes with ffmpeg
    pub fn new(config: Config) -> Result<Self> {
        let source = HttpImageSource::new(&config.acquisition)?;
        let encoder = FfmpegEncoder::new(&config.render);
        Self::with_parts(config, source, encoder)
    }
}

impl<S: ImageSource, E: Encoder> CompositionEngine<S, E> {
    /// Create an engine from explicit collaborators
    pub fn with_parts(config: Config, source: S, encoder: E) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, source, encoder })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn encoder(&self) -> &E {
        &self.encoder
    }

    /// Deterministic output location for a caller key
    pub fn output_path_for(&self, job_id: &str) -> PathBuf {
        self.config
            .render
            .output_dir
            .join(format!("video_{}.mp4", output_key(job_id)))
    }

    /// Run one job end to end
    ///
    /// Scratch files are removed whatever happens. The video is encoded
    /// inside the scratch directory and only moved to its output path once
    /// it has been validated, so a failed job leaves no artifact and never
    /// touches one left by an earlier run.
    pub async fn render(&self, request: RenderRequest) -> Result<RenderResult> {
        let key = output_key(&request.job_id);
        let output_path = self.output_path_for(&request.job_id);

        info!("🎬 Starting render job {}", key);
        info!("   Images: {}", request.image_urls.len());
        info!("   Output: {:?}", output_path);

        let scratch = ScratchDir::create(self.config.render.scratch_dir.as_deref(), &key)?;
        let mut job = RenderJob::new(key, output_path, scratch);

        let outcome = self.run(&mut job, &request).await;
        job.release_scratch();

        match outcome {
            Ok(result) => {
                job.advance(JobStage::Succeeded)?;
                info!("🎉 Render complete: {:?}", result.output_path);
                info!("      Duration: {:.2}s", result.duration_seconds);
                info!("      File size: {:.2} MB", result.byte_size as f64 / 1024.0 / 1024.0);
                Ok(result)
            }
            Err(e) => {
                job.fail(&e);
                Err(e)
            }
        }
    }

    async fn run(&self, job: &mut RenderJob, request: &RenderRequest) -> Result<RenderResult> {
        // ==========================================
        // STEP 1: ACQUISITION
        // ==========================================
        job.advance(JobStage::Acquiring)?;
        info!("🖼️  Step 1: Acquiring product images...");

        let assets = AssetAcquirer::new(&self.source, &self.config.acquisition)
            .acquire(&request.image_urls, job.scratch())
            .await?;
        job.assets = assets;

        // ==========================================
        // STEP 2: PLANNING
        // ==========================================
        job.advance(JobStage::Planning)?;
        info!("⏱️  Step 2: Planning segment timing...");

        let narration_duration = request
            .narration
            .as_ref()
            .map(|n| n.duration_seconds)
            .unwrap_or(0.0);
        let plan = DurationPlanner::from_config(&self.config.timing)
            .plan(narration_duration, job.assets.len())?;
        job.plan = Some(plan);

        // ==========================================
        // STEP 3: COMPOSITION
        // ==========================================
        job.advance(JobStage::Composing)?;
        info!("🎨 Step 3: Composing visuals and audio...");

        let graph = GraphBuilder::new(&self.config.frame).build(&plan, &job.assets)?;
        let ambient = self.resolve_ambient(request);
        let audio = AudioMixer::new(&self.config.audio).mix(
            request.narration.as_ref(),
            ambient.as_ref(),
            &plan,
        )?;

        // ==========================================
        // STEP 4: RENDERING
        // ==========================================
        job.advance(JobStage::Rendering)?;
        info!("🎬 Step 4: Rendering final video...");

        let spec = RenderSpec::new(
            &job.assets,
            &plan,
            graph,
            audio,
            CompatibilityProfile::from_config(&self.config),
            job.scratch().join(WORKING_FILE),
        )?;

        RenderInvoker::new(&self.encoder, &self.config.render)
            .invoke(&spec, job.output_path())
            .await
    }

    fn resolve_ambient(&self, request: &RenderRequest) -> Option<AmbientTrack> {
        let ambient = request.ambient.clone().or_else(|| {
            self.config
                .audio
                .ambient_track
                .as_deref()
                .and_then(AmbientTrack::discover)
        });
        debug!("Ambient track: {:?}", ambient.as_ref().map(|a| &a.path));
        ambient
    }
}

/// File-name-safe form of a caller key
pub fn output_key(job_id: &str) -> String {
    let key: String = job_id
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();

    if key.is_empty() {
        "unknown".to_string()
    } else {
        key
    }
}
