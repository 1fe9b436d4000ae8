use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, error};

use crate::{
    assets::ImageAsset,
    composition::planner::RenderPlan,
    error::{CompositorError, FailureKind, Result},
    scratch::ScratchDir,
};

/// Lifecycle of a render job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobStage {
    Pending,
    Acquiring,
    Planning,
    Composing,
    Rendering,
    Succeeded,
    Failed,
}

impl JobStage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }

    /// The stage that follows this one on the success path
    pub fn next(&self) -> Option<JobStage> {
        match self {
            Self::Pending => Some(Self::Acquiring),
            Self::Acquiring => Some(Self::Planning),
            Self::Planning => Some(Self::Composing),
            Self::Composing => Some(Self::Rendering),
            Self::Rendering => Some(Self::Succeeded),
            Self::Succeeded | Self::Failed => None,
        }
    }

    pub fn can_transition_to(&self, to: JobStage) -> bool {
        if self.is_terminal() {
            return false;
        }
        to == Self::Failed || self.next() == Some(to)
    }
}

impl fmt::Display for JobStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// One end-to-end execution of the pipeline
///
/// Owns the downloaded images, the plan and the scratch directory. The
/// scratch directory goes away with the job.
#[derive(Debug)]
pub struct RenderJob {
    id: String,
    output_path: PathBuf,
    stage: JobStage,
    failed_at: Option<JobStage>,
    failure: Option<FailureKind>,
    scratch: ScratchDir,
    pub assets: Vec<ImageAsset>,
    pub plan: Option<RenderPlan>,
}

impl RenderJob {
    pub fn new<S: Into<String>>(id: S, output_path: PathBuf, scratch: ScratchDir) -> Self {
        Self {
            id: id.into(),
            output_path,
            stage: JobStage::Pending,
            failed_at: None,
            failure: None,
            scratch,
            assets: Vec::new(),
            plan: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn scratch(&self) -> &ScratchDir {
        &self.scratch
    }

    pub fn stage(&self) -> JobStage {
        self.stage
    }

    /// Stage that was running when the job failed
    pub fn failed_at(&self) -> Option<JobStage> {
        self.failed_at
    }

    pub fn failure(&self) -> Option<FailureKind> {
        self.failure
    }

    /// Move to `next`, rejecting anything off the lifecycle
    pub fn advance(&mut self, next: JobStage) -> Result<()> {
        if !self.stage.can_transition_to(next) {
            return Err(CompositorError::generic(format!(
                "Job {} cannot move from {} to {}",
                self.id, self.stage, next
            )));
        }
        debug!("Job {}: {} -> {}", self.id, self.stage, next);
        self.stage = next;
        Ok(())
    }

    /// Record a terminal failure
    pub fn fail(&mut self, err: &CompositorError) {
        if self.stage.is_terminal() {
            return;
        }
        error!("Job {} failed during {}: {}", self.id, self.stage, err);
        self.failed_at = Some(self.stage);
        self.failure = Some(err.kind());
        self.stage = JobStage::Failed;
    }

    /// Drop intermediates now rather than at drop time
    pub fn release_scratch(&mut self) {
        self.assets.clear();
        self.scratch.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AudioError;

    fn job() -> RenderJob {
        let scratch = ScratchDir::create(None, "job").unwrap();
        RenderJob::new("job", PathBuf::from("video_job.mp4"), scratch)
    }

    #[test]
    fn test_success_path() {
        let mut job = job();
        let mut stage = JobStage::Pending;
        while let Some(next) = stage.next() {
            job.advance(next).unwrap();
            stage = next;
        }
        assert_eq!(job.stage(), JobStage::Succeeded);
        assert!(job.advance(JobStage::Failed).is_err());
    }

    #[test]
    fn test_stages_cannot_be_skipped() {
        let mut job = job();
        assert!(job.advance(JobStage::Planning).is_err());
        job.advance(JobStage::Acquiring).unwrap();
        assert!(job.advance(JobStage::Rendering).is_err());
        assert!(job.advance(JobStage::Pending).is_err());
    }

    #[test]
    fn test_failure_from_any_live_stage() {
        for stage in [
            JobStage::Pending,
            JobStage::Acquiring,
            JobStage::Planning,
            JobStage::Composing,
            JobStage::Rendering,
        ] {
            assert!(stage.can_transition_to(JobStage::Failed));
        }

        let mut job = job();
        job.advance(JobStage::Acquiring).unwrap();
        job.advance(JobStage::Planning).unwrap();
        job.advance(JobStage::Composing).unwrap();
        job.fail(&AudioError::MissingNarration { reason: "none".into() }.into());

        assert_eq!(job.stage(), JobStage::Failed);
        assert_eq!(job.failed_at(), Some(JobStage::Composing));
        assert_eq!(job.failure(), Some(FailureKind::MissingNarration));
        assert!(job.advance(JobStage::Rendering).is_err());
    }

    #[test]
    fn test_release_scratch_removes_directory() {
        let mut job = job();
        let path = job.scratch().path().to_path_buf();
        job.release_scratch();
        assert!(!path.exists());
    }
}
