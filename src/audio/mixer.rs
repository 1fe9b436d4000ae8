use tracing::{debug, info, warn};

use crate::{
    audio::types::{AmbientTrack, NarrationTrack},
    composition::planner::RenderPlan,
    config::AudioConfig,
    error::{AudioError, Result},
};

/// Final audio stream description handed to the renderer
#[derive(Debug, Clone, PartialEq)]
pub enum AudioMix {
    /// Boosted narration padded with silence to the video length
    NarrationOnly {
        narration: NarrationTrack,
        gain: f64,
        duration: f64,
    },

    /// Narration over a looped, heavily attenuated ambient bed
    WithAmbient {
        narration: NarrationTrack,
        narration_gain: f64,
        ambient: AmbientTrack,
        ambient_gain: f64,
        duration: f64,
    },
}

impl AudioMix {
    pub fn narration(&self) -> &NarrationTrack {
        match self {
            Self::NarrationOnly { narration, .. } | Self::WithAmbient { narration, .. } => narration,
        }
    }

    pub fn ambient(&self) -> Option<&AmbientTrack> {
        match self {
            Self::NarrationOnly { .. } => None,
            Self::WithAmbient { ambient, .. } => Some(ambient),
        }
    }

    /// Length of the mixed stream in seconds
    pub fn duration(&self) -> f64 {
        match self {
            Self::NarrationOnly { duration, .. } | Self::WithAmbient { duration, .. } => *duration,
        }
    }
}

/// Decides how narration and ambient audio are combined for one job
pub struct AudioMixer<'a> {
    config: &'a AudioConfig,
}

impl<'a> AudioMixer<'a> {
    pub fn new(config: &'a AudioConfig) -> Self {
        Self { config }
    }

    /// Build the mix for `plan`
    ///
    /// A job without a readable narration fails with
    /// [`AudioError::MissingNarration`]; silent videos are never produced.
    /// An ambient track that cannot be read is dropped with a warning.
    pub fn mix(
        &self,
        narration: Option<&NarrationTrack>,
        ambient: Option<&AmbientTrack>,
        plan: &RenderPlan,
    ) -> Result<AudioMix> {
        let narration = narration.ok_or_else(|| AudioError::MissingNarration {
            reason: "no narration track supplied".to_string(),
        })?;

        if !narration.is_readable() {
            return Err(AudioError::MissingNarration {
                reason: format!("{} is missing or empty", narration.path.display()),
            }
            .into());
        }

        let duration = plan.target_total_duration;

        let ambient = ambient.filter(|track| {
            let readable = track.is_readable();
            if !readable {
                warn!("Ambient track {:?} is unreadable, using narration only", track.path);
            }
            readable
        });

        let mix = match ambient {
            Some(ambient) => {
                debug!(
                    "Mixing narration x{} with ambient x{} from {:?}",
                    self.config.narration_gain, self.config.ambient_gain, ambient.path
                );
                AudioMix::WithAmbient {
                    narration: narration.clone(),
                    narration_gain: self.config.narration_gain,
                    ambient: ambient.clone(),
                    ambient_gain: self.config.ambient_gain,
                    duration,
                }
            }
            None => AudioMix::NarrationOnly {
                narration: narration.clone(),
                gain: self.config.narration_gain,
                duration,
            },
        };

        info!(
            "   Audio: narration {:.2}s{} -> {:.2}s",
            narration.duration_seconds,
            if mix.ambient().is_some() { " + ambient" } else { "" },
            duration
        );

        Ok(mix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composition::planner::DurationPlanner;
    use crate::config::TimingConfig;
    use crate::error::FailureKind;
    use tempfile::tempdir;

    fn plan() -> RenderPlan {
        DurationPlanner::from_config(&TimingConfig::default()).plan(12.0, 3).unwrap()
    }

    #[test]
    fn test_missing_narration_fails() {
        let config = AudioConfig::default();
        let err = AudioMixer::new(&config).mix(None, None, &plan()).unwrap_err();
        assert_eq!(err.kind(), FailureKind::MissingNarration);
    }

    #[test]
    fn test_unreadable_narration_fails() {
        let config = AudioConfig::default();
        let narration = NarrationTrack::new("/nonexistent/voice.mp3", 12.0);
        let err = AudioMixer::new(&config).mix(Some(&narration), None, &plan()).unwrap_err();
        assert_eq!(err.kind(), FailureKind::MissingNarration);
    }

    #[test]
    fn test_narration_only_without_ambient() {
        let dir = tempdir().unwrap();
        let voice = dir.path().join("voice.mp3");
        std::fs::write(&voice, b"ID3").unwrap();
        let config = AudioConfig::default();
        let narration = NarrationTrack::new(&voice, 12.0);
        let missing_bed = AmbientTrack::new(dir.path().join("bed.mp3"));

        let mix = AudioMixer::new(&config)
            .mix(Some(&narration), Some(&missing_bed), &plan())
            .unwrap();

        assert_eq!(
            mix,
            AudioMix::NarrationOnly {
                narration,
                gain: 2.0,
                duration: 13.5,
            }
        );
    }

    #[test]
    fn test_ambient_mixed_at_configured_gains() {
        let dir = tempdir().unwrap();
        let voice = dir.path().join("voice.mp3");
        let bed = dir.path().join("bed.mp3");
        std::fs::write(&voice, b"ID3").unwrap();
        std::fs::write(&bed, b"ID3").unwrap();
        let config = AudioConfig::default();
        let narration = NarrationTrack::new(&voice, 12.0);
        let ambient = AmbientTrack::new(&bed);

        let mix = AudioMixer::new(&config)
            .mix(Some(&narration), Some(&ambient), &plan())
            .unwrap();

        match mix {
            AudioMix::WithAmbient { narration_gain, ambient_gain, duration, .. } => {
                assert_eq!(narration_gain, 2.0);
                assert_eq!(ambient_gain, 0.05);
                assert!(ambient_gain < narration_gain);
                assert_eq!(duration, 13.5);
            }
            other => panic!("expected ambient mix, got {:?}", other),
        }
    }
}
