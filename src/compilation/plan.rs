//! Compilation plan assembly: ordered clips plus optional bracket clips.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{PlanError, Result};
use crate::video::probe::probe_clip;
use crate::video::types::{ClipProfile, EncodeParams, VideoClip};

/// Ordered clip sequence about to be rendered
///
/// Partitioned into an optional intro, the selected main clips, and an
/// optional outro. Playback order is `[intro?] + main + [outro?]`; the main
/// segment keeps the selection policy's most-recent-first ordering.
#[derive(Debug, Clone)]
pub struct CompilationPlan {
    pub intro: Option<VideoClip>,
    pub main: Vec<VideoClip>,
    pub outro: Option<VideoClip>,
}

impl CompilationPlan {
    /// Total number of clips across all partitions
    pub fn len(&self) -> usize {
        self.main.len() + self.intro.iter().count() + self.outro.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate all clips in final playback order
    pub fn playback_order(&self) -> impl Iterator<Item = &VideoClip> {
        self.intro
            .iter()
            .chain(self.main.iter())
            .chain(self.outro.iter())
    }

    /// The normalization reference: the first main clip's profile
    ///
    /// Bracket clips are never used as the reference, even when an intro
    /// plays first.
    pub fn reference_profile(&self) -> Option<ClipProfile> {
        self.main.first().map(|clip| clip.profile)
    }

    /// Planned duration in seconds, before transitions
    pub fn total_duration(&self) -> f64 {
        self.playback_order().map(|clip| clip.duration).sum()
    }
}

/// Binds a finished plan to its output file and codec parameters
#[derive(Debug, Clone)]
pub struct RenderJob {
    pub plan: CompilationPlan,
    pub output_path: PathBuf,
    pub encode: EncodeParams,
}

/// Build the final plan from the selected main clips and optional bracket
/// paths
///
/// An intro or outro that fails validation is omitted with a warning; the
/// run continues. Only a plan with zero clips overall is an error.
pub async fn assemble(
    main: Vec<VideoClip>,
    intro: Option<&Path>,
    outro: Option<&Path>,
) -> Result<CompilationPlan> {
    let intro = load_bracket("intro", intro).await;
    let outro = load_bracket("outro", outro).await;

    let plan = CompilationPlan { intro, main, outro };

    if plan.is_empty() {
        return Err(PlanError::EmptyPlan.into());
    }

    Ok(plan)
}

async fn load_bracket(role: &str, path: Option<&Path>) -> Option<VideoClip> {
    let path = path?;

    match validate_bracket(path).await {
        Ok(clip) => {
            info!("Loaded {} clip: {} ({:.1}s)", role, clip.file_name(), clip.duration);
            Some(clip)
        }
        Err(e) => {
            warn!("Omitting {} clip: {}", role, e);
            None
        }
    }
}

/// Validate and open a bracket clip path
///
/// The path must exist, carry a recognized video extension, and be probeable;
/// any failure is an [`PlanError::InvalidSource`].
pub async fn validate_bracket(path: &Path) -> Result<VideoClip> {
    check_bracket_path(path)?;

    probe_clip(path).await.map_err(|e| {
        PlanError::InvalidSource {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }
        .into()
    })
}

fn check_bracket_path(path: &Path) -> Result<()> {
    if !path.is_file() {
        return Err(PlanError::InvalidSource {
            path: path.to_path_buf(),
            reason: "file does not exist".to_string(),
        }
        .into());
    }

    if !VideoClip::is_supported_path(path) {
        return Err(PlanError::InvalidSource {
            path: path.to_path_buf(),
            reason: "not a supported video format".to_string(),
        }
        .into());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};
    use tempfile::tempdir;

    fn clip(name: &str, width: u32) -> VideoClip {
        VideoClip::new(
            name,
            20.0,
            ClipProfile::new(width, 1080, 30.0),
            SystemTime::UNIX_EPOCH + Duration::from_secs(1),
        )
    }

    #[test]
    fn test_playback_order() {
        let plan = CompilationPlan {
            intro: Some(clip("intro.mp4", 1280)),
            main: vec![clip("a.mp4", 1920), clip("b.mp4", 1920)],
            outro: Some(clip("outro.mp4", 1280)),
        };

        let order: Vec<_> = plan.playback_order().map(|c| c.file_name()).collect();
        assert_eq!(order, vec!["intro.mp4", "a.mp4", "b.mp4", "outro.mp4"]);
        assert_eq!(plan.len(), 4);
        assert_eq!(plan.total_duration(), 80.0);
    }

    #[test]
    fn test_reference_profile_ignores_brackets() {
        let plan = CompilationPlan {
            intro: Some(clip("intro.mp4", 1280)),
            main: vec![clip("a.mp4", 1920)],
            outro: None,
        };

        // the intro plays first but the first *main* clip is the reference
        let reference = plan.reference_profile().unwrap();
        assert_eq!(reference.width, 1920);
    }

    #[test]
    fn test_reference_profile_empty_main() {
        let plan = CompilationPlan {
            intro: Some(clip("intro.mp4", 1280)),
            main: Vec::new(),
            outro: None,
        };

        assert!(plan.reference_profile().is_none());
    }

    #[tokio::test]
    async fn test_assemble_empty_plan_fails() {
        let result = assemble(Vec::new(), None, None).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_invalid_bracket_is_omitted() {
        let dir = tempdir().unwrap();
        let bogus = dir.path().join("missing_outro.mp4");

        let plan = assemble(
            vec![clip("a.mp4", 1920), clip("b.mp4", 1920)],
            None,
            Some(bogus.as_path()),
        )
        .await
        .unwrap();

        assert!(plan.intro.is_none());
        assert!(plan.outro.is_none());
        assert_eq!(plan.len(), 2);
    }

    #[tokio::test]
    async fn test_bracket_with_wrong_extension_is_omitted() {
        let dir = tempdir().unwrap();
        let text_file = dir.path().join("intro.txt");
        std::fs::write(&text_file, b"not a video").unwrap();

        let plan = assemble(vec![clip("a.mp4", 1920)], Some(text_file.as_path()), None)
            .await
            .unwrap();

        assert!(plan.intro.is_none());
        assert_eq!(plan.len(), 1);
    }
}
