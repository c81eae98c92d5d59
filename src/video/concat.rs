//! Transition application, concatenation, and the normalization fallback.

use std::fs::create_dir_all;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::compilation::plan::CompilationPlan;
use crate::error::{ConcatError, Result};
use crate::video::ffmpeg::FfmpegCommand;
use crate::video::types::{ClipProfile, EncodeParams, VideoClip};

/// Joins a compilation plan into a single encoded stream
///
/// Concatenation is a two-strategy sequence: try the clips as they are, and if
/// FFmpeg rejects the join, re-derive every clip to the first main clip's
/// profile and try exactly once more. Normalized copies live in a scratch
/// directory that is removed on every exit path.
pub struct Concatenator {
    temp_dir: Option<PathBuf>,
}

impl Concatenator {
    pub fn new() -> Self {
        Self { temp_dir: None }
    }

    /// Concatenate all clips in plan order into `output`
    pub async fn concatenate(
        &mut self,
        plan: &CompilationPlan,
        transition: f64,
        encode: &EncodeParams,
        output: &Path,
    ) -> Result<()> {
        let clips: Vec<VideoClip> = plan.playback_order().cloned().collect();

        info!("Concatenating {} clip(s)", clips.len());
        match run_concat(&clips, transition, encode, output).await {
            Ok(()) => return Ok(()),
            Err(e) => {
                warn!("Direct concatenation failed: {}", e);
                warn!("This usually means the clips differ in resolution or frame rate");
            }
        }

        let reference = plan
            .reference_profile()
            .ok_or(ConcatError::MissingReference)?;
        info!("Normalizing all clips to {}", reference);

        let normalized = self.normalize_clips(&clips, reference, encode).await?;
        if normalized.is_empty() {
            return Err(ConcatError::NothingNormalized.into());
        }

        run_concat(&normalized, transition, encode, output)
            .await
            .map_err(|e| {
                ConcatError::Failed {
                    profile: reference.to_string(),
                    reason: e.to_string(),
                }
                .into()
            })
    }

    /// Re-encode every clip whose profile differs from the reference
    ///
    /// Clips already matching the reference are carried over untouched.
    /// A clip that fails to re-encode is dropped with a warning, mirroring
    /// the per-clip recovery policy used during discovery.
    async fn normalize_clips(
        &mut self,
        clips: &[VideoClip],
        reference: ClipProfile,
        encode: &EncodeParams,
    ) -> Result<Vec<VideoClip>> {
        let temp_dir = self.ensure_temp_dir()?;
        let mut normalized = Vec::with_capacity(clips.len());

        for (index, clip) in clips.iter().enumerate() {
            if clip.profile.matches(&reference) {
                normalized.push(clip.clone());
                continue;
            }

            let target = temp_dir.join(format!("normalized_{:02}.mp4", index));
            debug!(
                "Normalizing {} ({} -> {})",
                clip.file_name(),
                clip.profile,
                reference
            );

            let result = FfmpegCommand::new(&target)
                .input(&clip.path)
                .video_filter(format!(
                    "scale={}:{},fps={}",
                    reference.width, reference.height, reference.fps
                ))
                .video_codec(&encode.video_codec)
                .audio_codec(&encode.audio_codec)
                .preset(&encode.preset)
                .run()
                .await;

            match result {
                Ok(()) => normalized.push(clip.normalized_to(target, reference)),
                Err(e) => warn!("Could not normalize {}, skipping: {}", clip.file_name(), e),
            }
        }

        Ok(normalized)
    }

    fn ensure_temp_dir(&mut self) -> Result<PathBuf> {
        if let Some(ref temp_dir) = self.temp_dir {
            return Ok(temp_dir.clone());
        }

        let temp_dir = PathBuf::from(format!("./temp_clip_compiler_{}", std::process::id()));
        create_dir_all(&temp_dir)?;
        self.temp_dir = Some(temp_dir.clone());
        Ok(temp_dir)
    }

    /// Remove the scratch directory and every normalized copy inside it
    pub fn cleanup(&mut self) {
        if let Some(temp_dir) = self.temp_dir.take() {
            if let Err(e) = std::fs::remove_dir_all(&temp_dir) {
                warn!("Failed to remove temporary directory {:?}: {}", temp_dir, e);
            }
        }
    }
}

impl Default for Concatenator {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Concatenator {
    fn drop(&mut self) {
        self.cleanup();
    }
}

/// Run one concatenation attempt over the given clips, in order
async fn run_concat(
    clips: &[VideoClip],
    transition: f64,
    encode: &EncodeParams,
    output: &Path,
) -> Result<()> {
    let mut cmd = FfmpegCommand::new(output);
    for clip in clips {
        cmd = cmd.input(&clip.path);
    }

    cmd.filter_complex(build_filter_graph(clips, transition))
        .map("[outv]")
        .map("[outa]")
        .video_codec(&encode.video_codec)
        .audio_codec(&encode.audio_codec)
        .preset(&encode.preset)
        .run()
        .await
}

/// Build the filter graph joining all clips
///
/// Every clip except the last in playback order gets a one-sided fade-out at
/// its own tail; the following clip starts unfaded and audio passes through.
/// The fade start is clamped at zero for clips shorter than the transition.
fn build_filter_graph(clips: &[VideoClip], transition: f64) -> String {
    let mut filters = Vec::new();
    let mut concat_inputs = String::new();

    for (index, clip) in clips.iter().enumerate() {
        let is_last = index + 1 == clips.len();

        if !is_last && transition > 0.0 {
            let start = (clip.duration - transition).max(0.0);
            filters.push(format!(
                "[{index}:v]fade=t=out:st={start:.3}:d={transition:.3}[v{index}]"
            ));
            concat_inputs.push_str(&format!("[v{index}][{index}:a]"));
        } else {
            concat_inputs.push_str(&format!("[{index}:v][{index}:a]"));
        }
    }

    filters.push(format!(
        "{}concat=n={}:v=1:a=1[outv][outa]",
        concat_inputs,
        clips.len()
    ));

    filters.join(";")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::SystemTime;

    fn clip(name: &str, duration: f64) -> VideoClip {
        VideoClip::new(
            name,
            duration,
            ClipProfile::new(1920, 1080, 30.0),
            SystemTime::UNIX_EPOCH,
        )
    }

    #[test]
    fn test_fade_applied_to_all_but_last() {
        let clips = vec![clip("a.mp4", 20.0), clip("b.mp4", 20.0), clip("c.mp4", 20.0)];
        let graph = build_filter_graph(&clips, 0.5);

        assert_eq!(graph.matches("fade=t=out").count(), 2);
        assert!(graph.contains("[0:v]fade=t=out:st=19.500:d=0.500[v0]"));
        assert!(graph.contains("[1:v]fade=t=out:st=19.500:d=0.500[v1]"));
        // last clip feeds concat unfaded
        assert!(graph.contains("[v1][1:a][2:v][2:a]concat=n=3:v=1:a=1[outv][outa]"));
    }

    #[test]
    fn test_zero_transition_disables_fades() {
        let clips = vec![clip("a.mp4", 20.0), clip("b.mp4", 20.0)];
        let graph = build_filter_graph(&clips, 0.0);

        assert!(!graph.contains("fade"));
        assert_eq!(graph, "[0:v][0:a][1:v][1:a]concat=n=2:v=1:a=1[outv][outa]");
    }

    #[test]
    fn test_single_clip_never_faded() {
        let clips = vec![clip("only.mp4", 12.0)];
        let graph = build_filter_graph(&clips, 2.0);

        assert!(!graph.contains("fade"));
        assert_eq!(graph, "[0:v][0:a]concat=n=1:v=1:a=1[outv][outa]");
    }

    #[test]
    fn test_fade_start_clamped_for_short_clips() {
        let clips = vec![clip("short.mp4", 0.3), clip("b.mp4", 20.0)];
        let graph = build_filter_graph(&clips, 1.0);

        assert!(graph.contains("st=0.000"));
    }

    #[test]
    fn test_cleanup_removes_scratch_dir() {
        let mut concatenator = Concatenator::new();
        let temp_dir = concatenator.ensure_temp_dir().unwrap();
        assert!(temp_dir.is_dir());

        concatenator.cleanup();
        assert!(!temp_dir.exists());
    }
}
