use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// File extensions recognized as compilable video clips
pub const SUPPORTED_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv", "webm"];

/// Resolution and frame rate of a clip
///
/// Two profiles are considered matching when the resolutions are identical and
/// the frame rates agree within a small tolerance, since probed rates like
/// 29.97 rarely round-trip exactly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipProfile {
    /// Width in pixels
    pub width: u32,

    /// Height in pixels
    pub height: u32,

    /// Frames per second
    pub fps: f64,
}

impl ClipProfile {
    const FPS_TOLERANCE: f64 = 0.01;

    pub fn new(width: u32, height: u32, fps: f64) -> Self {
        Self { width, height, fps }
    }

    /// Check whether another profile is close enough to concatenate without
    /// normalization
    pub fn matches(&self, other: &ClipProfile) -> bool {
        self.width == other.width
            && self.height == other.height
            && (self.fps - other.fps).abs() < Self::FPS_TOLERANCE
    }
}

impl std::fmt::Display for ClipProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{} @ {:.2} fps", self.width, self.height, self.fps)
    }
}

/// Represents one source media file with probed metadata
#[derive(Debug, Clone)]
pub struct VideoClip {
    /// Path to the video file
    pub path: PathBuf,

    /// Duration in seconds
    pub duration: f64,

    /// Resolution and frame rate
    pub profile: ClipProfile,

    /// Filesystem creation time (falls back to modification time on
    /// filesystems without birth timestamps)
    pub created: SystemTime,
}

impl VideoClip {
    pub fn new<P: Into<PathBuf>>(
        path: P,
        duration: f64,
        profile: ClipProfile,
        created: SystemTime,
    ) -> Self {
        Self {
            path: path.into(),
            duration,
            profile,
            created,
        }
    }

    /// File name without directory components, for log output
    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("<unnamed>")
    }

    /// Produce the normalized successor of this clip
    ///
    /// The returned value points at the re-encoded copy and carries the
    /// reference profile; the original clip value is superseded by it.
    pub fn normalized_to<P: Into<PathBuf>>(&self, path: P, profile: ClipProfile) -> Self {
        Self {
            path: path.into(),
            duration: self.duration,
            profile,
            created: self.created,
        }
    }

    /// Check if a path carries a recognized video extension
    pub fn is_supported_path<P: AsRef<Path>>(path: P) -> bool {
        match path.as_ref().extension().and_then(|ext| ext.to_str()) {
            Some(ext) => SUPPORTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()),
            None => false,
        }
    }
}

/// Codec parameters handed to the encoder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodeParams {
    /// Video codec for the final encode
    pub video_codec: String,

    /// Audio codec for the final encode
    pub audio_codec: String,

    /// Encoder preset (speed/quality trade-off)
    pub preset: String,
}

impl Default for EncodeParams {
    fn default() -> Self {
        Self {
            video_codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
            preset: "medium".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clip(name: &str) -> VideoClip {
        VideoClip::new(
            name,
            10.0,
            ClipProfile::new(1920, 1080, 30.0),
            SystemTime::UNIX_EPOCH,
        )
    }

    #[test]
    fn test_supported_extensions() {
        assert!(VideoClip::is_supported_path("results/askreddit/final_video.mp4"));
        assert!(VideoClip::is_supported_path("intro.MOV"));
        assert!(VideoClip::is_supported_path("clip.webm"));
        assert!(!VideoClip::is_supported_path("notes.txt"));
        assert!(!VideoClip::is_supported_path("thumbnail.png"));
        assert!(!VideoClip::is_supported_path("no_extension"));
    }

    #[test]
    fn test_profile_matching_tolerance() {
        let reference = ClipProfile::new(1920, 1080, 29.97);

        assert!(reference.matches(&ClipProfile::new(1920, 1080, 29.970029)));
        assert!(!reference.matches(&ClipProfile::new(1920, 1080, 30.0)));
        assert!(!reference.matches(&ClipProfile::new(1280, 720, 29.97)));
    }

    #[test]
    fn test_normalized_clip_keeps_duration_and_time() {
        let original = clip("a.mp4");
        let target = ClipProfile::new(1280, 720, 25.0);
        let normalized = original.normalized_to("tmp/norm_0.mp4", target);

        assert_eq!(normalized.duration, original.duration);
        assert_eq!(normalized.created, original.created);
        assert_eq!(normalized.profile, target);
        assert_eq!(normalized.path, PathBuf::from("tmp/norm_0.mp4"));
    }
}
