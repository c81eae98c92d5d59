//! FFprobe-based clip metadata extraction.

use std::path::Path;
use std::process::Stdio;
use std::time::SystemTime;

use serde::Deserialize;
use tokio::process::Command;

use crate::error::{InventoryError, Result};
use crate::video::types::{ClipProfile, VideoClip};

/// FFprobe JSON output format
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: String,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
}

/// Probe a video file and build a [`VideoClip`] from its metadata
///
/// Fails if the file is missing, ffprobe rejects it, or it has no video
/// stream. Callers doing bulk discovery treat failures as skip-and-warn.
pub async fn probe_clip<P: AsRef<Path>>(path: P) -> Result<VideoClip> {
    let path = path.as_ref();

    if !path.is_file() {
        return Err(InventoryError::ProbeFailed {
            path: path.to_path_buf(),
            reason: "file does not exist".to_string(),
        }
        .into());
    }

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| InventoryError::ProbeFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(InventoryError::ProbeFailed {
            path: path.to_path_buf(),
            reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
        .into());
    }

    let probe: FfprobeOutput =
        serde_json::from_slice(&output.stdout).map_err(|e| InventoryError::ProbeFailed {
            path: path.to_path_buf(),
            reason: format!("unparseable ffprobe output: {}", e),
        })?;

    let video_stream = probe
        .streams
        .iter()
        .find(|s| s.codec_type == "video")
        .ok_or_else(|| InventoryError::ProbeFailed {
            path: path.to_path_buf(),
            reason: "no video stream found".to_string(),
        })?;

    let duration = probe
        .format
        .duration
        .as_ref()
        .and_then(|d| d.parse::<f64>().ok())
        .unwrap_or(0.0);

    let fps = video_stream
        .avg_frame_rate
        .as_ref()
        .or(video_stream.r_frame_rate.as_ref())
        .and_then(|r| parse_frame_rate(r))
        .unwrap_or(30.0);

    let profile = ClipProfile::new(
        video_stream.width.unwrap_or(0),
        video_stream.height.unwrap_or(0),
        fps,
    );

    Ok(VideoClip::new(path, duration, profile, creation_time(path)))
}

/// Filesystem creation time of a clip, used for recency ordering
///
/// Not every filesystem records a birth time; modification time is the
/// fallback, and the epoch keeps the ordering total if even that is missing.
fn creation_time(path: &Path) -> SystemTime {
    std::fs::metadata(path)
        .and_then(|meta| meta.created().or_else(|_| meta.modified()))
        .unwrap_or(SystemTime::UNIX_EPOCH)
}

/// Parse a frame rate string (e.g. "30/1" or "29.97")
fn parse_frame_rate(s: &str) -> Option<f64> {
    if let Some((num, den)) = s.split_once('/') {
        let num: f64 = num.parse().ok()?;
        let den: f64 = den.parse().ok()?;
        if den > 0.0 {
            return Some(num / den);
        }
    }
    s.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_frame_rate() {
        assert!((parse_frame_rate("30/1").unwrap() - 30.0).abs() < 0.01);
        assert!((parse_frame_rate("30000/1001").unwrap() - 29.97).abs() < 0.01);
        assert!((parse_frame_rate("29.97").unwrap() - 29.97).abs() < 0.01);
        assert!(parse_frame_rate("0/0").is_none());
        assert!(parse_frame_rate("garbage").is_none());
    }

    #[tokio::test]
    async fn test_probe_missing_file_fails() {
        let result = probe_clip("definitely/not/here.mp4").await;
        assert!(result.is_err());
    }
}
