//! FFmpeg command construction and execution.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::error::{ConcatError, RenderError, Result};

/// Builder for a single FFmpeg invocation
///
/// Collects inputs and output arguments in order and renders them into the
/// final argument vector. All invocations run with `-y` and a quiet log level
/// so stderr only carries real errors.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    inputs: Vec<PathBuf>,
    output_args: Vec<String>,
    output: PathBuf,
}

impl FfmpegCommand {
    pub fn new<P: AsRef<Path>>(output: P) -> Self {
        Self {
            inputs: Vec::new(),
            output_args: Vec::new(),
            output: output.as_ref().to_path_buf(),
        }
    }

    /// Add an input file (each one becomes a `-i` pair, in order)
    pub fn input<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.inputs.push(path.as_ref().to_path_buf());
        self
    }

    /// Add an output argument (after all inputs)
    pub fn output_arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Set a filter graph
    pub fn filter_complex<S: Into<String>>(self, graph: S) -> Self {
        self.output_arg("-filter_complex").output_arg(graph)
    }

    /// Set a per-stream video filter
    pub fn video_filter<S: Into<String>>(self, filter: S) -> Self {
        self.output_arg("-vf").output_arg(filter)
    }

    /// Map a labelled stream into the output
    pub fn map<S: Into<String>>(self, stream: S) -> Self {
        self.output_arg("-map").output_arg(stream)
    }

    /// Set the video codec
    pub fn video_codec<S: Into<String>>(self, codec: S) -> Self {
        self.output_arg("-c:v").output_arg(codec)
    }

    /// Set the audio codec
    pub fn audio_codec<S: Into<String>>(self, codec: S) -> Self {
        self.output_arg("-c:a").output_arg(codec)
    }

    /// Set the encoder preset
    pub fn preset<S: Into<String>>(self, preset: S) -> Self {
        self.output_arg("-preset").output_arg(preset)
    }

    /// Build the full argument vector
    pub fn build_args(&self) -> Vec<String> {
        let mut args = vec!["-y".to_string(), "-v".to_string(), "error".to_string()];

        for input in &self.inputs {
            args.push("-i".to_string());
            args.push(input.to_string_lossy().to_string());
        }

        args.extend(self.output_args.clone());
        args.push(self.output.to_string_lossy().to_string());

        args
    }

    /// Run the command to completion
    ///
    /// FFmpeg's stderr is captured and surfaced in the error when the process
    /// exits non-zero, since that is the only diagnostic it produces at this
    /// log level.
    pub async fn run(&self) -> Result<()> {
        let args = self.build_args();
        debug!("Running FFmpeg: ffmpeg {}", args.join(" "));

        let output = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| ConcatError::Ffmpeg {
                stderr: format!("failed to spawn ffmpeg: {}", e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(ConcatError::Ffmpeg { stderr }.into());
        }

        Ok(())
    }
}

/// Check that FFmpeg is installed and on the search path
pub fn check_ffmpeg() -> Result<PathBuf> {
    which::which("ffmpeg").map_err(|_| {
        RenderError::ToolchainMissing {
            tool: "ffmpeg".to_string(),
        }
        .into()
    })
}

/// Check that FFprobe is installed and on the search path
pub fn check_ffprobe() -> Result<PathBuf> {
    which::which("ffprobe").map_err(|_| {
        RenderError::ToolchainMissing {
            tool: "ffprobe".to_string(),
        }
        .into()
    })
}
