//! Render stage: deterministic output naming and the final encode.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::compilation::plan::RenderJob;
use crate::error::{RenderError, Result};
use crate::video::concat::Concatenator;
use crate::video::ffmpeg::check_ffmpeg;

/// Summary of a finished compilation
#[derive(Debug, Clone)]
pub struct RenderedCompilation {
    pub path: PathBuf,
    pub clip_count: usize,
    pub duration: f64,
    pub file_size: u64,
}

/// Writes a compilation plan to its final output file
pub struct RenderStage {
    output_folder: PathBuf,
}

impl RenderStage {
    pub fn new<P: Into<PathBuf>>(output_folder: P) -> Self {
        Self {
            output_folder: output_folder.into(),
        }
    }

    /// Deterministic output path for a run
    ///
    /// Identical inputs always produce the same name, so re-running an
    /// unchanged compilation overwrites its previous output instead of
    /// accumulating files.
    pub fn output_path(&self, clip_count: usize, target_duration: f64) -> PathBuf {
        self.output_folder.join(format!(
            "compilation_{}clips_{:.0}s.mp4",
            clip_count, target_duration
        ))
    }

    /// Encode the job's plan into its output file
    ///
    /// The encoding toolchain is verified up front and the output directory
    /// created if absent; both kinds of failure, like a failed write, are
    /// terminal for the run and never retried.
    pub async fn render(&self, job: RenderJob, transition: f64) -> Result<RenderedCompilation> {
        check_ffmpeg()?;
        self.prepare_output_folder()?;

        let mut concatenator = Concatenator::new();
        let result = concatenator
            .concatenate(&job.plan, transition, &job.encode, &job.output_path)
            .await;
        concatenator.cleanup();
        result?;

        let file_size = std::fs::metadata(&job.output_path)
            .map_err(|e| RenderError::EncodeFailed {
                path: job.output_path.clone(),
                reason: e.to_string(),
            })?
            .len();

        info!(
            "Compilation saved to {:?} ({:.1} MB)",
            job.output_path,
            file_size as f64 / 1024.0 / 1024.0
        );

        Ok(RenderedCompilation {
            path: job.output_path,
            clip_count: job.plan.main.len(),
            duration: job.plan.total_duration(),
            file_size,
        })
    }

    fn prepare_output_folder(&self) -> Result<()> {
        std::fs::create_dir_all(&self.output_folder).map_err(|e| {
            RenderError::EncodeFailed {
                path: self.output_folder.clone(),
                reason: format!("could not create output directory: {}", e),
            }
            .into()
        })
    }

    pub fn output_folder(&self) -> &Path {
        &self.output_folder
    }
}
