//! # Clip Compiler
//!
//! Compile rendered short-form clips into a single video, with fade
//! transitions between clips and automatic normalization when source clips
//! disagree on resolution or frame rate.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use clip_compiler::{CompilationEngine, Config};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let config = Config::default();
//! let engine = CompilationEngine::new(config);
//!
//! engine.compile("askreddit", None, None).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! The library is organized into several key modules:
//!
//! - [`video`] - Clip discovery, metadata probing, and FFmpeg plumbing
//! - [`compilation`] - Selection policy, plan assembly, and the engine
//! - [`config`] - Configuration management
//!
//! The pipeline flows strictly downward: inventory → selection → assembly →
//! concatenation (with a one-shot normalization fallback) → render. Per-clip
//! failures during discovery and normalization are recovered by skipping the
//! clip; plan-level and render-level failures terminate the run with a clear
//! diagnostic.

pub mod compilation;
pub mod config;
pub mod error;
pub mod video;

// Re-export commonly used types for convenience
pub use crate::{
    compilation::{CompilationEngine, CompilationOutcome},
    config::Config,
    error::{CompilerError, Result},
    video::{ClipProfile, VideoClip},
};
