use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the clip-compiler library
#[derive(Error, Debug)]
pub enum CompilerError {
    #[error("Inventory error: {0}")]
    Inventory(#[from] InventoryError),

    #[error("Plan error: {0}")]
    Plan(#[from] PlanError),

    #[error("Concatenation error: {0}")]
    Concat(#[from] ConcatError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Generic error: {0}")]
    Generic(String),
}

/// Clip discovery and probing errors
#[derive(Error, Debug)]
pub enum InventoryError {
    #[error("Source directory not found: {path}")]
    SourceMissing { path: PathBuf },

    #[error("Failed to probe clip {path}: {reason}")]
    ProbeFailed { path: PathBuf, reason: String },
}

/// Plan assembly errors
#[derive(Error, Debug)]
pub enum PlanError {
    #[error("No clips selected from {path}")]
    NoContent { path: PathBuf },

    #[error("Compilation plan contains no clips")]
    EmptyPlan,

    #[error("Invalid intro/outro clip {path}: {reason}")]
    InvalidSource { path: PathBuf, reason: String },
}

/// Concatenation and normalization errors
#[derive(Error, Debug)]
pub enum ConcatError {
    #[error("Concatenation failed even after normalizing to {profile}: {reason}")]
    Failed { profile: String, reason: String },

    #[error("No main clip available as normalization reference")]
    MissingReference,

    #[error("No clip survived normalization")]
    NothingNormalized,

    #[error("FFmpeg exited with an error: {stderr}")]
    Ffmpeg { stderr: String },
}

/// Final encode errors
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Encoding toolchain not found: {tool}")]
    ToolchainMissing { tool: String },

    #[error("Failed to write output file {path}: {reason}")]
    EncodeFailed { path: PathBuf, reason: String },
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file: {path}")]
    ParseFailed { path: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Convenience type alias for Results using CompilerError
pub type Result<T> = std::result::Result<T, CompilerError>;

impl CompilerError {
    /// Create a generic error with a custom message
    pub fn generic<S: Into<String>>(message: S) -> Self {
        Self::Generic(message.into())
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Inventory(InventoryError::SourceMissing { path }) => {
                format!(
                    "Source directory '{}' was not found. Render some clips first or point --collection at an existing folder.",
                    path.display()
                )
            }
            Self::Plan(PlanError::NoContent { path }) => {
                format!(
                    "No usable clips were found in '{}'. Nothing to compile.",
                    path.display()
                )
            }
            Self::Plan(PlanError::EmptyPlan) => {
                "The compilation plan ended up empty. Nothing to compile.".to_string()
            }
            Self::Concat(ConcatError::Failed { profile, reason }) => {
                format!(
                    "Could not concatenate the clips, even after normalizing them to {}. Try converting your source videos to a common format first. ({})",
                    profile, reason
                )
            }
            Self::Render(RenderError::ToolchainMissing { tool }) => {
                format!(
                    "'{}' was not found. Install FFmpeg (https://ffmpeg.org/download.html) and make sure it is on your PATH.",
                    tool
                )
            }
            Self::Render(RenderError::EncodeFailed { path, reason }) => {
                format!(
                    "Failed to write '{}': {}. Check that FFmpeg is installed and on your PATH, and verify disk space and write permissions.",
                    path.display(),
                    reason
                )
            }
            Self::Config(ConfigError::FileNotFound { path }) => {
                format!("Configuration file '{}' not found.", path)
            }
            _ => self.to_string(),
        }
    }
}
