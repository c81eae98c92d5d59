use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    error::{ConfigError, Result},
    video::types::EncodeParams,
};

/// Main configuration for the clip compiler
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Compilation settings
    pub compilation: CompilationConfig,

    /// Clip source settings
    pub source: SourceConfig,

    /// Encoder settings
    pub encode: EncodeConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            compilation: CompilationConfig::default(),
            source: SourceConfig::default(),
            encode: EncodeConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound { path: path.display().to_string() })?;

        let config: Config = toml::from_str(&content)
            .map_err(|_| ConfigError::ParseFailed { path: path.display().to_string() })?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::InvalidValue {
                key: "config".to_string(),
                value: e.to_string()
            })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.compilation.validate()?;
        self.encode.validate()?;
        Ok(())
    }
}

/// Compilation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompilationConfig {
    /// Master switch; when false a run is a no-op
    pub enabled: bool,

    /// Desired total duration in seconds (0 = use everything selected)
    pub target_duration: f64,

    /// Fade-out duration applied at each internal clip boundary (0 disables)
    pub transition: f64,

    /// Upper bound on the number of main clips included
    pub max_clips: usize,

    /// Directory the finished compilation is written to
    pub output_folder: PathBuf,
}

impl Default for CompilationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            target_duration: 600.0,
            transition: 0.5,
            max_clips: 10,
            output_folder: PathBuf::from("compilations"),
        }
    }
}

impl CompilationConfig {
    fn validate(&self) -> Result<()> {
        if self.target_duration < 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "compilation.target_duration".to_string(),
                value: self.target_duration.to_string()
            }.into());
        }

        if self.transition < 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "compilation.transition".to_string(),
                value: self.transition.to_string()
            }.into());
        }

        if self.max_clips == 0 {
            return Err(ConfigError::InvalidValue {
                key: "compilation.max_clips".to_string(),
                value: self.max_clips.to_string()
            }.into());
        }

        Ok(())
    }
}

/// Clip source settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Root directory rendered clips are collected under
    pub results_root: PathBuf,

    /// Default collection (sub-folder of `results_root`) to compile from
    pub collection: Option<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            results_root: PathBuf::from("results"),
            collection: None,
        }
    }
}

/// Encoder settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodeConfig {
    /// Video codec passed to FFmpeg
    pub video_codec: String,

    /// Audio codec passed to FFmpeg
    pub audio_codec: String,

    /// Encoder preset (speed/quality trade-off)
    pub preset: String,

    /// Number of clips probed concurrently during discovery
    pub probe_threads: usize,
}

impl Default for EncodeConfig {
    fn default() -> Self {
        Self {
            video_codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
            preset: "medium".to_string(),
            probe_threads: num_cpus::get(),
        }
    }
}

impl EncodeConfig {
    /// Codec parameters for the encoder, without the discovery settings
    pub fn params(&self) -> EncodeParams {
        EncodeParams {
            video_codec: self.video_codec.clone(),
            audio_codec: self.audio_codec.clone(),
            preset: self.preset.clone(),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.video_codec.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "encode.video_codec".to_string(),
                value: self.video_codec.clone()
            }.into());
        }

        if self.audio_codec.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "encode.audio_codec".to_string(),
                value: self.audio_codec.clone()
            }.into());
        }

        if self.probe_threads == 0 {
            return Err(ConfigError::InvalidValue {
                key: "encode.probe_threads".to_string(),
                value: self.probe_threads.to_string()
            }.into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_roundtrip() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test_config.toml");

        let original_config = Config::default();

        // Save and load
        original_config.save_to_file(&file_path).unwrap();
        let loaded_config = Config::from_file(&file_path).unwrap();

        assert_eq!(original_config.compilation.max_clips, loaded_config.compilation.max_clips);
        assert_eq!(original_config.encode.video_codec, loaded_config.encode.video_codec);
        assert_eq!(original_config.source.results_root, loaded_config.source.results_root);
    }

    #[test]
    fn test_missing_config_file() {
        let result = Config::from_file("does_not_exist.toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_max_clips() {
        let mut config = Config::default();
        config.compilation.max_clips = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_negative_transition() {
        let mut config = Config::default();
        config.compilation.transition = -1.0;
        assert!(config.validate().is_err());
    }
}
