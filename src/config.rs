//! Analysis configuration.
//!
//! Settings come from an optional TOML file and are then overridden by
//! command-line flags. Validation happens once, before any audio file is
//! touched, and produces a [`ValidatedConfig`] with typed values.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::pipeline::GroupingParams;

/// Default output image written after a successful run.
pub const DEFAULT_OUTPUT_FILE: &str = "analysis_result.png";

/// Frame, window, and tempo parameters used by descriptor extraction.
///
/// Config keys (TOML, under `[extraction]`): `sample_rate`,
/// `max_duration_seconds`, `frame_size`, `hop_size`, `min_bpm`, `max_bpm`,
/// `start_bpm`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Analysis sample rate; decoded audio is resampled to this rate.
    pub sample_rate: u32,
    /// Only the leading part of each file up to this duration is analysed.
    pub max_duration_seconds: f32,
    /// Frame length in samples for STFT, RMS, and zero-crossing frames.
    pub frame_size: usize,
    /// Hop between consecutive frames in samples.
    pub hop_size: usize,
    /// Slowest tempo considered by the tempo estimator.
    pub min_bpm: f32,
    /// Fastest tempo considered by the tempo estimator.
    pub max_bpm: f32,
    /// Centre of the tempo prior.
    pub start_bpm: f32,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            max_duration_seconds: default_max_duration_seconds(),
            frame_size: default_frame_size(),
            hop_size: default_hop_size(),
            min_bpm: default_min_bpm(),
            max_bpm: default_max_bpm(),
            start_bpm: default_start_bpm(),
        }
    }
}

/// Full analysis configuration as loaded from disk.
///
/// Config keys (TOML): `clusters`, `seed`, `output`, `extraction`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub extraction: ExtractionConfig,
    /// Requested cluster count; must be positive.
    #[serde(default = "default_clusters")]
    pub clusters: i64,
    /// Seed for cluster initialisation.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Where the scatter plot is written.
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            extraction: ExtractionConfig::default(),
            clusters: default_clusters(),
            seed: default_seed(),
            output: default_output(),
        }
    }
}

/// Configuration that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedConfig {
    pub extraction: ExtractionConfig,
    pub grouping: GroupingParams,
    pub output: PathBuf,
}

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a config file.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to parse TOML config.
    #[error("Invalid config at {path}: {source}")]
    ParseToml {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Cluster count must be a positive integer, got {0}")]
    InvalidClusterCount(i64),
    #[error("Invalid extraction setting `{field}`: {reason}")]
    InvalidExtraction {
        field: &'static str,
        reason: String,
    },
}

impl AnalysisConfig {
    /// Load a TOML config file; missing keys fall back to defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text).map_err(|source| ConfigError::ParseToml {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Check every setting and convert to typed values.
    pub fn validate(&self) -> Result<ValidatedConfig, ConfigError> {
        let clusters = usize::try_from(self.clusters)
            .ok()
            .and_then(NonZeroUsize::new)
            .ok_or(ConfigError::InvalidClusterCount(self.clusters))?;
        self.extraction.validate()?;
        Ok(ValidatedConfig {
            extraction: self.extraction.clone(),
            grouping: GroupingParams {
                clusters,
                seed: self.seed,
                ..GroupingParams::default()
            },
            output: self.output.clone(),
        })
    }
}

impl ExtractionConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field: &'static str, reason: String| ConfigError::InvalidExtraction {
            field,
            reason,
        };
        if self.sample_rate == 0 {
            return Err(invalid("sample_rate", "must be positive".to_string()));
        }
        if !self.max_duration_seconds.is_finite() || self.max_duration_seconds <= 0.0 {
            return Err(invalid(
                "max_duration_seconds",
                format!("must be positive, got {}", self.max_duration_seconds),
            ));
        }
        if self.frame_size == 0 {
            return Err(invalid("frame_size", "must be positive".to_string()));
        }
        if self.hop_size == 0 || self.hop_size > self.frame_size {
            return Err(invalid(
                "hop_size",
                format!(
                    "must be between 1 and frame_size ({}), got {}",
                    self.frame_size, self.hop_size
                ),
            ));
        }
        if !(self.min_bpm > 0.0 && self.min_bpm < self.max_bpm && self.max_bpm.is_finite()) {
            return Err(invalid(
                "min_bpm",
                format!(
                    "expected 0 < min_bpm < max_bpm, got {} and {}",
                    self.min_bpm, self.max_bpm
                ),
            ));
        }
        if !(self.start_bpm > 0.0 && self.start_bpm.is_finite()) {
            return Err(invalid(
                "start_bpm",
                format!("must be positive, got {}", self.start_bpm),
            ));
        }
        Ok(())
    }
}

fn default_sample_rate() -> u32 {
    22_050
}

fn default_max_duration_seconds() -> f32 {
    30.0
}

fn default_frame_size() -> usize {
    2048
}

fn default_hop_size() -> usize {
    512
}

fn default_min_bpm() -> f32 {
    30.0
}

fn default_max_bpm() -> f32 {
    320.0
}

fn default_start_bpm() -> f32 {
    120.0
}

fn default_clusters() -> i64 {
    3
}

fn default_seed() -> u64 {
    42
}

fn default_output() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_FILE)
}
