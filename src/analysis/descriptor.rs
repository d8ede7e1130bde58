//! Per-file descriptor extraction.
//!
//! A descriptor is a scalar summary of one file over its leading analysis
//! window. The set of descriptors is an ordered list of named columns so the
//! downstream stages work over any number of columns.

use std::path::{Path, PathBuf};

use thiserror::Error;

use super::audio::{AudioDecoder, DecodeError, load_for_analysis};
use super::frames::mean;
use super::frequency_domain::compute_frames;
use super::tempo::{TempoRange, estimate_tempo};
use super::time_domain::{mean_frame_rms, mean_zero_crossing_rate};
use crate::config::ExtractionConfig;

/// Scalar descriptors for one successfully analysed file.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioDescriptor {
    /// Base name of the file, used as a display label only.
    pub filename: String,
    /// Estimated beats per minute.
    pub tempo: f64,
    /// Mean spectral centroid in Hz.
    pub brightness: f64,
    /// Mean frame RMS amplitude.
    pub energy: f64,
    /// Mean frame zero-crossing rate in `[0, 1]`.
    pub percussiveness: f64,
}

/// A named descriptor column and its accessor.
#[derive(Clone, Copy)]
pub struct DescriptorColumn {
    pub name: &'static str,
    pub value: fn(&AudioDescriptor) -> f64,
}

impl std::fmt::Debug for DescriptorColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DescriptorColumn")
            .field("name", &self.name)
            .finish()
    }
}

pub const DESCRIPTOR_COUNT: usize = 4;

/// Descriptor columns in table order.
pub const DESCRIPTOR_COLUMNS: [DescriptorColumn; DESCRIPTOR_COUNT] = [
    DescriptorColumn {
        name: "tempo",
        value: tempo_of,
    },
    DescriptorColumn {
        name: "brightness",
        value: brightness_of,
    },
    DescriptorColumn {
        name: "energy",
        value: energy_of,
    },
    DescriptorColumn {
        name: "percussiveness",
        value: percussiveness_of,
    },
];

fn tempo_of(d: &AudioDescriptor) -> f64 {
    d.tempo
}

fn brightness_of(d: &AudioDescriptor) -> f64 {
    d.brightness
}

fn energy_of(d: &AudioDescriptor) -> f64 {
    d.energy
}

fn percussiveness_of(d: &AudioDescriptor) -> f64 {
    d.percussiveness
}

/// Column names in table order.
pub fn descriptor_names() -> Vec<&'static str> {
    DESCRIPTOR_COLUMNS.iter().map(|column| column.name).collect()
}

impl AudioDescriptor {
    /// Numeric values in [`DESCRIPTOR_COLUMNS`] order.
    pub fn values(&self) -> [f64; DESCRIPTOR_COUNT] {
        DESCRIPTOR_COLUMNS.map(|column| (column.value)(self))
    }
}

/// Failure to produce a descriptor for one file. The batch always continues.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("No audio samples in the analysis window of {path}")]
    EmptySignal { path: PathBuf },
}

impl ExtractError {
    /// Path of the file that could not be analysed.
    pub fn path(&self) -> &Path {
        match self {
            Self::Decode(err) => err.path(),
            Self::EmptySignal { path } => path,
        }
    }
}

/// Computes [`AudioDescriptor`]s from audio files with a fixed configuration.
pub struct DescriptorExtractor<D> {
    decoder: D,
    config: ExtractionConfig,
}

impl<D: AudioDecoder> DescriptorExtractor<D> {
    pub fn new(decoder: D, config: ExtractionConfig) -> Self {
        Self { decoder, config }
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Decode the leading window of `path` and compute its descriptors.
    pub fn extract(&self, path: &Path) -> Result<AudioDescriptor, ExtractError> {
        let config = &self.config;
        let audio = load_for_analysis(
            &self.decoder,
            path,
            config.sample_rate,
            config.max_duration_seconds,
        )?;
        if audio.mono.is_empty() {
            return Err(ExtractError::EmptySignal {
                path: path.to_path_buf(),
            });
        }
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(describe_samples(filename, &audio.mono, audio.sample_rate, config))
    }
}

/// Compute descriptors for mono samples already at `sample_rate`.
fn describe_samples(
    filename: String,
    samples: &[f32],
    sample_rate: u32,
    config: &ExtractionConfig,
) -> AudioDescriptor {
    let spectral = compute_frames(samples, sample_rate, config.frame_size, config.hop_size);
    let tempo = estimate_tempo(
        &spectral.onset_strength,
        sample_rate,
        config.hop_size,
        TempoRange {
            min_bpm: config.min_bpm,
            max_bpm: config.max_bpm,
            start_bpm: config.start_bpm,
        },
    );
    AudioDescriptor {
        filename,
        tempo,
        brightness: mean(&spectral.centroid_hz),
        energy: mean_frame_rms(samples, config.frame_size, config.hop_size),
        percussiveness: mean_zero_crossing_rate(samples, config.frame_size, config.hop_size),
    }
}
