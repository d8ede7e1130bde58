mod decode;
mod mix;
mod resample;

use std::path::{Path, PathBuf};

use thiserror::Error;

pub use decode::SymphoniaDecoder;
pub(crate) use resample::resample_linear;

/// Decoded mono audio as produced by an [`AudioDecoder`].
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

/// Mono audio resampled to the analysis rate and capped to the analysis window.
#[derive(Debug)]
pub(crate) struct AnalysisAudio {
    pub(crate) mono: Vec<f32>,
    pub(crate) sample_rate: u32,
}

/// Errors raised while decoding a single audio file.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Unsupported or corrupt audio in {path}: {source}")]
    Probe {
        path: PathBuf,
        source: symphonia::core::errors::Error,
    },
    #[error("No default audio track in {path}")]
    NoTrack { path: PathBuf },
    #[error("No decoder available for {path}: {source}")]
    Codec {
        path: PathBuf,
        source: symphonia::core::errors::Error,
    },
    #[error("Failed to read audio packets from {path}: {source}")]
    Packet {
        path: PathBuf,
        source: symphonia::core::errors::Error,
    },
    #[error("Decoded 0 samples from {path}")]
    Empty { path: PathBuf },
    #[error("{path}: {reason}")]
    Other { path: PathBuf, reason: String },
}

impl DecodeError {
    /// Path of the file that failed to decode.
    pub fn path(&self) -> &Path {
        match self {
            Self::Open { path, .. }
            | Self::Probe { path, .. }
            | Self::NoTrack { path }
            | Self::Codec { path, .. }
            | Self::Packet { path, .. }
            | Self::Empty { path }
            | Self::Other { path, .. } => path,
        }
    }
}

/// Decodes the leading part of an audio file into mono samples.
///
/// Implementations down-mix multi-channel audio and stop decoding once
/// `max_seconds` of audio are available.
pub trait AudioDecoder {
    fn decode(&self, path: &Path, max_seconds: f32) -> Result<DecodedAudio, DecodeError>;
}

/// Decode `path` and bring it to `sample_rate`, keeping at most `max_seconds` of audio.
pub(crate) fn load_for_analysis(
    decoder: &dyn AudioDecoder,
    path: &Path,
    sample_rate: u32,
    max_seconds: f32,
) -> Result<AnalysisAudio, DecodeError> {
    let decoded = decoder.decode(path, max_seconds)?;
    let mut mono = resample_linear(&decoded.samples, decoded.sample_rate, sample_rate);
    let limit = frame_limit(max_seconds, sample_rate);
    mono.truncate(limit);
    Ok(AnalysisAudio { mono, sample_rate })
}

pub(crate) fn frame_limit(max_seconds: f32, sample_rate: u32) -> usize {
    let frames = (max_seconds as f64 * sample_rate.max(1) as f64).round();
    if frames.is_finite() && frames > 0.0 {
        frames as usize
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedDecoder {
        samples: Vec<f32>,
        sample_rate: u32,
    }

    impl AudioDecoder for FixedDecoder {
        fn decode(&self, _path: &Path, _max_seconds: f32) -> Result<DecodedAudio, DecodeError> {
            Ok(DecodedAudio {
                samples: self.samples.clone(),
                sample_rate: self.sample_rate,
            })
        }
    }

    #[test]
    fn load_for_analysis_resamples_and_caps_duration() {
        let decoder = FixedDecoder {
            samples: vec![0.5_f32; 44_100 * 3],
            sample_rate: 44_100,
        };
        let audio = load_for_analysis(&decoder, Path::new("x.wav"), 22_050, 2.0).unwrap();
        assert_eq!(audio.sample_rate, 22_050);
        assert_eq!(audio.mono.len(), 44_100);
        assert!(audio.mono.iter().all(|v| (*v - 0.5).abs() < 1e-6));
    }

    #[test]
    fn short_audio_is_used_in_full() {
        let decoder = FixedDecoder {
            samples: vec![0.1_f32; 1_000],
            sample_rate: 22_050,
        };
        let audio = load_for_analysis(&decoder, Path::new("x.wav"), 22_050, 30.0).unwrap();
        assert_eq!(audio.mono.len(), 1_000);
    }

    #[test]
    fn decode_error_reports_path() {
        let err = DecodeError::Empty {
            path: PathBuf::from("a/b.wav"),
        };
        assert_eq!(err.path(), Path::new("a/b.wav"));
        assert!(err.to_string().contains("b.wav"));
    }
}
