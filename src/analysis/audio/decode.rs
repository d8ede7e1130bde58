use std::fs::File;
use std::path::Path;

use symphonia::core::{
    audio::SampleBuffer, codecs::DecoderOptions, errors::Error, formats::FormatOptions,
    io::MediaSourceStream, meta::MetadataOptions, probe::Hint,
};

use super::mix::append_mono;
use super::{AudioDecoder, DecodeError, DecodedAudio, frame_limit};

/// [`AudioDecoder`] backed by symphonia's default format and codec registries.
#[derive(Debug, Clone, Copy, Default)]
pub struct SymphoniaDecoder;

impl AudioDecoder for SymphoniaDecoder {
    fn decode(&self, path: &Path, max_seconds: f32) -> Result<DecodedAudio, DecodeError> {
        let file = File::open(path).map_err(|source| DecodeError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());
        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|ext| ext.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|source| DecodeError::Probe {
                path: path.to_path_buf(),
                source,
            })?;
        let mut format = probed.format;
        let track = format.default_track().ok_or_else(|| DecodeError::NoTrack {
            path: path.to_path_buf(),
        })?;
        let track_id = track.id;
        let codec_params = track.codec_params.clone();

        let mut decoder = symphonia::default::get_codecs()
            .make(&codec_params, &DecoderOptions::default())
            .map_err(|source| DecodeError::Codec {
                path: path.to_path_buf(),
                source,
            })?;

        let mut sample_rate = codec_params.sample_rate;
        let mut max_frames = sample_rate.map(|rate| frame_limit(max_seconds, rate));
        let mut mono = Vec::new();
        loop {
            if max_frames.is_some_and(|limit| mono.len() >= limit) {
                break;
            }
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(Error::IoError(_)) | Err(Error::ResetRequired) => break,
                Err(source) => {
                    return Err(DecodeError::Packet {
                        path: path.to_path_buf(),
                        source,
                    });
                }
            };
            if packet.track_id() != track_id {
                continue;
            }
            let audio_buf = match decoder.decode(&packet) {
                Ok(audio_buf) => audio_buf,
                Err(Error::DecodeError(_)) => continue,
                Err(source) => {
                    return Err(DecodeError::Packet {
                        path: path.to_path_buf(),
                        source,
                    });
                }
            };
            let spec = *audio_buf.spec();
            if sample_rate.is_none() {
                sample_rate = Some(spec.rate);
                max_frames = Some(frame_limit(max_seconds, spec.rate));
            }
            let mut sample_buf = SampleBuffer::<f32>::new(audio_buf.capacity() as u64, spec);
            sample_buf.copy_interleaved_ref(audio_buf);
            append_mono(&mut mono, sample_buf.samples(), spec.channels.count());
        }

        if let Some(limit) = max_frames {
            mono.truncate(limit);
        }
        let sample_rate = match sample_rate {
            Some(rate) if rate > 0 => rate,
            _ => {
                return Err(DecodeError::Other {
                    path: path.to_path_buf(),
                    reason: "missing sample rate".to_string(),
                });
            }
        };
        if mono.is_empty() {
            return Err(DecodeError::Empty {
                path: path.to_path_buf(),
            });
        }
        Ok(DecodedAudio {
            samples: mono,
            sample_rate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::{SampleFormat, WavSpec, WavWriter};
    use tempfile::TempDir;

    #[test]
    fn decodes_stereo_float_wav_to_mono() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("stereo.wav");
        let spec = WavSpec {
            channels: 2,
            sample_rate: 44_100,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let mut writer = WavWriter::create(&path, spec).unwrap();
        for _ in 0..(44_100 / 10) {
            writer.write_sample::<f32>(0.5).unwrap();
            writer.write_sample::<f32>(0.0).unwrap();
        }
        writer.finalize().unwrap();

        let decoded = SymphoniaDecoder.decode(&path, 30.0).unwrap();
        assert_eq!(decoded.sample_rate, 44_100);
        assert_eq!(decoded.samples.len(), 44_100 / 10);
        assert!(decoded.samples.iter().all(|v| (*v - 0.25).abs() < 1e-6));
    }

    #[test]
    fn stops_at_max_duration() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("long.wav");
        let spec = WavSpec {
            channels: 1,
            sample_rate: 8_000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(&path, spec).unwrap();
        for i in 0..(8_000 * 3) {
            writer.write_sample::<i16>((i % 100) as i16).unwrap();
        }
        writer.finalize().unwrap();

        let decoded = SymphoniaDecoder.decode(&path, 1.0).unwrap();
        assert_eq!(decoded.samples.len(), 8_000);
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.wav");
        std::fs::write(&path, b"definitely not a riff header").unwrap();
        let err = SymphoniaDecoder.decode(&path, 30.0).unwrap_err();
        assert_eq!(err.path(), path.as_path());
    }

    #[test]
    fn missing_file_reports_open_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.flac");
        let err = SymphoniaDecoder.decode(&path, 30.0).unwrap_err();
        assert!(matches!(err, DecodeError::Open { .. }));
    }
}
