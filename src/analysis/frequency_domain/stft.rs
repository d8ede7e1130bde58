use std::f32::consts::PI;

use rustfft::FftPlanner;
use rustfft::num_complex::Complex;

use crate::analysis::frames::{FrameLayout, Padding};

/// Gain applied before log compression of magnitudes for onset strength.
const ONSET_LOG_GAIN: f32 = 1_000.0;

/// Per-frame spectral series for one signal.
#[derive(Debug, Clone, Default)]
pub(crate) struct SpectralFrames {
    pub(crate) centroid_hz: Vec<f32>,
    pub(crate) onset_strength: Vec<f32>,
}

/// Periodic Hann window of `length` samples.
pub(crate) fn hann_window(length: usize) -> Vec<f32> {
    if length <= 1 {
        return vec![1.0_f32; length.max(1)];
    }
    let denom = length as f32;
    (0..length)
        .map(|n| 0.5_f32 * (1.0 - (2.0 * PI * n as f32 / denom).cos()))
        .collect()
}

/// Run a centred, Hann-windowed STFT and derive centroid and onset strength per frame.
pub(crate) fn compute_frames(
    samples: &[f32],
    sample_rate: u32,
    frame_size: usize,
    hop_size: usize,
) -> SpectralFrames {
    let layout = FrameLayout::new(frame_size, hop_size, Padding::Zero);
    let frame_size = layout.frame_size;
    let window = hann_window(frame_size);
    let fft = FftPlanner::<f32>::new().plan_fft_forward(frame_size);
    let mut buffer = vec![Complex::new(0.0_f32, 0.0); frame_size];
    let mut scratch = vec![Complex::new(0.0_f32, 0.0); fft.get_inplace_scratch_len()];
    let bins = frame_size / 2 + 1;
    let mut magnitude = vec![0.0_f32; bins];
    let mut log_magnitude = vec![0.0_f32; bins];
    let mut previous_log = vec![0.0_f32; bins];
    let mut has_previous = false;

    let frame_count = layout.frame_count(samples.len());
    let mut frames = SpectralFrames {
        centroid_hz: Vec::with_capacity(frame_count),
        onset_strength: Vec::with_capacity(frame_count),
    };
    layout.for_each_frame(samples, |_, frame| {
        for ((cell, &sample), &win) in buffer.iter_mut().zip(frame).zip(&window) {
            *cell = Complex::new(sample * win, 0.0);
        }
        fft.process_with_scratch(&mut buffer, &mut scratch);
        for (bin, value) in magnitude.iter_mut().enumerate() {
            *value = buffer[bin].norm();
        }
        frames
            .centroid_hz
            .push(centroid(&magnitude, sample_rate, frame_size));

        for (log, &mag) in log_magnitude.iter_mut().zip(&magnitude) {
            *log = (1.0 + ONSET_LOG_GAIN * mag).ln();
        }
        let onset = if has_previous {
            rectified_flux(&previous_log, &log_magnitude)
        } else {
            0.0
        };
        frames.onset_strength.push(onset);
        std::mem::swap(&mut previous_log, &mut log_magnitude);
        has_previous = true;
    });
    frames
}

fn centroid(magnitude: &[f32], sample_rate: u32, fft_len: usize) -> f32 {
    let mut sum = 0.0_f64;
    let mut sum_freq = 0.0_f64;
    let bin_hz = sample_rate.max(1) as f64 / fft_len.max(1) as f64;
    for (bin, &m) in magnitude.iter().enumerate() {
        let m = m.max(0.0) as f64;
        sum += m;
        sum_freq += m * bin as f64 * bin_hz;
    }
    if sum <= f64::EPSILON {
        return 0.0;
    }
    (sum_freq / sum) as f32
}

fn rectified_flux(previous: &[f32], current: &[f32]) -> f32 {
    if current.is_empty() {
        return 0.0;
    }
    let total: f64 = previous
        .iter()
        .zip(current)
        .map(|(&prev, &cur)| (cur - prev).max(0.0) as f64)
        .sum();
    (total / current.len() as f64) as f32
}
