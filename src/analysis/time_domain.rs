use super::frames::{FrameLayout, Padding, mean};

/// Samples with magnitude at or below this count as zero for crossing detection.
const ZERO_CROSSING_THRESHOLD: f32 = 1e-10;

/// Mean over centred frames of the root-mean-square amplitude.
pub(crate) fn mean_frame_rms(samples: &[f32], frame_size: usize, hop_size: usize) -> f64 {
    let layout = FrameLayout::new(frame_size, hop_size, Padding::Zero);
    let mut values = Vec::with_capacity(layout.frame_count(samples.len()));
    layout.for_each_frame(samples, |_, frame| values.push(rms(frame)));
    mean(&values)
}

/// Mean over centred frames of the fraction of adjacent samples that change sign.
pub(crate) fn mean_zero_crossing_rate(samples: &[f32], frame_size: usize, hop_size: usize) -> f64 {
    let layout = FrameLayout::new(frame_size, hop_size, Padding::Edge);
    let mut values = Vec::with_capacity(layout.frame_count(samples.len()));
    layout.for_each_frame(samples, |_, frame| values.push(zero_crossing_rate(frame)));
    mean(&values)
}

fn rms(frame: &[f32]) -> f32 {
    if frame.is_empty() {
        return 0.0;
    }
    let mut sum = 0.0_f64;
    for &sample in frame {
        let sample = sample as f64;
        sum += sample * sample;
    }
    (sum / frame.len() as f64).max(0.0).sqrt() as f32
}

fn zero_crossing_rate(frame: &[f32]) -> f32 {
    if frame.len() < 2 {
        return 0.0;
    }
    let negative = |sample: f32| sample < 0.0 && sample.abs() > ZERO_CROSSING_THRESHOLD;
    let crossings = frame
        .windows(2)
        .filter(|pair| negative(pair[0]) != negative(pair[1]))
        .count();
    crossings as f32 / frame.len() as f32
}
