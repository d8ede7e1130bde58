/// Append interleaved `samples` to `out` as mono, averaging across channels.
pub(crate) fn append_mono(out: &mut Vec<f32>, samples: &[f32], channels: usize) {
    let channels = channels.max(1);
    if channels == 1 {
        out.extend(samples.iter().copied().map(sanitize_sample));
        return;
    }
    let frames = samples.len() / channels;
    out.reserve(frames);
    for frame in samples.chunks_exact(channels) {
        let sum: f32 = frame.iter().copied().map(sanitize_sample).sum();
        out.push(sum / channels as f32);
    }
}

fn sanitize_sample(sample: f32) -> f32 {
    if !sample.is_finite() {
        return 0.0;
    }
    let clamped = sample.clamp(-1.0, 1.0);
    if clamped != 0.0 && clamped.abs() < f32::MIN_POSITIVE {
        0.0
    } else {
        clamped
    }
}
