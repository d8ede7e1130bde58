/// Linearly resample mono `samples` from `input_rate` to `output_rate`.
pub(crate) fn resample_linear(samples: &[f32], input_rate: u32, output_rate: u32) -> Vec<f32> {
    let input_rate = input_rate.max(1);
    let output_rate = output_rate.max(1);
    if samples.is_empty() || input_rate == output_rate {
        return samples.to_vec();
    }
    let duration_seconds = samples.len() as f64 / input_rate as f64;
    let out_len = (duration_seconds * output_rate as f64).round().max(1.0) as usize;
    let step = input_rate as f64 / output_rate as f64;
    (0..out_len)
        .map(|i| lerp_sample(samples, i as f64 * step))
        .collect()
}

fn lerp_sample(samples: &[f32], pos: f64) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let idx0 = (pos.floor().max(0.0) as usize).min(samples.len() - 1);
    let frac = (pos - idx0 as f64).clamp(0.0, 1.0) as f32;
    let idx1 = idx0.saturating_add(1).min(samples.len() - 1);
    let a = samples[idx0];
    let b = samples[idx1];
    a + (b - a) * frac
}
