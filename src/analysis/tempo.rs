//! Autocorrelation tempo estimation over an onset-strength envelope.
//!
//! The mean-removed envelope is autocorrelated over the lag range covering
//! `[min_bpm, max_bpm]`. Each lag is weighted by a log-normal prior centred on
//! `start_bpm` (one octave standard deviation) so that octave errors favour
//! the tempo closest to the prior. The winning lag is refined by parabolic
//! interpolation of its neighbours.

/// Tempo search range and prior.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct TempoRange {
    pub(crate) min_bpm: f32,
    pub(crate) max_bpm: f32,
    pub(crate) start_bpm: f32,
}

const EPSILON: f64 = 1e-12;

/// Estimate tempo in BPM; returns 0 when the envelope carries no periodic energy.
pub(crate) fn estimate_tempo(
    onset_strength: &[f32],
    sample_rate: u32,
    hop_size: usize,
    range: TempoRange,
) -> f64 {
    let n = onset_strength.len();
    if n < 3 || sample_rate == 0 || hop_size == 0 {
        return 0.0;
    }
    if range.min_bpm <= 0.0 || range.max_bpm <= range.min_bpm || range.start_bpm <= 0.0 {
        return 0.0;
    }

    let frames_per_minute = 60.0 * sample_rate as f64 / hop_size as f64;
    let lag_min = (frames_per_minute / range.max_bpm as f64).ceil().max(2.0) as usize;
    let lag_max = ((frames_per_minute / range.min_bpm as f64).floor() as usize).min(n - 3);
    if lag_min > lag_max {
        return 0.0;
    }

    let mean = onset_strength.iter().map(|&v| v as f64).sum::<f64>() / n as f64;
    let centred: Vec<f64> = onset_strength.iter().map(|&v| v as f64 - mean).collect();
    let energy: f64 = centred.iter().map(|v| v * v).sum();
    if energy <= EPSILON {
        return 0.0;
    }

    let acf: Vec<f64> = (0..=lag_max + 2)
        .map(|lag| {
            centred
                .iter()
                .zip(&centred[lag..])
                .map(|(a, b)| a * b)
                .sum::<f64>()
                / energy
        })
        .collect();
    // Triangular smoothing tolerates beat periods that fall between integer lags.
    let smoothed = |lag: usize| 0.5 * acf[lag - 1] + acf[lag] + 0.5 * acf[lag + 1];
    let prior = |lag: f64| -> f64 {
        let bpm = frames_per_minute / lag;
        let octaves = (bpm / range.start_bpm as f64).log2();
        (-0.5 * octaves * octaves).exp()
    };

    let mut best: Option<(usize, f64)> = None;
    for lag in lag_min..=lag_max {
        let score = smoothed(lag) * prior(lag as f64);
        if score <= 0.0 {
            continue;
        }
        if best.is_none_or(|(_, best_score)| score > best_score) {
            best = Some((lag, score));
        }
    }
    let Some((lag, _)) = best else {
        return 0.0;
    };

    let refined = refine_lag(lag, smoothed(lag - 1), smoothed(lag), smoothed(lag + 1));
    frames_per_minute / refined
}

fn refine_lag(lag: usize, before: f64, at: f64, after: f64) -> f64 {
    let denom = before - 2.0 * at + after;
    if denom.abs() <= EPSILON {
        return lag as f64;
    }
    let offset = (0.5 * (before - after) / denom).clamp(-0.5, 0.5);
    lag as f64 + offset
}
