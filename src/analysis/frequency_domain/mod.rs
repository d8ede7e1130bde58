//! Frequency-domain frame analysis (STFT magnitude, spectral centroid, onset strength).

mod stft;

pub(crate) use stft::compute_frames;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::frames::mean;

    fn sine(freq: f32, sample_rate: u32, seconds: f32) -> Vec<f32> {
        let len = (sample_rate as f32 * seconds) as usize;
        (0..len)
            .map(|i| 0.5 * (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate as f32).sin())
            .collect()
    }

    #[test]
    fn sine_wave_centroid_tracks_frequency() {
        let sr = 22_050;
        let frames = compute_frames(&sine(440.0, sr, 1.0), sr, 2048, 512);
        let centroid = mean(&frames.centroid_hz);
        assert!(centroid > 300.0 && centroid < 700.0, "centroid {centroid}");
    }

    #[test]
    fn higher_tone_is_brighter() {
        let sr = 22_050;
        let low = compute_frames(&sine(500.0, sr, 0.5), sr, 2048, 512);
        let high = compute_frames(&sine(4_000.0, sr, 0.5), sr, 2048, 512);
        assert!(mean(&high.centroid_hz) > mean(&low.centroid_hz) * 4.0);
    }

    #[test]
    fn silence_has_zero_centroid_and_onset() {
        let frames = compute_frames(&vec![0.0_f32; 8_192], 22_050, 2048, 512);
        assert_eq!(frames.centroid_hz.len(), 17);
        assert!(frames.centroid_hz.iter().all(|v| *v == 0.0));
        assert!(frames.onset_strength.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn clicks_produce_more_onset_energy_than_a_steady_tone() {
        let sr = 22_050;
        let mut clicks = vec![0.0_f32; sr as usize * 2];
        for start in (0..clicks.len()).step_by(sr as usize / 4) {
            for sample in clicks.iter_mut().skip(start).take(64) {
                *sample = 0.8;
            }
        }
        let click_frames = compute_frames(&clicks, sr, 2048, 512);
        let tone_frames = compute_frames(&sine(440.0, sr, 2.0), sr, 2048, 512);
        assert!(mean(&click_frames.onset_strength) > mean(&tone_frames.onset_strength));
    }
}
