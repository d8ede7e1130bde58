use std::f32::consts::PI;
use std::path::Path;

pub const SAMPLE_RATE: u32 = 22_050;

pub fn write_test_wav(path: &Path, samples: &[f32]) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create wav parent dirs");
    }
    let mut writer = hound::WavWriter::create(path, spec).expect("create wav writer");
    for &sample in samples {
        writer.write_sample(sample).expect("write wav sample");
    }
    writer.finalize().expect("finalize wav");
}

/// Sine tone lasting `seconds`.
pub fn tone(freq: f32, amplitude: f32, seconds: f32) -> Vec<f32> {
    let len = (seconds * SAMPLE_RATE as f32) as usize;
    (0..len)
        .map(|i| amplitude * (2.0 * PI * freq * i as f32 / SAMPLE_RATE as f32).sin())
        .collect()
}

/// Decaying noise bursts repeating at `bpm`.
pub fn clicks(bpm: f32, amplitude: f32, seconds: f32) -> Vec<f32> {
    let len = (seconds * SAMPLE_RATE as f32) as usize;
    let period = (60.0 / bpm * SAMPLE_RATE as f32) as usize;
    let mut state = 0x2545_f491_u32;
    (0..len)
        .map(|i| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            let noise = state as f32 / u32::MAX as f32 * 2.0 - 1.0;
            let since = (i % period) as f32 / SAMPLE_RATE as f32;
            amplitude * noise * (-since * 40.0).exp()
        })
        .collect()
}

pub fn write_garbage(path: &Path) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent dirs");
    }
    std::fs::write(path, b"definitely not audio data").expect("write garbage file");
}
