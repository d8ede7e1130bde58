/// Padding applied around the signal so frames are centred on `index * hop`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Padding {
    /// Out-of-range samples read as silence.
    Zero,
    /// Out-of-range samples repeat the nearest edge sample.
    Edge,
}

/// Centred framing of a mono signal with a fixed frame and hop size.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FrameLayout {
    pub(crate) frame_size: usize,
    pub(crate) hop_size: usize,
    pub(crate) padding: Padding,
}

impl FrameLayout {
    pub(crate) fn new(frame_size: usize, hop_size: usize, padding: Padding) -> Self {
        Self {
            frame_size: frame_size.max(1),
            hop_size: hop_size.max(1),
            padding,
        }
    }

    /// Number of centred frames covering `len` samples.
    pub(crate) fn frame_count(&self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        1 + len / self.hop_size
    }

    /// Copy frame `index` of `samples` into `out` (length `frame_size`).
    pub(crate) fn fill_frame(&self, samples: &[f32], index: usize, out: &mut [f32]) {
        let half = (self.frame_size / 2) as isize;
        let start = (index * self.hop_size) as isize - half;
        for (offset, cell) in out.iter_mut().enumerate().take(self.frame_size) {
            *cell = self.sample_at(samples, start + offset as isize);
        }
    }

    fn sample_at(&self, samples: &[f32], pos: isize) -> f32 {
        if samples.is_empty() {
            return 0.0;
        }
        if pos >= 0 && (pos as usize) < samples.len() {
            return samples[pos as usize];
        }
        match self.padding {
            Padding::Zero => 0.0,
            Padding::Edge if pos < 0 => samples[0],
            Padding::Edge => samples[samples.len() - 1],
        }
    }

    /// Visit every frame in order with a reusable buffer.
    pub(crate) fn for_each_frame(&self, samples: &[f32], mut visit: impl FnMut(usize, &[f32])) {
        let mut buffer = vec![0.0_f32; self.frame_size];
        for index in 0..self.frame_count(samples.len()) {
            self.fill_frame(samples, index, &mut buffer);
            visit(index, &buffer);
        }
    }
}

/// Mean of a per-frame series, 0 when empty.
pub(crate) fn mean(values: &[f32]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().map(|&v| v as f64).sum::<f64>() / values.len() as f64
}
