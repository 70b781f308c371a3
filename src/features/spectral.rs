//! Dominant frequency over trailing windows.

use crate::features::rolling::trailing_windows;
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

/// FFT of a fixed-size window, reporting the strongest non-negative bin.
pub struct DominantFrequency {
    window: usize,
    sample_rate_hz: f64,
    fft: Arc<dyn Fft<f64>>,
    buffer: Vec<Complex<f64>>,
    scratch: Vec<Complex<f64>>,
}

impl DominantFrequency {
    pub fn new(window: usize, sample_rate_hz: f64) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(window);
        let scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];

        Self {
            window,
            sample_rate_hz,
            fft,
            buffer: vec![Complex::new(0.0, 0.0); window],
            scratch,
        }
    }

    /// Frequency in Hz of bin `k` for this window length.
    pub fn bin_frequency(&self, k: usize) -> f64 {
        k as f64 * self.sample_rate_hz / self.window as f64
    }

    /// Frequency of the highest-amplitude bin among the first `window / 2`.
    ///
    /// Ties go to the lower frequency. `None` when `samples` is not exactly
    /// one window long or the window has fewer than two samples.
    pub fn compute(&mut self, samples: &[f64]) -> Option<f64> {
        if samples.len() != self.window || self.window < 2 {
            return None;
        }

        for (slot, &s) in self.buffer.iter_mut().zip(samples) {
            *slot = Complex::new(s, 0.0);
        }
        self.fft
            .process_with_scratch(&mut self.buffer, &mut self.scratch);

        let mut best = 0;
        let mut best_amplitude = f64::NEG_INFINITY;
        for (k, bin) in self.buffer[..self.window / 2].iter().enumerate() {
            let amplitude = bin.norm();
            if amplitude > best_amplitude {
                best = k;
                best_amplitude = amplitude;
            }
        }
        Some(self.bin_frequency(best))
    }
}

/// Dominant frequency of the trailing `window` rows ending at each row.
pub fn dominant_frequencies(
    values: &[Option<f64>],
    window: usize,
    sample_rate_hz: f64,
) -> Vec<Option<f64>> {
    let mut dominant = DominantFrequency::new(window, sample_rate_hz);
    trailing_windows(values, window)
        .map(|samples| samples.and_then(|s| dominant.compute(&s)))
        .collect()
}

pub fn dominant_column_name(column: &str, window: usize) -> String {
    format!("{column}_dominant_freq_{window}")
}
