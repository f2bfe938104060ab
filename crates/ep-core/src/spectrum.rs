// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

//! One-sided transforms of real signals on top of `rustfft`.

use std::fmt;
use std::sync::Arc;

use ndarray::{Array1, ArrayView1};
use num_complex::Complex64;
use rustfft::{Fft, FftPlanner};

/// Cached forward and inverse plans for one signal length.
///
/// [`RealFft::forward`] returns the `len / 2 + 1` non-negative frequency
/// bins without normalisation. [`RealFft::inverse`] treats its input as the
/// one-sided half of a Hermitian spectrum and divides by `len`, so the pair
/// round-trips.
pub struct RealFft {
    len: usize,
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
    buffer: Vec<Complex64>,
    scratch: Vec<Complex64>,
}

impl fmt::Debug for RealFft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RealFft").field("len", &self.len).finish()
    }
}

impl RealFft {
    pub fn new(len: usize) -> Self {
        let mut planner = FftPlanner::<f64>::new();
        let forward = planner.plan_fft_forward(len);
        let inverse = planner.plan_fft_inverse(len);
        let scratch_len = forward
            .get_inplace_scratch_len()
            .max(inverse.get_inplace_scratch_len());
        Self {
            len,
            forward,
            inverse,
            buffer: vec![Complex64::default(); len],
            scratch: vec![Complex64::default(); scratch_len],
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn bins(&self) -> usize {
        self.len / 2 + 1
    }

    pub fn forward(&mut self, signal: ArrayView1<'_, f64>) -> Array1<Complex64> {
        debug_assert_eq!(signal.len(), self.len);
        for (slot, &x) in self.buffer.iter_mut().zip(signal.iter()) {
            *slot = Complex64::new(x, 0.0);
        }
        self.forward
            .process_with_scratch(&mut self.buffer, &mut self.scratch);
        self.buffer[..self.bins()].iter().copied().collect()
    }

    /// Real signal whose one-sided spectrum is `bins`.
    ///
    /// Missing bins count as zero. The imaginary parts of the zero bin and,
    /// for even lengths, of the last bin do not affect the result.
    pub fn inverse(&mut self, bins: ArrayView1<'_, Complex64>) -> Array1<f64> {
        let len = self.len;
        let half = self.bins();
        self.buffer.fill(Complex64::default());
        for (k, &bin) in bins.iter().take(half).enumerate() {
            self.buffer[k] = bin;
            let mirror = (len - k) % len;
            if mirror != k {
                self.buffer[mirror] = bin.conj();
            }
        }
        self.inverse
            .process_with_scratch(&mut self.buffer, &mut self.scratch);
        let scale = 1.0 / len as f64;
        self.buffer.iter().map(|z| z.re * scale).collect()
    }
}

/// Bin frequencies in cycles per sample, `k / len` for `k` in `0..=len/2`.
pub fn frequencies(len: usize) -> Array1<f64> {
    Array1::from_shape_fn(len / 2 + 1, |k| k as f64 / len as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use std::f64::consts::TAU;

    #[test]
    fn forward_finds_a_pure_tone() {
        let n = 16;
        let signal = Array1::from_shape_fn(n, |k| (TAU * 3.0 * k as f64 / n as f64).cos());
        let mut fft = RealFft::new(n);
        let bins = fft.forward(signal.view());
        assert_eq!(bins.len(), 9);
        for (k, bin) in bins.iter().enumerate() {
            let expected = if k == 3 { n as f64 / 2.0 } else { 0.0 };
            assert!((bin.re - expected).abs() < 1e-9, "bin {k}");
            assert!(bin.im.abs() < 1e-9, "bin {k}");
        }
    }

    #[test]
    fn inverse_undoes_forward_for_odd_and_even_lengths() {
        for n in [7, 8] {
            let signal = Array1::from_shape_fn(n, |k| ((k * k) % 5) as f64 - 1.5);
            let mut fft = RealFft::new(n);
            let bins = fft.forward(signal.view());
            let back = fft.inverse(bins.view());
            for (a, b) in signal.iter().zip(back.iter()) {
                assert!((a - b).abs() < 1e-12, "n = {n}");
            }
        }
    }

    #[test]
    fn frequencies_ascend_from_zero() {
        assert_eq!(frequencies(4), array![0.0, 0.25, 0.5]);
        assert_eq!(frequencies(5), array![0.0, 0.2, 0.4]);
    }
}
