// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

use std::f64::consts::{PI, TAU};

use ndarray::Array1;

/// Where one period of the function is sampled.
///
/// Samples are `start + k * period / len` for `k` in `0..len`; the period
/// end point is excluded so the sequence wraps around cleanly.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SampleGrid {
    start: f64,
    period: f64,
    len: usize,
}

pub const MIN_SAMPLES: usize = 2;

impl Default for SampleGrid {
    fn default() -> Self {
        Self {
            start: -PI,
            period: TAU,
            len: 256,
        }
    }
}

impl SampleGrid {
    /// Builds a grid, raising `len` to [`MIN_SAMPLES`] and falling back to
    /// the default period when `period` is not a positive finite number.
    pub fn new(start: f64, period: f64, len: usize) -> Self {
        let fallback = Self::default();
        Self {
            start: if start.is_finite() { start } else { fallback.start },
            period: if period.is_finite() && period > 0.0 {
                period
            } else {
                fallback.period
            },
            len: len.max(MIN_SAMPLES),
        }
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn period(&self) -> f64 {
        self.period
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn spacing(&self) -> f64 {
        self.period / self.len as f64
    }

    /// Number of one-sided spectrum bins, `len / 2 + 1`.
    pub fn harmonics(&self) -> usize {
        self.len / 2 + 1
    }

    pub fn with_len(self, len: usize) -> Self {
        Self::new(self.start, self.period, len)
    }

    pub fn with_period(self, start: f64, period: f64) -> Self {
        Self::new(start, period, self.len)
    }

    pub fn samples(&self) -> Array1<f64> {
        let spacing = self.spacing();
        Array1::from_shape_fn(self.len, |k| self.start + k as f64 * spacing)
    }
}
