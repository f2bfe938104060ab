// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

use ndarray::{Array1, ArrayView1};

/// Fits a sampled signal into a vertical range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VerticalRescaler {
    y_min: f64,
    y_max: f64,
    range: [f64; 2],
}

impl VerticalRescaler {
    /// Records the extent of `samples` against the target `range`.
    pub fn measure(samples: ArrayView1<'_, f64>, range: [f64; 2]) -> Self {
        let (y_min, y_max) = samples
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &y| {
                (lo.min(y), hi.max(y))
            });
        Self {
            y_min,
            y_max,
            range,
        }
    }

    pub fn span(&self) -> f64 {
        self.y_max - self.y_min
    }

    /// Whether the signal already lies inside the range. A constant signal
    /// counts as in bounds since it cannot be stretched.
    pub fn in_bounds(&self) -> bool {
        if !(self.span() > 0.0) {
            return true;
        }
        let [lo, hi] = self.range;
        (lo..=hi).contains(&self.y_min) && (lo..=hi).contains(&self.y_max)
    }

    /// Maps the measured extent onto the range exactly.
    pub fn apply(&self, samples: &mut Array1<f64>) {
        let [lo, hi] = self.range;
        let scale = (hi - lo) / self.span();
        // Rounding may overshoot `hi` by an ulp, which would trip the next fit.
        samples.mapv_inplace(|y| ((y - self.y_min) * scale + lo).min(hi));
    }

    /// Rescales `samples` in place when out of bounds. Returns whether any
    /// change was made.
    pub fn fit(samples: &mut Array1<f64>, range: [f64; 2]) -> bool {
        let rescaler = Self::measure(samples.view(), range);
        if rescaler.in_bounds() {
            false
        } else {
            rescaler.apply(samples);
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn signals_inside_the_range_are_untouched() {
        let mut y = array![-0.5, 0.25, 1.0];
        let before = y.clone();
        assert!(!VerticalRescaler::fit(&mut y, [-1.0, 1.0]));
        assert_eq!(y, before);
    }

    #[test]
    fn out_of_range_signals_hit_both_ends() {
        let mut y = array![0.0, 5.0, 10.0];
        assert!(VerticalRescaler::fit(&mut y, [-1.0, 1.0]));
        assert_eq!(y, array![-1.0, 0.0, 1.0]);
        assert!(VerticalRescaler::measure(y.view(), [-1.0, 1.0]).in_bounds());
    }

    #[test]
    fn constant_signals_count_as_in_bounds() {
        let mut y = array![3.0, 3.0];
        assert!(!VerticalRescaler::fit(&mut y, [-1.0, 1.0]));
        assert_eq!(y, array![3.0, 3.0]);
    }
}
