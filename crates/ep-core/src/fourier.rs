// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

//! Sampled spectra of the current function.

use ndarray::{Array1, ArrayView1};
use num_complex::Complex64;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::function::PeriodicFunction;
use crate::grid::SampleGrid;
use crate::rescale::VerticalRescaler;
use crate::spectrum::{self, RealFft};

/// Default vertical range samples are fitted into.
pub const DEFAULT_Y_RANGE: [f64; 2] = [-1.0, 1.0];

/// One row of the coefficient table.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Harmonic {
    /// Cycles per sample.
    pub frequency: f64,
    pub magnitude: f64,
    /// Radians.
    pub phase: f64,
}

/// Everything derived from one (function, grid, parameters) triple.
#[derive(Clone, Debug)]
struct Analysis {
    samples: Array1<f64>,
    raw: Array1<Complex64>,
    amplitudes: Array1<Complex64>,
    frequencies: Array1<f64>,
    rescaled: bool,
}

/// Holds the current function, its sample grid and the one-sided Fourier
/// coefficients of the sampled signal.
///
/// Every setter recomputes the spectrum wholesale. A recompute that fails
/// leaves the previous state untouched and returns the error.
#[derive(Debug)]
pub struct FourierData {
    function: PeriodicFunction,
    grid: SampleGrid,
    params: Vec<f64>,
    y_range: [f64; 2],
    fft: RealFft,
    analysis: Analysis,
}

impl FourierData {
    /// Samples `function` over `grid` with its default parameters.
    pub fn new(function: PeriodicFunction, grid: SampleGrid) -> Result<Self> {
        Self::with_y_range(function, grid, DEFAULT_Y_RANGE)
    }

    pub fn with_y_range(
        function: PeriodicFunction,
        grid: SampleGrid,
        y_range: [f64; 2],
    ) -> Result<Self> {
        let params = function.defaults().to_vec();
        let mut fft = RealFft::new(grid.len());
        let analysis = analyse(&function, &grid, &params, y_range, &mut fft)?;
        Ok(Self {
            function,
            grid,
            params,
            y_range,
            fft,
            analysis,
        })
    }

    /// Replaces the function and recomputes with its default parameters.
    pub fn set_function(&mut self, function: PeriodicFunction) -> Result<()> {
        let params = function.defaults().to_vec();
        self.set_function_with(function, params)
    }

    /// Replaces the function and parameter values in one step.
    pub fn set_function_with(&mut self, function: PeriodicFunction, params: Vec<f64>) -> Result<()> {
        let analysis = analyse(&function, &self.grid, &params, self.y_range, &mut self.fft)?;
        info!(function = %function.label(), "function replaced");
        self.function = function;
        self.params = params;
        self.analysis = analysis;
        Ok(())
    }

    /// Recomputes with `values`, given in the function's parameter order.
    pub fn set_params(&mut self, values: &[f64]) -> Result<()> {
        let analysis = analyse(&self.function, &self.grid, values, self.y_range, &mut self.fft)?;
        self.params = values.to_vec();
        self.analysis = analysis;
        Ok(())
    }

    /// Resamples with `len` points and the last parameter values.
    pub fn set_sample_count(&mut self, len: usize) -> Result<()> {
        self.set_grid(self.grid.with_len(len))
    }

    /// Moves the sampled period and recomputes with the last parameter values.
    pub fn set_period(&mut self, start: f64, length: f64) -> Result<()> {
        self.set_grid(self.grid.with_period(start, length))
    }

    /// Changes the range samples are fitted into.
    pub fn set_y_range(&mut self, y_range: [f64; 2]) -> Result<()> {
        if !(y_range[0] < y_range[1]) {
            warn!(?y_range, "ignoring empty vertical range");
            return Ok(());
        }
        let analysis = analyse(&self.function, &self.grid, &self.params, y_range, &mut self.fft)?;
        self.y_range = y_range;
        self.analysis = analysis;
        Ok(())
    }

    fn set_grid(&mut self, grid: SampleGrid) -> Result<()> {
        if grid == self.grid {
            return Ok(());
        }
        let mut fft = if grid.len() == self.fft.len() {
            None
        } else {
            Some(RealFft::new(grid.len()))
        };
        let plan = fft.as_mut().unwrap_or(&mut self.fft);
        let analysis = analyse(&self.function, &grid, &self.params, self.y_range, plan)?;
        if let Some(fft) = fft {
            self.fft = fft;
        }
        self.grid = grid;
        self.analysis = analysis;
        Ok(())
    }

    pub fn function(&self) -> &PeriodicFunction {
        &self.function
    }

    pub fn grid(&self) -> &SampleGrid {
        &self.grid
    }

    pub fn params(&self) -> &[f64] {
        &self.params
    }

    pub fn y_range(&self) -> [f64; 2] {
        self.y_range
    }

    /// The sampled signal after any rescaling.
    pub fn samples(&self) -> ArrayView1<'_, f64> {
        self.analysis.samples.view()
    }

    /// Whether the last recompute had to rescale the samples.
    pub fn was_rescaled(&self) -> bool {
        self.analysis.rescaled
    }

    /// Raw transform bins, before normalisation and sorting. Feeding them to
    /// an inverse transform reproduces [`Self::samples`].
    pub fn unscaled_amplitudes(&self) -> ArrayView1<'_, Complex64> {
        self.analysis.raw.view()
    }

    /// Phasor amplitudes in ascending frequency order.
    /// The DC bin and, for an even sample count, the Nyquist bin are halved.
    pub fn amplitudes(&self) -> ArrayView1<'_, Complex64> {
        self.analysis.amplitudes.view()
    }

    /// Ascending frequencies in cycles per sample.
    pub fn frequencies(&self) -> ArrayView1<'_, f64> {
        self.analysis.frequencies.view()
    }

    /// Number of harmonics, `M = N / 2 + 1`.
    pub fn harmonics(&self) -> usize {
        self.analysis.amplitudes.len()
    }

    pub fn table(&self) -> Vec<Harmonic> {
        self.analysis
            .amplitudes
            .iter()
            .zip(self.analysis.frequencies.iter())
            .map(|(a, &frequency)| Harmonic {
                frequency,
                magnitude: a.norm(),
                phase: a.arg(),
            })
            .collect()
    }
}

/// Samples, rescales and transforms without touching any held state.
fn analyse(
    function: &PeriodicFunction,
    grid: &SampleGrid,
    params: &[f64],
    y_range: [f64; 2],
    fft: &mut RealFft,
) -> Result<Analysis> {
    let ts = grid.samples();
    let mut samples = function.eval_with(ts.view(), params)?;
    let rescaled = VerticalRescaler::fit(&mut samples, y_range);
    if rescaled {
        warn!(?y_range, "samples rescaled into range");
    }

    let n = grid.len();
    let raw = fft.forward(samples.view());
    let unsorted = spectrum::frequencies(n);
    let mut order: Vec<usize> = (0..unsorted.len()).collect();
    order.sort_by(|&a, &b| unsorted[a].total_cmp(&unsorted[b]));

    let scale = 2.0 / n as f64;
    let frequencies: Array1<f64> = order.iter().map(|&k| unsorted[k]).collect();
    let mut amplitudes: Array1<Complex64> = order.iter().map(|&k| raw[k] * scale).collect();
    amplitudes[0] *= 0.5;
    if n % 2 == 0 {
        // The Nyquist bin has no mirror image either.
        let last = amplitudes.len() - 1;
        amplitudes[last] *= 0.5;
    }
    debug!(samples = n, harmonics = amplitudes.len(), rescaled, "spectrum recomputed");
    Ok(Analysis {
        samples,
        raw,
        amplitudes,
        frequencies,
        rescaled,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EpicycleError;

    fn data(src: &str, n: usize) -> FourierData {
        let f = PeriodicFunction::parse(src).unwrap();
        FourierData::new(f, SampleGrid::default().with_len(n)).unwrap()
    }

    #[test]
    fn frequencies_ascend_and_dc_is_halved() {
        let d = data("0.5 + t - t", 8);
        let f = d.frequencies();
        assert!(f.windows(2).into_iter().all(|w| w[0] < w[1]));
        assert_eq!(d.harmonics(), 5);
        assert!((d.amplitudes()[0].re - 0.5).abs() < 1e-12);
        assert!(d.amplitudes().iter().skip(1).all(|a| a.norm() < 1e-12));
    }

    #[test]
    fn nyquist_bin_is_halved_for_even_counts() {
        // On the default grid cos(4t) alternates sign sample by sample.
        let d = data("cos(4*t)/2", 8);
        let last = d.amplitudes()[4];
        assert!((last.norm() - 0.5).abs() < 1e-12);
        assert!(d.amplitudes().iter().take(4).all(|a| a.norm() < 1e-12));
    }

    #[test]
    fn failed_recompute_keeps_previous_state() {
        let mut d = data("a*sin(t)", 16);
        let before = d.amplitudes().to_owned();
        let err = d.set_params(&[1.0, 2.0]).unwrap_err();
        assert_eq!(err, EpicycleError::ParameterCount { expected: 1, found: 2 });
        assert_eq!(d.amplitudes(), before.view());

        let bad = PeriodicFunction::parse("1/(t - t)").unwrap();
        assert!(d.set_function(bad).is_err());
        assert_eq!(d.function().label(), "a*sin(t)");
    }

    #[test]
    fn grid_changes_keep_last_parameters() {
        let mut d = data("a*sin(t)", 16);
        d.set_params(&[0.5]).unwrap();
        d.set_sample_count(32).unwrap();
        assert_eq!(d.params(), [0.5]);
        assert_eq!(d.harmonics(), 17);
        let peak = d.amplitudes()[1].norm();
        assert!((peak - 0.5).abs() < 1e-9);
    }

    #[test]
    fn loud_signals_are_rescaled() {
        let d = data("3*sin(t)", 64);
        assert!(d.was_rescaled());
        let max = d.samples().iter().cloned().fold(f64::MIN, f64::max);
        assert!((max - 1.0).abs() < 1e-12);
    }

    #[test]
    fn unscaled_amplitudes_invert_to_the_samples() {
        let d = data("rect(t) + t/10", 20);
        let mut fft = RealFft::new(20);
        let back = fft.inverse(d.unscaled_amplitudes());
        for (a, b) in back.iter().zip(d.samples().iter()) {
            assert!((a - b).abs() < 1e-12);
        }
    }
}
