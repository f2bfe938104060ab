// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

//! The rotating phasor chain and its epicycle outlines.

use std::f64::consts::TAU;

use ndarray::Array1;
use num_complex::Complex64;
use tracing::{debug, trace};

use crate::error::Result;
use crate::fourier::FourierData;
use crate::function::PeriodicFunction;

pub const DEFAULT_POINTS_PER_CIRCLE: usize = 50;

/// Circles whose radius is below this fraction of the vertical extent are
/// drawn as a single point.
const CUTOFF_FRACTION: f64 = 1e-3;

/// Chain of `resolution` rotating phasors whose running sum approximates the
/// sampled function at the current rotation counter.
///
/// The outline buffer holds `points_per_circle + 1` slots per harmonic: the
/// chain vertex followed by points of the circle it travels on. Plot
/// coordinates use the imaginary part as `x` and the real part as `y`, so
/// the chain tip moves vertically with the signal value.
#[derive(Debug)]
pub struct PhasorChain {
    data: FourierData,
    resolution: usize,
    counter: i64,
    points_per_circle: usize,
    /// `exp(2πi (m + 1) / points_per_circle)` for each outline point.
    generator: Vec<Complex64>,
    vertices: Vec<Complex64>,
    outline: Vec<Complex64>,
    xs: Vec<f64>,
    ys: Vec<f64>,
    /// Squared radius below which a circle collapses.
    cutoff: f64,
}

impl PhasorChain {
    /// Builds a chain over `data` with every harmonic active.
    pub fn new(data: FourierData, points_per_circle: usize) -> Self {
        let points_per_circle = points_per_circle.max(1);
        let generator = (0..points_per_circle)
            .map(|m| Complex64::from_polar(1.0, TAU * (m + 1) as f64 / points_per_circle as f64))
            .collect();
        let resolution = data.harmonics();
        let mut chain = Self {
            data,
            resolution,
            counter: 0,
            points_per_circle,
            generator,
            vertices: Vec::new(),
            outline: Vec::new(),
            xs: Vec::new(),
            ys: Vec::new(),
            cutoff: 0.0,
        };
        chain.update_cutoff();
        chain.resize_buffers();
        chain.update(0);
        chain
    }

    pub fn data(&self) -> &FourierData {
        &self.data
    }

    pub fn function(&self) -> &PeriodicFunction {
        self.data.function()
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    pub fn counter(&self) -> i64 {
        self.counter
    }

    pub fn points_per_circle(&self) -> usize {
        self.points_per_circle
    }

    /// Number of available harmonics, `M`.
    pub fn harmonics(&self) -> usize {
        self.data.harmonics()
    }

    /// Sets how many harmonics are summed. Requests outside `1..=M` are
    /// ignored.
    pub fn set_resolution(&mut self, resolution: usize) {
        if (1..=self.harmonics()).contains(&resolution) {
            self.resolution = resolution;
            self.refresh();
        } else {
            debug!(resolution, harmonics = self.harmonics(), "resolution out of range");
        }
    }

    pub fn set_function(&mut self, function: PeriodicFunction) -> Result<()> {
        self.data.set_function(function)?;
        self.after_data_change();
        Ok(())
    }

    pub fn set_function_with(&mut self, function: PeriodicFunction, params: Vec<f64>) -> Result<()> {
        self.data.set_function_with(function, params)?;
        self.after_data_change();
        Ok(())
    }

    pub fn set_params(&mut self, values: &[f64]) -> Result<()> {
        self.data.set_params(values)?;
        self.after_data_change();
        Ok(())
    }

    pub fn set_number_of_points(&mut self, len: usize) -> Result<()> {
        self.data.set_sample_count(len)?;
        self.after_data_change();
        Ok(())
    }

    pub fn set_period(&mut self, start: f64, length: f64) -> Result<()> {
        self.data.set_period(start, length)?;
        self.after_data_change();
        Ok(())
    }

    pub fn set_y_range(&mut self, y_range: [f64; 2]) -> Result<()> {
        self.data.set_y_range(y_range)?;
        self.update_cutoff();
        self.after_data_change();
        Ok(())
    }

    /// Overrides the radius below which circles are drawn as points.
    pub fn set_circle_cutoff(&mut self, radius: f64) {
        self.cutoff = radius * radius;
        self.refresh();
    }

    fn update_cutoff(&mut self) {
        let [lo, hi] = self.data.y_range();
        let radius = (hi - lo) * CUTOFF_FRACTION;
        self.cutoff = radius * radius;
    }

    fn after_data_change(&mut self) {
        // A smaller grid offers fewer harmonics.
        self.resolution = self.resolution.min(self.harmonics());
        self.resize_buffers();
        self.refresh();
    }

    /// Sizes the buffers for the current harmonic count. Only grid changes
    /// reallocate; ticks reuse the buffers.
    fn resize_buffers(&mut self) {
        let harmonics = self.harmonics();
        let slots = harmonics * (self.points_per_circle + 1);
        if self.vertices.len() != harmonics {
            self.vertices.resize(harmonics, Complex64::default());
        }
        if self.outline.len() != slots {
            self.outline.resize(slots, Complex64::default());
            self.xs.resize(slots, 0.0);
            self.ys.resize(slots, 0.0);
        }
    }

    fn refresh(&mut self) {
        self.update(self.counter);
    }

    /// Moves the rotation counter by `step` and recomputes the chain.
    pub fn advance(&mut self, step: i64) {
        self.update(self.counter.wrapping_add(step));
    }

    /// Recomputes vertices and outlines for rotation counter `counter`.
    ///
    /// Harmonic `j` contributes `a_j · exp(-2πi · counter · f_j)`. Harmonics
    /// at or beyond the resolution repeat the last computed vertex.
    pub fn update(&mut self, counter: i64) {
        self.counter = counter;
        let amplitudes = self.data.amplitudes();
        let frequencies = self.data.frequencies();
        let stride = self.points_per_circle + 1;

        let mut centre = Complex64::default();
        for j in 0..self.resolution {
            // Reduce to whole turns first so large counters keep precision.
            let turns = (counter as f64 * frequencies[j]).rem_euclid(1.0);
            let phasor = amplitudes[j] * Complex64::from_polar(1.0, -TAU * turns);
            let vertex = centre + phasor;
            self.vertices[j] = vertex;

            let block = &mut self.outline[j * stride..(j + 1) * stride];
            block[0] = vertex;
            if j == 0 || phasor.norm_sqr() < self.cutoff {
                block[1..].fill(vertex);
            } else {
                for (slot, g) in block[1..].iter_mut().zip(&self.generator) {
                    *slot = centre + phasor * g;
                }
            }
            centre = vertex;
        }

        let tip = centre;
        self.vertices[self.resolution..].fill(tip);
        self.outline[self.resolution * stride..].fill(tip);
        for ((x, y), z) in self.xs.iter_mut().zip(self.ys.iter_mut()).zip(&self.outline) {
            *x = z.im;
            *y = z.re;
        }
        trace!(counter, tip.re, tip.im, "chain updated");
    }

    /// Every chain vertex, the inactive tail repeating the tip.
    pub fn vertices(&self) -> &[Complex64] {
        &self.vertices
    }

    /// Vertices of the summed harmonics only.
    pub fn active_vertices(&self) -> &[Complex64] {
        &self.vertices[..self.resolution]
    }

    pub fn outline(&self) -> &[Complex64] {
        &self.outline
    }

    /// Outline as plot coordinates: `(imaginary parts, real parts)`.
    pub fn coordinates(&self) -> (&[f64], &[f64]) {
        (&self.xs, &self.ys)
    }

    /// The chain tip. Its real part approximates the signal value.
    pub fn end_point(&self) -> Complex64 {
        self.vertices
            .last()
            .copied()
            .unwrap_or_default()
    }

    /// Raw transform bins with every bin at or beyond the resolution zeroed,
    /// ready for an inverse transform of the truncated series.
    pub fn amplitudes(&self) -> Array1<Complex64> {
        let mut amps = self.data.unscaled_amplitudes().to_owned();
        amps.iter_mut()
            .skip(self.resolution)
            .for_each(|a| *a = Complex64::default());
        amps
    }
}
