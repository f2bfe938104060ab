// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

//! The Fourier series animation: epicycles on the left, the waveform and its
//! truncated reconstruction on the right.

use std::time::Duration;

use epicycle_config::AnimationSettings;
use tracing::{debug, info, trace, warn};

use crate::driver::Animation;
use crate::error::{EpicycleError, Result};
use crate::fourier::FourierData;
use crate::function::PeriodicFunction;
use crate::grid::SampleGrid;
use crate::phasor::PhasorChain;
use crate::presets;
use crate::scene::{DrawableId, LineStyle, Scene};
use crate::spectrum::RealFft;

/// Horizontal span the waveform is drawn over. The guide line meets it at
/// the left end.
pub const WAVEFORM_SPAN: [f64; 2] = [2.0, 6.0];

/// Titles longer than this fall back to the bare `f(t)`.
const TITLE_LIMIT: usize = 100;

const LABEL_POSITION: (f64, f64) = (-2.05, 1.0);

/// A change requested by a host between ticks.
#[derive(Clone, Debug, PartialEq)]
pub enum ControlEvent {
    SetFunction(String),
    /// Selects one of [`presets::PRESETS`] by name.
    SetPreset(String),
    SetParams(Vec<f64>),
    SetResolution(usize),
    SetSpeed(i64),
    SetSampleCount(usize),
    SetPeriod { start: f64, length: f64 },
    Differentiate,
    Integrate,
}

#[derive(Clone, Copy, Debug)]
struct Handles {
    chain: DrawableId,
    waveform: DrawableId,
    reconstruction: DrawableId,
    guide: DrawableId,
    label: DrawableId,
}

#[derive(Debug)]
pub struct FourierAnimation {
    chain: PhasorChain,
    speed: i64,
    fft: RealFft,
    /// Sampled waveform in grid order.
    waveform: Vec<f64>,
    /// Inverse transform of the truncated series, in grid order.
    reconstruction: Vec<f64>,
    display_xs: Vec<f64>,
    scratch: Vec<f64>,
    title: String,
    title_dirty: bool,
    handles: Handles,
}

impl FourierAnimation {
    /// Parses the configured function, creates the drawables in `scene` and
    /// draws the initial frame.
    pub fn new(scene: &mut dyn Scene, settings: &AnimationSettings) -> Result<Self> {
        let function = PeriodicFunction::parse(&settings.function)?;
        let grid = SampleGrid::new(settings.start, settings.period, settings.samples);
        let data = FourierData::with_y_range(function, grid, settings.y_range)?;
        let mut chain = PhasorChain::new(data, settings.points_per_circle);
        chain.update(settings.initial_counter);

        let (x, y) = LABEL_POSITION;
        let handles = Handles {
            chain: scene.create_line(LineStyle::solid("black")),
            waveform: scene.create_line(LineStyle::solid("gray")),
            reconstruction: scene.create_line(LineStyle::solid("red")),
            guide: scene.create_line(LineStyle::dashed("red")),
            label: scene.create_text(x, y, ""),
        };

        let len = grid.len();
        let mut animation = Self {
            chain,
            speed: settings.speed,
            fft: RealFft::new(len),
            waveform: Vec::with_capacity(len),
            reconstruction: Vec::with_capacity(len),
            display_xs: Vec::new(),
            scratch: Vec::new(),
            title: String::new(),
            title_dirty: true,
            handles,
        };
        animation.resync();
        animation.draw(scene);
        Ok(animation)
    }

    pub fn chain(&self) -> &PhasorChain {
        &self.chain
    }

    pub fn function(&self) -> &PeriodicFunction {
        self.chain.function()
    }

    pub fn speed(&self) -> i64 {
        self.speed
    }

    /// Rotation-counter increment per frame. Negative values reverse the
    /// rotation and zero pauses it.
    pub fn set_speed(&mut self, speed: i64) {
        self.speed = speed;
    }

    pub fn counter(&self) -> i64 {
        self.chain.counter()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn waveform(&self) -> &[f64] {
        &self.waveform
    }

    pub fn reconstruction(&self) -> &[f64] {
        &self.reconstruction
    }

    /// Applies a host request.
    ///
    /// Only function submissions report failure to the caller; every other
    /// failure is logged and the previous state stays in place.
    pub fn apply(&mut self, event: ControlEvent) -> Result<()> {
        match event {
            ControlEvent::SetFunction(text) => self.submit(&text),
            ControlEvent::SetPreset(name) => match presets::preset(&name) {
                Some(text) => self.submit(text),
                None => {
                    warn!(%name, "unknown preset");
                    Ok(())
                }
            },
            ControlEvent::SetParams(values) => {
                self.recover(|chain| chain.set_params(&values));
                Ok(())
            }
            ControlEvent::SetResolution(resolution) => {
                self.chain.set_resolution(resolution);
                self.resync();
                Ok(())
            }
            ControlEvent::SetSpeed(speed) => {
                self.set_speed(speed);
                Ok(())
            }
            ControlEvent::SetSampleCount(len) => {
                self.recover(|chain| chain.set_number_of_points(len));
                Ok(())
            }
            ControlEvent::SetPeriod { start, length } => {
                self.recover(|chain| chain.set_period(start, length));
                Ok(())
            }
            ControlEvent::Differentiate => {
                self.recover(|chain| {
                    let mut function = chain.function().clone();
                    function.differentiate()?;
                    let params = chain.data().params().to_vec();
                    chain.set_function_with(function, params)
                });
                Ok(())
            }
            ControlEvent::Integrate => {
                self.recover(|chain| {
                    let mut function = chain.function().clone();
                    function.integrate()?;
                    let params = chain.data().params().to_vec();
                    chain.set_function_with(function, params)
                });
                Ok(())
            }
        }
    }

    fn submit(&mut self, text: &str) -> Result<()> {
        let outcome = PeriodicFunction::parse(text).and_then(|f| self.chain.set_function(f));
        match outcome {
            Ok(()) => {
                info!(function = %text, "function submitted");
                self.resync();
                Ok(())
            }
            Err(err) => {
                warn!(function = %text, %err, "function rejected");
                Err(err)
            }
        }
    }

    fn recover(&mut self, change: impl FnOnce(&mut PhasorChain) -> Result<()>) {
        match change(&mut self.chain) {
            Ok(()) => self.resync(),
            Err(err) => warn!(%err, "change ignored, keeping previous state"),
        }
    }

    /// Rebuilds the waveform, reconstruction and title after a data change.
    fn resync(&mut self) {
        let data = self.chain.data();
        let len = data.grid().len();
        if self.fft.len() != len {
            self.fft = RealFft::new(len);
        }
        self.waveform = data.samples().to_vec();
        self.reconstruction = self.fft.inverse(self.chain.amplitudes().view()).to_vec();

        let [left, right] = WAVEFORM_SPAN;
        let step = if len > 1 { (right - left) / (len - 1) as f64 } else { 0.0 };
        self.display_xs.clear();
        self.display_xs.extend((0..len).map(|k| left + k as f64 * step));
        self.scratch.resize(len, 0.0);

        let title = title_for(self.chain.function());
        if title != self.title {
            self.title = title;
            self.title_dirty = true;
        }
        debug!(samples = len, resolution = self.chain.resolution(), "animation resynced");
    }

    /// Writes the current state into the scene.
    fn draw(&mut self, scene: &mut dyn Scene) {
        let (xs, ys) = self.chain.coordinates();
        scene.set_line_data(self.handles.chain, xs, ys);

        let tip = self.chain.end_point();
        scene.set_line_data(self.handles.guide, &[tip.im, WAVEFORM_SPAN[0]], &[tip.re, tip.re]);

        let counter = self.chain.counter();
        roll_into(&self.waveform, counter, &mut self.scratch);
        scene.set_line_data(self.handles.waveform, &self.display_xs, &self.scratch);
        roll_into(&self.reconstruction, counter, &mut self.scratch);
        scene.set_line_data(self.handles.reconstruction, &self.display_xs, &self.scratch);

        if self.title_dirty {
            scene.set_text(self.handles.label, &self.title);
            self.title_dirty = false;
        }
    }
}

impl Animation for FourierAnimation {
    fn drawables(&self) -> Vec<DrawableId> {
        let h = self.handles;
        vec![h.chain, h.waveform, h.reconstruction, h.guide, h.label]
    }

    fn update(&mut self, scene: &mut dyn Scene, delta: Duration) {
        self.chain.advance(self.speed);
        self.draw(scene);
        trace!(counter = self.chain.counter(), ?delta, "frame");
    }
}

/// `out[k] = src[(k - shift) mod len]`: the sample shown at the left end of
/// the waveform is the one the chain tip currently reproduces.
fn roll_into(src: &[f64], shift: i64, out: &mut [f64]) {
    let len = src.len() as i64;
    if len == 0 {
        return;
    }
    for (k, slot) in out.iter_mut().enumerate() {
        let index = (k as i64 - shift).rem_euclid(len) as usize;
        *slot = src[index];
    }
}

fn title_for(function: &PeriodicFunction) -> String {
    let title = format!("f({}) = {}", function.variable(), function.label());
    if title.len() > TITLE_LIMIT {
        format!("f({})", function.variable())
    } else {
        title
    }
}

/// Whether `err` should be shown to the user rather than only logged.
pub fn is_user_facing(err: &EpicycleError) -> bool {
    err.is_variable_not_found() || matches!(err, EpicycleError::Parse(_))
}
