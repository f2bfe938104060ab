// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

//! Fourier series epicycles.
//!
//! A [`PeriodicFunction`] is sampled over a [`SampleGrid`], fitted into a
//! vertical range and transformed into one-sided coefficients held by
//! [`FourierData`]. A [`PhasorChain`] sums the coefficients as rotating
//! phasors for an integer rotation counter, producing chain vertices and
//! epicycle outlines. [`FourierAnimation`] renders the chain next to the
//! waveform into a [`Scene`], and [`AnimationDriver`] ticks it at a fixed
//! rate.
//!
//! ```no_run
//! use std::time::Duration;
//! use ep_core::{AnimationDriver, ControlEvent, FourierAnimation, MemoryScene};
//! use epicycle_config::AnimationSettings;
//!
//! let settings = AnimationSettings::from_env();
//! let mut scene = MemoryScene::new();
//! let animation = FourierAnimation::new(&mut scene, &settings)?;
//! let mut driver = AnimationDriver::new(animation, scene, Duration::from_millis(15));
//! driver.run_frames(10);
//! driver.animation_mut().apply(ControlEvent::SetResolution(8))?;
//! driver.run_frames(10);
//! # Ok::<(), ep_core::EpicycleError>(())
//! ```

pub mod animation;
pub mod driver;
pub mod error;
pub mod fourier;
pub mod function;
pub mod grid;
pub mod phasor;
pub mod presets;
pub mod rescale;
pub mod scene;
pub mod spectrum;
pub mod telemetry;

pub use animation::{ControlEvent, FourierAnimation};
pub use driver::{Animation, AnimationDriver};
pub use error::{EpicycleError, Result};
pub use fourier::{FourierData, Harmonic};
pub use function::PeriodicFunction;
pub use grid::SampleGrid;
pub use phasor::PhasorChain;
pub use rescale::VerticalRescaler;
pub use scene::{DrawableId, LineStyle, MemoryScene, Scene};
pub use spectrum::RealFft;
