// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

//! Tunable defaults for the epicycle animation.
//!
//! Settings come from three layers: built-in defaults, an optional JSON
//! document, and `EPICYCLE_*` environment overrides. Out-of-range values are
//! clamped by [`AnimationSettings::validated`] rather than rejected, since
//! they usually originate from bounded UI controls.

use std::f64::consts::PI;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed settings document: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationSettings {
    /// Initial function text in the variable `t`.
    pub function: String,
    /// Number of samples taken over one period.
    pub samples: usize,
    /// Start of the sampling window.
    pub start: f64,
    /// Length of one period.
    pub period: f64,
    /// Boundary points drawn per epicycle.
    pub points_per_circle: usize,
    /// Target frame interval in milliseconds.
    pub interval_ms: u64,
    /// Rotation-counter increment applied each frame.
    pub speed: i64,
    /// Rotation counter at the first frame.
    pub initial_counter: i64,
    /// Vertical range the sampled waveform is rescaled into.
    pub y_range: [f64; 2],
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            function: "a*sin(10*k*(t - phi))".to_string(),
            samples: 256,
            start: -PI,
            period: 2.0 * PI,
            points_per_circle: 50,
            interval_ms: 15,
            speed: 4,
            initial_counter: -2,
            y_range: [-1.0, 1.0],
        }
    }
}

impl AnimationSettings {
    /// Parses a JSON document; missing fields keep their defaults.
    pub fn from_json_str(raw: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(raw)?;
        Ok(settings.validated())
    }

    /// Reads a JSON settings file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Applies `EPICYCLE_FUNCTION`, `EPICYCLE_SAMPLES`, `EPICYCLE_SPEED` and
    /// `EPICYCLE_INTERVAL_MS` on top of `self`. Unparsable values are ignored.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(function) = std::env::var("EPICYCLE_FUNCTION") {
            if !function.trim().is_empty() {
                self.function = function;
            }
        }
        if let Some(samples) = env_parse::<usize>("EPICYCLE_SAMPLES") {
            self.samples = samples;
        }
        if let Some(speed) = env_parse::<i64>("EPICYCLE_SPEED") {
            self.speed = speed;
        }
        if let Some(interval) = env_parse::<u64>("EPICYCLE_INTERVAL_MS") {
            self.interval_ms = interval;
        }
        self.validated()
    }

    /// Clamps every field into its admissible range.
    pub fn validated(mut self) -> Self {
        self.samples = self.samples.max(2);
        self.points_per_circle = self.points_per_circle.max(1);
        self.interval_ms = self.interval_ms.max(1);
        if !(self.period.is_finite() && self.period > 0.0) {
            self.period = 2.0 * PI;
        }
        if !self.start.is_finite() {
            self.start = -self.period / 2.0;
        }
        let [lo, hi] = self.y_range;
        if !(lo.is_finite() && hi.is_finite() && lo < hi) {
            self.y_range = [-1.0, 1.0];
        }
        self
    }

    /// Number of harmonics a one-sided transform of `samples` points yields.
    pub fn harmonics(&self) -> usize {
        self.samples / 2 + 1
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|raw| raw.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_animation() {
        let settings = AnimationSettings::default();
        assert_eq!(settings.samples, 256);
        assert_eq!(settings.harmonics(), 129);
        assert_eq!(settings.points_per_circle, 50);
        assert_eq!(settings.speed, 4);
        assert!((settings.period - 2.0 * PI).abs() < 1e-12);
    }

    #[test]
    fn json_fills_missing_fields_with_defaults() {
        let settings =
            AnimationSettings::from_json_str(r#"{"function": "sin(t)", "samples": 64}"#).unwrap();
        assert_eq!(settings.function, "sin(t)");
        assert_eq!(settings.samples, 64);
        assert_eq!(settings.interval_ms, 15);
    }

    #[test]
    fn validation_clamps_degenerate_values() {
        let settings = AnimationSettings {
            samples: 0,
            points_per_circle: 0,
            interval_ms: 0,
            period: -1.0,
            y_range: [1.0, -1.0],
            ..AnimationSettings::default()
        }
        .validated();
        assert_eq!(settings.samples, 2);
        assert_eq!(settings.points_per_circle, 1);
        assert_eq!(settings.interval_ms, 1);
        assert!(settings.period > 0.0);
        assert_eq!(settings.y_range, [-1.0, 1.0]);
    }

    #[test]
    fn malformed_json_is_reported() {
        let err = AnimationSettings::from_json_str("{samples: ").unwrap_err();
        assert!(matches!(err, SettingsError::Json(_)));
    }
}
