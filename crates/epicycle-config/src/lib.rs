// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

//! Process-wide configuration shared by the epicycle crates.
//!
//! * [`tracing`] installs the global subscriber.
//! * [`determinism`] derives reproducible RNGs (used by the `noise` builtin).
//! * [`settings`] holds the tunable animation defaults.

pub mod determinism;
pub mod settings;
pub mod tracing;

pub use settings::{AnimationSettings, SettingsError};
