// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

//! Named waveforms offered to hosts as a starting point.

/// `(name, function text)` pairs in display order.
pub const PRESETS: &[(&str, &str)] = &[
    ("sine", "sin(t)"),
    ("cosine", "cos(t)"),
    ("gaussian", "3*exp(-t**2/(2*sigma**2))/2 - 1/2"),
    ("sinc", "3*sinc(6.5*k*t)/2 - 1/2"),
    ("rectangle", "3*rect(t)/2"),
    ("sawtooth", "t/pi"),
    ("triangle", "abs(t)"),
];

pub fn preset(name: &str) -> Option<&'static str> {
    PRESETS
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, text)| *text)
}

pub fn names() -> impl Iterator<Item = &'static str> {
    PRESETS.iter().map(|(name, _)| *name)
}
