// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

/// Resolves symbol names to values during evaluation.
pub trait Scope {
    fn value_of(&self, name: &str) -> Option<f64>;
}

/// Parallel name/value slices, the usual way to bind a variable plus its
/// parameters.
#[derive(Clone, Copy, Debug)]
pub struct Bindings<'a> {
    names: &'a [String],
    values: &'a [f64],
}

impl<'a> Bindings<'a> {
    pub fn new(names: &'a [String], values: &'a [f64]) -> Self {
        debug_assert_eq!(names.len(), values.len());
        Self { names, values }
    }
}

impl Scope for Bindings<'_> {
    fn value_of(&self, name: &str) -> Option<f64> {
        self.names
            .iter()
            .position(|candidate| candidate == name)
            .and_then(|index| self.values.get(index).copied())
    }
}

/// Shadows one name on top of another scope. Used by quadrature to move the
/// integration variable while keeping parameters visible.
pub(crate) struct Shadow<'a> {
    pub(crate) inner: &'a dyn Scope,
    pub(crate) name: &'a str,
    pub(crate) value: f64,
}

impl Scope for Shadow<'_> {
    fn value_of(&self, name: &str) -> Option<f64> {
        if name == self.name {
            Some(self.value)
        } else {
            self.inner.value_of(name)
        }
    }
}

