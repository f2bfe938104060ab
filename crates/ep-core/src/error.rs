// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

use ep_expr::ExprError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EpicycleError>;

/// Failures raised while turning text into a sampled spectrum.
///
/// Only [`EpicycleError::VariableNotFound`] is meant for the end user; every
/// other variant is recovered from by keeping the last good state.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum EpicycleError {
    #[error("expression does not depend on '{0}'")]
    VariableNotFound(String),
    #[error("unable to interpret expression: {0}")]
    Parse(#[from] ExprError),
    #[error("evaluation produced a non-finite value at sample {index} (t = {t})")]
    NonFinite { index: usize, t: f64 },
    #[error("expected {expected} parameter value(s), found {found}")]
    ParameterCount { expected: usize, found: usize },
    #[error("expression grew to {nodes} nodes, more than the {limit} allowed")]
    TooLarge { nodes: usize, limit: usize },
    #[error("integral would nest numerical quadrature {depth} levels deep")]
    NestedQuadrature { depth: usize },
}

impl EpicycleError {
    /// Whether the error rejects the submitted text outright.
    pub fn is_variable_not_found(&self) -> bool {
        matches!(self, EpicycleError::VariableNotFound(_))
    }
}
