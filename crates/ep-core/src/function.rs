// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

//! Periodic functions of one variable with named parameters.

use epicycle_config::determinism;
use ep_expr::{Bindings, Expr};
use ndarray::{Array1, ArrayView1};
use tracing::debug;

use crate::error::{EpicycleError, Result};

/// Name of the independent variable unless a caller picks another.
pub const DEFAULT_VARIABLE: &str = "t";

/// Largest tree derivatives and antiderivatives may produce.
pub const MAX_NODES: usize = 4096;

/// A parsed function `f(t; p...)` ready for vectorised evaluation.
///
/// Parameters are every free symbol other than the variable, in sorted
/// order. Each one carries a default picked by [`Expr::default_value`].
#[derive(Clone, Debug, PartialEq)]
pub struct PeriodicFunction {
    expr: Expr,
    variable: String,
    parameters: Vec<String>,
    defaults: Vec<f64>,
    /// The variable followed by the parameters, in binding order.
    names: Vec<String>,
}

impl PeriodicFunction {
    /// Parses `text` as a function of [`DEFAULT_VARIABLE`].
    pub fn parse(text: &str) -> Result<Self> {
        Self::parse_in(text, DEFAULT_VARIABLE)
    }

    /// Parses `text` as a function of `variable`.
    ///
    /// Text that never mentions `variable` is rejected with
    /// [`EpicycleError::VariableNotFound`].
    pub fn parse_in(text: &str, variable: &str) -> Result<Self> {
        let expr = ep_expr::parse(text)?;
        Self::from_expr(expr, variable)
    }

    pub fn from_expr(expr: Expr, variable: &str) -> Result<Self> {
        let mut symbols = expr.free_symbols();
        if !symbols.remove(variable) {
            return Err(EpicycleError::VariableNotFound(variable.to_string()));
        }
        let parameters: Vec<String> = symbols.into_iter().collect();
        Ok(Self::assemble(expr, variable.to_string(), parameters))
    }

    fn assemble(expr: Expr, variable: String, parameters: Vec<String>) -> Self {
        let defaults = parameters
            .iter()
            .map(|param| expr.default_value(&variable, param))
            .collect();
        let mut names = Vec::with_capacity(parameters.len() + 1);
        names.push(variable.clone());
        names.extend(parameters.iter().cloned());
        Self {
            expr,
            variable,
            parameters,
            defaults,
            names,
        }
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn variable(&self) -> &str {
        &self.variable
    }

    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    pub fn defaults(&self) -> &[f64] {
        &self.defaults
    }

    /// Plain-text rendering, e.g. `a*sin(10*k*(t - phi))`.
    pub fn label(&self) -> String {
        self.expr.to_string()
    }

    pub fn latex(&self) -> String {
        self.expr.to_latex()
    }

    /// Evaluates over `ts` with the default parameter values.
    pub fn eval(&self, ts: ArrayView1<'_, f64>) -> Result<Array1<f64>> {
        self.eval_with(ts, &self.defaults)
    }

    /// Evaluates over `ts` with `params` given in [`Self::parameters`] order.
    ///
    /// Every output sample must be finite; the first offending sample is
    /// reported as [`EpicycleError::NonFinite`].
    pub fn eval_with(&self, ts: ArrayView1<'_, f64>, params: &[f64]) -> Result<Array1<f64>> {
        self.check_arity(params)?;
        let mut rng = determinism::rng_from_label("noise");
        let mut values = Vec::with_capacity(params.len() + 1);
        values.push(0.0);
        values.extend_from_slice(params);

        let mut out = Array1::zeros(ts.len());
        for (index, (&t, slot)) in ts.iter().zip(out.iter_mut()).enumerate() {
            values[0] = t;
            let y = self.expr.eval(&Bindings::new(&self.names, &values), &mut rng)?;
            if !y.is_finite() {
                return Err(EpicycleError::NonFinite { index, t });
            }
            *slot = y;
        }
        Ok(out)
    }

    /// Single-point evaluation.
    pub fn eval_at(&self, t: f64, params: &[f64]) -> Result<f64> {
        let ts = [t];
        let out = self.eval_with(ArrayView1::from(&ts[..]), params)?;
        Ok(out[0])
    }

    fn check_arity(&self, params: &[f64]) -> Result<()> {
        if params.len() == self.parameters.len() {
            Ok(())
        } else {
            Err(EpicycleError::ParameterCount {
                expected: self.parameters.len(),
                found: params.len(),
            })
        }
    }

    /// Replaces the expression with its derivative. The parameter list is
    /// kept even when a parameter drops out of the result.
    pub fn differentiate(&mut self) -> Result<()> {
        let derived = self.expr.derivative(&self.variable)?;
        debug!(from = %self.expr, to = %derived, "differentiated");
        self.replace_expr(derived)
    }

    /// Replaces the expression with its antiderivative from zero.
    ///
    /// Fails without touching `self` when the result would evaluate one
    /// quadrature inside another, since every sample would then cost a
    /// quadrature per quadrature point.
    pub fn integrate(&mut self) -> Result<()> {
        let integrated = self.expr.antiderivative(&self.variable);
        let depth = integrated.quadrature_depth();
        if depth > 1 {
            return Err(EpicycleError::NestedQuadrature { depth });
        }
        debug!(from = %self.expr, to = %integrated, "integrated");
        self.replace_expr(integrated)
    }

    fn replace_expr(&mut self, expr: Expr) -> Result<()> {
        let nodes = expr.node_count();
        if nodes > MAX_NODES {
            return Err(EpicycleError::TooLarge {
                nodes,
                limit: MAX_NODES,
            });
        }
        let variable = std::mem::take(&mut self.variable);
        let parameters = std::mem::take(&mut self.parameters);
        *self = Self::assemble(expr, variable, parameters);
        Ok(())
    }
}
