// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

//! Guessing sensible starting values for free parameters.

use crate::expr::{BinaryOp, Expr};

/// Flattens a product into its factors, looking through signs and quotients.
fn factors<'a>(expr: &'a Expr, out: &mut Vec<&'a Expr>) {
    match expr {
        Expr::Neg(inner) => factors(inner, out),
        Expr::Binary {
            op: BinaryOp::Mul | BinaryOp::Div,
            lhs,
            rhs,
        } => {
            factors(lhs, out);
            factors(rhs, out);
        }
        other => out.push(other),
    }
}

fn is_product(expr: &Expr) -> bool {
    matches!(
        expr,
        Expr::Neg(_)
            | Expr::Binary {
                op: BinaryOp::Mul | BinaryOp::Div,
                ..
            }
    )
}

impl Expr {
    /// Whether `param` scales some sub-expression that depends on `var`.
    ///
    /// True when a product somewhere in the tree has one factor containing
    /// `var` and a different factor containing `param` but not `var`, as in
    /// the amplitude `a` and the wavenumber `k` of `a*sin(k*t)`.
    pub fn scales(&self, var: &str, param: &str) -> bool {
        if !is_product(self) {
            return self
                .children()
                .into_iter()
                .any(|child| child.scales(var, param));
        }
        let mut parts = Vec::new();
        factors(self, &mut parts);
        let found = parts.iter().enumerate().any(|(i, with_var)| {
            with_var.contains_symbol(var)
                && parts.iter().enumerate().any(|(j, with_param)| {
                    i != j && with_param.contains_symbol(param) && !with_param.contains_symbol(var)
                })
        });
        found || parts.iter().any(|part| part.scales(var, param))
    }

    /// Initial value for `param`: one for multiplicative parameters so they do
    /// not flatten the curve, zero for offsets and phases.
    pub fn default_value(&self, var: &str, param: &str) -> f64 {
        if self.scales(var, param) {
            1.0
        } else {
            0.0
        }
    }
}
