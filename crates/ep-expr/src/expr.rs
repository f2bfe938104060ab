// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

use std::collections::BTreeSet;
use std::f64::consts::{E, PI};

use rand::rngs::mock::StepRng;
use rand::RngCore;

use crate::function::Function;
use crate::scope::{Scope, Shadow};
use crate::ExprError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Constant {
    Pi,
    E,
}

impl Constant {
    pub fn lookup(name: &str) -> Option<Self> {
        match name {
            "pi" => Some(Constant::Pi),
            "E" => Some(Constant::E),
            _ => None,
        }
    }

    pub fn value(self) -> f64 {
        match self {
            Constant::Pi => PI,
            Constant::E => E,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinaryOp {
    pub(crate) fn apply(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            BinaryOp::Add => lhs + rhs,
            BinaryOp::Sub => lhs - rhs,
            BinaryOp::Mul => lhs * rhs,
            BinaryOp::Div => lhs / rhs,
            BinaryOp::Pow => lhs.powf(rhs),
        }
    }
}

/// Expression tree.
///
/// Nodes are normally built through the folding constructors ([`Expr::add`],
/// [`Expr::mul`], ...) which collapse numeric sub-trees and drop neutral
/// elements, so trees produced by the parser and by calculus stay small.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Number(f64),
    Const(Constant),
    Symbol(String),
    Neg(Box<Expr>),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Call(Function, Vec<Expr>),
    /// `order`-fold repeated integral of `body` from 0 to `var`, evaluated by
    /// a single quadrature of `(var - s)^(order - 1) / (order - 1)! · body(s)`.
    Integral {
        var: String,
        body: Box<Expr>,
        order: u32,
    },
}

/// Simpson panels used for every quadrature node. A fixed count keeps the
/// integral a smooth function of its upper limit.
const QUADRATURE_PANELS: usize = 256;

impl Expr {
    pub fn number(n: f64) -> Self {
        Expr::Number(n)
    }

    pub fn symbol(name: impl Into<String>) -> Self {
        Expr::Symbol(name.into())
    }

    pub fn neg(expr: Expr) -> Self {
        match expr {
            Expr::Number(n) => Expr::Number(-n),
            Expr::Neg(inner) => *inner,
            other => Expr::Neg(Box::new(other)),
        }
    }

    pub fn add(lhs: Expr, rhs: Expr) -> Self {
        if let Expr::Neg(inner) = rhs {
            return Expr::sub(lhs, *inner);
        }
        match (&lhs, &rhs) {
            (Expr::Number(a), Expr::Number(b)) => Expr::Number(a + b),
            (Expr::Number(a), _) if *a == 0.0 => rhs,
            (_, Expr::Number(b)) if *b == 0.0 => lhs,
            _ => Expr::binary(BinaryOp::Add, lhs, rhs),
        }
    }

    pub fn sub(lhs: Expr, rhs: Expr) -> Self {
        if let Expr::Neg(inner) = rhs {
            return Expr::add(lhs, *inner);
        }
        match (&lhs, &rhs) {
            (Expr::Number(a), Expr::Number(b)) => Expr::Number(a - b),
            (_, Expr::Number(b)) if *b == 0.0 => lhs,
            (Expr::Number(a), _) if *a == 0.0 => Expr::neg(rhs),
            _ => Expr::binary(BinaryOp::Sub, lhs, rhs),
        }
    }

    pub fn mul(lhs: Expr, rhs: Expr) -> Self {
        // Signs are pulled out of products: `a*(-b)` is `-(a*b)`.
        let (lhs, rhs) = match (lhs, rhs) {
            (Expr::Neg(a), b) => return Expr::neg(Expr::mul(*a, b)),
            (a, Expr::Neg(b)) => return Expr::neg(Expr::mul(a, *b)),
            pair => pair,
        };
        match (&lhs, &rhs) {
            (Expr::Number(a), Expr::Number(b)) => Expr::Number(a * b),
            (Expr::Number(a), _) if *a == 0.0 => Expr::Number(0.0),
            (_, Expr::Number(b)) if *b == 0.0 => Expr::Number(0.0),
            (Expr::Number(a), _) if *a == 1.0 => rhs,
            (_, Expr::Number(b)) if *b == 1.0 => lhs,
            (Expr::Number(a), _) if *a == -1.0 => Expr::neg(rhs),
            (_, Expr::Number(b)) if *b == -1.0 => Expr::neg(lhs),
            // Keep numeric coefficients in front: `t*2` reads as `2*t`.
            (_, Expr::Number(_)) => Expr::binary(BinaryOp::Mul, rhs, lhs),
            _ => Expr::binary(BinaryOp::Mul, lhs, rhs),
        }
    }

    pub fn div(lhs: Expr, rhs: Expr) -> Self {
        let (lhs, rhs) = match (lhs, rhs) {
            (Expr::Neg(a), b) => return Expr::neg(Expr::div(*a, b)),
            (a, Expr::Neg(b)) => return Expr::neg(Expr::div(a, *b)),
            pair => pair,
        };
        match (&lhs, &rhs) {
            (Expr::Number(a), Expr::Number(b)) if *b != 0.0 => Expr::Number(a / b),
            (Expr::Number(a), _) if *a == 0.0 => Expr::Number(0.0),
            (_, Expr::Number(b)) if *b == 1.0 => lhs,
            (_, Expr::Number(b)) if *b == -1.0 => Expr::neg(lhs),
            _ => Expr::binary(BinaryOp::Div, lhs, rhs),
        }
    }

    pub fn pow(base: Expr, exponent: Expr) -> Self {
        match (&base, &exponent) {
            (Expr::Number(a), Expr::Number(b)) => Expr::Number(a.powf(*b)),
            (_, Expr::Number(b)) if *b == 0.0 => Expr::Number(1.0),
            (_, Expr::Number(b)) if *b == 1.0 => base,
            _ => Expr::binary(BinaryOp::Pow, base, exponent),
        }
    }

    pub fn call(function: Function, args: Vec<Expr>) -> Self {
        if function.is_pure() {
            if let Some(values) = args.iter().map(Expr::as_number).collect::<Option<Vec<_>>>() {
                let folded = function.eval(&values, &mut StepRng::new(0, 0));
                if folded.is_finite() {
                    return Expr::Number(folded);
                }
            }
        }
        Expr::Call(function, args)
    }

    pub fn integral(var: impl Into<String>, body: Expr) -> Self {
        Expr::Integral {
            var: var.into(),
            body: Box::new(body),
            order: 1,
        }
    }

    pub(crate) fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// Rebuilds a binary node through the folding constructor for `op`.
    pub(crate) fn combine(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        match op {
            BinaryOp::Add => Expr::add(lhs, rhs),
            BinaryOp::Sub => Expr::sub(lhs, rhs),
            BinaryOp::Mul => Expr::mul(lhs, rhs),
            BinaryOp::Div => Expr::div(lhs, rhs),
            BinaryOp::Pow => Expr::pow(lhs, rhs),
        }
    }

    /// Direct children, in source order.
    pub fn children(&self) -> Vec<&Expr> {
        match self {
            Expr::Number(_) | Expr::Const(_) | Expr::Symbol(_) => Vec::new(),
            Expr::Neg(inner) => vec![inner.as_ref()],
            Expr::Binary { lhs, rhs, .. } => vec![lhs.as_ref(), rhs.as_ref()],
            Expr::Call(_, args) => args.iter().collect(),
            Expr::Integral { body, .. } => vec![body.as_ref()],
        }
    }

    pub fn contains_symbol(&self, name: &str) -> bool {
        match self {
            Expr::Symbol(symbol) => symbol == name,
            Expr::Integral { var, body, .. } => var == name || body.contains_symbol(name),
            _ => self.children().iter().any(|child| child.contains_symbol(name)),
        }
    }

    /// Every symbol the expression depends on, sorted.
    pub fn free_symbols(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_symbols(&mut out);
        out
    }

    fn collect_symbols(&self, out: &mut BTreeSet<String>) {
        match self {
            Expr::Symbol(name) => {
                out.insert(name.clone());
            }
            Expr::Integral { var, body, .. } => {
                out.insert(var.clone());
                body.collect_symbols(out);
            }
            _ => {
                for child in self.children() {
                    child.collect_symbols(out);
                }
            }
        }
    }

    /// Number of nodes in the tree.
    pub fn node_count(&self) -> usize {
        1 + self
            .children()
            .iter()
            .map(|child| child.node_count())
            .sum::<usize>()
    }

    /// Deepest nesting of quadrature nodes, 0 for closed-form trees.
    pub fn quadrature_depth(&self) -> usize {
        let below = self
            .children()
            .iter()
            .map(|child| child.quadrature_depth())
            .max()
            .unwrap_or(0);
        match self {
            Expr::Integral { .. } => below + 1,
            _ => below,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Expr::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn eval(&self, scope: &dyn Scope, rng: &mut dyn RngCore) -> Result<f64, ExprError> {
        match self {
            Expr::Number(n) => Ok(*n),
            Expr::Const(c) => Ok(c.value()),
            Expr::Symbol(name) => scope
                .value_of(name)
                .ok_or_else(|| ExprError::Unbound(name.clone())),
            Expr::Neg(inner) => Ok(-inner.eval(scope, rng)?),
            Expr::Binary { op, lhs, rhs } => {
                let l = lhs.eval(scope, rng)?;
                let r = rhs.eval(scope, rng)?;
                Ok(op.apply(l, r))
            }
            Expr::Call(function, args) => {
                let mut values = [0.0f64; 2];
                for (slot, arg) in values.iter_mut().zip(args) {
                    *slot = arg.eval(scope, rng)?;
                }
                Ok(function.eval(&values[..args.len()], rng))
            }
            Expr::Integral { var, body, order } => {
                let upper = scope
                    .value_of(var)
                    .ok_or_else(|| ExprError::Unbound(var.clone()))?;
                simpson(body, var, upper, *order, scope, rng)
            }
        }
    }
}

/// Composite Simpson rule for the `order`-fold integral of `body` over
/// `[0, upper]`, folded into one pass by Cauchy's repeated-integral formula.
fn simpson(
    body: &Expr,
    var: &str,
    upper: f64,
    order: u32,
    scope: &dyn Scope,
    rng: &mut dyn RngCore,
) -> Result<f64, ExprError> {
    if upper == 0.0 {
        return Ok(0.0);
    }
    let panels = QUADRATURE_PANELS;
    let h = upper / panels as f64;
    let power = order.saturating_sub(1) as i32;
    let factorial: f64 = (1..=power).map(f64::from).product();

    let mut sample = |k: usize| -> Result<f64, ExprError> {
        let s = k as f64 * h;
        let shadow = Shadow {
            inner: scope,
            name: var,
            value: s,
        };
        let kernel = (upper - s).powi(power) / factorial;
        Ok(kernel * body.eval(&shadow, rng)?)
    };

    let mut acc = sample(0)? + sample(panels)?;
    for k in 1..panels {
        let weight = if k % 2 == 1 { 4.0 } else { 2.0 };
        acc += weight * sample(k)?;
    }
    Ok(acc * h / 3.0)
}
