// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

//! Symbolic differentiation and integration.

use crate::expr::{BinaryOp, Constant, Expr};
use crate::function::Function;
use crate::ExprError;

fn num(n: f64) -> Expr {
    Expr::number(n)
}

fn call1(function: Function, arg: Expr) -> Expr {
    Expr::call(function, vec![arg])
}

impl Expr {
    /// Derivative with respect to `var`.
    ///
    /// Fails only for expressions that have no derivative in closed form,
    /// such as `noise`.
    pub fn derivative(&self, var: &str) -> Result<Expr, ExprError> {
        if !self.contains_symbol(var) {
            return Ok(num(0.0));
        }
        let d = match self {
            Expr::Number(_) | Expr::Const(_) => num(0.0),
            Expr::Symbol(_) => num(1.0),
            Expr::Neg(inner) => Expr::neg(inner.derivative(var)?),
            Expr::Binary { op, lhs, rhs } => binary_derivative(*op, lhs, rhs, var)?,
            Expr::Call(function, args) => call_derivative(*function, args, var)?,
            Expr::Integral {
                var: bound,
                body,
                order,
            } => {
                if bound != var {
                    Expr::Integral {
                        var: bound.clone(),
                        body: Box::new(body.derivative(var)?),
                        order: *order,
                    }
                } else if *order > 1 {
                    Expr::Integral {
                        var: bound.clone(),
                        body: body.clone(),
                        order: order - 1,
                    }
                } else {
                    (**body).clone()
                }
            }
        };
        Ok(d)
    }

    /// Antiderivative with respect to `var`, without a constant of
    /// integration.
    ///
    /// Linear combinations, powers of `var` and elementary functions of a
    /// linear argument integrate in closed form. Any other term is kept as a
    /// definite integral from zero which evaluates by quadrature. Integrating
    /// such a node again raises its order instead of nesting quadratures.
    pub fn antiderivative(&self, var: &str) -> Expr {
        if !self.contains_symbol(var) {
            return Expr::mul(self.clone(), Expr::symbol(var));
        }
        match self {
            Expr::Neg(inner) => Expr::neg(inner.antiderivative(var)),
            Expr::Binary {
                op: op @ (BinaryOp::Add | BinaryOp::Sub),
                lhs,
                rhs,
            } => Expr::combine(*op, lhs.antiderivative(var), rhs.antiderivative(var)),
            Expr::Binary {
                op: BinaryOp::Mul,
                lhs,
                rhs,
            } if !lhs.contains_symbol(var) => Expr::mul((**lhs).clone(), rhs.antiderivative(var)),
            Expr::Binary {
                op: BinaryOp::Mul,
                lhs,
                rhs,
            } if !rhs.contains_symbol(var) => Expr::mul((**rhs).clone(), lhs.antiderivative(var)),
            Expr::Binary {
                op: BinaryOp::Div,
                lhs,
                rhs,
            } if !rhs.contains_symbol(var) => Expr::div(lhs.antiderivative(var), (**rhs).clone()),
            Expr::Integral {
                var: bound,
                body,
                order,
            } if bound == var => Expr::Integral {
                var: bound.clone(),
                body: body.clone(),
                order: order.saturating_add(1),
            },
            _ => primitive(self, var).unwrap_or_else(|| Expr::integral(var, self.clone())),
        }
    }
}

fn binary_derivative(op: BinaryOp, lhs: &Expr, rhs: &Expr, var: &str) -> Result<Expr, ExprError> {
    let d = match op {
        BinaryOp::Add => Expr::add(lhs.derivative(var)?, rhs.derivative(var)?),
        BinaryOp::Sub => Expr::sub(lhs.derivative(var)?, rhs.derivative(var)?),
        BinaryOp::Mul => Expr::add(
            Expr::mul(lhs.derivative(var)?, rhs.clone()),
            Expr::mul(lhs.clone(), rhs.derivative(var)?),
        ),
        BinaryOp::Div if !rhs.contains_symbol(var) => Expr::div(lhs.derivative(var)?, rhs.clone()),
        BinaryOp::Div => Expr::div(
            Expr::sub(
                Expr::mul(lhs.derivative(var)?, rhs.clone()),
                Expr::mul(lhs.clone(), rhs.derivative(var)?),
            ),
            Expr::pow(rhs.clone(), num(2.0)),
        ),
        BinaryOp::Pow => power_derivative(lhs, rhs, var)?,
    };
    Ok(d)
}

fn power_derivative(base: &Expr, exponent: &Expr, var: &str) -> Result<Expr, ExprError> {
    if !exponent.contains_symbol(var) {
        // n * u**(n - 1) * u'
        let lowered = Expr::pow(base.clone(), Expr::sub(exponent.clone(), num(1.0)));
        return Ok(Expr::mul(
            Expr::mul(exponent.clone(), lowered),
            base.derivative(var)?,
        ));
    }
    let power = Expr::pow(base.clone(), exponent.clone());
    if !base.contains_symbol(var) {
        // a**v * ln(a) * v'
        let scaled = match base {
            Expr::Const(Constant::E) => power,
            _ => Expr::mul(power, call1(Function::Log, base.clone())),
        };
        return Ok(Expr::mul(scaled, exponent.derivative(var)?));
    }
    // u**v * (v' ln u + v u'/u)
    Ok(Expr::mul(
        power,
        Expr::add(
            Expr::mul(exponent.derivative(var)?, call1(Function::Log, base.clone())),
            Expr::div(
                Expr::mul(exponent.clone(), base.derivative(var)?),
                base.clone(),
            ),
        ),
    ))
}

fn call_derivative(function: Function, args: &[Expr], var: &str) -> Result<Expr, ExprError> {
    let u = &args[0];
    if function == Function::Atan2 {
        let (y, x) = (&args[0], &args[1]);
        return Ok(Expr::div(
            Expr::sub(
                Expr::mul(x.clone(), y.derivative(var)?),
                Expr::mul(y.clone(), x.derivative(var)?),
            ),
            Expr::add(
                Expr::pow(x.clone(), num(2.0)),
                Expr::pow(y.clone(), num(2.0)),
            ),
        ));
    }
    if function == Function::Pow {
        return power_derivative(&args[0], &args[1], var);
    }
    let outer = match function {
        Function::Sin => call1(Function::Cos, u.clone()),
        Function::Cos => Expr::neg(call1(Function::Sin, u.clone())),
        Function::Tan => Expr::div(num(1.0), Expr::pow(call1(Function::Cos, u.clone()), num(2.0))),
        Function::Asin => Expr::div(
            num(1.0),
            call1(
                Function::Sqrt,
                Expr::sub(num(1.0), Expr::pow(u.clone(), num(2.0))),
            ),
        ),
        Function::Acos => Expr::neg(Expr::div(
            num(1.0),
            call1(
                Function::Sqrt,
                Expr::sub(num(1.0), Expr::pow(u.clone(), num(2.0))),
            ),
        )),
        Function::Atan => Expr::div(num(1.0), Expr::add(num(1.0), Expr::pow(u.clone(), num(2.0)))),
        Function::Sinh => call1(Function::Cosh, u.clone()),
        Function::Cosh => call1(Function::Sinh, u.clone()),
        Function::Tanh => Expr::div(num(1.0), Expr::pow(call1(Function::Cosh, u.clone()), num(2.0))),
        Function::Exp => call1(Function::Exp, u.clone()),
        Function::Log => Expr::div(num(1.0), u.clone()),
        Function::Sqrt => Expr::div(num(1.0), Expr::mul(num(2.0), call1(Function::Sqrt, u.clone()))),
        Function::Abs => call1(Function::Sign, u.clone()),
        Function::Sinc => Expr::div(
            Expr::sub(call1(Function::Cos, u.clone()), call1(Function::Sinc, u.clone())),
            u.clone(),
        ),
        Function::Sign | Function::Floor | Function::Ceil => num(0.0),
        Function::Rect => call1(Function::DRect, u.clone()),
        Function::IRect => call1(Function::Rect, u.clone()),
        Function::DRect => return Err(ExprError::NotDifferentiable("drect")),
        Function::Noise => return Err(ExprError::NotDifferentiable("noise")),
        Function::Atan2 | Function::Pow => unreachable!("handled above"),
    };
    Ok(Expr::mul(outer, u.derivative(var)?))
}

/// Closed-form antiderivatives for single terms, `None` when no rule applies.
fn primitive(expr: &Expr, var: &str) -> Option<Expr> {
    match expr {
        Expr::Symbol(name) if name == var => Some(Expr::div(
            Expr::pow(Expr::symbol(var), num(2.0)),
            num(2.0),
        )),
        Expr::Binary {
            op: BinaryOp::Pow,
            lhs,
            rhs,
        } => power_primitive(lhs, rhs, var),
        Expr::Binary {
            op: BinaryOp::Div,
            lhs,
            rhs,
        } if !lhs.contains_symbol(var) && **rhs == Expr::symbol(var) => Some(Expr::mul(
            (**lhs).clone(),
            call1(Function::Log, call1(Function::Abs, Expr::symbol(var))),
        )),
        Expr::Call(function, args) if args.len() == 1 => {
            let u = &args[0];
            let slope = linear_slope(u, var)?;
            let outer = match function {
                Function::Sin => Expr::neg(call1(Function::Cos, u.clone())),
                Function::Cos => call1(Function::Sin, u.clone()),
                Function::Exp => call1(Function::Exp, u.clone()),
                Function::Sinh => call1(Function::Cosh, u.clone()),
                Function::Cosh => call1(Function::Sinh, u.clone()),
                Function::Rect => call1(Function::IRect, u.clone()),
                Function::DRect => call1(Function::Rect, u.clone()),
                _ => return None,
            };
            Some(Expr::div(outer, slope))
        }
        _ => None,
    }
}

fn power_primitive(base: &Expr, exponent: &Expr, var: &str) -> Option<Expr> {
    if *base == Expr::symbol(var) && !exponent.contains_symbol(var) {
        if exponent.as_number() == Some(-1.0) {
            return Some(call1(Function::Log, call1(Function::Abs, base.clone())));
        }
        let raised = Expr::add(exponent.clone(), num(1.0));
        return Some(Expr::div(Expr::pow(base.clone(), raised.clone()), raised));
    }
    if *base == Expr::Const(Constant::E) {
        let slope = linear_slope(exponent, var)?;
        return Some(Expr::div(Expr::pow(base.clone(), exponent.clone()), slope));
    }
    None
}

/// `Some(du/dvar)` when `u` is linear in `var`.
fn linear_slope(u: &Expr, var: &str) -> Option<Expr> {
    let slope = u.derivative(var).ok()?;
    if slope.contains_symbol(var) || slope.as_number() == Some(0.0) {
        None
    } else {
        Some(slope)
    }
}

#[cfg(test)]
mod tests {
    use crate::scope::Bindings;
    use crate::{parse, Expr};
    use rand::{rngs::StdRng, SeedableRng};

    fn eval_at(expr: &Expr, t: f64, params: &[(&str, f64)]) -> f64 {
        let mut names = vec!["t".to_string()];
        let mut values = vec![t];
        for (name, value) in params {
            names.push(name.to_string());
            values.push(*value);
        }
        let mut rng = StdRng::seed_from_u64(3);
        expr.eval(&Bindings::new(&names, &values), &mut rng).unwrap()
    }

    #[test]
    fn derivative_of_scaled_sine() {
        let d = parse("a*sin(k*t) + d").unwrap().derivative("t").unwrap();
        assert_eq!(d.to_string(), "a*cos(k*t)*k");
        let v = eval_at(&d, 0.4, &[("a", 2.0), ("k", 3.0), ("d", 5.0)]);
        assert!((v - 2.0 * 3.0 * (3.0f64 * 0.4).cos()).abs() < 1e-12);
    }

    #[test]
    fn derivative_matches_finite_differences() {
        let cases = [
            "exp(-t**2/0.25)",
            "t**t",
            "atan2(sin(t), 2 + cos(t))",
            "sqrt(1 + t**2)/(2 + sin(t))",
            "2**t*log(3 + t)",
            "tanh(t)*rect(t)",
            "sinc(3*t)",
        ];
        let h = 1e-6;
        for src in cases {
            let f = parse(src).unwrap();
            let d = f.derivative("t").unwrap();
            for &t in &[0.3, 0.9, 1.7] {
                let numeric = (eval_at(&f, t + h, &[]) - eval_at(&f, t - h, &[])) / (2.0 * h);
                let symbolic = eval_at(&d, t, &[]);
                assert!((numeric - symbolic).abs() < 1e-5, "{src} at {t}: {numeric} vs {symbolic}");
            }
        }
    }

    #[test]
    fn noise_has_no_derivative() {
        assert!(parse("t + noise(t)").unwrap().derivative("t").is_err());
    }

    #[test]
    fn antiderivative_of_scaled_sine_is_closed_form() {
        let f = parse("a*sin(k*t) + d").unwrap();
        let g = f.antiderivative("t");
        assert_eq!(g.to_string(), "-a*cos(k*t)/k + d*t");
    }

    #[test]
    fn antiderivative_differentiates_back() {
        let cases = [
            "t**3 - 2*t + 1",
            "cos(3*t - 1)",
            "E**(2*t)",
            "1/t",
            "rect(t)",
            "exp(-t**2)",
        ];
        let h = 1e-5;
        for src in cases {
            let f = parse(src).unwrap();
            let g = f.antiderivative("t");
            for &t in &[0.5, 1.3, 2.1] {
                let numeric = (eval_at(&g, t + h, &[]) - eval_at(&g, t - h, &[])) / (2.0 * h);
                let expected = eval_at(&f, t, &[]);
                assert!((numeric - expected).abs() < 1e-4, "{src} at {t}: {numeric} vs {expected}");
            }
        }
    }

    #[test]
    fn unsupported_terms_fall_back_to_quadrature() {
        let g = parse("exp(-t**2)").unwrap().antiderivative("t");
        assert!(matches!(g, Expr::Integral { .. }));
        assert_eq!(g.derivative("t").unwrap(), parse("exp(-t**2)").unwrap());
        // erf(1) * sqrt(pi) / 2
        assert!((eval_at(&g, 1.0, &[]) - 0.746_824_132_812_427).abs() < 1e-9);
    }

    #[test]
    fn repeated_integration_raises_the_order() {
        let f = parse("2*exp(-t**2) + t").unwrap();
        let g1 = f.antiderivative("t");
        let g2 = g1.antiderivative("t");
        let g3 = g2.antiderivative("t");
        assert_eq!(g3.quadrature_depth(), 1);
        assert!(g3.to_string().contains("(t, 0, t), (t, 0, t), (t, 0, t)"));

        let h = 1e-5;
        for (lower, upper) in [(&g1, &g2), (&g2, &g3)] {
            for &t in &[-0.8, 0.7, 1.9] {
                let numeric =
                    (eval_at(upper, t + h, &[]) - eval_at(upper, t - h, &[])) / (2.0 * h);
                let expected = eval_at(lower, t, &[]);
                assert!((numeric - expected).abs() < 1e-4, "at {t}: {numeric} vs {expected}");
            }
        }
        assert_eq!(g3.derivative("t").unwrap().quadrature_depth(), 1);
    }
}
