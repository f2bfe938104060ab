// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

use std::fmt::{self, Write};

use crate::expr::{BinaryOp, Constant, Expr};
use crate::function::Function;

const PREC_ADD: u8 = 1;
const PREC_MUL: u8 = 2;
const PREC_NEG: u8 = 3;
const PREC_POW: u8 = 4;
const PREC_ATOM: u8 = 5;

fn precedence(expr: &Expr) -> u8 {
    match expr {
        Expr::Number(n) if *n < 0.0 => PREC_NEG,
        Expr::Number(_) | Expr::Const(_) | Expr::Symbol(_) | Expr::Call(..) => PREC_ATOM,
        Expr::Integral { .. } => PREC_ATOM,
        Expr::Neg(_) => PREC_NEG,
        Expr::Binary { op, .. } => match op {
            BinaryOp::Add | BinaryOp::Sub => PREC_ADD,
            BinaryOp::Mul | BinaryOp::Div => PREC_MUL,
            BinaryOp::Pow => PREC_POW,
        },
    }
}

fn op_precedence(op: BinaryOp) -> u8 {
    match op {
        BinaryOp::Add | BinaryOp::Sub => PREC_ADD,
        BinaryOp::Mul | BinaryOp::Div => PREC_MUL,
        BinaryOp::Pow => PREC_POW,
    }
}

/// Whether `child` needs parentheses as the `left`/right operand of `op`.
fn needs_parens(op: BinaryOp, child: &Expr, left: bool) -> bool {
    let outer = op_precedence(op);
    let inner = precedence(child);
    if inner == PREC_NEG {
        // A leading minus may open a sum or product, never a power base or a
        // right operand.
        return !(left && outer != PREC_POW);
    }
    match op {
        BinaryOp::Pow if left => inner <= outer,
        BinaryOp::Pow => inner < outer,
        BinaryOp::Sub | BinaryOp::Div if !left => inner <= outer,
        _ => inner < outer,
    }
}

fn fmt_number(n: f64, f: &mut impl Write) -> fmt::Result {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        write!(f, "{}", n as i64)
    } else {
        write!(f, "{n}")
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(n) => fmt_number(*n, f),
            Expr::Const(Constant::Pi) => f.write_str("pi"),
            Expr::Const(Constant::E) => f.write_str("E"),
            Expr::Symbol(name) => f.write_str(name),
            Expr::Neg(inner) => {
                if precedence(inner) < PREC_MUL {
                    write!(f, "-({inner})")
                } else {
                    write!(f, "-{inner}")
                }
            }
            Expr::Binary { op, lhs, rhs } => {
                let symbol = match op {
                    BinaryOp::Add => " + ",
                    BinaryOp::Sub => " - ",
                    BinaryOp::Mul => "*",
                    BinaryOp::Div => "/",
                    BinaryOp::Pow => "**",
                };
                if needs_parens(*op, lhs, true) {
                    write!(f, "({lhs})")?;
                } else {
                    write!(f, "{lhs}")?;
                }
                f.write_str(symbol)?;
                if needs_parens(*op, rhs, false) {
                    write!(f, "({rhs})")
                } else {
                    write!(f, "{rhs}")
                }
            }
            Expr::Call(function, args) => {
                write!(f, "{}(", function.name())?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(")")
            }
            Expr::Integral { var, body, order } => {
                write!(f, "Integral({body}")?;
                for _ in 0..*order {
                    write!(f, ", ({var}, 0, {var})")?;
                }
                f.write_str(")")
            }
        }
    }
}

impl Expr {
    /// Renders the expression as a LaTeX math fragment.
    pub fn to_latex(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = latex(self, &mut out);
        out
    }
}

fn latex_group(expr: &Expr, parens: bool, out: &mut String) -> fmt::Result {
    if parens {
        out.push_str("\\left(");
        latex(expr, out)?;
        out.push_str("\\right)");
        Ok(())
    } else {
        latex(expr, out)
    }
}

fn latex(expr: &Expr, out: &mut String) -> fmt::Result {
    match expr {
        Expr::Number(n) => fmt_number(*n, out),
        Expr::Const(Constant::Pi) => {
            out.push_str("\\pi");
            Ok(())
        }
        Expr::Const(Constant::E) => {
            out.push('e');
            Ok(())
        }
        Expr::Symbol(name) => {
            latex_symbol(name, out);
            Ok(())
        }
        Expr::Neg(inner) => {
            out.push('-');
            latex_group(inner, precedence(inner) < PREC_MUL, out)
        }
        Expr::Binary { op, lhs, rhs } => match op {
            BinaryOp::Div => {
                out.push_str("\\frac{");
                latex(lhs, out)?;
                out.push_str("}{");
                latex(rhs, out)?;
                out.push('}');
                Ok(())
            }
            BinaryOp::Pow => {
                latex_group(lhs, needs_parens(*op, lhs, true), out)?;
                out.push_str("^{");
                latex(rhs, out)?;
                out.push('}');
                Ok(())
            }
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul => {
                latex_group(lhs, needs_parens(*op, lhs, true), out)?;
                match op {
                    BinaryOp::Add => out.push_str(" + "),
                    BinaryOp::Sub => out.push_str(" - "),
                    _ => {
                        if matches!(**rhs, Expr::Number(_)) {
                            out.push_str(" \\cdot ");
                        } else {
                            out.push(' ');
                        }
                    }
                }
                latex_group(rhs, needs_parens(*op, rhs, false), out)
            }
        },
        Expr::Call(Function::Abs, args) => {
            out.push_str("\\left|");
            latex(&args[0], out)?;
            out.push_str("\\right|");
            Ok(())
        }
        Expr::Call(Function::Sqrt, args) => {
            out.push_str("\\sqrt{");
            latex(&args[0], out)?;
            out.push('}');
            Ok(())
        }
        Expr::Call(Function::Exp, args) => {
            out.push_str("e^{");
            latex(&args[0], out)?;
            out.push('}');
            Ok(())
        }
        Expr::Call(function, args) => {
            match function {
                Function::Sin
                | Function::Cos
                | Function::Tan
                | Function::Sinh
                | Function::Cosh
                | Function::Tanh
                | Function::Log => {
                    out.push('\\');
                    out.push_str(function.name());
                }
                other => {
                    out.push_str("\\operatorname{");
                    out.push_str(other.name());
                    out.push('}');
                }
            }
            out.push_str("{\\left(");
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                latex(arg, out)?;
            }
            out.push_str("\\right)}");
            Ok(())
        }
        Expr::Integral { var, body, order } => {
            for _ in 0..*order {
                out.push_str("\\int_{0}^{");
                latex_symbol(var, out);
                out.push_str("} ");
            }
            latex(body, out)?;
            for _ in 0..*order {
                out.push_str("\\, d");
                latex_symbol(var, out);
            }
            Ok(())
        }
    }
}

const GREEK: &[&str] = &[
    "alpha", "beta", "gamma", "delta", "epsilon", "zeta", "eta", "theta", "iota", "kappa",
    "lambda", "mu", "nu", "xi", "rho", "sigma", "tau", "upsilon", "phi", "chi", "psi", "omega",
];

fn latex_symbol(name: &str, out: &mut String) {
    if GREEK.contains(&name) {
        out.push('\\');
    }
    out.push_str(name);
}
