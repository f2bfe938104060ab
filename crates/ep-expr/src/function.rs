// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

use std::f64::consts::PI;

use rand::{Rng, RngCore};

/// Number of odd harmonics summed by [`rect`].
pub const RECT_TERMS: usize = 20;

/// Built-in functions callable from expression text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Function {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    Exp,
    Log,
    Sqrt,
    Abs,
    Sign,
    Floor,
    Ceil,
    Atan2,
    Pow,
    /// Unnormalised cardinal sine, `sin(x)/x` with `sinc(0) = 1`.
    Sinc,
    /// Odd-harmonic square-wave approximation.
    Rect,
    /// Derivative of [`Function::Rect`].
    DRect,
    /// Antiderivative of [`Function::Rect`].
    IRect,
    /// Uniform noise in `[-1, 1]`, one draw per evaluation.
    Noise,
}

impl Function {
    pub fn lookup(name: &str) -> Option<Self> {
        let function = match name {
            "sin" => Function::Sin,
            "cos" => Function::Cos,
            "tan" => Function::Tan,
            "asin" | "arcsin" => Function::Asin,
            "acos" | "arccos" => Function::Acos,
            "atan" | "arctan" => Function::Atan,
            "sinh" => Function::Sinh,
            "cosh" => Function::Cosh,
            "tanh" => Function::Tanh,
            "exp" => Function::Exp,
            "log" | "ln" => Function::Log,
            "sqrt" => Function::Sqrt,
            "abs" | "Abs" => Function::Abs,
            "sign" => Function::Sign,
            "floor" => Function::Floor,
            "ceil" | "ceiling" => Function::Ceil,
            "atan2" => Function::Atan2,
            "pow" => Function::Pow,
            "sinc" => Function::Sinc,
            "rect" => Function::Rect,
            "drect" => Function::DRect,
            "irect" => Function::IRect,
            "noise" => Function::Noise,
            _ => return None,
        };
        Some(function)
    }

    pub fn name(self) -> &'static str {
        match self {
            Function::Sin => "sin",
            Function::Cos => "cos",
            Function::Tan => "tan",
            Function::Asin => "asin",
            Function::Acos => "acos",
            Function::Atan => "atan",
            Function::Sinh => "sinh",
            Function::Cosh => "cosh",
            Function::Tanh => "tanh",
            Function::Exp => "exp",
            Function::Log => "log",
            Function::Sqrt => "sqrt",
            Function::Abs => "abs",
            Function::Sign => "sign",
            Function::Floor => "floor",
            Function::Ceil => "ceil",
            Function::Atan2 => "atan2",
            Function::Pow => "pow",
            Function::Sinc => "sinc",
            Function::Rect => "rect",
            Function::DRect => "drect",
            Function::IRect => "irect",
            Function::Noise => "noise",
        }
    }

    pub fn arity(self) -> usize {
        match self {
            Function::Atan2 | Function::Pow => 2,
            _ => 1,
        }
    }

    /// Whether repeated evaluation with the same arguments gives the same value.
    pub fn is_pure(self) -> bool {
        !matches!(self, Function::Noise)
    }

    pub fn eval(self, args: &[f64], rng: &mut dyn RngCore) -> f64 {
        let x = args[0];
        match self {
            Function::Sin => x.sin(),
            Function::Cos => x.cos(),
            Function::Tan => x.tan(),
            Function::Asin => x.asin(),
            Function::Acos => x.acos(),
            Function::Atan => x.atan(),
            Function::Sinh => x.sinh(),
            Function::Cosh => x.cosh(),
            Function::Tanh => x.tanh(),
            Function::Exp => x.exp(),
            Function::Log => x.ln(),
            Function::Sqrt => x.sqrt(),
            Function::Abs => x.abs(),
            Function::Sign => {
                if x == 0.0 {
                    0.0
                } else {
                    x.signum()
                }
            }
            Function::Floor => x.floor(),
            Function::Ceil => x.ceil(),
            Function::Atan2 => x.atan2(args[1]),
            Function::Pow => x.powf(args[1]),
            Function::Sinc => {
                if x == 0.0 {
                    1.0
                } else {
                    x.sin() / x
                }
            }
            Function::Rect => rect(x),
            Function::DRect => odd_harmonics(x, |i, x| (i * x).cos()) * 2.0 / PI,
            Function::IRect => odd_harmonics(x, |i, x| -(i * x).cos() / (i * i)) * 2.0 / PI,
            Function::Noise => noise(rng),
        }
    }
}

fn odd_harmonics(x: f64, term: impl Fn(f64, f64) -> f64) -> f64 {
    (0..RECT_TERMS).map(|k| term((2 * k + 1) as f64, x)).sum()
}

/// Rectangular wave built from the first odd harmonics:
/// `2/π · Σ sin(i·x)/i` for odd `i < 40`. Settles near `±0.5`.
pub fn rect(x: f64) -> f64 {
    odd_harmonics(x, |i, x| (i * x).sin() / i) * 2.0 / PI
}

/// A single uniform draw from `[-1, 1]`.
pub fn noise(rng: &mut dyn RngCore) -> f64 {
    2.0 * rng.gen::<f64>() - 1.0
}
