// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

//! A small expression language for real functions of one variable.
//!
//! Source text is lexed and parsed into an [`Expr`] tree with constant
//! folding applied while building. Trees can be evaluated against a
//! [`Scope`], differentiated, integrated (symbolically where a rule applies,
//! by quadrature otherwise) and rendered back as plain text or LaTeX.

mod calculus;
mod display;
mod expr;
mod function;
mod heuristics;
mod lex;
mod parser;
mod scope;

pub use expr::{BinaryOp, Constant, Expr};
pub use function::{noise, rect, Function, RECT_TERMS};
pub use scope::{Bindings, Scope};

use thiserror::Error;

/// Errors raised while parsing, evaluating or transforming expressions.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ExprError {
    #[error("unexpected character at byte {pos}")]
    Lex { pos: usize },
    #[error("malformed number at byte {pos}")]
    Number { pos: usize },
    #[error("syntax error at byte {pos}")]
    Syntax { pos: usize },
    #[error("unexpected end of input")]
    UnexpectedEnd,
    #[error("unknown function '{0}'")]
    UnknownFunction(String),
    #[error("'{function}' expects {expected} argument(s), found {found}")]
    Arity {
        function: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("symbol '{0}' has no value")]
    Unbound(String),
    #[error("'{0}' cannot be differentiated")]
    NotDifferentiable(&'static str),
    #[error("nesting too deep at byte {pos}")]
    TooDeep { pos: usize },
    #[error("expression has {tokens} tokens, more than the {MAX_TOKENS} allowed")]
    TooLong { tokens: usize },
}

/// Longest accepted input, in tokens. Bounds the depth of every tree the
/// parser can build.
pub const MAX_TOKENS: usize = 2048;

/// Deepest accepted nesting of parentheses, calls, signs and exponents.
pub const MAX_DEPTH: usize = 256;

/// Parses `src` into an expression tree.
pub fn parse(src: &str) -> Result<Expr, ExprError> {
    let tokens = lex::lex(src)?;
    if tokens.len() > MAX_TOKENS {
        return Err(ExprError::TooLong {
            tokens: tokens.len(),
        });
    }
    parser::Parser::new(tokens, src.len()).parse()
}
