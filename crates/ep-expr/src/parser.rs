// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

use crate::expr::{Constant, Expr};
use crate::function::Function;
use crate::lex::{Operator, Spanned, Token};
use crate::{ExprError, MAX_DEPTH};

/// Recursive-descent parser over the token stream.
///
/// ```text
/// expr   := term (('+' | '-') term)*
/// term   := unary (('*' | '/') unary)*
/// unary  := ('-' | '+') unary | power
/// power  := atom (('**' | '^') unary)?
/// atom   := number | constant | symbol | name '(' args ')' | '(' expr ')'
/// ```
///
/// Power is right-associative and binds tighter than a leading minus, so
/// `-t**2` is `-(t**2)` and `2**-t` is accepted. Every nested construct
/// passes through `unary`, which bounds the recursion at [`MAX_DEPTH`].
pub(crate) struct Parser {
    tokens: Vec<Spanned>,
    index: usize,
    end: usize,
    depth: usize,
}

impl Parser {
    pub(crate) fn new(tokens: Vec<Spanned>, end: usize) -> Self {
        Self {
            tokens,
            index: 0,
            end,
            depth: 0,
        }
    }

    pub(crate) fn parse(mut self) -> Result<Expr, ExprError> {
        if self.tokens.is_empty() {
            return Err(ExprError::UnexpectedEnd);
        }
        let expr = self.parse_expr()?;
        if self.index < self.tokens.len() {
            return Err(ExprError::Syntax { pos: self.pos() });
        }
        Ok(expr)
    }

    fn parse_expr(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.parse_term()?;
        loop {
            match self.peek() {
                Some(Token::Op(Operator::Add)) => {
                    self.next();
                    let rhs = self.parse_term()?;
                    lhs = Expr::add(lhs, rhs);
                }
                Some(Token::Op(Operator::Sub)) => {
                    self.next();
                    let rhs = self.parse_term()?;
                    lhs = Expr::sub(lhs, rhs);
                }
                _ => break,
            }
        }
        Ok(lhs)
    }

    fn parse_term(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.parse_unary()?;
        loop {
            match self.peek() {
                Some(Token::Op(Operator::Mul)) => {
                    self.next();
                    let rhs = self.parse_unary()?;
                    lhs = Expr::mul(lhs, rhs);
                }
                Some(Token::Op(Operator::Div)) => {
                    self.next();
                    let rhs = self.parse_unary()?;
                    lhs = Expr::div(lhs, rhs);
                }
                _ => break,
            }
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr, ExprError> {
        if self.depth >= MAX_DEPTH {
            return Err(ExprError::TooDeep { pos: self.pos() });
        }
        self.depth += 1;
        let expr = match self.peek() {
            Some(Token::Op(Operator::Sub)) => {
                self.next();
                self.parse_unary().map(Expr::neg)
            }
            Some(Token::Op(Operator::Add)) => {
                self.next();
                self.parse_unary()
            }
            _ => self.parse_power(),
        };
        self.depth -= 1;
        expr
    }

    fn parse_power(&mut self) -> Result<Expr, ExprError> {
        let base = self.parse_atom()?;
        if matches!(self.peek(), Some(Token::Op(Operator::Pow))) {
            self.next();
            let exponent = self.parse_unary()?;
            return Ok(Expr::pow(base, exponent));
        }
        Ok(base)
    }

    fn parse_atom(&mut self) -> Result<Expr, ExprError> {
        let pos = self.pos();
        let token = self.next().ok_or(ExprError::UnexpectedEnd)?;
        match token {
            Token::Num(n) => Ok(Expr::number(n)),
            Token::Id(id) => {
                if matches!(self.peek(), Some(Token::Lp)) {
                    let function =
                        Function::lookup(&id).ok_or_else(|| ExprError::UnknownFunction(id))?;
                    return self.parse_call(function);
                }
                if let Some(constant) = Constant::lookup(&id) {
                    return Ok(Expr::Const(constant));
                }
                if Function::lookup(&id).is_some() {
                    // A bare function name cannot stand in for a value.
                    return Err(ExprError::Syntax { pos });
                }
                Ok(Expr::Symbol(id))
            }
            Token::Lp => {
                let expr = self.parse_expr()?;
                self.expect(Token::Rp)?;
                Ok(expr)
            }
            _ => Err(ExprError::Syntax { pos }),
        }
    }

    fn parse_call(&mut self, function: Function) -> Result<Expr, ExprError> {
        self.expect(Token::Lp)?;
        let mut args = Vec::new();
        if !matches!(self.peek(), Some(Token::Rp)) {
            loop {
                args.push(self.parse_expr()?);
                if matches!(self.peek(), Some(Token::Comma)) {
                    self.next();
                    continue;
                }
                break;
            }
        }
        self.expect(Token::Rp)?;
        if args.len() != function.arity() {
            return Err(ExprError::Arity {
                function: function.name(),
                expected: function.arity(),
                found: args.len(),
            });
        }
        Ok(Expr::call(function, args))
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.index).map(|(token, _)| token)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.index).map(|(token, _)| token.clone());
        if token.is_some() {
            self.index += 1;
        }
        token
    }

    fn pos(&self) -> usize {
        self.tokens
            .get(self.index)
            .map(|(_, pos)| *pos)
            .unwrap_or(self.end)
    }

    fn expect(&mut self, want: Token) -> Result<(), ExprError> {
        let pos = self.pos();
        let token = self.next().ok_or(ExprError::UnexpectedEnd)?;
        if token == want {
            Ok(())
        } else {
            Err(ExprError::Syntax { pos })
        }
    }
}
