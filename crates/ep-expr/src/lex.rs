// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

use crate::ExprError;

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Token {
    Num(f64),
    Id(String),
    Op(Operator),
    Lp,
    Rp,
    Comma,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Operator {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

/// A token and the byte offset it starts at.
pub(crate) type Spanned = (Token, usize);

pub(crate) fn lex(src: &str) -> Result<Vec<Spanned>, ExprError> {
    let bytes = src.as_bytes();
    let mut tokens = Vec::new();
    let mut index = 0usize;

    while index < bytes.len() {
        let b = bytes[index];
        if (b as char).is_whitespace() {
            index += 1;
            continue;
        }

        let start = index;
        match b {
            b'(' => {
                tokens.push((Token::Lp, start));
                index += 1;
            }
            b')' => {
                tokens.push((Token::Rp, start));
                index += 1;
            }
            b',' => {
                tokens.push((Token::Comma, start));
                index += 1;
            }
            b'+' => {
                tokens.push((Token::Op(Operator::Add), start));
                index += 1;
            }
            b'-' => {
                tokens.push((Token::Op(Operator::Sub), start));
                index += 1;
            }
            b'/' => {
                tokens.push((Token::Op(Operator::Div), start));
                index += 1;
            }
            b'^' => {
                tokens.push((Token::Op(Operator::Pow), start));
                index += 1;
            }
            b'*' => {
                if bytes.get(index + 1) == Some(&b'*') {
                    tokens.push((Token::Op(Operator::Pow), start));
                    index += 2;
                } else {
                    tokens.push((Token::Op(Operator::Mul), start));
                    index += 1;
                }
            }
            b'0'..=b'9' | b'.' => {
                index = scan_number(bytes, index);
                let value = std::str::from_utf8(&bytes[start..index])
                    .map_err(|_| ExprError::Number { pos: start })?
                    .parse::<f64>()
                    .map_err(|_| ExprError::Number { pos: start })?;
                tokens.push((Token::Num(value), start));
            }
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => {
                index += 1;
                while index < bytes.len()
                    && (bytes[index].is_ascii_alphanumeric() || bytes[index] == b'_')
                {
                    index += 1;
                }
                let ident = std::str::from_utf8(&bytes[start..index])
                    .map_err(|_| ExprError::Lex { pos: start })?
                    .to_string();
                tokens.push((Token::Id(ident), start));
            }
            _ => return Err(ExprError::Lex { pos: start }),
        }
    }

    Ok(tokens)
}

/// Returns the end of the numeric literal starting at `index`. An exponent is
/// only consumed when digits follow it, so `2e` still lexes as `2` and `e`.
fn scan_number(bytes: &[u8], mut index: usize) -> usize {
    while index < bytes.len() && (bytes[index].is_ascii_digit() || bytes[index] == b'.') {
        index += 1;
    }
    if index < bytes.len() && matches!(bytes[index], b'e' | b'E') {
        let mut cursor = index + 1;
        if cursor < bytes.len() && matches!(bytes[cursor], b'+' | b'-') {
            cursor += 1;
        }
        if cursor < bytes.len() && bytes[cursor].is_ascii_digit() {
            index = cursor;
            while index < bytes.len() && bytes[index].is_ascii_digit() {
                index += 1;
            }
        }
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<Token> {
        lex(src).unwrap().into_iter().map(|(tok, _)| tok).collect()
    }

    #[test]
    fn double_star_is_power() {
        assert_eq!(
            kinds("t**2"),
            vec![
                Token::Id("t".into()),
                Token::Op(Operator::Pow),
                Token::Num(2.0)
            ]
        );
    }

    #[test]
    fn exponent_requires_digits() {
        assert_eq!(kinds("1.5e-3"), vec![Token::Num(1.5e-3)]);
        assert_eq!(kinds("2e"), vec![Token::Num(2.0), Token::Id("e".into())]);
    }

    #[test]
    fn reports_offending_byte() {
        assert_eq!(lex("t $ 2"), Err(ExprError::Lex { pos: 2 }));
        assert_eq!(lex("1..2"), Err(ExprError::Number { pos: 0 }));
    }
}
