//! Tokenizer for column expressions

use crate::errors::{TableError, TableResult};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    Num(f64),
    Str(String),
    Ident(String),
    Plus,
    Minus,
    Star,
    StarStar,
    Slash,
    Percent,
    LParen,
    RParen,
    Comma,
    Lt,
    Le,
    Gt,
    Ge,
    EqEq,
    Ne,
    Amp,
    Pipe,
    Tilde,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

/// Splits `input` into tokens.
///
/// Identifiers may contain ASCII letters, digits, `_` and `.`; strings are
/// single- or double-quoted without escapes.
pub(crate) fn tokenize(input: &str) -> TableResult<Vec<Token>> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        if b.is_ascii_whitespace() {
            i += 1;
            continue;
        }

        let start = i;
        let next = bytes.get(i + 1).copied();
        let kind = match b {
            b'+' => {
                i += 1;
                TokenKind::Plus
            }
            b'-' => {
                i += 1;
                TokenKind::Minus
            }
            b'*' if next == Some(b'*') => {
                i += 2;
                TokenKind::StarStar
            }
            b'*' => {
                i += 1;
                TokenKind::Star
            }
            b'/' => {
                i += 1;
                TokenKind::Slash
            }
            b'%' => {
                i += 1;
                TokenKind::Percent
            }
            b'(' => {
                i += 1;
                TokenKind::LParen
            }
            b')' => {
                i += 1;
                TokenKind::RParen
            }
            b',' => {
                i += 1;
                TokenKind::Comma
            }
            b'<' if next == Some(b'=') => {
                i += 2;
                TokenKind::Le
            }
            b'<' => {
                i += 1;
                TokenKind::Lt
            }
            b'>' if next == Some(b'=') => {
                i += 2;
                TokenKind::Ge
            }
            b'>' => {
                i += 1;
                TokenKind::Gt
            }
            b'=' if next == Some(b'=') => {
                i += 2;
                TokenKind::EqEq
            }
            b'!' if next == Some(b'=') => {
                i += 2;
                TokenKind::Ne
            }
            b'&' => {
                i += 1;
                TokenKind::Amp
            }
            b'|' => {
                i += 1;
                TokenKind::Pipe
            }
            b'~' => {
                i += 1;
                TokenKind::Tilde
            }
            b'\'' | b'"' => {
                let quote = b;
                i += 1;
                while i < bytes.len() && bytes[i] != quote {
                    i += 1;
                }
                if i >= bytes.len() {
                    return Err(TableError::parse(
                        &input[start..],
                        "unterminated string literal",
                    ));
                }
                i += 1;
                TokenKind::Str(input[start + 1..i - 1].to_string())
            }
            _ if b.is_ascii_digit() || b == b'.' => {
                i += 1;
                while i < bytes.len() {
                    let c = bytes[i];
                    if c.is_ascii_digit() || c == b'.' || c == b'e' || c == b'E' {
                        i += 1;
                        continue;
                    }
                    if (c == b'+' || c == b'-') && (bytes[i - 1] == b'e' || bytes[i - 1] == b'E') {
                        i += 1;
                        continue;
                    }
                    break;
                }
                let literal = &input[start..i];
                let n: f64 = literal
                    .parse()
                    .map_err(|_| TableError::parse(literal, "invalid number"))?;
                TokenKind::Num(n)
            }
            _ if b.is_ascii_alphabetic() || b == b'_' => {
                i += 1;
                while i < bytes.len()
                    && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_' || bytes[i] == b'.')
                {
                    i += 1;
                }
                TokenKind::Ident(input[start..i].to_string())
            }
            _ => {
                let ch = input[i..].chars().next().unwrap_or('?');
                return Err(TableError::parse(
                    ch.to_string(),
                    format!("unexpected character in expression '{}'", input),
                ));
            }
        };

        tokens.push(Token {
            kind,
            start,
            end: i,
        });
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_arithmetic_tokens() {
        assert_eq!(
            kinds("betx+sqrt(bety)"),
            vec![
                TokenKind::Ident("betx".into()),
                TokenKind::Plus,
                TokenKind::Ident("sqrt".into()),
                TokenKind::LParen,
                TokenKind::Ident("bety".into()),
                TokenKind::RParen,
            ]
        );
    }

    #[test]
    fn test_two_char_operators() {
        assert_eq!(
            kinds("a ** 2 <= b != c"),
            vec![
                TokenKind::Ident("a".into()),
                TokenKind::StarStar,
                TokenKind::Num(2.0),
                TokenKind::Le,
                TokenKind::Ident("b".into()),
                TokenKind::Ne,
                TokenKind::Ident("c".into()),
            ]
        );
    }

    #[test]
    fn test_exponent_literal() {
        assert_eq!(kinds("1.5e-3"), vec![TokenKind::Num(1.5e-3)]);
    }

    #[test]
    fn test_string_literal() {
        assert_eq!(
            kinds("name == 'ip2'"),
            vec![
                TokenKind::Ident("name".into()),
                TokenKind::EqEq,
                TokenKind::Str("ip2".into()),
            ]
        );
    }

    #[test]
    fn test_rejects_unknown_character() {
        let err = tokenize("a ; b").unwrap_err();
        assert_eq!(err.code(), "TABLE_PARSE");
        assert!(tokenize("'open").is_err());
        assert!(tokenize("a = b").is_err());
    }
}
