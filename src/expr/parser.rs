//! Recursive-descent parser for column expressions
//!
//! Precedence, lowest first:
//!
//! ```text
//! |            boolean or
//! &            boolean and
//! < <= > >= == !=
//! + -
//! * / %
//! - + ~        unary
//! **           right-associative, binds tighter than a unary operator on its left
//! ```

use super::lexer::{tokenize, Token, TokenKind};
use crate::errors::{TableError, TableResult};

/// Deepest nesting accepted before parsing gives up
const MAX_NESTING: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UnaryOp {
    Neg,
    Pos,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    And,
    Or,
}

/// Whitelisted functions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Func {
    Sqrt,
    Abs,
    Exp,
    Log,
    Log10,
    Log2,
    Sin,
    Cos,
    Tan,
    Arcsin,
    Arccos,
    Arctan,
    Sinh,
    Cosh,
    Tanh,
    Floor,
    Ceil,
    Round,
    Sign,
    Arctan2,
    Hypot,
    Minimum,
    Maximum,
    Power,
}

impl Func {
    pub(crate) fn lookup(name: &str) -> Option<Func> {
        let func = match name {
            "sqrt" => Func::Sqrt,
            "abs" => Func::Abs,
            "exp" => Func::Exp,
            "log" => Func::Log,
            "log10" => Func::Log10,
            "log2" => Func::Log2,
            "sin" => Func::Sin,
            "cos" => Func::Cos,
            "tan" => Func::Tan,
            "arcsin" => Func::Arcsin,
            "arccos" => Func::Arccos,
            "arctan" => Func::Arctan,
            "sinh" => Func::Sinh,
            "cosh" => Func::Cosh,
            "tanh" => Func::Tanh,
            "floor" => Func::Floor,
            "ceil" => Func::Ceil,
            "round" => Func::Round,
            "sign" => Func::Sign,
            "arctan2" => Func::Arctan2,
            "hypot" => Func::Hypot,
            "minimum" => Func::Minimum,
            "maximum" => Func::Maximum,
            "power" => Func::Power,
            _ => return None,
        };
        Some(func)
    }

    pub(crate) fn arity(&self) -> usize {
        match self {
            Func::Arctan2 | Func::Hypot | Func::Minimum | Func::Maximum | Func::Power => 2,
            _ => 1,
        }
    }
}

/// Parsed expression tree
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expr {
    Number(f64),
    Text(String),
    Column(String),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Call(Func, Vec<Expr>),
}

impl Expr {
    /// Column names referenced by this expression, in first-use order
    pub(crate) fn columns(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_columns(&mut out);
        out
    }

    fn collect_columns<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Expr::Column(name) => {
                if !out.contains(&name.as_str()) {
                    out.push(name);
                }
            }
            Expr::Unary(_, e) => e.collect_columns(out),
            Expr::Binary(_, l, r) => {
                l.collect_columns(out);
                r.collect_columns(out);
            }
            Expr::Call(_, args) => args.iter().for_each(|a| a.collect_columns(out)),
            Expr::Number(_) | Expr::Text(_) => {}
        }
    }
}

/// Parses an expression string into a tree
pub(crate) fn parse_expression(input: &str) -> TableResult<Expr> {
    let tokens = tokenize(input)?;
    let mut parser = Parser {
        input,
        tokens: &tokens,
        pos: 0,
        depth: 0,
    };
    let expr = parser.parse_or()?;
    if let Some(t) = parser.peek() {
        return Err(parser.error_at(t, "unexpected token after expression"));
    }
    Ok(expr)
}

struct Parser<'a> {
    input: &'a str,
    tokens: &'a [Token],
    pos: usize,
    /// Live `parse_unary` frames
    depth: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<&'a TokenKind> {
        self.peek().map(|t| &t.kind)
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let t = self.tokens.get(self.pos);
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn error_at(&self, token: &Token, reason: &str) -> TableError {
        TableError::parse(
            &self.input[token.start..token.end],
            format!("{} in '{}'", reason, self.input),
        )
    }

    fn error_at_end(&self, reason: &str) -> TableError {
        TableError::parse(self.input, reason)
    }

    fn expect_rparen(&mut self) -> TableResult<()> {
        match self.advance() {
            Some(t) if t.kind == TokenKind::RParen => Ok(()),
            Some(t) => Err(self.error_at(t, "expected ')'")),
            None => Err(self.error_at_end("expected ')', got end of input")),
        }
    }

    fn parse_or(&mut self) -> TableResult<Expr> {
        let mut lhs = self.parse_and()?;
        while self.peek_kind() == Some(&TokenKind::Pipe) {
            self.advance();
            let rhs = self.parse_and()?;
            lhs = Expr::Binary(BinaryOp::Or, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> TableResult<Expr> {
        let mut lhs = self.parse_cmp()?;
        while self.peek_kind() == Some(&TokenKind::Amp) {
            self.advance();
            let rhs = self.parse_cmp()?;
            lhs = Expr::Binary(BinaryOp::And, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_cmp(&mut self) -> TableResult<Expr> {
        let lhs = self.parse_add()?;
        let op = match self.peek_kind() {
            Some(TokenKind::Lt) => BinaryOp::Lt,
            Some(TokenKind::Le) => BinaryOp::Le,
            Some(TokenKind::Gt) => BinaryOp::Gt,
            Some(TokenKind::Ge) => BinaryOp::Ge,
            Some(TokenKind::EqEq) => BinaryOp::Eq,
            Some(TokenKind::Ne) => BinaryOp::Ne,
            _ => return Ok(lhs),
        };
        self.advance();
        let rhs = self.parse_add()?;
        Ok(Expr::Binary(op, Box::new(lhs), Box::new(rhs)))
    }

    fn parse_add(&mut self) -> TableResult<Expr> {
        let mut lhs = self.parse_mul()?;
        loop {
            let op = match self.peek_kind() {
                Some(TokenKind::Plus) => BinaryOp::Add,
                Some(TokenKind::Minus) => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_mul()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_mul(&mut self) -> TableResult<Expr> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.peek_kind() {
                Some(TokenKind::Star) => BinaryOp::Mul,
                Some(TokenKind::Slash) => BinaryOp::Div,
                Some(TokenKind::Percent) => BinaryOp::Rem,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_unary()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    /// Every nesting path (groups, call arguments, prefix operators and
    /// exponents) re-enters here, so the depth check bounds recursion.
    fn parse_unary(&mut self) -> TableResult<Expr> {
        if self.depth >= MAX_NESTING {
            return Err(TableError::parse(self.input, "expression nested too deeply"));
        }
        self.depth += 1;
        let expr = self.parse_prefixed();
        self.depth -= 1;
        expr
    }

    fn parse_prefixed(&mut self) -> TableResult<Expr> {
        let op = match self.peek_kind() {
            Some(TokenKind::Minus) => UnaryOp::Neg,
            Some(TokenKind::Plus) => UnaryOp::Pos,
            Some(TokenKind::Tilde) => UnaryOp::Not,
            _ => return self.parse_power(),
        };
        self.advance();
        let e = self.parse_unary()?;
        Ok(Expr::Unary(op, Box::new(e)))
    }

    fn parse_power(&mut self) -> TableResult<Expr> {
        let base = self.parse_atom()?;
        if self.peek_kind() == Some(&TokenKind::StarStar) {
            self.advance();
            let exponent = self.parse_unary()?;
            return Ok(Expr::Binary(
                BinaryOp::Pow,
                Box::new(base),
                Box::new(exponent),
            ));
        }
        Ok(base)
    }

    fn parse_atom(&mut self) -> TableResult<Expr> {
        let Some(token) = self.advance() else {
            return Err(self.error_at_end("expected expression, got end of input"));
        };

        match &token.kind {
            TokenKind::Num(n) => Ok(Expr::Number(*n)),
            TokenKind::Str(s) => Ok(Expr::Text(s.clone())),
            TokenKind::LParen => {
                let e = self.parse_or()?;
                self.expect_rparen()?;
                Ok(e)
            }
            TokenKind::Ident(name) => {
                if self.peek_kind() != Some(&TokenKind::LParen) {
                    return Ok(Expr::Column(name.clone()));
                }
                self.advance();
                let func = Func::lookup(name).ok_or_else(|| TableError::name(name.as_str()))?;

                let mut args = Vec::new();
                if self.peek_kind() != Some(&TokenKind::RParen) {
                    args.push(self.parse_or()?);
                    while self.peek_kind() == Some(&TokenKind::Comma) {
                        self.advance();
                        args.push(self.parse_or()?);
                    }
                }
                self.expect_rparen()?;

                if args.len() != func.arity() {
                    return Err(self.error_at(
                        token,
                        &format!(
                            "'{}' takes {} argument(s), got {}",
                            name,
                            func.arity(),
                            args.len()
                        ),
                    ));
                }
                Ok(Expr::Call(func, args))
            }
            _ => Err(self.error_at(token, "expected number, identifier or '('")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(name: &str) -> Box<Expr> {
        Box::new(Expr::Column(name.to_string()))
    }

    fn num(n: f64) -> Box<Expr> {
        Box::new(Expr::Number(n))
    }

    #[test]
    fn test_precedence() {
        let e = parse_expression("betx + bety * 2").unwrap();
        assert_eq!(
            e,
            Expr::Binary(
                BinaryOp::Add,
                col("betx"),
                Box::new(Expr::Binary(BinaryOp::Mul, col("bety"), num(2.0)))
            )
        );
    }

    #[test]
    fn test_power_binds_tighter_than_negation() {
        let e = parse_expression("-s ** 2").unwrap();
        assert_eq!(
            e,
            Expr::Unary(
                UnaryOp::Neg,
                Box::new(Expr::Binary(BinaryOp::Pow, col("s"), num(2.0)))
            )
        );
    }

    #[test]
    fn test_power_is_right_associative() {
        let e = parse_expression("a ** b ** 2").unwrap();
        assert_eq!(
            e,
            Expr::Binary(
                BinaryOp::Pow,
                col("a"),
                Box::new(Expr::Binary(BinaryOp::Pow, col("b"), num(2.0)))
            )
        );
    }

    #[test]
    fn test_function_call() {
        let e = parse_expression("sqrt(bety)").unwrap();
        assert_eq!(e, Expr::Call(Func::Sqrt, vec![Expr::Column("bety".into())]));
    }

    #[test]
    fn test_unknown_function_is_name_error() {
        let err = parse_expression("system(x)").unwrap_err();
        assert_eq!(err, TableError::name("system"));
    }

    #[test]
    fn test_wrong_arity() {
        let err = parse_expression("sqrt(a, b)").unwrap_err();
        assert_eq!(err.code(), "TABLE_PARSE");
    }

    #[test]
    fn test_trailing_tokens_rejected() {
        assert!(parse_expression("a b").is_err());
        assert!(parse_expression("(a + b").is_err());
        assert!(parse_expression("a +").is_err());
    }

    #[test]
    fn test_referenced_columns() {
        let e = parse_expression("betx + sqrt(bety) / betx").unwrap();
        assert_eq!(e.columns(), vec!["betx", "bety"]);
    }

    #[test]
    fn test_deep_nesting_rejected() {
        let negations = format!("{}1", "-".repeat(10_000));
        let groups = format!("{}1{}", "(".repeat(10_000), ")".repeat(10_000));
        let unclosed = "(".repeat(10_000);
        let powers = vec!["a"; 10_000].join(" ** ");
        let calls = format!("{}a{}", "sqrt(".repeat(10_000), ")".repeat(10_000));

        for input in [negations, groups, unclosed, powers, calls] {
            let err = parse_expression(&input).unwrap_err();
            assert_eq!(err.code(), "TABLE_PARSE");
            assert!(err.to_string().contains("nested too deeply"));
        }
    }

    #[test]
    fn test_moderate_nesting_accepted() {
        let groups = format!("{}s{}", "(".repeat(40), ")".repeat(40));
        assert_eq!(parse_expression(&groups).unwrap(), Expr::Column("s".into()));
        assert!(parse_expression(&format!("{}1", "-".repeat(50))).is_ok());
    }
}
