//! Elementwise evaluation of parsed expressions

use super::parser::{BinaryOp, Expr, Func, UnaryOp};
use super::ColumnSource;
use crate::column::{Column, Scalar};
use crate::errors::{TableError, TableResult};

/// A scalar or a full-length array
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Operand<T> {
    Scalar(T),
    Array(Vec<T>),
}

impl<T> Operand<T> {
    fn map<R>(self, f: impl Fn(T) -> R) -> Operand<R> {
        match self {
            Operand::Scalar(v) => Operand::Scalar(f(v)),
            Operand::Array(v) => Operand::Array(v.into_iter().map(f).collect()),
        }
    }
}

/// Applies `f` pairwise, broadcasting scalars against arrays.
fn broadcast<A, B, R>(
    lhs: Operand<A>,
    rhs: Operand<B>,
    f: impl Fn(&A, &B) -> R,
) -> TableResult<Operand<R>> {
    let out = match (lhs, rhs) {
        (Operand::Scalar(a), Operand::Scalar(b)) => Operand::Scalar(f(&a, &b)),
        (Operand::Scalar(a), Operand::Array(b)) => {
            Operand::Array(b.iter().map(|b| f(&a, b)).collect())
        }
        (Operand::Array(a), Operand::Scalar(b)) => {
            Operand::Array(a.iter().map(|a| f(a, &b)).collect())
        }
        (Operand::Array(a), Operand::Array(b)) => {
            if a.len() != b.len() {
                return Err(TableError::type_mismatch(format!(
                    "operands have different lengths ({} and {})",
                    a.len(),
                    b.len()
                )));
            }
            Operand::Array(a.iter().zip(&b).map(|(a, b)| f(a, b)).collect())
        }
    };
    Ok(out)
}

/// Intermediate value during evaluation
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Value {
    Num(Operand<f64>),
    Bool(Operand<bool>),
    Text(Operand<String>),
}

impl Value {
    fn from_column(column: &Column) -> Value {
        match column {
            Column::Text(data) => Value::Text(Operand::Array(data.as_ref().clone())),
            Column::Bool(data) => Value::Bool(Operand::Array(data.as_ref().clone())),
            // Float and Int both evaluate as float arrays
            other => Value::Num(Operand::Array(other.to_f64_vec().unwrap_or_default())),
        }
    }

    fn kind_name(&self) -> &'static str {
        match self {
            Value::Num(_) => "number",
            Value::Bool(_) => "bool",
            Value::Text(_) => "text",
        }
    }

    fn into_num(self, op: &str) -> TableResult<Operand<f64>> {
        match self {
            Value::Num(v) => Ok(v),
            Value::Bool(v) => Ok(v.map(|b| if b { 1.0 } else { 0.0 })),
            Value::Text(_) => Err(TableError::type_mismatch(format!(
                "'{}' is not defined for text operands",
                op
            ))),
        }
    }

    fn into_bool(self, op: &str) -> TableResult<Operand<bool>> {
        match self {
            Value::Bool(v) => Ok(v),
            other => Err(TableError::type_mismatch(format!(
                "'{}' expects boolean operands, got {}",
                op,
                other.kind_name()
            ))),
        }
    }

    pub(crate) fn into_result(self) -> Evaluated {
        match self {
            Value::Num(Operand::Scalar(v)) => Evaluated::Scalar(Scalar::Float(v)),
            Value::Num(Operand::Array(v)) => Evaluated::Column(Column::from_f64(v)),
            Value::Bool(Operand::Scalar(v)) => Evaluated::Scalar(Scalar::Bool(v)),
            Value::Bool(Operand::Array(v)) => Evaluated::Column(Column::from_bool(v)),
            Value::Text(Operand::Scalar(v)) => Evaluated::Scalar(Scalar::Text(v)),
            Value::Text(Operand::Array(v)) => Evaluated::Column(Column::from(v)),
        }
    }
}

/// Result of evaluating an expression
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluated {
    /// A derived full-length column
    Column(Column),
    /// An expression with no column references
    Scalar(Scalar),
}

impl Evaluated {
    /// Returns the column, if the result is one
    pub fn into_column(self) -> Option<Column> {
        match self {
            Evaluated::Column(c) => Some(c),
            Evaluated::Scalar(_) => None,
        }
    }

    /// Returns the scalar, if the result is one
    pub fn into_scalar(self) -> Option<Scalar> {
        match self {
            Evaluated::Scalar(s) => Some(s),
            Evaluated::Column(_) => None,
        }
    }
}

pub(crate) fn eval<S: ColumnSource + ?Sized>(expr: &Expr, source: &S) -> TableResult<Value> {
    match expr {
        Expr::Number(n) => Ok(Value::Num(Operand::Scalar(*n))),
        Expr::Text(s) => Ok(Value::Text(Operand::Scalar(s.clone()))),
        Expr::Column(name) => source
            .column(name)
            .map(Value::from_column)
            .ok_or_else(|| TableError::name(name.as_str())),
        Expr::Unary(op, e) => eval_unary(*op, eval(e, source)?),
        Expr::Binary(op, l, r) => eval_binary(*op, eval(l, source)?, eval(r, source)?),
        Expr::Call(func, args) => {
            let mut values = Vec::with_capacity(args.len());
            for a in args {
                values.push(eval(a, source)?);
            }
            eval_call(*func, values)
        }
    }
}

fn eval_unary(op: UnaryOp, v: Value) -> TableResult<Value> {
    match op {
        UnaryOp::Neg => Ok(Value::Num(v.into_num("-")?.map(|x| -x))),
        UnaryOp::Pos => Ok(Value::Num(v.into_num("+")?)),
        UnaryOp::Not => Ok(Value::Bool(v.into_bool("~")?.map(|b| !b))),
    }
}

fn eval_binary(op: BinaryOp, lhs: Value, rhs: Value) -> TableResult<Value> {
    match op {
        BinaryOp::Add => arith(lhs, rhs, "+", |a, b| a + b),
        BinaryOp::Sub => arith(lhs, rhs, "-", |a, b| a - b),
        BinaryOp::Mul => arith(lhs, rhs, "*", |a, b| a * b),
        BinaryOp::Div => arith(lhs, rhs, "/", |a, b| a / b),
        BinaryOp::Rem => arith(lhs, rhs, "%", |a, b| a - b * (a / b).floor()),
        BinaryOp::Pow => arith(lhs, rhs, "**", |a, b| a.powf(b)),
        BinaryOp::And => {
            let (a, b) = (lhs.into_bool("&")?, rhs.into_bool("&")?);
            Ok(Value::Bool(broadcast(a, b, |a, b| *a && *b)?))
        }
        BinaryOp::Or => {
            let (a, b) = (lhs.into_bool("|")?, rhs.into_bool("|")?);
            Ok(Value::Bool(broadcast(a, b, |a, b| *a || *b)?))
        }
        BinaryOp::Lt => compare(lhs, rhs, |o| o.is_lt()),
        BinaryOp::Le => compare(lhs, rhs, |o| o.is_le()),
        BinaryOp::Gt => compare(lhs, rhs, |o| o.is_gt()),
        BinaryOp::Ge => compare(lhs, rhs, |o| o.is_ge()),
        BinaryOp::Eq => compare(lhs, rhs, |o| o.is_eq()),
        BinaryOp::Ne => compare(lhs, rhs, |o| o.is_ne()),
    }
}

fn arith(lhs: Value, rhs: Value, op: &str, f: impl Fn(f64, f64) -> f64) -> TableResult<Value> {
    let (a, b) = (lhs.into_num(op)?, rhs.into_num(op)?);
    Ok(Value::Num(broadcast(a, b, |a, b| f(*a, *b))?))
}

/// Comparison. Unordered operands (NaN) satisfy only `!=`.
fn compare(
    lhs: Value,
    rhs: Value,
    test: impl Fn(std::cmp::Ordering) -> bool,
) -> TableResult<Value> {
    let out = match (lhs, rhs) {
        (Value::Text(a), Value::Text(b)) => broadcast(a, b, |a, b| test(a.cmp(b)))?,
        (Value::Text(_), other) | (other, Value::Text(_)) => {
            return Err(TableError::type_mismatch(format!(
                "cannot compare text with {}",
                other.kind_name()
            )))
        }
        (a, b) => {
            let (a, b) = (a.into_num("compare")?, b.into_num("compare")?);
            broadcast(a, b, |a, b| match a.partial_cmp(b) {
                Some(o) => test(o),
                None => test(std::cmp::Ordering::Less) && test(std::cmp::Ordering::Greater),
            })?
        }
    };
    Ok(Value::Bool(out))
}

fn eval_call(func: Func, mut args: Vec<Value>) -> TableResult<Value> {
    let name = format!("{:?}", func).to_lowercase();
    if args.len() == 2 {
        let rhs = args.pop().map(|v| v.into_num(&name)).transpose()?;
        let lhs = args.pop().map(|v| v.into_num(&name)).transpose()?;
        let (Some(a), Some(b)) = (lhs, rhs) else {
            return Err(TableError::type_mismatch(format!("'{}' is missing arguments", name)));
        };
        let f: fn(f64, f64) -> f64 = match func {
            Func::Arctan2 => f64::atan2,
            Func::Hypot => f64::hypot,
            Func::Minimum => |a, b| if a.is_nan() || b.is_nan() { f64::NAN } else { a.min(b) },
            Func::Maximum => |a, b| if a.is_nan() || b.is_nan() { f64::NAN } else { a.max(b) },
            Func::Power => f64::powf,
            _ => return Err(TableError::type_mismatch(format!("'{}' takes one argument", name))),
        };
        return Ok(Value::Num(broadcast(a, b, |a, b| f(*a, *b))?));
    }

    let Some(arg) = args.pop() else {
        return Err(TableError::type_mismatch(format!("'{}' is missing arguments", name)));
    };
    let x = arg.into_num(&name)?;
    let f: fn(f64) -> f64 = match func {
        Func::Sqrt => f64::sqrt,
        Func::Abs => f64::abs,
        Func::Exp => f64::exp,
        Func::Log => f64::ln,
        Func::Log10 => f64::log10,
        Func::Log2 => f64::log2,
        Func::Sin => f64::sin,
        Func::Cos => f64::cos,
        Func::Tan => f64::tan,
        Func::Arcsin => f64::asin,
        Func::Arccos => f64::acos,
        Func::Arctan => f64::atan,
        Func::Sinh => f64::sinh,
        Func::Cosh => f64::cosh,
        Func::Tanh => f64::tanh,
        Func::Floor => f64::floor,
        Func::Ceil => f64::ceil,
        Func::Round => f64::round_ties_even,
        Func::Sign => |v| {
            if v.is_nan() {
                f64::NAN
            } else if v == 0.0 {
                0.0
            } else {
                v.signum()
            }
        },
        _ => return Err(TableError::type_mismatch(format!("'{}' takes two arguments", name))),
    };
    Ok(Value::Num(x.map(f)))
}
